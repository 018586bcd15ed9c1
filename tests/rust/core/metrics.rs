//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tally.
//! The Tally project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.


//! # Tally Core Tests - Quality Reporter
//!
//! Tests for mapping quality reports onto metric data and publishing them.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test metrics
//! ```

use chrono::{TimeZone, Utc};
use tally::metrics::{DEFAULT_NAMESPACE, METRIC_PASS_RATE, METRIC_RECORDS_FAILED, METRIC_RECORDS_PROCESSED};
use tally::{
    TlLogMetricsSink, TlMemoryMetricsSink, TlMetricUnit, TlPartitionKey, TlQualityReport,
    TlQualityReporter,
};

fn report() -> TlQualityReport {
    TlQualityReport {
        initial_count: 5,
        missing_show_id: 1,
        missing_title: 0,
        invalid_popularity: 1,
        duplicates: 1,
        final_count: 2,
        failed_count: 3,
        pass_rate: 0.4,
    }
}

/// Tests names, units, and values of the three metrics.
#[test]
fn test_metric_data_mapping() {
    let reporter = TlQualityReporter::new(DEFAULT_NAMESPACE, "prod");
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let data = reporter.build_metric_data(&report(), &TlPartitionKey::new("trending", "2024-03-01"), now);

    assert_eq!(data.len(), 3);
    assert_eq!(data[0].metric_name, METRIC_PASS_RATE);
    assert_eq!(data[0].unit, TlMetricUnit::Percent);
    assert!((data[0].value - 40.0).abs() < 1e-9);

    assert_eq!(data[1].metric_name, METRIC_RECORDS_PROCESSED);
    assert_eq!(data[1].unit, TlMetricUnit::Count);
    assert_eq!(data[1].value, 2.0);

    assert_eq!(data[2].metric_name, METRIC_RECORDS_FAILED);
    assert_eq!(data[2].unit, TlMetricUnit::Count);
    assert_eq!(data[2].value, 3.0);

    for datum in &data {
        assert_eq!(datum.dimension("Environment"), Some("prod"));
        assert_eq!(datum.dimension("DataType"), Some("trending"));
        assert_eq!(datum.timestamp, now);
    }
}

/// Tests publishing to the in-memory sink under the configured namespace.
#[test]
fn test_publish_to_memory_sink() {
    let sink = TlMemoryMetricsSink::new();
    let reporter = TlQualityReporter::new(DEFAULT_NAMESPACE, "dev");
    let sent = reporter
        .publish(&sink, &report(), &TlPartitionKey::new("popular", "2024-03-01"))
        .unwrap();

    assert_eq!(sent, 3);
    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "Tally/DataQuality");
    assert_eq!(sink.data().len(), 3);
}

/// Tests the log-backed sink accepts data.
#[test]
fn test_log_sink_accepts_data() {
    let reporter = TlQualityReporter::new(DEFAULT_NAMESPACE, "dev");
    assert_eq!(
        reporter
            .publish(&TlLogMetricsSink, &report(), &TlPartitionKey::new("popular", "2024-03-01"))
            .unwrap(),
        3
    );
}
