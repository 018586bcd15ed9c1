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

//! # Tally Metrics Module
//!
//! Maps a [`TlQualityReport`] onto the three per-object data quality metrics
//! and hands them to a [`TlMetricsSink`]:
//!
//! | Metric | Unit | Value |
//! |---|---|---|
//! | `DataQualityPassRate` | Percent | `pass_rate * 100` |
//! | `RecordsProcessed` | Count | `final_count` |
//! | `RecordsFailed` | Count | `failed_count` |
//!
//! Every datum carries `Environment` and `DataType` dimensions. The reporter
//! does not retry; sink errors go straight back to the caller.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TlError};
use crate::partition::TlPartitionKey;
use crate::quality::TlQualityReport;

pub const DEFAULT_NAMESPACE: &str = "Tally/DataQuality";

pub const METRIC_PASS_RATE: &str = "DataQualityPassRate";
pub const METRIC_RECORDS_PROCESSED: &str = "RecordsProcessed";
pub const METRIC_RECORDS_FAILED: &str = "RecordsFailed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlMetricUnit {
    Percent,
    Count,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlDimension {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlMetricDatum {
    pub metric_name: String,
    pub value: f64,
    pub unit: TlMetricUnit,
    pub timestamp: DateTime<Utc>,
    pub dimensions: Vec<TlDimension>,
}

impl TlMetricDatum {
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// Fire-and-forget receiver of metric data.
pub trait TlMetricsSink {
    fn put_metric_data(&self, namespace: &str, data: &[TlMetricDatum]) -> Result<()>;
}

/// Sink that writes each datum as a JSON log line.
#[derive(Debug, Default)]
pub struct TlLogMetricsSink;

impl TlMetricsSink for TlLogMetricsSink {
    fn put_metric_data(&self, namespace: &str, data: &[TlMetricDatum]) -> Result<()> {
        for datum in data {
            log::info!("metric {namespace} {}", serde_json::to_string(datum)?);
        }
        Ok(())
    }
}

/// Sink that keeps every published batch in memory.
#[derive(Debug, Default)]
pub struct TlMemoryMetricsSink {
    published: Mutex<Vec<(String, Vec<TlMetricDatum>)>>,
}

impl TlMemoryMetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(namespace, data)` batch received so far, in publish order.
    pub fn published(&self) -> Vec<(String, Vec<TlMetricDatum>)> {
        self.published
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// All received data flattened, regardless of namespace.
    pub fn data(&self) -> Vec<TlMetricDatum> {
        self.published()
            .into_iter()
            .flat_map(|(_, data)| data)
            .collect()
    }
}

impl TlMetricsSink for TlMemoryMetricsSink {
    fn put_metric_data(&self, namespace: &str, data: &[TlMetricDatum]) -> Result<()> {
        let mut published = self
            .published
            .lock()
            .map_err(|_| TlError::metrics("metric buffer lock poisoned"))?;
        published.push((namespace.to_string(), data.to_vec()));
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct TlQualityReporter {
    namespace: String,
    environment: String,
}

impl TlQualityReporter {
    pub fn new(namespace: impl Into<String>, environment: impl Into<String>) -> Self {
        TlQualityReporter {
            namespace: namespace.into(),
            environment: environment.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Builds the metric data for one report, timestamped `now`.
    pub fn build_metric_data(
        &self,
        report: &TlQualityReport,
        partition: &TlPartitionKey,
        now: DateTime<Utc>,
    ) -> Vec<TlMetricDatum> {
        let dimensions = vec![
            TlDimension {
                name: "Environment".into(),
                value: self.environment.clone(),
            },
            TlDimension {
                name: "DataType".into(),
                value: partition.category.clone(),
            },
        ];
        let datum = |name: &str, value: f64, unit: TlMetricUnit| TlMetricDatum {
            metric_name: name.to_string(),
            value,
            unit,
            timestamp: now,
            dimensions: dimensions.clone(),
        };

        vec![
            datum(METRIC_PASS_RATE, report.pass_rate * 100.0, TlMetricUnit::Percent),
            datum(
                METRIC_RECORDS_PROCESSED,
                report.final_count as f64,
                TlMetricUnit::Count,
            ),
            datum(
                METRIC_RECORDS_FAILED,
                report.failed_count as f64,
                TlMetricUnit::Count,
            ),
        ]
    }

    /// Publishes the report's metrics and returns how many data were sent.
    pub fn publish(
        &self,
        sink: &dyn TlMetricsSink,
        report: &TlQualityReport,
        partition: &TlPartitionKey,
    ) -> Result<usize> {
        let data = self.build_metric_data(report, partition, Utc::now());
        sink.put_metric_data(&self.namespace, &data)?;
        log::info!(
            "Published {} quality metrics for {} dt={}",
            data.len(),
            partition.category,
            partition.date
        );
        Ok(data.len())
    }
}
