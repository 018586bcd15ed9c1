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


//! # Tally Core Tests - Normalizer
//!
//! Tests for mapping raw Bronze records onto canonical show records.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test normalize
//! ```

use chrono::{TimeZone, Utc};
use serde_json::json;
use tally::{TlNormalizationError, TlNormalizer, TlRawRecord, TlValue};

fn normalizer() -> TlNormalizer {
    TlNormalizer::with_fixed_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

/// Tests a fully populated raw record.
///
/// Verifies every canonical field is carried over and `data_type` stays unset.
#[test]
fn test_full_record_maps_every_field() {
    let raw = TlRawRecord::new(json!({
        "id": 1399,
        "name": "Game of Thrones",
        "original_name": "Game of Thrones",
        "popularity": 369.594,
        "vote_average": 8.4,
        "vote_count": 21000,
        "first_air_date": "2011-04-17",
        "genre_ids": [10765, 18],
        "origin_country": ["US"],
        "poster_path": "/p.jpg",
        "backdrop_path": "/b.jpg",
        "overview": "Seven noble families...",
        "original_language": "en",
        "adult": false
    }));

    let record = normalizer().normalize_show(&raw).unwrap();
    assert_eq!(record.show_id, Some(1399));
    assert_eq!(record.title.as_deref(), Some("Game of Thrones"));
    assert_eq!(record.original_title, TlValue::Text("Game of Thrones".into()));
    assert_eq!(record.popularity, 369.594);
    assert_eq!(record.vote_average, 8.4);
    assert_eq!(record.vote_count, TlValue::Int(21000));
    assert_eq!(record.first_air_date, TlValue::Text("2011-04-17".into()));
    assert_eq!(
        record.genre_ids,
        TlValue::List(vec![TlValue::Int(10765), TlValue::Int(18)])
    );
    assert_eq!(
        record.origin_country,
        TlValue::List(vec![TlValue::Text("US".into())])
    );
    assert_eq!(record.original_language, TlValue::Text("en".into()));
    assert_eq!(record.ingestion_date, "2024-03-01T12:00:00.000000");
    assert_eq!(record.data_type, None);
}

/// Tests defaults for an empty map.
///
/// Verifies numeric defaults, empty lists, and null identity fields.
#[test]
fn test_empty_map_gets_defaults() {
    let record = normalizer().normalize_show(&TlRawRecord::new(json!({}))).unwrap();
    assert_eq!(record.show_id, None);
    assert_eq!(record.title, None);
    assert_eq!(record.popularity, 0.0);
    assert_eq!(record.vote_average, 0.0);
    assert_eq!(record.vote_count, TlValue::Int(0));
    assert_eq!(record.genre_ids, TlValue::List(vec![]));
    assert_eq!(record.origin_country, TlValue::List(vec![]));
    assert_eq!(record.poster_path, TlValue::Null);
    assert_eq!(record.overview, TlValue::Null);
}

/// Tests title fallback order.
#[test]
fn test_title_prefers_name_then_original_name() {
    let both = TlRawRecord::new(json!({"name": "Local", "original_name": "Original"}));
    assert_eq!(normalizer().normalize_show(&both).unwrap().title.as_deref(), Some("Local"));

    let null_name = TlRawRecord::new(json!({"name": null, "original_name": "Original"}));
    assert_eq!(
        normalizer().normalize_show(&null_name).unwrap().title.as_deref(),
        Some("Original")
    );

    let neither = TlRawRecord::new(json!({"name": ""}));
    assert_eq!(normalizer().normalize_show(&neither).unwrap().title, None);
}

/// Tests float coercion of score fields.
///
/// Numeric strings are parsed; anything non-numeric defaults to 0.0.
#[test]
fn test_scores_coerce_or_default() {
    let raw = TlRawRecord::new(json!({"popularity": "12.5", "vote_average": 7}));
    let record = normalizer().normalize_show(&raw).unwrap();
    assert_eq!(record.popularity, 12.5);
    assert_eq!(record.vote_average, 7.0);

    let raw = TlRawRecord::new(json!({"popularity": "high", "vote_average": [1]}));
    let record = normalizer().normalize_show(&raw).unwrap();
    assert_eq!(record.popularity, 0.0);
    assert_eq!(record.vote_average, 0.0);
}

/// Tests that negative popularity is preserved for the quality gate.
#[test]
fn test_negative_popularity_is_kept() {
    let raw = TlRawRecord::new(json!({"id": 1, "name": "x", "popularity": -1}));
    assert_eq!(normalizer().normalize_show(&raw).unwrap().popularity, -1.0);
}

/// Tests that present-but-null defaults are not replaced.
///
/// Only an absent `vote_count` becomes 0.
#[test]
fn test_explicit_null_vote_count_stays_null() {
    let raw = TlRawRecord::new(json!({"vote_count": null, "genre_ids": null}));
    let record = normalizer().normalize_show(&raw).unwrap();
    assert_eq!(record.vote_count, TlValue::Null);
    assert_eq!(record.genre_ids, TlValue::Null);
}

/// Tests failures for records that are not maps.
#[test]
fn test_non_map_record_fails_without_identifier() {
    for value in [json!(null), json!(42), json!("show"), json!([1, 2])] {
        let err = normalizer()
            .normalize_show(&TlRawRecord::new(value))
            .unwrap_err();
        assert!(matches!(err, TlNormalizationError::NotAnObject { .. }));
        assert_eq!(err.identifier(), None);
    }
}

/// Tests failures for identifiers that are not integers.
///
/// The failure carries the offending identifier.
#[test]
fn test_invalid_identifier_fails_with_identifier() {
    let err = normalizer()
        .normalize_show(&TlRawRecord::new(json!({"id": "abc", "name": "x"})))
        .unwrap_err();
    assert_eq!(
        err,
        TlNormalizationError::InvalidIdentifier {
            identifier: "\"abc\"".into()
        }
    );
    assert_eq!(err.identifier(), Some("\"abc\""));
}

/// Tests batch normalization keeps one outcome per input, in order.
#[test]
fn test_batch_outcomes_follow_input_order() {
    let raw = vec![
        TlRawRecord::new(json!({"id": 1})),
        TlRawRecord::new(json!("bad")),
        TlRawRecord::new(json!({"id": 3})),
    ];
    let outcomes = normalizer().normalize_batch(&raw);
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].as_ref().unwrap().show_id, Some(1));
    assert!(outcomes[1].is_err());
    assert_eq!(outcomes[2].as_ref().unwrap().show_id, Some(3));
}

/// Tests the live clock stamps an ISO timestamp.
#[test]
fn test_live_clock_stamps_iso_timestamp() {
    let record = TlNormalizer::new()
        .normalize_show(&TlRawRecord::new(json!({})))
        .unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(&record.ingestion_date, "%Y-%m-%dT%H:%M:%S%.f").is_ok());
}
