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

//! # Tally Normalizer Module
//!
//! Maps one raw Bronze record onto the canonical show record. This is the
//! single place where raw JSON values become typed fields.
//!
//! Field rules:
//!
//! - `title` is `name` when it is non-empty text, otherwise `original_name`.
//! - `popularity` and `vote_average` become `f64`, defaulting to `0.0` when
//!   absent or non-numeric.
//! - `vote_count` defaults to `0`; `genre_ids` and `origin_country` default to
//!   an empty list.
//! - `ingestion_date` is stamped at normalization time.
//! - `data_type` is left unset.
//!
//! A record fails only when it is not a map, or when it carries an `id` that
//! cannot be read as an integer. Failures are returned, never logged here.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::TlNormalizationError;
use crate::record::{TlRawRecord, TlShowRecord, TlValue};

/// Timestamp layout of `ingestion_date`.
pub const INGESTION_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Outcome of normalizing one raw record.
pub type TlNormalizeResult = std::result::Result<TlShowRecord, TlNormalizationError>;

#[derive(Clone, Debug, Default)]
pub struct TlNormalizer {
    fixed_timestamp: Option<DateTime<Utc>>,
}

impl TlNormalizer {
    /// Normalizer that stamps the wall-clock time on every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer that stamps the same timestamp on every record.
    pub fn with_fixed_timestamp(timestamp: DateTime<Utc>) -> Self {
        TlNormalizer {
            fixed_timestamp: Some(timestamp),
        }
    }

    pub fn normalize_show(&self, raw: &TlRawRecord) -> TlNormalizeResult {
        if !raw.is_map() {
            return Err(TlNormalizationError::NotAnObject {
                kind: raw.kind().to_string(),
            });
        }

        let show_id = _read_show_id(raw.get("id"))?;
        let title = raw
            .get("name")
            .and_then(_read_text)
            .filter(|name| !name.is_empty())
            .or_else(|| raw.get("original_name").and_then(_read_text));

        Ok(TlShowRecord {
            show_id,
            title,
            original_title: _cell(raw, "original_name"),
            popularity: _read_float(raw.get("popularity")),
            vote_average: _read_float(raw.get("vote_average")),
            vote_count: _cell_or(raw, "vote_count", TlValue::Int(0)),
            first_air_date: _cell(raw, "first_air_date"),
            genre_ids: _cell_or(raw, "genre_ids", TlValue::empty_list()),
            origin_country: _cell_or(raw, "origin_country", TlValue::empty_list()),
            poster_path: _cell(raw, "poster_path"),
            backdrop_path: _cell(raw, "backdrop_path"),
            overview: _cell(raw, "overview"),
            original_language: _cell(raw, "original_language"),
            ingestion_date: self.stamp(),
            data_type: None,
        })
    }

    /// Normalizes every record of a batch, keeping per-record outcomes in input order.
    pub fn normalize_batch(&self, raw: &[TlRawRecord]) -> Vec<TlNormalizeResult> {
        raw.iter().map(|record| self.normalize_show(record)).collect()
    }

    fn stamp(&self) -> String {
        self.fixed_timestamp
            .unwrap_or_else(Utc::now)
            .format(INGESTION_TIMESTAMP_FORMAT)
            .to_string()
    }
}

fn _read_show_id(value: Option<&Value>) -> Result<Option<i64>, TlNormalizationError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let parsed = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && float.abs() < i64::MAX as f64)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| TlNormalizationError::InvalidIdentifier {
            identifier: value.to_string(),
        })
}

fn _read_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn _read_float(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|float| float.is_finite()).unwrap_or(0.0)
}

fn _cell(raw: &TlRawRecord, key: &str) -> TlValue {
    raw.get(key).map(TlValue::from_json).unwrap_or(TlValue::Null)
}

fn _cell_or(raw: &TlRawRecord, key: &str, default: TlValue) -> TlValue {
    raw.get(key).map(TlValue::from_json).unwrap_or(default)
}
