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

//! # Tally Record Module
//!
//! Data structures for the three shapes a show takes on its way from Bronze
//! to Silver:
//!
//! - [`TlRawRecord`]: one element of a Bronze `results` array. Opaque; only
//!   supports key lookup. Nothing outside the normalizer reads it.
//! - [`TlShowRecord`]: the canonical record produced by the normalizer. The
//!   fields the quality gate inspects are strongly typed; the pass-through
//!   fields hold a [`TlValue`] cell that the schema enforcer types later.
//! - [`TlRow`]: a loose name-to-cell map, the input of the schema enforcer.
//!
//! ## Usage Example
//!
//! ```rust
//! use tally::record::{TlRawRecord, TlValue};
//! use serde_json::json;
//!
//! let raw = TlRawRecord::new(json!({"id": 7, "name": "Show"}));
//! assert!(raw.get("name").is_some());
//! assert_eq!(TlValue::from_json(&json!([1, 2])), TlValue::List(vec![TlValue::Int(1), TlValue::Int(2)]));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw record as landed in Bronze.
///
/// No field is guaranteed present or correctly typed, and the record itself
/// may not even be a map.
#[derive(Clone, Debug, PartialEq)]
pub struct TlRawRecord(Value);

impl TlRawRecord {
    pub fn new(value: Value) -> Self {
        TlRawRecord(value)
    }

    /// Looks up a field. Returns `None` when absent or when the record is not a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|map| map.get(key))
    }

    /// Whether the record is a key-value map at all.
    pub fn is_map(&self) -> bool {
        self.0.is_object()
    }

    /// Human-readable kind of the underlying value, used in failure messages.
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }
}

impl From<Value> for TlRawRecord {
    fn from(value: Value) -> Self {
        TlRawRecord::new(value)
    }
}

/// A single cell in a canonical record or Silver column.
///
/// Objects have no variant of their own: a nested map is kept as its JSON
/// text so the raw variant type never escapes the normalizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<TlValue>),
}

impl TlValue {
    /// Converts a raw JSON value into a cell without any type coercion.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => TlValue::Null,
            Value::Bool(flag) => TlValue::Bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => TlValue::Int(int),
                None => number
                    .as_f64()
                    .map(TlValue::Float)
                    .unwrap_or_else(|| TlValue::Text(number.to_string())),
            },
            Value::String(text) => TlValue::Text(text.clone()),
            Value::Array(items) => TlValue::List(items.iter().map(TlValue::from_json).collect()),
            Value::Object(_) => TlValue::Text(value.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TlValue::Null)
    }

    pub fn empty_list() -> Self {
        TlValue::List(Vec::new())
    }
}

impl fmt::Display for TlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlValue::Null => f.write_str("null"),
            TlValue::Bool(flag) => write!(f, "{flag}"),
            TlValue::Int(int) => write!(f, "{int}"),
            TlValue::Float(float) => write!(f, "{float}"),
            TlValue::Text(text) => f.write_str(text),
            TlValue::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    match item {
                        TlValue::Text(text) => write!(f, "{text:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Option<String>> for TlValue {
    fn from(value: Option<String>) -> Self {
        value.map(TlValue::Text).unwrap_or(TlValue::Null)
    }
}

impl From<Option<i64>> for TlValue {
    fn from(value: Option<i64>) -> Self {
        value.map(TlValue::Int).unwrap_or(TlValue::Null)
    }
}

/// Loose record shape accepted by the schema enforcer.
pub type TlRow = HashMap<String, TlValue>;

/// Canonical show record emitted by the normalizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlShowRecord {
    pub show_id: Option<i64>,
    pub title: Option<String>,
    pub original_title: TlValue,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: TlValue,
    pub first_air_date: TlValue,
    pub genre_ids: TlValue,
    pub origin_country: TlValue,
    pub poster_path: TlValue,
    pub backdrop_path: TlValue,
    pub overview: TlValue,
    pub original_language: TlValue,
    pub ingestion_date: String,
    /// Stamped by the orchestrator from the partition, never by the normalizer.
    pub data_type: Option<String>,
}

impl TlShowRecord {
    /// Flattens the record into a row keyed by canonical field name.
    pub fn into_row(self) -> TlRow {
        let mut row = TlRow::with_capacity(15);
        row.insert("show_id".into(), self.show_id.into());
        row.insert("title".into(), self.title.into());
        row.insert("original_title".into(), self.original_title);
        row.insert("popularity".into(), TlValue::Float(self.popularity));
        row.insert("vote_average".into(), TlValue::Float(self.vote_average));
        row.insert("vote_count".into(), self.vote_count);
        row.insert("first_air_date".into(), self.first_air_date);
        row.insert("genre_ids".into(), self.genre_ids);
        row.insert("origin_country".into(), self.origin_country);
        row.insert("poster_path".into(), self.poster_path);
        row.insert("backdrop_path".into(), self.backdrop_path);
        row.insert("overview".into(), self.overview);
        row.insert("original_language".into(), self.original_language);
        row.insert("ingestion_date".into(), TlValue::Text(self.ingestion_date));
        row.insert("data_type".into(), self.data_type.into());
        row
    }
}

/// Convenience alias for working on batches of canonical records.
pub type TlShowBatch = Vec<TlShowRecord>;
