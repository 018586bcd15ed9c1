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

//! # Tally Schema Module
//!
//! Defines the canonical Silver schema and the enforcer that shapes any set
//! of rows into a table with exactly that column set.
//!
//! ## Enforcement
//!
//! - Columns missing from a row are filled with null.
//! - Fields not in the schema are dropped.
//! - Columns come out in schema order.
//! - Each column is coerced to its declared type as a whole. If any cell of
//!   a column cannot be coerced, the column keeps its original cells and a
//!   warning is logged. A single bad value never fails the batch.

use serde::{Deserialize, Serialize};

use crate::record::{TlRow, TlValue};

/// Logical type of a Silver column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlColumnType {
    Int64,
    Float64,
    Utf8,
    Int64List,
    Utf8List,
}

/// Declared name, type, and nullability of one Silver column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlColumnSpec {
    pub name: &'static str,
    pub column_type: TlColumnType,
    pub nullable: bool,
}

const fn column(name: &'static str, column_type: TlColumnType, nullable: bool) -> TlColumnSpec {
    TlColumnSpec {
        name,
        column_type,
        nullable,
    }
}

/// The canonical Silver show schema, in output order.
pub const SILVER_SCHEMA: [TlColumnSpec; 15] = [
    column("show_id", TlColumnType::Int64, false),
    column("title", TlColumnType::Utf8, false),
    column("original_title", TlColumnType::Utf8, true),
    column("popularity", TlColumnType::Float64, true),
    column("vote_average", TlColumnType::Float64, true),
    column("vote_count", TlColumnType::Int64, true),
    column("first_air_date", TlColumnType::Utf8, true),
    column("genre_ids", TlColumnType::Int64List, true),
    column("origin_country", TlColumnType::Utf8List, true),
    column("poster_path", TlColumnType::Utf8, true),
    column("backdrop_path", TlColumnType::Utf8, true),
    column("overview", TlColumnType::Utf8, true),
    column("original_language", TlColumnType::Utf8, true),
    column("ingestion_date", TlColumnType::Utf8, false),
    column("data_type", TlColumnType::Utf8, false),
];

/// One column of a Silver table.
#[derive(Clone, Debug, PartialEq)]
pub struct TlSilverColumn {
    pub spec: TlColumnSpec,
    pub values: Vec<TlValue>,
    /// Whether every value conforms to `spec.column_type` (or is null).
    pub coerced: bool,
}

/// Schema-conformant table: exactly the canonical columns, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct TlSilverTable {
    columns: Vec<TlSilverColumn>,
    num_rows: usize,
}

impl TlSilverTable {
    pub fn columns(&self) -> &[TlSilverColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TlSilverColumn> {
        self.columns.iter().find(|c| c.spec.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.spec.name).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Names of columns left with their original, uncoerced values.
    pub fn uncoerced_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !c.coerced)
            .map(|c| c.spec.name)
            .collect()
    }

    /// Rebuilds loose rows from the table, one map per row.
    pub fn to_rows(&self) -> Vec<TlRow> {
        (0..self.num_rows)
            .map(|idx| {
                self.columns
                    .iter()
                    .map(|c| (c.spec.name.to_string(), c.values[idx].clone()))
                    .collect()
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct TlSchemaEnforcer {
    schema: &'static [TlColumnSpec],
}

impl Default for TlSchemaEnforcer {
    fn default() -> Self {
        TlSchemaEnforcer {
            schema: &SILVER_SCHEMA,
        }
    }
}

impl TlSchemaEnforcer {
    pub fn new(schema: &'static [TlColumnSpec]) -> Self {
        TlSchemaEnforcer { schema }
    }

    pub fn schema(&self) -> &'static [TlColumnSpec] {
        self.schema
    }

    pub fn enforce(&self, rows: &[TlRow]) -> TlSilverTable {
        let columns = self
            .schema
            .iter()
            .map(|spec| {
                let raw: Vec<TlValue> = rows
                    .iter()
                    .map(|row| row.get(spec.name).cloned().unwrap_or(TlValue::Null))
                    .collect();
                _coerce_column(*spec, raw)
            })
            .collect();

        TlSilverTable {
            columns,
            num_rows: rows.len(),
        }
    }
}

fn _coerce_column(spec: TlColumnSpec, raw: Vec<TlValue>) -> TlSilverColumn {
    let mut coerced = Vec::with_capacity(raw.len());
    for (row, value) in raw.iter().enumerate() {
        match coerce_value(value, spec.column_type) {
            Some(cast) => coerced.push(cast),
            None => {
                log::warn!(
                    "Could not cast {} to {:?}: row {} holds {}",
                    spec.name,
                    spec.column_type,
                    row,
                    value
                );
                return TlSilverColumn {
                    spec,
                    values: raw,
                    coerced: false,
                };
            }
        }
    }
    TlSilverColumn {
        spec,
        values: coerced,
        coerced: true,
    }
}

/// Casts one cell to `column_type`. Null always casts to null.
///
/// Returns `None` when the value cannot be represented in that type.
pub fn coerce_value(value: &TlValue, column_type: TlColumnType) -> Option<TlValue> {
    if value.is_null() {
        return Some(TlValue::Null);
    }
    match column_type {
        TlColumnType::Int64 => _as_int(value).map(TlValue::Int),
        TlColumnType::Float64 => _as_float(value).map(TlValue::Float),
        TlColumnType::Utf8 => _as_text(value).map(TlValue::Text),
        TlColumnType::Int64List => _as_list(value, TlColumnType::Int64),
        TlColumnType::Utf8List => _as_list(value, TlColumnType::Utf8),
    }
}

fn _as_int(value: &TlValue) -> Option<i64> {
    match value {
        TlValue::Int(int) => Some(*int),
        TlValue::Bool(flag) => Some(i64::from(*flag)),
        TlValue::Float(float)
            if float.is_finite() && float.fract() == 0.0 && float.abs() < i64::MAX as f64 =>
        {
            Some(*float as i64)
        }
        TlValue::Text(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn _as_float(value: &TlValue) -> Option<f64> {
    match value {
        TlValue::Float(float) => Some(*float),
        TlValue::Int(int) => Some(*int as f64),
        TlValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        TlValue::Text(text) => text.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn _as_text(value: &TlValue) -> Option<String> {
    match value {
        TlValue::List(_) | TlValue::Null => None,
        other => Some(other.to_string()),
    }
}

fn _as_list(value: &TlValue, item_type: TlColumnType) -> Option<TlValue> {
    match value {
        TlValue::List(items) => items
            .iter()
            .map(|item| coerce_value(item, item_type))
            .collect::<Option<Vec<_>>>()
            .map(TlValue::List),
        _ => None,
    }
}
