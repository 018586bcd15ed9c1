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

//! # Tally Partition Module
//!
//! Derives the `(category, date)` partition of a dataset from the Bronze
//! object key, e.g. `bronze/tmdb/shows/trending/dt=2024-03-01/run.json`
//! resolves to `("trending", "2024-03-01")`.
//!
//! Resolution never fails. A key without a `dt=` token falls back to today's
//! date and a key without a `shows/<category>/` segment falls back to
//! [`UNKNOWN_CATEGORY`]; both fallbacks are reported as warnings.

use std::fmt;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category used when the key has no `shows/<category>/` segment.
pub const UNKNOWN_CATEGORY: &str = "unknown";

const DATE_PATTERN: &str = r"dt=([0-9]{4}-[0-9]{2}-[0-9]{2})";
const CATEGORY_PATTERN: &str = r"shows/(\w+)/";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TlPartitionKey {
    pub category: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

impl TlPartitionKey {
    pub fn new(category: impl Into<String>, date: impl Into<String>) -> Self {
        TlPartitionKey {
            category: category.into(),
            date: date.into(),
        }
    }

    /// Deterministic Silver object key for this partition.
    pub fn silver_key(&self, prefix: &str, file_name: &str) -> String {
        format!(
            "{}/{}/dt={}/{}",
            prefix.trim_end_matches('/'),
            self.category,
            self.date,
            file_name
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlPartitionWarning {
    MissingDate { key: String, fallback: String },
    MissingCategory { key: String },
}

impl fmt::Display for TlPartitionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlPartitionWarning::MissingDate { key, fallback } => {
                write!(f, "Could not extract date from {key}, using {fallback}")
            }
            TlPartitionWarning::MissingCategory { key } => {
                write!(f, "Could not extract data type from {key}, using {UNKNOWN_CATEGORY}")
            }
        }
    }
}

/// Partition plus any fallbacks taken while resolving it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlPartitionResolution {
    pub key: TlPartitionKey,
    pub warnings: Vec<TlPartitionWarning>,
}

#[derive(Clone, Debug)]
pub struct TlPartitionResolver {
    date_pattern: Regex,
    category_pattern: Regex,
}

impl Default for TlPartitionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TlPartitionResolver {
    pub fn new() -> Self {
        TlPartitionResolver {
            date_pattern: Regex::new(DATE_PATTERN).expect("date pattern is valid"),
            category_pattern: Regex::new(CATEGORY_PATTERN).expect("category pattern is valid"),
        }
    }

    /// Resolves against the current UTC date.
    pub fn resolve(&self, object_key: &str) -> TlPartitionResolution {
        self.resolve_on(object_key, Utc::now().date_naive())
    }

    /// Resolves with `today` as the date fallback.
    pub fn resolve_on(&self, object_key: &str, today: NaiveDate) -> TlPartitionResolution {
        let mut warnings = Vec::new();

        let date = match self.date_pattern.captures(object_key).and_then(|c| c.get(1)) {
            Some(found) => found.as_str().to_string(),
            None => {
                let fallback = today.format("%Y-%m-%d").to_string();
                warnings.push(TlPartitionWarning::MissingDate {
                    key: object_key.to_string(),
                    fallback: fallback.clone(),
                });
                fallback
            }
        };

        let category = match self
            .category_pattern
            .captures(object_key)
            .and_then(|c| c.get(1))
        {
            Some(found) => found.as_str().to_string(),
            None => {
                warnings.push(TlPartitionWarning::MissingCategory {
                    key: object_key.to_string(),
                });
                UNKNOWN_CATEGORY.to_string()
            }
        };

        for warning in &warnings {
            log::warn!("{warning}");
        }

        TlPartitionResolution {
            key: TlPartitionKey { category, date },
            warnings,
        }
    }
}
