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

//! Object-created notification that triggers one invocation.
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "lake"},
//!                      "object": {"key": "bronze/tmdb/shows/popular/dt=2024-03-01/run.json"}}}]}
//! ```
//!
//! Object keys arrive form-encoded (`+` for space, `%XX` escapes) and are
//! decoded before use.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::storage::TlObjectRef;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlStorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<TlEventRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlEventRecord {
    pub s3: TlEventEntity,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlEventEntity {
    pub bucket: TlEventBucket,
    pub object: TlEventObject,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlEventBucket {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlEventObject {
    pub key: String,
}

impl TlStorageEvent {
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Builds an event referencing the given objects, keys taken verbatim.
    pub fn for_objects(objects: &[TlObjectRef]) -> Self {
        TlStorageEvent {
            records: objects
                .iter()
                .map(|object| TlEventRecord {
                    s3: TlEventEntity {
                        bucket: TlEventBucket {
                            name: object.bucket.clone(),
                        },
                        object: TlEventObject {
                            key: object.key.clone(),
                        },
                    },
                })
                .collect(),
        }
    }

    /// Referenced objects in event order, with decoded keys.
    pub fn object_refs(&self) -> Vec<TlObjectRef> {
        self.records
            .iter()
            .map(|record| {
                TlObjectRef::new(
                    record.s3.bucket.name.clone(),
                    decode_object_key(&record.s3.object.key),
                )
            })
            .collect()
    }
}

/// Decodes a form-encoded object key: `+` becomes a space, then `%XX` escapes.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
