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

//! # Tally Core Library
//!
//! Bronze-to-Silver transformation engine for catalog show records. Raw API
//! payloads landed unmodified in Bronze are normalized, quality gated, and
//! schema enforced into a Silver Parquet dataset partitioned by category and
//! date, with per-object data quality metrics.
//!
//! ## Module Overview
//!
//! - **record**: raw record, typed cell, and canonical show record
//! - **normalize**: raw record to canonical record mapping
//! - **quality**: ordered filter rules, deduplication, and the quality report
//! - **schema**: canonical Silver schema and lenient column coercion
//! - **partition**: `(category, date)` extraction from object keys
//! - **metrics**: quality report to metric data, metrics sinks
//! - **storage**: blob store traits and implementations
//! - **event**: trigger event shape
//! - **io**: Bronze parsing and Silver Parquet encoding
//! - **orchestrator**: per-event, per-object coordination
//! - **config**: runtime configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use tally::{TlBatchOrchestrator, TlEtlConfig, TlMemoryMetricsSink, TlMemoryObjectStore, TlObjectRef, TlStorageEvent};
//!
//! let store = TlMemoryObjectStore::new();
//! store.insert("lake", "bronze/tmdb/shows/popular/dt=2024-03-01/run.json",
//!     r#"{"results": [{"id": 1, "name": "Show", "popularity": 9.5}]}"#);
//! let metrics = TlMemoryMetricsSink::new();
//!
//! let orchestrator = TlBatchOrchestrator::new(&store, &store, &metrics, TlEtlConfig::default());
//! let event = TlStorageEvent::for_objects(&[TlObjectRef::new("lake", "bronze/tmdb/shows/popular/dt=2024-03-01/run.json")]);
//! let summary = orchestrator.handle_event(&event).unwrap();
//! assert_eq!(summary.results[0].records_processed, 1);
//! ```
//!
//! ## Error Handling
//!
//! Object-level operations return `Result<T, TlError>`. Record-level and
//! field-level problems are recovered in place and logged through `log`.

pub mod config;
pub mod errors;
pub mod event;
pub mod io;
pub mod metrics;
pub mod normalize;
pub mod orchestrator;
pub mod partition;
pub mod quality;
pub mod record;
pub mod schema;
pub mod storage;

pub use config::{TlEtlConfig, TlEtlConfigBuilder};
pub use errors::{Result, TlError, TlNormalizationError};
pub use event::{decode_object_key, TlStorageEvent};
pub use io::{TlIO, TlParquetCompression, TlParquetSummary};
pub use metrics::{
    TlDimension, TlLogMetricsSink, TlMemoryMetricsSink, TlMetricDatum, TlMetricUnit,
    TlMetricsSink, TlQualityReporter,
};
pub use normalize::TlNormalizer;
pub use orchestrator::{TlBatchOrchestrator, TlInvocationSummary, TlObjectSummary};
pub use partition::{TlPartitionKey, TlPartitionResolution, TlPartitionResolver, TlPartitionWarning};
pub use quality::{TlQualityGate, TlQualityOutcome, TlQualityReport, TlQualityRule};
pub use record::{TlRawRecord, TlRow, TlShowBatch, TlShowRecord, TlValue};
pub use schema::{TlColumnSpec, TlColumnType, TlSchemaEnforcer, TlSilverTable, SILVER_SCHEMA};
pub use storage::{
    TlFsObjectStore, TlMemoryObjectStore, TlObjectReader, TlObjectRef, TlObjectWriter,
};
