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

//! # Tally Orchestrator Module
//!
//! Entry point of one invocation. For every object referenced by a trigger
//! event, strictly in order:
//!
//! 1. read the Bronze object and parse its `results`
//! 2. resolve the partition from the object key
//! 3. normalize each raw record, dropping and logging failures
//! 4. stamp `data_type` with the partition category
//! 5. run the quality gate, then the schema enforcer
//! 6. encode the Silver table as Parquet
//! 7. publish quality metrics
//! 8. write the Silver object
//!
//! The write is the last step, so an object that fails anywhere leaves no
//! Silver output behind. An empty Bronze batch stops after step 1 with a zero
//! summary. The first object-level failure aborts the invocation.
//!
//! All collaborators are borrowed from the caller; the orchestrator owns no
//! clients of its own.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::TlEtlConfig;
use crate::errors::Result;
use crate::event::TlStorageEvent;
use crate::io::{TlIO, TlParquetCompression};
use crate::metrics::{TlMetricsSink, TlQualityReporter};
use crate::normalize::TlNormalizer;
use crate::partition::{TlPartitionKey, TlPartitionResolver};
use crate::quality::{TlQualityGate, TlQualityReport};
use crate::record::TlRow;
use crate::schema::TlSchemaEnforcer;
use crate::storage::{TlObjectReader, TlObjectRef, TlObjectWriter};

/// Outcome of processing one Bronze object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlObjectSummary {
    pub source: TlObjectRef,
    pub records_processed: usize,
    pub quality_pass_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silver_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<TlPartitionKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<TlQualityReport>,
    pub normalization_failures: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uncoerced_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<usize>,
    /// Blake3 hex digest of the written Silver object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl TlObjectSummary {
    fn empty(source: TlObjectRef) -> Self {
        TlObjectSummary {
            source,
            records_processed: 0,
            quality_pass_rate: 0.0,
            silver_key: None,
            partition: None,
            quality: None,
            normalization_failures: 0,
            uncoerced_columns: Vec::new(),
            bytes_written: None,
            checksum: None,
        }
    }
}

/// Result of a whole invocation, returned to the caller and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlInvocationSummary {
    pub files_processed: usize,
    pub results: Vec<TlObjectSummary>,
}

impl TlInvocationSummary {
    /// HTTP-style response body for the invoking runtime.
    pub fn to_response(&self) -> Result<Value> {
        let body = json!({
            "message": "ETL completed successfully",
            "files_processed": self.files_processed,
            "results": self.results,
        });
        Ok(json!({
            "statusCode": 200,
            "body": serde_json::to_string(&body)?,
        }))
    }
}

pub struct TlBatchOrchestrator<'a> {
    reader: &'a dyn TlObjectReader,
    writer: &'a dyn TlObjectWriter,
    metrics: &'a dyn TlMetricsSink,
    config: TlEtlConfig,
    normalizer: TlNormalizer,
    gate: TlQualityGate,
    enforcer: TlSchemaEnforcer,
    resolver: TlPartitionResolver,
    reporter: TlQualityReporter,
    compression: TlParquetCompression,
}

impl<'a> TlBatchOrchestrator<'a> {
    pub fn new(
        reader: &'a dyn TlObjectReader,
        writer: &'a dyn TlObjectWriter,
        metrics: &'a dyn TlMetricsSink,
        config: TlEtlConfig,
    ) -> Self {
        let reporter = TlQualityReporter::new(
            config.metrics_namespace.clone(),
            config.environment.clone(),
        );
        TlBatchOrchestrator {
            reader,
            writer,
            metrics,
            config,
            normalizer: TlNormalizer::new(),
            gate: TlQualityGate::standard(),
            enforcer: TlSchemaEnforcer::default(),
            resolver: TlPartitionResolver::new(),
            reporter,
            compression: TlParquetCompression::default(),
        }
    }

    /// Replaces the normalizer, e.g. to pin `ingestion_date`.
    pub fn with_normalizer(mut self, normalizer: TlNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_compression(mut self, compression: TlParquetCompression) -> Self {
        self.compression = compression;
        self
    }

    pub fn config(&self) -> &TlEtlConfig {
        &self.config
    }

    pub fn handle_event(&self, event: &TlStorageEvent) -> Result<TlInvocationSummary> {
        log::info!("Starting Bronze to Silver ETL");
        let mut results = Vec::with_capacity(event.records.len());

        for object in event.object_refs() {
            log::info!("Processing: {}/{}", object.bucket, object.key);
            let summary = self.process_object(&object).map_err(|err| {
                log::error!("ETL error on {}/{}: {}", object.bucket, object.key, err);
                err
            })?;
            log::info!(
                "Processed {} shows (quality pass rate: {:.1}%)",
                summary.records_processed,
                summary.quality_pass_rate * 100.0
            );
            results.push(summary);
        }

        Ok(TlInvocationSummary {
            files_processed: results.len(),
            results,
        })
    }

    pub fn process_object(&self, object: &TlObjectRef) -> Result<TlObjectSummary> {
        let body = self.reader.get_object(&object.bucket, &object.key)?;
        let raw = TlIO::parse_bronze(&body)?;
        if raw.is_empty() {
            log::warn!("No shows found in {}", object.key);
            return Ok(TlObjectSummary::empty(object.clone()));
        }

        let initial_count = raw.len();
        log::info!("Found {} shows in Bronze file", initial_count);

        let partition = self.resolver.resolve(&object.key).key;

        let mut normalized = Vec::with_capacity(initial_count);
        let mut normalization_failures = 0;
        for outcome in self.normalizer.normalize_batch(&raw) {
            match outcome {
                Ok(mut record) => {
                    record.data_type = Some(partition.category.clone());
                    normalized.push(record);
                }
                Err(err) => {
                    normalization_failures += 1;
                    log::warn!(
                        "Failed to normalize show {}: {}",
                        err.identifier().unwrap_or("<none>"),
                        err
                    );
                }
            }
        }

        let outcome = self.gate.apply(normalized, initial_count);
        let rows: Vec<TlRow> = outcome.records.into_iter().map(|r| r.into_row()).collect();
        let table = self.enforcer.enforce(&rows);
        let encoded = TlIO::encode_silver_parquet(&table, self.compression)?;

        self.reporter
            .publish(self.metrics, &outcome.report, &partition)?;

        let silver_bucket = self
            .config
            .silver_bucket
            .clone()
            .unwrap_or_else(|| object.bucket.clone());
        let silver_key =
            partition.silver_key(&self.config.silver_prefix, &self.config.output_file_name);
        let bytes_written = encoded.len();
        let checksum = blake3::hash(&encoded).to_hex().to_string();
        self.writer.put_object(&silver_bucket, &silver_key, encoded)?;
        log::info!("Wrote Silver data: {}/{}", silver_bucket, silver_key);

        Ok(TlObjectSummary {
            source: object.clone(),
            records_processed: table.num_rows(),
            quality_pass_rate: outcome.report.pass_rate,
            silver_key: Some(silver_key),
            partition: Some(partition),
            uncoerced_columns: table
                .uncoerced_columns()
                .into_iter()
                .map(str::to_string)
                .collect(),
            quality: Some(outcome.report),
            normalization_failures,
            bytes_written: Some(bytes_written),
            checksum: Some(checksum),
        })
    }
}
