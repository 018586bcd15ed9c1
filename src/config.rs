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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metrics::DEFAULT_NAMESPACE;

/// Runtime configuration of the Bronze-to-Silver job.
///
/// Read from the process environment in deployments:
///
/// | Variable | Field | Default |
/// |---|---|---|
/// | `ENVIRONMENT` | `environment` | `dev` |
/// | `S3_BUCKET` | `silver_bucket` | source bucket of each object |
/// | `LOG_LEVEL` | `log_level` | `INFO` |
/// | `METRICS_NAMESPACE` | `metrics_namespace` | `Tally/DataQuality` |
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TlEtlConfig {
    /// Value of the `Environment` metric dimension.
    pub environment: String,
    /// Bucket receiving Silver output. `None` writes next to the Bronze object.
    pub silver_bucket: Option<String>,
    pub log_level: String,
    pub metrics_namespace: String,
    /// Key prefix of Silver objects, before `<category>/dt=<date>/`.
    pub silver_prefix: String,
    pub output_file_name: String,
}

impl Default for TlEtlConfig {
    fn default() -> Self {
        TlEtlConfig {
            environment: "dev".to_string(),
            silver_bucket: None,
            log_level: "INFO".to_string(),
            metrics_namespace: DEFAULT_NAMESPACE.to_string(),
            silver_prefix: "silver/shows".to_string(),
            output_file_name: "data.parquet".to_string(),
        }
    }
}

impl TlEtlConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        TlEtlConfigBuilder {
            environment: get("ENVIRONMENT"),
            silver_bucket: get("S3_BUCKET"),
            log_level: get("LOG_LEVEL"),
            metrics_namespace: get("METRICS_NAMESPACE"),
            ..TlEtlConfigBuilder::default()
        }
        .build()
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => log::LevelFilter::Trace,
            "DEBUG" => log::LevelFilter::Debug,
            "WARN" | "WARNING" => log::LevelFilter::Warn,
            "ERROR" | "CRITICAL" => log::LevelFilter::Error,
            "OFF" => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    }

    /// Caps the global `log` level at the configured level.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level_filter());
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TlEtlConfigBuilder {
    pub environment: Option<String>,
    pub silver_bucket: Option<String>,
    pub log_level: Option<String>,
    pub metrics_namespace: Option<String>,
    pub silver_prefix: Option<String>,
    pub output_file_name: Option<String>,
}

impl TlEtlConfigBuilder {
    pub fn build(self) -> TlEtlConfig {
        let base = TlEtlConfig::default();
        TlEtlConfig {
            environment: self.environment.unwrap_or(base.environment),
            silver_bucket: self.silver_bucket.or(base.silver_bucket),
            log_level: self.log_level.unwrap_or(base.log_level),
            metrics_namespace: self.metrics_namespace.unwrap_or(base.metrics_namespace),
            silver_prefix: self.silver_prefix.unwrap_or(base.silver_prefix),
            output_file_name: self.output_file_name.unwrap_or(base.output_file_name),
        }
    }

    /// Builds from a JSON object; unknown or mistyped input falls back to defaults.
    pub fn from_json(value: &Value) -> TlEtlConfig {
        let builder: TlEtlConfigBuilder = serde_json::from_value(value.clone())
            .unwrap_or_else(|_| TlEtlConfigBuilder::default());
        builder.build()
    }
}
