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

//! # Tally Error Module
//!
//! This module defines the error types used throughout Tally.
//!
//! ## Error Categories
//!
//! Two families of failure exist, and they never mix:
//!
//! - **Object-level** ([`TlError`]): the Bronze object cannot be read or
//!   parsed, the Silver object cannot be written, or the metrics sink is
//!   unreachable. These abort processing of the object and are returned to
//!   the caller so the upstream retry mechanism can re-attempt it.
//! - **Record-level** ([`TlNormalizationError`]): one raw record could not be
//!   mapped to a canonical record. The record is dropped and the batch
//!   continues.
//!
//! Field-level coercion failures and missing partition tokens are not errors
//! at all; they are logged and recovered from in place.
//!
//! ## Usage
//!
//! ```rust
//! use tally::errors::{Result, TlError};
//!
//! fn require_bucket(bucket: &str) -> Result<()> {
//!     if bucket.is_empty() {
//!         return Err(TlError::validation("bucket name cannot be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Tally.
pub type Result<T> = std::result::Result<T, TlError>;

/// Canonical object-level error enumeration for Tally.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum TlError {
    /// Errors originating from filesystem or network IO.
    #[error("io error: {0}")]
    Io(String),

    /// A Bronze document or table does not have the expected layout.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Invalid parameters, keys, or configuration.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Reading or writing an object in the blob store failed.
    #[error("storage error for {bucket}/{key}: {message}")]
    Storage {
        bucket: String,
        key: String,
        message: String,
    },

    /// The metrics sink rejected or could not receive the metric data.
    #[error("metrics error: {message}")]
    Metrics { message: String },

    /// Columnar encoding failures.
    #[error("parquet error: {0}")]
    Parquet(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for TlError {
    fn from(err: io::Error) -> Self {
        TlError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TlError {
    fn from(err: serde_json::Error) -> Self {
        TlError::Serde(err.to_string())
    }
}

impl From<arrow2::error::Error> for TlError {
    fn from(err: arrow2::error::Error) -> Self {
        TlError::Parquet(err.to_string())
    }
}

impl TlError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        TlError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct schema errors.
    pub fn schema<T: Into<String>>(message: T) -> Self {
        TlError::Schema {
            message: message.into(),
        }
    }

    /// Helper to construct storage errors bound to one object.
    pub fn storage(
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TlError::Storage {
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Helper to construct metrics sink errors.
    pub fn metrics<T: Into<String>>(message: T) -> Self {
        TlError::Metrics {
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        TlError::Internal(message.into())
    }
}

/// Per-record failure raised by the normalizer.
///
/// Carries the offending identifier when one could be read so the
/// orchestrator can name the dropped record in its warning.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlNormalizationError {
    /// The raw record is not a key-value map.
    #[error("raw record is {kind}, expected an object")]
    NotAnObject { kind: String },

    /// The record carries an `id` that cannot be read as a 64-bit integer.
    #[error("identifier {identifier} is not an integer")]
    InvalidIdentifier { identifier: String },
}

impl TlNormalizationError {
    /// Identifier of the offending record, if it had a readable one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            TlNormalizationError::NotAnObject { .. } => None,
            TlNormalizationError::InvalidIdentifier { identifier } => Some(identifier),
        }
    }
}
