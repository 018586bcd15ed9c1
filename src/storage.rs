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

//! # Tally Storage Module
//!
//! Key-addressable blob store seen by the orchestrator. Objects are addressed
//! by `(bucket, key)`; a put replaces any previous object at the same key.
//!
//! - [`TlFsObjectStore`]: buckets are directories under a root path.
//! - [`TlMemoryObjectStore`]: a map, for tests and dry runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TlError};

/// Reference to one object in the blob store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TlObjectRef {
    pub bucket: String,
    pub key: String,
}

impl TlObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        TlObjectRef {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

pub trait TlObjectReader {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

pub trait TlObjectWriter {
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}

/// Filesystem-backed store rooted at a directory.
#[derive(Clone, Debug)]
pub struct TlFsObjectStore {
    root: PathBuf,
}

impl TlFsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        TlFsObjectStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path of an object; rejects keys that escape the bucket.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        let bad_bucket =
            bucket.is_empty() || bucket.contains(['/', '\\']) || matches!(bucket, "." | "..");
        if bad_bucket || key.is_empty() || escapes {
            return Err(TlError::storage(bucket, key, "invalid object location"));
        }
        Ok(self.root.join(bucket).join(relative))
    }
}

impl TlObjectReader for TlFsObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|err| TlError::storage(bucket, key, err.to_string()))
    }
}

impl TlObjectWriter for TlFsObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        let storage_err = |err: std::io::Error| TlError::storage(bucket, key, err.to_string());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }
        // stage next to the target so the rename stays on one filesystem
        let staging = path.with_extension("partial");
        fs::write(&staging, &body).map_err(storage_err)?;
        fs::rename(&staging, &path).map_err(storage_err)?;
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct TlMemoryObjectStore {
    objects: Mutex<BTreeMap<TlObjectRef, Vec<u8>>>,
}

impl TlMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an object.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(TlObjectRef::new(bucket, key), body.into());
        }
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(&TlObjectRef::new(bucket, key)).cloned())
    }

    /// Every stored object reference, in sorted order.
    pub fn refs(&self) -> Vec<TlObjectRef> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TlObjectReader for TlMemoryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.get(bucket, key)
            .ok_or_else(|| TlError::storage(bucket, key, "object not found"))
    }
}

impl TlObjectWriter for TlMemoryObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| TlError::storage(bucket, key, "object map lock poisoned"))?;
        objects.insert(TlObjectRef::new(bucket, key), body);
        Ok(())
    }
}
