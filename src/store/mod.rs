//! Remote storage of backup archives.
//!
//! # Layers
//!
//! | Type                 | Responsibility                                  |
//! |----------------------|-------------------------------------------------|
//! | [`ObjectStore`]      | Raw key-level list/put/get/delete               |
//! | [`s3::S3Store`]      | `ObjectStore` backed by an S3 bucket            |
//! | [`BackupStore`]      | Backup naming convention on top of any store    |
//!
//! # Key layout
//!
//! ```text
//! {prefix}/{backup id}__jenkins-backup.tar.gz
//! ```
//!
//! This is the only persistent format the tool has.  Existing buckets are
//! full of keys in this shape, so it must never change.

pub mod s3;

#[cfg(test)]
pub mod memory;

use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{backup_id::BackupId, ui::Reporter};

/// Marks an object as a Jenkins backup archive.
pub const KEY_SUFFIX: &str = "__jenkins-backup.tar.gz";

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing objects in bucket '{bucket}' failed: {reason}")]
    List { bucket: String, reason: String },

    #[error("uploading '{key}' failed: {reason}")]
    Upload { key: String, reason: String },

    #[error("backup object '{key}' does not exist")]
    NotFound { key: String },

    #[error("downloading '{key}' failed: {reason}")]
    Download { key: String, reason: String },

    #[error("deleting '{key}' failed: {reason}")]
    Delete { key: String, reason: String },

    #[error("local file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not start the storage client runtime")]
    Runtime(#[source] io::Error),
}

// ─── Capability ───────────────────────────────────────────────────────────────

/// Key-level access to a bucket.
///
/// Implementations make exactly one remote attempt per call.  Deleting a key
/// that does not exist succeeds.
pub trait ObjectStore {
    /// Every key starting with `prefix`, in no particular order.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    fn put_file(&self, key: &str, source: &Path) -> Result<(), StoreError>;

    /// Download `key` into `dest`, overwriting it.
    fn get_file(&self, key: &str, dest: &Path) -> Result<(), StoreError>;

    fn delete_key(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_keys(prefix)
    }

    fn put_file(&self, key: &str, source: &Path) -> Result<(), StoreError> {
        (**self).put_file(key, source)
    }

    fn get_file(&self, key: &str, dest: &Path) -> Result<(), StoreError> {
        (**self).get_file(key, dest)
    }

    fn delete_key(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete_key(key)
    }
}

// ─── Naming convention ────────────────────────────────────────────────────────

/// Object key for backup `id` under `prefix`.
pub fn encode_key(prefix: &str, id: &BackupId) -> String {
    format!("{prefix}/{id}{KEY_SUFFIX}")
}

/// Inverse of [`encode_key`].
///
/// Returns `None` for anything that is not exactly
/// `{prefix}/{backup id}{KEY_SUFFIX}`: foreign objects, keys in nested
/// "folders", and names whose id part is not timestamp-shaped.
pub fn decode_key(prefix: &str, key: &str) -> Option<BackupId> {
    let name = key.strip_prefix(prefix)?.strip_prefix('/')?;
    let id = name.strip_suffix(KEY_SUFFIX)?;
    if id.contains('/') {
        return None;
    }
    id.parse().ok()
}

// ─── BackupStore ──────────────────────────────────────────────────────────────

/// Named backup archives under one key prefix of a bucket.
pub struct BackupStore<S> {
    store: S,
    bucket: String,
    prefix: String,
    log: Reporter,
}

impl<S: ObjectStore> BackupStore<S> {
    pub fn new(store: S, bucket: &str, prefix: &str, log: Reporter) -> Self {
        log.debug(format!("Using backup store {bucket}/{prefix}"));
        Self {
            store,
            bucket: bucket.to_owned(),
            prefix: prefix.to_owned(),
            log,
        }
    }

    /// `bucket/prefix`, for status lines.
    pub fn location(&self) -> String {
        format!("{}/{}", self.bucket, self.prefix)
    }

    pub fn key(&self, id: &BackupId) -> String {
        encode_key(&self.prefix, id)
    }

    /// All backups, latest first.
    pub fn list(&self) -> Result<Vec<BackupId>, StoreError> {
        self.log
            .debug(format!("Fetching objects from {}...", self.bucket));
        let keys = self.store.list_keys(&format!("{}/", self.prefix))?;
        self.log
            .debug(format!("Fetched {} object(s) from {}", keys.len(), self.bucket));

        let mut backups: Vec<BackupId> = keys
            .iter()
            .filter_map(|key| {
                let decoded = decode_key(&self.prefix, key);
                if decoded.is_none() && key.ends_with(KEY_SUFFIX) {
                    self.log.debug(format!("Skipping unrecognised backup key {key}"));
                }
                decoded
            })
            .collect();
        backups.sort_unstable_by(|a, b| b.cmp(a));
        backups.dedup();
        Ok(backups)
    }

    /// Most recent backup, if any.
    pub fn latest(&self) -> Result<Option<BackupId>, StoreError> {
        Ok(self.list()?.into_iter().next())
    }

    pub fn put(&self, source: &Path, id: &BackupId) -> Result<(), StoreError> {
        let key = self.key(id);
        self.log.debug(format!("Uploading {} to {key}", source.display()));
        self.store.put_file(&key, source)
    }

    pub fn get(&self, id: &BackupId, dest: &Path) -> Result<(), StoreError> {
        let key = self.key(id);
        self.log.debug(format!("Fetching {key} into {}", dest.display()));
        self.store.get_file(&key, dest)
    }

    pub fn delete(&self, id: &BackupId) -> Result<(), StoreError> {
        let key = self.key(id);
        self.log.debug(format!("Deleting object {key}"));
        self.store.delete_key(&key)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
