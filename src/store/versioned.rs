//! Versioned key-value store.
//!
//! Single storage backend behind the `open`/`get`/`set`/`close` contract the
//! state machine and engines depend on: an append-only change log replayed
//! into an in-memory index on open. Every accepted write bumps the store
//! revision, and the whole index can be captured as a serializable snapshot
//! for later consensus integration.
//!
//! A lock file makes the handle exclusive per path: the second opener fails
//! with `StoreUnavailable` until the first handle is closed.

use crate::core::error::{StrataError, StrataResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Change log file name inside the store directory.
const LOG_FILE: &str = "store.log";

/// Lock file name inside the store directory.
const LOCK_FILE: &str = "store.lock";

/// A single durable change record, appended to the change log on every
/// accepted `set`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRecord {
    /// The key (byte string).
    pub key: Vec<u8>,
    /// The value (byte string).
    pub value: Vec<u8>,
    /// Store revision assigned to this write.
    pub revision: u64,
}

impl ValueRecord {
    /// Serialize this record to bytes.
    pub fn serialize(&self) -> StrataResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| StrataError::store_unavailable(format!("failed to encode record: {}", e)))
    }

    /// Deserialize a record from bytes.
    pub fn deserialize(bytes: &[u8]) -> StrataResult<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| StrataError::store_unavailable(format!("failed to decode record: {}", e)))
    }
}

/// Serializable capture of store state at a single revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Store revision at capture time.
    pub revision: u64,
    /// All live key-value pairs, in key order.
    pub records: Vec<(Vec<u8>, Vec<u8>)>,
}

/// Versioned key-value store over an append-only change log.
pub struct VersionedStore {
    /// Store directory path.
    dir: PathBuf,

    /// In-memory index: key → current value.
    index: BTreeMap<Vec<u8>, Vec<u8>>,

    /// Revision of the last accepted write.
    revision: u64,

    /// Open log writer. `None` once the store is closed.
    writer: Option<BufWriter<File>>,

    /// Lock file path, removed on close.
    lock_path: PathBuf,
}

impl VersionedStore {
    /// Open a store at the given directory, creating it if absent.
    ///
    /// Replays the change log into the index and acquires the exclusive
    /// path lock. Fails with `StoreUnavailable` when another handle holds
    /// the lock.
    pub fn open(path: impl AsRef<Path>) -> StrataResult<Self> {
        let dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StrataError::store_unavailable(format!(
                "failed to create store directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let lock_path = dir.join(LOCK_FILE);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StrataError::store_unavailable(format!(
                    "store path {} is locked by another opener",
                    dir.display()
                )));
            }
            Err(e) => {
                return Err(StrataError::store_unavailable(format!(
                    "failed to acquire store lock {}: {}",
                    lock_path.display(),
                    e
                )));
            }
        }

        // The lock must not outlive a failed open.
        match Self::open_locked(dir, lock_path.clone()) {
            Ok(store) => Ok(store),
            Err(err) => {
                let _ = std::fs::remove_file(&lock_path);
                Err(err)
            }
        }
    }

    fn open_locked(dir: PathBuf, lock_path: PathBuf) -> StrataResult<Self> {
        let log_path = dir.join(LOG_FILE);
        let (index, revision) = Self::replay(&log_path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| {
                StrataError::store_unavailable(format!(
                    "failed to open change log {}: {}",
                    log_path.display(),
                    e
                ))
            })?;

        tracing::debug!(
            dir = %dir.display(),
            revision,
            keys = index.len(),
            "store opened"
        );

        Ok(Self {
            dir,
            index,
            revision,
            writer: Some(BufWriter::new(file)),
            lock_path,
        })
    }

    /// Replay the change log into a fresh index.
    fn replay(log_path: &Path) -> StrataResult<(BTreeMap<Vec<u8>, Vec<u8>>, u64)> {
        let mut index = BTreeMap::new();
        let mut revision = 0u64;

        let file = match File::open(log_path) {
            Ok(f) => f,
            // No log yet: fresh store.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((index, revision)),
            Err(e) => {
                return Err(StrataError::store_unavailable(format!(
                    "failed to open change log {}: {}",
                    log_path.display(),
                    e
                )));
            }
        };

        let mut reader = BufReader::new(file);
        let mut len_buf = [0u8; 4];

        loop {
            match reader.read_exact(&mut len_buf) {
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    return Err(StrataError::store_unavailable(format!(
                        "failed to read record length: {}",
                        e
                    )));
                }
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            let mut record_buf = vec![0u8; len];
            reader.read_exact(&mut record_buf).map_err(|e| {
                StrataError::store_unavailable(format!("failed to read record data: {}", e))
            })?;

            let record = ValueRecord::deserialize(&record_buf)?;
            revision = record.revision;
            index.insert(record.key, record.value);
        }

        Ok((index, revision))
    }

    /// Get the store directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the revision of the last accepted write.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Get the number of keys in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check whether the store is open.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Get a key's current value, or `None` when the key is absent.
    pub fn get(&self, key: &[u8]) -> StrataResult<Option<Vec<u8>>> {
        if self.writer.is_none() {
            return Err(StrataError::store_unavailable("store is closed"));
        }
        Ok(self.index.get(key).cloned())
    }

    /// Set a key to a value.
    ///
    /// The record is made durable before the index is updated, so a write
    /// that returns success is immediately visible to `get` on this handle
    /// and survives a reopen.
    pub fn set(&mut self, key: Vec<u8>, value: Vec<u8>) -> StrataResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| StrataError::store_unavailable("store is closed"))?;

        let record = ValueRecord {
            key,
            value,
            revision: self.revision + 1,
        };
        let bytes = record.serialize()?;

        // Length-prefixed framing, flushed per write.
        let len = bytes.len() as u32;
        writer.write_all(&len.to_le_bytes()).map_err(|e| {
            StrataError::store_unavailable(format!("failed to write record length: {}", e))
        })?;
        writer.write_all(&bytes).map_err(|e| {
            StrataError::store_unavailable(format!("failed to write record data: {}", e))
        })?;
        writer
            .flush()
            .map_err(|e| StrataError::store_unavailable(format!("failed to flush log: {}", e)))?;

        self.revision = record.revision;
        self.index.insert(record.key, record.value);
        Ok(())
    }

    /// Iterate over live key-value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
        self.index
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Capture the current state as a serializable snapshot.
    pub fn snapshot(&self) -> StrataResult<StoreSnapshot> {
        if self.writer.is_none() {
            return Err(StrataError::store_unavailable("store is closed"));
        }
        Ok(StoreSnapshot {
            revision: self.revision,
            records: self
                .index
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    /// Close the store, flushing the log and releasing the path lock.
    ///
    /// Operations on a closed store fail with `StoreUnavailable`.
    pub fn close(&mut self) -> StrataResult<()> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| StrataError::store_unavailable("store is closed"))?;

        // The lock is released even when the final flush fails.
        let flushed = writer.flush();
        drop(writer);
        let unlocked = std::fs::remove_file(&self.lock_path);

        flushed
            .map_err(|e| StrataError::store_unavailable(format!("failed to flush log: {}", e)))?;
        unlocked.map_err(|e| {
            StrataError::store_unavailable(format!(
                "failed to release store lock {}: {}",
                self.lock_path.display(),
                e
            ))
        })?;

        tracing::debug!(dir = %self.dir.display(), revision = self.revision, "store closed");
        Ok(())
    }
}

impl Drop for VersionedStore {
    fn drop(&mut self) {
        // The lock must not outlive the handle, even on an unclean exit.
        if self.writer.take().is_some() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
