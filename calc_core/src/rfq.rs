//! # RFQ Record Store
//!
//! File-backed store for Request-for-Quote records, keyed by a user-chosen
//! reference number. Each record is one JSON file holding a sub-record per
//! calculation type; writing a section merges it into the record with
//! last-write-wins semantics. Saves are atomic (write to `.tmp`, sync,
//! rename) and guarded by an OS-level advisory lock so two processes on a
//! shared drive cannot interleave a read-modify-write.
//!
//! The store owns no calculation state: values that flow between
//! calculations (the backbend yield carryover feeding the straightener
//! utility) are read out of the record by the caller and passed into the
//! next calculation explicitly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_core::rfq::RfqStore;
//! use serde_json::json;
//!
//! let store = RfqStore::new("./outputs");
//! store.upsert("25-1042", "tddbhd", json!({"web_tension_psi": 75.0}))?;
//! let record = store.load("25-1042")?.unwrap();
//! assert!(record.sections.contains_key("tddbhd"));
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};

/// One persisted RFQ record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqRecord {
    /// Stable record id
    pub id: String,
    /// User-chosen reference number
    pub reference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last computed result per calculation-type label
    pub sections: BTreeMap<String, serde_json::Value>,
}

impl RfqRecord {
    fn new(reference: &str) -> Self {
        let now = Utc::now();
        RfqRecord {
            id: Uuid::new_v4().to_string(),
            reference: reference.to_string(),
            created_at: now,
            updated_at: now,
            sections: BTreeMap::new(),
        }
    }
}

/// File-backed RFQ record store.
#[derive(Debug, Clone)]
pub struct RfqStore {
    directory: PathBuf,
}

impl RfqStore {
    /// Create a store rooted at `directory`. The directory is created on
    /// first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        RfqStore {
            directory: directory.into(),
        }
    }

    /// File path for a reference number. Reference characters that don't
    /// belong in a filename are replaced.
    pub fn path_for(&self, reference: &str) -> PathBuf {
        let safe: String = reference
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.directory.join(format!("{safe}.json"))
    }

    /// Load the record for a reference, or `None` if it has never been
    /// written.
    pub fn load(&self, reference: &str) -> CalcResult<Option<RfqRecord>> {
        let path = self.path_for(reference);
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path)
            .map_err(|e| CalcError::store_error("open", path.display().to_string(), e.to_string()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CalcError::store_error("read", path.display().to_string(), e.to_string()))?;

        let record = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("invalid JSON in {}: {}", path.display(), e),
        })?;
        Ok(Some(record))
    }

    /// Merge `value` into the record's section for `label`, creating the
    /// record on first write. Last write wins; no multi-key transaction is
    /// offered.
    pub fn upsert(
        &self,
        reference: &str,
        label: &str,
        value: serde_json::Value,
    ) -> CalcResult<RfqRecord> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            CalcError::store_error(
                "create directory",
                self.directory.display().to_string(),
                e.to_string(),
            )
        })?;

        let path = self.path_for(reference);
        let _lock = StoreLock::acquire(&path)?;

        let mut record = self
            .load(reference)?
            .unwrap_or_else(|| RfqRecord::new(reference));

        let changed = record.sections.get(label) != Some(&value);
        if changed {
            record.sections.insert(label.to_string(), value);
            record.updated_at = Utc::now();
            save_record(&record, &path)?;
        }
        Ok(record)
    }

    /// Delete the record for a reference. Returns whether a record existed.
    pub fn delete(&self, reference: &str) -> CalcResult<bool> {
        let path = self.path_for(reference);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| {
            CalcError::store_error("delete", path.display().to_string(), e.to_string())
        })?;
        Ok(true)
    }
}

/// OS-level advisory lock held for the duration of a read-modify-write.
struct StoreLock {
    lock_path: PathBuf,
    _lock_file: File,
}

impl StoreLock {
    fn acquire(path: &Path) -> CalcResult<Self> {
        let lock_path = path.with_extension("json.lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CalcError::store_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.lock_exclusive().map_err(|e| {
            CalcError::store_error("lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(StoreLock {
            lock_path,
            _lock_file: lock_file,
        })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Write a record with atomic semantics: temp file, fsync, rename.
fn save_record(record: &RfqRecord, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(record).map_err(|e| CalcError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = path.with_extension("json.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::store_error("create temp", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::store_error("write temp", tmp_path.display().to_string(), e.to_string())
    })?;
    tmp_file.sync_all().map_err(|e| {
        CalcError::store_error("sync temp", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::store_error("rename", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> RfqStore {
        let dir = std::env::temp_dir().join(format!("rfq-store-test-{}", Uuid::new_v4()));
        RfqStore::new(dir)
    }

    #[test]
    fn test_missing_record_is_none() {
        let store = temp_store();
        assert!(store.load("25-0001").unwrap().is_none());
    }

    #[test]
    fn test_upsert_creates_then_merges() {
        let store = temp_store();
        let first = store
            .upsert("25-0002", "tddbhd", json!({"web_tension_psi": 75.0}))
            .unwrap();
        assert_eq!(first.reference, "25-0002");

        let second = store
            .upsert("25-0002", "backbend", json!({"percent_material_yielded": 0.6}))
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.sections.len(), 2);

        let loaded = store.load("25-0002").unwrap().unwrap();
        assert_eq!(
            loaded.sections["tddbhd"]["web_tension_psi"],
            json!(75.0)
        );
        let _ = store.delete("25-0002");
    }

    #[test]
    fn test_last_write_wins() {
        let store = temp_store();
        store
            .upsert("25-0003", "tddbhd", json!({"coil_od": 29.0}))
            .unwrap();
        store
            .upsert("25-0003", "tddbhd", json!({"coil_od": 31.0}))
            .unwrap();
        let loaded = store.load("25-0003").unwrap().unwrap();
        assert_eq!(loaded.sections["tddbhd"]["coil_od"], json!(31.0));
        let _ = store.delete("25-0003");
    }

    #[test]
    fn test_delete() {
        let store = temp_store();
        store.upsert("25-0004", "feed", json!({})).unwrap();
        assert!(store.delete("25-0004").unwrap());
        assert!(!store.delete("25-0004").unwrap());
        assert!(store.load("25-0004").unwrap().is_none());
    }

    #[test]
    fn test_reference_sanitized_for_filename() {
        let store = temp_store();
        let path = store.path_for("25/00 5");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, "25_00_5.json");
    }
}
