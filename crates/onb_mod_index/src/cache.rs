//! Status cache persistence.
//!
//! The cache remembers, per attachment ID, the timestamp the archive had when it
//! was last hashed and the resulting MD5. It is serialized to
//! `status_cache.json`:
//!
//! ```json
//! {
//!   "1337": {
//!     "timestamp": 1700000000,
//!     "md5": "9e107d9d372bb6826bd81d3542a419d6",
//!     "id": "com.example.megaman"
//!   }
//! }
//! ```
//!
//! Records are only ever added or overwritten, never removed, so hashes of mods
//! that temporarily fail to download survive until the next successful refresh.
//! Records keep the order they had in the file; new attachments are appended.

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// What was known about an attachment after its last successful download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Remote timestamp at the time of hashing.
    #[serde(default)]
    pub timestamp: Value,

    /// Lower-case hex MD5 of the archive. Empty when unknown.
    #[serde(default)]
    pub md5: String,

    /// Mod identifier as it appeared in the catalog.
    #[serde(default)]
    pub id: Value,
}

impl CacheRecord {
    /// The stored hash, if there is one.
    pub fn hash(&self) -> Option<&str> {
        (!self.md5.is_empty()).then_some(self.md5.as_str())
    }

    /// A record with neither a hash nor a timestamp, such as `{}`.
    pub fn is_blank(&self) -> bool {
        self.md5.is_empty() && self.timestamp.is_null()
    }
}

/// Attachment ID -> [`CacheRecord`] map with change tracking.
#[derive(Debug, Default)]
pub struct StatusCache {
    records: Vec<(String, CacheRecord)>,
    index: HashMap<String, usize>,
    dirty: bool,
}

impl StatusCache {
    /// Load the cache from a file.
    ///
    /// Returns an empty cache if the file doesn't exist, [`Error::CacheRead`]
    /// if it exists but cannot be read and [`Error::InvalidCacheFile`] if it is
    /// not a valid cache.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.as_std_path().exists() {
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(path.as_std_path()).map_err(|source| Error::CacheRead {
                path: path.to_path_buf(),
                source,
            })?;
        let invalid = |source: serde_json::Error| Error::InvalidCacheFile {
            path: path.to_path_buf(),
            source,
        };

        let raw: Map<String, Value> = serde_json::from_str(&contents).map_err(invalid)?;
        let mut cache = Self::default();
        for (attachment_id, value) in raw {
            let record = serde_json::from_value(value).map_err(invalid)?;
            cache.insert(attachment_id, record);
        }
        Ok(cache)
    }

    /// Save the cache to a file, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent.as_std_path())?;
            }
        }

        let mut document = Map::with_capacity(self.records.len());
        for (attachment_id, record) in &self.records {
            document.insert(attachment_id.clone(), serde_json::to_value(record)?);
        }
        let contents = serde_json::to_string_pretty(&document)?;
        std::fs::write(path.as_std_path(), contents)?;
        Ok(())
    }

    pub fn get(&self, attachment_id: &str) -> Option<&CacheRecord> {
        self.index
            .get(attachment_id)
            .map(|&slot| &self.records[slot].1)
    }

    /// Insert or overwrite the record for an attachment and mark the cache as changed.
    pub fn update(&mut self, attachment_id: impl Into<String>, record: CacheRecord) {
        self.insert(attachment_id.into(), record);
        self.dirty = true;
    }

    /// Whether any record changed since the cache was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, attachment_id: String, record: CacheRecord) {
        match self.index.get(&attachment_id) {
            Some(&slot) => self.records[slot].1 = record,
            None => {
                self.index.insert(attachment_id.clone(), self.records.len());
                self.records.push((attachment_id, record));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(timestamp: &str, md5: &str, id: &str) -> CacheRecord {
        CacheRecord {
            timestamp: json!(timestamp),
            md5: md5.to_string(),
            id: json!(id),
        }
    }

    #[test]
    fn test_update_marks_dirty() {
        let mut cache = StatusCache::default();
        assert!(!cache.is_dirty());
        assert!(cache.is_empty());

        cache.update("a1", record("t1", "abc", "p1"));
        assert!(cache.is_dirty());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a1").unwrap().hash(), Some("abc"));
    }

    #[test]
    fn test_update_overwrites() {
        let mut cache = StatusCache::default();
        cache.update("a1", record("t1", "abc", "p1"));
        cache.update("a1", record("t2", "def", "p1"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a1").unwrap(), &record("t2", "def", "p1"));
    }

    #[test]
    fn test_empty_md5_is_no_hash() {
        assert_eq!(record("t1", "", "p1").hash(), None);
    }

    #[test]
    fn test_save_and_load() {
        let temp = NamedTempFile::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap();

        let mut cache = StatusCache::default();
        cache.update("a1", record("t1", "abc", "p1"));
        cache.save(path).unwrap();

        let loaded = StatusCache::load(path).unwrap();
        assert!(!loaded.is_dirty());
        assert_eq!(loaded.get("a1"), Some(&record("t1", "abc", "p1")));
    }

    #[test]
    fn test_serialization_format() {
        let temp = NamedTempFile::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap();

        let mut cache = StatusCache::default();
        cache.update("a1", record("t1", "abc", "p1"));
        cache.save(path).unwrap();

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({ "a1": { "timestamp": "t1", "md5": "abc", "id": "p1" } })
        );
    }

    #[test]
    fn test_load_nonexistent() {
        let temp = NamedTempFile::new().unwrap();
        let std_path = temp.path().with_extension("nonexistent");
        let path = Utf8Path::from_path(&std_path).unwrap();

        let loaded = StatusCache::load(path).unwrap();
        assert!(loaded.is_empty());
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_load_partial_records() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(br#"{ "a1": { "id": 5 } }"#).unwrap();
        temp.flush().unwrap();

        let path = Utf8Path::from_path(temp.path()).unwrap();
        let loaded = StatusCache::load(path).unwrap();
        let rec = loaded.get("a1").unwrap();
        assert!(rec.timestamp.is_null());
        assert_eq!(rec.hash(), None);
        assert_eq!(rec.id, json!(5));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"{ invalid json }").unwrap();
        temp.flush().unwrap();

        let path = Utf8Path::from_path(temp.path()).unwrap();
        let result = StatusCache::load(path);
        assert!(matches!(result, Err(Error::InvalidCacheFile { .. })));
    }

    #[test]
    fn test_load_non_utf8_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"\xff\xfe").unwrap();
        temp.flush().unwrap();

        let path = Utf8Path::from_path(temp.path()).unwrap();
        match StatusCache::load(path) {
            Err(Error::CacheRead { path: reported, .. }) => {
                assert_eq!(reported.as_path(), path)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap();

        let result = StatusCache::load(path);
        assert!(matches!(result, Err(Error::CacheRead { .. })));
    }

    #[test]
    fn test_save_keeps_file_order() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"{ "b2": { "timestamp": 1, "md5": "x", "id": "p2" },
                  "a1": { "timestamp": 1, "md5": "y", "id": "p1" } }"#,
        )
        .unwrap();
        temp.flush().unwrap();
        let path = Utf8Path::from_path(temp.path()).unwrap();

        let mut cache = StatusCache::load(path).unwrap();
        cache.update("a1", record("t2", "z", "p1"));
        cache.update("0new", record("t1", "w", "p3"));
        cache.save(path).unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        let b2 = written.find("\"b2\"").unwrap();
        let a1 = written.find("\"a1\"").unwrap();
        let new = written.find("\"0new\"").unwrap();
        assert!(b2 < a1 && a1 < new, "unexpected order:\n{written}");
        assert_eq!(cache.get("a1"), Some(&record("t2", "z", "p1")));
    }

    #[test]
    fn test_blank_record() {
        assert!(CacheRecord {
            timestamp: Value::Null,
            md5: String::new(),
            id: json!("p1"),
        }
        .is_blank());
        assert!(!record("t1", "", "p1").is_blank());
        assert!(!CacheRecord {
            timestamp: Value::Null,
            md5: "abc".to_string(),
            id: Value::Null,
        }
        .is_blank());
    }
}
