//! File-backed durable tier
//!
//! Append-only data file plus a JSON index mapping keys to offsets.
//! Each entry carries a CRC32 that is verified on every read.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::durable::DurableTier;
use crate::core::error::{CacheError, Result};

/// How many mutations between index snapshots.
const INDEX_SAVE_INTERVAL: u64 = 128;

/// Location of one value inside the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    offset: u64,
    size: u64,
    crc: u32,
}

/// [`DurableTier`] backed by an append-only file per namespace.
///
/// Values are appended to `<namespace>.dat`; the key index is held in
/// memory and periodically snapshotted to `<namespace>.index.json`. Deleted
/// and overwritten values leave dead bytes in the data file — space is
/// reclaimed only by [`clear`](DurableTier::clear).
pub struct DiskTier {
    directory: PathBuf,
    namespace: String,
    index: HashMap<String, IndexEntry>,
    file: Mutex<File>,
    write_offset: u64,
    mutations: u64,
}

impl DiskTier {
    /// Open a disk tier under `directory`.
    ///
    /// A random 16-char alphanumeric suffix is always appended to the
    /// namespace (`strata_<suffix>` when none is given), so several cache
    /// instances can share one directory without colliding. Collision
    /// avoidance lives here, in the collaborator, not in the cache core.
    pub fn open(directory: impl AsRef<Path>, namespace: Option<&str>) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory)?;

        let namespace = match namespace {
            Some(ns) => format!("{}_{}", ns, namespace_suffix()),
            None => format!("strata_{}", namespace_suffix()),
        };

        let data_path = directory.join(format!("{namespace}.dat"));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&data_path)?;
        let write_offset = file.metadata()?.len();

        info!("Opened disk tier at {:?}", data_path);

        Ok(Self {
            directory,
            namespace,
            index: HashMap::new(),
            file: Mutex::new(file),
            write_offset,
            mutations: 0,
        })
    }

    /// The effective namespace, suffix included.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn index_path(&self) -> PathBuf {
        self.directory.join(format!("{}.index.json", self.namespace))
    }

    fn save_index(&self) -> Result<()> {
        let json = serde_json::to_string(&self.index)
            .map_err(|e| CacheError::Storage(format!("failed to serialize index: {e}")))?;
        fs::write(self.index_path(), json)?;
        Ok(())
    }

    fn read_entry(&self, key: &str, entry: &IndexEntry) -> Result<Vec<u8>> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(entry.offset))?;

        let mut buffer = vec![0u8; entry.size as usize];
        file.read_exact(&mut buffer)?;

        let actual = crc32fast::hash(&buffer);
        if actual != entry.crc {
            warn!("CRC mismatch reading key={key} at offset={}", entry.offset);
            return Err(CacheError::Corruption {
                key: key.to_string(),
                expected: entry.crc,
                actual,
            });
        }

        Ok(buffer)
    }

    fn record_mutation(&mut self) -> Result<()> {
        self.mutations += 1;
        if self.mutations % INDEX_SAVE_INTERVAL == 0 {
            self.save_index()?;
        }
        Ok(())
    }
}

fn namespace_suffix() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

impl DurableTier for DiskTier {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.index.get(key) {
            Some(entry) => Ok(Some(self.read_entry(key, entry)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        debug!("disk set key={}, size={}", key, value.len());

        let crc = crc32fast::hash(&value);
        let offset = self.write_offset;
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&value)?;
            file.flush()?;
        }
        self.write_offset += value.len() as u64;

        self.index.insert(
            key.to_string(),
            IndexEntry {
                offset,
                size: value.len() as u64,
                crc,
            },
        );
        self.record_mutation()
    }

    fn remove(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(entry) = self.index.get(key).cloned() else {
            return Ok(None);
        };

        let value = self.read_entry(key, &entry)?;
        self.index.remove(key);
        self.record_mutation()?;

        // The bytes stay in the data file until clear().
        Ok(Some(value))
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.index.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.index.keys().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.index.len())
    }

    fn clear(&mut self) -> Result<()> {
        info!("Clearing disk tier namespace={}", self.namespace);

        self.index.clear();
        self.write_offset = 0;
        self.mutations = 0;

        self.file.lock().set_len(0)?;
        self.save_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let mut tier = DiskTier::open(dir.path(), None).unwrap();

        tier.set("key1", b"value1".to_vec()).unwrap();
        tier.set("key2", b"value2".to_vec()).unwrap();

        assert_eq!(tier.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(tier.get("key2").unwrap(), Some(b"value2".to_vec()));
        assert_eq!(tier.get("key3").unwrap(), None);
        assert!(tier.contains("key1").unwrap());
        assert_eq!(tier.len().unwrap(), 2);

        assert_eq!(tier.remove("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(tier.remove("key1").unwrap(), None);
        assert!(!tier.contains("key1").unwrap());
    }

    #[test]
    fn test_overwrite_reads_latest() {
        let dir = tempdir().unwrap();
        let mut tier = DiskTier::open(dir.path(), None).unwrap();

        tier.set("key", b"old".to_vec()).unwrap();
        tier.set("key", b"new-and-longer".to_vec()).unwrap();

        assert_eq!(tier.get("key").unwrap(), Some(b"new-and-longer".to_vec()));
        assert_eq!(tier.len().unwrap(), 1);
    }

    #[test]
    fn test_items_skips_nothing_when_stable() {
        let dir = tempdir().unwrap();
        let mut tier = DiskTier::open(dir.path(), None).unwrap();

        tier.set("a", b"1".to_vec()).unwrap();
        tier.set("b", b"2".to_vec()).unwrap();

        let mut items = tier.items().unwrap();
        items.sort();
        assert_eq!(
            items,
            vec![
                ("a".to_string(), b"1".to_vec()),
                ("b".to_string(), b"2".to_vec())
            ]
        );
    }

    #[test]
    fn test_clear_empties_and_reuses() {
        let dir = tempdir().unwrap();
        let mut tier = DiskTier::open(dir.path(), None).unwrap();

        tier.set("a", b"1".to_vec()).unwrap();
        tier.clear().unwrap();

        assert_eq!(tier.len().unwrap(), 0);
        assert_eq!(tier.get("a").unwrap(), None);

        // Still usable after clear.
        tier.set("b", b"2".to_vec()).unwrap();
        assert_eq!(tier.get("b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let dir = tempdir().unwrap();
        let mut first = DiskTier::open(dir.path(), Some("shared")).unwrap();
        let mut second = DiskTier::open(dir.path(), Some("shared")).unwrap();

        assert_ne!(first.namespace(), second.namespace());

        first.set("key", b"first".to_vec()).unwrap();
        second.set("key", b"second".to_vec()).unwrap();

        assert_eq!(first.get("key").unwrap(), Some(b"first".to_vec()));
        assert_eq!(second.get("key").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_corruption_is_detected() {
        let dir = tempdir().unwrap();
        let mut tier = DiskTier::open(dir.path(), None).unwrap();

        tier.set("key", b"payload".to_vec()).unwrap();

        // Scribble over the stored bytes behind the tier's back.
        let data_path = dir.path().join(format!("{}.dat", tier.namespace()));
        let mut file = OpenOptions::new().write(true).open(data_path).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.write_all(b"garbage").unwrap();
        file.flush().unwrap();

        match tier.get("key") {
            Err(CacheError::Corruption { key, .. }) => assert_eq!(key, "key"),
            other => panic!("expected corruption error, got {other:?}"),
        }
    }
}
