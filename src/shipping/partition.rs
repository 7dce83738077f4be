//! Day-partitioned durable storage for buffered log lines
//!
//! A partition holds the lines logged on one local calendar day while the
//! shipper was silent. Its id is the configured prefix followed by the date
//! as `YYYY-MM-DD`.

use crate::core::{AnalyticsError, Result};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Id of the partition holding lines logged on `date`
pub fn partition_id(prefix: &str, date: NaiveDate) -> String {
    format!("{}{}", prefix, date.format(DATE_FORMAT))
}

/// Date encoded in a partition id, if the id belongs to `prefix`
pub fn partition_date(prefix: &str, id: &str) -> Option<NaiveDate> {
    let date = id.strip_prefix(prefix)?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Storage for day partitions
///
/// Lines are appended in order and read back in the same order.
pub trait PartitionStore: Send {
    fn append_line(&mut self, id: &str, line: &str) -> Result<()>;

    fn read_lines(&self, id: &str) -> Result<Vec<String>>;

    /// Delete a partition; deleting a missing partition is not an error
    fn delete_partition(&mut self, id: &str) -> Result<()>;

    fn partition_exists(&self, id: &str) -> bool;

    fn list_partitions(&self) -> Result<Vec<String>>;
}

/// Partition store keeping one text file per partition in a directory
pub struct FsPartitionStore {
    directory: PathBuf,
}

impl FsPartitionStore {
    /// Open the store, creating the directory if needed
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(|e| {
            AnalyticsError::storage("creating directory", directory.display().to_string(), e)
        })?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path(&self, id: &str) -> PathBuf {
        self.directory.join(id)
    }
}

impl PartitionStore for FsPartitionStore {
    fn append_line(&mut self, id: &str, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(id))
            .map_err(|e| AnalyticsError::storage("opening", id, e))?;

        writeln!(file, "{}", line).map_err(|e| AnalyticsError::storage("appending to", id, e))
    }

    fn read_lines(&self, id: &str) -> Result<Vec<String>> {
        let file = File::open(self.path(id)).map_err(|e| AnalyticsError::storage("opening", id, e))?;

        BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| AnalyticsError::storage("reading", id, e))
    }

    fn delete_partition(&mut self, id: &str) -> Result<()> {
        match fs::remove_file(self.path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AnalyticsError::storage("deleting", id, e)),
        }
    }

    fn partition_exists(&self, id: &str) -> bool {
        self.path(id).is_file()
    }

    fn list_partitions(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.directory).map_err(|e| {
            AnalyticsError::storage("listing", self.directory.display().to_string(), e)
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AnalyticsError::storage("listing", self.directory.display().to_string(), e)
            })?;
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// In-memory partition store
///
/// Clones share the same partitions, so a handle kept outside the shipper
/// sees what the worker wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryPartitionStore {
    partitions: Arc<Mutex<BTreeMap<String, Vec<String>>>>,
}

impl MemoryPartitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines currently held by a partition
    pub fn lines(&self, id: &str) -> Option<Vec<String>> {
        self.partitions.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.partitions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.lock().is_empty()
    }
}

impl PartitionStore for MemoryPartitionStore {
    fn append_line(&mut self, id: &str, line: &str) -> Result<()> {
        self.partitions
            .lock()
            .entry(id.to_string())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    fn read_lines(&self, id: &str) -> Result<Vec<String>> {
        self.partitions.lock().get(id).cloned().ok_or_else(|| {
            AnalyticsError::storage(
                "reading",
                id,
                std::io::Error::new(ErrorKind::NotFound, "no such partition"),
            )
        })
    }

    fn delete_partition(&mut self, id: &str) -> Result<()> {
        self.partitions.lock().remove(id);
        Ok(())
    }

    fn partition_exists(&self, id: &str) -> bool {
        self.partitions.lock().contains_key(id)
    }

    fn list_partitions(&self) -> Result<Vec<String>> {
        Ok(self.partitions.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_partition_id_round_trip() {
        let id = partition_id("logstash_", date(2024, 3, 9));
        assert_eq!(id, "logstash_2024-03-09");
        assert_eq!(partition_date("logstash_", &id), Some(date(2024, 3, 9)));
        assert_eq!(partition_date("other_", &id), None);
        assert_eq!(partition_date("logstash_", "logstash_notes.txt"), None);
    }

    #[test]
    fn test_append_preserves_order() {
        let dir = TempDir::new().unwrap();
        let mut store = FsPartitionStore::new(dir.path()).unwrap();

        store.append_line("p", "first").unwrap();
        store.append_line("p", "second").unwrap();

        assert!(store.partition_exists("p"));
        assert_eq!(store.read_lines("p").unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let mut store = FsPartitionStore::new(dir.path()).unwrap();

        assert!(store.delete_partition("absent").is_ok());

        store.append_line("p", "x").unwrap();
        store.delete_partition("p").unwrap();
        assert!(!store.partition_exists("p"));
    }

    #[test]
    fn test_read_missing_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = FsPartitionStore::new(dir.path()).unwrap();

        let err = store.read_lines("absent").unwrap_err();
        assert!(matches!(err, AnalyticsError::Storage { .. }));
    }

    #[test]
    fn test_list_partitions_sorted() {
        let dir = TempDir::new().unwrap();
        let mut store = FsPartitionStore::new(dir.path().join("nested")).unwrap();

        store.append_line("b", "x").unwrap();
        store.append_line("a", "x").unwrap();

        assert_eq!(store.list_partitions().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryPartitionStore::new();
        let mut writer = store.clone();

        writer.append_line("p", "one").unwrap();
        writer.append_line("p", "two").unwrap();

        assert_eq!(store.lines("p"), Some(vec!["one".to_string(), "two".to_string()]));
        writer.delete_partition("p").unwrap();
        assert!(store.is_empty());
    }
}
