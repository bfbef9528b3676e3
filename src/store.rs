use std::collections::BTreeMap;
use std::io::Write;

use crate::record::{ConversionRecord, ConversionSummary};

const RECORD_SUFFIX: &str = ".json";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Encode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "storage error: {}", e),
            Self::Encode(message) => write!(f, "could not encode record: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for std::io::Error {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Io(e) => e,
            StoreError::Encode(message) => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, message)
            }
        }
    }
}

/// Saved conversions. Records are immutable once saved.
///
/// Lookups match the first record whose id starts with the given id, so a
/// unique prefix is enough. Missing or malformed records read as `None`.
pub trait ConversionStore {
    fn save(
        &self,
        content: &str,
        original_files: &[String],
    ) -> Result<ConversionSummary, StoreError>;

    /// Newest first.
    fn list_history(&self) -> Result<Vec<ConversionSummary>, StoreError>;

    fn get_record(&self, id: &str) -> Option<ConversionRecord>;

    fn get_original_file_content(&self, id: &str, filename: &str) -> Option<String> {
        self.get_record(id)?
            .original_file_content(filename)
            .map(str::to_owned)
    }

    fn delete_record(&self, id: &str) -> bool;

    /// Best effort: stops at the first failure without restoring anything.
    fn delete_all(&self) -> bool;
}

fn now_in(utc_offset: &chrono::FixedOffset) -> chrono::DateTime<chrono::FixedOffset> {
    chrono::Utc::now().with_timezone(utc_offset)
}

fn matches_id(key: &str, id: &str) -> bool {
    !id.is_empty() && key.starts_with(id)
}

/// One JSON document per record, named `<id>.json`, in a single directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: std::path::PathBuf,
    utc_offset: chrono::FixedOffset,
}

impl FsStore {
    /// Open (creating if needed) the record directory.
    pub fn open(
        dir: impl Into<std::path::PathBuf>,
        utc_offset: chrono::FixedOffset,
    ) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, utc_offset })
    }

    /// Names of `*.json` entries in ascending order. Any entry type counts,
    /// so a stray directory named like a record makes removal fail.
    fn record_names(&self) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let Ok(name) = entry?.file_name().into_string() else {
                continue;
            };
            if name.ends_with(RECORD_SUFFIX) {
                names.push(name);
            }
        }
        names.sort_unstable();
        Ok(names)
    }

    fn find_record_name(&self, id: &str) -> Option<String> {
        match self.record_names() {
            Ok(names) => names.into_iter().find(|name| matches_id(name, id)),
            Err(e) => {
                log::warn!("cannot list {:?}: {}", self.dir, e);
                None
            }
        }
    }

    fn read_record(&self, name: &str) -> Option<ConversionRecord> {
        let path = self.dir.join(name);
        let document = match std::fs::read_to_string(&path) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("skipping {:?}: {}", path, e);
                return None;
            }
        };
        let record = ConversionRecord::from_json(&document);
        if record.is_none() {
            log::warn!("skipping malformed record {:?}", path);
        }
        record
    }

    fn write_record(&self, record: &ConversionRecord) -> Result<(), StoreError> {
        let document = record.to_json().map_err(StoreError::Encode)?;
        // write beside the target and rename so readers never see a partial record
        let mut staged = tempfile::NamedTempFile::new_in(&self.dir)?;
        staged.write_all(document.as_bytes())?;
        staged.as_file().sync_all()?;
        let target = self.dir.join(format!("{}{}", record.id, RECORD_SUFFIX));
        staged.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ConversionStore for FsStore {
    fn save(
        &self,
        content: &str,
        original_files: &[String],
    ) -> Result<ConversionSummary, StoreError> {
        let record = ConversionRecord::new(
            &now_in(&self.utc_offset),
            content.to_owned(),
            original_files.to_vec(),
        );
        self.write_record(&record)?;
        log::debug!("saved {} ({} files)", record.id, record.file_count);
        Ok(record.summary())
    }

    fn list_history(&self) -> Result<Vec<ConversionSummary>, StoreError> {
        Ok(self
            .record_names()?
            .iter()
            .rev()
            .filter_map(|name| self.read_record(name))
            .map(|record| record.summary())
            .collect())
    }

    fn get_record(&self, id: &str) -> Option<ConversionRecord> {
        self.read_record(&self.find_record_name(id)?)
    }

    fn delete_record(&self, id: &str) -> bool {
        let Some(name) = self.find_record_name(id) else {
            return false;
        };
        match std::fs::remove_file(self.dir.join(&name)) {
            Ok(()) => {
                log::debug!("deleted {}", name);
                true
            }
            Err(e) => {
                log::warn!("cannot delete {}: {}", name, e);
                false
            }
        }
    }

    fn delete_all(&self) -> bool {
        let names = match self.record_names() {
            Ok(names) => names,
            Err(e) => {
                log::warn!("cannot list {:?}: {}", self.dir, e);
                return false;
            }
        };
        for name in names {
            if let Err(e) = std::fs::remove_file(self.dir.join(&name)) {
                log::warn!("cannot delete {}: {}", name, e);
                return false;
            }
        }
        true
    }
}

/// Records kept in process memory, ordered by id.
#[derive(Debug)]
pub struct MemoryStore {
    records: std::sync::Mutex<BTreeMap<String, ConversionRecord>>,
    utc_offset: chrono::FixedOffset,
}

impl MemoryStore {
    pub fn new(utc_offset: chrono::FixedOffset) -> Self {
        Self {
            records: std::sync::Mutex::new(BTreeMap::new()),
            utc_offset,
        }
    }

    fn records(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ConversionRecord>> {
        // map operations are atomic, so a poisoned map is still consistent
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn find_key(records: &BTreeMap<String, ConversionRecord>, id: &str) -> Option<String> {
        records.keys().find(|key| matches_id(key, id)).cloned()
    }
}

impl ConversionStore for MemoryStore {
    fn save(
        &self,
        content: &str,
        original_files: &[String],
    ) -> Result<ConversionSummary, StoreError> {
        let record = ConversionRecord::new(
            &now_in(&self.utc_offset),
            content.to_owned(),
            original_files.to_vec(),
        );
        let summary = record.summary();
        self.records().insert(record.id.clone(), record);
        Ok(summary)
    }

    fn list_history(&self) -> Result<Vec<ConversionSummary>, StoreError> {
        Ok(self
            .records()
            .values()
            .rev()
            .map(ConversionRecord::summary)
            .collect())
    }

    fn get_record(&self, id: &str) -> Option<ConversionRecord> {
        let records = self.records();
        let key = Self::find_key(&records, id)?;
        records.get(&key).cloned()
    }

    fn delete_record(&self, id: &str) -> bool {
        let mut records = self.records();
        match Self::find_key(&records, id) {
            Some(key) => records.remove(&key).is_some(),
            None => false,
        }
    }

    fn delete_all(&self) -> bool {
        self.records().clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jst() -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn prefix_lookup() {
        assert!(matches_id("20240101_000000_abcdef01.json", "20240101_000000_abcdef01"));
        assert!(matches_id("20240101_000000_abcdef01.json", "20240101"));
        assert!(!matches_id("20240101_000000_abcdef01.json", ""));
        assert!(!matches_id("20240101_000000_abcdef01.json", "2025"));
    }

    #[test]
    fn temp_files_are_not_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path(), jst()).unwrap();
        std::fs::write(dir.path().join(".tmpXYZ"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        assert!(store.record_names().unwrap().is_empty());
        assert!(store.delete_all());
        assert!(dir.path().join("notes.txt").exists());

        std::fs::create_dir(dir.path().join("folder.json")).unwrap();
        assert_eq!(store.record_names().unwrap(), vec!["folder.json".to_string()]);
        assert!(store.list_history().unwrap().is_empty());
    }

    #[test]
    fn timestamp_uses_configured_offset() {
        let store = MemoryStore::new(chrono::FixedOffset::west_opt(5 * 3600).unwrap());
        let summary = store.save("", &[]).unwrap();
        assert!(summary.timestamp.ends_with("-05:00"), "{}", summary.timestamp);
        assert_eq!(summary.file_count, 0);
    }

    #[test]
    fn store_error_converts_to_io() {
        let e: std::io::Error = StoreError::Encode("bad".to_string()).into();
        assert_eq!(e.kind(), std::io::ErrorKind::InvalidData);
    }
}
