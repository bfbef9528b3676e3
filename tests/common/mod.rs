use file2prompt::{ConversionStore, FsStore, MemoryStore};

pub fn jst() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(9 * 3600).unwrap()
}

/// Every backend under test, each paired with the directory keeping it alive.
pub fn stores() -> Vec<(Box<dyn ConversionStore>, Option<tempfile::TempDir>)> {
    let dir = tempfile::tempdir().unwrap();
    let fs_store = FsStore::open(dir.path().join("data").join("exports"), jst()).unwrap();
    let fs_store: Box<dyn ConversionStore> = Box::new(fs_store);
    let memory_store: Box<dyn ConversionStore> = Box::new(MemoryStore::new(jst()));
    vec![(fs_store, Some(dir)), (memory_store, None)]
}

pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
