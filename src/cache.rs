use std::fs;
use std::path::{Path, PathBuf};

use crate::data::NavSlice;
use crate::error::Result;

/// Where NAV history comes from relative to the cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Read the cache when present, fetch and store otherwise.
    Prefer,
    /// Always fetch and overwrite the cache.
    Refresh,
    /// Never touch the network; a missing cache file is an error.
    Offline,
}

/// Cache file path for a fund code inside `dir`.
pub fn nav_cache_path(dir: &Path, fund_code: &str) -> PathBuf {
    dir.join(format!("fund_nav_{}.csv", fund_code))
}

/// Reads cached NAV records. Rows come back in file order; callers go
/// through [`crate::Fund::from_records`] which sorts anyway.
pub fn load(path: &Path) -> Result<Vec<NavSlice>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Writes NAV records to `path`, creating the parent directory.
pub fn store(path: &Path, records: &[NavSlice]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = nav_cache_path(dir.path(), "017437");
        let records = vec![
            NavSlice {
                date: NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
                nav: 1.0123,
            },
            NavSlice {
                date: NaiveDate::from_ymd_opt(2023, 1, 4).unwrap(),
                nav: 1.0234,
            },
        ];
        store(&path, &records).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_store_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = nav_cache_path(&dir.path().join("nested"), "000001");
        store(&path, &[]).unwrap();
        assert!(path.exists());
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&nav_cache_path(dir.path(), "none")).is_err());
    }
}
