//! Table file reads and replacements
//!
//! Every [`JsonTable`](super::JsonTable) lives in one file holding the whole
//! table. A change rewrites the file: the new contents go to a sibling
//! `<name>.tmp` that is synced and then renamed over the table file, so a
//! reader sees either the old table or the new one.
//!
//! A missing or blank table file reads as an empty table.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{WalletError, WalletResult};

fn table_error(action: &str, path: &Path, e: impl std::fmt::Display) -> WalletError {
    WalletError::Storage(format!("Failed to {} table file {}: {}", action, path.display(), e))
}

/// Sibling path the next version of a table file is staged under
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load a table file, falling back to the empty table
pub fn load_table_file<T>(path: &Path) -> WalletResult<T>
where
    T: DeserializeOwned + Default,
{
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(table_error("read", path, e)),
    };

    if text.trim().is_empty() {
        tracing::debug!(path = %path.display(), "blank table file read as empty");
        return Ok(T::default());
    }

    serde_json::from_str(&text).map_err(|e| table_error("parse", path, e))
}

/// Replace a table file with `table`, creating its directory if needed
pub fn store_table_file<T: Serialize>(path: &Path, table: &T) -> WalletResult<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| table_error("create directory for", path, e))?;
    }

    let staged = staging_path(path);
    let file = File::create(&staged).map_err(|e| table_error("stage", path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, table).map_err(|e| table_error("encode", path, e))?;
    writer.flush().map_err(|e| table_error("write", path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| table_error("sync", path, e))?;

    if let Err(e) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(table_error("replace", path, e));
    }

    tracing::trace!(path = %path.display(), "table file replaced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize, Default)]
    struct Rows {
        records: Vec<String>,
    }

    fn rows(names: &[&str]) -> Rows {
        Rows {
            records: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_missing_or_blank_file_is_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("accounts.json");
        assert_eq!(load_table_file::<Rows>(&path).unwrap(), Rows::default());

        fs::write(&path, "  \n").unwrap();
        assert_eq!(load_table_file::<Rows>(&path).unwrap(), Rows::default());
    }

    #[test]
    fn test_store_replaces_whole_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("tags.json");

        store_table_file(&path, &rows(&["trip", "food"])).unwrap();
        store_table_file(&path, &rows(&["trip"])).unwrap();

        assert_eq!(load_table_file::<Rows>(&path).unwrap(), rows(&["trip"]));
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_staging_path_keeps_extension() {
        let path = Path::new("/data/exchange_rates.json");
        assert_eq!(staging_path(path), Path::new("/data/exchange_rates.json.tmp"));
    }

    #[test]
    fn test_corrupt_table_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        fs::write(&path, "not json at all").unwrap();

        match load_table_file::<Rows>(&path) {
            Err(WalletError::Storage(msg)) => {
                assert!(msg.contains("parse table file"));
                assert!(msg.contains("categories.json"));
            }
            other => panic!("expected storage error, got {:?}", other),
        }
    }
}
