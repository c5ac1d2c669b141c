//! # Blockmail Store
//!
//! Everything that leaves the process: the live document and the template
//! library on disk, and submission of finished emails to a remote endpoint.
//!
//! ## Learning: Atomic Writes
//!
//! Writing a file in place leaves a truncated file behind if the process
//! dies halfway. Both file stores write to a sibling temp file first and
//! `rename` it over the target; on the same filesystem a rename is atomic,
//! so readers see either the old contents or the new ones.

pub mod file_store;
pub mod remote;
pub mod templates;

use std::path::{Path, PathBuf};

use blockmail_core::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use file_store::JsonFileStore;
pub use remote::{RemoteSubmitter, SubmissionState, SubmitError, SubmitReceipt};
pub use templates::JsonFileTemplateLibrary;

/// Reads a JSON file, returning `None` when it does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Serializes `value` to `path` through a temp file and a rename.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let temp = temp_path(path);
    std::fs::write(&temp, json)?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let value: Option<Vec<u32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_atomic_write_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        let value: Option<Vec<u32>> = read_json(&path).unwrap();

        assert_eq!(value, Some(vec![1, 2, 3]));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: Result<Option<Vec<u32>>, _> = read_json(&path);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
