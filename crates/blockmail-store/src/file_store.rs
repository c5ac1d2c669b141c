//! The live document as a JSON file.

use std::path::{Path, PathBuf};

use blockmail_core::{Block, DocumentStore, StorageError};
use tracing::{debug, info};

use crate::{read_json, write_json_atomic};

/// Stores the block list as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<Block>>, StorageError> {
        let blocks: Option<Vec<Block>> = read_json(&self.path)?;
        if let Some(blocks) = &blocks {
            info!(path = %self.path.display(), blocks = blocks.len(), "Loaded document");
        }
        Ok(blocks)
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        write_json_atomic(&self.path, blocks)?;
        debug!(path = %self.path.display(), blocks = blocks.len(), "Saved document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockmail_core::BlockKind;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_never_saved_loads_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("document.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("document.json"));
        let blocks = vec![Block::new(BlockKind::Title), Block::new(BlockKind::Footer)];

        store.save(&blocks).unwrap();
        assert_eq!(store.load().unwrap(), Some(blocks));
    }

    #[test]
    fn test_unknown_fields_survive_a_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("document.json");
        let stored = json!([{
            "id": "b_legacy",
            "type": "button",
            "content": { "text": "Go", "tracking": "utm_campaign=spring" },
            "style": { "align": "center", "lineHeight": 1.4 }
        }]);
        std::fs::write(&path, stored.to_string()).unwrap();

        let mut store = JsonFileStore::new(&path);
        let blocks = store.load().unwrap().unwrap();
        store.save(&blocks).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["content"]["tracking"], "utm_campaign=spring");
        assert_eq!(written[0]["style"]["lineHeight"], 1.4);
        assert_eq!(written[0]["type"], "button");
    }

    #[test]
    fn test_unknown_block_type_fails_to_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("document.json");
        std::fs::write(&path, r#"[{"id":"b_1","type":"carousel","content":{}}]"#).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StorageError::Serialization(_))));
    }
}
