//! Saved templates as a single JSON file.
//!
//! The file holds a JSON array of `{id, name, blocks, date}` records. Every
//! operation reads the file fresh, so two sessions sharing a library see
//! each other's templates.

use std::path::{Path, PathBuf};

use blockmail_core::storage::sort_newest_first;
use blockmail_core::{StorageError, Template, TemplateId, TemplateLibrary};
use tracing::info;

use crate::{read_json, write_json_atomic};

#[derive(Debug, Clone)]
pub struct JsonFileTemplateLibrary {
    path: PathBuf,
}

impl JsonFileTemplateLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Template>, StorageError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }
}

impl TemplateLibrary for JsonFileTemplateLibrary {
    fn list(&self) -> Result<Vec<Template>, StorageError> {
        let mut templates = self.read_all()?;
        sort_newest_first(&mut templates);
        Ok(templates)
    }

    fn save(&mut self, template: Template) -> Result<(), StorageError> {
        let mut templates = self.read_all()?;
        info!(id = %template.id, name = %template.name, "Saving template");
        templates.push(template);
        write_json_atomic(&self.path, &templates)
    }

    fn remove(&mut self, id: &TemplateId) -> Result<bool, StorageError> {
        let mut templates = self.read_all()?;
        let before = templates.len();
        templates.retain(|t| &t.id != id);
        if templates.len() == before {
            return Ok(false);
        }
        write_json_atomic(&self.path, &templates)?;
        info!(%id, "Removed template");
        Ok(true)
    }
}
