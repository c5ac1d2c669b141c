//! Storage seams: the live document and the template library.
//!
//! ## Learning: Traits as Seams
//!
//! The session only talks to `dyn DocumentStore` and `dyn TemplateLibrary`.
//! File-backed implementations live in `blockmail-store`; the in-memory ones
//! here are enough for tests and for a throwaway session.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::Block;
use crate::{CoreError, CoreResult};

/// Errors raised by storage collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persists the live document.
pub trait DocumentStore: Send {
    /// Returns the stored blocks, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<Block>>, StorageError>;

    /// Replaces the stored blocks.
    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError>;
}

/// Unique identifier for a saved template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn new() -> Self {
        Self(format!("t_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A named snapshot of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub blocks: Vec<Block>,
    #[serde(rename = "date")]
    pub saved_at: DateTime<Utc>,
}

impl Template {
    /// Builds a template stamped with the current time.
    ///
    /// The name is trimmed; a blank name is rejected.
    pub fn new(name: &str, blocks: Vec<Block>) -> CoreResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Template name cannot be empty"));
        }
        Ok(Self {
            id: TemplateId::new(),
            name: name.to_string(),
            blocks,
            saved_at: Utc::now(),
        })
    }
}

/// A named collection of saved templates.
pub trait TemplateLibrary: Send {
    /// Returns every template, newest first.
    fn list(&self) -> Result<Vec<Template>, StorageError>;

    /// Adds a template.
    fn save(&mut self, template: Template) -> Result<(), StorageError>;

    /// Deletes a template. Returns `false` if it did not exist.
    fn remove(&mut self, id: &TemplateId) -> Result<bool, StorageError>;

    /// Looks a template up by id.
    fn get(&self, id: &TemplateId) -> Result<Option<Template>, StorageError> {
        Ok(self.list()?.into_iter().find(|t| &t.id == id))
    }
}

/// Orders templates newest first.
pub fn sort_newest_first(templates: &mut [Template]) {
    templates.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
}

// ==================== In-memory implementations ====================

#[derive(Debug, Default)]
struct MemoryState {
    blocks: Option<Vec<Block>>,
    saves: usize,
    failing: bool,
}

/// Document store kept in memory.
///
/// Clones share state, so a test can hand one clone to a session and
/// inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a document.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.blocks = Some(blocks);
        }
        store
    }

    /// Makes every following load and save fail.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.failing = failing;
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.state.lock().map(|s| s.saves).unwrap_or(0)
    }

    /// The last saved blocks.
    pub fn stored(&self) -> Option<Vec<Block>> {
        self.state.lock().ok().and_then(|s| s.blocks.clone())
    }

    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut MemoryState) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".to_string()))?;
        if state.failing {
            return Err(StorageError::Unavailable("memory store is failing".to_string()));
        }
        f(&mut state)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<Block>>, StorageError> {
        self.with_state(|state| Ok(state.blocks.clone()))
    }

    fn save(&mut self, blocks: &[Block]) -> Result<(), StorageError> {
        self.with_state(|state| {
            state.blocks = Some(blocks.to_vec());
            state.saves += 1;
            Ok(())
        })
    }
}

/// Template library kept in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateLibrary {
    templates: Arc<Mutex<Vec<Template>>>,
}

impl MemoryTemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Template>>, StorageError> {
        self.templates
            .lock()
            .map_err(|_| StorageError::Unavailable("template library poisoned".to_string()))
    }
}

impl TemplateLibrary for MemoryTemplateLibrary {
    fn list(&self) -> Result<Vec<Template>, StorageError> {
        let mut templates = self.lock()?.clone();
        sort_newest_first(&mut templates);
        Ok(templates)
    }

    fn save(&mut self, template: Template) -> Result<(), StorageError> {
        self.lock()?.push(template);
        Ok(())
    }

    fn remove(&mut self, id: &TemplateId) -> Result<bool, StorageError> {
        let mut templates = self.lock()?;
        let before = templates.len();
        templates.retain(|t| &t.id != id);
        Ok(templates.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use chrono::Duration;

    #[test]
    fn test_template_name_is_required() {
        assert!(matches!(
            Template::new("   ", Vec::new()),
            Err(CoreError::Validation(_))
        ));
        let template = Template::new("  Launch ", Vec::new()).unwrap();
        assert_eq!(template.name, "Launch");
        assert!(template.id.as_str().starts_with("t_"));
    }

    #[test]
    fn test_template_wire_shape() {
        let template = Template::new("Promo", vec![Block::new(BlockKind::Title)]).unwrap();
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(value["name"], "Promo");
        assert!(value["date"].is_string());
        assert_eq!(value["blocks"][0]["type"], "title");
    }

    #[test]
    fn test_memory_store_shares_state() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        assert!(store.load().unwrap().is_none());

        handle.save(&[Block::new(BlockKind::Footer)]).unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.stored().unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store_failure() {
        let mut store = MemoryStore::new();
        store.set_failing(true);
        assert!(matches!(store.save(&[]), Err(StorageError::Unavailable(_))));
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_library_lists_newest_first() {
        let mut library = MemoryTemplateLibrary::new();
        let mut older = Template::new("Older", Vec::new()).unwrap();
        older.saved_at = older.saved_at - Duration::hours(1);
        let newer = Template::new("Newer", Vec::new()).unwrap();

        library.save(older.clone()).unwrap();
        library.save(newer).unwrap();

        let names: Vec<_> = library.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["Newer", "Older"]);

        assert!(library.get(&older.id).unwrap().is_some());
        assert!(library.remove(&older.id).unwrap());
        assert!(!library.remove(&older.id).unwrap());
        assert_eq!(library.list().unwrap().len(), 1);
    }
}
