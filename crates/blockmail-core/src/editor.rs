//! Editing session orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. External code only needs to interact with
//! `Editor`, not individual components.
//!
//! Every successful edit follows the same path:
//!
//! ```text
//! Document mutation -> History::commit -> save (now or debounced) -> events
//! ```
//!
//! Structural edits (add, delete, move, paste, clear, template load) are
//! written to storage immediately. Field edits arrive in bursts while a
//! user types, so they go through the autosave debouncer instead.

use std::time::Instant;

use blockmail_history::History;

use crate::autosave::{Debouncer, SaveIndicator, SaveStatus};
use crate::block::{Block, BlockId, BlockKind};
use crate::clipboard::Clipboard;
use crate::command::Command;
use crate::config::Config;
use crate::document::{Document, DropPlacement, InsertAt, MoveTarget};
use crate::event::{EditorEvent, EventBus};
use crate::field::{FieldPath, FieldValue};
use crate::keymap::{KeyCombo, Keymap, Shortcut};
use crate::storage::{DocumentStore, StorageError, Template, TemplateId, TemplateLibrary};
use crate::{CoreError, CoreResult};

/// One editing session.
///
/// ## Thread Safety
///
/// `Editor` is designed to be owned by a single thread (the main/UI thread).
/// Subscribers receive events over the broadcast channel and may live
/// anywhere.
pub struct Editor {
    /// The live document
    document: Document,

    /// Snapshots of the block list after every committed edit
    history: History<Vec<Block>>,

    /// Single-slot block clipboard
    clipboard: Clipboard,

    /// Session configuration
    config: Config,

    /// Key bindings
    keymap: Keymap,

    /// Event bus for notifications
    event_bus: EventBus,

    /// Pending debounced write
    autosave: Debouncer,

    /// What the save indicator shows
    indicator: SaveIndicator,

    /// Where the live document is persisted
    store: Box<dyn DocumentStore>,

    /// Saved templates
    templates: Box<dyn TemplateLibrary>,
}

impl Editor {
    /// Opens a session over the given collaborators.
    ///
    /// The stored document is restored if there is one. Otherwise the
    /// session starts from the starter document (or empty, if seeding is
    /// disabled). A document that fails to load is treated as absent.
    pub fn open(
        config: Config,
        store: Box<dyn DocumentStore>,
        templates: Box<dyn TemplateLibrary>,
    ) -> Self {
        let document = match store.load() {
            Ok(Some(blocks)) => match Document::from_blocks(blocks) {
                Ok(document) => {
                    tracing::info!("Restored document with {} blocks", document.len());
                    document
                }
                Err(e) => {
                    tracing::warn!("Stored document rejected: {}", e);
                    Self::fresh_document(&config)
                }
            },
            Ok(None) => Self::fresh_document(&config),
            Err(e) => {
                tracing::warn!("Failed to load stored document: {}", e);
                Self::fresh_document(&config)
            }
        };

        let mut history = History::with_max_size(config.editor.history_limit);
        history.commit(document.snapshot());

        let status = &config.status;
        let indicator = SaveIndicator::new(
            std::time::Duration::from_millis(status.saving_ms),
            std::time::Duration::from_millis(status.saved_visible_ms),
        );

        Self {
            document,
            history,
            clipboard: Clipboard::new(),
            keymap: Keymap::from_config(&config),
            event_bus: EventBus::new(),
            autosave: Debouncer::new(config.editor.autosave_delay()),
            indicator,
            config,
            store,
            templates,
        }
    }

    fn fresh_document(config: &Config) -> Document {
        if config.editor.seed_starter_document {
            Document::starter()
        } else {
            Document::new()
        }
    }

    // ==================== Accessors ====================

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.blocks()
    }

    pub fn selected(&self) -> Option<&BlockId> {
        self.document.selected()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.indicator.status()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of snapshots currently held.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// True while a debounced write is waiting.
    pub fn has_pending_save(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Subscribes to session events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    // ==================== Block Operations ====================

    /// Inserts a new block of the given type and selects it.
    pub fn add_block(&mut self, tag: &str, at: InsertAt) -> CoreResult<BlockId> {
        self.add_block_of(tag.parse()?, at)
    }

    /// Typed form of [`Editor::add_block`].
    pub fn add_block_of(&mut self, kind: BlockKind, at: InsertAt) -> CoreResult<BlockId> {
        let block = Block::new(kind);
        let id = block.id().clone();
        let index = self.document.insert(block, at)?;
        self.document.select(Some(&id));

        tracing::debug!("Added {} block {} at {}", kind, id, index);
        self.emit(EditorEvent::BlockInserted {
            id: id.clone(),
            index,
        });
        self.emit_selection();
        self.commit_and_save();
        Ok(id)
    }

    /// Deletes a block. Returns `false` if it was not there.
    pub fn delete_block(&mut self, id: &BlockId) -> bool {
        let selected_before = self.document.selected().cloned();
        if self.document.delete(id).is_none() {
            return false;
        }

        tracing::debug!("Deleted block {}", id);
        self.emit(EditorEvent::BlockRemoved(id.clone()));
        if self.document.selected() != selected_before.as_ref() {
            self.emit_selection();
        }
        self.commit_and_save();
        true
    }

    /// Moves a block. Returns `false` if the order did not change.
    pub fn move_block(&mut self, id: &BlockId, target: MoveTarget) -> CoreResult<bool> {
        if !self.document.move_block(id, target)? {
            return Ok(false);
        }

        let index = self.document.index_of(id).unwrap_or_default();
        tracing::debug!("Moved block {} to {}", id, index);
        self.emit(EditorEvent::BlockMoved {
            id: id.clone(),
            index,
        });
        self.commit_and_save();
        Ok(true)
    }

    /// Completes a drag: moves `source` next to `target` and selects it.
    pub fn drop_block(
        &mut self,
        source: &BlockId,
        target: &BlockId,
        placement: DropPlacement,
    ) -> CoreResult<bool> {
        let moved = self.move_block(source, MoveTarget::from_drop(target.clone(), placement))?;
        self.select(Some(source));
        Ok(moved)
    }

    /// Sets one field of a block.
    ///
    /// Returns `false` when the value was already there; nothing is
    /// committed in that case.
    pub fn update_field(
        &mut self,
        id: &BlockId,
        path: &FieldPath,
        value: FieldValue,
    ) -> CoreResult<bool> {
        if !self.document.update_field(id, path, value)? {
            return Ok(false);
        }

        tracing::debug!("Updated {} on block {}", path, id);
        self.emit(EditorEvent::BlockUpdated(id.clone()));
        self.commit();
        self.autosave.schedule(Instant::now());
        Ok(true)
    }

    /// Changes the selection. Not an edit: no history, no save.
    pub fn select(&mut self, id: Option<&BlockId>) {
        if self.document.select(id) {
            self.emit_selection();
        }
    }

    /// Removes every block. Returns `false` if the document was already
    /// empty.
    pub fn clear(&mut self) -> bool {
        if self.document.is_empty() {
            return false;
        }
        self.document.clear();
        tracing::debug!("Cleared document");
        self.emit(EditorEvent::DocumentReplaced);
        self.emit_selection();
        self.commit_and_save();
        true
    }

    // ==================== Clipboard ====================

    /// Copies a block to the clipboard.
    pub fn copy_block(&mut self, id: &BlockId) -> CoreResult<()> {
        let block = self
            .document
            .get(id)
            .ok_or_else(|| CoreError::BlockNotFound(id.clone()))?;
        self.clipboard.copy(block);
        Ok(())
    }

    /// Copies the selected block. Returns `false` if nothing is selected.
    pub fn copy_selected(&mut self) -> bool {
        match self.document.selected_block() {
            Some(block) => {
                self.clipboard.copy(block);
                true
            }
            None => false,
        }
    }

    /// Pastes the clipboard after `after` (or at the end) and selects the
    /// new block.
    ///
    /// An anchor that no longer exists falls back to the end. Returns
    /// `None` when the clipboard is empty.
    pub fn paste(&mut self, after: Option<&BlockId>) -> CoreResult<Option<BlockId>> {
        let Some(block) = self.clipboard.paste() else {
            return Ok(None);
        };
        let at = match after {
            Some(anchor) if self.document.contains(anchor) => InsertAt::After(anchor.clone()),
            _ => InsertAt::End,
        };

        let id = block.id().clone();
        let index = self.document.insert(block, at)?;
        self.document.select(Some(&id));

        tracing::debug!("Pasted block {} at {}", id, index);
        self.emit(EditorEvent::BlockInserted {
            id: id.clone(),
            index,
        });
        self.emit_selection();
        self.commit_and_save();
        Ok(Some(id))
    }

    // ==================== History ====================

    /// Steps back one snapshot. Returns `false` at the oldest one.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        if !self.adopt_snapshot(snapshot) {
            // Keep the cursor on the snapshot the document still shows.
            self.history.redo();
            return false;
        }
        true
    }

    /// Steps forward one snapshot. Returns `false` at the newest one.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        if !self.adopt_snapshot(snapshot) {
            self.history.undo();
            return false;
        }
        true
    }

    fn adopt_snapshot(&mut self, blocks: Vec<Block>) -> bool {
        if let Err(e) = self.document.replace_blocks(blocks) {
            tracing::warn!("Discarding corrupt snapshot: {}", e);
            return false;
        }
        self.emit(EditorEvent::DocumentReplaced);
        self.emit_selection();
        self.emit_history();
        self.save_now();
        true
    }

    // ==================== Templates ====================

    /// Saves the current document as a named template.
    pub fn save_template(&mut self, name: &str) -> CoreResult<TemplateId> {
        let template = Template::new(name, self.document.snapshot())?;
        let id = template.id.clone();
        self.templates.save(template)?;

        tracing::info!("Saved template {} ({})", name.trim(), id);
        self.emit(EditorEvent::TemplateSaved(id.clone()));
        Ok(id)
    }

    /// Replaces the document with a saved template.
    pub fn load_template(&mut self, id: &TemplateId) -> CoreResult<()> {
        let template = self
            .templates
            .get(id)?
            .ok_or_else(|| CoreError::TemplateNotFound(id.clone()))?;
        self.document.replace_blocks(template.blocks)?;

        tracing::info!("Loaded template {} ({})", template.name, id);
        self.emit(EditorEvent::DocumentReplaced);
        self.emit_selection();
        self.commit_and_save();
        Ok(())
    }

    /// Deletes a saved template. Returns `false` if it did not exist.
    pub fn remove_template(&mut self, id: &TemplateId) -> CoreResult<bool> {
        let removed = self.templates.remove(id)?;
        if removed {
            self.emit(EditorEvent::TemplateRemoved(id.clone()));
        }
        Ok(removed)
    }

    /// Lists saved templates, newest first.
    pub fn templates(&self) -> CoreResult<Vec<Template>> {
        Ok(self.templates.list()?)
    }

    // ==================== Persistence ====================

    /// Advances timers: flushes a due autosave and moves the indicator on.
    ///
    /// Storage failures are logged and shown in the indicator; they never
    /// reach the caller.
    pub fn tick(&mut self, now: Instant) {
        if self.autosave.poll(now) {
            let _ = self.write(now);
        }
        if self.indicator.tick(now) {
            self.emit(EditorEvent::SaveStatusChanged(self.indicator.status().clone()));
        }
    }

    /// Writes the document now, cancelling any pending autosave.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.autosave.cancel();
        self.write(Instant::now())?;
        Ok(())
    }

    fn save_now(&mut self) {
        self.autosave.cancel();
        let _ = self.write(Instant::now());
    }

    fn write(&mut self, now: Instant) -> Result<(), StorageError> {
        match self.store.save(self.document.blocks()) {
            Ok(()) => {
                tracing::debug!("Saved document ({} blocks)", self.document.len());
                self.indicator.saving(now);
                self.emit(EditorEvent::SaveStatusChanged(SaveStatus::Saving));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to save document: {}", e);
                self.indicator.failed(e.to_string(), now);
                self.emit(EditorEvent::StorageFailed(e.to_string()));
                self.emit(EditorEvent::SaveStatusChanged(self.indicator.status().clone()));
                Err(e)
            }
        }
    }

    // ==================== Commands & Keys ====================

    /// Runs a command.
    pub fn execute(&mut self, command: Command) -> CoreResult<()> {
        tracing::trace!("Executing {}", command.display_name());
        match command {
            Command::AddBlock { kind, at } => {
                self.add_block_of(kind, at)?;
            }
            Command::DeleteBlock(id) => {
                self.delete_block(&id);
            }
            Command::MoveBlock { id, target } => {
                self.move_block(&id, target)?;
            }
            Command::UpdateField { id, path, value } => {
                self.update_field(&id, &path, value)?;
            }
            Command::Select(id) => self.select(id.as_ref()),
            Command::Clear => {
                self.clear();
            }
            Command::CopyBlock(id) => self.copy_block(&id)?,
            Command::CopySelected => {
                self.copy_selected();
            }
            Command::Paste { after } => {
                self.paste(after.as_ref())?;
            }
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::SaveTemplate { name } => {
                self.save_template(&name)?;
            }
            Command::LoadTemplate(id) => self.load_template(&id)?,
            Command::RemoveTemplate(id) => {
                self.remove_template(&id)?;
            }
            Command::Flush => self.flush()?,
        }
        Ok(())
    }

    /// Handles a key press.
    ///
    /// Returns the matched shortcut. Everything except
    /// [`Shortcut::SaveTemplate`] has already run; that one needs a name, so
    /// the caller prompts for it and calls [`Editor::save_template`].
    pub fn handle_key(&mut self, combo: &KeyCombo) -> CoreResult<Option<Shortcut>> {
        let Some(shortcut) = self.keymap.resolve(combo) else {
            return Ok(None);
        };
        if let Some(command) = Command::for_shortcut(shortcut, self.document.selected()) {
            self.execute(command)?;
        }
        Ok(Some(shortcut))
    }

    // ==================== Internals ====================

    fn commit(&mut self) {
        self.history.commit(self.document.snapshot());
        self.emit_history();
    }

    fn commit_and_save(&mut self) {
        self.commit();
        self.save_now();
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }

    fn emit_selection(&self) {
        self.emit(EditorEvent::SelectionChanged(self.document.selected().cloned()));
    }

    fn emit_history(&self) {
        self.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}
