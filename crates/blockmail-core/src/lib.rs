//! # Blockmail Core
//!
//! Block document model, editing session and state management.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Editor (session)                     │
//! │  ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌────────────┐ │
//! │  │  Config  │ │  Keymap  │ │  EventBus │ │  Autosave  │ │
//! │  └──────────┘ └──────────┘ └───────────┘ └────────────┘ │
//! │         │                                                │
//! │  ┌──────┴───────────┐ ┌─────────────┐ ┌───────────────┐ │
//! │  │     Document     │ │   History   │ │   Clipboard   │ │
//! │  │ [b1] [b2] [b3]   │ │ snapshots   │ │ one block     │ │
//! │  └──────────────────┘ └─────────────┘ └───────────────┘ │
//! │         │                                                │
//! │  ┌──────┴──────────────────────────────────┐            │
//! │  │ DocumentStore / TemplateLibrary (traits) │            │
//! │  └─────────────────────────────────────────┘            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The document is the single source of truth. The session mutates it,
//! snapshots it into the history, and tells subscribers to re-project it.
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod autosave;
pub mod block;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod field;
pub mod keymap;
pub mod registry;
pub mod storage;
pub mod upload;

pub use autosave::{Debouncer, SaveIndicator, SaveStatus};
pub use block::{
    Align, Block, BlockContent, BlockId, BlockKind, ButtonContent, CtaContent, FooterContent,
    HeaderContent, HeroContent, ImageContent, Link, SectionContent, Style, TextContent,
    TwoColumnContent,
};
pub use clipboard::Clipboard;
pub use command::Command;
pub use config::{Config, ExportConfig};
pub use document::{Document, DropPlacement, InsertAt, MoveTarget};
pub use editor::Editor;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use field::{FieldPath, FieldScope, FieldValue, NumericRange};
pub use keymap::{KeyCombo, Keymap, Modifiers, Shortcut};
pub use storage::{
    DocumentStore, MemoryStore, MemoryTemplateLibrary, StorageError, Template, TemplateId,
    TemplateLibrary,
};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Block id already in document: {0}")]
    DuplicateBlockId(BlockId),

    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CoreError {
    /// Builds a validation failure with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }
}
