//! # Blockmail History
//!
//! Bounded linear undo/redo over full document snapshots.
//!
//! ## Snapshots, not diffs
//!
//! Every committed edit stores a complete copy of the document state.
//! Email documents are a handful of small blocks and edits arrive at human
//! pace, so a snapshot costs little and can never drift out of sync with
//! the live document the way an inverse-operation log can.
//!
//! The log owns its snapshots outright: callers hand over a value (usually
//! a fresh `Clone` of the live block list) and get shared references back.
//! Mutating the live document afterwards never reaches into the log.

mod history;

pub use history::{DEFAULT_MAX_SIZE, History};
