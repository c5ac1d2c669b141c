//! Single-slot block clipboard.

use crate::block::Block;

/// Holds at most one copied block.
///
/// Both copying and pasting mint fresh ids, so every paste yields an
/// independent block and the held copy never aliases a live one.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Block>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot with a deep copy of `block`.
    pub fn copy(&mut self, block: &Block) {
        self.slot = Some(block.duplicate());
    }

    /// Returns a fresh copy of the held block, or `None` when empty.
    pub fn paste(&self) -> Option<Block> {
        self.slot.as_ref().map(Block::duplicate)
    }

    pub fn peek(&self) -> Option<&Block> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
