//! The block document.
//!
//! ## Learning: Invariants Behind a Private Field
//!
//! `Document` keeps its block list private. Every way in goes through a
//! method that checks the two invariants the rest of the crate relies on:
//!
//! - block ids are unique (nested container children included)
//! - the selection is `None` or the id of a block in the list
//!
//! Because of that, projections and the session never have to re-check.
//!
//! The document does not know about history. The session decides when a
//! change is worth a snapshot.

use std::collections::HashSet;

use crate::block::{Block, BlockId};
use crate::field::{self, FieldPath, FieldValue};
use crate::{CoreError, CoreResult};

/// Where to insert a new block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsertAt {
    /// Append after the last block
    #[default]
    End,
    /// Directly after the given block
    After(BlockId),
}

/// Where a moved block should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// Final position in the list (clamped to the last slot)
    Index(usize),
    /// Directly before another block
    Before(BlockId),
    /// Directly after another block
    After(BlockId),
}

impl MoveTarget {
    /// Builds a target relative to `target` from a drop placement.
    pub fn from_drop(target: BlockId, placement: DropPlacement) -> Self {
        match placement {
            DropPlacement::Before => Self::Before(target),
            DropPlacement::After => Self::After(target),
        }
    }
}

/// Which side of the hovered block a dragged block lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPlacement {
    Before,
    After,
}

impl DropPlacement {
    /// Chooses a side from the pointer position and the target's bounds.
    ///
    /// Above the vertical midpoint is `Before`; the midpoint itself and
    /// below is `After`.
    pub fn from_pointer(pointer_y: f32, target_top: f32, target_height: f32) -> Self {
        if pointer_y < target_top + target_height / 2.0 {
            Self::Before
        } else {
            Self::After
        }
    }
}

/// An ordered list of blocks plus the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    blocks: Vec<Block>,
    selected: Option<BlockId>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// The document a first-time user starts from: header, hero, footer,
    /// with the header selected.
    pub fn starter() -> Self {
        use crate::block::BlockKind;

        let blocks = vec![
            Block::new(BlockKind::Header),
            Block::new(BlockKind::Hero),
            Block::new(BlockKind::Footer),
        ];
        let selected = blocks.first().map(|b| b.id().clone());
        Self { blocks, selected }
    }

    /// Adopts a list of blocks, rejecting duplicate ids.
    ///
    /// The first block is selected.
    pub fn from_blocks(blocks: Vec<Block>) -> CoreResult<Self> {
        check_unique(&blocks)?;
        let selected = blocks.first().map(|b| b.id().clone());
        Ok(Self { blocks, selected })
    }

    /// Creates a block from a type tag.
    ///
    /// The block is not inserted; see [`Document::insert`].
    pub fn create_block(tag: &str) -> CoreResult<Block> {
        Ok(Block::new(tag.parse()?))
    }

    // ==================== Accessors ====================

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn selected(&self) -> Option<&BlockId> {
        self.selected.as_ref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Deep copy of the block list, suitable for a history snapshot.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    // ==================== Editing ====================

    /// Inserts a block and returns its index.
    pub fn insert(&mut self, block: Block, at: InsertAt) -> CoreResult<usize> {
        let existing = self.id_set();
        if let Some(dup) = block.all_ids().into_iter().find(|id| existing.contains(id)) {
            return Err(CoreError::DuplicateBlockId(dup.clone()));
        }

        let index = match at {
            InsertAt::End => self.blocks.len(),
            InsertAt::After(anchor) => {
                self.index_of(&anchor)
                    .ok_or(CoreError::BlockNotFound(anchor))?
                    + 1
            }
        };
        self.blocks.insert(index, block);
        Ok(index)
    }

    /// Removes a block. Absent ids are a no-op.
    ///
    /// Removing the selected block moves the selection to the (new) first
    /// block.
    pub fn delete(&mut self, id: &BlockId) -> Option<Block> {
        let index = self.index_of(id)?;
        let removed = self.blocks.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = self.blocks.first().map(|b| b.id().clone());
        }
        Some(removed)
    }

    /// Returns a deep copy of a block with fresh ids. The document is not
    /// changed.
    pub fn duplicate(&self, id: &BlockId) -> CoreResult<Block> {
        self.get(id)
            .map(Block::duplicate)
            .ok_or_else(|| CoreError::BlockNotFound(id.clone()))
    }

    /// Moves a block. Returns `true` if the order changed.
    pub fn move_block(&mut self, id: &BlockId, target: MoveTarget) -> CoreResult<bool> {
        let from = self
            .index_of(id)
            .ok_or_else(|| CoreError::BlockNotFound(id.clone()))?;

        let to = match target {
            MoveTarget::Index(index) => index.min(self.blocks.len() - 1),
            MoveTarget::Before(ref anchor) | MoveTarget::After(ref anchor) => {
                if anchor == id {
                    return Ok(false);
                }
                let anchor_index = self
                    .index_of(anchor)
                    .ok_or_else(|| CoreError::BlockNotFound(anchor.clone()))?;
                // Position of the anchor once the moved block is taken out
                let anchor_index = if from < anchor_index {
                    anchor_index - 1
                } else {
                    anchor_index
                };
                match target {
                    MoveTarget::After(_) => anchor_index + 1,
                    _ => anchor_index,
                }
            }
        };

        if to == from {
            return Ok(false);
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok(true)
    }

    /// Sets one field of a block. Returns `true` if the block changed.
    ///
    /// The update runs against a copy, so a rejected value leaves the
    /// document untouched.
    pub fn update_field(
        &mut self,
        id: &BlockId,
        path: &FieldPath,
        value: FieldValue,
    ) -> CoreResult<bool> {
        let index = self
            .index_of(id)
            .ok_or_else(|| CoreError::BlockNotFound(id.clone()))?;

        let mut updated = self.blocks[index].clone();
        field::apply(&mut updated, path, value)?;
        if updated == self.blocks[index] {
            return Ok(false);
        }
        self.blocks[index] = updated;
        Ok(true)
    }

    /// Changes the selection. Returns `true` if it changed.
    ///
    /// Selecting an id that is not in the document clears the selection.
    pub fn select(&mut self, id: Option<&BlockId>) -> bool {
        let next = id.filter(|id| self.contains(id)).cloned();
        if next == self.selected {
            return false;
        }
        self.selected = next;
        true
    }

    /// Adopts a snapshot wholesale and selects its first block.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) -> CoreResult<()> {
        *self = Self::from_blocks(blocks)?;
        Ok(())
    }

    /// Removes every block.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.selected = None;
    }

    fn id_set(&self) -> HashSet<&BlockId> {
        self.blocks.iter().flat_map(Block::all_ids).collect()
    }
}

fn check_unique(blocks: &[Block]) -> CoreResult<()> {
    let mut seen = HashSet::new();
    for id in blocks.iter().flat_map(Block::all_ids) {
        if !seen.insert(id) {
            return Err(CoreError::DuplicateBlockId(id.clone()));
        }
    }
    Ok(())
}
