//! Scripts and their blocks
//!
//! A `Script` is one loaded file; its `Block`s are the units checked for
//! overflow. Block indices are stable while the script is loaded and are the
//! key that joins the "all blocks" and "overflowing blocks" views.

pub mod segment;

pub use segment::{join_blocks, split_blocks, strip_separators, SegmentationMode};

use crate::overflow::OverflowKinds;

/// Unique identifier for a loaded script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(pub u64);

/// One discrete unit of script text
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub index: usize,
    pub content: String,
    pub is_overflowing: bool,
    /// Why the block overflows (all false when it fits)
    pub overflow: OverflowKinds,
}

impl Block {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            is_overflowing: false,
            overflow: OverflowKinds::default(),
        }
    }

    /// Store the result of an overflow check
    pub fn set_overflow(&mut self, overflow: OverflowKinds) {
        self.is_overflowing = overflow.any();
        self.overflow = overflow;
    }
}

/// A loaded script file
#[derive(Debug, Clone)]
pub struct Script {
    pub id: ScriptId,
    pub name: String,
    pub raw_text: String,
    pub blocks: Vec<Block>,
}

impl Script {
    /// Create a script and segment it with the given mode
    pub fn new(
        id: ScriptId,
        name: impl Into<String>,
        raw_text: impl Into<String>,
        mode: &SegmentationMode,
    ) -> Self {
        let mut script = Self {
            id,
            name: name.into(),
            raw_text: raw_text.into(),
            blocks: Vec::new(),
        };
        script.resegment(mode);
        script
    }

    /// Rebuild the block list from `raw_text`
    ///
    /// Call [`Script::commit_edits`] first to keep edited block content.
    pub fn resegment(&mut self, mode: &SegmentationMode) {
        self.blocks = split_blocks(&self.raw_text, mode)
            .into_iter()
            .enumerate()
            .map(|(index, content)| Block::new(index, content))
            .collect();
        tracing::debug!(
            "Segmented '{}' into {} blocks ({:?})",
            self.name,
            self.blocks.len(),
            mode
        );
    }

    /// Replace a block's content; returns false if the index is out of range
    pub fn edit_block(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) => {
                block.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Write edited blocks back into `raw_text`
    pub fn commit_edits(&mut self, mode: &SegmentationMode) {
        self.raw_text = self.to_text(mode);
    }

    /// Serialize the current blocks as a script file
    pub fn to_text(&self, mode: &SegmentationMode) -> String {
        let contents: Vec<&str> = self.blocks.iter().map(|b| b.content.as_str()).collect();
        join_blocks(&contents, mode)
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Blocks currently flagged as overflowing, in index order
    pub fn overflowing(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_overflowing)
    }

    pub fn overflowing_count(&self) -> usize {
        self.overflowing().count()
    }
}
