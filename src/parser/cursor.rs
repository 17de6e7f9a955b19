//! Insertion cursor for the growing document tree.

use crate::types::{Block, Section, Sequence};

/// The owned insertion point of one parser instance: the root sequence
/// plus the stack of currently open sections. Appending targets the
/// deepest open section; closing a section attaches it to its parent.
/// Child parsers get a fresh cursor and splice their finished sequence
/// back explicitly.
#[derive(Debug, Default)]
pub(crate) struct TreeCursor {
    root: Sequence,
    open: Vec<Section>,
}

impl TreeCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block at the deepest open section.
    pub fn append(&mut self, block: Block) {
        match self.open.last_mut() {
            Some(section) => section.content.push(block),
            None => self.root.push(block),
        }
    }

    /// Open a new section, first closing every open section at the same
    /// or a deeper level.
    pub fn open_section(&mut self, section: Section) {
        self.close_to(section.level);
        self.open.push(section);
    }

    /// Splice a finished section (from an include) at the position its
    /// level demands. The section and its rightmost descendant chain are
    /// re-opened so that following content continues inside them, as if
    /// the included text had appeared in place.
    pub fn splice_section(&mut self, section: Section) {
        self.close_to(section.level);
        let mut current = section;
        while matches!(current.content.last(), Some(Block::Section(_))) {
            let Some(Block::Section(child)) = current.content.pop() else {
                unreachable!();
            };
            self.open.push(current);
            current = child;
        }
        self.open.push(current);
    }

    /// Close everything and return the finished sequence.
    pub fn finish(mut self) -> Sequence {
        self.close_to(0);
        self.root
    }

    fn close_to(&mut self, level: u8) {
        while self.open.last().is_some_and(|section| section.level >= level) {
            let section = self.open.pop().expect("checked above");
            self.append(Block::Section(section));
        }
    }
}
