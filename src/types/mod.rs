//! Document tree types for marq.
//!
//! A parse produces a [`Document`]: an ordered sequence of block-level
//! elements, some of which contain further sequences (sections, quotes,
//! list items) or resolved inline markup (paragraphs, titles).

mod block;
mod inline;

pub use block::{Block, Code, Document, Image, List, Modifier, Quote, Section, Separator, Sequence};
pub use inline::{Inline, InlineModifier, Link, Paragraph};
