//! Block-level elements of the document tree.

use serde::Serialize;

use super::inline::Paragraph;

/// An ordered container of blocks. Insertion order is preserved; an
/// empty sequence is valid (for example, an empty list item).
pub type Sequence = Vec<Block>;

/// A parsed document: the root sequence of blocks.
pub type Document = Sequence;

/// A block-level element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Section(Section),
    Quote(Quote),
    Modifier(Modifier),
    Code(Code),
    List(List),
    Image(Image),
    Separator(Separator),
}

/// A titled subtree `<section>`. A section of level L directly contains
/// only blocks and sections of level greater than L.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading depth, 1 through 6.
    pub level: u8,
    pub title: Paragraph,
    pub content: Sequence,
}

impl Section {
    pub fn new(level: u8, title: Paragraph) -> Self {
        Self {
            level,
            title,
            content: Sequence::new(),
        }
    }
}

/// A quoted sub-document `<blockquote>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub content: Sequence,
}

/// A container carrying a style class `<div class="...">`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub class: String,
    pub content: Sequence,
}

/// A block of preformatted code `<pre>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    /// Info string of a fenced block; empty for indented code.
    pub language: String,
    /// Content lines, verbatim, without terminators.
    pub lines: Vec<String>,
}

/// A list of item sequences `<ul>`, `<ol>`. Each item may hold any
/// number of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<Sequence>,
}

/// An image reference. `href` is taken verbatim from the source; the
/// parser performs no validation or sanitization on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub href: String,
    pub alt: Paragraph,
}

/// A horizontal rule with an optional title `<hr>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Separator {
    pub title: Paragraph,
}
