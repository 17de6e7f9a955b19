//! marq - Markup document compiler
//!
//! A library and CLI for parsing marq markup, a constrained
//! markdown-like language, into a document tree and rendering that tree
//! to HTML. Parsing never aborts: every parse returns a best-effort
//! [`Document`] together with an ordered list of the problems found.

pub mod cli;
pub mod error;
pub mod fs;
pub mod output;
pub mod parser;
pub mod render;
pub mod types;

pub use error::{MarqError, Result};
pub use fs::{DirFs, FileSystem, MemFs};
pub use parser::{parse_content, parse_content_with, parse_file, ParseError, ParseOptions};
pub use render::{render, render_inline};
pub use types::{
    Block, Code, Document, Image, Inline, InlineModifier, Link, List, Modifier, Paragraph, Quote,
    Section, Separator, Sequence,
};
