//! Rendering of parsed documents.

mod html;

pub use html::{render, render_inline};
