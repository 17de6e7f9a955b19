//! Document inclusion.
//!
//! An `{{path}}` line splices another document into the open sequence.
//! Targets resolve relative to the including document; the chain of
//! open parses is checked for cycles, and a missing or unreadable
//! target records an error instead of aborting the parse.

use crate::fs::is_local_path;
use crate::types::Block;

use super::block::{BlockParser, DocContext};
use super::reader::Reader;

impl BlockParser<'_, '_, '_> {
    pub(super) fn include(&mut self, target: &str) {
        let resolved = resolve_target(&self.doc.dir, target);
        if self.session.chain.iter().any(|open| *open == resolved) {
            self.error(format!("Recursive include of {}", resolved));
            return;
        }
        if self.too_deep() {
            return;
        }
        if !self.session.fs.exists(&resolved) {
            self.error(format!("Include target does not exist: {}", resolved));
            return;
        }
        let content = match self.session.fs.read(&resolved) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                self.error(format!("Cannot read include {}: {}", resolved, err));
                return;
            }
        };

        self.session.chain.push(resolved.clone());
        let mut doc = DocContext {
            reader: Reader::new(&content),
            dir: parent_dir(&resolved).to_string(),
            path: resolved,
        };
        let sequence = if doc.reader.next_line() {
            BlockParser::new(&mut doc, self.session, self.depth + 1).run()
        } else {
            Vec::new()
        };
        self.session.chain.pop();

        // Splice block by block: sections re-derive their nesting point
        // from their own level, so the included document's headings
        // continue the surrounding tree rather than restarting it.
        for block in sequence {
            match block {
                Block::Section(section) => self.cursor.splice_section(section),
                other => self.cursor.append(other),
            }
        }
    }
}

/// Resolve an include target against the including document's
/// directory. Absolute paths and scheme-qualified references pass
/// through untouched.
fn resolve_target(dir: &str, target: &str) -> String {
    if !is_local_path(target) || target.starts_with('/') {
        return target.to_string();
    }
    if dir.is_empty() {
        normalize(target)
    } else {
        normalize(&format!("{}/{}", dir, target))
    }
}

/// Directory part of a slash-separated document path.
pub(super) fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else {
                    parts.push(part);
                }
            }
            _ => parts.push(part),
        }
    }
    parts.join("/")
}
