//! File access abstraction for the parser.
//!
//! Include resolution reads sibling documents through a [`FileSystem`]
//! handle rather than touching the disk directly, so parses can run
//! against a real directory ([`DirFs`]) or an in-memory map ([`MemFs`]).

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Read access to the documents a parse may include.
pub trait FileSystem {
    /// Whether `path` names a readable document.
    fn exists(&self, path: &str) -> bool;

    /// Read the document at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// A directory on the real file system. Lookups are joined onto the
/// root, so document paths stay relative and portable.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileSystem for DirFs {
    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

/// An in-memory file map, used by tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemFs {
    files: HashMap<String, String>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileSystem for MemFs {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path.trim_start_matches('/'))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        match self.files.get(path.trim_start_matches('/')) {
            Some(content) => Ok(content.clone().into_bytes()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such document")),
        }
    }
}

/// Extract the scheme prefix of a reference, if it has one.
///
/// A scheme is a leading alphabetic character followed by
/// alphanumerics, `+`, `-` or `.`, terminated by `:`.
pub fn path_scheme(reference: &str) -> Option<&str> {
    for (i, c) in reference.char_indices() {
        match c {
            'a'..='z' | 'A'..='Z' => {}
            '0'..='9' | '+' | '-' | '.' => {
                if i == 0 {
                    return None;
                }
            }
            ':' => {
                return if i > 0 { Some(&reference[..i]) } else { None };
            }
            _ => return None,
        }
    }
    None
}

/// Whether a reference points into the local document tree rather than
/// at an external resource.
pub fn is_local_path(reference: &str) -> bool {
    path_scheme(reference).is_none()
}
