//! Block-level parser.
//!
//! Consumes lines from the reader and dispatches on line shape, first
//! match wins: blank, quote, thematic break, bullet list, ordered list,
//! ATX heading, setext underline, indented code, fenced code, style
//! modifier, include, paragraph text. Quotes and list items run a child
//! parser over the same reader with one extra prefix constraint pushed;
//! the child's finished sequence is spliced back explicitly.

use crate::types::{Block, Code, List, Modifier, Quote, Section, Separator, Sequence};

use super::cursor::TreeCursor;
use super::inline::{self, ParaLine};
use super::reader::{trim_trailing, Prefix, Reader};
use super::{ParseError, Session};

/// Per-document state shared by a parser and its quote/list children.
pub(crate) struct DocContext<'t> {
    pub reader: Reader<'t>,
    /// Logical path, for diagnostics.
    pub path: String,
    /// Directory of `path`, for include resolution.
    pub dir: String,
}

pub(crate) struct BlockParser<'p, 't, 'f> {
    pub(super) doc: &'p mut DocContext<'t>,
    pub(super) session: &'p mut Session<'f>,
    pub(super) cursor: TreeCursor,
    paragraph: Vec<ParaLine>,
    pending_class: Option<String>,
    pub(super) depth: usize,
}

impl<'p, 't, 'f> BlockParser<'p, 't, 'f> {
    pub(super) fn new(
        doc: &'p mut DocContext<'t>,
        session: &'p mut Session<'f>,
        depth: usize,
    ) -> Self {
        Self {
            doc,
            session,
            cursor: TreeCursor::new(),
            paragraph: Vec::new(),
            pending_class: None,
            depth,
        }
    }

    /// Run the block loop over the current and following lines. The
    /// caller positions the reader on the first line before calling;
    /// the loop ends at end of input or when the reader's prefix stack
    /// stops matching.
    pub(super) fn run(mut self) -> Sequence {
        loop {
            self.dispatch();
            if !self.doc.reader.next_line() {
                break;
            }
        }
        self.flush_paragraph();
        self.cursor.finish()
    }

    /// Dispatch the current line to a block handler. First match wins.
    fn dispatch(&mut self) {
        let rest = self.doc.reader.rest();
        let trimmed = rest.trim();

        // A whitespace-only line is blank unless it carries a full code
        // indent and no paragraph is pending.
        let blank = self.doc.reader.is_blank()
            && (!self.paragraph.is_empty() || indented_content(rest).is_none());

        if blank {
            self.flush_paragraph();
        } else if starts_quote(rest) {
            self.quote();
        } else if let Some(title) = separator_title(rest) {
            self.separator(title);
        } else if is_bullet(rest) {
            self.list(false);
        } else if is_ordered(rest) {
            self.list(true);
        } else if skip_indent(rest).starts_with('#') {
            self.heading(rest);
        } else if let Some(level) = self.setext_underline(trimmed) {
            self.setext(level);
        } else if let Some(first) = indented_content(rest) {
            self.indented_code(first.to_string());
        } else if is_fence(rest) {
            self.fenced_code();
        } else if let Some(class) = modifier_class(trimmed) {
            self.flush_paragraph();
            self.pending_class = Some(class.to_string());
        } else if let Some(target) = include_target(trimmed) {
            self.flush_paragraph();
            self.include(target);
        } else {
            self.paragraph_line(rest);
        }
    }

    /// Buffer a paragraph line. A line ending in two or more spaces
    /// marks a hard break before the next line.
    fn paragraph_line(&mut self, rest: &str) {
        let hard_break = rest.ends_with("  ");
        self.paragraph.push(ParaLine::new(rest.trim(), hard_break));
    }

    /// Close the pending paragraph: resolve its inline content and
    /// append it at the deepest open section, wrapped in a modifier
    /// when a `{.class}` line preceded it.
    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.paragraph);
        let block = Block::Paragraph(inline::parse_paragraph(&lines));
        match self.pending_class.take() {
            Some(class) => self.cursor.append(Block::Modifier(Modifier {
                class,
                content: vec![block],
            })),
            None => self.cursor.append(block),
        }
    }

    /// Parse an ATX heading line: one to six `#`, a mandatory space,
    /// then the title. More than six records an error and the line is
    /// kept as paragraph text; a missing space means the line never was
    /// a heading.
    fn heading(&mut self, rest: &str) {
        let line = skip_indent(rest);
        let run = line.len() - line.trim_start_matches('#').len();
        let after = &line[run..];
        if !after.starts_with(' ') {
            self.paragraph_line(rest);
            return;
        }
        if run > 6 {
            self.error("Expected heading, but contained too many #");
            self.paragraph_line(rest);
            return;
        }
        self.flush_paragraph();
        let (title, _) = trim_trailing(after.trim(), '#');
        let title = inline::parse_line(title.trim_end());
        self.cursor.open_section(Section::new(run as u8, title));
    }

    fn setext_underline(&self, trimmed: &str) -> Option<u8> {
        if self.paragraph.len() != 1 {
            return None;
        }
        setext_level(trimmed)
    }

    /// Promote the single buffered line to a section title.
    fn setext(&mut self, level: u8) {
        let line = self.paragraph.pop().expect("setext requires a buffered line");
        let title = inline::parse_line(&line.text);
        self.cursor.open_section(Section::new(level, title));
    }

    fn separator(&mut self, title: &str) {
        self.flush_paragraph();
        let title = inline::parse_line(title);
        self.cursor.append(Block::Separator(Separator { title }));
    }

    fn quote(&mut self) {
        self.flush_paragraph();
        if self.too_deep() {
            let rest = self.doc.reader.rest();
            self.paragraph_line(rest);
            return;
        }
        let rest = self.doc.reader.rest();
        let indent = rest.len() - skip_indent(rest).len();
        self.doc.reader.advance(indent);
        self.doc.reader.expect('>');
        self.doc.reader.expect(' ');

        self.doc.reader.push_prefix(Prefix::Quote);
        let content = self.child().run();
        self.doc.reader.pop_prefix();

        self.cursor.append(Block::Quote(Quote { content }));
    }

    fn list(&mut self, ordered: bool) {
        self.flush_paragraph();
        if self.too_deep() {
            let rest = self.doc.reader.rest();
            self.paragraph_line(rest);
            return;
        }
        let mut items: Vec<Sequence> = Vec::new();
        loop {
            let width = self.consume_list_marker(ordered);
            self.doc.reader.push_prefix(Prefix::Indent(width));
            let item = self.child().run();
            self.doc.reader.pop_prefix();
            items.push(item);

            // Another marker of the same kind continues the list; any
            // other line is handed back for normal dispatch.
            let mark = self.doc.reader.bookmark();
            if !self.doc.reader.next_line() {
                break;
            }
            let rest = self.doc.reader.rest();
            let more = if ordered { is_ordered(rest) } else { is_bullet(rest) };
            if !more {
                self.doc.reader.restore(mark);
                break;
            }
        }
        self.cursor.append(Block::List(List { ordered, items }));
    }

    /// Consume a list marker and the spaces after it; the consumed
    /// width becomes the item's indent constraint.
    fn consume_list_marker(&mut self, ordered: bool) -> usize {
        let rest = self.doc.reader.rest();
        let before = rest.len();
        let indent = rest.len() - skip_indent(rest).len();
        self.doc.reader.advance(indent);
        if ordered {
            while self.doc.reader.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.doc.reader.advance(1);
            }
            self.doc.reader.expect('.');
        } else {
            self.doc.reader.advance(1);
        }
        self.doc.reader.consume_while(' ', None);
        before - self.doc.reader.rest().len()
    }

    /// Collect an indented code block. Blank lines are preserved while
    /// more code follows; the first non-indented, non-blank line is
    /// pushed back for normal dispatch.
    fn indented_code(&mut self, first: String) {
        self.flush_paragraph();
        let mut lines = vec![first];
        let mut pending_blanks = 0;
        while self.doc.reader.next_line() {
            let rest = self.doc.reader.rest();
            if let Some(content) = indented_content(rest) {
                for _ in 0..pending_blanks {
                    lines.push(String::new());
                }
                pending_blanks = 0;
                lines.push(content.to_string());
            } else if self.doc.reader.is_blank() {
                pending_blanks += 1;
            } else {
                self.doc.reader.push_back();
                break;
            }
        }
        self.cursor.append(Block::Code(Code {
            language: String::new(),
            lines,
        }));
    }

    /// Collect a fenced code block. The closing fence must use the same
    /// character and at least the opening length; without one, all
    /// remaining input becomes content and an error is recorded.
    fn fenced_code(&mut self) {
        self.flush_paragraph();
        let rest = self.doc.reader.rest();
        let indent = rest.len() - skip_indent(rest).len();
        self.doc.reader.advance(indent);
        let length = self.doc.reader.consume_while('`', None);
        let language = self.doc.reader.rest().trim().to_string();
        let opened_at = self.doc.reader.line_number();

        let mut lines = Vec::new();
        let mut closed = false;
        while self.doc.reader.next_line() {
            let rest = self.doc.reader.rest();
            if fence_close(rest, length) {
                closed = true;
                break;
            }
            lines.push(rest.to_string());
        }
        if !closed {
            self.error_at(opened_at, "Unterminated code fence");
        }
        self.cursor.append(Block::Code(Code { language, lines }));
    }

    fn child(&mut self) -> BlockParser<'_, 't, 'f> {
        BlockParser::new(&mut *self.doc, &mut *self.session, self.depth + 1)
    }

    /// Guard against adversarial nesting before spawning a child.
    pub(super) fn too_deep(&mut self) -> bool {
        let max = self.session.options.max_depth;
        if self.depth + 1 >= max {
            self.error(format!("Nesting deeper than {} levels", max));
            true
        } else {
            false
        }
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        let line = self.doc.reader.line_number();
        self.error_at(line, message);
    }

    fn error_at(&mut self, line: u32, message: impl Into<String>) {
        self.session.errors.push(ParseError {
            path: self.doc.path.clone(),
            line,
            message: message.into(),
        });
    }
}

/// Strip up to three leading spaces. Four or more columns of
/// whitespace belong to indented code.
fn skip_indent(line: &str) -> &str {
    let mut rest = line;
    for _ in 0..3 {
        match rest.strip_prefix(' ') {
            Some(r) => rest = r,
            None => break,
        }
    }
    rest
}

fn starts_quote(rest: &str) -> bool {
    skip_indent(rest).starts_with('>')
}

/// Thematic-break line: a run of three or more `*`, `-` or `_`,
/// optionally followed by a title. A trailing run of the marker is
/// decorative and stripped from the title.
fn separator_title(rest: &str) -> Option<&str> {
    let line = skip_indent(rest).trim_end();
    let marker = line.chars().next()?;
    if !matches!(marker, '*' | '-' | '_') {
        return None;
    }
    let run = line.len() - line.trim_start_matches(marker).len();
    if run < 3 {
        return None;
    }
    let (title, _) = trim_trailing(line[run..].trim(), marker);
    Some(title.trim_end())
}

fn is_bullet(rest: &str) -> bool {
    let mut chars = skip_indent(rest).chars();
    matches!(chars.next(), Some('*' | '-' | '+')) && chars.next() == Some(' ')
}

fn is_ordered(rest: &str) -> bool {
    let line = skip_indent(rest);
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    digits > 0 && line[digits..].starts_with(". ")
}

/// Setext underline: an all-`=` line gives level 1, an all-`-` line
/// level 2. Dash runs of three or more never reach this rule; the
/// thematic break claims them first.
fn setext_level(trimmed: &str) -> Option<u8> {
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.bytes().all(|b| b == b'=') {
        return Some(1);
    }
    if trimmed.bytes().all(|b| b == b'-') {
        return Some(2);
    }
    None
}

/// Four columns of leading whitespace mark a code line; returns the
/// content with the code indent removed. Tabs advance to the next
/// multiple of four columns.
fn indented_content(rest: &str) -> Option<&str> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    let mut cols = 0;
    while i < bytes.len() && cols < 4 {
        match bytes[i] {
            b' ' => cols += 1,
            b'\t' => cols += 4 - cols % 4,
            _ => break,
        }
        i += 1;
    }
    if cols >= 4 {
        Some(&rest[i..])
    } else {
        None
    }
}

fn is_fence(rest: &str) -> bool {
    let line = skip_indent(rest);
    let run = line.len() - line.trim_start_matches('`').len();
    run >= 3
}

fn fence_close(rest: &str, length: usize) -> bool {
    let line = skip_indent(rest).trim_end();
    !line.is_empty() && line.len() >= length && line.bytes().all(|b| b == b'`')
}

/// A `{.class}` style-wrapper line.
fn modifier_class(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix("{.")?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(|c: char| c == '{' || c == '}' || c.is_whitespace()) {
        return None;
    }
    Some(inner)
}

/// An `{{path}}` include line.
fn include_target(trimmed: &str) -> Option<&str> {
    let inner = trimmed.strip_prefix("{{")?.strip_suffix("}}")?.trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}
