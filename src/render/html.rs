//! HTML rendering of the document tree.
//!
//! A pure recursive tree-walk: every block and inline variant maps to
//! its output form, literal text is escaped, attribute values are
//! escaped for double-quoted contexts. Variants without a full HTML
//! form yet produce an inert placeholder rather than aborting the
//! render. `href` values pass through unsanitized; whether to reject
//! unsafe schemes is a policy question for the caller, not this walk.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::types::{Block, Image, Inline, Paragraph, Sequence};

/// Render a document to an HTML fragment.
pub fn render(document: &Sequence) -> String {
    let mut out = String::new();
    sequence(&mut out, document);
    out
}

/// Render resolved inline content to an HTML fragment.
pub fn render_inline(items: &[Inline]) -> String {
    let mut out = String::new();
    inline_items(&mut out, items);
    out
}

fn sequence(out: &mut String, blocks: &Sequence) {
    for item in blocks {
        block(out, item);
    }
}

fn block(out: &mut String, item: &Block) {
    match item {
        Block::Paragraph(p) => {
            out.push_str("<p>");
            inline_items(out, &p.items);
            out.push_str("</p>");
        }
        Block::Section(s) => {
            let _ = write!(out, "<section><h{}>", s.level);
            inline_items(out, &s.title.items);
            let _ = write!(out, "</h{}>", s.level);
            sequence(out, &s.content);
            out.push_str("</section>");
        }
        Block::Quote(q) => {
            out.push_str("<blockquote>");
            sequence(out, &q.content);
            out.push_str("</blockquote>");
        }
        Block::Modifier(m) => {
            let _ = write!(out, "<div class=\"{}\">", encode_double_quoted_attribute(&m.class));
            sequence(out, &m.content);
            out.push_str("</div>");
        }
        Block::Code(c) => {
            if c.language.is_empty() {
                out.push_str("<pre><code>");
            } else {
                let _ = write!(
                    out,
                    "<pre><code class=\"language-{}\">",
                    encode_double_quoted_attribute(&c.language)
                );
            }
            out.push_str(&encode_text(&c.lines.join("\n")));
            out.push_str("</code></pre>");
        }
        Block::List(l) => {
            out.push_str(if l.ordered { "<ol>" } else { "<ul>" });
            for item in &l.items {
                out.push_str("<li>");
                match item.as_slice() {
                    // A lone paragraph item drops its wrapper.
                    [Block::Paragraph(p)] => inline_items(out, &p.items),
                    _ => sequence(out, item),
                }
                out.push_str("</li>");
            }
            out.push_str(if l.ordered { "</ol>" } else { "</ul>" });
        }
        Block::Image(image) => figure(out, image),
        Block::Separator(s) => {
            if s.title.is_empty() {
                out.push_str("<hr>");
            } else {
                out.push_str("<div class=\"separator\">");
                inline_items(out, &s.title.items);
                out.push_str("</div>");
            }
        }
    }
}

fn inline_items(out: &mut String, items: &[Inline]) {
    for item in items {
        inline(out, item);
    }
}

fn inline(out: &mut String, item: &Inline) {
    match item {
        Inline::Text(text) => out.push_str(&encode_text(text)),
        Inline::Emphasis(items) => {
            out.push_str("<em>");
            inline_items(out, items);
            out.push_str("</em>");
        }
        Inline::Bold(items) => {
            out.push_str("<b>");
            inline_items(out, items);
            out.push_str("</b>");
        }
        Inline::Code(text) => {
            out.push_str("<code>");
            out.push_str(&encode_text(text));
            out.push_str("</code>");
        }
        Inline::SoftBreak => out.push('\n'),
        Inline::HardBreak => out.push_str("<br>"),
        Inline::Link(link) => {
            let _ = write!(out, "<a href=\"{}\">", encode_double_quoted_attribute(&link.href));
            inline_items(out, &link.title.items);
            out.push_str("</a>");
        }
        Inline::Image(image) => figure(out, image),
        Inline::Callout(text) => {
            out.push_str("<span class=\"callout\">");
            out.push_str(&encode_text(text));
            out.push_str("</span>");
        }
        Inline::Index(term) => {
            // An invisible anchor; only the term attribute carries data.
            let _ = write!(
                out,
                "<span class=\"index\" data-term=\"{}\"></span>",
                encode_double_quoted_attribute(term)
            );
        }
        Inline::Modifier(m) => {
            let _ = write!(out, "<span class=\"{}\">", encode_double_quoted_attribute(&m.class));
            inline_items(out, &m.content);
            out.push_str("</span>");
        }
    }
}

fn figure(out: &mut String, image: &Image) {
    let _ = write!(
        out,
        "<figure><img src=\"{}\" alt=\"{}\">",
        encode_double_quoted_attribute(&image.href),
        encode_double_quoted_attribute(&plain_text(&image.alt))
    );
    if !image.alt.is_empty() {
        out.push_str("<figcaption>");
        inline_items(out, &image.alt.items);
        out.push_str("</figcaption>");
    }
    out.push_str("</figure>");
}

/// Flatten resolved inline content to plain text, for attribute values.
fn plain_text(paragraph: &Paragraph) -> String {
    fn collect(out: &mut String, items: &[Inline]) {
        for item in items {
            match item {
                Inline::Text(t) | Inline::Code(t) | Inline::Callout(t) => out.push_str(t),
                Inline::Emphasis(items) | Inline::Bold(items) => collect(out, items),
                Inline::Link(link) => collect(out, &link.title.items),
                Inline::Image(image) => collect(out, &image.alt.items),
                Inline::Modifier(m) => collect(out, &m.content),
                Inline::SoftBreak | Inline::HardBreak => out.push(' '),
                Inline::Index(_) => {}
            }
        }
    }
    let mut out = String::new();
    collect(&mut out, &paragraph.items);
    out
}
