//! Markup parsing.
//!
//! The parser turns a UTF-8 buffer into a [`Document`] in a single
//! top-to-bottom scan: a line-oriented reader feeds a block-level
//! dispatcher, paragraph text is resolved by the inline tokenizer and
//! resolver, and `{{path}}` lines pull other documents in through the
//! [`FileSystem`] collaborator. No input ever aborts a parse; problems
//! are collected into an ordered diagnostic list and the best-effort
//! tree is returned alongside them.

mod block;
mod cursor;
mod include;
mod inline;
mod reader;

use thiserror::Error;

use crate::fs::FileSystem;
use crate::types::Document;

use self::block::{BlockParser, DocContext};
use self::include::parent_dir;
use self::reader::Reader;

/// A recoverable problem found during parsing, tied to the document
/// and line that produced it. Rendered as `path:line: message`.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("{path}:{line}: {message}")]
pub struct ParseError {
    pub path: String,
    pub line: u32,
    pub message: String,
}

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum quote/list/include nesting before the parser records an
    /// error instead of recursing further.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Shared state of one top-level parse: the file-system handle, the
/// chain of documents currently being included, and the ordered
/// diagnostic list.
pub(crate) struct Session<'f> {
    pub fs: &'f dyn FileSystem,
    pub options: ParseOptions,
    pub chain: Vec<String>,
    pub errors: Vec<ParseError>,
}

/// Parse a UTF-8 buffer as the document at `path`. The path is used
/// for diagnostics and include-relative resolution only.
///
/// Never fails: returns the best-effort document together with the
/// problems found, in document order.
pub fn parse_content(
    fs: &dyn FileSystem,
    path: &str,
    content: &[u8],
) -> (Document, Vec<ParseError>) {
    parse_content_with(fs, path, content, ParseOptions::default())
}

/// [`parse_content`] with explicit options.
pub fn parse_content_with(
    fs: &dyn FileSystem,
    path: &str,
    content: &[u8],
    options: ParseOptions,
) -> (Document, Vec<ParseError>) {
    let text = String::from_utf8_lossy(content);
    let mut session = Session {
        fs,
        options,
        chain: vec![path.to_string()],
        errors: Vec::new(),
    };
    let mut doc = DocContext {
        reader: Reader::new(&text),
        path: path.to_string(),
        dir: parent_dir(path).to_string(),
    };
    let document = if doc.reader.next_line() {
        BlockParser::new(&mut doc, &mut session, 0).run()
    } else {
        Document::new()
    };
    (document, session.errors)
}

/// Read `path` through the file-system collaborator and parse it.
pub fn parse_file(
    fs: &dyn FileSystem,
    path: &str,
) -> crate::error::Result<(Document, Vec<ParseError>)> {
    let content = fs.read(path).map_err(|err| crate::error::MarqError::Io {
        path: path.into(),
        message: err.to_string(),
    })?;
    Ok(parse_content(fs, path, &content))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::fs::MemFs;
    use crate::types::{
        Block, Code, Image, Inline, Link, List, Modifier, Paragraph, Quote, Section, Separator,
        Sequence,
    };

    use super::*;

    // -- expected-tree helpers --

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn em(items: Vec<Inline>) -> Inline {
        Inline::Emphasis(items)
    }

    fn bold(items: Vec<Inline>) -> Inline {
        Inline::Bold(items)
    }

    fn para(items: Vec<Inline>) -> Block {
        Block::Paragraph(Paragraph { items })
    }

    fn title(items: Vec<Inline>) -> Paragraph {
        Paragraph { items }
    }

    fn h(level: u8, title_items: Vec<Inline>, content: Sequence) -> Block {
        Block::Section(Section {
            level,
            title: title(title_items),
            content,
        })
    }

    fn quote(content: Sequence) -> Block {
        Block::Quote(Quote { content })
    }

    fn code(language: &str, lines: &[&str]) -> Block {
        Block::Code(Code {
            language: language.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        })
    }

    fn ul(items: Vec<Sequence>) -> Block {
        Block::List(List {
            ordered: false,
            items,
        })
    }

    fn ol(items: Vec<Sequence>) -> Block {
        Block::List(List {
            ordered: true,
            items,
        })
    }

    const SB: Inline = Inline::SoftBreak;

    /// Parse `input` under all four supported line-ending styles and
    /// compare both the tree and the rendered error list.
    fn check_errors(input: &str, expected: Sequence, expected_errors: &[&str]) {
        for ending in ["\n", "\r", "\r\n", "\n\r"] {
            let source = input.replace('\n', ending);
            let fs = MemFs::new();
            let (document, errors) = parse_content(&fs, "main.md", source.as_bytes());
            assert_eq!(document, expected, "input {:?} with ending {:?}", input, ending);
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            assert_eq!(rendered, expected_errors, "errors for {:?} with ending {:?}", input, ending);
        }
    }

    fn check(input: &str, expected: Sequence) {
        check_errors(input, expected, &[]);
    }

    // -- paragraphs --

    #[test]
    fn test_single_paragraph() {
        check("ABC", vec![para(vec![text("ABC")])]);
    }

    #[test]
    fn test_soft_break_joins_lines() {
        check("ABC\nDEF", vec![para(vec![text("ABC"), SB, text("DEF")])]);
    }

    #[test]
    fn test_leading_spaces_are_not_strict() {
        check(
            "A\n B\n  C\n   D",
            vec![para(vec![
                text("A"),
                SB,
                text("B"),
                SB,
                text("C"),
                SB,
                text("D"),
            ])],
        );
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        check(
            "A\n\n\n\n\nB",
            vec![para(vec![text("A")]), para(vec![text("B")])],
        );
    }

    #[test]
    fn test_hard_break() {
        check("A  \nB", vec![para(vec![text("A"), Inline::HardBreak, text("B")])]);
    }

    #[test]
    fn test_empty_input() {
        check("", vec![]);
    }

    // -- sections --

    #[test]
    fn test_heading_with_content() {
        check(
            "# Hello\nWorld",
            vec![h(1, vec![text("Hello")], vec![para(vec![text("World")])])],
        );
    }

    #[test]
    fn test_heading_trims_extra_space() {
        check(
            "#     Hello    \nWorld",
            vec![h(1, vec![text("Hello")], vec![para(vec![text("World")])])],
        );
    }

    #[test]
    fn test_heading_trims_trailing_hashes() {
        check(
            "#     Hello    #########   \nWorld",
            vec![h(1, vec![text("Hello")], vec![para(vec![text("World")])])],
        );
    }

    #[test]
    fn test_heading_level_three() {
        check(
            "### Hello\nWorld",
            vec![h(3, vec![text("Hello")], vec![para(vec![text("World")])])],
        );
    }

    #[test]
    fn test_heading_requires_space() {
        check(
            "###Hello\nWorld",
            vec![para(vec![text("###Hello"), SB, text("World")])],
        );
    }

    #[test]
    fn test_heading_with_too_many_hashes() {
        check_errors(
            "######## Hello",
            vec![para(vec![text("######## Hello")])],
            &["main.md:1: Expected heading, but contained too many #"],
        );
    }

    #[test]
    fn test_nested_sections() {
        check(
            "# A1\n## A2\n#### A4\n ## B2",
            vec![h(
                1,
                vec![text("A1")],
                vec![
                    h(
                        2,
                        vec![text("A2")],
                        vec![h(4, vec![text("A4")], vec![])],
                    ),
                    h(2, vec![text("B2")], vec![]),
                ],
            )],
        );
    }

    #[test]
    fn test_setext_heading_equals() {
        check(
            "Hello\n====\nWorld",
            vec![h(1, vec![text("Hello")], vec![para(vec![text("World")])])],
        );
    }

    #[test]
    fn test_setext_heading_dash() {
        check(
            "Hello\n--\nWorld",
            vec![h(2, vec![text("Hello")], vec![para(vec![text("World")])])],
        );
    }

    #[test]
    fn test_three_dashes_are_a_separator_not_setext() {
        check(
            "Hello\n---",
            vec![
                para(vec![text("Hello")]),
                Block::Separator(Separator {
                    title: Paragraph::new(),
                }),
            ],
        );
    }

    // -- quotes --

    #[test]
    fn test_quote_basic() {
        check("> A", vec![quote(vec![para(vec![text("A")])])]);
    }

    #[test]
    fn test_quote_multiple_lines() {
        check(
            "> A\n> B",
            vec![quote(vec![para(vec![text("A"), SB, text("B")])])],
        );
    }

    #[test]
    fn test_quote_lazy_spacing() {
        check(
            "> A\n >B\n  >    C",
            vec![quote(vec![para(vec![
                text("A"),
                SB,
                text("B"),
                SB,
                text("C"),
            ])])],
        );
    }

    #[test]
    fn test_blank_line_splits_quotes() {
        check(
            "> A\n\n>B",
            vec![
                quote(vec![para(vec![text("A")])]),
                quote(vec![para(vec![text("B")])]),
            ],
        );
    }

    #[test]
    fn test_heading_inside_quote() {
        check(
            "> # Hello\n> World",
            vec![quote(vec![h(
                1,
                vec![text("Hello")],
                vec![para(vec![text("World")])],
            )])],
        );
    }

    #[test]
    fn test_nested_quote() {
        check(
            ">> A\n>  >B",
            vec![quote(vec![quote(vec![para(vec![
                text("A"),
                SB,
                text("B"),
            ])])])],
        );
    }

    // -- lists --

    #[test]
    fn test_unordered_list_keeps_stray_delimiter() {
        check("* x *", vec![ul(vec![vec![para(vec![text("x *")])]])]);
    }

    #[test]
    fn test_unordered_list_items() {
        check(
            "* a\n* b\n- c",
            vec![ul(vec![
                vec![para(vec![text("a")])],
                vec![para(vec![text("b")])],
                vec![para(vec![text("c")])],
            ])],
        );
    }

    #[test]
    fn test_list_item_continuation() {
        check(
            "* a\n  b",
            vec![ul(vec![vec![para(vec![text("a"), SB, text("b")])]])],
        );
    }

    #[test]
    fn test_list_item_with_nested_blocks() {
        check(
            "* # T\n  body",
            vec![ul(vec![vec![h(
                1,
                vec![text("T")],
                vec![para(vec![text("body")])],
            )]])],
        );
    }

    #[test]
    fn test_empty_list_item() {
        check("* ", vec![ul(vec![vec![]])]);
    }

    #[test]
    fn test_ordered_list() {
        check(
            "1. a\n2. b",
            vec![ol(vec![
                vec![para(vec![text("a")])],
                vec![para(vec![text("b")])],
            ])],
        );
    }

    #[test]
    fn test_list_ends_at_unindented_line() {
        check(
            "* a\nafter",
            vec![
                ul(vec![vec![para(vec![text("a")])]]),
                para(vec![text("after")]),
            ],
        );
    }

    // -- code --

    #[test]
    fn test_fence_basic() {
        check("```\nCODE\n```", vec![code("", &["CODE"])]);
    }

    #[test]
    fn test_fence_language() {
        check("``` md\nCODE\n```", vec![code("md", &["CODE"])]);
    }

    #[test]
    fn test_fence_preserves_empty_lines() {
        check(
            "```md\n\nCO\n\nDE\n\n```",
            vec![code("md", &["", "CO", "", "DE", ""])],
        );
    }

    #[test]
    fn test_fence_preserves_symbols() {
        check(
            "```md\n!@#$%^&*()_+/*-+!@#$%^&*()_+/*-+\n```",
            vec![code("md", &["!@#$%^&*()_+/*-+!@#$%^&*()_+/*-+"])],
        );
    }

    #[test]
    fn test_fence_preserves_whitespace() {
        check(
            "```md\n{\n\tX\n   \n    }    \n```",
            vec![code("md", &["{", "\tX", "   ", "    }    "])],
        );
    }

    #[test]
    fn test_fence_close_needs_at_least_open_length() {
        check_errors(
            "````md\nCODE\n```",
            vec![code("md", &["CODE", "```"])],
            &["main.md:1: Unterminated code fence"],
        );
    }

    #[test]
    fn test_unterminated_fence_keeps_content() {
        check_errors(
            "```\nA\nB",
            vec![code("", &["A", "B"])],
            &["main.md:1: Unterminated code fence"],
        );
    }

    #[test]
    fn test_indented_code_basic() {
        check("    CODE", vec![code("", &["CODE"])]);
    }

    #[test]
    fn test_indented_code_preserves_empty_lines() {
        check(
            "    \n    CO\n    \n    DE\n    ",
            vec![code("", &["", "CO", "", "DE", ""])],
        );
    }

    #[test]
    fn test_indented_code_preserves_tail_whitespace() {
        check("    \tX  ", vec![code("", &["\tX  "])]);
    }

    #[test]
    fn test_indented_code_lazy_blank_lines() {
        check("    A\n\n\n    B", vec![code("", &["A", "", "", "B"])]);
    }

    #[test]
    fn test_indented_code_pushes_back_paragraph() {
        check(
            "    A\nB",
            vec![code("", &["A"]), para(vec![text("B")])],
        );
    }

    // -- separators and modifiers --

    #[test]
    fn test_separator_with_title() {
        check(
            "--- Interlude ---",
            vec![Block::Separator(Separator {
                title: title(vec![text("Interlude")]),
            })],
        );
    }

    #[test]
    fn test_modifier_wraps_next_paragraph() {
        check(
            "{.warning}\nCareful now",
            vec![Block::Modifier(Modifier {
                class: "warning".to_string(),
                content: vec![para(vec![text("Careful now")])],
            })],
        );
    }

    #[test]
    fn test_unused_modifier_is_dropped() {
        check("{.warning}", vec![]);
    }

    // -- inline integration --

    #[test]
    fn test_emphasis_and_bold_side_by_side() {
        check(
            "*x***x**",
            vec![para(vec![em(vec![text("x")]), bold(vec![text("x")])])],
        );
        check(
            "**x***x*",
            vec![para(vec![bold(vec![text("x")]), em(vec![text("x")])])],
        );
    }

    #[test]
    fn test_code_span_protects_markup() {
        check(
            "`*a* **b**`",
            vec![para(vec![Inline::Code("*a* **b**".to_string())])],
        );
    }

    #[test]
    fn test_link_wins_over_emphasis() {
        check(
            "*[x*](url)",
            vec![para(vec![
                text("*"),
                Inline::Link(Link {
                    href: "url".to_string(),
                    title: title(vec![text("x*")]),
                }),
            ])],
        );
    }

    #[test]
    fn test_inline_image_in_paragraph() {
        check(
            "See ![a chart](chart.png).",
            vec![para(vec![
                text("See "),
                Inline::Image(Image {
                    href: "chart.png".to_string(),
                    alt: title(vec![text("a chart")]),
                }),
                text("."),
            ])],
        );
    }

    // -- includes --

    fn fs_with(files: &[(&str, &str)]) -> MemFs {
        let mut fs = MemFs::new();
        for (path, content) in files {
            fs.insert(*path, *content);
        }
        fs
    }

    #[test]
    fn test_include_splices_blocks() {
        let fs = fs_with(&[("part.md", "P1\n\nP2")]);
        let (document, errors) = parse_content(&fs, "main.md", b"A\n{{part.md}}\nB");

        assert_eq!(errors, vec![]);
        assert_eq!(
            document,
            vec![
                para(vec![text("A")]),
                para(vec![text("P1")]),
                para(vec![text("P2")]),
                para(vec![text("B")]),
            ]
        );
    }

    #[test]
    fn test_include_continues_section_nesting() {
        let fs = fs_with(&[("part.md", "## Part\ninner")]);
        let (document, errors) = parse_content(&fs, "main.md", b"# Top\n{{part.md}}\nafter");

        assert_eq!(errors, vec![]);
        assert_eq!(
            document,
            vec![h(
                1,
                vec![text("Top")],
                vec![h(
                    2,
                    vec![text("Part")],
                    vec![para(vec![text("inner")]), para(vec![text("after")])],
                )],
            )]
        );
    }

    #[test]
    fn test_include_resolves_relative_to_document() {
        let fs = fs_with(&[("book/ch1.md", "{{sub/leaf.md}}"), ("book/sub/leaf.md", "leaf")]);
        let (document, errors) = parse_file(&fs, "book/ch1.md").unwrap();

        assert_eq!(errors, vec![]);
        assert_eq!(document, vec![para(vec![text("leaf")])]);
    }

    #[test]
    fn test_missing_include_records_error() {
        let fs = MemFs::new();
        let (document, errors) = parse_content(&fs, "main.md", b"{{gone.md}}");

        assert_eq!(document, vec![]);
        let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["main.md:1: Include target does not exist: gone.md"]
        );
    }

    #[test]
    fn test_mutual_includes_record_one_error() {
        let fs = fs_with(&[("a.md", "A\n{{b.md}}"), ("b.md", "B\n{{a.md}}\nB2")]);
        let (document, errors) = parse_file(&fs, "a.md").unwrap();

        assert_eq!(
            document,
            vec![
                para(vec![text("A")]),
                para(vec![text("B")]),
                para(vec![text("B2")]),
            ]
        );
        let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(rendered, vec!["b.md:2: Recursive include of a.md"]);
    }

    #[test]
    fn test_self_include_records_error() {
        let fs = fs_with(&[("a.md", "{{a.md}}")]);
        let (document, errors) = parse_file(&fs, "a.md").unwrap();

        assert_eq!(document, vec![]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Recursive include of a.md");
    }

    // -- nesting limits --

    #[test]
    fn test_nesting_depth_is_bounded() {
        let depth = 100;
        let mut source = String::new();
        for _ in 0..depth {
            source.push('>');
        }
        source.push_str(" deep");

        let fs = MemFs::new();
        let (_, errors) = parse_content_with(
            &fs,
            "main.md",
            source.as_bytes(),
            ParseOptions { max_depth: 8 },
        );
        assert!(!errors.is_empty());
        assert!(errors[0].message.contains("Nesting deeper than"));
    }

    // -- determinism --

    #[test]
    fn test_parse_is_deterministic() {
        let source = b"# T\n> quoted *em*\n\n* a\n* b\n\n```rs\nfn x() {}\n```";
        let fs = MemFs::new();
        let (first, first_errors) = parse_content(&fs, "main.md", source);
        let (second, second_errors) = parse_content(&fs, "main.md", source);

        assert_eq!(first, second);
        assert_eq!(first_errors, second_errors);
    }
}
