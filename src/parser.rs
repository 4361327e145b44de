use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::index::OffsetUnit;
use crate::span::{FormattedText, Span, StyleKind};

/// Parse markdown into plain text plus the spans styling it
pub fn parse(markdown: &str, unit: OffsetUnit) -> FormattedText {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut state = ParseState::new(unit);

    for event in parser {
        process_event(event, &mut state);
    }

    let mut entities = state.entities;
    // Outer spans first when two start together
    entities.sort_by(|a, b| a.offset.cmp(&b.offset).then(b.length.cmp(&a.length)));

    FormattedText {
        text: state.text,
        entities,
    }
}

struct ParseState {
    unit: OffsetUnit,
    text: String,
    // Length of `text` in `unit`
    len: usize,
    entities: Vec<Span>,
    // Stack for nested formatting
    open: Vec<OpenSpan>,
    // Lists currently open; blocks inside them sit on adjacent lines
    list_depth: usize,

    // Code block state
    in_code_block: bool,
    code_content: String,
}

struct OpenSpan {
    kind: StyleKind,
    start: usize,
    url: Option<String>,
    language: Option<String>,
}

impl ParseState {
    fn new(unit: OffsetUnit) -> Self {
        Self {
            unit,
            text: String::new(),
            len: 0,
            entities: Vec::new(),
            open: Vec::new(),
            list_depth: 0,
            in_code_block: false,
            code_content: String::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.len += self.unit.measure(text);
    }

    /// Separate a new block from whatever came before it by `newlines`.
    fn begin_block(&mut self, newlines: usize) {
        if self.text.is_empty() {
            return;
        }
        let trailing = self.text.len() - self.text.trim_end_matches('\n').len();
        for _ in trailing..newlines {
            self.push_text("\n");
        }
    }

    /// Newlines between sibling blocks at the current nesting.
    fn block_gap(&self) -> usize {
        if self.list_depth > 0 { 1 } else { 2 }
    }

    fn open(&mut self, kind: StyleKind) {
        self.open_with(kind, None, None);
    }

    fn open_with(&mut self, kind: StyleKind, url: Option<String>, language: Option<String>) {
        self.open.push(OpenSpan {
            kind,
            start: self.len,
            url,
            language,
        });
    }

    fn close(&mut self, kind: StyleKind) {
        let Some(position) = self.open.iter().rposition(|span| span.kind == kind) else {
            return;
        };
        let span = self.open.remove(position);
        let length = self.len - span.start;
        if length > 0 {
            self.entities.push(Span {
                kind,
                offset: span.start,
                length,
                url: span.url,
                language: span.language,
            });
        }
    }
}

fn process_event(event: Event, state: &mut ParseState) {
    match event {
        // Blocks
        Event::Start(Tag::Paragraph) | Event::Start(Tag::Heading { .. }) => {
            state.begin_block(state.block_gap());
        }

        // Lists
        Event::Start(Tag::List(_)) => {
            state.begin_block(state.block_gap());
            state.list_depth += 1;
        }
        Event::End(TagEnd::List(_)) => {
            state.list_depth = state.list_depth.saturating_sub(1);
        }
        Event::Start(Tag::Item) => {
            state.begin_block(1);
        }

        // Text content
        Event::Text(text) => {
            if state.in_code_block {
                state.code_content.push_str(&text);
            } else {
                state.push_text(&text);
            }
        }
        Event::Html(html) | Event::InlineHtml(html) => {
            state.push_text(&html);
        }

        // Inline code
        Event::Code(code) => {
            state.open(StyleKind::Code);
            state.push_text(&code);
            state.close(StyleKind::Code);
        }

        // Bold
        Event::Start(Tag::Strong) => state.open(StyleKind::Bold),
        Event::End(TagEnd::Strong) => state.close(StyleKind::Bold),

        // Italic
        Event::Start(Tag::Emphasis) => state.open(StyleKind::Italic),
        Event::End(TagEnd::Emphasis) => state.close(StyleKind::Italic),

        // Strikethrough
        Event::Start(Tag::Strikethrough) => state.open(StyleKind::Strikethrough),
        Event::End(TagEnd::Strikethrough) => state.close(StyleKind::Strikethrough),

        // Links
        Event::Start(Tag::Link { dest_url, .. }) => {
            state.open_with(StyleKind::TextLink, Some(dest_url.into_string()), None);
        }
        Event::End(TagEnd::Link) => state.close(StyleKind::TextLink),

        // Code blocks
        Event::Start(Tag::CodeBlock(kind)) => {
            state.begin_block(state.block_gap());
            state.in_code_block = true;
            let language = match kind {
                CodeBlockKind::Fenced(lang) => {
                    let lang = lang.into_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                CodeBlockKind::Indented => None,
            };
            state.code_content.clear();
            state.open_with(StyleKind::Pre, None, language);
        }
        Event::End(TagEnd::CodeBlock) => {
            state.in_code_block = false;
            let mut content = std::mem::take(&mut state.code_content);
            // The closing fence sits on its own line
            if content.ends_with('\n') {
                content.pop();
            }
            state.push_text(&content);
            state.close(StyleKind::Pre);
        }

        // Soft/hard breaks
        Event::SoftBreak | Event::HardBreak => {
            state.push_text("\n");
        }

        // Ignore other events
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::spans_to_markdown;

    fn parse16(markdown: &str) -> FormattedText {
        parse(markdown, OffsetUnit::Utf16)
    }

    #[test]
    fn plain_paragraph() {
        assert_eq!(
            parse16("sss"),
            FormattedText {
                text: "sss".to_string(),
                entities: vec![],
            }
        );
    }

    #[test]
    fn italic() {
        let parsed = parse16("ds*gsd*gsgsd");
        assert_eq!(parsed.text, "dsgsdgsgsd");
        assert_eq!(parsed.entities, vec![Span::new(StyleKind::Italic, 2, 3)]);
    }

    #[test]
    fn links() {
        let parsed = parse16("fsafa[fasfdsgd](https://001.example.com/)sg");
        assert_eq!(parsed.text, "fsafafasfdsgdsg");
        assert_eq!(
            parsed.entities,
            vec![Span::link(5, 8, "https://001.example.com/")]
        );
    }

    #[test]
    fn inline_code() {
        let parsed = parse16("fsaf`afas`fas");
        assert_eq!(parsed.text, "fsafafasfas");
        assert_eq!(parsed.entities, vec![Span::new(StyleKind::Code, 4, 4)]);
    }

    #[test]
    fn fenced_code_block() {
        let parsed = parse16("```rust\nlet x = 1;\n```");
        assert_eq!(parsed.text, "let x = 1;");
        assert_eq!(
            parsed.entities,
            vec![Span::pre(0, 10, Some("rust".to_string()))]
        );
    }

    #[test]
    fn strikethrough_and_bold() {
        let parsed = parse16("**bold** ~~gone~~");
        assert_eq!(parsed.text, "bold gone");
        assert_eq!(
            parsed.entities,
            vec![
                Span::new(StyleKind::Bold, 0, 4),
                Span::new(StyleKind::Strikethrough, 5, 4),
            ]
        );
    }

    #[test]
    fn nested_spans_list_outer_first() {
        let parsed = parse16("**bold *both***");
        assert_eq!(parsed.text, "bold both");
        assert_eq!(
            parsed.entities,
            vec![
                Span::new(StyleKind::Bold, 0, 9),
                Span::new(StyleKind::Italic, 5, 4),
            ]
        );
    }

    #[test]
    fn paragraphs_are_separated_by_a_blank_line() {
        let parsed = parse16("one\n\n**two**");
        assert_eq!(parsed.text, "one\n\ntwo");
        assert_eq!(parsed.entities, vec![Span::new(StyleKind::Bold, 5, 3)]);
    }

    #[test]
    fn list_after_paragraph_is_its_own_block() {
        assert_eq!(parse16("para\n\n- a\n- b").text, "para\n\na\nb");
        assert_eq!(
            parse16("para\n\n1. x\n2. y\n\nend").text,
            "para\n\nx\ny\n\nend"
        );
    }

    #[test]
    fn loose_list_items_stay_on_adjacent_lines() {
        assert_eq!(parse16("- a\n\n- b").text, "a\nb");
    }

    #[test]
    fn nested_list_items() {
        let parsed = parse16("- a\n  - **b**\n- c");
        assert_eq!(parsed.text, "a\nb\nc");
        assert_eq!(parsed.entities, vec![Span::new(StyleKind::Bold, 2, 1)]);
    }

    #[test]
    fn offsets_count_utf16_units() {
        let parsed = parse16("😀 **hi**");
        assert_eq!(parsed.entities, vec![Span::new(StyleKind::Bold, 3, 2)]);
        let parsed = parse("😀 **hi**", OffsetUnit::Char);
        assert_eq!(parsed.entities, vec![Span::new(StyleKind::Bold, 2, 2)]);
    }

    #[test]
    fn round_trips_through_the_formatter() {
        for markdown in [
            "sss",
            "ds*gsd*gsgsd",
            "fsaf`afas`fas",
            "```\njson\naaa\n```",
            "fsafa[fasfdsgd](https://001.example.com/)sgfdshfdh[dfghfgh](https://002.example.com/)gfhgfhgfh[gfh](https://003.example.com/)gf",
            "**bold** ~~gone~~",
        ] {
            let parsed = parse16(markdown);
            let rendered =
                spans_to_markdown(&parsed.text, &parsed.entities, OffsetUnit::Utf16).unwrap();
            assert_eq!(rendered, markdown);
        }
    }
}
