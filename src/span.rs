use serde::{Deserialize, Serialize};

/// Style carried by a [`Span`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    TextLink,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Pre,
    /// Any kind without a markdown mapping (mentions, hashtags, spoilers...)
    #[serde(other)]
    Other,
}

impl StyleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKind::TextLink => "text_link",
            StyleKind::Bold => "bold",
            StyleKind::Italic => "italic",
            StyleKind::Underline => "underline",
            StyleKind::Strikethrough => "strikethrough",
            StyleKind::Code => "code",
            StyleKind::Pre => "pre",
            StyleKind::Other => "other",
        }
    }
}

impl std::fmt::Display for StyleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A styled half-open interval `[offset, offset + length)` over some text.
///
/// Field names follow the chat platform's message entity, so a span list
/// deserializes straight from an update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "type")]
    pub kind: StyleKind,
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Span {
    pub fn new(kind: StyleKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
            language: None,
        }
    }

    pub fn link(offset: usize, length: usize, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(StyleKind::TextLink, offset, length)
        }
    }

    pub fn pre(offset: usize, length: usize, language: Option<String>) -> Self {
        Self {
            language,
            ..Self::new(StyleKind::Pre, offset, length)
        }
    }

    /// Exclusive end of the interval.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

/// Plain text together with the spans styling it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedText {
    pub text: String,
    #[serde(default)]
    pub entities: Vec<Span>,
}
