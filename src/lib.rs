mod config;
mod error;
mod format;
mod index;
mod memo;
mod parser;
mod span;
mod update;

pub use config::{AttachmentsConfig, Config, FormatConfig, MemoConfig};
pub use error::{Error, Result};
pub use index::OffsetUnit;
pub use memo::{MemoDraft, compose};
pub use span::{FormattedText, Span, StyleKind};
pub use update::{
    Action, Attachment, Chat, Document, FileInfo, MAX_DOWNLOAD_SIZE, Message, Sticker, Update,
    User,
};

/// Convert text plus UTF-16 offset spans to markdown.
pub fn to_markdown(text: &str, spans: &[Span]) -> Result<String> {
    to_markdown_with_unit(text, spans, OffsetUnit::Utf16)
}

/// Convert text plus spans to markdown, with offsets counted in `unit`.
pub fn to_markdown_with_unit(text: &str, spans: &[Span], unit: OffsetUnit) -> Result<String> {
    format::spans_to_markdown(text, spans, unit)
}

/// Parse markdown into text plus UTF-16 offset spans.
pub fn markdown_to_entities(markdown: &str) -> FormattedText {
    markdown_to_entities_with_unit(markdown, OffsetUnit::Utf16)
}

/// Parse markdown into text plus spans, with offsets counted in `unit`.
pub fn markdown_to_entities_with_unit(markdown: &str, unit: OffsetUnit) -> FormattedText {
    parser::parse(markdown, unit)
}

/// Plan the handling of an update using default config.
///
/// Updates without a message (edits, callbacks...) yield `None`.
pub fn plan_update(update: &Update) -> Result<Option<Action>> {
    plan_update_with_config(update, &Config::compiled_default())
}

/// Plan the handling of an update with custom config.
pub fn plan_update_with_config(update: &Update, config: &Config) -> Result<Option<Action>> {
    update
        .message
        .as_ref()
        .map(|message| message.plan(config))
        .transpose()
}
