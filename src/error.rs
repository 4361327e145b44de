//! Error types for tgmemo operations.

use thiserror::Error;

use crate::span::StyleKind;

/// Errors that can occur while converting updates into memos.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} span at offset {offset} is missing its {attribute}")]
    MissingAttribute {
        kind: StyleKind,
        attribute: &'static str,
        offset: usize,
    },

    #[error("Bot API limit file max size: {limit} bytes (file is {size} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Not implemented message type")]
    UnsupportedMessage,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
