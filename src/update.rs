//! Inbound chat updates and what to do with them.
//!
//! Only the fields the memo flow reads are modeled; everything else in the
//! payload is ignored by serde.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::spans_to_markdown;
use crate::index::OffsetUnit;
use crate::memo::{MemoDraft, compose};
use crate::span::Span;

/// Bot API download limit (20 MiB).
pub const MAX_DOWNLOAD_SIZE: u64 = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(default)]
    pub file_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub file: FileInfo,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sticker {
    #[serde(flatten)]
    pub file: FileInfo,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<Span>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub caption_entities: Vec<Span>,
    #[serde(default)]
    pub photo: Vec<FileInfo>,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub sticker: Option<Sticker>,
}

/// A file attached to a message, ready to be fetched and uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
}

impl Attachment {
    /// Refuse files the bot API will not hand out.
    pub fn check_size(&self, limit: u64) -> Result<()> {
        if self.file_size >= limit {
            return Err(Error::FileTooLarge {
                size: self.file_size,
                limit,
            });
        }
        Ok(())
    }
}

/// What a message asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Reply to `/start`
    Greet,
    /// Sender has no notes endpoint configured
    NotRegistered { user_id: i64 },
    /// Nothing to act on (no sender, e.g. channel posts)
    Ignore,
    /// Store a memo
    Memo(MemoDraft),
}

impl Message {
    /// Markdown for the message's text, or for its caption when it has no text.
    pub fn content(&self, unit: OffsetUnit) -> Result<String> {
        match (self.text.as_deref(), self.caption.as_deref()) {
            (Some(text), _) if !text.is_empty() => spans_to_markdown(text, &self.entities, unit),
            (_, Some(caption)) => spans_to_markdown(caption, &self.caption_entities, unit),
            _ => Ok(String::new()),
        }
    }

    /// The file to store alongside the memo, if any.
    ///
    /// Photos arrive in several sizes; the last one is the largest.
    /// Animated stickers have no still form and are skipped.
    pub fn attachment(&self) -> Option<Attachment> {
        if let Some(photo) = self.photo.last() {
            return Some(Attachment {
                file_id: photo.file_id.clone(),
                file_name: format!("tg-photo-{}.jpg", photo.file_unique_id),
                mime_type: "image/*".to_string(),
                file_size: photo.file_size,
            });
        }

        if let Some(document) = &self.document {
            return Some(Attachment {
                file_id: document.file.file_id.clone(),
                file_name: document
                    .file_name
                    .clone()
                    .unwrap_or_else(|| format!("tg-document-{}", document.file.file_unique_id)),
                mime_type: document
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                file_size: document.file.file_size,
            });
        }

        match &self.sticker {
            Some(sticker) if !sticker.is_animated => {
                let (mime_type, ext) = if sticker.is_video {
                    ("video/*", ".webm")
                } else {
                    ("image/*", ".webp")
                };
                Some(Attachment {
                    file_id: sticker.file.file_id.clone(),
                    file_name: format!("tg-sticker-{}{}", sticker.file.file_unique_id, ext),
                    mime_type: mime_type.to_string(),
                    file_size: sticker.file.file_size,
                })
            }
            _ => None,
        }
    }

    /// Decide what to do with this message.
    ///
    /// Only senders listed in the config's `[users]` table may store memos.
    pub fn plan(&self, config: &Config) -> Result<Action> {
        if self.text.as_deref() == Some("/start") {
            return Ok(Action::Greet);
        }

        let Some(user) = &self.from else {
            debug!(message_id = self.message_id, "message has no sender");
            return Ok(Action::Ignore);
        };
        let Some(endpoint) = config.endpoint_for(user.id) else {
            debug!(user_id = user.id, "sender is not registered");
            return Ok(Action::NotRegistered { user_id: user.id });
        };

        let body = self.content(config.format.offsets)?;
        let content = compose(
            config.memo.prefix.as_deref(),
            &body,
            config.memo.suffix.as_deref(),
        );

        if self.text.as_deref().is_some_and(|text| !text.is_empty()) {
            return Ok(Action::Memo(MemoDraft {
                endpoint: endpoint.to_string(),
                content,
                attachment: None,
            }));
        }

        let Some(attachment) = self.attachment() else {
            debug!(message_id = self.message_id, "no text or supported attachment");
            return Err(Error::UnsupportedMessage);
        };
        attachment.check_size(config.attachments.max_size)?;

        Ok(Action::Memo(MemoDraft {
            endpoint: endpoint.to_string(),
            content,
            attachment: Some(attachment),
        }))
    }
}
