use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::Result;
use crate::index::OffsetUnit;
use crate::update::MAX_DOWNLOAD_SIZE;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub memo: MemoConfig,
    pub format: FormatConfig,
    pub attachments: AttachmentsConfig,
    /// Sender id -> notes API endpoint. Senders not listed cannot store memos.
    pub users: BTreeMap<String, String>,
}

/// Lines wrapped around every memo body
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct MemoConfig {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FormatConfig {
    pub offsets: OffsetUnit,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AttachmentsConfig {
    pub max_size: u64,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_DOWNLOAD_SIZE,
        }
    }
}

impl Config {
    /// The configuration bundled with the crate.
    pub fn compiled_default() -> Self {
        // build.rs rejects a malformed default file
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Notes endpoint registered for a sender.
    pub fn endpoint_for(&self, user_id: i64) -> Option<&str> {
        self.users
            .get(&user_id.to_string())
            .map(String::as_str)
            .filter(|endpoint| !endpoint.is_empty())
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "{e}; using defaults");
                Self::compiled_default()
            }),
            Err(_) => Self::compiled_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_default_matches_default() {
        let config = Config::compiled_default();
        assert_eq!(config.format.offsets, OffsetUnit::Utf16);
        assert_eq!(config.attachments.max_size, MAX_DOWNLOAD_SIZE);
        assert_eq!(config.memo.prefix.as_deref(), Some(""));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml("[memo]\nsuffix = \"via bot\"\n").unwrap();
        assert_eq!(config.memo.suffix.as_deref(), Some("via bot"));
        assert_eq!(config.memo.prefix, None);
        assert_eq!(config.format.offsets, OffsetUnit::Utf16);
        assert_eq!(config.attachments.max_size, MAX_DOWNLOAD_SIZE);
    }

    #[test]
    fn looks_up_registered_senders() {
        let config = Config::from_toml(
            "[users]\n42 = \"https://memos.example.com/?openId=abc\"\n7 = \"\"\n",
        )
        .unwrap();
        assert_eq!(
            config.endpoint_for(42),
            Some("https://memos.example.com/?openId=abc")
        );
        assert_eq!(config.endpoint_for(7), None);
        assert_eq!(config.endpoint_for(999), None);
        assert!(Config::compiled_default().users.is_empty());
    }

    #[test]
    fn reads_offset_unit() {
        let config = Config::from_toml("[format]\noffsets = \"char\"\n").unwrap();
        assert_eq!(config.format.offsets, OffsetUnit::Char);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_toml("[format]\noffsets = \"words\"\n").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/tgmemo.toml"));
        assert_eq!(config.attachments.max_size, MAX_DOWNLOAD_SIZE);
    }
}
