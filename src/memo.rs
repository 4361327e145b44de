use serde::Serialize;

use crate::update::Attachment;

/// A memo ready to hand to the notes service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoDraft {
    /// Notes API endpoint of the sender
    pub endpoint: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

/// Join prefix, body and suffix line by line, skipping empty parts.
pub fn compose(prefix: Option<&str>, body: &str, suffix: Option<&str>) -> String {
    [prefix, Some(body), suffix]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_only() {
        assert_eq!(compose(None, "hello", None), "hello");
    }

    #[test]
    fn prefix_and_suffix() {
        assert_eq!(
            compose(Some("#inbox"), "**hello**", Some("via bot")),
            "#inbox\n**hello**\nvia bot"
        );
    }

    #[test]
    fn skips_empty_parts() {
        assert_eq!(compose(Some(""), "", Some("via bot")), "via bot");
        assert_eq!(compose(Some(""), "", None), "");
    }
}
