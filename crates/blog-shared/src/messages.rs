//! One-shot status messages shown on the next rendered page.

use serde::{Deserialize, Serialize};

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    /// CSS class suffix used by templates.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub severity: Severity,
    pub text: String,
}

impl StatusMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// An ordered queue of pending status messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMessages(Vec<StatusMessage>);

impl StatusMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, text: impl Into<String>) {
        self.0.push(StatusMessage::new(severity, text));
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Severity::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Severity::Error, text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Severity::Info, text);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusMessage> {
        self.0.iter()
    }

    /// Remove and return every pending message, oldest first.
    pub fn drain(&mut self) -> Vec<StatusMessage> {
        std::mem::take(&mut self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue_in_order() {
        let mut messages = StatusMessages::new();
        messages.error("first");
        messages.info("second");

        let drained = messages.drain();

        assert_eq!(
            drained,
            vec![
                StatusMessage::new(Severity::Error, "first"),
                StatusMessage::new(Severity::Info, "second"),
            ]
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut messages = StatusMessages::new();
        messages.success("Post deleted");

        let json = serde_json::to_string(&messages).unwrap();
        assert_eq!(json, r#"[{"severity":"success","text":"Post deleted"}]"#);

        let parsed: StatusMessages = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, messages);
    }
}
