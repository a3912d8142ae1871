use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
    Options,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Options(Vec<String>),
}

/// A display record produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub content: MessageContent,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::User,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Bot,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn options(options: Vec<String>) -> Self {
        Self {
            kind: MessageKind::Options,
            content: MessageContent::Options(options),
        }
    }

    /// Text of a user or bot message; `None` for option lists.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Options(_) => None,
        }
    }
}
