//! Chat transcript
//!
//! The ordered list of messages a surface has shown. The engine never keeps
//! history itself; surfaces own a [`Transcript`] and append to it.

use serde::{Deserialize, Serialize};

use crate::format::RichTextNode;
use crate::render::render_plain;

/// Who a message is from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Typed by the user
    User,
    /// Sent by the assistant
    Assistant,
    /// Synthetic connection notice
    System,
}

impl MessageRole {
    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
            Self::System => "System",
        }
    }
}

/// Message body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum MessageContent {
    /// Shown exactly as written; never interpreted as markup
    Literal(String),
    /// Formatted assistant output
    Rich(Vec<RichTextNode>),
}

impl MessageContent {
    /// Markup-free text of the message
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Rich(nodes) => render_plain(nodes),
        }
    }
}

/// A message in the transcript; immutable once appended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    position: u64,
    role: MessageRole,
    content: MessageContent,
}

impl ChatMessage {
    /// Zero-based index in the transcript
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Sender
    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// Body
    #[must_use]
    pub fn content(&self) -> &MessageContent {
        &self.content
    }
}

/// Append-only, ordered message store
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, assigning the next position
    pub fn append(&mut self, role: MessageRole, content: MessageContent) -> &ChatMessage {
        let position = self.messages.len() as u64;
        self.messages.push(ChatMessage {
            position,
            role,
            content,
        });
        &self.messages[self.messages.len() - 1]
    }

    /// All messages in order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been appended
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
