//! Chat module
//!
//! Message types, prompt assembly, bounded turn history, and the Ollama
//! client that streams replies.

pub mod client;
pub mod history;
pub mod prompt;
pub mod think;

pub use client::{ChatClient, ChatEvent};
pub use history::History;
pub use prompt::{build_messages, PromptInputs, GUARD_PROMPT, SYSTEM_PROMPT};
pub use think::{parse_think_tags, ParsedReply, Segment, ThinkFilter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
