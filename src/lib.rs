//! Alice - terminal chat assistant with persistent memory
//!
//! A small conversational loop over a local Ollama model that:
//! - Keeps durable notes (identity, preferences, goals, ...) in SQLite
//! - Deduplicates near-identical notes before saving them
//! - Injects a bounded, cached rendering of those notes into every prompt

pub mod chat;
pub mod commands;
pub mod config;
pub mod console;
pub mod memory;
pub mod session;

pub use chat::{ChatClient, ChatEvent, ChatMessage, Role};
pub use commands::{parse_command, Command};
pub use memory::{Category, MemoryBank, MemoryRecord};
pub use session::Session;

use std::path::PathBuf;

/// Default Ollama model
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Default Ollama endpoint
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Configuration for Alice
#[derive(Debug, Clone, PartialEq)]
pub struct AliceConfig {
    /// Data directory holding the memory database and config.toml
    pub home: PathBuf,

    /// Model name sent to the backend
    pub model: String,

    /// Backend base URL
    pub host: String,

    /// Stream tokens as they arrive instead of waiting for the full reply
    pub streaming: bool,

    /// Show a thinking indicator and any `<think>` content
    pub show_thinking: bool,

    /// Inject the memory block into each prompt
    pub inject_memory: bool,

    /// Upper bound on the injected memory block, in characters
    pub max_memory_chars: usize,

    /// Number of user/assistant exchanges replayed into the prompt
    pub history_turns: usize,

    /// Starting chaos level (1-10)
    pub chaos_level: u8,
}

impl AliceConfig {
    pub fn new(home: PathBuf) -> Self {
        Self {
            home,
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            streaming: true,
            show_thinking: false,
            inject_memory: true,
            max_memory_chars: 1800,
            history_turns: 10,
            chaos_level: 7,
        }
    }

    /// Path to the SQLite memory database
    pub fn memory_db(&self) -> PathBuf {
        self.home.join("alice_memory.db")
    }

    /// Path to the optional config file
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_show_thinking(mut self, show: bool) -> Self {
        self.show_thinking = show;
        self
    }

    pub fn with_inject_memory(mut self, inject: bool) -> Self {
        self.inject_memory = inject;
        self
    }

    pub fn with_chaos_level(mut self, level: u8) -> Self {
        self.chaos_level = level;
        self
    }
}

/// Result type for Alice operations
pub type Result<T> = std::result::Result<T, AliceError>;

/// Errors that can occur in Alice
#[derive(Debug, thiserror::Error)]
pub enum AliceError {
    #[error("Memory storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chat backend error: {0}")]
    Chat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
