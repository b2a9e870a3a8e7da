//! Interactive session: dispatches commands and runs chat turns.

use crate::chat::client::STREAM_ENDED_EARLY;
use crate::chat::{
    build_messages, parse_think_tags, ChatClient, ChatEvent, ChatMessage, History, PromptInputs,
    Segment, ThinkFilter,
};
use crate::commands::{parse_command, Command};
use crate::console::{self, Tone};
use crate::memory::MemoryBank;
use crate::{AliceConfig, AliceError, Result};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Rows shown by `/mem`
pub const MEMORY_LIST_LIMIT: usize = 80;

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W: Write> {
    config: AliceConfig,
    memory: MemoryBank,
    client: ChatClient,
    history: History,
    chaos_level: u8,
    out: W,
}

impl<W: Write> Session<W> {
    /// Open the memory store, seed baseline notes, and build the client.
    pub fn new(config: AliceConfig, out: W) -> Result<Self> {
        let mut memory = MemoryBank::open(config.memory_db())?;
        memory.seed_minimal_identity()?;
        let client = ChatClient::new(&config.host, &config.model);
        Ok(Self {
            history: History::new(config.history_turns),
            chaos_level: config.chaos_level,
            config,
            memory,
            client,
            out,
        })
    }

    pub fn memory(&self) -> &MemoryBank {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryBank {
        &mut self.memory
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn chaos_level(&self) -> u8 {
        self.chaos_level
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read lines from `input` until `exit`/`quit` or the channel closes.
    pub async fn run(&mut self, mut input: mpsc::Receiver<String>) -> Result<()> {
        writeln!(
            self.out,
            "{}",
            console::panel("Talk. I’m listening.", Some("Alice"), Tone::Success)
        )?;
        writeln!(self.out, "{}", console::help_panel())?;

        loop {
            write!(self.out, "{}", console::user_prompt())?;
            self.out.flush()?;

            let Some(line) = input.recv().await else {
                writeln!(self.out)?;
                break;
            };
            let Some(command) = parse_command(&line) else {
                continue;
            };

            match self.handle(command).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    error!("Command failed: {}", e);
                    writeln!(self.out, "{}", console::error_line(&e.to_string()))?;
                }
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Execute one parsed command.
    pub async fn handle(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                writeln!(self.out, "{}", console::help_panel())?;
            }
            Command::ShowMemory => {
                let records = self.memory.list(MEMORY_LIST_LIMIT)?;
                let total = self.memory.count()?;
                debug!("Listing {} of {} notes", records.len(), total);
                writeln!(self.out, "{}", console::memory_table(&records))?;
                writeln!(
                    self.out,
                    "{}",
                    console::dim(&format!("{} of {} notes", records.len(), total))
                )?;
            }
            Command::Forget(id) => {
                self.memory.delete(id)?;
                writeln!(
                    self.out,
                    "{}",
                    console::panel(&format!("Deleted {id}"), None, Tone::Danger)
                )?;
            }
            Command::Reset => {
                self.memory.reset_all()?;
                self.memory.seed_minimal_identity()?;
                self.history.clear();
                writeln!(
                    self.out,
                    "{}",
                    console::panel("Memory reset. Clean slate.", None, Tone::Warning)
                )?;
            }
            Command::Remember {
                category,
                text,
                pinned,
            } => {
                let verb = if pinned { "Pinned" } else { "Saved" };
                let message = match self.memory.add(&category, &text, pinned)? {
                    Some(id) => console::panel(&format!("{verb} #{id}"), None, Tone::Success),
                    None => console::panel("Not added (empty/duplicate).", None, Tone::Warning),
                };
                writeln!(self.out, "{message}")?;
            }
            Command::Chaos(level) => {
                self.chaos_level = level;
                writeln!(
                    self.out,
                    "{}",
                    console::panel(&format!("Chaos set to {level}/10."), None, Tone::Success)
                )?;
            }
            Command::ChaosOutOfRange => {
                writeln!(self.out, "{}", console::error_line("Chaos must be 1 to 10."))?;
            }
            Command::Usage(cmd) => {
                writeln!(self.out, "{}", console::usage_line(cmd.usage()))?;
            }
            Command::Unknown(name) => {
                writeln!(
                    self.out,
                    "{}",
                    console::error_line(&format!("Unknown command: /{name}. Try /help."))
                )?;
            }
            Command::Chat(text) => {
                self.chat_turn(&text).await?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Messages for the next model call.
    pub fn build_turn_messages(&mut self, user_input: &str) -> Result<Vec<ChatMessage>> {
        let memory_block = if self.config.inject_memory {
            Some(self.memory.render(self.config.max_memory_chars)?)
        } else {
            None
        };
        Ok(build_messages(PromptInputs {
            memory_block: memory_block.as_deref(),
            chaos_level: self.chaos_level,
            history: self.history.messages(),
            user_input,
        }))
    }

    async fn chat_turn(&mut self, user_input: &str) -> Result<()> {
        let messages = self.build_turn_messages(user_input)?;
        debug!("Sending {} messages to {}", messages.len(), self.client.model());

        if self.config.show_thinking {
            writeln!(self.out, "{}", console::panel("Thinking…", None, Tone::Info))?;
        }

        let raw = if self.config.streaming {
            self.stream_reply(&messages).await?
        } else {
            self.client.chat(&messages).await?
        };

        let parsed = parse_think_tags(&raw);
        if !self.config.streaming {
            if let (true, Some(thinking)) = (self.config.show_thinking, &parsed.thinking) {
                writeln!(self.out, "{}", console::dim(thinking))?;
            }
            writeln!(
                self.out,
                "{}",
                console::panel(&parsed.response, Some("Alice"), Tone::Success)
            )?;
        }

        self.history.push_exchange(user_input, parsed.response);
        Ok(())
    }

    async fn stream_reply(&mut self, messages: &[ChatMessage]) -> Result<String> {
        let events = self.client.chat_stream(messages).await?;
        self.print_stream(events).await
    }

    /// Print streamed tokens as they arrive and return the raw reply.
    ///
    /// `<think>` content is only shown (dimmed) when `show_thinking` is on.
    /// A stream that stops before `Done` is an error, so a cut-off reply
    /// never reaches history.
    pub async fn print_stream(&mut self, mut events: mpsc::Receiver<ChatEvent>) -> Result<String> {
        write!(self.out, "{}", console::assistant_prefix())?;
        self.out.flush()?;

        let mut filter = ThinkFilter::new();
        let mut reply = String::new();
        loop {
            match events.recv().await {
                Some(ChatEvent::Token(token)) => {
                    reply.push_str(&token);
                    let segments = filter.push(&token);
                    self.print_segments(segments)?;
                }
                Some(ChatEvent::Done) => break,
                Some(ChatEvent::Error(e)) => {
                    writeln!(self.out)?;
                    return Err(AliceError::Chat(e));
                }
                None => {
                    writeln!(self.out)?;
                    return Err(AliceError::Chat(STREAM_ENDED_EARLY.to_string()));
                }
            }
        }
        let rest = filter.finish();
        self.print_segments(rest)?;
        writeln!(self.out, "\n")?;
        Ok(reply)
    }

    fn print_segments(&mut self, segments: Vec<Segment>) -> Result<()> {
        for segment in segments {
            match segment {
                Segment::Answer(text) => write!(self.out, "{text}")?,
                Segment::Thinking(text) if self.config.show_thinking => {
                    write!(self.out, "{}", console::dim(&text))?
                }
                Segment::Thinking(_) => {}
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
