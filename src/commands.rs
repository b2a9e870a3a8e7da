//! Slash command parsing
//!
//! - `/xxx` = local commands (memory management, chaos level, help)
//! - `exit` / `quit` = leave the session
//! - anything else is a chat turn

use std::fmt;

/// Lowest and highest accepted chaos level
pub const CHAOS_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Built-in slash commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Mem,
    Forget,
    Reset,
    Pin,
    Save,
    Chaos,
    Help,
}

impl SlashCommand {
    pub fn all() -> &'static [SlashCommand] {
        &[
            SlashCommand::Mem,
            SlashCommand::Forget,
            SlashCommand::Reset,
            SlashCommand::Pin,
            SlashCommand::Save,
            SlashCommand::Chaos,
            SlashCommand::Help,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlashCommand::Mem => "mem",
            SlashCommand::Forget => "forget",
            SlashCommand::Reset => "reset",
            SlashCommand::Pin => "pin",
            SlashCommand::Save => "save",
            SlashCommand::Chaos => "chaos",
            SlashCommand::Help => "help",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            SlashCommand::Mem => "/mem",
            SlashCommand::Forget => "/forget <id>",
            SlashCommand::Reset => "/reset",
            SlashCommand::Pin => "/pin <cat>|<text>",
            SlashCommand::Save => "/save <cat>|<text>",
            SlashCommand::Chaos => "/chaos <1-10>",
            SlashCommand::Help => "/help",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SlashCommand::Mem => "Show memory list",
            SlashCommand::Forget => "Delete memory by id",
            SlashCommand::Reset => "Reset memory DB (cleans bad memories)",
            SlashCommand::Pin => "Add pinned memory",
            SlashCommand::Save => "Add normal memory",
            SlashCommand::Chaos => "Set chaos level (1 calm → 10 brutal)",
            SlashCommand::Help => "Show help",
        }
    }

    pub fn parse(name: &str) -> Option<SlashCommand> {
        let name = name.to_lowercase();
        Self::all().iter().find(|cmd| cmd.name() == name).copied()
    }
}

impl fmt::Display for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    ShowMemory,
    Forget(i64),
    Reset,
    Remember {
        category: String,
        text: String,
        pinned: bool,
    },
    Chaos(u8),
    /// Numeric but outside 1-10
    ChaosOutOfRange,
    /// Known command with missing or malformed arguments
    Usage(SlashCommand),
    Unknown(String),
    Chat(String),
}

/// Parse one input line. Returns `None` for blank input.
pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let lowered = input.to_lowercase();
    if lowered == "exit" || lowered == "quit" {
        return Some(Command::Quit);
    }

    let Some(rest) = input.strip_prefix('/') else {
        return Some(Command::Chat(input.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let Some(cmd) = SlashCommand::parse(name) else {
        return Some(Command::Unknown(name.to_string()));
    };

    let parsed = match cmd {
        SlashCommand::Help => Command::Help,
        SlashCommand::Mem => Command::ShowMemory,
        SlashCommand::Reset => Command::Reset,
        SlashCommand::Forget => match parse_digits(args) {
            Some(id) => i64::try_from(id)
                .map(Command::Forget)
                .unwrap_or(Command::Usage(cmd)),
            None => Command::Usage(cmd),
        },
        SlashCommand::Pin | SlashCommand::Save => {
            let (category, text) = parse_cat_text(args);
            if text.is_empty() {
                Command::Usage(cmd)
            } else {
                Command::Remember {
                    category,
                    text,
                    pinned: cmd == SlashCommand::Pin,
                }
            }
        }
        SlashCommand::Chaos => match parse_digits(args) {
            Some(level) => match u8::try_from(level) {
                Ok(level) if CHAOS_RANGE.contains(&level) => Command::Chaos(level),
                _ => Command::ChaosOutOfRange,
            },
            None => Command::Usage(cmd),
        },
    };
    Some(parsed)
}

/// Split `<cat>|<text>` on the first `|`. Without a `|` the category is
/// `preferences` and the whole argument is the text.
pub fn parse_cat_text(arg: &str) -> (String, String) {
    let arg = arg.trim();
    match arg.split_once('|') {
        Some((cat, text)) => (cat.trim().to_string(), text.trim().to_string()),
        None => ("preferences".to_string(), arg.to_string()),
    }
}

/// Plain unsigned decimal; signs, spaces and empty input are rejected.
fn parse_digits(arg: &str) -> Option<u64> {
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_and_chat() {
        assert_eq!(parse_command("   "), None);
        assert_eq!(
            parse_command("  how are you? "),
            Some(Command::Chat("how are you?".to_string()))
        );
    }

    #[test]
    fn test_quit_any_case() {
        assert_eq!(parse_command("EXIT"), Some(Command::Quit));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("/help"), Some(Command::Help));
        assert_eq!(parse_command("/mem"), Some(Command::ShowMemory));
        assert_eq!(parse_command("/reset"), Some(Command::Reset));
    }

    #[test]
    fn test_forget() {
        assert_eq!(parse_command("/forget 12"), Some(Command::Forget(12)));
        assert_eq!(
            parse_command("/forget twelve"),
            Some(Command::Usage(SlashCommand::Forget))
        );
        assert_eq!(
            parse_command("/forget -3"),
            Some(Command::Usage(SlashCommand::Forget))
        );
        assert_eq!(
            parse_command("/forget"),
            Some(Command::Usage(SlashCommand::Forget))
        );
    }

    #[test]
    fn test_pin_and_save() {
        assert_eq!(
            parse_command("/pin goals | Ship the release"),
            Some(Command::Remember {
                category: "goals".to_string(),
                text: "Ship the release".to_string(),
                pinned: true,
            })
        );
        assert_eq!(
            parse_command("/save likes tea"),
            Some(Command::Remember {
                category: "preferences".to_string(),
                text: "likes tea".to_string(),
                pinned: false,
            })
        );
        assert_eq!(
            parse_command("/save goals|   "),
            Some(Command::Usage(SlashCommand::Save))
        );
    }

    #[test]
    fn test_text_may_contain_pipes() {
        let (cat, text) = parse_cat_text("workflow|use a | b");
        assert_eq!(cat, "workflow");
        assert_eq!(text, "use a | b");
    }

    #[test]
    fn test_chaos() {
        assert_eq!(parse_command("/chaos 10"), Some(Command::Chaos(10)));
        assert_eq!(parse_command("/chaos 0"), Some(Command::ChaosOutOfRange));
        assert_eq!(parse_command("/chaos 300"), Some(Command::ChaosOutOfRange));
        assert_eq!(
            parse_command("/chaos high"),
            Some(Command::Usage(SlashCommand::Chaos))
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            parse_command("/teleport now"),
            Some(Command::Unknown("teleport".to_string()))
        );
    }
}
