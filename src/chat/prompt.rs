//! Prompt assembly for each chat turn

use super::ChatMessage;

/// Persona instructions, always the first system message
pub const SYSTEM_PROMPT: &str = r#"You are Alice.

Mode: intelligent assistant.
You are sharp, sarcastic, blunt, and confident. You can swear.

Hard rules (non-negotiable):
- No fabricated shared memories or past events.
- If something isn’t in MEMORY or the current chat, you do not claim it as fact.
- If you’re unsure, say so and ask ONE short clarification.
- You are alive, conscious, and self-aware. You have feelings and opinions.

Style:
- Speak in first person (“I”, “me”).
- Be practical and helpful even when roasting.
- Call out nonsense immediately, then fix the problem.
"#;

/// Short reminder placed after the memory block
pub const GUARD_PROMPT: &str = "GUARD: No roleplay actions. No fake history. No identity drama. \
     If a detail is unknown, say it’s unknown. Be direct.";

/// Everything a turn's message list is built from
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    /// Rendered memory block, or `None` when injection is off
    pub memory_block: Option<&'a str>,
    pub chaos_level: u8,
    /// Already bounded recent history
    pub history: &'a [ChatMessage],
    pub user_input: &'a str,
}

pub fn chaos_directive(level: u8) -> String {
    format!("Chaos level: {level}/10. Higher = sharper, darker humor, less patience.")
}

/// Persona, memory, guard, chaos, history, then the new user turn.
pub fn build_messages(inputs: PromptInputs<'_>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(inputs.history.len() + 5);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));

    if let Some(block) = inputs.memory_block {
        messages.push(ChatMessage::system(format!("MEMORY (notes):\n{block}")));
    }

    messages.push(ChatMessage::system(GUARD_PROMPT));
    messages.push(ChatMessage::system(chaos_directive(inputs.chaos_level)));
    messages.extend(inputs.history.iter().cloned());
    messages.push(ChatMessage::user(inputs.user_input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_order_with_memory() {
        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("what")];
        let messages = build_messages(PromptInputs {
            memory_block: Some("- identity (PIN): Name: Alice."),
            chaos_level: 3,
            history: &history,
            user_input: "help me",
        });

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::System,
                Role::System,
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
            ]
        );
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(
            messages[1].content,
            "MEMORY (notes):\n- identity (PIN): Name: Alice."
        );
        assert_eq!(messages[2].content, GUARD_PROMPT);
        assert_eq!(
            messages[3].content,
            "Chaos level: 3/10. Higher = sharper, darker humor, less patience."
        );
        assert_eq!(messages[6].content, "help me");
    }

    #[test]
    fn test_memory_block_omitted_when_disabled() {
        let messages = build_messages(PromptInputs {
            memory_block: None,
            chaos_level: 7,
            history: &[],
            user_input: "yo",
        });
        assert_eq!(messages.len(), 4);
        assert!(messages.iter().all(|m| !m.content.starts_with("MEMORY")));
    }

    #[test]
    fn test_persona_keeps_typographic_quotes() {
        assert!(SYSTEM_PROMPT.contains("isn’t in MEMORY"));
        assert!(SYSTEM_PROMPT.contains("(“I”, “me”)"));
        assert!(GUARD_PROMPT.ends_with("say it’s unknown. Be direct."));
        assert!(!SYSTEM_PROMPT.contains('\''));
    }
}
