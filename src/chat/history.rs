//! Bounded conversation history

use super::ChatMessage;

/// Recent user/assistant messages, capped at `max_turns` exchanges.
#[derive(Debug, Clone)]
pub struct History {
    messages: Vec<ChatMessage>,
    max_turns: usize,
}

impl History {
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
        }
    }

    /// Record a completed exchange and drop anything beyond the cap.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.messages.push(ChatMessage::user(user));
        self.messages.push(ChatMessage::assistant(assistant));
        let cap = self.max_turns * 2;
        if self.messages.len() > cap {
            let excess = self.messages.len() - cap;
            self.messages.drain(..excess);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn test_keeps_last_turns() {
        let mut history = History::new(2);
        for i in 0..5 {
            history.push_exchange(format!("q{i}"), format!("a{i}"));
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.messages()[0].content, "q3");
        assert_eq!(history.messages()[0].role, Role::User);
        assert_eq!(history.messages()[3].content, "a4");
        assert_eq!(history.messages()[3].role, Role::Assistant);
    }

    #[test]
    fn test_zero_turns_keeps_nothing() {
        let mut history = History::new(0);
        history.push_exchange("hi", "hey");
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new(3);
        history.push_exchange("hi", "hey");
        history.clear();
        assert!(history.is_empty());
    }
}
