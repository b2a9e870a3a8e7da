//! Cached rendering of the memory block injected into prompts

use super::record::MemoryRecord;

/// Rendering used when there are no notes
pub const EMPTY_RENDERING: &str = "None.";

/// Observable cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing cached yet (startup, or after a reset)
    EmptyDirty,
    /// A payload may exist but is stale
    Dirty,
    /// Payload matches the store
    Clean,
}

/// Full (untruncated) rendering plus a dirty flag.
#[derive(Debug, Clone)]
pub struct PromptCache {
    payload: Option<String>,
    dirty: bool,
}

impl Default for PromptCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptCache {
    pub fn new() -> Self {
        Self {
            payload: None,
            dirty: true,
        }
    }

    pub fn state(&self) -> CacheState {
        match (&self.payload, self.dirty) {
            (Some(_), false) => CacheState::Clean,
            (None, _) => CacheState::EmptyDirty,
            (Some(_), true) => CacheState::Dirty,
        }
    }

    /// Mark stale after a write. The old payload is kept but never served.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Drop the payload entirely.
    pub fn clear(&mut self) {
        self.payload = None;
        self.dirty = true;
    }

    /// Cached rendering truncated to `max_chars`, if clean.
    pub fn get(&self, max_chars: usize) -> Option<String> {
        if self.dirty {
            return None;
        }
        self.payload
            .as_deref()
            .map(|text| truncate_chars(text, max_chars))
    }

    /// Store a freshly computed rendering and return it truncated.
    pub fn fill(&mut self, rendering: String, max_chars: usize) -> String {
        let out = truncate_chars(&rendering, max_chars);
        self.payload = Some(rendering);
        self.dirty = false;
        out
    }
}

/// Render records for the prompt.
///
/// `records` arrive in listing order (pinned first, newest first); the block
/// shows them reversed, so pinned notes end up at the bottom rather than
/// hoisted above the rest.
pub fn render_records(records: &[MemoryRecord]) -> String {
    if records.is_empty() {
        return EMPTY_RENDERING.to_string();
    }
    records
        .iter()
        .rev()
        .map(MemoryRecord::prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Truncate a string to a maximum character count.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Category;
    use chrono::Utc;

    fn record(id: i64, content: &str, pinned: bool) -> MemoryRecord {
        MemoryRecord {
            id,
            category: Category::Goals,
            content: content.to_string(),
            pinned,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut cache = PromptCache::new();
        assert_eq!(cache.state(), CacheState::EmptyDirty);
        assert_eq!(cache.get(100), None);

        cache.fill("- goals: x".to_string(), 100);
        assert_eq!(cache.state(), CacheState::Clean);
        assert_eq!(cache.get(100).as_deref(), Some("- goals: x"));

        cache.invalidate();
        assert_eq!(cache.state(), CacheState::Dirty);
        assert_eq!(cache.get(100), None);

        cache.clear();
        assert_eq!(cache.state(), CacheState::EmptyDirty);
    }

    #[test]
    fn test_fill_keeps_full_payload() {
        let mut cache = PromptCache::new();
        let out = cache.fill("abcdefghij".to_string(), 4);
        assert_eq!(out, "abcd");
        assert_eq!(cache.get(8).as_deref(), Some("abcdefgh"));
    }

    #[test]
    fn test_render_reverses_listing_order() {
        // listing order: pinned B first, then C, then A
        let listed = vec![
            record(2, "B", true),
            record(3, "C", false),
            record(1, "A", false),
        ];
        assert_eq!(
            render_records(&listed),
            "- goals: A\n- goals: C\n- goals (PIN): B"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_records(&[]), "None.");
    }

    #[test]
    fn test_truncate_chars_handles_limits() {
        assert_eq!(truncate_chars("hello", 0), "");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
