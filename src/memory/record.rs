//! Memory record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of note categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Identity,
    #[default]
    Preferences,
    Goals,
    Workflow,
    Skills,
    Projects,
    Constraints,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Identity,
            Category::Preferences,
            Category::Goals,
            Category::Workflow,
            Category::Skills,
            Category::Projects,
            Category::Constraints,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Identity => "identity",
            Category::Preferences => "preferences",
            Category::Goals => "goals",
            Category::Workflow => "workflow",
            Category::Skills => "skills",
            Category::Projects => "projects",
            Category::Constraints => "constraints",
        }
    }

    /// Parse a user-supplied category. Unknown or empty names fall back to
    /// `Preferences`.
    pub fn coerce(name: &str) -> Category {
        let name = name.trim().to_lowercase();
        Self::all()
            .iter()
            .find(|cat| cat.as_str() == name)
            .copied()
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: i64,
    pub category: Category,
    pub content: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// One-line form used in the prompt block: `- <category>[ (PIN)]: <content>`
    pub fn prompt_line(&self) -> String {
        let pin = if self.pinned { " (PIN)" } else { "" };
        format!("- {}{}: {}", self.category, pin, self.content)
    }
}

/// An insert request before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMemory {
    pub category: Category,
    pub content: String,
    pub pinned: bool,
}

impl NewMemory {
    pub fn new(category: &str, content: &str, pinned: bool) -> Self {
        Self {
            category: Category::coerce(category),
            content: content.trim().to_string(),
            pinned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_known_and_unknown() {
        assert_eq!(Category::coerce("  Goals "), Category::Goals);
        assert_eq!(Category::coerce("IDENTITY"), Category::Identity);
        assert_eq!(Category::coerce("bogus"), Category::Preferences);
        assert_eq!(Category::coerce(""), Category::Preferences);
    }

    #[test]
    fn test_prompt_line() {
        let record = MemoryRecord {
            id: 3,
            category: Category::Workflow,
            content: "No fabricated shared history.".to_string(),
            pinned: true,
            created_at: Utc::now(),
        };
        assert_eq!(
            record.prompt_line(),
            "- workflow (PIN): No fabricated shared history."
        );

        let casual = MemoryRecord {
            pinned: false,
            category: Category::Preferences,
            content: "Tea over coffee".to_string(),
            ..record
        };
        assert_eq!(casual.prompt_line(), "- preferences: Tea over coffee");
    }

    #[test]
    fn test_new_memory_trims() {
        let item = NewMemory::new("skills", "   rust  ", false);
        assert_eq!(item.category, Category::Skills);
        assert_eq!(item.content, "rust");
    }
}
