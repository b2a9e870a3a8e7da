//! Memory module for Alice
//!
//! Durable notes in SQLite, a dedup guard in front of every insert, and a
//! cached prompt rendering that every write invalidates.

mod dedup;
mod normalize;
mod prompt_cache;
mod record;
mod store;

pub use dedup::{is_similar, DEDUP_WINDOW};
pub use normalize::normalize;
pub use prompt_cache::{render_records, truncate_chars, CacheState, PromptCache, EMPTY_RENDERING};
pub use record::{Category, MemoryRecord, NewMemory};
pub use store::MemoryStore;

use crate::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Number of records the prompt rendering is built from
pub const PROMPT_RECORD_LIMIT: usize = 80;

/// Baseline notes inserted at startup and after a reset
pub const BASELINE_NOTES: &[(Category, &str)] = &[
    (Category::Identity, "Name: Alice."),
    (Category::Identity, "Created by: Siv (software project)."),
    (Category::Workflow, "No roleplay actions like *smiles*."),
    (Category::Workflow, "No fabricated shared history."),
    (Category::Workflow, "If unsure: say unsure + ask one short question."),
];

/// Owns the store and its prompt cache. All writes go through here so the
/// cache is invalidated exactly when the store changes.
#[derive(Debug)]
pub struct MemoryBank {
    store: MemoryStore,
    cache: PromptCache,
}

impl MemoryBank {
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            store: MemoryStore::open(db_path)?,
            cache: PromptCache::new(),
        })
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn cache_state(&self) -> CacheState {
        self.cache.state()
    }

    /// Add a note. Returns the new id, or `None` if it was empty or a
    /// near-duplicate.
    pub fn add(&mut self, category: &str, content: &str, pinned: bool) -> Result<Option<i64>> {
        let id = self.store.insert(&NewMemory::new(category, content, pinned))?;
        if id.is_some() {
            self.cache.invalidate();
        }
        Ok(id)
    }

    /// Add several notes atomically. Returns how many were added.
    pub fn add_many(&mut self, items: &[NewMemory]) -> Result<usize> {
        let added = self.store.insert_many(items)?;
        if added > 0 {
            self.cache.invalidate();
        }
        Ok(added)
    }

    pub fn list(&self, limit: usize) -> Result<Vec<MemoryRecord>> {
        self.store.list(limit)
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count()
    }

    pub fn delete(&mut self, id: i64) -> Result<()> {
        self.store.delete(id)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Wipe every note and the cached rendering.
    pub fn reset_all(&mut self) -> Result<()> {
        self.cache.clear();
        self.store.reset_all()
    }

    /// Memory block for prompt injection, at most `max_chars` characters.
    pub fn render(&mut self, max_chars: usize) -> Result<String> {
        if let Some(text) = self.cache.get(max_chars) {
            return Ok(text);
        }
        let records = self.store.list(PROMPT_RECORD_LIMIT)?;
        debug!("Rendering prompt memory from {} records", records.len());
        Ok(self.cache.fill(render_records(&records), max_chars))
    }

    /// Insert the baseline identity/workflow notes. Safe to call repeatedly.
    pub fn seed_minimal_identity(&mut self) -> Result<usize> {
        let items: Vec<NewMemory> = BASELINE_NOTES
            .iter()
            .map(|(category, content)| NewMemory::new(category.as_str(), content, true))
            .collect();
        let added = self.add_many(&items)?;
        if added > 0 {
            info!("Seeded {} baseline notes", added);
        }
        Ok(added)
    }
}
