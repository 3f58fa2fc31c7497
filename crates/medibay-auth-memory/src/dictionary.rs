//! In-memory dictionary lookup.

use std::collections::HashSet;

use async_trait::async_trait;
use medibay_auth::AuthResult;
use medibay_auth::storage::DictionaryStore;

/// Dictionary store over a fixed word set. Lookups are case-insensitive.
#[derive(Default)]
pub struct MemoryDictionaryStore {
    words: HashSet<String>,
}

impl MemoryDictionaryStore {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dictionary containing the given words.
    #[must_use]
    pub fn seeded(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl DictionaryStore for MemoryDictionaryStore {
    async fn contains_word(&self, candidate: &str) -> AuthResult<bool> {
        Ok(self.words.contains(&candidate.to_lowercase()))
    }
}
