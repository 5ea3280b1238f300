//! Search index and description cache
//!
//! Both are keyed by [`Profile::cache_key`] and rebuilt on every refresh.

use std::collections::HashMap;

use crate::models::Profile;
use crate::protocol::ProtocolRegistry;

#[derive(Debug, Clone)]
struct IndexEntry {
    description: String,
    haystack: String,
}

/// Lowercased search text and one-line description per profile
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: HashMap<String, IndexEntry>,
    term: String,
}

impl SearchIndex {
    /// Indexes `profiles`, keeping the current search term
    pub fn rebuild(&mut self, profiles: &[Profile], registry: &ProtocolRegistry) {
        self.entries = profiles
            .iter()
            .map(|p| {
                let description = registry.describe(p);
                let haystack = format!("{} {description}", p.name).to_lowercase();
                (
                    p.cache_key().into_owned(),
                    IndexEntry {
                        description,
                        haystack,
                    },
                )
            })
            .collect();
    }

    /// Sets the active term; matching is case-insensitive
    pub fn set_term(&mut self, term: &str) {
        self.term = term.to_lowercase();
    }

    /// Active term, lowercased
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Cached description
    #[must_use]
    pub fn description(&self, profile: &Profile) -> Option<&str> {
        self.entries
            .get(profile.cache_key().as_ref())
            .map(|e| e.description.as_str())
    }

    /// Returns true if the profile matches the active term
    ///
    /// Profiles missing from the index stay visible.
    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        if self.term.is_empty() {
            return true;
        }
        self.entries
            .get(profile.cache_key().as_ref())
            .is_none_or(|e| e.haystack.contains(&self.term))
    }

    /// Number of indexed profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
