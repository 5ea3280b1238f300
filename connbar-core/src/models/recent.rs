//! Most-recently-used profile list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of entries kept in the recency list
pub const MAX_RECENT_ENTRIES: usize = 20;

/// One use of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
    /// Identifier of the profile that was opened
    pub profile_id: String,
    /// When it was last opened
    pub last_used: DateTime<Utc>,
}

/// Profiles ordered from most to least recently used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentList {
    /// Entries, most recent first
    #[serde(default)]
    pub entries: Vec<RecentEntry>,
}

impl RecentList {
    /// Creates an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `profile_id` to the front, dropping the oldest entries past the cap
    pub fn touch(&mut self, profile_id: &str) {
        self.entries.retain(|e| e.profile_id != profile_id);
        self.entries.insert(
            0,
            RecentEntry {
                profile_id: profile_id.to_string(),
                last_used: Utc::now(),
            },
        );
        self.entries.truncate(MAX_RECENT_ENTRIES);
    }

    /// Identifiers in most-recently-used order
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.profile_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_moves_to_front_without_duplicates() {
        let mut list = RecentList::new();
        list.touch("a");
        list.touch("b");
        list.touch("a");
        assert_eq!(list.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_touch_caps_length() {
        let mut list = RecentList::new();
        for i in 0..(MAX_RECENT_ENTRIES + 5) {
            list.touch(&i.to_string());
        }
        assert_eq!(list.entries.len(), MAX_RECENT_ENTRIES);
        assert_eq!(list.entries[0].profile_id, (MAX_RECENT_ENTRIES + 4).to_string());
    }
}
