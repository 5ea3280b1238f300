//! Group models: host-defined group definitions and directory groups.

use serde::{Deserialize, Serialize};

use super::profile::Profile;

/// Identifier of the synthetic group holding pinned profiles
pub const FAVORITES_GROUP_ID: &str = "favorites";

/// Identifier of the catch-all group for profiles without a group label
pub const UNGROUPED_GROUP_ID: &str = "ungrouped";

/// Display name of the favorites group
pub const FAVORITES_GROUP_NAME: &str = "\u{2B50} Favorites";

/// Display name of the catch-all group
pub const UNGROUPED_GROUP_NAME: &str = "Ungrouped";

/// A custom group declared in the profile store
///
/// Profiles refer to it through their group label; the definition supplies
/// the display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Identifier referenced by `Profile::group`
    pub id: String,
    /// Human-readable name
    pub name: String,
}

impl GroupDefinition {
    /// Creates a new group definition
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A presentation-only group in the directory projection
///
/// Never persisted; rebuilt on every directory refresh. Only the collapsed
/// flag survives rebuilds, keyed by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileGroup {
    /// Group key: custom group id, `ungrouped`, `proto-<type>` or `favorites`
    pub id: String,
    /// Display name
    pub name: String,
    /// Member profiles in display order
    pub profiles: Vec<Profile>,
    /// Whether the group is collapsed in the list
    pub collapsed: bool,
}

impl ProfileGroup {
    /// Creates an empty, expanded group
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            profiles: Vec::new(),
            collapsed: false,
        }
    }

    /// Returns true for the synthetic favorites group
    #[must_use]
    pub fn is_favorites(&self) -> bool {
        self.id == FAVORITES_GROUP_ID
    }

    /// Returns true for the trailing catch-all group
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.id == UNGROUPED_GROUP_ID
    }
}
