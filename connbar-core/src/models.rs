//! Core data models for ConnBar
//!
//! This module defines the profile record, its option bag, the group types
//! used by the directory projection, and the recency list.

mod group;
mod profile;
mod protocol;
mod recent;

pub use group::{
    GroupDefinition, ProfileGroup, FAVORITES_GROUP_ID, FAVORITES_GROUP_NAME, UNGROUPED_GROUP_ID,
    UNGROUPED_GROUP_NAME,
};
pub use profile::Profile;
pub use protocol::{Numeric, ProfileOptions, ProtocolType, SshAuthMethod};
pub use recent::{RecentEntry, RecentList, MAX_RECENT_ENTRIES};
