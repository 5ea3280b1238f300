//! Group projection
//!
//! Turns a sorted profile list into the ordered groups shown by the
//! directory. The projection is rebuilt from scratch every time; only the
//! collapsed flags are carried over, keyed by group id.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::{GroupBy, ProtocolFilter};
use crate::models::{
    Profile, ProfileGroup, ProtocolType, FAVORITES_GROUP_ID, FAVORITES_GROUP_NAME,
    UNGROUPED_GROUP_ID, UNGROUPED_GROUP_NAME,
};

use super::sort::compare_names;

/// Inputs that shape the projection besides the profiles themselves
pub struct GroupingOptions<'a> {
    /// Active protocol filter
    pub filter: ProtocolFilter,
    /// Partitioning mode
    pub group_by: GroupBy,
    /// Pinned profile identifiers
    pub pinned: &'a [String],
    /// Resolves a custom group label to its display name
    pub group_name: &'a dyn Fn(&str) -> Option<String>,
    /// Persisted collapse flags by group id
    pub collapsed: &'a BTreeMap<String, bool>,
}

/// Group id for profiles of `protocol` in protocol mode
#[must_use]
pub fn protocol_group_id(protocol: &ProtocolType) -> String {
    format!("proto-{}", protocol.as_str())
}

/// Builds the ordered group projection from already sorted profiles
///
/// Filters by protocol, partitions, moves pinned profiles into a leading
/// favorites group, drops empty groups and restores collapse flags.
#[must_use]
pub fn build_groups(sorted: &[Profile], options: &GroupingOptions<'_>) -> Vec<ProfileGroup> {
    let filtered = sorted
        .iter()
        .filter(|p| options.filter.matches(&p.protocol));

    let is_pinned = |p: &Profile| {
        p.id.as_ref()
            .is_some_and(|id| options.pinned.iter().any(|pinned| pinned == id))
    };

    let mut favorites = ProfileGroup::new(FAVORITES_GROUP_ID, FAVORITES_GROUP_NAME);
    let mut groups: Vec<ProfileGroup> = Vec::new();

    for profile in filtered {
        if is_pinned(profile) {
            favorites.profiles.push(profile.clone());
            continue;
        }
        let (id, name) = partition_key(profile, options);
        match groups.iter_mut().find(|g| g.id == id) {
            Some(group) => group.profiles.push(profile.clone()),
            None => {
                let mut group = ProfileGroup::new(id, name);
                group.profiles.push(profile.clone());
                groups.push(group);
            }
        }
    }

    if !favorites.profiles.is_empty() {
        groups.push(favorites);
    }
    groups.retain(|g| !g.profiles.is_empty());
    groups.sort_by(compare_groups);

    for group in &mut groups {
        group.collapsed = options.collapsed.get(&group.id).copied().unwrap_or(false);
    }
    groups
}

fn partition_key(profile: &Profile, options: &GroupingOptions<'_>) -> (String, String) {
    match options.group_by {
        GroupBy::Protocol => (
            protocol_group_id(&profile.protocol),
            profile.protocol.label(),
        ),
        GroupBy::Group => match profile.group.as_deref().map(str::trim) {
            None | Some("") => (
                UNGROUPED_GROUP_ID.to_string(),
                UNGROUPED_GROUP_NAME.to_string(),
            ),
            Some(label) => {
                let name = (options.group_name)(label).unwrap_or_else(|| label.to_string());
                (label.to_string(), name)
            }
        },
    }
}

/// Favorites first, catch-all last, everything else by display name
fn compare_groups(a: &ProfileGroup, b: &ProfileGroup) -> Ordering {
    let rank = |g: &ProfileGroup| {
        if g.is_favorites() {
            0
        } else if g.is_catch_all() {
            2
        } else {
            1
        }
    };
    rank(a)
        .cmp(&rank(b))
        .then_with(|| compare_names(&a.name, &b.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_names(_: &str) -> Option<String> {
        None
    }

    fn ids(groups: &[ProfileGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.id.as_str()).collect()
    }

    fn sample() -> Vec<Profile> {
        vec![
            Profile::new_ssh("a", "h").with_id("a").with_group("web"),
            Profile::new_ssh("b", "h").with_id("b"),
            Profile::new_telnet("c", "h").with_id("c").with_group("db"),
            Profile::new_rdp("d", "h").with_id("d").with_group("web"),
        ]
    }

    #[test]
    fn test_group_mode_ordering_and_favorites() {
        let pinned = vec!["d".to_string()];
        let collapsed = BTreeMap::new();
        let groups = build_groups(
            &sample(),
            &GroupingOptions {
                filter: ProtocolFilter::All,
                group_by: GroupBy::Group,
                pinned: &pinned,
                group_name: &no_names,
                collapsed: &collapsed,
            },
        );
        assert_eq!(ids(&groups), vec!["favorites", "db", "web", "ungrouped"]);
        assert_eq!(groups[0].profiles[0].name, "d");
        assert_eq!(groups[2].profiles.len(), 1);
    }

    #[test]
    fn test_filter_drops_empty_groups() {
        let collapsed = BTreeMap::new();
        let groups = build_groups(
            &sample(),
            &GroupingOptions {
                filter: ProtocolFilter::Ssh,
                group_by: GroupBy::Group,
                pinned: &[],
                group_name: &no_names,
                collapsed: &collapsed,
            },
        );
        assert_eq!(ids(&groups), vec!["web", "ungrouped"]);
    }

    #[test]
    fn test_protocol_mode_and_collapse() {
        let mut collapsed = BTreeMap::new();
        collapsed.insert("proto-telnet".to_string(), true);
        let groups = build_groups(
            &sample(),
            &GroupingOptions {
                filter: ProtocolFilter::All,
                group_by: GroupBy::Protocol,
                pinned: &[],
                group_name: &no_names,
                collapsed: &collapsed,
            },
        );
        assert_eq!(ids(&groups), vec!["proto-rdp", "proto-ssh", "proto-telnet"]);
        assert_eq!(groups[0].name, "RDP");
        assert!(groups[2].collapsed);
        assert!(!groups[0].collapsed);
    }

    #[test]
    fn test_custom_group_names_drive_order() {
        let names = |id: &str| (id == "web").then(|| "Alpha web".to_string());
        let collapsed = BTreeMap::new();
        let groups = build_groups(
            &sample(),
            &GroupingOptions {
                filter: ProtocolFilter::All,
                group_by: GroupBy::Group,
                pinned: &[],
                group_name: &names,
                collapsed: &collapsed,
            },
        );
        assert_eq!(ids(&groups), vec!["web", "db", "ungrouped"]);
        assert_eq!(groups[0].name, "Alpha web");
    }
}
