//! Property-based tests for the directory group projection
//!
//! For any profile set and settings, the projection puts favorites first,
//! the catch-all last, the rest in name order, never contains an empty
//! group and only ever shows eligible profiles.

use std::collections::{BTreeMap, HashSet};

use connbar_core::config::{GroupBy, ProtocolFilter, SortMode};
use connbar_core::directory::{build_groups, compare_names, sort_profiles, GroupingOptions};
use connbar_core::models::{Profile, ProfileGroup, ProtocolType};
use proptest::prelude::*;

// ========== Generators ==========

fn arb_protocol() -> impl Strategy<Value = ProtocolType> {
    prop_oneof![
        Just(ProtocolType::Ssh),
        Just(ProtocolType::Telnet),
        Just(ProtocolType::Rdp),
        Just(ProtocolType::from("serial")),
    ]
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    (
        "[a-zA-Z][a-zA-Z0-9 ]{0,10}",
        arb_protocol(),
        prop_oneof![Just(String::new()), "[a-z]{1,8}"],
        prop::option::of(prop_oneof![Just(String::new()), "[a-d]{1,2}"]),
        prop::option::of("[a-f]{1,3}"),
        any::<bool>(),
    )
        .prop_map(|(name, protocol, host, group, id, template)| {
            let mut profile = Profile::new(name, protocol, host);
            profile.group = group;
            profile.id = id;
            profile.is_template = template;
            profile
        })
}

fn arb_filter() -> impl Strategy<Value = ProtocolFilter> {
    prop_oneof![
        Just(ProtocolFilter::All),
        Just(ProtocolFilter::Ssh),
        Just(ProtocolFilter::Telnet),
        Just(ProtocolFilter::Rdp),
    ]
}

fn arb_sort() -> impl Strategy<Value = SortMode> {
    prop_oneof![
        Just(SortMode::Name),
        Just(SortMode::Host),
        Just(SortMode::Recent),
        Just(SortMode::Type),
    ]
}

fn arb_group_by() -> impl Strategy<Value = GroupBy> {
    prop_oneof![Just(GroupBy::Group), Just(GroupBy::Protocol)]
}

fn project(
    profiles: &[Profile],
    sort: SortMode,
    filter: ProtocolFilter,
    group_by: GroupBy,
    pinned: &[String],
) -> Vec<ProfileGroup> {
    let mut eligible: Vec<Profile> = profiles.iter().filter(|p| p.is_eligible()).cloned().collect();
    let recent: Vec<String> = pinned.iter().rev().cloned().collect();
    sort_profiles(&mut eligible, sort, &recent, |_| false);
    let names = |_: &str| -> Option<String> { None };
    let collapsed = BTreeMap::new();
    build_groups(
        &eligible,
        &GroupingOptions {
            filter,
            group_by,
            pinned,
            group_name: &names,
            collapsed: &collapsed,
        },
    )
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn group_ordering_invariant_holds(
        profiles in prop::collection::vec(arb_profile(), 0..25),
        sort in arb_sort(),
        filter in arb_filter(),
        group_by in arb_group_by(),
        pinned in prop::collection::vec("[a-f]{1,3}", 0..4),
    ) {
        let groups = project(&profiles, sort, filter, group_by, &pinned);

        prop_assert!(groups.iter().all(|g| !g.profiles.is_empty()));
        if let Some(idx) = groups.iter().position(ProfileGroup::is_favorites) {
            prop_assert_eq!(idx, 0);
        }
        if let Some(idx) = groups.iter().position(ProfileGroup::is_catch_all) {
            prop_assert_eq!(idx, groups.len() - 1);
        }
        let middle: Vec<&ProfileGroup> = groups
            .iter()
            .filter(|g| !g.is_favorites() && !g.is_catch_all())
            .collect();
        for pair in middle.windows(2) {
            prop_assert_ne!(compare_names(&pair[0].name, &pair[1].name), std::cmp::Ordering::Greater);
        }
        let ids: HashSet<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        prop_assert_eq!(ids.len(), groups.len());
    }

    #[test]
    fn projection_shows_each_eligible_profile_once(
        profiles in prop::collection::vec(arb_profile(), 0..25),
        sort in arb_sort(),
        filter in arb_filter(),
        group_by in arb_group_by(),
        pinned in prop::collection::vec("[a-f]{1,3}", 0..4),
    ) {
        let groups = project(&profiles, sort, filter, group_by, &pinned);
        let shown: usize = groups.iter().map(|g| g.profiles.len()).sum();
        let expected = profiles
            .iter()
            .filter(|p| p.is_eligible() && filter.matches(&p.protocol))
            .count();
        prop_assert_eq!(shown, expected);

        for group in &groups {
            for profile in &group.profiles {
                prop_assert!(profile.is_eligible());
                prop_assert!(filter.matches(&profile.protocol));
                let pinned_profile = profile.id.as_ref().is_some_and(|id| pinned.contains(id));
                prop_assert_eq!(pinned_profile, group.is_favorites());
            }
        }
    }

    #[test]
    fn name_sort_orders_every_group(
        profiles in prop::collection::vec(arb_profile(), 0..25),
        group_by in arb_group_by(),
    ) {
        let groups = project(&profiles, SortMode::Name, ProtocolFilter::All, group_by, &[]);
        for group in &groups {
            for pair in group.profiles.windows(2) {
                prop_assert_ne!(compare_names(&pair[0].name, &pair[1].name), std::cmp::Ordering::Greater);
            }
        }
    }
}
