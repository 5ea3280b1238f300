//! Property-based tests for the connection directory
//!
//! Covers the recency ordering, search visibility, duplication and the
//! guarantee that builtin profiles survive any delete request.

use std::collections::HashSet;

use connbar_core::config::{AppSettings, ProtocolFilter, SettingsService, SortMode};
use connbar_core::connection::ProfileStore;
use connbar_core::directory::{
    ConnectionDirectory, DeleteOutcome, FixedConfirmation, RecencyTracker,
};
use connbar_core::models::{Profile, ProtocolType, RecentList};
use connbar_core::session::SessionRegistry;
use proptest::prelude::*;

struct OpenIds(Vec<String>);

impl SessionRegistry for OpenIds {
    fn open_profile_ids(&self) -> Vec<String> {
        self.0.clone()
    }
}

// ========== Generators ==========

fn arb_protocol() -> impl Strategy<Value = ProtocolType> {
    prop_oneof![
        Just(ProtocolType::Ssh),
        Just(ProtocolType::Telnet),
        Just(ProtocolType::Rdp),
    ]
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    (
        "[a-zA-Z][a-zA-Z0-9]{0,8}",
        arb_protocol(),
        "[a-z]{1,6}(\\.[a-z]{1,4})?",
        prop::option::of("[a-z]{1,6}"),
        prop::option::of("[a-c]{1,2}"),
        any::<bool>(),
    )
        .prop_map(|(name, protocol, host, user, group, builtin)| {
            let mut profile = Profile::new(name, protocol, host);
            if let Some(user) = user {
                profile = profile.with_user(user);
            }
            profile.group = group;
            profile.is_builtin = builtin;
            profile
        })
}

/// Profiles with unique identifiers p0, p1, ...
fn arb_profiles() -> impl Strategy<Value = Vec<Profile>> {
    prop::collection::vec(arb_profile(), 1..15).prop_map(|profiles| {
        profiles
            .into_iter()
            .enumerate()
            .map(|(idx, p)| p.with_id(format!("p{idx}")))
            .collect()
    })
}

fn settings(sort: SortMode) -> SettingsService {
    let mut settings = AppSettings::default();
    settings.sidebar.sort_by = sort;
    settings.sidebar.protocol_filter = ProtocolFilter::All;
    SettingsService::in_memory(settings)
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn recent_sort_puts_active_profiles_first(
        profiles in arb_profiles(),
        open in prop::collection::vec(0usize..15, 0..5),
        recent in prop::collection::vec(0usize..15, 0..8),
    ) {
        let open_ids: Vec<String> = open.iter().map(|i| format!("p{i}")).collect();
        let mut list = RecentList::new();
        for idx in recent.iter().rev() {
            list.touch(&format!("p{idx}"));
        }
        let mut directory = ConnectionDirectory::new(ProfileStore::in_memory(profiles), settings(SortMode::Recent))
            .with_sessions(Box::new(OpenIds(open_ids)))
            .with_recent(Box::new(RecencyTracker::in_memory(list)));
        directory.refresh();

        for group in directory.groups() {
            let flags: Vec<bool> = group
                .profiles
                .iter()
                .map(|p| directory.is_active_connection(p))
                .collect();
            // once an inactive profile appears no active one may follow
            let first_inactive = flags.iter().position(|active| !active).unwrap_or(flags.len());
            prop_assert!(flags[first_inactive..].iter().all(|active| !active));
        }
    }

    #[test]
    fn search_visibility_matches_name_and_description(
        profiles in arb_profiles(),
        term in "[a-zA-Z@.]{0,3}",
    ) {
        let mut directory = ConnectionDirectory::new(ProfileStore::in_memory(profiles), settings(SortMode::Name));
        directory.refresh();
        directory.set_search_term(&term);

        let needle = term.to_lowercase();
        for profile in directory.profiles() {
            let haystack = format!("{} {}", profile.name, directory.description(profile)).to_lowercase();
            prop_assert_eq!(directory.is_profile_visible(profile), haystack.contains(&needle));
        }
        for group in directory.groups() {
            prop_assert_eq!(
                directory.is_group_visible(group),
                directory.visible_count(group) > 0
            );
        }
    }

    #[test]
    fn duplicate_appends_detached_copy(profiles in arb_profiles(), pick in any::<prop::sample::Index>()) {
        let original = profiles[pick.index(profiles.len())].clone();
        let before = profiles.len();
        let mut directory = ConnectionDirectory::new(ProfileStore::in_memory(profiles), settings(SortMode::Name));
        directory.refresh();

        let copy = directory.duplicate(&original).unwrap();
        prop_assert!(copy.id.is_none());
        prop_assert!(!copy.is_builtin && !copy.is_template);
        prop_assert_eq!(copy.name, format!("{} copy", original.name));
        prop_assert_eq!(copy.options, original.options);
        prop_assert_eq!(directory.store().len(), before + 1);
        prop_assert_eq!(directory.profiles().len(), before + 1);
    }

    #[test]
    fn builtin_profiles_survive_deletion(profiles in arb_profiles()) {
        let builtin: HashSet<String> = profiles
            .iter()
            .filter(|p| p.is_builtin)
            .filter_map(|p| p.id.clone())
            .collect();
        let mut directory = ConnectionDirectory::new(ProfileStore::in_memory(profiles.clone()), settings(SortMode::Name))
            .with_confirmation(Box::new(FixedConfirmation::Accept));
        directory.refresh();

        for profile in &profiles {
            // a stale snapshot must not bypass the builtin check
            let mut snapshot = profile.clone();
            snapshot.is_builtin = false;
            let outcome = directory.delete(&snapshot);
            if builtin.contains(profile.id.as_deref().unwrap_or_default()) {
                prop_assert_eq!(outcome, DeleteOutcome::Refused);
            } else {
                prop_assert!(matches!(outcome, DeleteOutcome::Deleted(_)));
            }
        }

        let remaining: HashSet<String> = directory
            .store()
            .profiles()
            .iter()
            .filter_map(|p| p.id.clone())
            .collect();
        prop_assert_eq!(remaining, builtin);
    }
}
