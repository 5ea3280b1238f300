//! Property-based tests for settings and profile persistence through ConfigManager
//!
//! Whatever the sidebar settings or profile set, saving and loading gives
//! back the same values, and profile types this crate does not handle are
//! written back untouched.

use connbar_core::config::{
    AppSettings, ConfigManager, GroupBy, HotkeySettings, PanelPosition, ProfilesFile,
    ProtocolFilter, SidebarConfig, SortMode,
};
use connbar_core::models::{GroupDefinition, Numeric, Profile, ProtocolType};
use proptest::prelude::*;
use tempfile::TempDir;

// ========== Generators ==========

fn arb_sidebar() -> impl Strategy<Value = SidebarConfig> {
    (
        any::<bool>(),
        prop_oneof![Just(PanelPosition::Left), Just(PanelPosition::Right)],
        0u32..2000,
        (any::<bool>(), any::<bool>(), any::<bool>()),
        prop::collection::vec("[a-z0-9-]{1,12}", 0..5),
        prop_oneof![
            Just(SortMode::Name),
            Just(SortMode::Host),
            Just(SortMode::Recent),
            Just(SortMode::Type)
        ],
        prop_oneof![
            Just(ProtocolFilter::All),
            Just(ProtocolFilter::Ssh),
            Just(ProtocolFilter::Telnet),
            Just(ProtocolFilter::Rdp)
        ],
        "[A-Za-z]:\\\\[a-z]{1,8}\\.exe|~/[a-z]{1,8}",
        prop_oneof![Just(GroupBy::Group), Just(GroupBy::Protocol)],
    )
        .prop_map(
            |(enabled, position, width, flags, pinned, sort_by, filter, client, group_by)| {
                SidebarConfig {
                    enabled,
                    position,
                    width,
                    show_in_toolbar: flags.0,
                    sidebar_visible: flags.1,
                    pinned_profiles: pinned,
                    sort_by,
                    protocol_filter: filter,
                    show_protocol_badge: flags.2,
                    rdp_client_path: client,
                    group_by,
                }
            },
        )
}

fn arb_protocol() -> impl Strategy<Value = ProtocolType> {
    prop_oneof![
        Just(ProtocolType::Ssh),
        Just(ProtocolType::Telnet),
        Just(ProtocolType::Rdp),
        "[a-z]{4,8}".prop_map(ProtocolType::from),
    ]
}

fn arb_port() -> impl Strategy<Value = Option<Numeric>> {
    prop_oneof![
        Just(None),
        any::<i32>().prop_map(|v| Some(Numeric::Int(i64::from(v)))),
        "[0-9a-z]{0,5}".prop_map(|s| Some(Numeric::Text(s))),
    ]
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    (
        "[a-zA-Z][a-zA-Z0-9 _-]{0,15}",
        arb_protocol(),
        "[a-z0-9.-]{0,20}",
        arb_port(),
        prop::option::of("[a-z0-9-]{8}"),
        prop::option::of("[a-z]{1,6}"),
        (any::<bool>(), any::<bool>()),
    )
        .prop_map(|(name, protocol, host, port, id, group, (builtin, template))| {
            let mut profile = Profile::new(name, protocol, host);
            profile.options.port = port;
            profile.id = id;
            profile.group = group;
            profile.is_builtin = builtin;
            profile.is_template = template;
            profile
        })
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn settings_round_trip(
        sidebar in arb_sidebar(),
        chords in prop::collection::vec("Ctrl-Shift-[A-Z]", 0..3),
    ) {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path().to_path_buf());
        let settings = AppSettings {
            sidebar,
            hotkeys: HotkeySettings { toggle_connection_sidebar: chords },
        };

        manager.save_settings(&settings).unwrap();
        prop_assert_eq!(manager.load_settings().unwrap(), settings);
    }

    #[test]
    fn profiles_round_trip(
        profiles in prop::collection::vec(arb_profile(), 0..10),
        groups in prop::collection::vec(("[a-z]{1,6}", "[A-Za-z ]{1,12}"), 0..3),
    ) {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp.path().to_path_buf());
        let file = ProfilesFile {
            groups: groups
                .into_iter()
                .map(|(id, name)| GroupDefinition::new(id, name))
                .collect(),
            profiles,
        };

        manager.save_profiles(&file).unwrap();
        prop_assert_eq!(manager.load_profiles().unwrap(), file);
    }

    #[test]
    fn unknown_enum_values_fall_back_to_defaults(value in "[a-z]{3,10}") {
        prop_assume!(!["name", "host", "recent", "type", "all", "ssh", "telnet", "rdp"].contains(&value.as_str()));
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            format!("[sidebar]\nsortBy = \"{value}\"\nprotocolFilter = \"{value}\"\nwidth = 300\n"),
        )
        .unwrap();
        let manager = ConfigManager::with_config_dir(temp.path().to_path_buf());

        let loaded = manager.load_settings().unwrap();
        prop_assert_eq!(loaded.sidebar.sort_by, SortMode::Name);
        prop_assert_eq!(loaded.sidebar.protocol_filter, ProtocolFilter::Ssh);
        prop_assert_eq!(loaded.sidebar.width, 300);
        prop_assert!(loaded.sidebar.show_protocol_badge);
    }
}
