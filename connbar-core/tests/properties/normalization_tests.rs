//! Property-based tests for option normalization and the RDP descriptor
//!
//! Normalized ports are always usable, dimensions are either absent or in
//! range, and full-screen mode never carries a desktop size.

use connbar_core::models::{Numeric, ProfileOptions};
use connbar_core::protocol::{
    normalize_dimension, normalize_options, normalize_port, render_descriptor, MAX_DIMENSION,
    MIN_DIMENSION,
};
use proptest::prelude::*;

// ========== Generators ==========

fn arb_raw_number() -> impl Strategy<Value = Option<Numeric>> {
    prop_oneof![
        Just(None),
        any::<i64>().prop_map(|v| Some(Numeric::Int(v))),
        (-100_000.0f64..100_000.0).prop_map(|v| Some(Numeric::Float(v))),
        Just(Some(Numeric::Float(f64::NAN))),
        Just(Some(Numeric::Float(f64::INFINITY))),
        "[0-9]{0,6}|[a-z]{1,4}".prop_map(|s| Some(Numeric::Text(s))),
    ]
}

fn arb_host() -> impl Strategy<Value = String> {
    "[ \r\n]{0,2}[a-z0-9]([a-z0-9.-]{0,20}[a-z0-9])?[ \r\n]{0,2}"
}

fn arb_options() -> impl Strategy<Value = ProfileOptions> {
    (
        arb_host(),
        arb_raw_number(),
        arb_raw_number(),
        arb_raw_number(),
        any::<bool>(),
        any::<bool>(),
        prop::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(host, port, width, height, fullscreen, admin, username)| ProfileOptions {
            host,
            port,
            width,
            height,
            fullscreen,
            admin,
            username,
            ..ProfileOptions::default()
        })
}

// ========== Properties ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn normalized_port_is_always_usable(raw in prop::option::of(any::<f64>()), default in 1u16..) {
        let port = normalize_port(raw, default);
        prop_assert!(port >= 1);
    }

    #[test]
    fn port_normalization_is_idempotent(raw in prop::option::of(any::<f64>()), default in 1u16..) {
        let once = normalize_port(raw, default);
        prop_assert_eq!(normalize_port(Some(f64::from(once)), default), once);
    }

    #[test]
    fn valid_ports_pass_through(port in 1u16.., default in 1u16..) {
        prop_assert_eq!(normalize_port(Some(f64::from(port)), default), port);
    }

    #[test]
    fn dimensions_are_absent_or_in_range(raw in prop::option::of(any::<f64>())) {
        if let Some(value) = normalize_dimension(raw) {
            prop_assert!((MIN_DIMENSION..=MAX_DIMENSION).contains(&value));
        }
    }

    #[test]
    fn normalized_options_hold_invariants(options in arb_options()) {
        let normalized = normalize_options(&options);
        prop_assert!(normalized.port >= 1);
        prop_assert!(!normalized.host.contains('\r') && !normalized.host.contains('\n'));
        prop_assert_eq!(normalized.host.trim(), normalized.host.as_str());
        if normalized.fullscreen {
            prop_assert!(normalized.width.is_none() && normalized.height.is_none());
        }
        for dimension in [normalized.width, normalized.height].into_iter().flatten() {
            prop_assert!((MIN_DIMENSION..=MAX_DIMENSION).contains(&dimension));
        }
    }

    #[test]
    fn descriptor_lines_are_crlf_terminated(options in arb_options()) {
        let payload = render_descriptor(&normalize_options(&options));
        prop_assert!(payload.ends_with("\r\n"));
        prop_assert!(payload.starts_with("full address:s:"));
        prop_assert_eq!(payload.matches('\n').count(), payload.matches("\r\n").count());
        prop_assert_eq!(payload.contains("screen mode id:i:2"), options.fullscreen);
        if options.fullscreen {
            prop_assert!(!payload.contains("desktopwidth"));
        }
    }
}
