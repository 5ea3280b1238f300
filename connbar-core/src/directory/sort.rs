//! Profile ordering for the directory

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::SortMode;
use crate::models::Profile;

/// Compares display names case-insensitively, falling back to exact order
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sorts `profiles` in place according to `mode`
///
/// `recent_ids` lists identifiers from most to least recently used.
/// `is_active` is only consulted for [`SortMode::Recent`]. The sort is
/// stable, so profiles that compare equal keep their store order.
pub fn sort_profiles<F>(profiles: &mut [Profile], mode: SortMode, recent_ids: &[String], is_active: F)
where
    F: Fn(&Profile) -> bool,
{
    match mode {
        SortMode::Name => profiles.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortMode::Host => profiles.sort_by(|a, b| {
            compare_names(&a.options.host, &b.options.host)
                .then_with(|| compare_names(&a.name, &b.name))
        }),
        SortMode::Type => profiles.sort_by(|a, b| {
            a.protocol
                .sort_rank()
                .cmp(&b.protocol.sort_rank())
                .then_with(|| compare_names(&a.name, &b.name))
        }),
        SortMode::Recent => {
            let rank: HashMap<&str, usize> = recent_ids
                .iter()
                .enumerate()
                .map(|(idx, id)| (id.as_str(), idx))
                .collect();
            let recency = |p: &Profile| p.id.as_deref().and_then(|id| rank.get(id).copied());
            profiles.sort_by_cached_key(|p| {
                (
                    !is_active(p),
                    recency(p).map_or((1, 0), |idx| (0, idx)),
                    p.name.to_lowercase(),
                    p.name.clone(),
                )
            });
        }
    }
}
