//! Profile storage module
//!
//! This module provides the `ProfileStore` for find/insert/update/remove
//! operations on profiles, persisted through `ConfigManager`, and the
//! draft-based editor used to create and modify profiles.

mod editor;
mod matching;
mod store;

pub use editor::ProfileDraft;
pub use matching::same_target;
pub use store::ProfileStore;
