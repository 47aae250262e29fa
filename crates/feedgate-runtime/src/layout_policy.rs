#![forbid(unsafe_code)]

//! Layout-mode selection policy.
//!
//! A pure function of the settled item count and the backend kind, invoked
//! exactly once per cycle at the reveal transition. Small syndicated sources
//! get uniform hero cards; everything else gets the dense multi-column
//! layout. The committed mode is immutable for the rest of the cycle.

use feedgate_core::{CategoryKind, LayoutMode};

/// Choose the layout mode for a cycle that settled with
/// `settled_item_count` items from a backend of `kind`.
///
/// `compact_hero_max_items` comes from `SettleConfig`; counts at or above
/// it always render standard, regardless of kind.
#[must_use]
pub fn select_layout_mode(
    settled_item_count: u64,
    kind: CategoryKind,
    compact_hero_max_items: u64,
) -> LayoutMode {
    if kind == CategoryKind::Syndicated && settled_item_count < compact_hero_max_items {
        LayoutMode::CompactHero
    } else {
        LayoutMode::Standard
    }
}
