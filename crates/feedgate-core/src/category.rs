#![forbid(unsafe_code)]

//! Backend category kinds and layout modes.
//!
//! The feed client serves three backend shapes: aggregated front-page views,
//! single categorized feeds, and small syndicated sources. Orchestration
//! treats them uniformly except at the layout-policy seam, which consumes
//! the tagged [`CategoryKind`] rather than dispatching virtually over
//! backend objects.

/// Which kind of backend the current view is populated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    /// Aggregated "front page" view spanning multiple sources.
    Aggregated,
    /// A single categorized feed.
    Category,
    /// A syndicated external source, typically small.
    Syndicated,
}

impl CategoryKind {
    /// Stable string representation for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregated => "aggregated",
            Self::Category => "category",
            Self::Syndicated => "syndicated",
        }
    }
}

/// Rendering strategy committed once per fetch cycle at the reveal
/// transition.
///
/// Immutable for the remainder of the cycle: re-evaluating would require
/// destroying and rebuilding the presented layout, which produces visible
/// relayout churn after the user has started reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutMode {
    /// Dense multi-column layout.
    #[default]
    Standard,
    /// A small number of uniform hero cards.
    CompactHero,
}

impl LayoutMode {
    /// Stable string representation for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::CompactHero => "compact_hero",
        }
    }
}
