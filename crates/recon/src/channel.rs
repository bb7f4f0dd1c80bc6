//! Channel classification: maps a channel group label to the drain/boost
//! flags the attribution model consumes.
//!
//! - Drain: baseline demand not attributable to incremental spend.
//! - Boost: incremental, ad-driven demand.
//!
//! A mapped channel always carries exactly one of the two flags. Unmapped
//! channels fall back to a caller-chosen default (see [`ChannelFlags::UNCLASSIFIED`]
//! and [`ChannelFlags::DRAIN`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const SPONSORED_PRODUCTS: &str = "Walmart Sponsored Products";
pub const SPONSORED_BRANDS: &str = "Walmart Sponsored Brands";
pub const SPONSORED_DISPLAY: &str = "Walmart Sponsored Display";
pub const ORGANIC: &str = "Walmart Organic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRole {
    Drain,
    Boost,
}

impl std::fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drain => write!(f, "drain"),
            Self::Boost => write!(f, "boost"),
        }
    }
}

/// Serialized as `is_drain` / `is_boost` integers (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelFlags {
    pub is_drain: u8,
    pub is_boost: u8,
}

impl ChannelFlags {
    pub const DRAIN: Self = Self { is_drain: 1, is_boost: 0 };
    pub const BOOST: Self = Self { is_drain: 0, is_boost: 1 };
    pub const UNCLASSIFIED: Self = Self { is_drain: 0, is_boost: 0 };
}

impl From<ChannelRole> for ChannelFlags {
    fn from(role: ChannelRole) -> Self {
        match role {
            ChannelRole::Drain => Self::DRAIN,
            ChannelRole::Boost => Self::BOOST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTable {
    roles: HashMap<String, ChannelRole>,
}

impl Default for ChannelTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(SPONSORED_PRODUCTS, ChannelRole::Boost);
        table.register(SPONSORED_BRANDS, ChannelRole::Boost);
        table.register(SPONSORED_DISPLAY, ChannelRole::Boost);
        table.register(ORGANIC, ChannelRole::Drain);
        table
    }
}

impl ChannelTable {
    pub fn empty() -> Self {
        Self { roles: HashMap::new() }
    }

    /// Add or replace a channel group's role.
    pub fn register(&mut self, channel_group: impl Into<String>, role: ChannelRole) {
        self.roles.insert(channel_group.into(), role);
    }

    pub fn role(&self, channel_group: &str) -> Option<ChannelRole> {
        self.roles.get(channel_group).copied()
    }

    pub fn classify(&self, channel_group: &str) -> Option<ChannelFlags> {
        self.role(channel_group).map(ChannelFlags::from)
    }

    /// Classify, falling back to `default` for unmapped groups.
    pub fn classify_or(&self, channel_group: &str, default: ChannelFlags) -> ChannelFlags {
        self.classify(channel_group).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
