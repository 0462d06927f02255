//! Origin-to-salt policy.
//!
//! Trusted origins share one unsalted key per entropy source; every other
//! origin is used verbatim as the derivation salt. Matching is exact: no case
//! folding, no trailing-slash trimming, no patterns.

use std::collections::HashSet;

use crate::config::INTERNAL_ORIGINS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltPolicy {
    unsalted_origins: HashSet<String>,
}

impl SaltPolicy {
    /// Build a policy with a custom allow-list of unsalted origins.
    pub fn new<I, S>(unsalted_origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unsalted_origins: unsalted_origins.into_iter().map(Into::into).collect(),
        }
    }

    /// `None` for an empty or trusted origin, otherwise the origin itself.
    pub fn salt_for<'a>(&self, origin: &'a str) -> Option<&'a str> {
        if origin.is_empty() || self.unsalted_origins.contains(origin) {
            return None;
        }
        Some(origin)
    }

    pub fn is_unsalted(&self, origin: &str) -> bool {
        self.salt_for(origin).is_none()
    }
}

impl Default for SaltPolicy {
    fn default() -> Self {
        Self::new(INTERNAL_ORIGINS)
    }
}

/// Salt for `origin` under the default internal-origin allow-list.
pub fn salt_for_origin(origin: &str) -> Option<&str> {
    SaltPolicy::default().salt_for(origin)
}
