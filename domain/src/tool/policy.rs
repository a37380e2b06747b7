//! Tool policy: which tools may be registered and executed.
//!
//! The denylist is always consulted first, so a denied name stays denied
//! even when it also appears in the allowlist.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Allow/deny policy for tool names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPolicy {
    /// When present and non-empty, only these names are eligible
    pub allowlist: Option<HashSet<String>>,
    /// Names that are always excluded
    pub denylist: HashSet<String>,
}

/// Result of evaluating a tool name against a [`ToolPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Allowed,
    /// Name is in the denylist
    Denied,
    /// An allowlist is configured and the name is not in it
    NotAllowlisted,
}

impl ToolPolicy {
    pub fn new<A, D>(allowlist: Option<A>, denylist: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let allowlist: Option<HashSet<String>> =
            allowlist.map(|names| names.into_iter().map(Into::into).collect());
        Self {
            // An empty allowlist means "no allowlist"
            allowlist: allowlist.filter(|set| !set.is_empty()),
            denylist: denylist.into_iter().map(Into::into).collect(),
        }
    }

    /// Policy that allows everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn allow(mut self, name: impl Into<String>) -> Self {
        self.allowlist
            .get_or_insert_with(HashSet::new)
            .insert(name.into());
        self
    }

    pub fn deny(mut self, name: impl Into<String>) -> Self {
        self.denylist.insert(name.into());
        self
    }

    pub fn decide(&self, tool_name: &str) -> PolicyDecision {
        if self.denylist.contains(tool_name) {
            return PolicyDecision::Denied;
        }

        match &self.allowlist {
            Some(allowed) if !allowed.is_empty() && !allowed.contains(tool_name) => {
                PolicyDecision::NotAllowlisted
            }
            _ => PolicyDecision::Allowed,
        }
    }

    pub fn is_allowed(&self, tool_name: &str) -> bool {
        self.decide(tool_name) == PolicyDecision::Allowed
    }
}
