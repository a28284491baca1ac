//! Configuration types for the prefix walker.

use serde::{Deserialize, Serialize};

/// What the walker does when listing a prefix is denied.
///
/// One policy applies to every prefix of a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeniedPolicy {
    /// Treat the denied prefix as an empty subtree and keep exploring siblings
    #[default]
    Skip,

    /// Abort the whole traversal with the denial
    Abort,
}

/// Configuration for a prefix walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Policy for denied prefixes
    pub denied_policy: DeniedPolicy,

    /// Deepest sub-prefix level to descend into, relative to the start prefix
    /// (None = unlimited)
    pub max_depth: Option<usize>,
}

impl WalkerConfig {
    /// Create a new walker configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the denied-prefix policy.
    pub fn with_denied_policy(mut self, policy: DeniedPolicy) -> Self {
        self.denied_policy = policy;
        self
    }

    /// Limit how deep below the start prefix the walker descends.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}
