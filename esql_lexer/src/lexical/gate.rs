//! Version gate for preview-only syntax

use crate::config::runtime::LexicalPreferences;
use serde::{Deserialize, Serialize};

/// Result of the "is this a developer/preview build?" predicate
///
/// Resolved once when a scanner is constructed; copies are shared freely
/// across threads and never change during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VersionGate {
    dev_version: bool,
}

impl VersionGate {
    pub const RELEASE: VersionGate = VersionGate { dev_version: false };
    pub const DEVELOPMENT: VersionGate = VersionGate { dev_version: true };

    pub fn new(dev_version: bool) -> Self {
        Self { dev_version }
    }

    /// Evaluate an injected predicate once and freeze its answer
    pub fn from_predicate<F: FnOnce() -> bool>(predicate: F) -> Self {
        Self::new(predicate())
    }

    pub fn from_preferences(preferences: &LexicalPreferences) -> Self {
        Self::new(preferences.dev_version)
    }

    pub fn is_dev_version(&self) -> bool {
        self.dev_version
    }

    /// Whether a rule with the given gating is eligible under this gate
    pub fn allows(&self, dev_only: bool) -> bool {
        !dev_only || self.dev_version
    }
}
