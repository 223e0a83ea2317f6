//! Lexer modes
//!
//! Each mode corresponds to a command context and selects the rule table the
//! scanner consults at the current position.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Between commands: command keywords, `UNKNOWN_CMD`
    Default,
    /// General expression context used by most commands
    Expression,
    /// `EXPLAIN [ ... ]`
    Explain,
    /// `FROM` source list
    From,
    /// `KEEP` / `DROP` field patterns
    Project,
    /// `RENAME a AS b`
    Rename,
    /// `ENRICH` policy name and settings
    Enrich,
    /// `ENRICH ... ON` / `WITH` field lists
    EnrichField,
    /// `MV_EXPAND` field
    Mvexpand,
    /// `SHOW INFO`
    Show,
    /// `[setting:value]` blocks
    Setting,
    /// Preview `LOOKUP` index and key list
    Lookup,
    LookupField,
    /// Preview `JOIN` variants
    Join,
    /// Preview `METRICS` source list
    Metrics,
    /// After a `METRICS` source: more sources or aggregations
    ClosingMetrics,
}

impl Mode {
    pub const ALL: [Mode; 16] = [
        Mode::Default,
        Mode::Expression,
        Mode::Explain,
        Mode::From,
        Mode::Project,
        Mode::Rename,
        Mode::Enrich,
        Mode::EnrichField,
        Mode::Mvexpand,
        Mode::Show,
        Mode::Setting,
        Mode::Lookup,
        Mode::LookupField,
        Mode::Join,
        Mode::Metrics,
        Mode::ClosingMetrics,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_id(id: usize) -> Option<Mode> {
        Self::ALL.get(id).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Default => "DEFAULT_MODE",
            Mode::Expression => "EXPRESSION_MODE",
            Mode::Explain => "EXPLAIN_MODE",
            Mode::From => "FROM_MODE",
            Mode::Project => "PROJECT_MODE",
            Mode::Rename => "RENAME_MODE",
            Mode::Enrich => "ENRICH_MODE",
            Mode::EnrichField => "ENRICH_FIELD_MODE",
            Mode::Mvexpand => "MVEXPAND_MODE",
            Mode::Show => "SHOW_MODE",
            Mode::Setting => "SETTING_MODE",
            Mode::Lookup => "LOOKUP_MODE",
            Mode::LookupField => "LOOKUP_FIELD_MODE",
            Mode::Join => "JOIN_MODE",
            Mode::Metrics => "METRICS_MODE",
            Mode::ClosingMetrics => "CLOSING_METRICS_MODE",
        }
    }

    pub fn from_name(name: &str) -> Option<Mode> {
        Self::ALL.iter().copied().find(|mode| mode.name() == name)
    }

    /// Whether the mode is only reachable through version-gated rules
    pub fn is_preview(self) -> bool {
        matches!(
            self,
            Mode::Lookup | Mode::LookupField | Mode::Join | Mode::Metrics | Mode::ClosingMetrics
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_ids_follow_declaration_order() {
        for (index, mode) in Mode::ALL.iter().enumerate() {
            assert_eq!(mode.id(), index);
            assert_eq!(Mode::from_id(index), Some(*mode));
            assert_eq!(Mode::from_name(mode.name()), Some(*mode));
        }
        assert_eq!(Mode::from_id(16), None);
        assert_eq!(Mode::ClosingMetrics.name(), "CLOSING_METRICS_MODE");
    }
}
