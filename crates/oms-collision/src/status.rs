//! Record status and collision warnings
//!
//! Provides [`MigrationStatus`], ordered by severity, and [`CollisionWarning`],
//! the findings the resolver attaches to a record.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Per-record outcome, ordered from least to most severe
///
/// Combining findings keeps the most severe one:
/// `Errors > NeedsManualIntervention > Warnings > ReadyForMigration`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum MigrationStatus {
    /// Safe to migrate as is
    #[default]
    ReadyForMigration,

    /// Migratable, but the report should point something out
    Warnings,

    /// A human must resolve a conflict before this record can migrate
    NeedsManualIntervention,

    /// Cannot be migrated
    Errors,
}

impl MigrationStatus {
    /// Combine with another finding, keeping the more severe status
    #[inline]
    pub fn escalate(&mut self, other: MigrationStatus) {
        *self = (*self).max(other);
    }

    /// Whether the record must not be migrated automatically
    #[inline]
    #[must_use]
    pub fn blocks_migration(self) -> bool {
        self >= Self::NeedsManualIntervention
    }

    /// Report label
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ReadyForMigration => "Ready for migration",
            Self::Warnings => "Warnings",
            Self::NeedsManualIntervention => "Needs manual intervention",
            Self::Errors => "Failed",
        }
    }
}

impl Display for MigrationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Finding attached to one record of a batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionWarning {
    /// The cleaned name differs from the original
    NameChange {
        /// Raw name
        original: String,
        /// Name after migration
        final_name: String,
    },

    /// The final name is already taken by an earlier record of the batch
    Duplicate {
        /// Contested final name
        final_name: String,
        /// Raw name of the record holding it
        claimed_by: String,
    },

    /// The exact versioned final name is already taken by a different raw name
    ExactDuplicate {
        /// Contested final name
        final_name: String,
        /// Raw name of the record holding it
        claimed_by: String,
    },

    /// A different raw name already owns this cleaned base name
    LowerVersionDuplicate {
        /// Cleaned base name both raw names reduce to
        base_name: String,
        /// Raw name that owns the base name
        owner: String,
    },

    /// The name cleans to nothing usable
    EmptyName {
        /// Raw name
        original: String,
    },
}

impl CollisionWarning {
    /// Status this finding forces on its record
    #[must_use]
    pub const fn severity(&self) -> MigrationStatus {
        match self {
            Self::NameChange { .. } => MigrationStatus::ReadyForMigration,
            Self::Duplicate { .. }
            | Self::ExactDuplicate { .. }
            | Self::LowerVersionDuplicate { .. } => MigrationStatus::NeedsManualIntervention,
            Self::EmptyName { .. } => MigrationStatus::Errors,
        }
    }

    /// Whether this finding is one of the duplicate flavours
    #[inline]
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::Duplicate { .. } | Self::ExactDuplicate { .. } | Self::LowerVersionDuplicate { .. }
        )
    }
}

impl Display for CollisionWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameChange { original, final_name } => {
                write!(f, "name will change: \"{original}\" → \"{final_name}\"")
            }
            Self::Duplicate { final_name, claimed_by } => {
                write!(f, "duplicate name \"{final_name}\": already used by \"{claimed_by}\"")
            }
            Self::ExactDuplicate { final_name, claimed_by } => {
                write!(f, "duplicate card name \"{final_name}\": already claimed by \"{claimed_by}\"")
            }
            Self::LowerVersionDuplicate { base_name, owner } => write!(
                f,
                "lower version duplicate: \"{base_name}\" is already owned by \"{owner}\""
            ),
            Self::EmptyName { original } => {
                write!(f, "name \"{original}\" has no identifier-safe characters")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_precedence() {
        assert!(MigrationStatus::Errors > MigrationStatus::NeedsManualIntervention);
        assert!(MigrationStatus::NeedsManualIntervention > MigrationStatus::Warnings);
        assert!(MigrationStatus::Warnings > MigrationStatus::ReadyForMigration);
    }

    #[test]
    fn escalate_keeps_most_severe() {
        let mut status = MigrationStatus::default();
        status.escalate(MigrationStatus::NeedsManualIntervention);
        status.escalate(MigrationStatus::Warnings);
        assert_eq!(status, MigrationStatus::NeedsManualIntervention);
        status.escalate(MigrationStatus::Errors);
        assert_eq!(status, MigrationStatus::Errors);
        assert!(status.blocks_migration());
    }

    #[test]
    fn warning_severity() {
        let rename = CollisionWarning::NameChange { original: "A$".into(), final_name: "A".into() };
        let dup = CollisionWarning::Duplicate { final_name: "A".into(), claimed_by: "A".into() };
        assert_eq!(rename.severity(), MigrationStatus::ReadyForMigration);
        assert_eq!(dup.severity(), MigrationStatus::NeedsManualIntervention);
        assert!(dup.is_duplicate());
        assert!(!rename.is_duplicate());
    }

    #[test]
    fn warning_messages() {
        let w = CollisionWarning::ExactDuplicate { final_name: "A_1".into(), claimed_by: "A".into() };
        assert_eq!(w.to_string(), "duplicate card name \"A_1\": already claimed by \"A\"");

        let w = CollisionWarning::NameChange { original: "A$".into(), final_name: "A_3".into() };
        assert_eq!(w.to_string(), "name will change: \"A$\" → \"A_3\"");
    }

    #[test]
    fn warning_serializes_tagged() {
        let w = CollisionWarning::EmptyName { original: "$$".into() };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "empty_name");
        assert_eq!(json["original"], "$$");
    }
}
