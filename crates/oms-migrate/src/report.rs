//! Run report
//!
//! Provides [`MigrationReport`], the human-reviewable result of one run:
//! per-record outcomes, name changes, mappings and dependencies.

use chrono::{DateTime, Utc};
use oms_collision::MigrationStatus;
use oms_naming::{ComponentKind, DependencyReference, NameMapping};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Outcome for one source record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Legacy record id
    pub record_id: String,

    /// Component kind
    pub kind: ComponentKind,

    /// Name the registry knows the record by
    pub original_name: String,

    /// Name after migration
    pub final_name: String,

    /// Version number
    pub version: u32,

    /// Most severe finding
    pub status: MigrationStatus,

    /// Findings, in the order they were raised
    pub warnings: Vec<String>,

    /// Skipped: explicitly not eligible for migration
    pub excluded: bool,

    /// Id of the written record, if one was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_id: Option<String>,

    /// Number of references rewritten in the payload
    pub substitutions: usize,

    /// Rewritten payload
    pub payload: Value,
}

impl RecordOutcome {
    /// Attach a finding and escalate the status
    pub fn push_warning(&mut self, severity: MigrationStatus, message: impl Into<String>) {
        self.status.escalate(severity);
        self.warnings.push(message.into());
    }
}

/// Result of one migration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Run start
    pub started_at: DateTime<Utc>,

    /// Run end
    pub finished_at: DateTime<Utc>,

    /// Whether nothing was written
    pub dry_run: bool,

    /// Whether records needing manual intervention fail the run
    pub fail_on_manual_intervention: bool,

    /// Per-record outcomes, in fetch order
    pub records: Vec<RecordOutcome>,

    /// `"<original>" → "<final>"` lines for every renamed component
    pub change_warnings: Vec<String>,

    /// Renamed components per kind
    pub change_counts: BTreeMap<ComponentKind, usize>,

    /// Every registered mapping, in registration order
    pub mappings: Vec<NameMapping>,

    /// Every cross-component reference found in payloads
    pub dependencies: Vec<DependencyReference>,
}

impl MigrationReport {
    /// Outcome for a record
    #[must_use]
    pub fn record(&self, record_id: &str) -> Option<&RecordOutcome> {
        self.records.iter().find(|r| r.record_id == record_id)
    }

    /// Number of records per status
    #[must_use]
    pub fn counts_by_status(&self) -> BTreeMap<MigrationStatus, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        counts
    }

    /// Records a human must look at
    pub fn needing_attention(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.records.iter().filter(|r| r.status.blocks_migration())
    }

    /// Whether the run passes its gate
    ///
    /// Any `Errors` record fails the run; `NeedsManualIntervention` records
    /// fail it only when the gate is enabled.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.records.iter().all(|r| match r.status {
            MigrationStatus::Errors => false,
            MigrationStatus::NeedsManualIntervention => !self.fail_on_manual_intervention,
            MigrationStatus::ReadyForMigration | MigrationStatus::Warnings => true,
        })
    }

    /// Plain-text rendering for terminals
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Migration {} ({} records)",
            if self.dry_run { "plan" } else { "run" },
            self.records.len()
        );

        for kind in ComponentKind::ALL {
            let records: Vec<&RecordOutcome> =
                self.records.iter().filter(|r| r.kind == kind).collect();
            if records.is_empty() {
                continue;
            }
            let _ = writeln!(out, "\n{kind}");
            for record in records {
                let _ = writeln!(
                    out,
                    "  {:<12} {:<40} -> {:<40} {}",
                    record.record_id, record.original_name, record.final_name, record.status
                );
                for warning in &record.warnings {
                    let _ = writeln!(out, "      - {warning}");
                }
            }
        }

        if !self.change_warnings.is_empty() {
            let _ = writeln!(out, "\nName changes");
            for line in &self.change_warnings {
                let _ = writeln!(out, "  {line}");
            }
        }

        let _ = writeln!(out, "\nSummary");
        for (status, count) in self.counts_by_status() {
            let _ = writeln!(out, "  {status}: {count}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, status: MigrationStatus) -> RecordOutcome {
        RecordOutcome {
            record_id: id.into(),
            kind: ComponentKind::FlexCard,
            original_name: "My Card".into(),
            final_name: "MyCard".into(),
            version: 1,
            status,
            warnings: Vec::new(),
            excluded: false,
            migrated_id: None,
            substitutions: 0,
            payload: Value::Null,
        }
    }

    fn report(records: Vec<RecordOutcome>, gate: bool) -> MigrationReport {
        MigrationReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            dry_run: true,
            fail_on_manual_intervention: gate,
            records,
            change_warnings: vec!["FlexCard: \"My Card\" → \"MyCard\"".into()],
            change_counts: BTreeMap::new(),
            mappings: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn gate_on_manual_intervention() {
        let records = vec![
            outcome("a", MigrationStatus::ReadyForMigration),
            outcome("b", MigrationStatus::NeedsManualIntervention),
        ];
        assert!(report(records.clone(), false).is_clean());
        assert!(!report(records, true).is_clean());
    }

    #[test]
    fn errors_always_fail() {
        assert!(!report(vec![outcome("a", MigrationStatus::Errors)], false).is_clean());
    }

    #[test]
    fn push_warning_escalates() {
        let mut record = outcome("a", MigrationStatus::ReadyForMigration);
        record.push_warning(MigrationStatus::Warnings, "references excluded component");
        assert_eq!(record.status, MigrationStatus::Warnings);
        assert_eq!(record.warnings.len(), 1);
    }

    #[test]
    fn render_text_lists_records_and_summary() {
        let mut record = outcome("fc1", MigrationStatus::NeedsManualIntervention);
        record.warnings.push("duplicate name".into());
        let text = report(vec![record], false).render_text();

        assert!(text.starts_with("Migration plan (1 records)"));
        assert!(text.contains("FlexCard"));
        assert!(text.contains("      - duplicate name"));
        assert!(text.contains("Needs manual intervention: 1"));
        assert!(text.contains("FlexCard: \"My Card\" → \"MyCard\""));
    }

    #[test]
    fn counts_and_attention() {
        let r = report(
            vec![
                outcome("a", MigrationStatus::ReadyForMigration),
                outcome("b", MigrationStatus::ReadyForMigration),
                outcome("c", MigrationStatus::Errors),
            ],
            false,
        );
        let counts = r.counts_by_status();
        assert_eq!(counts[&MigrationStatus::ReadyForMigration], 2);
        assert_eq!(r.needing_attention().count(), 1);
        assert_eq!(r.record("c").unwrap().status, MigrationStatus::Errors);
    }
}
