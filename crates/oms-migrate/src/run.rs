//! Migration run
//!
//! Provides [`MigrationRun`], which drives the naming engine over every record
//! of a store.
//!
//! # Workflow
//! 1. Clear the registry
//! 2. Fetch every configured kind
//! 3. Phase one: mark exclusions, resolve each kind's batch, register names
//! 4. Phase two: rewrite and scan every payload against the full registry
//! 5. Write migrated records back (skipped on dry run)

use chrono::Utc;
use oms_collision::{CollisionResolution, MigrationStatus, VersionCollisionResolver};
use oms_naming::{ComponentKind, DependencyReference};
use oms_registry::{ExcludedReference, NameRegistry};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::MigrationConfig;
use crate::error::MigrateError;
use crate::record::{MigratedRecord, SourceRecord};
use crate::report::{MigrationReport, RecordOutcome};
use crate::store::RecordStore;

/// Phase-two result for one record
#[derive(Debug)]
struct Rewritten {
    payload: Value,
    substitutions: usize,
    dependencies: Vec<DependencyReference>,
    excluded_refs: Vec<ExcludedReference>,
}

/// One migration run and the registry it populates
#[derive(Debug, Default)]
pub struct MigrationRun {
    config: MigrationConfig,
    registry: NameRegistry,
}

impl MigrationRun {
    /// Create run with configuration
    #[inline]
    #[must_use]
    pub fn new(config: MigrationConfig) -> Self {
        Self {
            config,
            registry: NameRegistry::new(),
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Registry as left by the last run
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Execute a full run against `store`
    ///
    /// A rejected write does not stop the run; it becomes an `Errors` finding
    /// on that record's outcome.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or a fetch fails
    pub fn execute<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<MigrationReport, MigrateError> {
        self.config.validate()?;
        let started_at = Utc::now();
        self.registry.clear();

        let mut records = Vec::new();
        for kind in &self.config.kinds {
            let fetched = store.fetch(*kind)?;
            tracing::info!(kind = %kind, count = fetched.len(), "fetched records");
            records.extend(fetched.into_iter().filter(|r| r.kind == *kind));
        }

        let resolutions = self.register_all(&records);
        tracing::info!(
            mappings = self.registry.len(),
            excluded = self.registry.excluded_names().len(),
            "registration complete"
        );

        let rewritten = self.rewrite_all(&records);
        tracing::info!(records = rewritten.len(), "rewrite complete");

        let mut outcomes = Vec::with_capacity(records.len());
        let mut dependencies = Vec::new();
        for (record, rewritten) in records.iter().zip(rewritten) {
            dependencies.extend(rewritten.dependencies.iter().cloned());
            let resolution = resolutions.get(&(record.kind, record.id.clone()));
            let mut outcome = Self::outcome(record, resolution, rewritten);

            if !record.excluded && !outcome.status.blocks_migration() && !self.config.dry_run {
                let written = store.write(MigratedRecord {
                    source_id: record.id.clone(),
                    kind: record.kind,
                    name: outcome.final_name.clone(),
                    version: record.version,
                    payload: outcome.payload.clone(),
                });
                match written {
                    Ok(migrated_id) => {
                        let owns_mapping = self
                            .registry
                            .mapping(record.kind, &outcome.original_name)
                            .is_some_and(|m| m.record_id == record.id);
                        if owns_mapping {
                            self.registry.set_migrated_id(
                                record.kind,
                                &outcome.original_name,
                                migrated_id.as_str(),
                            );
                        }
                        outcome.migrated_id = Some(migrated_id);
                    }
                    Err(err) => {
                        tracing::warn!(record = %record.id, error = %err, "write failed");
                        outcome.push_warning(MigrationStatus::Errors, format!("write failed: {err}"));
                    }
                }
            }
            outcomes.push(outcome);
        }

        let report = MigrationReport {
            started_at,
            finished_at: Utc::now(),
            dry_run: self.config.dry_run,
            fail_on_manual_intervention: self.config.fail_on_manual_intervention,
            records: outcomes,
            change_warnings: self.registry.change_warnings(None),
            change_counts: self.registry.change_counts_by_kind(),
            mappings: self.registry.all_mappings().cloned().collect(),
            dependencies,
        };
        tracing::info!(
            records = report.records.len(),
            attention = report.needing_attention().count(),
            clean = report.is_clean(),
            "migration run finished"
        );
        Ok(report)
    }

    /// Phase one: exclusions and names for every kind, before any rewrite
    fn register_all(
        &mut self,
        records: &[SourceRecord],
    ) -> HashMap<(ComponentKind, String), CollisionResolution> {
        for record in records.iter().filter(|r| r.excluded) {
            self.registry.mark_excluded(record.raw_name());
        }

        let mut resolutions = HashMap::new();
        for kind in self.config.kinds.clone() {
            let batch: Vec<_> = records
                .iter()
                .filter(|r| r.kind == kind && !r.excluded)
                .map(SourceRecord::to_versioned)
                .collect();
            if batch.is_empty() {
                continue;
            }

            let mode = self.config.mode_for(kind);
            let resolved = VersionCollisionResolver::resolve_batch(&batch, mode);
            let registered = resolved.register_into(&mut self.registry, kind);
            tracing::debug!(
                kind = %kind,
                ?mode,
                records = batch.len(),
                registered,
                blocked = resolved.blocked_count(),
                "batch resolved"
            );
            resolutions.extend(resolved.results.into_iter().map(|(id, r)| ((kind, id), r)));
        }
        resolutions
    }

    /// Phase two: read-only against the registry, so records run in parallel
    fn rewrite_all(&self, records: &[SourceRecord]) -> Vec<Rewritten> {
        let registry = &self.registry;
        let rewrite_one = |record: &SourceRecord| -> Rewritten {
            if record.excluded {
                return Rewritten {
                    payload: record.payload.clone(),
                    substitutions: 0,
                    dependencies: Vec::new(),
                    excluded_refs: Vec::new(),
                };
            }
            let (payload, substitutions) = registry.rewriter().rewrite_counted(&record.payload);
            let scanner = registry.scanner();
            let rewritten = Rewritten {
                payload,
                substitutions,
                dependencies: scanner.scan(&record.id, record.kind, &record.payload),
                excluded_refs: scanner.excluded_references(&record.payload),
            };
            tracing::debug!(
                record = %record.id,
                substitutions,
                dependencies = rewritten.dependencies.len(),
                "payload rewritten"
            );
            rewritten
        };

        if self.config.parallel_rewrite {
            records.par_iter().map(rewrite_one).collect()
        } else {
            records.iter().map(rewrite_one).collect()
        }
    }

    fn outcome(
        record: &SourceRecord,
        resolution: Option<&CollisionResolution>,
        rewritten: Rewritten,
    ) -> RecordOutcome {
        let mut outcome = RecordOutcome {
            record_id: record.id.clone(),
            kind: record.kind,
            original_name: record.raw_name(),
            final_name: record.raw_name(),
            version: record.version,
            status: MigrationStatus::ReadyForMigration,
            warnings: Vec::new(),
            excluded: record.excluded,
            migrated_id: None,
            substitutions: rewritten.substitutions,
            payload: rewritten.payload,
        };

        if record.excluded {
            outcome.push_warning(MigrationStatus::Warnings, "excluded from migration");
            return outcome;
        }

        if let Some(resolution) = resolution {
            outcome.final_name = resolution.final_name.clone();
            outcome.status = resolution.status;
            outcome.warnings = resolution.messages();
        }

        for reference in rewritten.excluded_refs {
            tracing::warn!(
                record = %record.id,
                name = %reference.name,
                path = %reference.field_path,
                "reference to excluded component"
            );
            outcome.push_warning(
                MigrationStatus::Warnings,
                format!(
                    "references excluded component \"{}\" at {}",
                    reference.name, reference.field_path
                ),
            );
        }
        outcome
    }
}

/// Run once with `config` against `store`
///
/// # Errors
/// Returns error if the configuration is invalid or a fetch fails
pub fn migrate<S: RecordStore + ?Sized>(
    config: MigrationConfig,
    store: &mut S,
) -> Result<MigrationReport, MigrateError> {
    MigrationRun::new(config).execute(store)
}
