//! Version collision resolution
//!
//! Provides [`VersionCollisionResolver`], which assigns final names to an
//! ordered stream of same-kind records that may share a base name and differ
//! by version, flagging every collision instead of failing.
//!
//! # Ordering
//! Results depend on input order: the first record to claim a name keeps it
//! and later claimants are flagged. Feed a batch through one resolver, one
//! record at a time.

use indexmap::IndexMap;
use oms_naming::{clean, ComponentKind, NameMapping};
use oms_registry::NameRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::status::{CollisionWarning, MigrationStatus};

/// One input record of a batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedRecord {
    /// Source record id
    pub record_id: String,

    /// Raw display name
    pub raw_name: String,

    /// Version number
    pub version: u32,

    /// Precomputed cleaned identity, when plain [`clean`] of the raw name is
    /// not the right base (composite keys cleaned per part)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
}

impl VersionedRecord {
    /// Create new record
    #[inline]
    #[must_use]
    pub fn new(record_id: impl Into<String>, raw_name: impl Into<String>, version: u32) -> Self {
        Self {
            record_id: record_id.into(),
            raw_name: raw_name.into(),
            version,
            base_name: None,
        }
    }

    /// With precomputed base name
    #[inline]
    #[must_use]
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = Some(base_name.into());
        self
    }

    /// Cleaned identity of this record
    #[must_use]
    pub fn base(&self) -> String {
        match &self.base_name {
            Some(base) => base.clone(),
            None => clean(&self.raw_name),
        }
    }
}

/// How versions map to final names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionMode {
    /// Final name omits the version; one record per final name
    #[default]
    LatestOnly,

    /// Final name is `base_version`; every version coexists
    AllVersions,
}

/// Outcome for one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionResolution {
    /// Raw name the record came in with
    pub original_name: String,

    /// Version of the record
    pub version: u32,

    /// Name assigned to the record
    pub final_name: String,

    /// Most severe status among the warnings
    pub status: MigrationStatus,

    /// Findings, in the order they were raised
    pub warnings: Vec<CollisionWarning>,
}

impl CollisionResolution {
    fn new(record: &VersionedRecord, final_name: String) -> Self {
        Self {
            original_name: record.raw_name.clone(),
            version: record.version,
            final_name,
            status: MigrationStatus::ReadyForMigration,
            warnings: Vec::new(),
        }
    }

    /// Attach a finding and escalate the status
    pub fn push_warning(&mut self, warning: CollisionWarning) {
        self.status.escalate(warning.severity());
        self.warnings.push(warning);
    }

    /// Rendered warning messages
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Whether any duplicate finding is attached
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.warnings.iter().any(CollisionWarning::is_duplicate)
    }
}

/// Who holds a final name
#[derive(Debug, Clone)]
struct Claim {
    raw_name: String,
    record_id: String,
}

/// Stateful resolver for one batch
///
/// # Example
/// ```
/// use oms_collision::{MigrationStatus, ResolutionMode, VersionCollisionResolver, VersionedRecord};
///
/// let batch = VersionCollisionResolver::resolve_batch(
///     &[VersionedRecord::new("c1", "TestCard", 1), VersionedRecord::new("c2", "TestCard", 2)],
///     ResolutionMode::AllVersions,
/// );
/// assert_eq!(batch.get("c1").unwrap().final_name, "TestCard_1");
/// assert_eq!(batch.get("c2").unwrap().status, MigrationStatus::ReadyForMigration);
/// ```
#[derive(Debug, Default)]
pub struct VersionCollisionResolver {
    mode: ResolutionMode,

    /// Final name -> holder
    claimed: HashMap<String, Claim>,

    /// Cleaned base name -> first raw name seen with it
    base_owner: HashMap<String, String>,

    /// Record id -> outcome, in processing order
    results: IndexMap<String, CollisionResolution>,
}

impl VersionCollisionResolver {
    /// Create resolver for a fresh batch
    #[inline]
    #[must_use]
    pub fn new(mode: ResolutionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Resolve a whole batch in order
    #[must_use]
    pub fn resolve_batch(records: &[VersionedRecord], mode: ResolutionMode) -> BatchResolution {
        let mut resolver = Self::new(mode);
        for record in records {
            resolver.push(record);
        }
        resolver.finish()
    }

    /// Mode of this batch
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Resolve the next record of the batch
    pub fn push(&mut self, record: &VersionedRecord) -> &CollisionResolution {
        let base = record.base();
        let index = if base.is_empty() {
            let mut resolution = CollisionResolution::new(record, base);
            resolution.push_warning(CollisionWarning::EmptyName {
                original: record.raw_name.clone(),
            });
            self.store(record, resolution)
        } else {
            match self.mode {
                ResolutionMode::LatestOnly => self.push_latest(record, base),
                ResolutionMode::AllVersions => self.push_all_versions(record, base),
            }
        };

        &self.results[index]
    }

    fn push_latest(&mut self, record: &VersionedRecord, base: String) -> usize {
        if let Some(claim) = self.claimed.get(&base) {
            if claim.raw_name == record.raw_name && claim.record_id == record.record_id {
                if let Some(index) = self.results.get_index_of(&record.record_id) {
                    return index;
                }
            }
            let claimed_by = claim.raw_name.clone();
            let mut resolution = Self::renamed(record, base.clone());
            resolution.push_warning(CollisionWarning::Duplicate {
                final_name: base,
                claimed_by,
            });
            return self.store(record, resolution);
        }

        self.claimed.insert(base.clone(), Self::claim(record));
        self.base_owner
            .entry(base.clone())
            .or_insert_with(|| record.raw_name.clone());
        let resolution = Self::renamed(record, base);
        self.store(record, resolution)
    }

    fn push_all_versions(&mut self, record: &VersionedRecord, base: String) -> usize {
        let final_name = format!("{base}_{}", record.version);

        if let Some(claim) = self.claimed.get(&final_name) {
            if claim.raw_name == record.raw_name {
                if let Some(index) = self.results.get_index_of(&record.record_id) {
                    return index;
                }
                let resolution = Self::renamed(record, final_name);
                return self.store(record, resolution);
            }
            let claimed_by = claim.raw_name.clone();
            let mut resolution = Self::renamed(record, final_name.clone());
            resolution.push_warning(CollisionWarning::ExactDuplicate {
                final_name,
                claimed_by,
            });
            return self.store(record, resolution);
        }

        if let Some(owner) = self.base_owner.get(&base) {
            if *owner != record.raw_name {
                let owner = owner.clone();
                let mut resolution = Self::renamed(record, final_name);
                resolution.push_warning(CollisionWarning::LowerVersionDuplicate {
                    base_name: base,
                    owner,
                });
                return self.store(record, resolution);
            }
        }

        self.claimed.insert(final_name.clone(), Self::claim(record));
        self.base_owner
            .entry(base)
            .or_insert_with(|| record.raw_name.clone());
        let resolution = Self::renamed(record, final_name);
        self.store(record, resolution)
    }

    /// Fresh resolution, carrying a name-change finding when the name changes
    fn renamed(record: &VersionedRecord, final_name: String) -> CollisionResolution {
        let base_changed = record.base() != record.raw_name;
        let mut resolution = CollisionResolution::new(record, final_name.clone());
        if base_changed {
            resolution.push_warning(CollisionWarning::NameChange {
                original: record.raw_name.clone(),
                final_name,
            });
        }
        resolution
    }

    fn claim(record: &VersionedRecord) -> Claim {
        Claim {
            raw_name: record.raw_name.clone(),
            record_id: record.record_id.clone(),
        }
    }

    fn store(&mut self, record: &VersionedRecord, resolution: CollisionResolution) -> usize {
        if resolution.status.blocks_migration() {
            tracing::warn!(
                record = %record.record_id,
                name = %record.raw_name,
                version = record.version,
                final_name = %resolution.final_name,
                warnings = ?resolution.messages(),
                "name collision needs attention"
            );
        }
        self.results
            .insert_full(record.record_id.clone(), resolution)
            .0
    }

    /// Close the batch
    #[must_use]
    pub fn finish(self) -> BatchResolution {
        BatchResolution {
            mode: self.mode,
            results: self.results,
        }
    }
}

/// Outcome of a whole batch, in processing order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResolution {
    /// Mode the batch was resolved in
    pub mode: ResolutionMode,

    /// Record id -> outcome
    pub results: IndexMap<String, CollisionResolution>,
}

impl BatchResolution {
    /// Outcome for one record
    #[inline]
    #[must_use]
    pub fn get(&self, record_id: &str) -> Option<&CollisionResolution> {
        self.results.get(record_id)
    }

    /// Outcomes in processing order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CollisionResolution)> {
        self.results.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Number of resolved records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if the batch was empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of records a human must look at
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.results
            .values()
            .filter(|r| r.status.blocks_migration())
            .count()
    }

    /// Register the batch's names into `registry` under `kind`
    ///
    /// Blocked records are skipped. In [`ResolutionMode::AllVersions`] each
    /// raw name maps to the final name of its highest version. Returns the
    /// number of mappings written.
    pub fn register_into(&self, registry: &mut NameRegistry, kind: ComponentKind) -> usize {
        let mut chosen: IndexMap<&str, (&str, &CollisionResolution)> = IndexMap::new();
        for (record_id, resolution) in self.iter() {
            if resolution.status.blocks_migration() {
                continue;
            }
            let slot = chosen
                .entry(resolution.original_name.as_str())
                .or_insert((record_id, resolution));
            if self.mode == ResolutionMode::AllVersions && resolution.version > slot.1.version {
                *slot = (record_id, resolution);
            }
        }

        for (original, (record_id, resolution)) in &chosen {
            registry.register(NameMapping::new(
                *original,
                resolution.final_name.clone(),
                kind,
                *record_id,
            ));
        }
        chosen.len()
    }
}
