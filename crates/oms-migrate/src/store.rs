//! Record store collaborator
//!
//! Provides the [`RecordStore`] trait a run reads legacy records from and
//! writes migrated records to, plus [`MemoryStore`], an in-process store used
//! by tests and by the offline planner.

use indexmap::IndexMap;
use oms_naming::ComponentKind;

use crate::error::{MigrateError, StoreError};
use crate::record::{decode_json, MigratedRecord, SourceRecord};

/// Source of legacy records and sink for migrated ones
pub trait RecordStore {
    /// Every legacy record of `kind`, in the store's processing order
    ///
    /// # Errors
    /// Returns error if the store cannot be queried
    fn fetch(&self, kind: ComponentKind) -> Result<Vec<SourceRecord>, StoreError>;

    /// Persist a migrated record, returning its new id
    ///
    /// # Errors
    /// Returns error if the store rejects the write
    fn write(&mut self, record: MigratedRecord) -> Result<String, StoreError>;
}

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<SourceRecord>,
    written: IndexMap<String, MigratedRecord>,
}

impl MemoryStore {
    /// Create store holding `records`
    #[inline]
    #[must_use]
    pub fn new(records: Vec<SourceRecord>) -> Self {
        Self {
            records,
            written: IndexMap::new(),
        }
    }

    /// Parse a JSON array of records
    ///
    /// # Errors
    /// Returns error if the snapshot is not a valid record array
    pub fn from_json(json: &str) -> Result<Self, MigrateError> {
        let records: Vec<SourceRecord> = decode_json(json).map_err(MigrateError::InvalidSnapshot)?;
        Ok(Self::new(records))
    }

    /// Add a legacy record
    pub fn insert(&mut self, record: SourceRecord) {
        self.records.push(record);
    }

    /// Legacy records
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    /// Migrated records, keyed by new id, in write order
    #[inline]
    #[must_use]
    pub fn written(&self) -> &IndexMap<String, MigratedRecord> {
        &self.written
    }

    /// Migrated record for a legacy id
    #[must_use]
    pub fn written_for(&self, source_id: &str) -> Option<&MigratedRecord> {
        self.written.values().find(|r| r.source_id == source_id)
    }
}

impl RecordStore for MemoryStore {
    fn fetch(&self, kind: ComponentKind) -> Result<Vec<SourceRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect())
    }

    fn write(&mut self, record: MigratedRecord) -> Result<String, StoreError> {
        if record.name.is_empty() {
            return Err(StoreError::WriteRejected {
                record_id: record.source_id,
                reason: "empty name".to_string(),
            });
        }
        let id = format!("m{:06}", self.written.len() + 1);
        self.written.insert(id.clone(), record);
        Ok(id)
    }
}
