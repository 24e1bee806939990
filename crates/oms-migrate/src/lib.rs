//! OMS Migrate - migration runs over component records
//!
//! Drives the naming engine end to end:
//! - Fetches legacy records of every configured kind from a [`RecordStore`]
//! - Resolves version collisions and registers every final name
//! - Rewrites each payload against the complete registry
//! - Writes migrated records back and reports every finding
//!
//! # Example
//!
//! ```rust
//! use oms_migrate::{migrate, MemoryStore, MigrationConfig, SourceRecord};
//! use oms_naming::ComponentKind;
//! use serde_json::json;
//!
//! let mut store = MemoryStore::new(vec![
//!     SourceRecord::new("dr1", ComponentKind::DataMapper, "Load-Account"),
//!     SourceRecord::new("fc1", ComponentKind::FlexCard, "Account Card")
//!         .with_payload(json!({"dataSource": {"bundle": "Load-Account"}})),
//! ]);
//!
//! let report = migrate(MigrationConfig::new(), &mut store).unwrap();
//! let card = report.record("fc1").unwrap();
//! assert_eq!(card.final_name, "AccountCard");
//! assert_eq!(card.payload, json!({"dataSource": {"bundle": "LoadAccount"}}));
//! assert!(report.is_clean());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod run;
pub mod store;

// Re-exports
pub use config::MigrationConfig;
pub use error::{ConfigError, MigrateError, StoreError};
pub use record::{MigratedRecord, OmniKey, SourceRecord};
pub use report::{MigrationReport, RecordOutcome};
pub use run::{migrate, MigrationRun};
pub use store::{MemoryStore, RecordStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for migration runs
    pub use crate::{
        migrate, MemoryStore, MigrationConfig, MigrationReport, MigrationRun, RecordStore,
        SourceRecord,
    };
    pub use oms_collision::MigrationStatus;
    pub use oms_naming::ComponentKind;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
