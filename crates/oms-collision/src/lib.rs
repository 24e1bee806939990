//! OMS Collision
//!
//! Version-aware collision resolution for batches of same-kind records.
//!
//! # Overview
//!
//! - **VersionCollisionResolver**: Assigns final names to an ordered batch and flags collisions
//! - **ResolutionMode**: `LatestOnly` (one record per name) or `AllVersions` (`name_version`)
//! - **MigrationStatus**: Per-record outcome, ordered by severity
//! - **CollisionWarning**: Findings accumulated on a record
//!
//! The resolver never fails: every collision becomes a status and a warning
//! for a human-reviewed report.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod resolver;
pub mod status;

// Re-exports
pub use resolver::{
    BatchResolution, CollisionResolution, ResolutionMode, VersionCollisionResolver,
    VersionedRecord,
};
pub use status::{CollisionWarning, MigrationStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
