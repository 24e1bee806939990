//! OMS Naming
//!
//! Component kinds and identifier-safe name cleaning.
//!
//! # Overview
//!
//! - **ComponentKind**: The four component families, each with its own name namespace
//! - **NameCleaner**: Pure, idempotent raw-name to identifier-name cleaning
//! - **NameMapping**: Original-to-final name assignment for one record
//! - **DependencyReference**: Audit record of a cross-component reference
//!
//! # Example
//!
//! ```rust
//! use oms_naming::{clean, ComponentKind, NameMapping};
//!
//! let raw = "Customer-Data Loader";
//! let mapping = NameMapping::new(raw, clean(raw), ComponentKind::DataMapper, "dr1");
//! assert_eq!(mapping.final_name, "CustomerDataLoader");
//! assert!(mapping.is_rename());
//! ```

#![warn(missing_docs)]

pub mod cleaner;
pub mod kind;
pub mod mapping;

// Re-exports
pub use cleaner::{clean, clean_strict, is_clean, join_key, NameCleaner, KEY_SEPARATOR};
pub use kind::{ComponentKind, ParseKindError};
pub use mapping::{DependencyReference, NameMapping};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
