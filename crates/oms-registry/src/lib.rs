//! OMS Registry
//!
//! Name registry and cross-reference rewriting for one migration run.
//!
//! # Overview
//!
//! - **NameRegistry**: `(kind, original name) -> final name` table plus exclusion set
//! - **ReferenceRewriter**: Non-mutating, stack-safe rewrite of references in a JSON tree
//! - **ReferenceScanner**: Locates references (and stale references to excluded names)
//!
//! Registration for every kind must finish before any rewrite; the rewriter
//! borrows the registry immutably, so the borrow checker enforces the order.
//!
//! # Example
//!
//! ```rust
//! use oms_naming::ComponentKind;
//! use oms_registry::NameRegistry;
//! use serde_json::json;
//!
//! let mut registry = NameRegistry::new();
//! registry.register_name("Customer-Data Loader", "CustomerDataLoader", ComponentKind::DataMapper, "dr1");
//!
//! let payload = json!({"dataSource": {"bundle": "Customer-Data Loader"}});
//! let rewritten = registry.rewriter().rewrite(&payload);
//! assert_eq!(rewritten, json!({"dataSource": {"bundle": "CustomerDataLoader"}}));
//! ```

#![warn(missing_docs)]

pub mod registry;
pub mod rewrite;
pub mod scan;

// Re-exports
pub use registry::NameRegistry;
pub use rewrite::ReferenceRewriter;
pub use scan::{ExcludedReference, ReferenceScanner};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registry operations
    pub use crate::{ExcludedReference, NameRegistry, ReferenceRewriter, ReferenceScanner};
    pub use oms_naming::{ComponentKind, DependencyReference, NameMapping};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
