//! Error types for migration runs
//!
//! The naming engine itself never fails; errors here come from the edges of a
//! run:
//! - Loading or validating configuration
//! - Decoding serialized payloads
//! - Reading from or writing to the record store

use std::path::PathBuf;

/// Main migration error type
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record store failure
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    /// A serialized payload is not valid JSON
    #[error("invalid payload for record {record_id}: {source}")]
    InvalidPayload {
        /// Offending record
        record_id: String,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// A records snapshot is not valid JSON
    #[error("invalid records snapshot: {0}")]
    InvalidSnapshot(#[source] serde_json::Error),
}

impl MigrateError {
    /// Create invalid payload error for a record
    pub fn invalid_payload(record_id: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidPayload {
            record_id: record_id.into(),
            source,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::MigrationConfig`]
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Semantic validation failed
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Record store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store refused a write
    #[error("write rejected for record {record_id}: {reason}")]
    WriteRejected {
        /// Source record id
        record_id: String,
        /// Store-provided reason
        reason: String,
    },

    /// Store could not be queried
    #[error("query failed: {0}")]
    QueryFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts() {
        let err: MigrateError = ConfigError::Invalid("no kinds".into()).into();
        assert_eq!(err.to_string(), "configuration error: invalid configuration: no kinds");
    }

    #[test]
    fn invalid_payload_message() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = MigrateError::invalid_payload("os1", source);
        assert!(err.to_string().starts_with("invalid payload for record os1"));
    }
}
