//! Migration run configuration
//!
//! Provides [`MigrationConfig`], loadable from TOML:
//!
//! ```toml
//! kinds = ["DataMapper", "IntegrationProcedure", "OmniScript", "FlexCard"]
//! all_versions = ["FlexCard"]
//! parallel_rewrite = true
//! fail_on_manual_intervention = false
//! dry_run = false
//! ```

use oms_collision::ResolutionMode;
use oms_naming::ComponentKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Settings for one migration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Kinds migrated in this run
    pub kinds: Vec<ComponentKind>,

    /// Kinds whose versions coexist after migration
    pub all_versions: Vec<ComponentKind>,

    /// Rewrite payloads on the rayon pool
    pub parallel_rewrite: bool,

    /// Treat records needing manual intervention as a failed run
    pub fail_on_manual_intervention: bool,

    /// Plan only; nothing is written back to the store
    pub dry_run: bool,
}

impl MigrationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With the kinds to migrate
    #[inline]
    #[must_use]
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// With all versions kept for `kind`
    #[inline]
    #[must_use]
    pub fn with_all_versions(mut self, kind: ComponentKind) -> Self {
        if !self.all_versions.contains(&kind) {
            self.all_versions.push(kind);
        }
        self
    }

    /// With parallel rewriting on or off
    #[inline]
    #[must_use]
    pub fn with_parallel_rewrite(mut self, parallel: bool) -> Self {
        self.parallel_rewrite = parallel;
        self
    }

    /// With the manual-intervention gate on or off
    #[inline]
    #[must_use]
    pub fn with_fail_on_manual_intervention(mut self, fail: bool) -> Self {
        self.fail_on_manual_intervention = fail;
        self
    }

    /// With dry run on or off
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolver mode for `kind`
    ///
    /// Kinds without version support are always [`ResolutionMode::LatestOnly`].
    #[must_use]
    pub fn mode_for(&self, kind: ComponentKind) -> ResolutionMode {
        if kind.supports_versions() && self.all_versions.contains(&kind) {
            ResolutionMode::AllVersions
        } else {
            ResolutionMode::LatestOnly
        }
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or fails [`MigrationConfig::validate`]
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// Returns error if no kind is selected or a kind is listed twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kinds.is_empty() {
            return Err(ConfigError::Invalid("no component kinds selected".to_string()));
        }
        for (i, kind) in self.kinds.iter().enumerate() {
            if self.kinds[..i].contains(kind) {
                return Err(ConfigError::Invalid(format!("kind listed twice: {kind}")));
            }
        }
        Ok(())
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            kinds: ComponentKind::ALL.to_vec(),
            all_versions: Vec::new(),
            parallel_rewrite: true,
            fail_on_manual_intervention: false,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_migrates_every_kind_latest_only() {
        let config = MigrationConfig::default();
        assert_eq!(config.kinds.len(), 4);
        for kind in ComponentKind::ALL {
            assert_eq!(config.mode_for(kind), ResolutionMode::LatestOnly);
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn all_versions_ignored_for_data_mapper() {
        let config = MigrationConfig::new()
            .with_all_versions(ComponentKind::DataMapper)
            .with_all_versions(ComponentKind::FlexCard);
        assert_eq!(config.mode_for(ComponentKind::DataMapper), ResolutionMode::LatestOnly);
        assert_eq!(config.mode_for(ComponentKind::FlexCard), ResolutionMode::AllVersions);
    }

    #[test]
    fn from_toml_partial() {
        let config = MigrationConfig::from_toml_str(
            r#"
            kinds = ["FlexCard", "DataMapper"]
            all_versions = ["FlexCard"]
            dry_run = true
            "#,
        )
        .unwrap();

        assert_eq!(config.kinds, vec![ComponentKind::FlexCard, ComponentKind::DataMapper]);
        assert!(config.dry_run);
        assert!(config.parallel_rewrite);
    }

    #[test]
    fn rejects_empty_and_repeated_kinds() {
        assert!(matches!(
            MigrationConfig::from_toml_str("kinds = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MigrationConfig::from_toml_str(r#"kinds = ["FlexCard", "FlexCard"]"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!(matches!(
            MigrationConfig::from_toml_str(r#"kinds = ["Widget"]"#),
            Err(ConfigError::InvalidToml(_))
        ));
    }
}
