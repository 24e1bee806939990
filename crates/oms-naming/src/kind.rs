//! Component kinds
//!
//! Provides [`ComponentKind`], the closed set of component families whose
//! names are migrated. Each kind owns its own name namespace.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Component family
///
/// The same raw string may map to different final names under different
/// kinds; every name table in the workspace is scoped by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Data transformation / extraction component
    DataMapper,

    /// Guided interactive process, keyed by `type_subtype_language`
    OmniScript,

    /// Server-side orchestration, keyed by `type_subtype`
    IntegrationProcedure,

    /// Card-based UI component
    FlexCard,
}

impl ComponentKind {
    /// Every kind, in declaration order
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::DataMapper,
        ComponentKind::OmniScript,
        ComponentKind::IntegrationProcedure,
        ComponentKind::FlexCard,
    ];

    /// Order in which kind tables are probed when a bare string is resolved
    ///
    /// OmniScript is last: its keys are full composite keys and only an
    /// exact match counts.
    pub const PROBE_ORDER: [ComponentKind; 4] = [
        ComponentKind::DataMapper,
        ComponentKind::IntegrationProcedure,
        ComponentKind::FlexCard,
        ComponentKind::OmniScript,
    ];

    /// Stable position of this kind in [`ComponentKind::ALL`]
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::DataMapper => 0,
            Self::OmniScript => 1,
            Self::IntegrationProcedure => 2,
            Self::FlexCard => 3,
        }
    }

    /// Human-readable label used in reports and warnings
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DataMapper => "DataMapper",
            Self::OmniScript => "OmniScript",
            Self::IntegrationProcedure => "IntegrationProcedure",
            Self::FlexCard => "FlexCard",
        }
    }

    /// Whether several versions of one component may coexist after migration
    #[inline]
    #[must_use]
    pub const fn supports_versions(self) -> bool {
        !matches!(self, Self::DataMapper)
    }

    /// Number of parts in this kind's composite name key, if it has one
    #[inline]
    #[must_use]
    pub const fn composite_parts(self) -> Option<usize> {
        match self {
            Self::OmniScript => Some(3),
            Self::IntegrationProcedure => Some(2),
            Self::DataMapper | Self::FlexCard => None,
        }
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComponentKind {
    type Err = ParseKindError;

    /// Accepts the canonical label and the legacy aliases, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "datamapper" | "data_mapper" | "dataraptor" | "dm" | "dr" => Ok(Self::DataMapper),
            "omniscript" | "omni_script" | "os" => Ok(Self::OmniScript),
            "integrationprocedure" | "integration_procedure" | "ip" => {
                Ok(Self::IntegrationProcedure)
            }
            "flexcard" | "flex_card" | "card" | "fc" => Ok(Self::FlexCard),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Unknown component kind label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown component kind: '{0}'")]
pub struct ParseKindError(pub String);
