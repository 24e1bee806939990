//! Name mappings and dependency references
//!
//! Provides [`NameMapping`], the record of one component's original and final
//! name, and [`DependencyReference`], an audit record of where a reference to
//! another component was found.

use crate::kind::ComponentKind;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Original-to-final name assignment for one source record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameMapping {
    /// Name as found in the legacy record
    pub original_name: String,

    /// Name the migrated component will carry
    pub final_name: String,

    /// Kind namespace the mapping lives in
    pub kind: ComponentKind,

    /// Id of the source record
    pub record_id: String,

    /// Id of the migrated record, once written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_id: Option<String>,
}

impl NameMapping {
    /// Create new mapping
    #[inline]
    #[must_use]
    pub fn new(
        original_name: impl Into<String>,
        final_name: impl Into<String>,
        kind: ComponentKind,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            final_name: final_name.into(),
            kind,
            record_id: record_id.into(),
            migrated_id: None,
        }
    }

    /// With migrated record id
    #[inline]
    #[must_use]
    pub fn with_migrated_id(mut self, id: impl Into<String>) -> Self {
        self.migrated_id = Some(id.into());
        self
    }

    /// Whether migration changes the name
    #[inline]
    #[must_use]
    pub fn is_rename(&self) -> bool {
        self.original_name != self.final_name
    }

    /// Change line: `"<original>" → "<final>"`, kind-prefixed when `with_kind`
    #[must_use]
    pub fn change_line(&self, with_kind: bool) -> String {
        if with_kind {
            format!(
                "{}: \"{}\" → \"{}\"",
                self.kind, self.original_name, self.final_name
            )
        } else {
            format!("\"{}\" → \"{}\"", self.original_name, self.final_name)
        }
    }
}

impl Display for NameMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.change_line(true))
    }
}

/// Location of a cross-component reference inside a payload
///
/// Diagnostic only; the rewriter does not consume these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyReference {
    /// Record holding the reference
    pub parent_id: String,

    /// Kind of the record holding the reference
    pub parent_kind: ComponentKind,

    /// JSON pointer to the referencing string
    pub field_path: String,

    /// Referenced component, by original name
    pub referenced_original_name: String,

    /// Kind the referenced name was resolved under
    pub referenced_kind: ComponentKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_detection() {
        let same = NameMapping::new("Card", "Card", ComponentKind::FlexCard, "fc1");
        let renamed = NameMapping::new("My Card", "MyCard", ComponentKind::FlexCard, "fc2");
        assert!(!same.is_rename());
        assert!(renamed.is_rename());
    }

    #[test]
    fn change_line_formats() {
        let m = NameMapping::new("Customer-Data Loader", "CustomerDataLoader", ComponentKind::DataMapper, "dr1");
        assert_eq!(m.change_line(false), "\"Customer-Data Loader\" → \"CustomerDataLoader\"");
        assert_eq!(
            m.change_line(true),
            "DataMapper: \"Customer-Data Loader\" → \"CustomerDataLoader\""
        );
        assert_eq!(m.to_string(), m.change_line(true));
    }

    #[test]
    fn migrated_id_skipped_when_absent() {
        let m = NameMapping::new("A", "A", ComponentKind::OmniScript, "os1");
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("migrated_id").is_none());

        let m = m.with_migrated_id("new1");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["migrated_id"], "new1");
    }
}
