//! Source and migrated records
//!
//! Provides [`SourceRecord`], a legacy component as fetched from the store,
//! and [`MigratedRecord`], what a run writes back.

use oms_collision::VersionedRecord;
use oms_naming::{clean, clean_strict, join_key, ComponentKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MigrateError;

/// Composite name parts of OmniScripts and IntegrationProcedures
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OmniKey {
    /// Type part
    #[serde(rename = "type")]
    pub component_type: String,

    /// Subtype part
    pub subtype: String,

    /// Language part; OmniScripts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl OmniKey {
    /// Create key from parts
    #[inline]
    #[must_use]
    pub fn new(component_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            subtype: subtype.into(),
            language: None,
        }
    }

    /// With language part
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Parts joined into the raw composite key
    #[must_use]
    pub fn joined(&self) -> String {
        match &self.language {
            Some(language) => join_key(&[&self.component_type, &self.subtype, language]),
            None => join_key(&[&self.component_type, &self.subtype]),
        }
    }
}

/// Legacy component as fetched from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Store id
    pub id: String,

    /// Component kind
    pub kind: ComponentKind,

    /// Display name
    pub name: String,

    /// Version number
    #[serde(default = "default_version")]
    pub version: u32,

    /// Composite key parts, for kinds that have them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<OmniKey>,

    /// Explicitly not eligible for migration
    #[serde(default)]
    pub excluded: bool,

    /// Parsed configuration / definition tree
    #[serde(default)]
    pub payload: Value,
}

/// Decode JSON with no nesting limit
///
/// Deep documents are parsed on a growing stack instead of failing at
/// serde_json's default depth of 128.
pub(crate) fn decode_json<T: DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(json);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

fn default_version() -> u32 {
    1
}

impl SourceRecord {
    /// Create record with an empty payload
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            version: default_version(),
            key: None,
            excluded: false,
            payload: Value::Null,
        }
    }

    /// With version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// With composite key parts
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: OmniKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Marked as excluded
    #[inline]
    #[must_use]
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// With parsed payload
    #[inline]
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// With payload decoded from its serialized JSON form
    ///
    /// # Errors
    /// Returns error if `json` is not valid JSON
    pub fn with_serialized_payload(mut self, json: &str) -> Result<Self, MigrateError> {
        self.payload = decode_json(json).map_err(|e| MigrateError::invalid_payload(&self.id, e))?;
        Ok(self)
    }

    /// Name the registry knows this record by
    ///
    /// The composite key for kinds that have one, the display name otherwise.
    #[must_use]
    pub fn raw_name(&self) -> String {
        match (&self.key, self.kind.composite_parts()) {
            (Some(key), Some(_)) => key.joined(),
            _ => self.name.clone(),
        }
    }

    /// Cleaned identity, before any version suffix
    ///
    /// Composite keys are cleaned per part: OmniScript type and subtype with
    /// the default cleaner and the language kept verbatim, IntegrationProcedure
    /// parts strictly.
    #[must_use]
    pub fn base_name(&self) -> String {
        match (&self.key, self.kind) {
            (Some(key), ComponentKind::OmniScript) => {
                let os_type = clean(&key.component_type);
                let subtype = clean(&key.subtype);
                match &key.language {
                    Some(language) => join_key(&[os_type.as_str(), subtype.as_str(), language.as_str()]),
                    None => join_key(&[os_type, subtype]),
                }
            }
            (Some(key), ComponentKind::IntegrationProcedure) => {
                join_key(&[clean_strict(&key.component_type), clean_strict(&key.subtype)])
            }
            _ => clean(&self.name),
        }
    }

    /// Resolver input for this record
    #[must_use]
    pub fn to_versioned(&self) -> VersionedRecord {
        VersionedRecord::new(&self.id, self.raw_name(), self.version).with_base_name(self.base_name())
    }
}

/// Migrated component written back to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigratedRecord {
    /// Id of the legacy record it came from
    pub source_id: String,

    /// Component kind
    pub kind: ComponentKind,

    /// Final name
    pub name: String,

    /// Version number
    pub version: u32,

    /// Payload with every reference rewritten
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omniscript_raw_and_base_names() {
        let record = SourceRecord::new("os1", ComponentKind::OmniScript, "Account View")
            .with_key(OmniKey::new("Account", "Details-View").with_language("English"));

        assert_eq!(record.raw_name(), "Account_Details-View_English");
        assert_eq!(record.base_name(), "Account_DetailsView_English");
    }

    #[test]
    fn integration_procedure_parts_cleaned_strictly() {
        let record = SourceRecord::new("ip1", ComponentKind::IntegrationProcedure, "ignored")
            .with_key(OmniKey::new("Get_Acct", "Info Call"));

        assert_eq!(record.raw_name(), "Get_Acct_Info Call");
        assert_eq!(record.base_name(), "GetAcct_InfoCall");
    }

    #[test]
    fn plain_kinds_use_display_name() {
        let record = SourceRecord::new("fc1", ComponentKind::FlexCard, "Account Card")
            .with_key(OmniKey::new("x", "y"));
        assert_eq!(record.raw_name(), "Account Card");
        assert_eq!(record.base_name(), "AccountCard");
    }

    #[test]
    fn to_versioned_carries_base() {
        let record = SourceRecord::new("ip1", ComponentKind::IntegrationProcedure, "n")
            .with_key(OmniKey::new("Get_Acct", "Info"))
            .with_version(3);
        let versioned = record.to_versioned();
        assert_eq!(versioned.raw_name, "Get_Acct_Info");
        assert_eq!(versioned.base(), "GetAcct_Info");
        assert_eq!(versioned.version, 3);
    }

    #[test]
    fn serialized_payload_decoding() {
        let record = SourceRecord::new("dr1", ComponentKind::DataMapper, "Load")
            .with_serialized_payload(r#"{"bundle": "X"}"#)
            .unwrap();
        assert_eq!(record.payload, json!({"bundle": "X"}));

        let err = SourceRecord::new("dr2", ComponentKind::DataMapper, "Load")
            .with_serialized_payload("{nope");
        assert!(matches!(err, Err(MigrateError::InvalidPayload { .. })));
    }

    fn nested(depth: usize) -> String {
        format!("{}\"x\"{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn deep_serialized_payload_accepted() {
        let record = SourceRecord::new("dr1", ComponentKind::DataMapper, "Load")
            .with_serialized_payload(&nested(300))
            .unwrap();

        let mut depth = 0;
        let mut node = &record.payload;
        while let Value::Array(items) = node {
            depth += 1;
            node = &items[0];
        }
        assert_eq!(depth, 300);
        assert_eq!(node, &json!("x"));
    }

    #[test]
    fn trailing_garbage_rejected() {
        let err = SourceRecord::new("dr1", ComponentKind::DataMapper, "Load")
            .with_serialized_payload(r#"{"a": 1} x"#);
        assert!(matches!(err, Err(MigrateError::InvalidPayload { .. })));
    }

    #[test]
    fn deserializes_with_defaults() {
        let record: SourceRecord = serde_json::from_value(json!({
            "id": "os1",
            "kind": "OmniScript",
            "name": "Flow",
            "key": {"type": "Account", "subtype": "View", "language": "English"}
        }))
        .unwrap();

        assert_eq!(record.version, 1);
        assert!(!record.excluded);
        assert_eq!(record.payload, Value::Null);
        assert_eq!(record.raw_name(), "Account_View_English");
    }
}
