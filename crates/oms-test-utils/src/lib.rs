//! Testing utilities for OMS workspace
//!
//! Shared record builders and fixture snapshots.

#![allow(missing_docs)]

use oms_migrate::{MemoryStore, OmniKey, SourceRecord};
use oms_naming::ComponentKind;
use serde_json::{json, Value};

pub fn data_mapper(id: &str, name: &str) -> SourceRecord {
    SourceRecord::new(id, ComponentKind::DataMapper, name)
}

pub fn flex_card(id: &str, name: &str, version: u32) -> SourceRecord {
    SourceRecord::new(id, ComponentKind::FlexCard, name).with_version(version)
}

pub fn omniscript(id: &str, os_type: &str, subtype: &str, language: &str, version: u32) -> SourceRecord {
    SourceRecord::new(id, ComponentKind::OmniScript, format!("{os_type} {subtype}"))
        .with_key(OmniKey::new(os_type, subtype).with_language(language))
        .with_version(version)
}

pub fn integration_procedure(id: &str, ip_type: &str, subtype: &str, version: u32) -> SourceRecord {
    SourceRecord::new(id, ComponentKind::IntegrationProcedure, format!("{ip_type} {subtype}"))
        .with_key(OmniKey::new(ip_type, subtype))
        .with_version(version)
}

/// FlexCard definition pointing at a data source and child cards
pub fn card_definition(data_source: &str, children: &[&str]) -> Value {
    json!({
        "dataSource": {
            "type": "IntegrationProcedures",
            "value": {"ipMethod": data_source, "vlocityAsync": false}
        },
        "states": [{
            "name": "Active",
            "childCards": children,
            "omniscripts": []
        }]
    })
}

/// Small org snapshot exercising every kind and cross reference
///
/// - `dr1` "Customer-Data Loader" is referenced by `ip1` and `os1`
/// - `ip1` "Get_Account Info" backs the FlexCard `fc1`
/// - `fc1` "Account Card" embeds `fc2` "Contact Card"
/// - `os2` is excluded and referenced by `fc2`
pub fn sample_store() -> MemoryStore {
    MemoryStore::new(vec![
        data_mapper("dr1", "Customer-Data Loader").with_payload(json!({
            "inputType": "JSON",
            "mappings": [{"from": "Account:Name", "to": "name"}]
        })),
        integration_procedure("ip1", "Get", "Account Info", 1).with_payload(json!({
            "steps": [
                {"type": "DataRaptor Extract Action", "bundle": "Customer-Data Loader"}
            ]
        })),
        omniscript("os1", "Account", "Onboarding", "English", 2).with_payload(json!({
            "children": [
                {"type": "DataRaptor Turbo Action", "propSetMap": {"bundle": "Customer-Data Loader"}},
                {"type": "Integration Procedure Action", "propSetMap": {"integrationProcedureKey": "Get_Account Info"}}
            ]
        })),
        omniscript("os2", "Legacy", "Wizard", "English", 1).excluded(),
        flex_card("fc1", "Account Card", 1)
            .with_payload(card_definition("Get_Account Info", &["Contact Card"])),
        flex_card("fc2", "Contact Card", 1).with_payload(json!({
            "states": [{"omniscripts": [{"type": "Legacy", "subtype": "Wizard", "ref": "Legacy_Wizard_English"}]}]
        })),
    ])
}

/// JSON snapshot of [`sample_store`] records
pub fn sample_snapshot() -> String {
    Value::Array(
        sample_store()
            .records()
            .iter()
            .map(|r| serde_json::to_value(r).unwrap())
            .collect(),
    )
    .to_string()
}
