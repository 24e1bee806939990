//! Reference scanning
//!
//! Provides [`ReferenceScanner`] for locating cross-component references in a
//! payload without rewriting it. Used for audit reports and for spotting
//! references to components that will not be migrated.

use oms_naming::{ComponentKind, DependencyReference};
use serde_json::Value;

use crate::registry::NameRegistry;
use crate::rewrite::ReferenceRewriter;

/// A string leaf naming an excluded component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedReference {
    /// JSON pointer to the leaf
    pub field_path: String,

    /// The excluded name
    pub name: String,
}

/// Read-only scanner bound to a populated registry
#[derive(Debug, Clone, Copy)]
pub struct ReferenceScanner<'r> {
    registry: &'r NameRegistry,
}

impl<'r> ReferenceScanner<'r> {
    /// Create scanner over `registry`
    #[inline]
    #[must_use]
    pub fn new(registry: &'r NameRegistry) -> Self {
        Self { registry }
    }

    /// Every registered reference inside `value`, in document order
    ///
    /// Kinds are resolved with the rewriter's probe order. Excluded names
    /// are reported too; they are still dependencies.
    #[must_use]
    pub fn scan(
        &self,
        parent_id: &str,
        parent_kind: ComponentKind,
        value: &Value,
    ) -> Vec<DependencyReference> {
        let rewriter = ReferenceRewriter::new(self.registry);
        let mut found = Vec::new();
        walk_strings(value, |path, s| {
            if let Some((kind, _)) = rewriter.resolve(s) {
                found.push(DependencyReference {
                    parent_id: parent_id.to_string(),
                    parent_kind,
                    field_path: path.to_string(),
                    referenced_original_name: s.to_string(),
                    referenced_kind: kind,
                });
            }
        });
        found
    }

    /// String leaves equal to an excluded name, in document order
    #[must_use]
    pub fn excluded_references(&self, value: &Value) -> Vec<ExcludedReference> {
        let mut found = Vec::new();
        walk_strings(value, |path, s| {
            if self.registry.is_excluded(s) {
                found.push(ExcludedReference {
                    field_path: path.to_string(),
                    name: s.to_string(),
                });
            }
        });
        found
    }
}

/// Visit every string leaf with its JSON pointer, depth-first, document order
fn walk_strings<'v>(value: &'v Value, mut visit: impl FnMut(&str, &'v str)) {
    let mut stack: Vec<(String, &'v Value)> = vec![(String::new(), value)];

    while let Some((path, node)) = stack.pop() {
        match node {
            Value::String(s) => visit(&path, s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate().rev() {
                    stack.push((format!("{path}/{i}"), item));
                }
            }
            Value::Object(entries) => {
                for (key, item) in entries.iter().rev() {
                    stack.push((format!("{path}/{}", escape_pointer(key)), item));
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }
}

/// Escape a key as a JSON pointer token (RFC 6901)
fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

impl NameRegistry {
    /// Read-only scanner over this registry
    #[inline]
    #[must_use]
    pub fn scanner(&self) -> ReferenceScanner<'_> {
        ReferenceScanner::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> NameRegistry {
        let mut registry = NameRegistry::new();
        registry.register_name("Load Account", "LoadAccount", ComponentKind::DataMapper, "dr1");
        registry.register_name("Account Card", "AccountCard", ComponentKind::FlexCard, "fc1");
        registry.mark_excluded("Legacy_Flow_English");
        registry
    }

    #[test]
    fn scan_reports_pointer_paths_in_document_order() {
        let registry = registry();
        let payload = json!({
            "steps": [{"bundle": "Load Account"}, {"card": "Account Card"}],
            "a/b": "Load Account",
            "other": "nothing"
        });

        let refs = registry.scanner().scan("os1", ComponentKind::OmniScript, &payload);
        let paths: Vec<&str> = refs.iter().map(|r| r.field_path.as_str()).collect();
        assert_eq!(paths, vec!["/steps/0/bundle", "/steps/1/card", "/a~1b"]);
        assert_eq!(refs[0].referenced_kind, ComponentKind::DataMapper);
        assert_eq!(refs[1].referenced_kind, ComponentKind::FlexCard);
        assert_eq!(refs[1].parent_id, "os1");
        assert_eq!(refs[1].parent_kind, ComponentKind::OmniScript);
    }

    #[test]
    fn excluded_references_found() {
        let registry = registry();
        let payload = json!({"child": {"name": "Legacy_Flow_English"}, "x": ["Legacy_Flow_English", 1]});

        let excluded = registry.scanner().excluded_references(&payload);
        assert_eq!(
            excluded,
            vec![
                ExcludedReference {
                    field_path: "/child/name".to_string(),
                    name: "Legacy_Flow_English".to_string(),
                },
                ExcludedReference {
                    field_path: "/x/0".to_string(),
                    name: "Legacy_Flow_English".to_string(),
                },
            ]
        );
    }

    #[test]
    fn root_string_has_empty_pointer() {
        let registry = registry();
        let refs = registry.scanner().scan("fc9", ComponentKind::FlexCard, &json!("Account Card"));
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].field_path, "");
    }

    #[test]
    fn escape_pointer_tokens() {
        assert_eq!(escape_pointer("a~b/c"), "a~0b~1c");
    }
}
