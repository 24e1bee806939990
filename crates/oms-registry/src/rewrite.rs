//! Cross-reference rewriting
//!
//! Provides [`ReferenceRewriter`], which rebuilds an arbitrary JSON tree with
//! every string leaf that exactly equals a registered original name replaced
//! by its final name.
//!
//! The walk uses an explicit work stack instead of recursion, so nesting depth
//! is bounded by heap, not by the thread's call stack.

use oms_naming::ComponentKind;
use serde_json::{map, Map, Value};
use std::slice;

use crate::registry::NameRegistry;

/// Read-only rewriter bound to a populated registry
///
/// Cheap to construct and `Copy`; share one registry across threads and
/// build a rewriter per worker.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRewriter<'r> {
    registry: &'r NameRegistry,
}

/// Partially rebuilt container on the work stack
enum Frame<'v> {
    Array {
        items: slice::Iter<'v, Value>,
        out: Vec<Value>,
    },
    Object {
        entries: map::Iter<'v>,
        key: Option<String>,
        out: Map<String, Value>,
    },
}

impl Frame<'_> {
    fn close(self) -> Value {
        match self {
            Self::Array { out, .. } => Value::Array(out),
            Self::Object { out, .. } => Value::Object(out),
        }
    }
}

impl<'r> ReferenceRewriter<'r> {
    /// Create rewriter over `registry`
    #[inline]
    #[must_use]
    pub fn new(registry: &'r NameRegistry) -> Self {
        Self { registry }
    }

    /// Kind and final name a bare string resolves to
    ///
    /// Kinds are probed in [`ComponentKind::PROBE_ORDER`]; the first hit wins.
    /// Exclusion is not considered here.
    #[must_use]
    pub fn resolve(&self, s: &str) -> Option<(ComponentKind, &'r str)> {
        ComponentKind::PROBE_ORDER
            .iter()
            .find_map(|kind| self.registry.final_name(*kind, s).map(|found| (*kind, found)))
    }

    /// Replacement for a string leaf, if any
    ///
    /// Excluded names and unregistered strings yield `None`. Unregistered
    /// strings are never cleaned.
    #[inline]
    #[must_use]
    pub fn substitute(&self, s: &str) -> Option<&'r str> {
        if self.registry.is_excluded(s) {
            return None;
        }
        self.resolve(s).map(|(_, found)| found)
    }

    /// Rewrite every reference inside `value`
    ///
    /// `value` is left untouched; the result is a new tree with identical
    /// shape, key order and non-string leaves.
    #[must_use]
    pub fn rewrite(&self, value: &Value) -> Value {
        self.rewrite_counted(value).0
    }

    /// Rewrite and report how many string leaves were substituted
    #[must_use]
    pub fn rewrite_counted(&self, value: &Value) -> (Value, usize) {
        let mut substitutions = 0;
        let mut stack: Vec<Frame<'_>> = Vec::new();
        let mut completed = self.open(value, &mut stack, &mut substitutions);

        loop {
            if let Some(child) = completed.take() {
                match stack.last_mut() {
                    None => return (child, substitutions),
                    Some(Frame::Array { out, .. }) => out.push(child),
                    Some(Frame::Object { key, out, .. }) => {
                        if let Some(key) = key.take() {
                            out.insert(key, child);
                        }
                    }
                }
            }

            let next = match stack.last_mut() {
                Some(Frame::Array { items, .. }) => items.next(),
                Some(Frame::Object { entries, key, .. }) => entries.next().map(|(k, v)| {
                    *key = Some(k.clone());
                    v
                }),
                None => None,
            };

            match next {
                Some(child) => completed = self.open(child, &mut stack, &mut substitutions),
                None => match stack.pop() {
                    Some(frame) => completed = Some(frame.close()),
                    None => return (Value::Null, substitutions),
                },
            }
        }
    }

    /// Leaves are finished immediately; containers push a frame
    fn open<'v>(
        &self,
        value: &'v Value,
        stack: &mut Vec<Frame<'v>>,
        substitutions: &mut usize,
    ) -> Option<Value> {
        match value {
            Value::String(s) => Some(match self.substitute(s) {
                Some(found) => {
                    *substitutions += 1;
                    Value::String(found.to_string())
                }
                None => value.clone(),
            }),
            Value::Array(items) => {
                stack.push(Frame::Array {
                    items: items.iter(),
                    out: Vec::with_capacity(items.len()),
                });
                None
            }
            Value::Object(entries) => {
                stack.push(Frame::Object {
                    entries: entries.iter(),
                    key: None,
                    out: Map::with_capacity(entries.len()),
                });
                None
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Some(value.clone()),
        }
    }
}

impl NameRegistry {
    /// Rewrite references inside `value` against this registry
    #[inline]
    #[must_use]
    pub fn rewrite(&self, value: &Value) -> Value {
        self.rewriter().rewrite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn registry() -> NameRegistry {
        let mut registry = NameRegistry::new();
        registry.register_name("Customer-Data Loader", "CustomerDataLoader", ComponentKind::DataMapper, "dr1");
        registry.register_name("Account Card", "AccountCard", ComponentKind::FlexCard, "fc1");
        registry.register_name("Get_Account-Info", "Get_AccountInfo", ComponentKind::IntegrationProcedure, "ip1");
        registry.register_name("Account_View_English", "Account_View2_English", ComponentKind::OmniScript, "os1");
        registry
    }

    #[test]
    fn rewrites_nested_bundle_reference() {
        let registry = registry();
        let input = json!({"dataSource": {"bundle": "Customer-Data Loader"}});
        assert_eq!(
            registry.rewrite(&input),
            json!({"dataSource": {"bundle": "CustomerDataLoader"}})
        );
    }

    #[test]
    fn rewrites_every_occurrence_in_deep_structure() {
        let registry = registry();
        let input = json!([
            {"steps": [{"bundle": "Customer-Data Loader"}, {"label": "Customer-Data Loader!"}]},
            {"steps": [["Customer-Data Loader", 3, null, true]]}
        ]);
        let (output, count) = registry.rewriter().rewrite_counted(&input);

        assert_eq!(
            output,
            json!([
                {"steps": [{"bundle": "CustomerDataLoader"}, {"label": "Customer-Data Loader!"}]},
                {"steps": [["CustomerDataLoader", 3, null, true]]}
            ])
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn unregistered_strings_are_not_cleaned() {
        let registry = registry();
        let input = json!({"k": "Some Label!", "n": 1.5});
        assert_eq!(registry.rewrite(&input), input);
    }

    #[test]
    fn keys_are_never_rewritten_and_order_kept() {
        let registry = registry();
        let input = json!({"Customer-Data Loader": "Account Card", "a": 1, "b": 2});
        let output = registry.rewrite(&input);

        let keys: Vec<&String> = output.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Customer-Data Loader", "a", "b"]);
        assert_eq!(output["Customer-Data Loader"], json!("AccountCard"));
    }

    #[test]
    fn probe_order_prefers_data_mapper() {
        let mut registry = NameRegistry::new();
        registry.register_name("Shared", "SharedCard", ComponentKind::FlexCard, "fc1");
        registry.register_name("Shared", "SharedIP", ComponentKind::IntegrationProcedure, "ip1");
        registry.register_name("Shared", "SharedDM", ComponentKind::DataMapper, "dr1");

        assert_eq!(registry.rewrite(&json!("Shared")), json!("SharedDM"));
        assert_eq!(
            registry.rewriter().resolve("Shared"),
            Some((ComponentKind::DataMapper, "SharedDM"))
        );
    }

    #[test]
    fn excluded_names_pass_through() {
        let mut registry = registry();
        registry.mark_excluded("Account Card");
        assert_eq!(registry.rewrite(&json!({"card": "Account Card"})), json!({"card": "Account Card"}));
    }

    #[test]
    fn omniscript_requires_exact_composite_key() {
        let registry = registry();
        let input = json!({"type": "Account", "subType": "View", "full": "Account_View_English"});
        assert_eq!(
            registry.rewrite(&input),
            json!({"type": "Account", "subType": "View", "full": "Account_View2_English"})
        );
    }

    #[test]
    fn scalars_returned_unchanged() {
        let registry = registry();
        for value in [json!(null), json!(true), json!(42), json!(-0.5), json!([]), json!({})] {
            assert_eq!(registry.rewrite(&value), value);
        }
    }

    #[test]
    fn tolerates_deep_nesting() {
        let registry = registry();
        let mut value = json!("Account Card");
        for depth in 0..2_000 {
            value = if depth % 2 == 0 { json!([value]) } else { json!({"n": value}) };
        }

        let output = registry.rewrite(&value);
        let mut leaf = &output;
        loop {
            leaf = match leaf {
                Value::Array(items) => &items[0],
                Value::Object(entries) => &entries["n"],
                _ => break,
            };
        }
        assert_eq!(*leaf, json!("AccountCard"));

        // iterative teardown; the derived Drop would recurse 2000 levels
        let mut pending = vec![output, value];
        while let Some(v) = pending.pop() {
            match v {
                Value::Array(items) => pending.extend(items),
                Value::Object(entries) => pending.extend(entries.into_iter().map(|(_, v)| v)),
                _ => {}
            }
        }
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            prop_oneof![
                Just("Customer-Data Loader".to_string()),
                Just("Account Card".to_string()),
                "[a-zA-Z _-]{0,12}",
            ]
            .prop_map(Value::String),
        ];
        leaf.prop_recursive(6, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..6)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_rewrite_does_not_mutate_input(tree in arb_json()) {
            let registry = registry();
            let snapshot = tree.clone();
            let _ = registry.rewrite(&tree);
            prop_assert_eq!(tree, snapshot);
        }

        #[test]
        fn prop_unknown_strings_pass_through(s in "[a-z ]{0,16}") {
            let registry = registry();
            let input = json!({"k": s.clone()});
            prop_assert_eq!(&registry.rewrite(&input)["k"], &json!(s));
        }

        #[test]
        fn prop_rewrite_is_idempotent_on_clean_targets(tree in arb_json()) {
            let registry = registry();
            let once = registry.rewrite(&tree);
            prop_assert_eq!(registry.rewrite(&once), once.clone());
        }
    }
}
