//! Name registry
//!
//! Provides [`NameRegistry`], the authoritative table of
//! `(kind, original name) -> final name` for one migration run.
//!
//! # Lifecycle
//! 1. [`NameRegistry::clear`] at the start of a run.
//! 2. Register every record of every kind.
//! 3. Rewrite payloads through [`NameRegistry::rewriter`].
//!
//! Mutation needs `&mut self`, so no rewrite can observe a half-populated
//! table once the registry is shared for phase two.

use indexmap::IndexMap;
use oms_naming::{clean, clean_strict, join_key, ComponentKind, NameMapping};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::rewrite::ReferenceRewriter;

/// Kind-scoped name table with an exclusion set
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    /// Every live mapping, keyed by kind and original name, in insertion order
    mappings: IndexMap<(ComponentKind, String), NameMapping>,

    /// Per-kind fast lookup: original -> final, indexed by [`ComponentKind::index`]
    by_kind: [HashMap<String, String>; 4],

    /// Names that are never rewritten
    excluded: HashSet<String>,
}

impl NameRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping
    ///
    /// Overwrites any prior mapping for the same kind and original name; the
    /// entry keeps its original position in [`NameRegistry::all_mappings`].
    pub fn register(&mut self, mapping: NameMapping) {
        let kind = mapping.kind;
        self.by_kind[kind.index()].insert(mapping.original_name.clone(), mapping.final_name.clone());

        let key = (kind, mapping.original_name.clone());
        let original = mapping.original_name.clone();
        let final_name = mapping.final_name.clone();
        let previous = self.mappings.insert(key, mapping);
        tracing::debug!(
            kind = %kind,
            original = %original,
            final_name = %final_name,
            replaced = previous.as_ref().map(|p| p.final_name.as_str()),
            "mapping registered"
        );
    }

    /// Register from parts
    #[inline]
    pub fn register_name(
        &mut self,
        original_name: impl Into<String>,
        final_name: impl Into<String>,
        kind: ComponentKind,
        record_id: impl Into<String>,
    ) {
        self.register(NameMapping::new(original_name, final_name, kind, record_id));
    }

    /// Final name for `original`, falling back to [`clean`] on miss
    #[must_use]
    pub fn lookup(&self, kind: ComponentKind, original: &str) -> String {
        self.final_name(kind, original)
            .map_or_else(|| clean(original), str::to_string)
    }

    /// Registered final name, without fallback
    #[inline]
    #[must_use]
    pub fn final_name(&self, kind: ComponentKind, original: &str) -> Option<&str> {
        self.by_kind[kind.index()].get(original).map(String::as_str)
    }

    /// Final name of an OmniScript addressed by its three key parts
    ///
    /// On miss each of `type` and `subtype` is cleaned and the language is
    /// appended unchanged.
    #[must_use]
    pub fn lookup_omniscript(&self, os_type: &str, subtype: &str, language: &str) -> String {
        let key = join_key(&[os_type, subtype, language]);
        match self.final_name(ComponentKind::OmniScript, &key) {
            Some(found) => found.to_string(),
            None => join_key(&[clean(os_type).as_str(), clean(subtype).as_str(), language]),
        }
    }

    /// Final name of an IntegrationProcedure addressed by its two key parts
    ///
    /// On miss each part is strictly cleaned before rejoining.
    #[must_use]
    pub fn lookup_integration_procedure(&self, ip_type: &str, subtype: &str) -> String {
        let key = join_key(&[ip_type, subtype]);
        match self.final_name(ComponentKind::IntegrationProcedure, &key) {
            Some(found) => found.to_string(),
            None => join_key(&[clean_strict(ip_type), clean_strict(subtype)]),
        }
    }

    /// Check if a mapping exists
    #[inline]
    #[must_use]
    pub fn has_mapping(&self, kind: ComponentKind, original: &str) -> bool {
        self.by_kind[kind.index()].contains_key(original)
    }

    /// Full mapping for a kind and original name
    #[inline]
    #[must_use]
    pub fn mapping(&self, kind: ComponentKind, original: &str) -> Option<&NameMapping> {
        self.mappings.get(&(kind, original.to_string()))
    }

    /// Record the id of the migrated record
    ///
    /// Returns `false` if no mapping exists.
    pub fn set_migrated_id(
        &mut self,
        kind: ComponentKind,
        original: &str,
        migrated_id: impl Into<String>,
    ) -> bool {
        match self.mappings.get_mut(&(kind, original.to_string())) {
            Some(mapping) => {
                mapping.migrated_id = Some(migrated_id.into());
                true
            }
            None => false,
        }
    }

    /// Mark a name as excluded from rewriting
    pub fn mark_excluded(&mut self, original: impl Into<String>) {
        let original = original.into();
        tracing::debug!(name = %original, "name excluded from rewriting");
        self.excluded.insert(original);
    }

    /// Check if a name is excluded
    #[inline]
    #[must_use]
    pub fn is_excluded(&self, original: &str) -> bool {
        self.excluded.contains(original)
    }

    /// Excluded names, sorted
    #[must_use]
    pub fn excluded_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.excluded.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every mapping, in insertion order
    pub fn all_mappings(&self) -> impl Iterator<Item = &NameMapping> {
        self.mappings.values()
    }

    /// Mappings of one kind, in insertion order
    pub fn mappings_of(&self, kind: ComponentKind) -> impl Iterator<Item = &NameMapping> {
        self.mappings.values().filter(move |m| m.kind == kind)
    }

    /// Change lines for every renaming mapping
    ///
    /// With `Some(kind)` only that kind is listed and lines carry no kind
    /// prefix; with `None` every kind is listed with a prefix.
    #[must_use]
    pub fn change_warnings(&self, kind: Option<ComponentKind>) -> Vec<String> {
        self.mappings
            .values()
            .filter(|m| m.is_rename() && kind.map_or(true, |k| m.kind == k))
            .map(|m| m.change_line(kind.is_none()))
            .collect()
    }

    /// Number of renaming mappings per kind; every kind is present
    #[must_use]
    pub fn change_counts_by_kind(&self) -> BTreeMap<ComponentKind, usize> {
        let mut counts: BTreeMap<ComponentKind, usize> =
            ComponentKind::ALL.iter().map(|k| (*k, 0)).collect();
        for mapping in self.mappings.values().filter(|m| m.is_rename()) {
            *counts.entry(mapping.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Number of live mappings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Check if registry holds no mappings
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Drop every mapping and exclusion
    pub fn clear(&mut self) {
        self.mappings.clear();
        for table in &mut self.by_kind {
            table.clear();
        }
        self.excluded.clear();
    }

    /// Read-only rewriter over this registry
    #[inline]
    #[must_use]
    pub fn rewriter(&self) -> ReferenceRewriter<'_> {
        ReferenceRewriter::new(self)
    }
}
