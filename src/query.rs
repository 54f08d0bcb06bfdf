//! # Query Specification
//!
//! Structured, already-parsed request parameters keyed per wire type:
//! sparse fieldsets, relationship inclusion requests and filter predicates.
//!
//! A [`QuerySpec`] is built once per request through [`QuerySpecBuilder`] (or
//! deserialized from whatever the external parser produces) and is read-only
//! afterwards. It is never cached across requests.
//!
//! ```rust
//! use resource_document::query::QuerySpec;
//!
//! let spec = QuerySpec::builder()
//!     .fields("tasks", ["name", "project"])
//!     .include("tasks", ["project"])
//!     .filter("tasks", "status", ["open", "blocked"])
//!     .build();
//!
//! assert!(spec.selects("tasks", "name"));
//! assert!(!spec.selects("tasks", "description"));
//! assert!(spec.selects("projects", "description"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Filter predicates of one wire type: field name → accepted string values.
///
/// An element matches when, for every field, its value is one of the accepted values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPredicates(BTreeMap<String, BTreeSet<String>>);

impl FilterPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(field.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn get(&self, field: &str) -> Option<&BTreeSet<String>> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for FilterPredicates {
    fn from(map: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self(map)
    }
}

/// Everything requested for a single wire type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeQuery {
    /// Sparse fieldset. `None` selects every field.
    pub fields: Option<BTreeSet<String>>,
    /// Relationships whose targets go into `included`. `None` requests none.
    pub includes: Option<BTreeSet<String>>,
    pub filters: FilterPredicates,
}

/// Per-request query specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySpec {
    types: BTreeMap<String, TypeQuery>,
}

impl QuerySpec {
    /// A specification without any restriction.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QuerySpecBuilder {
        QuerySpecBuilder::default()
    }

    pub fn for_type(&self, wire_type: &str) -> Option<&TypeQuery> {
        self.types.get(wire_type)
    }

    pub fn fields(&self, wire_type: &str) -> Option<&BTreeSet<String>> {
        self.for_type(wire_type)
            .and_then(|q| q.fields.as_ref())
            .filter(|fields| !fields.is_empty())
    }

    pub fn includes(&self, wire_type: &str) -> Option<&BTreeSet<String>> {
        self.for_type(wire_type).and_then(|q| q.includes.as_ref())
    }

    pub fn filters(&self, wire_type: &str) -> Option<&FilterPredicates> {
        self.for_type(wire_type)
            .map(|q| &q.filters)
            .filter(|filters| !filters.is_empty())
    }

    /// Whether `field` (a wire name) of `wire_type` belongs in the output.
    ///
    /// An explicit, non-empty fieldset selects exactly its members; otherwise every
    /// field is selected.
    pub fn selects(&self, wire_type: &str, field: &str) -> bool {
        self.fields(wire_type)
            .map_or(true, |fields| fields.contains(field))
    }

    /// Wire types paired with the relationship names requested for inclusion.
    pub fn inclusion_requests(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.types.iter().filter_map(|(wire_type, q)| {
            q.includes
                .as_ref()
                .filter(|names| !names.is_empty())
                .map(|names| (wire_type.as_str(), names))
        })
    }

    pub fn has_inclusions(&self) -> bool {
        self.inclusion_requests().next().is_some()
    }
}

/// Builder for [`QuerySpec`]. The built spec has no mutating API.
#[derive(Debug, Clone, Default)]
pub struct QuerySpecBuilder {
    types: BTreeMap<String, TypeQuery>,
}

impl QuerySpecBuilder {
    fn entry(&mut self, wire_type: impl Into<String>) -> &mut TypeQuery {
        self.types.entry(wire_type.into()).or_default()
    }

    /// Adds names to the sparse fieldset of `wire_type`.
    pub fn fields<I, S>(mut self, wire_type: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry(wire_type)
            .fields
            .get_or_insert_with(BTreeSet::new)
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Requests inclusion of the targets of the named relationships of `wire_type`.
    pub fn include<I, S>(mut self, wire_type: impl Into<String>, relationships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry(wire_type)
            .includes
            .get_or_insert_with(BTreeSet::new)
            .extend(relationships.into_iter().map(Into::into));
        self
    }

    /// Adds a filter predicate. Values of the same field accumulate.
    pub fn filter<I, S>(mut self, wire_type: impl Into<String>, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let query = self.entry(wire_type);
        query.filters = std::mem::take(&mut query.filters).with(field, values);
        self
    }

    pub fn build(self) -> QuerySpec {
        QuerySpec { types: self.types }
    }
}
