//! # Collection Filter
//!
//! Narrows an in-memory collection with ANDed attribute-value predicates.
//!
//! The first element fixes the resource type. Predicate keys that type does not
//! declare (as identifier or attribute, by wire or property name) are dropped before
//! evaluation, so an unknown filter never fails a request. Collections are expected to
//! be homogeneous: a later element of another type fails with
//! [`DocumentError::UnknownResource`] while predicates are active.

use crate::error::{DocumentError, Result};
use crate::extract::{value_as_filter_string, FieldExtractor};
use crate::query::{FilterPredicates, QuerySpec};
use crate::registry::{FieldDescriptor, FieldKind, ResolvedResource, ResourceRef, ResourceRegistry};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

#[derive(Clone, Copy)]
pub struct CollectionFilter<'a> {
    registry: &'a ResourceRegistry,
}

impl<'a> CollectionFilter<'a> {
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Keeps the elements matching every applicable predicate, in input order.
    #[instrument(skip_all, fields(count = collection.len(), predicates = predicates.len()))]
    pub fn filter(&self, collection: Vec<ResourceRef>, predicates: &FilterPredicates) -> Result<Vec<ResourceRef>> {
        if predicates.is_empty() {
            return Ok(collection);
        }
        let Some(sample) = collection.first() else {
            return Ok(collection);
        };

        let wire_type = self.registry.resolve_wire_type_name(sample.as_ref())?.to_string();
        let descriptor = self.registry.lookup_by_wire_name(&wire_type)?;
        let active: Vec<(&FieldDescriptor, &BTreeSet<String>)> = predicates
            .iter()
            .filter_map(|(name, accepted)| match descriptor.filterable_field(name) {
                Some(field) => Some((field, accepted)),
                None => {
                    debug!(wire_type = descriptor.wire_type(), field = name, "Dropping unknown filter field");
                    None
                }
            })
            .collect();
        if active.is_empty() {
            return Ok(collection);
        }

        let extractor = FieldExtractor::new(self.registry);
        let total = collection.len();
        let mut kept = Vec::with_capacity(total);
        for object in collection {
            let resolved = self.registry.resolve(object.as_ref())?;
            if resolved.descriptor.wire_type() != descriptor.wire_type() {
                return Err(DocumentError::UnknownResource(format!(
                    "collection of `{}` also holds `{}`",
                    descriptor.wire_type(),
                    resolved.descriptor.wire_type()
                )));
            }
            if matches_all(&extractor, &resolved, &active)? {
                kept.push(object);
            }
        }

        debug!(kept = kept.len(), total, "Filtered collection");
        Ok(kept)
    }

    /// Applies the predicates `spec` holds for the sampled element's wire type.
    pub fn filter_by_spec(&self, collection: Vec<ResourceRef>, spec: &QuerySpec) -> Result<Vec<ResourceRef>> {
        let Some(sample) = collection.first() else {
            return Ok(collection);
        };
        let wire_type = self.registry.resolve_wire_type_name(sample.as_ref())?.to_string();
        match spec.filters(&wire_type) {
            Some(predicates) => self.filter(collection, predicates),
            None => Ok(collection),
        }
    }
}

fn matches_all(
    extractor: &FieldExtractor<'_>,
    resolved: &ResolvedResource<'_>,
    active: &[(&FieldDescriptor, &BTreeSet<String>)],
) -> Result<bool> {
    for (field, accepted) in active {
        let value = match field.kind() {
            FieldKind::Identifier => extractor.identifier(resolved)?.map_or(Value::Null, Value::String),
            _ => extractor.attribute(resolved, field)?,
        };
        let matched = value_as_filter_string(&value).is_some_and(|v| accepted.contains(&v));
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_resource;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Ticket {
        id: u32,
        status: String,
        priority: Option<u8>,
    }
    impl_resource!(Ticket);

    #[derive(Debug)]
    struct Label {
        id: u32,
    }
    impl_resource!(Label);

    fn registry() -> ResourceRegistry {
        let mut builder = ResourceRegistry::builder("http://localhost");
        builder
            .register::<Ticket>(
                "tickets",
                vec![
                    FieldDescriptor::identifier("id", |t: &Ticket| t.id),
                    FieldDescriptor::attribute("status", |t: &Ticket| t.status.clone()),
                    FieldDescriptor::attribute("priority", |t: &Ticket| t.priority),
                ],
            )
            .unwrap()
            .register::<Label>("labels", vec![FieldDescriptor::identifier("id", |l: &Label| l.id)])
            .unwrap();
        builder.build().unwrap()
    }

    fn ticket(id: u32, status: &str, priority: Option<u8>) -> ResourceRef {
        Arc::new(Ticket {
            id,
            status: status.into(),
            priority,
        })
    }

    fn ids(collection: &[ResourceRef]) -> Vec<u32> {
        collection
            .iter()
            .map(|r| r.as_any().downcast_ref::<Ticket>().unwrap().id)
            .collect()
    }

    fn tickets() -> Vec<ResourceRef> {
        vec![
            ticket(1, "open", Some(1)),
            ticket(2, "closed", Some(2)),
            ticket(3, "open", None),
            ticket(4, "blocked", Some(1)),
        ]
    }

    #[test]
    fn test_predicates_are_anded_and_order_is_kept() {
        let registry = registry();
        let predicates = FilterPredicates::new()
            .with("status", ["open", "blocked"])
            .with("priority", ["1"]);
        let kept = CollectionFilter::new(&registry).filter(tickets(), &predicates).unwrap();
        assert_eq!(ids(&kept), vec![1, 4]);
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let registry = registry();
        let predicates = FilterPredicates::new()
            .with("colour", ["red"])
            .with("status", ["closed"]);
        let kept = CollectionFilter::new(&registry).filter(tickets(), &predicates).unwrap();
        assert_eq!(ids(&kept), vec![2]);

        let only_unknown = FilterPredicates::new().with("colour", ["red"]);
        let kept = CollectionFilter::new(&registry).filter(tickets(), &only_unknown).unwrap();
        assert_eq!(ids(&kept), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_identifier_is_filterable() {
        let registry = registry();
        let predicates = FilterPredicates::new().with("id", ["3", "4"]);
        let kept = CollectionFilter::new(&registry).filter(tickets(), &predicates).unwrap();
        assert_eq!(ids(&kept), vec![3, 4]);
    }

    #[test]
    fn test_null_never_matches() {
        let registry = registry();
        let predicates = FilterPredicates::new().with("priority", ["null", ""]);
        let kept = CollectionFilter::new(&registry).filter(tickets(), &predicates).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_empty_collection_is_a_no_op() {
        let registry = registry();
        let predicates = FilterPredicates::new().with("status", ["open"]);
        let kept = CollectionFilter::new(&registry).filter(Vec::new(), &predicates).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_heterogeneous_collection_fails_fast() {
        let registry = registry();
        let mut collection = tickets();
        collection.push(Arc::new(Label { id: 9 }));
        let predicates = FilterPredicates::new().with("status", ["open"]);
        let err = CollectionFilter::new(&registry).filter(collection, &predicates).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownResource(_)));
    }

    #[test]
    fn test_filter_by_spec_uses_sampled_type() {
        let registry = registry();
        let spec = QuerySpec::builder()
            .filter("tickets", "status", ["open"])
            .filter("labels", "id", ["1"])
            .build();
        let kept = CollectionFilter::new(&registry).filter_by_spec(tickets(), &spec).unwrap();
        assert_eq!(ids(&kept), vec![1, 3]);
    }
}
