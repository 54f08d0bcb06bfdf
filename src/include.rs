//! # Inclusion Resolver
//!
//! Collects the targets of requested relationships of a primary set into an
//! [`IncludedSet`], deduplicated by `(wire type, id)`.
//!
//! - The first object observed for a key wins; later observations are dropped and
//!   never re-fetched.
//! - Loaded targets are taken as they are. Reference-only targets are fetched through
//!   the repository of their wire type, one `find_all_by_ids` batch per type.
//! - Inclusion depth is exactly one level. A caller wanting the next hop issues
//!   another pass with [`InclusionResolver::resolve_next`].

use crate::document::ResourceIdentifier;
use crate::error::{DocumentError, Result};
use crate::extract::FieldExtractor;
use crate::query::QuerySpec;
use crate::registry::{FieldDescriptor, RelatedItem, ResourceRef, ResourceRegistry};
use crate::repository::RepositoryRegistry;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, instrument};

/// Deduplicated included resources, in first-observation order.
#[derive(Debug, Clone, Default)]
pub struct IncludedSet {
    entries: IndexMap<ResourceIdentifier, ResourceRef>,
}

impl IncludedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `resource` unless `key` is already present. Returns whether it was added.
    pub fn insert(&mut self, key: ResourceIdentifier, resource: ResourceRef) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, resource);
        true
    }

    /// Merges `other` into `self` with the same first-wins rule.
    pub fn merge(&mut self, other: IncludedSet) {
        for (key, resource) in other.entries {
            self.insert(key, resource);
        }
    }

    pub fn contains(&self, key: &ResourceIdentifier) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &ResourceIdentifier) -> Option<&ResourceRef> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceIdentifier, &ResourceRef)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceIdentifier> {
        self.entries.keys()
    }

    pub fn resources(&self) -> Vec<ResourceRef> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Target keys in first-observation order. `None` marks a reference not yet fetched.
type Slots = IndexMap<ResourceIdentifier, Option<ResourceRef>>;

/// Resolves relationship inclusion requests against a primary set.
#[derive(Clone, Copy)]
pub struct InclusionResolver<'a> {
    registry: &'a ResourceRegistry,
    repositories: Option<&'a RepositoryRegistry>,
}

impl<'a> InclusionResolver<'a> {
    /// A resolver that only follows loaded relationship targets.
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self {
            registry,
            repositories: None,
        }
    }

    /// Enables fetching of reference-only targets.
    pub fn with_repositories(mut self, repositories: &'a RepositoryRegistry) -> Self {
        self.repositories = Some(repositories);
        self
    }

    /// One level of inclusion for every `(wire type, relationship)` request in `spec`.
    ///
    /// Relationship names that the wire type does not declare fail with
    /// [`DocumentError::UnknownRelationship`]. Objects without a value for a requested
    /// relationship are skipped, and targets that are themselves primary resources are
    /// never included.
    #[instrument(skip_all, fields(primary = primary.len()))]
    pub async fn resolve_includes(&self, primary: &[ResourceRef], spec: &QuerySpec) -> Result<IncludedSet> {
        let mut slots = self.collect(primary, spec)?;
        self.fetch_pending(&mut slots, spec).await?;

        let mut included = IncludedSet::new();
        for (key, slot) in slots {
            match slot {
                Some(resource) => {
                    included.insert(key, resource);
                }
                None => debug!(key = %key, "Referenced resource not found, skipping"),
            }
        }
        info!(included = included.len(), "Resolved inclusions");
        Ok(included)
    }

    /// Runs another pass with `previous` as primary set and returns only resources
    /// that `previous` does not already hold.
    #[instrument(skip_all, fields(previous = previous.len()))]
    pub async fn resolve_next(&self, previous: &IncludedSet, spec: &QuerySpec) -> Result<IncludedSet> {
        let next = self.resolve_includes(&previous.resources(), spec).await?;
        let mut fresh = IncludedSet::new();
        for (key, resource) in next.entries {
            if !previous.contains(&key) {
                fresh.insert(key, resource);
            }
        }
        Ok(fresh)
    }

    /// Walks the primary set and records every target key in first-observation order.
    /// Loaded targets fill their slot at once; reference targets leave it empty until
    /// fetched.
    fn collect(&self, primary: &[ResourceRef], spec: &QuerySpec) -> Result<Slots> {
        let mut slots = Slots::new();
        let requests: Vec<_> = spec.inclusion_requests().collect();
        if requests.is_empty() {
            return Ok(slots);
        }

        let extractor = FieldExtractor::new(self.registry);
        let mut primary_keys = IndexSet::new();
        for object in primary {
            if let Some(key) = extractor.get_resource_identifier(object.as_ref())? {
                primary_keys.insert(key);
            }
        }

        for (wire_type, names) in requests {
            let descriptor = self.registry.lookup_by_wire_name(wire_type)?;
            let fields = names
                .iter()
                .map(|name| {
                    descriptor.relationship(name).ok_or_else(|| DocumentError::UnknownRelationship {
                        wire_type: wire_type.to_string(),
                        relationship: name.clone(),
                    })
                })
                .collect::<Result<Vec<&FieldDescriptor>>>()?;

            for object in primary {
                let resolved = self.registry.resolve(object.as_ref())?;
                if resolved.wire_type() != wire_type {
                    continue;
                }
                for field in &fields {
                    let related = extractor.related(&resolved, field)?;
                    if related.is_empty() {
                        debug!(wire_type, relationship = field.wire_name(), "No related value, skipping");
                        continue;
                    }
                    for item in related.into_items() {
                        match item {
                            RelatedItem::Loaded(target) => {
                                let Some(key) = extractor.get_resource_identifier(target.as_ref())? else {
                                    debug!(
                                        relationship = field.wire_name(),
                                        "Related object has no identifier, skipping"
                                    );
                                    continue;
                                };
                                if primary_keys.contains(&key) {
                                    continue;
                                }
                                let slot = slots.entry(key).or_insert(None);
                                if slot.is_none() {
                                    *slot = Some(target);
                                }
                            }
                            RelatedItem::Reference(key) => {
                                let declared = field.related_type().unwrap_or_default();
                                if key.wire_type != declared {
                                    return Err(DocumentError::field_access(
                                        wire_type,
                                        field.property_name(),
                                        format!(
                                            "reference to `{}` where `{declared}` is declared",
                                            key.wire_type
                                        ),
                                    ));
                                }
                                if !primary_keys.contains(&key) {
                                    slots.entry(key).or_insert(None);
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(slots)
    }

    /// Fills empty slots with one `find_all_by_ids` batch per wire type. Fetched
    /// resources that no slot asked for are ignored.
    async fn fetch_pending(&self, slots: &mut Slots, spec: &QuerySpec) -> Result<()> {
        let mut pending: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, slot) in slots.iter() {
            if slot.is_none() {
                pending.entry(key.wire_type.clone()).or_default().push(key.id.clone());
            }
        }
        if pending.is_empty() {
            return Ok(());
        }
        let repositories = self.repositories.ok_or_else(|| {
            DocumentError::UnknownResource(format!(
                "no repositories available to fetch {} referenced type(s)",
                pending.len()
            ))
        })?;
        let extractor = FieldExtractor::new(self.registry);

        for (wire_type, ids) in pending {
            debug!(wire_type = %wire_type, count = ids.len(), "Fetching referenced resources");
            let repository = repositories.get(&wire_type)?;
            let fetched = repository
                .find_all_by_ids(&ids, spec)
                .await
                .map_err(|source| DocumentError::repository(wire_type.clone(), source))?;

            for resource in fetched.resources {
                let Some(key) = extractor.get_resource_identifier(resource.as_ref())? else {
                    continue;
                };
                match slots.get_mut(&key) {
                    Some(slot) if slot.is_none() => *slot = Some(resource),
                    _ => debug!(key = %key, "Ignoring resource that was not requested"),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        #[derive(Debug)]
        struct Marker(&'static str);
        crate::impl_resource!(Marker);

        let mut set = IncludedSet::new();
        let key = ResourceIdentifier::new("markers", "1");
        assert!(set.insert(key.clone(), std::sync::Arc::new(Marker("first"))));
        assert!(!set.insert(key.clone(), std::sync::Arc::new(Marker("second"))));

        let kept = set.get(&key).unwrap();
        let marker = kept.as_any().downcast_ref::<Marker>().unwrap();
        assert_eq!(marker.0, "first");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_merge_keeps_existing_entries() {
        #[derive(Debug)]
        struct Marker(&'static str);
        crate::impl_resource!(Marker);

        let mut left = IncludedSet::new();
        left.insert(ResourceIdentifier::new("markers", "1"), std::sync::Arc::new(Marker("left")));
        let mut right = IncludedSet::new();
        right.insert(ResourceIdentifier::new("markers", "1"), std::sync::Arc::new(Marker("right")));
        right.insert(ResourceIdentifier::new("markers", "2"), std::sync::Arc::new(Marker("right")));

        left.merge(right);
        assert_eq!(left.len(), 2);
        let first = left.get(&ResourceIdentifier::new("markers", "1")).unwrap();
        assert_eq!(first.as_any().downcast_ref::<Marker>().unwrap().0, "left");
    }

    /// A reference whose wire type differs from the declared related type is a
    /// descriptor defect, not something to fetch.
    #[tokio::test]
    async fn test_reference_of_undeclared_type_fails() {
        #[derive(Debug)]
        struct Note {
            id: u32,
        }
        crate::impl_resource!(Note);

        let mut builder = ResourceRegistry::builder("http://localhost");
        crate::model::register_all(&mut builder).unwrap();
        builder
            .register::<Note>(
                "notes",
                vec![
                    FieldDescriptor::identifier("id", |n: &Note| n.id),
                    FieldDescriptor::to_one("author", crate::model::PEOPLE, |_: &Note| {
                        Some(ResourceIdentifier::new(crate::model::PROJECTS, "1"))
                    }),
                ],
            )
            .unwrap();
        let registry = builder.build().unwrap();

        let notes: Vec<ResourceRef> = vec![std::sync::Arc::new(Note { id: 1 })];
        let spec = QuerySpec::builder().include("notes", ["author"]).build();
        let err = InclusionResolver::new(&registry)
            .resolve_includes(&notes, &spec)
            .await
            .unwrap_err();

        match err {
            DocumentError::FieldAccess { wire_type, field, reason } => {
                assert_eq!(wire_type, "notes");
                assert_eq!(field, "author");
                assert!(reason.contains("projects"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
