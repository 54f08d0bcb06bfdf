//! # Document Serializer
//!
//! Walks a primary result set and an [`IncludedSet`] into a [`Document`].
//!
//! ## Per-object algorithm
//!
//! 1. Resolve the wire type through the registry ([`DocumentError::UnknownResource`] otherwise).
//! 2. Emit the identifier as a string.
//! 3. Emit the attributes selected by the sparse fieldset of that wire type, skipping
//!    null values. Unknown names in the fieldset are ignored.
//! 4. Emit every selected relationship as a linkage object, even when empty, plus its
//!    `self`/`related` links when enabled.
//! 5. Emit the self link `<collection-url>/<id>`.
//!
//! Any field access failure aborts the whole document; no partial document is ever
//! returned.

use crate::document::{
    Document, PrimaryData, RelationshipLinks, RelationshipNode, ResourceIdentifier, ResourceLinks,
    ResourceNode,
};
use crate::error::Result;
use crate::extract::FieldExtractor;
use crate::include::IncludedSet;
use crate::query::QuerySpec;
use crate::registry::{Resource, ResourceRef, ResourceRegistry};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, instrument};

/// The primary `data` of a document before serialization.
#[derive(Debug, Clone)]
pub enum Primary {
    Single(Option<ResourceRef>),
    Collection(Vec<ResourceRef>),
}

impl Primary {
    pub fn resources(&self) -> Vec<ResourceRef> {
        match self {
            Primary::Single(resource) => resource.iter().cloned().collect(),
            Primary::Collection(resources) => resources.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Primary::Single(resource) => usize::from(resource.is_some()),
            Primary::Collection(resources) => resources.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ResourceRef> for Primary {
    fn from(resource: ResourceRef) -> Self {
        Primary::Single(Some(resource))
    }
}

impl From<Option<ResourceRef>> for Primary {
    fn from(resource: Option<ResourceRef>) -> Self {
        Primary::Single(resource)
    }
}

impl From<Vec<ResourceRef>> for Primary {
    fn from(resources: Vec<ResourceRef>) -> Self {
        Primary::Collection(resources)
    }
}

/// Request-scoped state of one serialization call. Built per call, never cached.
struct SerializationContext<'a> {
    registry: &'a ResourceRegistry,
    extractor: FieldExtractor<'a>,
    spec: &'a QuerySpec,
    relationship_links: bool,
}

/// Renders domain objects into documents.
#[derive(Clone, Copy)]
pub struct DocumentSerializer<'a> {
    registry: &'a ResourceRegistry,
    relationship_links: bool,
}

impl<'a> DocumentSerializer<'a> {
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self {
            registry,
            relationship_links: true,
        }
    }

    /// Toggles the `links` object of relationships.
    pub fn with_relationship_links(mut self, enabled: bool) -> Self {
        self.relationship_links = enabled;
        self
    }

    fn context<'s>(&'s self, spec: &'s QuerySpec) -> SerializationContext<'s> {
        SerializationContext {
            registry: self.registry,
            extractor: FieldExtractor::new(self.registry),
            spec,
            relationship_links: self.relationship_links,
        }
    }

    /// Serializes the primary data plus the included set into a document.
    ///
    /// Included resources that are also primary resources of this document are left
    /// out of `included`. The `included` member is present whenever the spec requests
    /// inclusions or `included` is non-empty.
    #[instrument(skip_all, fields(included = included.len()))]
    pub fn serialize(
        &self,
        primary: impl Into<Primary>,
        spec: &QuerySpec,
        included: &IncludedSet,
    ) -> Result<Document> {
        let primary = primary.into();
        debug!(primary = primary.len(), "Serializing document");
        let ctx = self.context(spec);
        ctx.log_unknown_fields();

        let data = match &primary {
            Primary::Single(None) => PrimaryData::One(None),
            Primary::Single(Some(resource)) => PrimaryData::One(Some(ctx.node(resource.as_ref())?)),
            Primary::Collection(resources) => PrimaryData::Many(
                resources
                    .iter()
                    .map(|resource| ctx.node(resource.as_ref()))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        let primary_keys: HashSet<ResourceIdentifier> = data
            .nodes()
            .into_iter()
            .filter_map(ResourceNode::identifier)
            .collect();

        let included = if spec.has_inclusions() || !included.is_empty() {
            let mut nodes = Vec::with_capacity(included.len());
            for (key, resource) in included.iter() {
                if primary_keys.contains(key) {
                    debug!(%key, "Skipping included resource already in primary data");
                    continue;
                }
                nodes.push(ctx.node(resource.as_ref())?);
            }
            Some(nodes)
        } else {
            None
        };

        Ok(Document {
            data,
            included,
            meta: None,
            links: None,
        })
    }

    /// Serializes a single object with the per-object algorithm.
    pub fn serialize_resource(&self, object: &dyn Resource, spec: &QuerySpec) -> Result<ResourceNode> {
        self.context(spec).node(object)
    }
}

impl SerializationContext<'_> {
    fn node(&self, object: &dyn Resource) -> Result<ResourceNode> {
        let resolved = self.registry.resolve(object)?;
        let descriptor = resolved.descriptor;
        let wire_type = descriptor.wire_type();
        let id = self.extractor.identifier(&resolved)?;

        let mut attributes = IndexMap::new();
        for field in descriptor.attribute_fields() {
            if !self.spec.selects(wire_type, field.wire_name()) {
                continue;
            }
            let value = self.extractor.attribute(&resolved, field)?;
            if !value.is_null() {
                attributes.insert(field.wire_name().to_string(), value);
            }
        }

        let resource_url = id
            .as_ref()
            .map(|id| format!("{}/{}", self.registry.resource_url(wire_type), id));

        let mut relationships = IndexMap::new();
        for field in descriptor.relationship_fields() {
            if !self.spec.selects(wire_type, field.wire_name()) {
                continue;
            }
            let related = self.extractor.related(&resolved, field)?;
            let links = match (&resource_url, self.relationship_links) {
                (Some(url), true) => Some(RelationshipLinks {
                    self_link: format!("{url}/relationships/{}", field.wire_name()),
                    related: format!("{url}/{}", field.wire_name()),
                }),
                _ => None,
            };
            relationships.insert(
                field.wire_name().to_string(),
                RelationshipNode {
                    links,
                    data: self.extractor.linkage(&related)?,
                },
            );
        }

        Ok(ResourceNode {
            wire_type: wire_type.to_string(),
            id,
            attributes,
            relationships,
            links: resource_url.map(|self_link| ResourceLinks { self_link }),
        })
    }

    fn log_unknown_fields(&self) {
        for descriptor in self.registry.descriptors() {
            let Some(fields) = self.spec.fields(descriptor.wire_type()) else {
                continue;
            };
            for name in fields {
                let known = descriptor
                    .attribute_fields()
                    .iter()
                    .chain(descriptor.relationship_fields())
                    .any(|f| f.wire_name() == name);
                if !known {
                    debug!(wire_type = descriptor.wire_type(), field = %name, "Ignoring unknown sparse field");
                }
            }
        }
    }
}
