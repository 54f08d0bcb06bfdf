//! # Resource Metadata Registry
//!
//! Maps each domain type to its [`ResourceTypeDescriptor`]. The registry is populated
//! once through a [`ResourceRegistryBuilder`] and then frozen: [`ResourceRegistryBuilder::build`]
//! consumes the builder, so every lookup happens on a fully initialized, immutable
//! value that can be shared across threads (usually behind an `Arc`) without locking.
//!
//! ```rust
//! use resource_document::impl_resource;
//! use resource_document::registry::{FieldDescriptor, ResourceRegistry};
//!
//! #[derive(Debug)]
//! struct Project { id: u64, name: Option<String> }
//! impl_resource!(Project);
//!
//! let mut builder = ResourceRegistry::builder("http://localhost:8080");
//! builder.register::<Project>("projects", vec![
//!     FieldDescriptor::identifier("id", |p: &Project| p.id),
//!     FieldDescriptor::attribute("name", |p: &Project| p.name.clone()),
//! ]).unwrap();
//! let registry = builder.build().unwrap();
//!
//! let project = Project { id: 1, name: None };
//! assert_eq!(registry.resolve_wire_type_name(&project).unwrap(), "projects");
//! ```

pub mod descriptor;
pub mod resource;

pub use descriptor::*;
pub use resource::*;

use crate::error::{DocumentError, Result};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// An object paired with the descriptor it resolved to.
///
/// `view` is the object itself, or the embedded ancestor value that matched.
#[derive(Clone, Copy)]
pub struct ResolvedResource<'a> {
    pub descriptor: &'a ResourceTypeDescriptor,
    pub view: &'a dyn Any,
}

impl<'a> ResolvedResource<'a> {
    pub fn wire_type(&self) -> &'a str {
        self.descriptor.wire_type()
    }
}

/// Immutable registry of resource descriptors.
#[derive(Debug)]
pub struct ResourceRegistry {
    service_url: String,
    by_type: HashMap<TypeId, Arc<ResourceTypeDescriptor>>,
    by_wire_name: HashMap<String, Arc<ResourceTypeDescriptor>>,
}

impl ResourceRegistry {
    /// Starts a registry whose collection URLs are rooted at `service_url`.
    pub fn builder(service_url: impl Into<String>) -> ResourceRegistryBuilder {
        ResourceRegistryBuilder {
            service_url: service_url.into().trim_end_matches('/').to_string(),
            by_type: HashMap::new(),
            by_wire_name: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn lookup_by_type<T: Resource>(&self) -> Result<&ResourceTypeDescriptor> {
        self.lookup_by_type_id(TypeId::of::<T>())
            .ok_or_else(|| DocumentError::UnknownResource(std::any::type_name::<T>().to_string()))
    }

    pub fn lookup_by_type_id(&self, type_id: TypeId) -> Option<&ResourceTypeDescriptor> {
        self.by_type.get(&type_id).map(Arc::as_ref)
    }

    pub fn lookup_by_wire_name(&self, wire_type: &str) -> Result<&ResourceTypeDescriptor> {
        self.by_wire_name
            .get(wire_type)
            .map(Arc::as_ref)
            .ok_or_else(|| DocumentError::UnknownResource(wire_type.to_string()))
    }

    pub fn contains(&self, wire_type: &str) -> bool {
        self.by_wire_name.contains_key(wire_type)
    }

    /// Finds the descriptor of `object`, falling back to its ancestors in order.
    pub fn resolve<'a>(&'a self, object: &'a dyn Resource) -> Result<ResolvedResource<'a>> {
        let own = object.as_any();
        std::iter::once(own)
            .chain(object.ancestors())
            .find_map(|view| {
                self.lookup_by_type_id(Any::type_id(view))
                    .map(|descriptor| ResolvedResource { descriptor, view })
            })
            .ok_or_else(|| DocumentError::UnknownResource(object.type_name().to_string()))
    }

    /// Wire-type name of the most specific registered type of `object`.
    pub fn resolve_wire_type_name<'a>(&'a self, object: &'a dyn Resource) -> Result<&'a str> {
        self.resolve(object).map(|resolved| resolved.wire_type())
    }

    /// Collection URL root, e.g. `http://host/projects`.
    pub fn resource_url(&self, wire_type: &str) -> String {
        format!("{}/{}", self.service_url, wire_type)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ResourceTypeDescriptor> {
        self.by_wire_name.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.by_wire_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_wire_name.is_empty()
    }
}

/// Collects descriptors at startup. Consumed by [`build`](Self::build).
#[derive(Debug)]
pub struct ResourceRegistryBuilder {
    service_url: String,
    by_type: HashMap<TypeId, Arc<ResourceTypeDescriptor>>,
    by_wire_name: HashMap<String, Arc<ResourceTypeDescriptor>>,
    order: Vec<String>,
}

impl ResourceRegistryBuilder {
    /// Registers `T` under `wire_type` with its field list.
    ///
    /// Fails with [`DocumentError::DuplicateType`] when either the wire-type name or
    /// the domain type is already registered, and with
    /// [`DocumentError::InvalidDescriptor`] when the field list does not contain exactly
    /// one identifier, repeats a wire name, or holds accessors for another type.
    pub fn register<T: Resource>(
        &mut self,
        wire_type: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<&mut Self> {
        let wire_type = wire_type.into();
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if self.by_wire_name.contains_key(&wire_type) {
            return Err(DocumentError::DuplicateType(wire_type));
        }
        if let Some(existing) = self.by_type.get(&type_id) {
            return Err(DocumentError::DuplicateType(format!(
                "{type_name} (already registered as `{}`)",
                existing.wire_type
            )));
        }

        let invalid = |reason: String| DocumentError::InvalidDescriptor {
            wire_type: wire_type.clone(),
            reason,
        };

        let mut id_field = None;
        let mut attributes = Vec::new();
        let mut relationships = Vec::new();
        let mut seen = HashSet::new();

        for field in fields {
            if field.owner() != type_id {
                return Err(invalid(format!(
                    "field `{}` reads `{}`, not `{type_name}`",
                    field.property_name(),
                    field.owner_name()
                )));
            }
            if !seen.insert(field.wire_name().to_string()) {
                return Err(invalid(format!("wire name `{}` declared twice", field.wire_name())));
            }
            match field.kind() {
                FieldKind::Identifier if id_field.is_some() => {
                    return Err(invalid("more than one identifier field".to_string()));
                }
                FieldKind::Identifier => id_field = Some(field),
                FieldKind::Attribute => attributes.push(field),
                FieldKind::Relationship => relationships.push(field),
            }
        }

        let id_field = id_field.ok_or_else(|| invalid("missing identifier field".to_string()))?;

        let descriptor = Arc::new(ResourceTypeDescriptor {
            wire_type: wire_type.clone(),
            type_id,
            type_name,
            id_field,
            attributes,
            relationships,
        });

        debug!(
            wire_type = %wire_type,
            type_name,
            attributes = descriptor.attributes.len(),
            relationships = descriptor.relationships.len(),
            "Registered resource type"
        );

        self.by_type.insert(type_id, descriptor.clone());
        self.by_wire_name.insert(wire_type.clone(), descriptor);
        self.order.push(wire_type);
        Ok(self)
    }

    /// Freezes the registry after checking that every relationship targets a
    /// registered wire type.
    pub fn build(self) -> Result<ResourceRegistry> {
        for wire_type in &self.order {
            let descriptor = &self.by_wire_name[wire_type];
            for field in descriptor.relationship_fields() {
                let related = field.related_type().unwrap_or_default();
                if !self.by_wire_name.contains_key(related) {
                    return Err(DocumentError::InvalidDescriptor {
                        wire_type: wire_type.clone(),
                        reason: format!(
                            "relationship `{}` targets unregistered type `{related}`",
                            field.wire_name()
                        ),
                    });
                }
            }
        }

        info!(types = self.order.len(), service_url = %self.service_url, "Registry initialized");

        Ok(ResourceRegistry {
            service_url: self.service_url,
            by_type: self.by_type,
            by_wire_name: self.by_wire_name,
        })
    }
}
