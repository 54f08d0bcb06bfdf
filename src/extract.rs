//! # Attribute/Relationship Extractor
//!
//! Uniform "read any field" access used by the serializer, the inclusion resolver
//! and the collection filter. Every read goes through the accessor table of the
//! object's registered descriptor; a failed read is a [`DocumentError::FieldAccess`],
//! which is a configuration defect and never a request error.

use crate::document::{Linkage, ResourceIdentifier};
use crate::error::{DocumentError, Result};
use crate::registry::{
    FieldDescriptor, FieldKind, Related, RelatedItem, ResolvedResource, Resource, ResourceRegistry,
};
use serde_json::Value;

/// Reads field values off registered domain objects.
#[derive(Clone, Copy)]
pub struct FieldExtractor<'a> {
    registry: &'a ResourceRegistry,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Reads `field` off `object` as a JSON value.
    ///
    /// Identifiers come back as strings (or null when unassigned), attributes as their
    /// serialized value and relationships as their linkage.
    pub fn get_value(&self, object: &dyn Resource, field: &FieldDescriptor) -> Result<Value> {
        let resolved = self.registry.resolve(object)?;
        self.read_value(&resolved, field)
    }

    /// Reads a field by wire or property name.
    pub fn get_value_by_name(&self, object: &dyn Resource, name: &str) -> Result<Value> {
        let resolved = self.registry.resolve(object)?;
        let field = resolved.descriptor.field(name).ok_or_else(|| {
            DocumentError::field_access(resolved.wire_type(), name, "no such field")
        })?;
        self.read_value(&resolved, field)
    }

    /// The identifier rendered as a string; `None` while it is unassigned.
    pub fn get_identifier(&self, object: &dyn Resource) -> Result<Option<String>> {
        let resolved = self.registry.resolve(object)?;
        self.identifier(&resolved)
    }

    /// Type and id of `object`, usable as a deduplication key.
    pub fn get_resource_identifier(&self, object: &dyn Resource) -> Result<Option<ResourceIdentifier>> {
        let resolved = self.registry.resolve(object)?;
        Ok(self
            .identifier(&resolved)?
            .map(|id| ResourceIdentifier::new(resolved.wire_type(), id)))
    }

    /// The related object(s) behind a relationship field.
    pub fn get_related(&self, object: &dyn Resource, field: &FieldDescriptor) -> Result<Related> {
        let resolved = self.registry.resolve(object)?;
        self.related(&resolved, field)
    }

    pub(crate) fn identifier(&self, resolved: &ResolvedResource<'_>) -> Result<Option<String>> {
        let field = resolved.descriptor.id_field();
        field
            .read_identifier(resolved.view)
            .map_err(|reason| DocumentError::field_access(resolved.wire_type(), field.property_name(), reason))
    }

    pub(crate) fn attribute(&self, resolved: &ResolvedResource<'_>, field: &FieldDescriptor) -> Result<Value> {
        field
            .read_attribute(resolved.view)
            .map_err(|reason| DocumentError::field_access(resolved.wire_type(), field.property_name(), reason))
    }

    pub(crate) fn related(&self, resolved: &ResolvedResource<'_>, field: &FieldDescriptor) -> Result<Related> {
        field
            .read_related(resolved.view)
            .map_err(|reason| DocumentError::field_access(resolved.wire_type(), field.property_name(), reason))
    }

    /// Linkage of a relationship value. Loaded targets without an identifier are left out.
    pub(crate) fn linkage(&self, related: &Related) -> Result<Linkage> {
        Ok(match related {
            Related::One(item) => Linkage::One(match item {
                Some(item) => self.item_identifier(item)?,
                None => None,
            }),
            Related::Many(items) => {
                let mut ids = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(id) = self.item_identifier(item)? {
                        ids.push(id);
                    }
                }
                Linkage::Many(ids)
            }
        })
    }

    pub(crate) fn item_identifier(&self, item: &RelatedItem) -> Result<Option<ResourceIdentifier>> {
        match item {
            RelatedItem::Loaded(object) => self.get_resource_identifier(object.as_ref()),
            RelatedItem::Reference(identifier) => Ok(Some(identifier.clone())),
        }
    }

    fn read_value(&self, resolved: &ResolvedResource<'_>, field: &FieldDescriptor) -> Result<Value> {
        match field.kind() {
            FieldKind::Identifier => Ok(self.identifier(resolved)?.map_or(Value::Null, Value::String)),
            FieldKind::Attribute => self.attribute(resolved, field),
            FieldKind::Relationship => {
                let related = self.related(resolved, field)?;
                Ok(serde_json::to_value(self.linkage(&related)?)?)
            }
        }
    }
}

/// String form used when comparing a value against filter predicates.
pub(crate) fn value_as_filter_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
