//! # Descriptors
//!
//! A [`ResourceTypeDescriptor`] is the static description of one domain type: its
//! wire-type name, its identifier field and its classified attribute and relationship
//! fields. Each [`FieldDescriptor`] carries an accessor closure built once at
//! registration time, so reading "any field by name" is a table lookup plus a
//! downcast instead of runtime reflection.
//!
//! ```rust
//! use resource_document::registry::FieldDescriptor;
//!
//! #[derive(Debug)]
//! struct Project { id: u64, name: Option<String> }
//! resource_document::impl_resource!(Project);
//!
//! let fields = vec![
//!     FieldDescriptor::identifier("id", |p: &Project| p.id),
//!     FieldDescriptor::attribute("name", |p: &Project| p.name.clone()),
//! ];
//! assert_eq!(fields[1].wire_name(), "name");
//! ```

use crate::document::ResourceIdentifier;
use crate::registry::Resource;
use serde::Serialize;
use serde_json::Value;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Classification of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Identifier,
    Attribute,
    Relationship,
}

/// Cardinality of a relationship field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

/// One target of a relationship: either the loaded object or only its type and id.
#[derive(Debug, Clone)]
pub enum RelatedItem {
    Loaded(Arc<dyn Resource>),
    Reference(ResourceIdentifier),
}

impl RelatedItem {
    pub fn loaded(resource: Arc<dyn Resource>) -> Self {
        RelatedItem::Loaded(resource)
    }
}

impl<R: Resource> From<Arc<R>> for RelatedItem {
    fn from(resource: Arc<R>) -> Self {
        RelatedItem::Loaded(resource)
    }
}

impl From<ResourceIdentifier> for RelatedItem {
    fn from(identifier: ResourceIdentifier) -> Self {
        RelatedItem::Reference(identifier)
    }
}

/// Value of a relationship field read off an object.
#[derive(Debug, Clone)]
pub enum Related {
    One(Option<RelatedItem>),
    Many(Vec<RelatedItem>),
}

impl Related {
    pub fn into_items(self) -> Vec<RelatedItem> {
        match self {
            Related::One(item) => item.into_iter().collect(),
            Related::Many(items) => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Related::One(item) => item.is_none(),
            Related::Many(items) => items.is_empty(),
        }
    }
}

/// Native identifier representations that render as a wire id string.
///
/// `None` means the identifier has not been assigned yet.
pub trait IdentifierValue {
    fn to_identifier(&self) -> Option<String>;
}

macro_rules! display_identifier {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IdentifierValue for $ty {
                fn to_identifier(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )+
    };
}

display_identifier!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, String, uuid::Uuid,
);

impl<T: IdentifierValue> IdentifierValue for Option<T> {
    fn to_identifier(&self) -> Option<String> {
        self.as_ref().and_then(IdentifierValue::to_identifier)
    }
}

type Accessor<R> = Arc<dyn Fn(&dyn Any) -> Result<R, String> + Send + Sync>;

#[derive(Clone)]
enum FieldAccessor {
    Identifier(Accessor<Option<String>>),
    Attribute(Accessor<Value>),
    Relationship(Accessor<Related>),
}

fn downcast<T: 'static>(object: &dyn Any) -> Result<&T, String> {
    object
        .downcast_ref::<T>()
        .ok_or_else(|| format!("expected an instance of `{}`", type_name::<T>()))
}

/// Relationship-only part of a field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipInfo {
    pub cardinality: Cardinality,
    pub related_type: String,
}

/// Description of a single field of a domain type.
#[derive(Clone)]
pub struct FieldDescriptor {
    property_name: String,
    wire_name: String,
    kind: FieldKind,
    relationship: Option<RelationshipInfo>,
    owner: TypeId,
    owner_name: &'static str,
    accessor: FieldAccessor,
}

impl FieldDescriptor {
    /// The identifier field. Any [`IdentifierValue`] is rendered as a string.
    pub fn identifier<T, I, F>(property: impl Into<String>, read: F) -> Self
    where
        T: Resource,
        I: IdentifierValue,
        F: Fn(&T) -> I + Send + Sync + 'static,
    {
        let accessor: Accessor<Option<String>> =
            Arc::new(move |object: &dyn Any| downcast::<T>(object).map(|t| read(t).to_identifier()));
        Self::new::<T>(property.into(), FieldKind::Identifier, None, FieldAccessor::Identifier(accessor))
    }

    /// A plain attribute. `None`/null values are omitted from documents.
    pub fn attribute<T, V, F>(property: impl Into<String>, read: F) -> Self
    where
        T: Resource,
        V: Serialize,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor: Accessor<Value> = Arc::new(move |object: &dyn Any| {
            downcast::<T>(object)
                .and_then(|t| serde_json::to_value(read(t)).map_err(|e| e.to_string()))
        });
        Self::new::<T>(property.into(), FieldKind::Attribute, None, FieldAccessor::Attribute(accessor))
    }

    /// A to-one relationship to `related_type`.
    pub fn to_one<T, I, F>(property: impl Into<String>, related_type: impl Into<String>, read: F) -> Self
    where
        T: Resource,
        I: Into<RelatedItem>,
        F: Fn(&T) -> Option<I> + Send + Sync + 'static,
    {
        let accessor: Accessor<Related> = Arc::new(move |object: &dyn Any| {
            downcast::<T>(object).map(|t| Related::One(read(t).map(Into::into)))
        });
        let info = RelationshipInfo {
            cardinality: Cardinality::ToOne,
            related_type: related_type.into(),
        };
        Self::new::<T>(
            property.into(),
            FieldKind::Relationship,
            Some(info),
            FieldAccessor::Relationship(accessor),
        )
    }

    /// A to-many relationship to `related_type`. Item order is kept in linkage.
    pub fn to_many<T, I, C, F>(
        property: impl Into<String>,
        related_type: impl Into<String>,
        read: F,
    ) -> Self
    where
        T: Resource,
        I: Into<RelatedItem>,
        C: IntoIterator<Item = I>,
        F: Fn(&T) -> C + Send + Sync + 'static,
    {
        let accessor: Accessor<Related> = Arc::new(move |object: &dyn Any| {
            downcast::<T>(object).map(|t| Related::Many(read(t).into_iter().map(Into::into).collect()))
        });
        let info = RelationshipInfo {
            cardinality: Cardinality::ToMany,
            related_type: related_type.into(),
        };
        Self::new::<T>(
            property.into(),
            FieldKind::Relationship,
            Some(info),
            FieldAccessor::Relationship(accessor),
        )
    }

    fn new<T: Resource>(
        property_name: String,
        kind: FieldKind,
        relationship: Option<RelationshipInfo>,
        accessor: FieldAccessor,
    ) -> Self {
        Self {
            wire_name: property_name.clone(),
            property_name,
            kind,
            relationship,
            owner: TypeId::of::<T>(),
            owner_name: type_name::<T>(),
            accessor,
        }
    }

    /// Overrides the serialized name (defaults to the property name).
    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn relationship(&self) -> Option<&RelationshipInfo> {
        self.relationship.as_ref()
    }

    pub fn cardinality(&self) -> Option<Cardinality> {
        self.relationship.as_ref().map(|r| r.cardinality)
    }

    pub fn related_type(&self) -> Option<&str> {
        self.relationship.as_ref().map(|r| r.related_type.as_str())
    }

    /// Matches either the wire name or the underlying property name.
    pub fn answers_to(&self, name: &str) -> bool {
        self.wire_name == name || self.property_name == name
    }

    pub(crate) fn owner(&self) -> TypeId {
        self.owner
    }

    pub(crate) fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    pub(crate) fn read_identifier(&self, object: &dyn Any) -> Result<Option<String>, String> {
        match &self.accessor {
            FieldAccessor::Identifier(read) => read(object),
            _ => Err(format!("`{}` is not an identifier field", self.property_name)),
        }
    }

    pub(crate) fn read_attribute(&self, object: &dyn Any) -> Result<Value, String> {
        match &self.accessor {
            FieldAccessor::Attribute(read) => read(object),
            _ => Err(format!("`{}` is not an attribute field", self.property_name)),
        }
    }

    pub(crate) fn read_related(&self, object: &dyn Any) -> Result<Related, String> {
        match &self.accessor {
            FieldAccessor::Relationship(read) => read(object),
            _ => Err(format!("`{}` is not a relationship field", self.property_name)),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("property_name", &self.property_name)
            .field("wire_name", &self.wire_name)
            .field("kind", &self.kind)
            .field("relationship", &self.relationship)
            .field("owner", &self.owner_name)
            .finish()
    }
}

/// Static description of one registered domain type.
#[derive(Debug, Clone)]
pub struct ResourceTypeDescriptor {
    pub(crate) wire_type: String,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) id_field: FieldDescriptor,
    pub(crate) attributes: Vec<FieldDescriptor>,
    pub(crate) relationships: Vec<FieldDescriptor>,
}

impl ResourceTypeDescriptor {
    pub fn wire_type(&self) -> &str {
        &self.wire_type
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name of the described domain type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn id_field(&self) -> &FieldDescriptor {
        &self.id_field
    }

    pub fn attribute_fields(&self) -> &[FieldDescriptor] {
        &self.attributes
    }

    pub fn relationship_fields(&self) -> &[FieldDescriptor] {
        &self.relationships
    }

    pub fn attribute(&self, name: &str) -> Option<&FieldDescriptor> {
        self.attributes.iter().find(|f| f.answers_to(name))
    }

    pub fn relationship(&self, name: &str) -> Option<&FieldDescriptor> {
        self.relationships.iter().find(|f| f.answers_to(name))
    }

    /// Any declared field, identifier included.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        if self.id_field.answers_to(name) {
            return Some(&self.id_field);
        }
        self.attribute(name).or_else(|| self.relationship(name))
    }

    /// Fields a collection filter may compare against: identifier and attributes.
    pub fn filterable_field(&self, name: &str) -> Option<&FieldDescriptor> {
        if self.id_field.answers_to(name) {
            return Some(&self.id_field);
        }
        self.attribute(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        std::iter::once(&self.id_field)
            .chain(self.attributes.iter())
            .chain(self.relationships.iter())
    }
}
