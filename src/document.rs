//! # Wire Document
//!
//! Output types of the serializer. They are plain `serde::Serialize` structs whose
//! JSON form is the hypermedia document:
//!
//! ```text
//! {
//!   "data": { "type": "tasks", "id": "1", "attributes": {..}, "relationships": {..}, "links": {..} },
//!   "included": [ .. ],
//!   "meta": { .. },
//!   "links": { .. }
//! }
//! ```
//!
//! Documents are owned by the request that produced them and are never shared.

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type and id of a resource; also the deduplication key of included resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub wire_type: String,
    pub id: String,
}

impl ResourceIdentifier {
    pub fn new(wire_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            wire_type: wire_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.wire_type, self.id)
    }
}

/// Relationship linkage: a single identifier (or null) or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
    One(Option<ResourceIdentifier>),
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match self {
            Linkage::One(id) => id.iter().collect(),
            Linkage::Many(ids) => ids.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub related: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
    pub data: Linkage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// One serialized resource object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceNode {
    #[serde(rename = "type")]
    pub wire_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, RelationshipNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<ResourceLinks>,
}

impl ResourceNode {
    /// `None` while the underlying object has no identifier yet.
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.wire_type.clone(), id.clone()))
    }
}

/// The primary `data` member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    One(Option<ResourceNode>),
    Many(Vec<ResourceNode>),
}

impl PrimaryData {
    pub fn nodes(&self) -> Vec<&ResourceNode> {
        match self {
            PrimaryData::One(node) => node.iter().collect(),
            PrimaryData::Many(nodes) => nodes.iter().collect(),
        }
    }
}

/// A complete top-level document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub data: PrimaryData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, String>>,
}

impl Document {
    pub fn included(&self) -> &[ResourceNode] {
        self.included.as_deref().unwrap_or_default()
    }

    /// Finds a resource by type and id among primary and included resources.
    pub fn find(&self, wire_type: &str, id: &str) -> Option<&ResourceNode> {
        self.data
            .nodes()
            .into_iter()
            .chain(self.included())
            .find(|node| node.wire_type == wire_type && node.id.as_deref() == Some(id))
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
