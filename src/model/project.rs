//! A project, the resource the document layout is usually demonstrated with.
//!
//! Every field is optional so that partially loaded rows still serialize: unset
//! attributes are left out of the document and an unset id drops `id` and the
//! self link.
use crate::registry::FieldDescriptor;
use serde::{Deserialize, Serialize};

pub const PROJECTS: &str = "projects";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub data: Option<ProjectData>,
}

/// Free-form payload rendered as a nested JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub data: String,
}

impl Project {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(ProjectData { data: data.into() });
        self
    }

    pub fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::identifier("id", |p: &Project| p.id),
            FieldDescriptor::attribute("name", |p: &Project| p.name.clone()),
            FieldDescriptor::attribute("description", |p: &Project| p.description.clone()),
            FieldDescriptor::attribute("data", |p: &Project| p.data.clone()),
        ]
    }
}

crate::impl_resource!(Project);
