//! A task inside a project.
//!
//! Carries the three shapes a relationship value can take:
//! - `project`: loaded to-one target
//! - `assignee`: reference-only to-one target, fetched from the `people` repository on inclusion
//! - `watchers`: loaded to-many targets
use crate::document::ResourceIdentifier;
use crate::model::{Person, PersonId, Project, PEOPLE, PROJECTS};
use crate::registry::FieldDescriptor;
use std::sync::Arc;

pub const TASKS: &str = "tasks";

#[derive(Debug, Clone)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub done: bool,
    pub project: Option<Arc<Project>>,
    pub assignee: Option<PersonId>,
    pub watchers: Vec<Arc<Person>>,
}

impl Task {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            done: false,
            project: None,
            assignee: None,
            watchers: Vec::new(),
        }
    }

    pub fn in_project(mut self, project: Arc<Project>) -> Self {
        self.project = Some(project);
        self
    }

    pub fn assigned_to(mut self, person: PersonId) -> Self {
        self.assignee = Some(person);
        self
    }

    pub fn watched_by(mut self, person: Arc<Person>) -> Self {
        self.watchers.push(person);
        self
    }

    pub fn completed(mut self) -> Self {
        self.done = true;
        self
    }

    pub fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::identifier("id", |t: &Task| t.id),
            FieldDescriptor::attribute("name", |t: &Task| t.name.clone()),
            FieldDescriptor::attribute("done", |t: &Task| t.done),
            FieldDescriptor::to_one("project", PROJECTS, |t: &Task| t.project.clone()),
            FieldDescriptor::to_one("assignee", PEOPLE, |t: &Task| {
                t.assignee.map(|id| ResourceIdentifier::new(PEOPLE, id.to_string()))
            }),
            FieldDescriptor::to_many("watchers", PEOPLE, |t: &Task| t.watchers.clone()),
        ]
    }
}

crate::impl_resource!(Task);
