//! Sample resources used by the demo binary and the integration tests.
//!
//! - [`Project`] (`projects`) - optional attributes and a nested `data` object
//! - [`Task`] (`tasks`) - loaded, reference-only and to-many relationships
//! - [`Person`] (`people`) - uuid identifiers and a renamed attribute

pub mod person;
pub mod project;
pub mod task;

pub use person::*;
pub use project::*;
pub use task::*;

use crate::error::Result;
use crate::registry::{ResourceRef, ResourceRegistry, ResourceRegistryBuilder};
use crate::repository::{InMemoryRepository, RepositoryRegistry};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Registers every sample resource type.
pub fn register_all(builder: &mut ResourceRegistryBuilder) -> Result<()> {
    builder
        .register::<Project>(PROJECTS, Project::fields())?
        .register::<Task>(TASKS, Task::fields())?
        .register::<Person>(PEOPLE, Person::fields())?;
    Ok(())
}

/// A registry holding only the sample types.
pub fn sample_registry(service_url: &str) -> Result<ResourceRegistry> {
    let mut builder = ResourceRegistry::builder(service_url);
    register_all(&mut builder)?;
    builder.build()
}

pub fn alice_id() -> PersonId {
    PersonId(Uuid::from_u128(0xa11ce))
}

pub fn bob_id() -> PersonId {
    PersonId(Uuid::from_u128(0xb0b))
}

/// Two projects, two people and three tasks, one in-memory repository per type.
///
/// Task 1 and 2 belong to project 1, task 3 to project 2. Tasks 1 and 2 reference
/// their assignee by id only.
pub fn sample_repositories() -> Result<RepositoryRegistry> {
    let alice = Arc::new(Person::new(alice_id(), "Alice").with_email("alice@example.com"));
    let bob = Arc::new(Person::new(bob_id(), "Bob"));

    let apollo = Arc::new(
        Project::new(1, "Apollo")
            .with_description("Moon landing")
            .with_data("launch window"),
    );
    let gemini = Arc::new(Project::new(2, "Gemini"));

    let tasks = [
        Task::new(1, "Design capsule")
            .in_project(apollo.clone())
            .assigned_to(alice.id)
            .watched_by(bob.clone()),
        Task::new(2, "Build rocket")
            .in_project(apollo.clone())
            .assigned_to(bob.id)
            .completed(),
        Task::new(3, "Train crew")
            .in_project(gemini.clone())
            .watched_by(alice.clone())
            .watched_by(bob.clone()),
    ];

    let task_repository = tasks.into_iter().fold(
        InMemoryRepository::new().with_meta(json!({ "total": 3 })),
        |repo, task| {
            let id = task.id.to_string();
            repo.with(id, Arc::new(task) as ResourceRef)
        },
    );
    let project_repository = InMemoryRepository::new()
        .with("1", apollo as ResourceRef)
        .with("2", gemini as ResourceRef);
    let person_repository = InMemoryRepository::new()
        .with(alice.id.to_string(), alice as ResourceRef)
        .with(bob.id.to_string(), bob as ResourceRef);

    let mut repositories = RepositoryRegistry::new();
    repositories
        .register(TASKS, Arc::new(task_repository))?
        .register(PROJECTS, Arc::new(project_repository))?
        .register(PEOPLE, Arc::new(person_repository))?;
    Ok(repositories)
}
