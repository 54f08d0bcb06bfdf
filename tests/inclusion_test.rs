use pretty_assertions::assert_eq;
use resource_document::document::ResourceIdentifier;
use resource_document::error::{DocumentError, ErrorClass};
use resource_document::include::InclusionResolver;
use resource_document::model::{self, alice_id, bob_id, Person, Project, Task};
use resource_document::query::QuerySpec;
use resource_document::registry::{ResourceRef, ResourceRegistry};
use resource_document::repository::mock::MockRepository;
use resource_document::repository::{RepositoryError, RepositoryRegistry, ResultSet};
use std::sync::Arc;

fn registry() -> ResourceRegistry {
    model::sample_registry("http://localhost:8080").unwrap()
}

fn keys(set: &resource_document::include::IncludedSet) -> Vec<String> {
    set.keys().map(ToString::to_string).collect()
}

/// Three tasks across two projects include each project exactly once.
fn three_tasks() -> Vec<ResourceRef> {
    let apollo = Arc::new(Project::new(1, "Apollo"));
    let gemini = Arc::new(Project::new(2, "Gemini"));
    vec![
        Arc::new(Task::new(1, "a").in_project(apollo.clone())),
        Arc::new(Task::new(2, "b").in_project(apollo)),
        Arc::new(Task::new(3, "c").in_project(gemini)),
    ]
}

#[tokio::test]
async fn test_related_resources_are_deduplicated() {
    let registry = registry();
    let spec = QuerySpec::builder().include("tasks", ["project"]).build();

    let included = InclusionResolver::new(&registry)
        .resolve_includes(&three_tasks(), &spec)
        .await
        .unwrap();

    assert_eq!(keys(&included), vec!["projects:1", "projects:2"]);
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let registry = registry();
    let spec = QuerySpec::builder().include("tasks", ["project", "watchers"]).build();
    let tasks = three_tasks();
    let resolver = InclusionResolver::new(&registry);

    let first = resolver.resolve_includes(&tasks, &spec).await.unwrap();
    let second = resolver.resolve_includes(&tasks, &spec).await.unwrap();
    assert_eq!(keys(&first), keys(&second));
}

#[tokio::test]
async fn test_no_inclusion_request_yields_empty_set() {
    let registry = registry();
    let included = InclusionResolver::new(&registry)
        .resolve_includes(&three_tasks(), &QuerySpec::new())
        .await
        .unwrap();
    assert!(included.is_empty());
}

/// Requests for another wire type do not touch the primary set.
#[tokio::test]
async fn test_requests_only_apply_to_matching_type() {
    let registry = registry();
    let spec = QuerySpec::builder().include("tasks", ["project"]).build();
    let projects: Vec<ResourceRef> = vec![Arc::new(Project::new(1, "Apollo"))];
    let included = InclusionResolver::new(&registry)
        .resolve_includes(&projects, &spec)
        .await
        .unwrap();
    assert!(included.is_empty());
}

#[tokio::test]
async fn test_to_many_targets_are_included() {
    let registry = registry();
    let alice = Arc::new(Person::new(alice_id(), "Alice"));
    let bob = Arc::new(Person::new(bob_id(), "Bob"));
    let tasks: Vec<ResourceRef> = vec![
        Arc::new(Task::new(1, "a").watched_by(bob.clone()).watched_by(alice.clone())),
        Arc::new(Task::new(2, "b").watched_by(alice)),
    ];
    let spec = QuerySpec::builder().include("tasks", ["watchers"]).build();

    let included = InclusionResolver::new(&registry)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap();

    assert_eq!(
        keys(&included),
        vec![format!("people:{}", bob_id()), format!("people:{}", alice_id())]
    );
}

#[tokio::test]
async fn test_unknown_relationship_is_a_request_error() {
    let registry = registry();
    let spec = QuerySpec::builder().include("tasks", ["owner"]).build();
    let err = InclusionResolver::new(&registry)
        .resolve_includes(&three_tasks(), &spec)
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        DocumentError::UnknownRelationship { wire_type, relationship }
            if wire_type == "tasks" && relationship == "owner"
    ));
    assert_eq!(err.class(), ErrorClass::BadRequest);
}

/// Reference-only targets are fetched in one batch per wire type.
#[tokio::test]
async fn test_reference_targets_are_fetched_through_repository() {
    let registry = registry();
    let people = MockRepository::new();
    people
        .expect_find_all_by_ids([alice_id().to_string(), bob_id().to_string()])
        .return_ok(ResultSet::new(vec![
            Arc::new(Person::new(alice_id(), "Alice")) as ResourceRef,
            Arc::new(Person::new(bob_id(), "Bob")) as ResourceRef,
        ]));
    let mut repositories = RepositoryRegistry::new();
    repositories.register("people", Arc::new(people.clone())).unwrap();

    let tasks: Vec<ResourceRef> = vec![
        Arc::new(Task::new(1, "a").assigned_to(alice_id())),
        Arc::new(Task::new(2, "b").assigned_to(bob_id())),
        Arc::new(Task::new(3, "c").assigned_to(alice_id())),
    ];
    let spec = QuerySpec::builder().include("tasks", ["assignee"]).build();

    let included = InclusionResolver::new(&registry)
        .with_repositories(&repositories)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap();

    assert_eq!(included.len(), 2);
    let alice = included
        .get(&ResourceIdentifier::new("people", alice_id().to_string()))
        .unwrap();
    assert_eq!(alice.as_any().downcast_ref::<Person>().unwrap().name, "Alice");
    people.verify();
}

/// A reference whose target is already loaded through another relationship is not fetched.
#[tokio::test]
async fn test_loaded_target_satisfies_reference() {
    let registry = registry();
    let people = MockRepository::new();
    let mut repositories = RepositoryRegistry::new();
    repositories.register("people", Arc::new(people.clone())).unwrap();

    let alice = Arc::new(Person::new(alice_id(), "Alice"));
    let tasks: Vec<ResourceRef> = vec![Arc::new(
        Task::new(1, "a").watched_by(alice).assigned_to(alice_id()),
    )];
    let spec = QuerySpec::builder().include("tasks", ["watchers", "assignee"]).build();

    let included = InclusionResolver::new(&registry)
        .with_repositories(&repositories)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap();

    assert_eq!(included.len(), 1);
    assert!(people.calls().is_empty());
}

#[tokio::test]
async fn test_repository_failure_propagates() {
    let registry = registry();
    let people = MockRepository::new();
    people
        .expect_find_all_by_ids([alice_id().to_string()])
        .return_err(RepositoryError::Unavailable("people store offline".into()));
    let mut repositories = RepositoryRegistry::new();
    repositories.register("people", Arc::new(people.clone())).unwrap();

    let tasks: Vec<ResourceRef> = vec![Arc::new(Task::new(1, "a").assigned_to(alice_id()))];
    let spec = QuerySpec::builder().include("tasks", ["assignee"]).build();

    let err = InclusionResolver::new(&registry)
        .with_repositories(&repositories)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap_err();

    assert!(matches!(err, DocumentError::Repository { ref wire_type, .. } if wire_type == "people"));
    assert_eq!(err.class(), ErrorClass::Internal);
    people.verify();
}

#[tokio::test]
async fn test_references_without_repositories_fail() {
    let registry = registry();
    let tasks: Vec<ResourceRef> = vec![Arc::new(Task::new(1, "a").assigned_to(alice_id()))];
    let spec = QuerySpec::builder().include("tasks", ["assignee"]).build();

    let err = InclusionResolver::new(&registry)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::UnknownResource(_)));
}

/// A second pass uses the previous included set as primary and returns only new resources.
#[tokio::test]
async fn test_resolve_next_walks_one_more_level() {
    let registry = registry();
    let bob = Arc::new(Person::new(bob_id(), "Bob"));
    let apollo = Arc::new(Project::new(1, "Apollo"));
    let review = Arc::new(Task::new(10, "review").in_project(apollo).watched_by(bob));
    let tasks: Vec<ResourceRef> = vec![Arc::new(Task::new(1, "a").watched_by(Arc::new(
        Person::new(alice_id(), "Alice"),
    )))];

    // First level: tasks -> watchers.
    let spec = QuerySpec::builder().include("tasks", ["watchers"]).build();
    let resolver = InclusionResolver::new(&registry);
    let first = resolver.resolve_includes(&tasks, &spec).await.unwrap();
    assert_eq!(keys(&first), vec![format!("people:{}", alice_id())]);

    // People declare no relationships, so the next level is empty.
    let next = resolver.resolve_next(&first, &spec).await.unwrap();
    assert!(next.is_empty());

    // Tasks inside an included set are walked again.
    let mut previous = first.clone();
    previous.insert(ResourceIdentifier::new("tasks", "10"), review);
    let next = resolver.resolve_next(&previous, &spec).await.unwrap();
    assert_eq!(keys(&next), vec![format!("people:{}", bob_id())]);
}

/// Loaded and reference targets share one order: the order they were first seen in.
#[tokio::test]
async fn test_included_order_follows_first_observation() {
    let registry = registry();
    let people = MockRepository::new();
    people
        .expect_find_all_by_ids([alice_id().to_string()])
        .return_ok(ResultSet::new(vec![
            Arc::new(Person::new(alice_id(), "Alice")) as ResourceRef
        ]));
    let mut repositories = RepositoryRegistry::new();
    repositories.register("people", Arc::new(people.clone())).unwrap();

    let apollo = Arc::new(Project::new(1, "Apollo"));
    let tasks: Vec<ResourceRef> = vec![Arc::new(
        Task::new(1, "a").in_project(apollo).assigned_to(alice_id()),
    )];
    // Relationships are walked by name, so `assignee` is seen before `project`.
    let spec = QuerySpec::builder().include("tasks", ["project", "assignee"]).build();

    let included = InclusionResolver::new(&registry)
        .with_repositories(&repositories)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap();

    assert_eq!(
        keys(&included),
        vec![format!("people:{}", alice_id()), "projects:1".to_string()]
    );
    people.verify();
}

/// Only the ids that were asked for make it into the included set.
#[tokio::test]
async fn test_unrequested_fetched_resources_are_ignored() {
    let registry = registry();
    let people = MockRepository::new();
    people
        .expect_find_all_by_ids([alice_id().to_string()])
        .return_ok(ResultSet::new(vec![
            Arc::new(Person::new(bob_id(), "Bob")) as ResourceRef,
            Arc::new(Person::new(alice_id(), "Alice")) as ResourceRef,
        ]));
    let mut repositories = RepositoryRegistry::new();
    repositories.register("people", Arc::new(people.clone())).unwrap();

    let tasks: Vec<ResourceRef> = vec![Arc::new(Task::new(1, "a").assigned_to(alice_id()))];
    let spec = QuerySpec::builder().include("tasks", ["assignee"]).build();

    let included = InclusionResolver::new(&registry)
        .with_repositories(&repositories)
        .resolve_includes(&tasks, &spec)
        .await
        .unwrap();

    assert_eq!(keys(&included), vec![format!("people:{}", alice_id())]);
    people.verify();
}

/// A referenced resource that is already in the primary set is neither fetched nor included.
#[tokio::test]
async fn test_references_to_primary_resources_are_not_fetched() {
    let registry = registry();
    let people = MockRepository::new();
    let mut repositories = RepositoryRegistry::new();
    repositories.register("people", Arc::new(people.clone())).unwrap();

    let primary: Vec<ResourceRef> = vec![
        Arc::new(Task::new(1, "a").assigned_to(alice_id())),
        Arc::new(Person::new(alice_id(), "Alice")),
    ];
    let spec = QuerySpec::builder().include("tasks", ["assignee"]).build();

    let included = InclusionResolver::new(&registry)
        .with_repositories(&repositories)
        .resolve_includes(&primary, &spec)
        .await
        .unwrap();

    assert!(included.is_empty());
    assert!(people.calls().is_empty());
}
