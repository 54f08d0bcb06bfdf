use pretty_assertions::assert_eq;
use resource_document::assembler::DocumentAssembler;
use resource_document::error::{DocumentError, ErrorClass, ErrorDocument};
use resource_document::model::{self, alice_id, bob_id};
use resource_document::query::QuerySpec;
use resource_document::repository::mock::MockRepository;
use resource_document::repository::{RepositoryError, RepositoryRegistry, ResultSet};
use serde_json::json;
use std::sync::Arc;

fn assembler() -> DocumentAssembler {
    let registry = model::sample_registry("http://localhost:8080").unwrap();
    let repositories = model::sample_repositories().unwrap();
    DocumentAssembler::new(Arc::new(registry), Arc::new(repositories))
}

#[tokio::test]
async fn test_collection_with_included_projects() {
    let spec = QuerySpec::builder()
        .include("tasks", ["project"])
        .fields("tasks", ["name", "project"])
        .fields("projects", ["name"])
        .build();

    let document = assembler().get_collection("tasks", None, &spec).await.unwrap();

    assert_eq!(
        document.to_value().unwrap(),
        json!({
            "data": [
                {
                    "type": "tasks",
                    "id": "1",
                    "attributes": { "name": "Design capsule" },
                    "relationships": {
                        "project": {
                            "links": {
                                "self": "http://localhost:8080/tasks/1/relationships/project",
                                "related": "http://localhost:8080/tasks/1/project"
                            },
                            "data": { "type": "projects", "id": "1" }
                        }
                    },
                    "links": { "self": "http://localhost:8080/tasks/1" }
                },
                {
                    "type": "tasks",
                    "id": "2",
                    "attributes": { "name": "Build rocket" },
                    "relationships": {
                        "project": {
                            "links": {
                                "self": "http://localhost:8080/tasks/2/relationships/project",
                                "related": "http://localhost:8080/tasks/2/project"
                            },
                            "data": { "type": "projects", "id": "1" }
                        }
                    },
                    "links": { "self": "http://localhost:8080/tasks/2" }
                },
                {
                    "type": "tasks",
                    "id": "3",
                    "attributes": { "name": "Train crew" },
                    "relationships": {
                        "project": {
                            "links": {
                                "self": "http://localhost:8080/tasks/3/relationships/project",
                                "related": "http://localhost:8080/tasks/3/project"
                            },
                            "data": { "type": "projects", "id": "2" }
                        }
                    },
                    "links": { "self": "http://localhost:8080/tasks/3" }
                }
            ],
            "included": [
                {
                    "type": "projects",
                    "id": "1",
                    "attributes": { "name": "Apollo" },
                    "links": { "self": "http://localhost:8080/projects/1" }
                },
                {
                    "type": "projects",
                    "id": "2",
                    "attributes": { "name": "Gemini" },
                    "links": { "self": "http://localhost:8080/projects/2" }
                }
            ],
            "meta": { "total": 3 }
        })
    );
}

#[tokio::test]
async fn test_reference_assignees_are_fetched() {
    let spec = QuerySpec::builder().include("tasks", ["assignee"]).build();
    let document = assembler().get_collection("tasks", None, &spec).await.unwrap();

    let names: Vec<_> = document
        .included()
        .iter()
        .map(|node| node.attributes["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("Alice"), json!("Bob")]);
    let alice = document.find("people", &alice_id().to_string()).unwrap();
    assert_eq!(alice.attributes["email-address"], json!("alice@example.com"));
    assert!(document.find("people", &bob_id().to_string()).is_some());
}

#[tokio::test]
async fn test_collection_by_ids_keeps_requested_order() {
    let ids = vec!["3".to_string(), "1".to_string()];
    let document = assembler()
        .get_collection("tasks", Some(ids.as_slice()), &QuerySpec::new())
        .await
        .unwrap();

    let ids: Vec<_> = document
        .data
        .nodes()
        .into_iter()
        .map(|node| node.id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["3", "1"]);
    assert!(document.meta.is_none());
}

#[tokio::test]
async fn test_collection_filter() {
    let spec = QuerySpec::builder()
        .filter("tasks", "done", ["false"])
        .filter("tasks", "colour", ["red"])
        .build();
    let document = assembler().get_collection("tasks", None, &spec).await.unwrap();

    let ids: Vec<_> = document
        .data
        .nodes()
        .into_iter()
        .map(|node| node.id.clone().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[tokio::test]
async fn test_single_resource() {
    let document = assembler()
        .get_resource("projects", "1", &QuerySpec::new())
        .await
        .unwrap();
    assert_eq!(
        document.to_value().unwrap(),
        json!({
            "data": {
                "type": "projects",
                "id": "1",
                "attributes": {
                    "name": "Apollo",
                    "description": "Moon landing",
                    "data": { "data": "launch window" }
                },
                "links": { "self": "http://localhost:8080/projects/1" }
            }
        })
    );
}

#[tokio::test]
async fn test_missing_resource_renders_null_data() {
    let document = assembler()
        .get_resource("projects", "99", &QuerySpec::new())
        .await
        .unwrap();
    assert_eq!(document.to_value().unwrap(), json!({ "data": null }));
}

#[tokio::test]
async fn test_unknown_wire_type_is_not_found() {
    let err = assembler()
        .get_collection("invoices", None, &QuerySpec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::UnknownResource(_)));

    let errors = ErrorDocument::from_error(&err);
    assert_eq!(errors.status(), 404);
    assert_eq!(errors.errors[0].status, "404");
}

#[tokio::test]
async fn test_repository_links_are_copied() {
    let registry = model::sample_registry("http://localhost:8080").unwrap();
    let projects = MockRepository::new();
    projects.expect_find_all().return_ok(
        ResultSet::default()
            .with_meta(json!({ "page": 2 }))
            .with_link("next", "http://localhost:8080/projects?page=3"),
    );
    let mut repositories = RepositoryRegistry::new();
    repositories.register("projects", Arc::new(projects.clone())).unwrap();

    let document = DocumentAssembler::new(Arc::new(registry), Arc::new(repositories))
        .get_collection("projects", None, &QuerySpec::new())
        .await
        .unwrap();

    assert_eq!(
        document.to_value().unwrap(),
        json!({
            "data": [],
            "meta": { "page": 2 },
            "links": { "next": "http://localhost:8080/projects?page=3" }
        })
    );
    projects.verify();
}

#[tokio::test]
async fn test_repository_not_found_maps_to_not_found_class() {
    let registry = model::sample_registry("http://localhost:8080").unwrap();
    let projects = MockRepository::new();
    projects
        .expect_find_all()
        .return_err(RepositoryError::NotFound("projects".into()));
    let mut repositories = RepositoryRegistry::new();
    repositories.register("projects", Arc::new(projects.clone())).unwrap();

    let err = DocumentAssembler::new(Arc::new(registry), Arc::new(repositories))
        .get_collection("projects", None, &QuerySpec::new())
        .await
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::NotFound);
    projects.verify();
}
