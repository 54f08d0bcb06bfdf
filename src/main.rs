//! Demo: renders the sample tasks with their projects and assignees included.

use resource_document::model;
use resource_document::query::QuerySpec;
use resource_document::runtime::{setup_tracing, DocumentRuntime, EngineConfig};
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = EngineConfig::from_env();
    info!(service_url = %config.service_url, "Starting document engine demo");

    let repositories = model::sample_repositories().map_err(|e| e.to_string())?;
    let runtime =
        DocumentRuntime::new(config, model::register_all, repositories).map_err(|e| e.to_string())?;
    let assembler = runtime.assembler();

    let spec = QuerySpec::builder()
        .include("tasks", ["project", "assignee"])
        .fields("projects", ["name"])
        .build();

    let span = tracing::info_span!("collection_demo");
    let document = async {
        assembler
            .get_collection(model::TASKS, None, &spec)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    println!("{}", document.to_json_pretty().map_err(|e| e.to_string())?);

    let spec = QuerySpec::builder().filter("tasks", "done", ["true"]).build();
    let document = assembler
        .get_collection(model::TASKS, None, &spec)
        .await
        .map_err(|e| e.to_string())?;
    info!(count = document.data.nodes().len(), "Completed tasks");
    println!("{}", document.to_json_pretty().map_err(|e| e.to_string())?);

    let document = assembler
        .get_resource(model::PROJECTS, "1", &QuerySpec::new())
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", document.to_json_pretty().map_err(|e| e.to_string())?);

    Ok(())
}
