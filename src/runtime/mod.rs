//! Runtime wiring.
//!
//! - [`EngineConfig`] - service URL and link settings, read from the environment
//! - [`DocumentRuntime`] - owns the frozen registries and hands out assemblers
//! - [`setup_tracing`] - initializes the tracing/logging infrastructure

pub mod config;
pub mod tracing;

pub use config::*;
pub use tracing::*;

use crate::assembler::DocumentAssembler;
use crate::error::Result;
use crate::registry::{ResourceRegistry, ResourceRegistryBuilder};
use crate::repository::RepositoryRegistry;
use crate::serializer::DocumentSerializer;
use std::sync::Arc;

/// The process-wide engine state. Built once at startup, read-only afterwards.
///
/// ```ignore
/// let runtime = DocumentRuntime::new(EngineConfig::from_env(), |builder| {
///     model::register_all(builder)
/// }, model::sample_repositories()?)?;
///
/// let document = runtime.assembler().get_collection("tasks", None, &spec).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DocumentRuntime {
    config: EngineConfig,
    registry: Arc<ResourceRegistry>,
    repositories: Arc<RepositoryRegistry>,
}

impl DocumentRuntime {
    /// Builds the registry with `register` and freezes both tables.
    pub fn new<F>(config: EngineConfig, register: F, repositories: RepositoryRegistry) -> Result<Self>
    where
        F: FnOnce(&mut ResourceRegistryBuilder) -> Result<()>,
    {
        let mut builder = ResourceRegistry::builder(config.service_url.clone());
        register(&mut builder)?;
        let registry = builder.build()?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
            repositories: Arc::new(repositories),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    pub fn repositories(&self) -> &Arc<RepositoryRegistry> {
        &self.repositories
    }

    pub fn assembler(&self) -> DocumentAssembler {
        DocumentAssembler::new(self.registry.clone(), self.repositories.clone())
            .with_relationship_links(self.config.relationship_links)
    }

    pub fn serializer(&self) -> DocumentSerializer<'_> {
        DocumentSerializer::new(&self.registry).with_relationship_links(self.config.relationship_links)
    }
}
