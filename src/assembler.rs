//! # Document Assembler
//!
//! Runs the whole pipeline for a GET of a collection or a single resource:
//!
//! 1. find the repository of the requested wire type,
//! 2. fetch the primary set (`find_all`, `find_all_by_ids` or `find_one`),
//! 3. narrow it with the collection filter,
//! 4. resolve the requested inclusions,
//! 5. serialize the document and attach repository meta/links.

use crate::document::Document;
use crate::error::{DocumentError, Result};
use crate::filter::CollectionFilter;
use crate::include::InclusionResolver;
use crate::query::QuerySpec;
use crate::registry::ResourceRegistry;
use crate::repository::{RepositoryRegistry, ResultSet};
use crate::serializer::{DocumentSerializer, Primary};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Shared entry point for request handlers. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    registry: Arc<ResourceRegistry>,
    repositories: Arc<RepositoryRegistry>,
    relationship_links: bool,
}

impl DocumentAssembler {
    pub fn new(registry: Arc<ResourceRegistry>, repositories: Arc<RepositoryRegistry>) -> Self {
        Self {
            registry,
            repositories,
            relationship_links: true,
        }
    }

    pub fn with_relationship_links(mut self, enabled: bool) -> Self {
        self.relationship_links = enabled;
        self
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// GET of a collection, optionally restricted to `ids`.
    #[instrument(skip(self, ids, spec))]
    pub async fn get_collection(
        &self,
        wire_type: &str,
        ids: Option<&[String]>,
        spec: &QuerySpec,
    ) -> Result<Document> {
        self.registry.lookup_by_wire_name(wire_type)?;
        let repository = self.repositories.get(wire_type)?;

        let result = match ids {
            Some(ids) if !ids.is_empty() => repository.find_all_by_ids(ids, spec).await,
            _ => repository.find_all(spec).await,
        }
        .map_err(|source| {
            warn!(error = %source, "Repository fetch failed");
            DocumentError::repository(wire_type, source)
        })?;

        let ResultSet {
            resources,
            meta,
            links,
        } = result;
        let resources = match spec.filters(wire_type) {
            Some(predicates) => CollectionFilter::new(&self.registry).filter(resources, predicates)?,
            None => resources,
        };

        let mut document = self.render(Primary::Collection(resources), spec).await?;
        document.meta = meta;
        document.links = links;
        info!(count = document.data.nodes().len(), included = document.included().len(), "Collection rendered");
        Ok(document)
    }

    /// GET of a single resource. A missing resource renders as `data: null`.
    #[instrument(skip(self, spec))]
    pub async fn get_resource(&self, wire_type: &str, id: &str, spec: &QuerySpec) -> Result<Document> {
        self.registry.lookup_by_wire_name(wire_type)?;
        let repository = self.repositories.get(wire_type)?;

        let resource = repository.find_one(id, spec).await.map_err(|source| {
            warn!(error = %source, "Repository fetch failed");
            DocumentError::repository(wire_type, source)
        })?;
        let found = resource.is_some();

        let document = self.render(Primary::Single(resource), spec).await?;
        info!(found, included = document.included().len(), "Resource rendered");
        Ok(document)
    }

    async fn render(&self, primary: Primary, spec: &QuerySpec) -> Result<Document> {
        let included = InclusionResolver::new(&self.registry)
            .with_repositories(&self.repositories)
            .resolve_includes(&primary.resources(), spec)
            .await?;
        DocumentSerializer::new(&self.registry)
            .with_relationship_links(self.relationship_links)
            .serialize(primary, spec, &included)
    }
}
