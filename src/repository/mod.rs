//! # Resource Repositories
//!
//! The engine never fetches data on its own. Domain objects come from a
//! [`ResourceRepository`] per wire type, already fully materialized.
//!
//! - [`ResourceRepository`] - the async collaborator contract (`find_all`, `find_all_by_ids`, `find_one`)
//! - [`RepositoryRegistry`] - wire type → repository table, frozen after startup
//! - [`InMemoryRepository`] - a ready-made store for demos and tests
//! - [`mock`] - expectation-driven repository for deterministic tests

pub mod memory;
pub mod mock;

pub use memory::InMemoryRepository;

use crate::error::{DocumentError, Result};
use crate::query::QuerySpec;
use crate::registry::ResourceRef;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Errors reported by repository implementations.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum RepositoryError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Repository unavailable: {0}")]
    Unavailable(String),
    #[error("Repository error: {0}")]
    Custom(String),
}

/// Objects returned by a repository, with optional request-scoped meta and links.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub resources: Vec<ResourceRef>,
    pub meta: Option<Value>,
    pub links: Option<IndexMap<String, String>>,
}

impl ResultSet {
    pub fn new(resources: Vec<ResourceRef>) -> Self {
        Self {
            resources,
            meta: None,
            links: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_link(mut self, name: impl Into<String>, href: impl Into<String>) -> Self {
        self.links
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), href.into());
        self
    }
}

impl From<Vec<ResourceRef>> for ResultSet {
    fn from(resources: Vec<ResourceRef>) -> Self {
        Self::new(resources)
    }
}

/// Supplies domain objects of one wire type.
///
/// Ids arrive as wire strings; parsing them into the native id type is the
/// repository's business. Implementations may block or suspend as they see fit.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find_all(&self, spec: &QuerySpec) -> Result<ResultSet, RepositoryError>;

    /// Objects for `ids`, in the order of `ids`. Unknown ids are left out.
    async fn find_all_by_ids(&self, ids: &[String], spec: &QuerySpec) -> Result<ResultSet, RepositoryError>;

    /// A single object, `None` when absent.
    #[tracing::instrument(skip(self, spec))]
    async fn find_one(&self, id: &str, spec: &QuerySpec) -> Result<Option<ResourceRef>, RepositoryError> {
        tracing::debug!("Looking up through find_all_by_ids");
        let found = self.find_all_by_ids(&[id.to_string()], spec).await?;
        Ok(found.resources.into_iter().next())
    }
}

/// Wire type → repository table.
#[derive(Default, Clone)]
pub struct RepositoryRegistry {
    repositories: HashMap<String, Arc<dyn ResourceRepository>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`DocumentError::DuplicateType`] if `wire_type` already has one.
    pub fn register(
        &mut self,
        wire_type: impl Into<String>,
        repository: Arc<dyn ResourceRepository>,
    ) -> Result<&mut Self> {
        let wire_type = wire_type.into();
        if self.repositories.contains_key(&wire_type) {
            return Err(DocumentError::DuplicateType(wire_type));
        }
        self.repositories.insert(wire_type, repository);
        Ok(self)
    }

    pub fn get(&self, wire_type: &str) -> Result<&Arc<dyn ResourceRepository>> {
        self.repositories
            .get(wire_type)
            .ok_or_else(|| DocumentError::UnknownResource(format!("no repository for `{wire_type}`")))
    }

    pub fn contains(&self, wire_type: &str) -> bool {
        self.repositories.contains_key(wire_type)
    }
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.repositories.keys().collect();
        types.sort();
        f.debug_struct("RepositoryRegistry").field("types", &types).finish()
    }
}
