//! In-memory repository backed by an insertion-ordered map.

use crate::query::QuerySpec;
use crate::registry::ResourceRef;
use crate::repository::{RepositoryError, ResourceRepository, ResultSet};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Holds fully materialized objects keyed by their wire id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    items: IndexMap<String, ResourceRef>,
    meta: Option<Value>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the object stored under `id`.
    pub fn with(mut self, id: impl Into<String>, resource: ResourceRef) -> Self {
        self.items.insert(id.into(), resource);
        self
    }

    /// Meta attached to every `find_all` result.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl ResourceRepository for InMemoryRepository {
    async fn find_all(&self, _spec: &QuerySpec) -> Result<ResultSet, RepositoryError> {
        debug!(count = self.items.len(), "find_all");
        let mut set = ResultSet::new(self.items.values().cloned().collect());
        set.meta = self.meta.clone();
        Ok(set)
    }

    async fn find_all_by_ids(&self, ids: &[String], _spec: &QuerySpec) -> Result<ResultSet, RepositoryError> {
        let found: Vec<ResourceRef> = ids.iter().filter_map(|id| self.items.get(id).cloned()).collect();
        debug!(requested = ids.len(), found = found.len(), "find_all_by_ids");
        Ok(ResultSet::new(found))
    }
}
