#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Resource Document
//!
//! > **Compound JSON:API-style documents from plain domain objects.**
//!
//! This crate turns in-memory domain objects into documents with a `data` member,
//! optional `included` resources, sparse fieldsets and relationship linkage. Which
//! fields exist, which of them are relationships and what each type is called on
//! the wire is declared once, at startup, in a registry of typed accessors.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Declared metadata, no reflection
//! Each domain type registers a list of [`FieldDescriptor`](registry::FieldDescriptor)s:
//! closures that read one field off a concrete `&T`. The engine only ever sees
//! `&dyn Resource`; the registry finds the descriptor by `TypeId` and the accessor
//! downcasts. Nothing is discovered at runtime.
//!
//! ### Read-only after startup
//! [`ResourceRegistry`](registry::ResourceRegistry) and
//! [`RepositoryRegistry`](repository::RepositoryRegistry) are built once and then
//! shared behind `Arc`. All request-scoped state (the query spec, the included set,
//! the serialization context) lives on the stack of a single call.
//!
//! ### All or nothing
//! A failing accessor aborts the whole document. Callers get a
//! [`DocumentError`](error::DocumentError) and never a half-filled document.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. Metadata ([`registry`])
//! - **Role**: wire-type names, identifier/attribute/relationship accessors, polymorphic resolution.
//! - **Key items**: [`ResourceRegistry`](registry::ResourceRegistry), [`impl_resource!`].
//!
//! ### 2. Request input ([`query`])
//! - **Role**: sparse fieldsets, inclusion requests and filter predicates per wire type.
//! - **Key items**: [`QuerySpec`](query::QuerySpec).
//!
//! ### 3. The pipeline ([`filter`], [`include`], [`serializer`])
//! - **Role**: narrow the primary set, collect one level of related resources, render.
//! - **Key items**: [`CollectionFilter`](filter::CollectionFilter),
//!   [`InclusionResolver`](include::InclusionResolver),
//!   [`DocumentSerializer`](serializer::DocumentSerializer).
//!
//! ### 4. Data access ([`repository`], [`assembler`])
//! - **Role**: async repositories per wire type and the GET flow on top of them.
//! - **Key items**: [`ResourceRepository`](repository::ResourceRepository),
//!   [`DocumentAssembler`](assembler::DocumentAssembler).
//!
//! ### 5. Wiring ([`runtime`], [`model`])
//! - **Role**: configuration, tracing setup and sample resources.
//!
//! ## 🚀 Quick Start
//!
//! ```rust,ignore
//! use resource_document::prelude::*;
//!
//! let runtime = DocumentRuntime::new(EngineConfig::from_env(), model::register_all, model::sample_repositories()?)?;
//! let spec = QuerySpec::builder().include("tasks", ["project"]).build();
//! let document = runtime.assembler().get_collection("tasks", None, &spec).await?;
//! println!("{}", document.to_json_pretty()?);
//! ```
//!
//! ## 🧪 Testing
//!
//! See [`repository::mock`] for a repository driven by expectations.

pub mod assembler;
pub mod document;
pub mod error;
pub mod extract;
pub mod filter;
pub mod include;
pub mod model;
pub mod query;
pub mod registry;
pub mod repository;
pub mod runtime;
pub mod serializer;

pub use error::{DocumentError, Result};

pub mod prelude {
    pub use crate::assembler::DocumentAssembler;
    pub use crate::document::{Document, Linkage, ResourceIdentifier, ResourceNode};
    pub use crate::error::{DocumentError, ErrorDocument, Result};
    pub use crate::filter::CollectionFilter;
    pub use crate::impl_resource;
    pub use crate::include::{IncludedSet, InclusionResolver};
    pub use crate::model;
    pub use crate::query::{FilterPredicates, QuerySpec};
    pub use crate::registry::{FieldDescriptor, Resource, ResourceRef, ResourceRegistry};
    pub use crate::repository::{InMemoryRepository, RepositoryRegistry, ResourceRepository, ResultSet};
    pub use crate::runtime::{setup_tracing, DocumentRuntime, EngineConfig};
    pub use crate::serializer::{DocumentSerializer, Primary};
}
