//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); spans carry the
//! context instead.
//!
//! ## What Gets Traced
//!
//! - **Registry**: one `info` line per build with the number of resource types.
//! - **Serializer**: a `serialize` span per document; `debug` for fields a sparse
//!   fieldset names but the type does not declare.
//! - **Inclusion**: a span per resolution pass, `debug` per repository batch.
//! - **Filter**: a span per filtered collection, `debug` for dropped predicate keys.
//! - **Assembler**: spans for `get_collection`/`get_resource`, `warn` on repository failure.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=resource_document::include=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a collection request reads like:
//!
//! ```text
//! INFO Registry initialized types=3 service_url=http://localhost:8080
//! INFO get_collection{wire_type="tasks"}:resolve_includes{primary=3}: Resolved inclusions included=2
//! INFO get_collection{wire_type="tasks"}: Collection rendered count=3 included=2
//! ```

/// Installs the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
