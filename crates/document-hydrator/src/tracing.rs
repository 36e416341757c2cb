//! # Observability & Tracing
//!
//! The crate logs through `tracing`; installing a subscriber is left to the application.
//! [`setup_tracing`] is the stock choice: compact single-line output, module paths hidden
//! (`with_target(false)`), levels taken from `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! | Level | Event |
//! |-------|-------|
//! | `info` | Completed hydration pass, completed fetch (resource and instance counts) |
//! | `debug` | Cache hit/miss, built and replaced instances, unresolved relation identifiers, stale cache evictions |
//! | `trace` | Document properties dropped because no field entry maps them |
//! | `warn` | Durable storage unavailable, falling back to memory |
//!
//! `DataStore::get` and `DataStore::set` open a span carrying the `uri`, so every event of a
//! fetch is attributed to the document that triggered it:
//!
//! ```text
//! DEBUG get: Cache miss, fetching uri="/api/posts"
//! DEBUG get: Relation target not registered uri="/api/posts" path=posts.author id=a9
//!  INFO get: Hydrated document uri="/api/posts" resources=3 instances=7 relations=9
//!  INFO get: Fetched document uri="/api/posts" resources=3 instances=7
//! ```
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p blog-sample
//! RUST_LOG=document_hydrator=trace cargo run -p blog-sample
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once at startup. Panics if a global subscriber is already set.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
