//! # Document Hydrator
//!
//! This crate turns JSON API style resource documents into graphs of typed, identity-mapped
//! domain objects. A document may carry several resource collections at once, and resources
//! point at each other by identifier through `rels` maps. The hydrator instantiates every
//! resource, files it in the repository for its type, and wires the relations into shared
//! [`Handle`]s.
//!
//! ## Why identity mapping?
//!
//! - **One object per identifier**: hydrating a post twice (from two different documents, or
//!   from the same document fetched again) yields the *same* `Handle`, with the latest field
//!   values. Code holding an old handle sees the update.
//! - **Forward references**: relations are resolved only after the whole document is built, so a
//!   post may name comments that appear further down.
//! - **Sparse documents**: a relation to an identifier that was never loaded resolves to `None`
//!   instead of failing the pass.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`Entity`], [`FieldTable`]) - your domain structs and how document
//!    properties map onto them
//! 2. **Registry Layer** ([`ClassRegistry`], [`RepositoryRegistry`]) - resource name to class,
//!    class to repository
//! 3. **Hydration Layer** ([`Hydrator`]) - build phase then link phase
//! 4. **Store Layer** ([`DataStore`], [`RawStorage`], [`Transport`]) - cache-augmented fetching
//!
//! ## Example
//!
//! ```rust
//! use document_hydrator::{ClassRegistry, Entity, FieldTable, Handle, Hydrator, Repository, RepositoryRegistry};
//! use serde_json::json;
//! use std::sync::{Arc, OnceLock};
//!
//! // 1. Define the entities and their field tables
//! #[derive(Default, Debug)]
//! struct Post { id: Option<String>, title: String, comments: Vec<Option<Handle<Comment>>> }
//!
//! #[derive(Default, Debug)]
//! struct Comment { id: Option<String>, body: String }
//!
//! impl Entity for Post {
//!     const CLASS: &'static str = "Blog.Post";
//!     fn identifier(&self) -> Option<&str> { self.id.as_deref() }
//!     fn fields() -> &'static FieldTable<Self> {
//!         static TABLE: OnceLock<FieldTable<Post>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             FieldTable::new()
//!                 .field("id", |p: &mut Post| &mut p.id)
//!                 .field("title", |p: &mut Post| &mut p.title)
//!                 .to_many("comments", |p: &mut Post, comments| p.comments = comments)
//!         })
//!     }
//! }
//!
//! impl Entity for Comment {
//!     const CLASS: &'static str = "Blog.Comment";
//!     fn identifier(&self) -> Option<&str> { self.id.as_deref() }
//!     fn fields() -> &'static FieldTable<Self> {
//!         static TABLE: OnceLock<FieldTable<Comment>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             FieldTable::new()
//!                 .field("id", |c: &mut Comment| &mut c.id)
//!                 .field("body", |c: &mut Comment| &mut c.body)
//!         })
//!     }
//! }
//!
//! // 2. Wire resource names and repositories
//! let mut classes = ClassRegistry::new();
//! classes.bind::<Post>("posts").bind::<Comment>("comments");
//! let repositories = RepositoryRegistry::new();
//! repositories.register(Repository::<Post>::new());
//! let comments = repositories.register(Repository::<Comment>::new());
//!
//! // 3. Hydrate
//! let hydrator = Hydrator::new(Arc::new(classes), Arc::new(repositories));
//! let document = hydrator.hydrate_value(json!({
//!     "posts": [{ "id": "p1", "title": "Hello", "rels": { "comments": ["c1", "c2"] } }],
//!     "comments": [{ "id": "c1", "body": "First" }, { "id": "c2", "body": "Second" }],
//!     "rels": { "posts.comments": { "type": "comments" } }
//! })).unwrap();
//!
//! let posts = document.many::<Post>("posts").unwrap();
//! let post = posts[0].read();
//! assert_eq!(post.title, "Hello");
//! assert!(post.comments[0].as_ref().unwrap().ptr_eq(&comments.find_by_identifier("c1").unwrap()));
//! ```
//!
//! ## Concurrency Model
//!
//! - Hydration is synchronous; the only await point is [`Transport::fetch`]
//! - Repositories and instances sit behind `parking_lot` locks, so an instance added during the
//!   build phase is visible to the link phase of the same pass
//! - A failed pass reverts its repository writes before returning the error
//! - Do not hydrate a document touching an instance while holding that instance's
//!   [`Handle::read`] guard on the same thread: `parking_lot` locks are not reentrant
//! - Registries are configured at startup and shared read-only through `Arc`
//!
//! ## Testing
//!
//! The [`mock`] module provides a [`MockTransport`](mock::MockTransport) with a fluent
//! expectation API for driving a [`DataStore`] without any network.

pub mod cache;
pub mod config;
pub mod data_store;
pub mod document;
pub mod entity;
pub mod error;
pub mod fields;
pub mod hydrator;
pub mod media_type;
pub mod mock;
pub mod registry;
pub mod repository;
pub mod tracing;
pub mod transport;

// Re-export core types for convenience
pub use cache::{CacheError, DurableStore, FileStore, RawStorage};
pub use config::StoreConfig;
pub use data_store::{DataStore, StoreError};
pub use document::{Hydrated, HydratedDocument, ResourceDocument};
pub use entity::{AnyEntity, Entity, Handle};
pub use error::HydrationError;
pub use fields::{FieldTable, Linked};
pub use hydrator::Hydrator;
pub use media_type::{MediaType, MediaTypeError};
pub use registry::{ClassRegistry, EntityKind};
pub use repository::{AnyRepository, Repository, RepositoryRegistry, Rollback};
pub use transport::{FetchedDocument, Transport, TransportError};
