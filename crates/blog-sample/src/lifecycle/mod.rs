//! # System Lifecycle & Wiring
//!
//! Hydration itself is simple; **wiring** is where a domain plugs in. This module is the one
//! place that knows every resource name the blog API uses and which repository answers for it.
//!
//! **Key Responsibilities:**
//! 1. **Class registration** - bind every resource name (`posts`, `post`, `people`, ...) to a class
//! 2. **Repository ownership** - create one repository per entity type and register its names
//! 3. **Store assembly** - put the hydrator, raw storage and transport together into a
//!    [`DataStore`](document_hydrator::DataStore)
//! 4. **Client construction** - hand out typed clients sharing that store
//!
//! ## The BlogSystem Pattern
//!
//! ```rust,ignore
//! impl BlogSystem {
//!     pub fn new(storage: RawStorage, transport: Arc<dyn Transport>) -> Self {
//!         // 1. Resource names -> classes (aliases included)
//!         let classes = Self::classes();
//!
//!         // 2. One repository per type, registered under every entity name it serves
//!         let repositories = RepositoryRegistry::new();
//!         let authors = repositories.register(Repository::<Author>::with_names([...]));
//!
//!         // 3. Store and clients share the same hydrator
//!         let store = DataStore::new(Hydrator::new(classes, repositories), storage, transport);
//!         ...
//!     }
//! }
//! ```
//!
//! Because the registries are owned by the system rather than global, two systems never see
//! each other's instances. Tests build a fresh one per case.
//!
//! ## Observability & Tracing
//!
//! Installing the subscriber is the binary's job; see
//! [`document_hydrator::tracing::setup_tracing`].

pub mod blog_system;

pub use blog_system::*;
