//! # Typed Clients
//!
//! Thin wrappers around the [`DataStore`](document_hydrator::DataStore) that know the blog API's
//! URIs and resource names, and hand back typed handles instead of hydrated documents.

pub mod author_client;
pub mod post_client;

pub use author_client::AuthorClient;
pub use post_client::PostClient;
