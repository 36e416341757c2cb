//! # Blog Domain Model
//!
//! Plain structs for the three resources a blog API serves. Each implements
//! [`Entity`](document_hydrator::Entity) and declares its field table once. The shared
//! identifier and timestamp live in the embedded [`Resource`] base and are inherited by every
//! table.

pub mod author;
pub mod comment;
pub mod post;
pub mod resource;

pub use author::Author;
pub use comment::Comment;
pub use post::{Post, PostDraft};
pub use resource::Resource;
