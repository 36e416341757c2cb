//! # Blog Sample Library
//!
//! A small blog domain (posts, comments, authors) wired into the document hydrator. This
//! library exposes the modules for the demo binary and the integration tests.

pub mod clients;
pub mod error;
pub mod fixtures;
pub mod lifecycle;
pub mod model;
