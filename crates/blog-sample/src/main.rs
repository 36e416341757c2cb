//! # Blog Sample
//!
//! A walk through the document hydrator against a canned blog API.
//!
//! ## 🚀 Core Components
//!
//! - **[model](blog_sample::model)**: Plain domain structs ([`Post`](blog_sample::model::Post), `Comment`, `Author`) and their field tables.
//! - **[clients](blog_sample::clients)**: Typed wrappers (e.g. [`PostClient`](blog_sample::clients::PostClient)) that return handles instead of documents.
//! - **[lifecycle](blog_sample::lifecycle)**: Wiring of resource names, repositories and the data store.
//! - **[fixtures](blog_sample::fixtures)**: An in-memory transport serving the sample documents.
//!
//! ## 📚 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -p blog-sample
//! HYDRATOR_CACHE_DIR=/tmp/blog-cache RUST_LOG=debug cargo run -p blog-sample
//! ```
//!
//! The demo lists posts (one fetch hydrating posts, comments and people together), reads the
//! list again from the cache, then loads a single post whose document updates an instance that
//! is already held, showing that the held handle sees the new values.

use blog_sample::error::BlogError;
use blog_sample::fixtures::FixtureTransport;
use blog_sample::lifecycle::BlogSystem;
use document_hydrator::tracing::setup_tracing;
use document_hydrator::{RawStorage, StoreConfig};
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), BlogError> {
    setup_tracing();

    let storage = RawStorage::from_config(StoreConfig::from_env());
    let system = BlogSystem::new(storage, Arc::new(FixtureTransport::blog()));

    let span = tracing::info_span!("listing");
    let posts = async {
        info!("Loading posts");
        system.post_client.list().await
    }
    .instrument(span)
    .await?;

    for post in &posts {
        let post = post.read();
        let author = post.author.as_ref().map(|a| a.read().name.clone()).unwrap_or_default();
        info!(
            id = post.resource.id.as_deref().unwrap_or_default(),
            title = %post.title,
            %author,
            comments = post.loaded_comments().count(),
            missing = post.comments.iter().filter(|c| c.is_none()).count(),
            "Post"
        );
    }

    // Served from the cache; the handles are the ones already held.
    let again = system.post_client.list().await?;
    info!(same_instances = again.iter().zip(&posts).all(|(a, b)| a.ptr_eq(b)), "Listed again");

    let span = tracing::info_span!("single_post");
    let first = async { system.post_client.get("1").await }.instrument(span).await?;
    if let Some(held) = posts.first() {
        info!(
            same_instance = held.ptr_eq(&first),
            title = %held.read().title,
            "Post 1 after reload"
        );
    }

    match system.post_client.get("404").await {
        Ok(_) => info!("Unexpected post 404"),
        Err(e) => error!(error = %e, "Expected failure"),
    }

    info!(
        posts = system.posts.len(),
        comments = system.comments.len(),
        authors = system.authors.len(),
        "Demo completed"
    );
    Ok(())
}
