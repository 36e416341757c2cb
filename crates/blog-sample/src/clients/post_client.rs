//! # Post Client
//!
//! Provides a high-level API for reading posts. It wraps the shared `DataStore` and exposes
//! domain-specific methods.

use crate::error::BlogError;
use crate::model::{Post, PostDraft};
use document_hydrator::{DataStore, Handle};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Serialize)]
struct DraftDocument<'a> {
    post: &'a PostDraft,
}

/// Client for the `/posts` endpoints.
#[derive(Clone)]
pub struct PostClient {
    store: DataStore,
    base: String,
}

impl PostClient {
    pub fn new(store: DataStore, base: impl Into<String>) -> Self {
        Self {
            store,
            base: base.into(),
        }
    }

    pub fn list_uri(&self) -> String {
        format!("{}/posts", self.base)
    }

    pub fn post_uri(&self, id: &str) -> String {
        format!("{}/posts/{}", self.base, id)
    }

    /// All posts, in the order the API lists them.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Handle<Post>>, BlogError> {
        debug!("Sending request");
        let uri = self.list_uri();
        let document = self.store.get(&uri).await?;
        document
            .many::<Post>("posts")
            .ok_or(BlogError::MissingResource { uri, resource: "posts" })
    }

    /// A single post. The returned handle is the same one `list` handed out for that id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Handle<Post>, BlogError> {
        debug!("Sending request");
        let uri = self.post_uri(id);
        let document = self.store.get(&uri).await?;
        document
            .one::<Post>("post")
            .ok_or(BlogError::MissingResource { uri, resource: "post" })
    }

    /// Drops the cached copy of a post and fetches it again.
    #[instrument(skip(self))]
    pub async fn refresh(&self, id: &str) -> Result<Handle<Post>, BlogError> {
        self.store.invalidate(&self.post_uri(id))?;
        self.get(id).await
    }

    /// Caches `draft` as the document for its post URI, so a later `get` serves it without a
    /// fetch.
    #[instrument(skip(self))]
    pub fn stage(&self, draft: &PostDraft) -> Result<(), BlogError> {
        self.store.set(&self.post_uri(&draft.id), &DraftDocument { post: draft })?;
        Ok(())
    }
}
