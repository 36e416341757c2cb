//! # Author Client
use crate::error::BlogError;
use crate::model::Author;
use document_hydrator::{DataStore, Entity, Handle};
use tracing::{debug, instrument};

/// Client for the `/authors` endpoint.
#[derive(Clone)]
pub struct AuthorClient {
    store: DataStore,
    base: String,
}

impl AuthorClient {
    pub fn new(store: DataStore, base: impl Into<String>) -> Self {
        Self {
            store,
            base: base.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Handle<Author>>, BlogError> {
        debug!("Sending request");
        let uri = format!("{}/authors", self.base);
        let document = self.store.get(&uri).await?;
        document
            .many::<Author>("authors")
            .ok_or(BlogError::MissingResource { uri, resource: "authors" })
    }

    /// An author already loaded by an earlier request, without fetching anything.
    pub fn loaded(&self, id: &str) -> Option<Handle<Author>> {
        self.store
            .hydrator()
            .repositories()
            .typed::<Author>(Author::CLASS)
            .ok()?
            .find_by_identifier(id)
    }
}
