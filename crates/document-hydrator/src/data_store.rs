//! # Data Store
//!
//! [`DataStore`] is the cache-augmented entry point: given a URI it returns the hydrated object
//! graph of the document behind it.
//!
//! ```text
//! get(uri)
//!   ├─ RawStorage hit  ──────────────────────────────► hydrate cached text
//!   └─ miss ─► Transport::fetch ─► media type check ─► parse ─► cache raw text ─► hydrate
//! ```
//!
//! The raw response text is cached verbatim, and only after it parsed as a resource document,
//! so a malformed response is never served from the cache.

use crate::cache::{CacheError, RawStorage};
use crate::document::{HydratedDocument, ResourceDocument};
use crate::error::HydrationError;
use crate::hydrator::Hydrator;
use crate::media_type::{MediaType, MediaTypeError};
use crate::transport::{Transport, TransportError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Hydration(#[from] HydrationError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    MediaType(#[from] MediaTypeError),
    #[error("{uri} returned {media_type}, expected a JSON document")]
    UnsupportedMediaType { uri: String, media_type: String },
    #[error("Could not encode data for {uri}: {source}")]
    Encode {
        uri: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fetches, caches and hydrates resource documents.
#[derive(Clone)]
pub struct DataStore {
    hydrator: Hydrator,
    storage: Arc<RawStorage>,
    transport: Arc<dyn Transport>,
}

impl DataStore {
    pub fn new(hydrator: Hydrator, storage: RawStorage, transport: Arc<dyn Transport>) -> Self {
        Self {
            hydrator,
            storage: Arc::new(storage),
            transport,
        }
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn storage(&self) -> &RawStorage {
        &self.storage
    }

    /// Returns the hydrated document for `uri`, from the cache when a fresh entry exists.
    #[instrument(skip(self))]
    pub async fn get(&self, uri: &str) -> Result<HydratedDocument, StoreError> {
        if let Some(cached) = self.storage.get_item(uri)? {
            debug!("Cache hit");
            return Ok(self.hydrator.hydrate_str(&cached)?);
        }

        debug!("Cache miss, fetching");
        let fetched = self.transport.fetch(uri).await?;
        if let Some(content_type) = &fetched.content_type {
            let media_type = MediaType::parse(content_type)?;
            if !media_type.is_json() {
                return Err(StoreError::UnsupportedMediaType {
                    uri: uri.to_string(),
                    media_type: media_type.to_string(),
                });
            }
        }

        let document = ResourceDocument::parse(&fetched.body)?;
        self.storage.set_item(uri, &fetched.body)?;
        let hydrated = self.hydrator.hydrate(&document)?;
        info!(
            resources = hydrated.len(),
            instances = hydrated.instance_count(),
            "Fetched document"
        );
        Ok(hydrated)
    }

    /// Like [`get`](Self::get), handing the result to `on_ready` before returning it.
    pub async fn get_then<F>(&self, uri: &str, on_ready: F) -> Result<HydratedDocument, StoreError>
    where
        F: FnOnce(&HydratedDocument),
    {
        let hydrated = self.get(uri).await?;
        on_ready(&hydrated);
        Ok(hydrated)
    }

    /// Serializes `data` and caches it under `uri` without hydrating it.
    #[instrument(skip(self, data))]
    pub fn set<D: Serialize + ?Sized>(&self, uri: &str, data: &D) -> Result<(), StoreError> {
        let text = serde_json::to_string(data).map_err(|source| StoreError::Encode {
            uri: uri.to_string(),
            source,
        })?;
        self.storage.set_item(uri, &text)?;
        debug!(bytes = text.len(), "Stored document");
        Ok(())
    }

    /// Drops the cached entry for `uri`; the next `get` goes to the transport.
    pub fn invalidate(&self, uri: &str) -> Result<(), StoreError> {
        self.storage.remove_item(uri)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::entity::Entity;
    use crate::fields::FieldTable;
    use crate::mock::MockTransport;
    use crate::registry::ClassRegistry;
    use crate::repository::{Repository, RepositoryRegistry};
    use crate::transport::FetchedDocument;
    use serde_json::json;
    use std::sync::OnceLock;

    #[derive(Default, Debug)]
    struct Tag {
        id: Option<String>,
        label: String,
    }

    impl Entity for Tag {
        const CLASS: &'static str = "Site.Tag";

        fn identifier(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn fields() -> &'static FieldTable<Self> {
            static TABLE: OnceLock<FieldTable<Tag>> = OnceLock::new();
            TABLE.get_or_init(|| {
                FieldTable::new()
                    .field("id", |t: &mut Tag| &mut t.id)
                    .field("label", |t: &mut Tag| &mut t.label)
            })
        }
    }

    fn store_with(mock: &MockTransport) -> (DataStore, Arc<Repository<Tag>>) {
        let mut classes = ClassRegistry::new();
        classes.bind::<Tag>("tags");
        let repositories = RepositoryRegistry::new();
        let tags = repositories.register(Repository::<Tag>::new());
        let hydrator = Hydrator::new(Arc::new(classes), Arc::new(repositories));
        let store = DataStore::new(
            hydrator,
            RawStorage::in_memory(StoreConfig::default()),
            Arc::new(mock.clone()),
        );
        (store, tags)
    }

    const TAGS: &str = r#"{"tags":[{"id":"t1","label":"rust"},{"id":"t2","label":"json"}]}"#;

    #[tokio::test]
    async fn test_miss_fetches_caches_and_hydrates() {
        let mock = MockTransport::new();
        mock.expect_fetch("/tags").return_json(TAGS);
        let (store, tags) = store_with(&mock);

        let hydrated = store.get("/tags").await.unwrap();
        assert_eq!(hydrated.many::<Tag>("tags").unwrap().len(), 2);
        assert_eq!(tags.find_by_identifier("t2").unwrap().read().label, "json");
        assert_eq!(store.storage().get_item("/tags").unwrap().as_deref(), Some(TAGS));
        mock.verify();
    }

    #[tokio::test]
    async fn test_hit_skips_transport_and_keeps_identity() {
        let mock = MockTransport::new();
        mock.expect_fetch("/tags").return_json(TAGS);
        let (store, _tags) = store_with(&mock);

        let first = store.get("/tags").await.unwrap().many::<Tag>("tags").unwrap();
        let second = store.get("/tags").await.unwrap().many::<Tag>("tags").unwrap();

        assert_eq!(mock.call_count(), 1);
        assert!(first[0].ptr_eq(&second[0]));
    }

    #[tokio::test]
    async fn test_get_then_invokes_callback_once() {
        let mock = MockTransport::new();
        mock.expect_fetch("/tags").return_json(TAGS);
        let (store, _tags) = store_with(&mock);

        let mut seen = Vec::new();
        let hydrated = store
            .get_then("/tags", |doc| seen.push(doc.instance_count()))
            .await
            .unwrap();
        assert_eq!(seen, vec![2]);
        assert_eq!(hydrated.instance_count(), 2);
    }

    #[tokio::test]
    async fn test_set_bypasses_hydration_and_serves_later_get() {
        let mock = MockTransport::new();
        let (store, tags) = store_with(&mock);

        store.set("/local", &json!({ "tags": { "id": "t9", "label": "seeded" } })).unwrap();
        assert!(tags.is_empty());

        let hydrated = store.get("/local").await.unwrap();
        assert_eq!(hydrated.one::<Tag>("tags").unwrap().read().label, "seeded");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let mock = MockTransport::new();
        mock.expect_fetch("/tags").return_json(TAGS);
        mock.expect_fetch("/tags")
            .return_json(r#"{"tags":[{"id":"t1","label":"renamed"}]}"#);
        let (store, tags) = store_with(&mock);

        store.get("/tags").await.unwrap();
        store.invalidate("/tags").unwrap();
        store.get("/tags").await.unwrap();

        assert_eq!(tags.find_by_identifier("t1").unwrap().read().label, "renamed");
        mock.verify();
    }

    #[tokio::test]
    async fn test_non_json_media_type_is_rejected_and_not_cached() {
        let mock = MockTransport::new();
        mock.expect_fetch("/page")
            .return_document(FetchedDocument::with_content_type("<html/>", "text/html; charset=utf-8"));
        let (store, _tags) = store_with(&mock);

        let err = store.get("/page").await.unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedMediaType { ref media_type, .. } if media_type == "text/html"));
        assert_eq!(store.storage().get_item("/page").unwrap(), None);
    }

    #[tokio::test]
    async fn test_vendor_json_and_missing_content_type_are_accepted() {
        let mock = MockTransport::new();
        mock.expect_fetch("/a")
            .return_document(FetchedDocument::with_content_type(TAGS, "application/vnd.api+json"));
        mock.expect_fetch("/b").return_document(FetchedDocument {
            body: TAGS.to_string(),
            content_type: None,
        });
        let (store, _tags) = store_with(&mock);

        assert!(store.get("/a").await.is_ok());
        assert!(store.get("/b").await.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_response_is_not_cached() {
        let mock = MockTransport::new();
        mock.expect_fetch("/tags").return_json("{ not json");
        let (store, _tags) = store_with(&mock);

        let err = store.get("/tags").await.unwrap_err();
        assert!(matches!(err, StoreError::Hydration(HydrationError::Json(_))));
        assert_eq!(store.storage().get_item("/tags").unwrap(), None);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mock = MockTransport::new();
        mock.expect_fetch("/tags").return_err(TransportError::Failed {
            uri: "/tags".to_string(),
            reason: "connection refused".to_string(),
        });
        let (store, tags) = store_with(&mock);

        assert!(matches!(store.get("/tags").await, Err(StoreError::Transport(_))));
        assert!(tags.is_empty());
    }
}
