//! # Fixture Transport
//!
//! A [`Transport`] serving canned documents from memory. Used by the demo binary and the
//! end-to-end tests; unknown URIs answer with status 404.

use async_trait::async_trait;
use document_hydrator::{FetchedDocument, Transport, TransportError};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct FixtureTransport {
    documents: HashMap<String, FetchedDocument>,
    fetched: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, uri: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(uri.into(), FetchedDocument::json(body));
        self
    }

    pub fn with_document(mut self, uri: impl Into<String>, document: FetchedDocument) -> Self {
        self.documents.insert(uri.into(), document);
        self
    }

    /// The blog API as served under `/api`.
    pub fn blog() -> Self {
        Self::new()
            .with_json(
                "/api/posts",
                r#"{
                    "posts": [
                        { "id": 1, "title": "  Hydrating documents  ", "body": "Two phases.", "tags": ["rust", "json"],
                          "created_at": "2024-03-01T09:00:00Z",
                          "rels": { "author": "a1", "comments": ["c1", "c2"] } },
                        { "id": 2, "title": "Identity maps", "body": "One object per id.",
                          "rels": { "author": "a2", "comments": ["c3", "c404"] } }
                    ],
                    "comments": [
                        { "id": "c1", "body": "Nice", "rels": { "post": 1, "author": "a2" } },
                        { "id": "c2", "body": "Thanks", "rels": { "post": 1, "author": "a1" } },
                        { "id": "c3", "body": "Finally", "rels": { "post": 2, "author": null } }
                    ],
                    "people": [
                        { "id": "a1", "name": "Ada", "email": "ada@example.com" },
                        { "id": "a2", "name": "Grace" }
                    ],
                    "rels": {
                        "posts.author": { "type": "people" },
                        "posts.comments": { "type": "comments" },
                        "comments.post": { "type": "post" },
                        "comments.author": { "type": "author" }
                    }
                }"#,
            )
            .with_json(
                "/api/posts/1",
                r#"{
                    "post": { "id": 1, "title": "Hydrating documents (updated)", "body": "Build, then link.",
                              "rels": { "author": "a1", "comments": ["c2"] } },
                    "author": { "id": "a1", "name": "Ada Lovelace" },
                    "rels": {
                        "post.author": { "type": "authors" },
                        "post.comments": { "type": "comments" }
                    }
                }"#,
            )
            .with_json(
                "/api/authors",
                r#"{ "authors": [{ "id": "a1", "name": "Ada" }, { "id": "a2", "name": "Grace" }, { "id": "a3", "name": "Edsger" }] }"#,
            )
            .with_document(
                "/api/feed.xml",
                FetchedDocument::with_content_type("<rss/>", "application/rss+xml"),
            )
    }

    /// Every URI fetched so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn fetch(&self, uri: &str) -> Result<FetchedDocument, TransportError> {
        self.fetched.lock().push(uri.to_string());
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                uri: uri.to_string(),
                status: 404,
            })
    }
}
