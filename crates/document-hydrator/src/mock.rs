//! # Mock Transport & Testing Guide
//!
//! [`MockTransport`] implements [`Transport`] entirely in memory. Each expected fetch is queued
//! with the response it should produce, so a [`DataStore`](crate::DataStore) can be driven
//! through cache misses, fetch failures and media-type checks without any network.
//!
//! ## When to use the mock vs a fixture transport
//!
//! | Feature | MockTransport | Fixture transport |
//! |---------|---------------|-------------------|
//! | **Ordering** | Strict FIFO, one response per expected fetch | Any order, any number of fetches |
//! | **Verification** | `verify()` fails on unmet expectations | None |
//! | **Use Case** | Asserting *whether* and *how often* the store fetches | Demo binaries and end-to-end tests |
//! | **Error Injection** | Easy (`return_err`) | Whatever the fixture map holds |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 0: Hydrator only (no store)</b></summary>
//!
//! **When to use**: Testing field tables and relation resolution. Call
//! [`Hydrator::hydrate_value`](crate::Hydrator::hydrate_value) with a `json!` literal; no
//! transport is involved.
//! </details>
//!
//! <details>
//! <summary><b>Pattern 1: Store with the mock (cache behaviour)</b></summary>
//!
//! **When to use**: Testing that a second `get` is served from the cache, that failures are
//! not cached, or that non-JSON responses are rejected.
//!
//! ```rust
//! use document_hydrator::mock::MockTransport;
//! use document_hydrator::{ClassRegistry, DataStore, Hydrator, RawStorage, RepositoryRegistry, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Setup expectations
//!     let mock = MockTransport::new();
//!     mock.expect_fetch("/empty").return_json("{}");
//!
//!     // 2. Wire the store around the mock
//!     let hydrator = Hydrator::new(Arc::new(ClassRegistry::new()), Arc::new(RepositoryRegistry::new()));
//!     let store = DataStore::new(hydrator, RawStorage::in_memory(StoreConfig::default()), Arc::new(mock.clone()));
//!
//!     // 3. The second get is a cache hit and never reaches the transport
//!     assert!(store.get("/empty").await.unwrap().is_empty());
//!     assert!(store.get("/empty").await.unwrap().is_empty());
//!     assert_eq!(mock.calls(), vec!["/empty".to_string()]);
//!     mock.verify();
//! }
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Full sample system</b></summary>
//!
//! **When to use**: End-to-end behaviour of a real domain. Wire the domain's registries and a
//! fixture transport, then go through the typed clients (see the `blog-sample` crate tests).
//! </details>

use crate::transport::{FetchedDocument, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// An expected fetch and the response it produces.
struct Expectation {
    uri: String,
    response: Result<FetchedDocument, TransportError>,
}

/// A transport with expectation tracking for fluent testing.
///
/// Clones share the same expectation queue and call log, so a test can keep one handle while
/// the store owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects the next fetch to be for `uri`.
    pub fn expect_fetch(&self, uri: impl Into<String>) -> FetchExpectationBuilder {
        FetchExpectationBuilder {
            uri: uri.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Every URI fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.expectations.lock().len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, uri: &str) -> Result<FetchedDocument, TransportError> {
        self.calls.lock().push(uri.to_string());
        let expectation = self.expectations.lock().pop_front();
        match expectation {
            Some(expected) if expected.uri == uri => expected.response,
            Some(expected) => panic!("Unexpected fetch of {uri}, expected {}", expected.uri),
            None => panic!("Unexpected fetch of {uri}, no expectations left"),
        }
    }
}

/// Builder for `fetch` expectations.
pub struct FetchExpectationBuilder {
    uri: String,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl FetchExpectationBuilder {
    /// Responds with `body` declared as `application/json`.
    pub fn return_json(self, body: impl Into<String>) {
        self.return_document(FetchedDocument::json(body));
    }

    pub fn return_document(self, document: FetchedDocument) {
        self.push(Ok(document));
    }

    pub fn return_err(self, error: TransportError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<FetchedDocument, TransportError>) {
        self.expectations.lock().push_back(Expectation {
            uri: self.uri,
            response,
        });
    }
}
