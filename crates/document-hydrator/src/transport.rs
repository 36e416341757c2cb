//! The fetch seam of the [`DataStore`](crate::DataStore).
//!
//! The crate ships no network client. Applications implement [`Transport`] over whatever HTTP
//! stack they use; tests use [`MockTransport`](crate::mock::MockTransport).

use async_trait::async_trait;

/// A fetched response body together with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub body: String,
    pub content_type: Option<String>,
}

impl FetchedDocument {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some("application/json".to_string()),
        }
    }

    pub fn with_content_type(body: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some(content_type.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Fetching {uri} failed: {reason}")]
    Failed { uri: String, reason: String },
    #[error("Fetching {uri} returned status {status}")]
    Status { uri: String, status: u16 },
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<FetchedDocument, TransportError>;
}
