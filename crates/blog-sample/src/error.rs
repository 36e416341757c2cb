//! # Blog Errors
//!
//! [`BlogError`] is what the typed clients return. Store and hydration failures are wrapped
//! as-is; a document that hydrated fine but does not contain what the endpoint promised is a
//! [`BlogError::MissingResource`].

use document_hydrator::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{uri} did not contain \"{resource}\"")]
    MissingResource { uri: String, resource: &'static str },
}
