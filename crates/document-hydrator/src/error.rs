//! # Hydration Errors
//!
//! This module defines the error types shared by the registry, the repositories and the
//! hydrator. Anything that aborts a hydration pass surfaces as a [`HydrationError`]; the
//! storage layer has its own [`StoreError`](crate::data_store::StoreError) which wraps it.
//!
//! Two conditions are deliberately *not* errors:
//! - a relation identifier with no registered instance resolves to `None`,
//! - a document property the entity's field table does not map is dropped.

use serde_json::Value;

/// Errors that abort a hydration pass.
#[derive(Debug, thiserror::Error)]
pub enum HydrationError {
    /// No class is registered for a resource name, either for a top-level resource or for
    /// the target type of a relation.
    #[error("No instantiable class for resource \"{0}\" could be found")]
    UnknownResourceType(String),

    /// An instance was handed to a repository without an identifier.
    #[error("The {class} instance given to add had no identifier")]
    MissingIdentifier { class: &'static str },

    /// No repository answers for the entity name.
    #[error("No repository registered for entity \"{0}\"")]
    UnknownRepository(String),

    /// A resource carries a relation whose path has no entry in the document's `rels` table.
    #[error("No relation type declared for path \"{0}\"")]
    MissingRelationType(String),

    /// A relation value has the wrong shape for the field it is assigned to.
    #[error("Relation \"{path}\" expects {expected}")]
    RelationShape { path: String, expected: &'static str },

    /// A relation resolved to an instance of a different entity type.
    #[error("Relation \"{path}\" expects {expected} but resolved {found}")]
    RelationTypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A relation identifier is neither a string nor a number.
    #[error("Invalid identifier in relation \"{path}\": {value}")]
    InvalidIdentifier { path: String, value: Value },

    /// A mapped property received a value its setter could not accept.
    #[error("Invalid value for {class}.{key}: {source}")]
    InvalidField {
        class: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The document does not have the resource document shape.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
