//! # Resource Documents
//!
//! The wire format is a JSON object whose keys are resource names. Each value is either one
//! resource object or an array of them. The reserved `rels` key maps relation paths
//! (`"<resource>.<relation>"`) to the resource name the relation points at:
//!
//! ```json
//! {
//!   "posts": [{ "id": "1", "title": "Hi", "rels": { "comments": ["c1", "c2"] } }],
//!   "comments": [{ "id": "c1" }, { "id": "c2" }],
//!   "rels": { "posts.comments": { "type": "comments" } }
//! }
//! ```
//!
//! [`ResourceDocument`] is the validated input; [`HydratedDocument`] is what a hydration pass
//! returns, keyed by the same resource names with array-vs-single shape preserved.

use crate::entity::{AnyEntity, Entity, Handle};
use crate::error::HydrationError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Reserved key carrying relation metadata, both on the document and on resource objects.
pub const RELS_KEY: &str = "rels";

/// The body of one top-level document entry.
#[derive(Debug, Clone, Copy)]
pub enum ResourceBody<'a> {
    One(&'a Map<String, Value>),
    Many(&'a [Value]),
}

#[derive(Debug, Clone, Deserialize)]
struct RelationType {
    #[serde(rename = "type")]
    target: String,
}

/// A parsed, shape-checked resource document.
#[derive(Debug, Clone)]
pub struct ResourceDocument {
    resources: Map<String, Value>,
    relation_types: HashMap<String, String>,
}

impl ResourceDocument {
    pub fn from_value(value: Value) -> Result<Self, HydrationError> {
        let Value::Object(resources) = value else {
            return Err(HydrationError::MalformedDocument(
                "a document must be a JSON object".to_string(),
            ));
        };

        let relation_types = match resources.get(RELS_KEY) {
            Some(rels) => HashMap::<String, RelationType>::deserialize(rels)?
                .into_iter()
                .map(|(path, rel)| (path, rel.target))
                .collect(),
            None => HashMap::new(),
        };

        for (name, body) in resources.iter().filter(|(name, _)| *name != RELS_KEY) {
            let well_formed = match body {
                Value::Object(_) => true,
                Value::Array(items) => items.iter().all(Value::is_object),
                _ => false,
            };
            if !well_formed {
                return Err(HydrationError::MalformedDocument(format!(
                    "\"{name}\" must be a resource object or an array of resource objects"
                )));
            }
        }

        Ok(Self { resources, relation_types })
    }

    pub fn parse(text: &str) -> Result<Self, HydrationError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Iterates the top-level resources in document order, skipping `rels`.
    pub fn resources(&self) -> impl Iterator<Item = (&str, ResourceBody<'_>)> {
        self.resources.iter().filter(|(name, _)| *name != RELS_KEY).filter_map(|(name, body)| {
            let body = match body {
                Value::Object(data) => ResourceBody::One(data),
                Value::Array(items) => ResourceBody::Many(items),
                _ => return None,
            };
            Some((name.as_str(), body))
        })
    }

    /// The target resource name declared for a relation path.
    pub fn relation_type(&self, path: &str) -> Option<&str> {
        self.relation_types.get(path).map(String::as_str)
    }
}

/// Reads a relation identifier. Strings are taken as-is, numbers in their decimal form.
pub fn identifier_of(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// One hydrated entry, keeping the shape it had in the document.
#[derive(Debug, Clone)]
pub enum Hydrated {
    One(AnyEntity),
    Many(Vec<AnyEntity>),
}

impl Hydrated {
    pub fn entities(&self) -> &[AnyEntity] {
        match self {
            Hydrated::One(entity) => std::slice::from_ref(entity),
            Hydrated::Many(entities) => entities,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Hydrated::Many(_))
    }
}

/// The result of a hydration pass.
#[derive(Debug, Clone, Default)]
pub struct HydratedDocument {
    entries: Vec<(String, Hydrated)>,
}

impl HydratedDocument {
    pub(crate) fn push(&mut self, resource_name: &str, hydrated: Hydrated) {
        self.entries.push((resource_name.to_string(), hydrated));
    }

    pub fn get(&self, resource_name: &str) -> Option<&Hydrated> {
        self.entries
            .iter()
            .find(|(name, _)| name == resource_name)
            .map(|(_, hydrated)| hydrated)
    }

    /// The single instance stored under `resource_name`, if it is a single `T`.
    pub fn one<T: Entity>(&self, resource_name: &str) -> Option<Handle<T>> {
        match self.get(resource_name)? {
            Hydrated::One(entity) => entity.downcast(),
            Hydrated::Many(_) => None,
        }
    }

    /// The instances stored under `resource_name`, if it is an array of `T`.
    pub fn many<T: Entity>(&self, resource_name: &str) -> Option<Vec<Handle<T>>> {
        match self.get(resource_name)? {
            Hydrated::Many(entities) => entities.iter().map(|e| e.downcast::<T>()).collect(),
            Hydrated::One(_) => None,
        }
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Hydrated)> {
        self.entries.iter().map(|(name, hydrated)| (name.as_str(), hydrated))
    }

    /// Total number of instances across all entries.
    pub fn instance_count(&self) -> usize {
        self.entries.iter().map(|(_, h)| h.entities().len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
