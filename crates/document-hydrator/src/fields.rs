//! # Field Tables
//!
//! A [`FieldTable<T>`] is declared once per domain type and tells the hydrator how document
//! properties land on an instance:
//!
//! - **setter** entries run custom conversion code (they win over field entries),
//! - **field** entries deserialize the value straight into a struct field,
//! - **inherited** entries come from the table of an embedded base struct (see [`FieldTable::inherit`]),
//! - **relation** entries receive resolved instances once every resource of the document is built.
//!
//! Properties with no entry are dropped without error.
//!
//! ```rust
//! use document_hydrator::FieldTable;
//!
//! #[derive(Default)]
//! struct Base { id: Option<String> }
//!
//! #[derive(Default)]
//! struct Article { base: Base, title: String, words: u32 }
//!
//! let base = FieldTable::<Base>::new().field("id", |b: &mut Base| &mut b.id);
//! let table = FieldTable::<Article>::new()
//!     .inherit(&base, |a: &mut Article| &mut a.base)
//!     .setter("title", |a: &mut Article, value| {
//!         a.title = serde_json::from_value::<String>(value.clone())?.trim().to_string();
//!         Ok(())
//!     })
//!     .field("words", |a: &mut Article| &mut a.words);
//!
//! assert!(table.maps("id"));
//! assert!(table.maps("title"));
//! assert!(!table.maps("rating"));
//! ```

use crate::entity::{AnyEntity, Entity, Handle};
use crate::error::HydrationError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type Setter<T> = Arc<dyn Fn(&mut T, &Value) -> serde_json::Result<()> + Send + Sync>;
type Linker<T> = Arc<dyn Fn(&mut T, &str, Linked) -> Result<(), HydrationError> + Send + Sync>;

/// Resolved relation value handed to a relation entry.
#[derive(Debug, Clone)]
pub enum Linked {
    One(Option<AnyEntity>),
    Many(Vec<Option<AnyEntity>>),
}

/// How a property was applied to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Setter,
    Field,
    Ignored,
}

/// Per-type mapping from document properties to fields.
pub struct FieldTable<T> {
    setters: HashMap<&'static str, Setter<T>>,
    fields: HashMap<&'static str, Setter<T>>,
    relations: HashMap<&'static str, Linker<T>>,
}

impl<T: 'static> FieldTable<T> {
    pub fn new() -> Self {
        Self {
            setters: HashMap::new(),
            fields: HashMap::new(),
            relations: HashMap::new(),
        }
    }

    /// Registers a setter for `key`. Setters take precedence over field entries.
    pub fn setter<F>(mut self, key: &'static str, set: F) -> Self
    where
        F: Fn(&mut T, &Value) -> serde_json::Result<()> + Send + Sync + 'static,
    {
        self.setters.insert(key, Arc::new(set));
        self
    }

    /// Registers direct assignment of `key` into the field returned by `access`.
    pub fn field<V, F>(mut self, key: &'static str, access: F) -> Self
    where
        V: DeserializeOwned + 'static,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.fields.insert(
            key,
            Arc::new(move |target: &mut T, value: &Value| {
                *access(target) = V::deserialize(value)?;
                Ok(())
            }),
        );
        self
    }

    /// Copies every entry of `parent` into this table, applied through `project`.
    ///
    /// Entries already present in this table are kept, so a type can override what it inherits.
    pub fn inherit<P, F>(mut self, parent: &FieldTable<P>, project: F) -> Self
    where
        P: 'static,
        F: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for (key, set) in &parent.setters {
            let (set, project) = (Arc::clone(set), Arc::clone(&project));
            let inherited: Setter<T> = Arc::new(move |t: &mut T, v: &Value| set(project(t), v));
            self.setters.entry(*key).or_insert(inherited);
        }
        for (key, set) in &parent.fields {
            let (set, project) = (Arc::clone(set), Arc::clone(&project));
            let inherited: Setter<T> = Arc::new(move |t: &mut T, v: &Value| set(project(t), v));
            self.fields.entry(*key).or_insert(inherited);
        }
        for (key, link) in &parent.relations {
            let (link, project) = (Arc::clone(link), Arc::clone(&project));
            let inherited: Linker<T> =
                Arc::new(move |t: &mut T, path: &str, linked: Linked| link(project(t), path, linked));
            self.relations.entry(*key).or_insert(inherited);
        }
        self
    }

    /// Registers a to-one relation resolving to instances of `C`.
    pub fn to_one<C, F>(mut self, key: &'static str, assign: F) -> Self
    where
        C: Entity,
        F: Fn(&mut T, Option<Handle<C>>) + Send + Sync + 'static,
    {
        self.relations.insert(
            key,
            Arc::new(move |target: &mut T, path: &str, linked: Linked| match linked {
                Linked::One(entity) => {
                    assign(target, entity.map(|e| typed::<C>(path, e)).transpose()?);
                    Ok(())
                }
                Linked::Many(_) => Err(HydrationError::RelationShape {
                    path: path.to_string(),
                    expected: "a single identifier",
                }),
            }),
        );
        self
    }

    /// Registers a to-many relation resolving to instances of `C`, in document order.
    ///
    /// Identifiers with no registered instance appear as `None` in their position.
    pub fn to_many<C, F>(mut self, key: &'static str, assign: F) -> Self
    where
        C: Entity,
        F: Fn(&mut T, Vec<Option<Handle<C>>>) + Send + Sync + 'static,
    {
        self.relations.insert(
            key,
            Arc::new(move |target: &mut T, path: &str, linked: Linked| match linked {
                Linked::Many(entities) => {
                    let handles = entities
                        .into_iter()
                        .map(|e| e.map(|e| typed::<C>(path, e)).transpose())
                        .collect::<Result<Vec<_>, _>>()?;
                    assign(target, handles);
                    Ok(())
                }
                Linked::One(_) => Err(HydrationError::RelationShape {
                    path: path.to_string(),
                    expected: "an identifier sequence",
                }),
            }),
        );
        self
    }

    /// Returns `true` if `key` has a setter or field entry.
    pub fn maps(&self, key: &str) -> bool {
        self.setters.contains_key(key) || self.fields.contains_key(key)
    }

    pub fn has_relation(&self, key: &str) -> bool {
        self.relations.contains_key(key)
    }

    /// Applies one document property to `target`.
    pub fn assign(&self, target: &mut T, key: &str, value: &Value) -> serde_json::Result<Assignment> {
        if let Some(set) = self.setters.get(key) {
            set(target, value)?;
            Ok(Assignment::Setter)
        } else if let Some(set) = self.fields.get(key) {
            set(target, value)?;
            Ok(Assignment::Field)
        } else {
            Ok(Assignment::Ignored)
        }
    }

    /// Assigns a resolved relation. Returns `Ok(false)` when the table has no entry for `key`.
    pub fn link(&self, target: &mut T, key: &str, path: &str, linked: Linked) -> Result<bool, HydrationError> {
        match self.relations.get(key) {
            Some(link) => link(target, path, linked).map(|_| true),
            None => Ok(false),
        }
    }
}

impl<T: 'static> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn typed<C: Entity>(path: &str, entity: AnyEntity) -> Result<Handle<C>, HydrationError> {
    entity.downcast::<C>().ok_or_else(|| HydrationError::RelationTypeMismatch {
        path: path.to_string(),
        expected: C::CLASS,
        found: entity.class(),
    })
}
