//! # Class Registry
//!
//! Maps resource names as they appear in documents (`"posts"`, `"post"`) to class names
//! (`"Blog.Post"`) and back, and holds the typed factory ([`EntityKind`]) for every declared
//! class. Resource names are bound with [`ClassRegistry::register`]; the concrete Rust type
//! behind a class name is declared with [`ClassRegistry::declare`].
//!
//! ```rust
//! # use document_hydrator::{ClassRegistry, Entity, FieldTable};
//! # use std::sync::OnceLock;
//! # #[derive(Default)] struct Post { id: Option<String> }
//! # impl Entity for Post {
//! #     const CLASS: &'static str = "Blog.Post";
//! #     fn identifier(&self) -> Option<&str> { self.id.as_deref() }
//! #     fn fields() -> &'static FieldTable<Self> {
//! #         static T: OnceLock<FieldTable<Post>> = OnceLock::new();
//! #         T.get_or_init(FieldTable::new)
//! #     }
//! # }
//! let mut classes = ClassRegistry::new();
//! classes.bind::<Post>("posts").register("post", "Blog.Post");
//!
//! assert_eq!(classes.class_for("post"), Some("Blog.Post"));
//! assert_eq!(classes.resource_for("Blog.Post"), Some("post"));
//! assert_eq!(classes.class_for("comments"), None);
//! ```

use crate::document::RELS_KEY;
use crate::entity::{AnyEntity, Entity};
use crate::error::HydrationError;
use crate::fields::{Assignment, Linked};
use crate::repository::{RepositoryRegistry, Rollback};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

/// Type-erased factory for one class: builds instances from resource objects and assigns
/// resolved relations onto them.
pub trait EntityKind: Send + Sync {
    /// The class name this kind was declared under.
    fn class(&self) -> &str;

    /// Instantiates the entity, applies every mapped property of `data` (except `rels`) and
    /// adds the instance to its repository. Returns the canonical instance. The repository
    /// write is recorded in `rollback`.
    fn build(
        &self,
        data: &Map<String, Value>,
        repositories: &RepositoryRegistry,
        rollback: &mut Rollback,
    ) -> Result<AnyEntity, HydrationError>;

    /// Assigns a resolved relation. Returns `Ok(false)` if the entity does not map `key`.
    fn link(&self, entity: &AnyEntity, key: &str, path: &str, linked: Linked) -> Result<bool, HydrationError>;
}

struct KindOf<T> {
    class: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityKind for KindOf<T> {
    fn class(&self) -> &str {
        &self.class
    }

    fn build(
        &self,
        data: &Map<String, Value>,
        repositories: &RepositoryRegistry,
        rollback: &mut Rollback,
    ) -> Result<AnyEntity, HydrationError> {
        let table = T::fields();
        let mut instance = T::default();
        for (key, value) in data.iter().filter(|(key, _)| *key != RELS_KEY) {
            let assignment = table
                .assign(&mut instance, key, value)
                .map_err(|source| HydrationError::InvalidField {
                    class: T::CLASS,
                    key: key.clone(),
                    source,
                })?;
            if assignment == Assignment::Ignored {
                trace!(class = T::CLASS, key = %key, "Dropped unmapped property");
            }
        }

        let repository = repositories.typed::<T>(&self.class)?;
        let (handle, previous) = repository.upsert(instance)?;
        rollback.record(repository, handle.clone(), previous);
        Ok(handle.into_any())
    }

    fn link(&self, entity: &AnyEntity, key: &str, path: &str, linked: Linked) -> Result<bool, HydrationError> {
        let handle = entity
            .downcast::<T>()
            .ok_or_else(|| HydrationError::RelationTypeMismatch {
                path: path.to_string(),
                expected: T::CLASS,
                found: entity.class(),
            })?;
        let mut target = handle.write();
        T::fields().link(&mut target, key, path, linked)
    }
}

/// Bidirectional resource-name/class-name table plus the declared entity kinds.
#[derive(Default)]
pub struct ClassRegistry {
    resources: HashMap<String, String>,
    class_names: HashMap<String, String>,
    kinds: HashMap<String, Arc<dyn EntityKind>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `T` as the implementation of `T::CLASS`.
    pub fn declare<T: Entity>(&mut self) -> &mut Self {
        self.declare_as::<T>(T::CLASS)
    }

    /// Declares `T` as the implementation of another class name. Instances built for that
    /// class are added to the repository registered under `class_name`.
    pub fn declare_as<T: Entity>(&mut self, class_name: impl Into<String>) -> &mut Self {
        let class = class_name.into();
        let kind = KindOf::<T> {
            class: class.clone(),
            _entity: PhantomData,
        };
        self.kinds.insert(class, Arc::new(kind));
        self
    }

    /// Binds `resource_name` to `class_name` and the inverse. Last write wins.
    pub fn register(&mut self, resource_name: impl Into<String>, class_name: impl Into<String>) -> &mut Self {
        let (resource_name, class_name) = (resource_name.into(), class_name.into());
        self.class_names.insert(class_name.clone(), resource_name.clone());
        self.resources.insert(resource_name, class_name);
        self
    }

    /// Declares `T` and binds `resource_name` to it.
    pub fn bind<T: Entity>(&mut self, resource_name: impl Into<String>) -> &mut Self {
        self.declare::<T>().register(resource_name, T::CLASS)
    }

    pub fn class_for(&self, resource_name: &str) -> Option<&str> {
        self.resources.get(resource_name).map(String::as_str)
    }

    pub fn resource_for(&self, class_name: &str) -> Option<&str> {
        self.class_names.get(class_name).map(String::as_str)
    }

    /// Resolves a resource name to the kind that hydrates it.
    pub fn kind_for(&self, resource_name: &str) -> Result<Arc<dyn EntityKind>, HydrationError> {
        self.class_for(resource_name)
            .and_then(|class| self.kinds.get(class))
            .cloned()
            .ok_or_else(|| HydrationError::UnknownResourceType(resource_name.to_string()))
    }
}
