//! # Repositories (Identity Map)
//!
//! A [`Repository<T>`] owns the single live instance of every `T` by identifier. Hydrating the
//! same resource twice yields the same [`Handle`]: the second pass overwrites the stored
//! instance's fields in place instead of replacing the handle, so references taken earlier see
//! the new values.
//!
//! Each repository declares the entity names it answers for (by default just `T::CLASS`).
//! Registering it in a [`RepositoryRegistry`] binds every declared name to the same shared
//! instance, so lookups through any alias find it.
//!
//! # Architecture Note
//! The hydrator handles many entity types in one pass and only knows them by name, so the
//! registry stores repositories behind the [`AnyRepository`] trait. Typed access is recovered
//! with [`RepositoryRegistry::typed`].

use crate::entity::{AnyEntity, Entity, Handle};
use crate::error::HydrationError;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-type identity map.
pub struct Repository<T: Entity> {
    entity_names: Vec<String>,
    store: RwLock<HashMap<String, Handle<T>>>,
}

impl<T: Entity> Repository<T> {
    /// Creates a repository answering for `T::CLASS` only.
    pub fn new() -> Self {
        Self::with_names([T::CLASS])
    }

    /// Creates a repository answering for several entity names.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_names: names.into_iter().map(Into::into).collect(),
            store: RwLock::new(HashMap::new()),
        }
    }

    pub fn entity_names(&self) -> &[String] {
        &self.entity_names
    }

    /// Stores `instance` under its identifier and returns the canonical handle.
    ///
    /// If an instance with the same identifier already exists, its contents are replaced by
    /// `instance` and the existing handle is returned.
    ///
    /// Replacing takes the existing instance's write lock. Calling this on the same thread
    /// that still holds a [`Handle::read`] or [`Handle::write`] guard for that identifier
    /// deadlocks. The repository's own map is not locked while waiting, so other lookups
    /// keep working.
    pub fn add(&self, instance: T) -> Result<Handle<T>, HydrationError> {
        self.upsert(instance).map(|(handle, _)| handle)
    }

    /// Like [`add`](Self::add), also returning the value `instance` replaced, or `None` when
    /// the identifier was new.
    pub fn upsert(&self, instance: T) -> Result<(Handle<T>, Option<T>), HydrationError> {
        let identifier = instance
            .identifier()
            .ok_or(HydrationError::MissingIdentifier { class: T::CLASS })?
            .to_string();

        let existing = {
            let mut store = self.store.write();
            match store.get(&identifier).cloned() {
                Some(existing) => existing,
                None => {
                    let handle = Handle::new(instance);
                    store.insert(identifier.clone(), handle.clone());
                    debug!(class = T::CLASS, %identifier, size = store.len(), "Added");
                    return Ok((handle, None));
                }
            }
        };

        let previous = std::mem::replace(&mut *existing.write(), instance);
        debug!(class = T::CLASS, %identifier, "Replaced");
        Ok((existing, Some(previous)))
    }

    /// Drops the instance stored under `identifier`. Handles already given out stay valid.
    pub(crate) fn remove(&self, identifier: &str) -> Option<Handle<T>> {
        let removed = self.store.write().remove(identifier);
        if removed.is_some() {
            debug!(class = T::CLASS, %identifier, "Removed");
        }
        removed
    }

    pub fn find_by_identifier(&self, identifier: &str) -> Option<Handle<T>> {
        self.store.read().get(identifier).cloned()
    }

    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.store.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }
}

impl<T: Entity> Default for Repository<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Undo steps for the repository writes of one hydration pass.
///
/// Each step restores a replaced value or removes an identifier the pass inserted.
/// [`Rollback::revert`] runs them newest first, so an identifier written twice in one pass
/// ends up with the value it had before the pass.
#[derive(Default)]
pub struct Rollback {
    steps: Vec<Box<dyn FnOnce() + Send>>,
}

impl Rollback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records how to undo an [`upsert`](Repository::upsert) that returned `previous`.
    pub fn record<T: Entity>(&mut self, repository: Arc<Repository<T>>, handle: Handle<T>, previous: Option<T>) {
        match previous {
            Some(previous) => self.steps.push(Box::new(move || *handle.write() = previous)),
            None => {
                let identifier = handle.read().identifier().map(str::to_string);
                self.steps.push(Box::new(move || {
                    if let Some(identifier) = identifier {
                        repository.remove(&identifier);
                    }
                }));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Undoes every recorded write. Returns the number of steps run.
    pub fn revert(self) -> usize {
        let count = self.steps.len();
        for step in self.steps.into_iter().rev() {
            step();
        }
        count
    }
}

/// Type-erased view of a repository, used for lookups by entity name.
pub trait AnyRepository: Send + Sync {
    fn entity_names(&self) -> &[String];

    fn find_any(&self, identifier: &str) -> Option<AnyEntity>;

    fn len(&self) -> usize;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Entity> AnyRepository for Repository<T> {
    fn entity_names(&self) -> &[String] {
        &self.entity_names
    }

    fn find_any(&self, identifier: &str) -> Option<AnyEntity> {
        self.find_by_identifier(identifier).map(Handle::into_any)
    }

    fn len(&self) -> usize {
        Repository::len(self)
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Resolution table from entity names to repositories.
///
/// Owned explicitly and shared with the [`Hydrator`](crate::Hydrator), so separate registries
/// (e.g. one per test) never see each other's instances.
#[derive(Default)]
pub struct RepositoryRegistry {
    by_entity: RwLock<HashMap<String, Arc<dyn AnyRepository>>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds every name declared by `repository` to it and returns the shared instance.
    pub fn register<T: Entity>(&self, repository: Repository<T>) -> Arc<Repository<T>> {
        let repository = Arc::new(repository);
        let erased: Arc<dyn AnyRepository> = repository.clone();
        let mut by_entity = self.by_entity.write();
        for name in repository.entity_names() {
            by_entity.insert(name.clone(), Arc::clone(&erased));
        }
        debug!(class = T::CLASS, names = ?repository.entity_names(), "Repository registered");
        repository
    }

    /// Looks up the repository responsible for `entity_name`.
    pub fn repository_for(&self, entity_name: &str) -> Option<Arc<dyn AnyRepository>> {
        self.by_entity.read().get(entity_name).cloned()
    }

    /// Looks up the repository for `entity_name` and checks that it stores `T`.
    pub fn typed<T: Entity>(&self, entity_name: &str) -> Result<Arc<Repository<T>>, HydrationError> {
        self.repository_for(entity_name)
            .and_then(|repo| repo.into_any_arc().downcast::<Repository<T>>().ok())
            .ok_or_else(|| HydrationError::UnknownRepository(entity_name.to_string()))
    }

    pub fn entity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_entity.read().keys().cloned().collect();
        names.sort();
        names
    }
}
