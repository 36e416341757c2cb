//! # Entity Trait
//!
//! The `Entity` trait defines the contract every domain type (Post, Comment, Author, …) must
//! implement to be hydrated from a resource document. It names the class the type is
//! registered under, exposes the identifier used by the identity map, and hands out the
//! type's [`FieldTable`], the explicit description of which document properties map onto
//! which fields.
//!
//! # Architecture Note
//! Hydrated instances are shared: the same object is reachable from the repository, from the
//! hydrated document, and from every relation field pointing at it. [`Handle<T>`] is that
//! shared reference. Two handles are "the same object" exactly when [`Handle::ptr_eq`] holds.
//!
//! The hydrator works over many entity types at once, so it also needs a type-erased
//! reference: [`AnyEntity`]. It remembers the class and identifier for diagnostics and can be
//! turned back into a typed handle with [`AnyEntity::downcast`].

use crate::fields::FieldTable;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Trait that any domain type must implement to be hydrated and stored in a repository.
///
/// Instances are created with `Default::default()` and then filled in through the field table,
/// mirroring a zero-argument constructor followed by setter calls.
pub trait Entity: Default + Send + Sync + 'static {
    /// The class name this type is registered under in the [`ClassRegistry`](crate::ClassRegistry).
    const CLASS: &'static str;

    /// The identifier used as the identity map key, if one has been assigned.
    fn identifier(&self) -> Option<&str>;

    /// The field mapping table for this type.
    ///
    /// Implementations usually build the table once inside a `OnceLock`.
    fn fields() -> &'static FieldTable<Self>;
}

/// A shared, lock-guarded reference to a hydrated entity.
pub struct Handle<T>(Arc<RwLock<T>>);

impl<T: Entity> Handle<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Locks the instance for reading.
    ///
    /// Hydration writes through the same lock, so drop the guard before hydrating a document
    /// that contains this instance on the same thread, or the pass deadlocks.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Returns `true` when both handles point at the same live instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Erases the entity type. The identifier is captured for logging and lookups.
    pub fn into_any(self) -> AnyEntity {
        let identifier = self.read().identifier().unwrap_or_default().to_string();
        AnyEntity {
            class: T::CLASS,
            identifier,
            inner: self.0,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

// Relation graphs may be cyclic (a comment points back at its post), so Debug never
// descends into the referenced entity.
impl<T: Entity> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(guard) => write!(f, "Handle({}#{})", T::CLASS, guard.identifier().unwrap_or("?")),
            None => write!(f, "Handle({}#<locked>)", T::CLASS),
        }
    }
}

/// A type-erased [`Handle`].
#[derive(Clone)]
pub struct AnyEntity {
    class: &'static str,
    identifier: String,
    inner: Arc<dyn Any + Send + Sync>,
}

impl AnyEntity {
    /// The class name of the concrete entity type.
    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Recovers the typed handle, or `None` if the entity is not a `T`.
    pub fn downcast<T: Entity>(&self) -> Option<Handle<T>> {
        Arc::clone(&self.inner).downcast::<RwLock<T>>().ok().map(Handle)
    }

    pub fn is<T: Entity>(&self) -> bool {
        self.inner.is::<RwLock<T>>()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AnyEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyEntity({}#{})", self.class, self.identifier)
    }
}
