//! # Hydrator
//!
//! Turns a [`ResourceDocument`] into a [`HydratedDocument`] in two phases:
//!
//! 1. **Build**: every top-level resource is instantiated through its registered kind and
//!    added to its repository, in document order (and array order within an entry). Relation
//!    maps found on resource objects are set aside.
//! 2. **Link**: the set-aside relation maps are resolved against the repositories and assigned
//!    onto their owners.
//!
//! Because linking only starts once every instance of the document is registered, a resource
//! may point at another one that appears later in the same document.
//!
//! A pass either completes or leaves the repositories as it found them: every repository write
//! is recorded in a [`Rollback`], and any error reverts them before it is returned. Handles
//! held by callers keep their previous values.
//!
//! Relation targets are looked up through the document's `rels` table:
//! `rels["<resource>.<relation>"].type` names the target resource, whose class determines the
//! repository queried. An identifier that is not in the repository resolves to `None`.

use crate::document::{identifier_of, Hydrated, HydratedDocument, ResourceBody, ResourceDocument, RELS_KEY};
use crate::entity::AnyEntity;
use crate::error::HydrationError;
use crate::fields::Linked;
use crate::registry::{ClassRegistry, EntityKind};
use crate::repository::{AnyRepository, RepositoryRegistry, Rollback};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds typed, identity-mapped object graphs from resource documents.
#[derive(Clone)]
pub struct Hydrator {
    classes: Arc<ClassRegistry>,
    repositories: Arc<RepositoryRegistry>,
}

impl Hydrator {
    pub fn new(classes: Arc<ClassRegistry>, repositories: Arc<RepositoryRegistry>) -> Self {
        Self { classes, repositories }
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn repositories(&self) -> &RepositoryRegistry {
        &self.repositories
    }

    pub fn hydrate_str(&self, text: &str) -> Result<HydratedDocument, HydrationError> {
        self.hydrate(&ResourceDocument::parse(text)?)
    }

    pub fn hydrate_value(&self, value: Value) -> Result<HydratedDocument, HydrationError> {
        self.hydrate(&ResourceDocument::from_value(value)?)
    }

    /// Hydrates every resource of `document` and resolves their relations.
    ///
    /// Every top-level resource name is resolved before anything is built, so an unknown
    /// resource type fails without touching any repository. Any later failure reverts the
    /// instances this call added or replaced.
    pub fn hydrate(&self, document: &ResourceDocument) -> Result<HydratedDocument, HydrationError> {
        let entries = document
            .resources()
            .map(|(name, body)| Ok((name, body, self.classes.kind_for(name)?)))
            .collect::<Result<Vec<_>, HydrationError>>()?;

        let mut pass = HydrationPass {
            hydrator: self,
            document,
            pending: Vec::new(),
            rollback: Rollback::new(),
        };

        match pass.run(entries) {
            Ok((hydrated, linked)) => {
                info!(
                    resources = hydrated.len(),
                    instances = hydrated.instance_count(),
                    relations = linked,
                    "Hydrated document"
                );
                Ok(hydrated)
            }
            Err(error) => {
                let reverted = pass.rollback.revert();
                warn!(%error, reverted, "Hydration failed, repositories restored");
                Err(error)
            }
        }
    }
}

/// An instance whose relation map still has to be resolved.
struct PendingRelations {
    resource_name: String,
    kind: Arc<dyn EntityKind>,
    entity: AnyEntity,
    relations: Map<String, Value>,
}

/// State of one `hydrate` call.
struct HydrationPass<'a> {
    hydrator: &'a Hydrator,
    document: &'a ResourceDocument,
    pending: Vec<PendingRelations>,
    rollback: Rollback,
}

impl HydrationPass<'_> {
    fn run(
        &mut self,
        entries: Vec<(&str, ResourceBody<'_>, Arc<dyn EntityKind>)>,
    ) -> Result<(HydratedDocument, usize), HydrationError> {
        let mut hydrated = HydratedDocument::default();
        for (name, body, kind) in entries {
            let value = match body {
                ResourceBody::One(data) => Hydrated::One(self.hydrate_resource(name, &kind, data)?),
                ResourceBody::Many(items) => Hydrated::Many(
                    items
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|data| self.hydrate_resource(name, &kind, data))
                        .collect::<Result<_, _>>()?,
                ),
            };
            hydrated.push(name, value);
        }

        let linked = self.resolve_relations()?;
        Ok((hydrated, linked))
    }

    fn hydrate_resource(
        &mut self,
        resource_name: &str,
        kind: &Arc<dyn EntityKind>,
        data: &Map<String, Value>,
    ) -> Result<AnyEntity, HydrationError> {
        let relations = match data.get(RELS_KEY) {
            None => None,
            Some(Value::Object(relations)) => Some(relations.clone()),
            Some(_) => {
                return Err(HydrationError::MalformedDocument(format!(
                    "\"{RELS_KEY}\" of a \"{resource_name}\" resource must be an object"
                )))
            }
        };

        let entity = kind.build(data, &self.hydrator.repositories, &mut self.rollback)?;
        debug!(resource = resource_name, class = entity.class(), id = entity.identifier(), "Built");

        if let Some(relations) = relations {
            self.pending.push(PendingRelations {
                resource_name: resource_name.to_string(),
                kind: Arc::clone(kind),
                entity: entity.clone(),
                relations,
            });
        }
        Ok(entity)
    }

    /// Resolves every pending relation map in build order. Returns the number of relations
    /// assigned.
    fn resolve_relations(&mut self) -> Result<usize, HydrationError> {
        let mut assigned = 0;
        for pending in std::mem::take(&mut self.pending) {
            for (key, value) in &pending.relations {
                let path = format!("{}.{}", pending.resource_name, key);
                let linked = self.fetch_relation(&path, value)?;
                if pending.kind.link(&pending.entity, key, &path, linked)? {
                    assigned += 1;
                } else {
                    debug!(%path, class = pending.entity.class(), "Relation not mapped, dropped");
                }
            }
        }
        Ok(assigned)
    }

    fn fetch_relation(&self, path: &str, value: &Value) -> Result<Linked, HydrationError> {
        let target = self
            .document
            .relation_type(path)
            .ok_or_else(|| HydrationError::MissingRelationType(path.to_string()))?;
        let kind = self.hydrator.classes.kind_for(target)?;
        let repository = self
            .hydrator
            .repositories
            .repository_for(kind.class())
            .ok_or_else(|| HydrationError::UnknownRepository(kind.class().to_string()))?;

        match value {
            Value::Array(identifiers) => Ok(Linked::Many(
                identifiers
                    .iter()
                    .map(|identifier| find(repository.as_ref(), path, identifier))
                    .collect::<Result<_, _>>()?,
            )),
            identifier => Ok(Linked::One(find(repository.as_ref(), path, identifier)?)),
        }
    }
}

fn find(repository: &dyn AnyRepository, path: &str, identifier: &Value) -> Result<Option<AnyEntity>, HydrationError> {
    if identifier.is_null() {
        return Ok(None);
    }
    let id = identifier_of(identifier).ok_or_else(|| HydrationError::InvalidIdentifier {
        path: path.to_string(),
        value: identifier.clone(),
    })?;
    let found = repository.find_any(&id);
    if found.is_none() {
        debug!(%path, %id, "Relation target not registered");
    }
    Ok(found)
}
