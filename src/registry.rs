//! Metadata registry
//!
//! This module provides the [`Registry`] that owns every reflected
//! [`Metadata`] record. Entries are keyed by qualified name and kept in
//! insertion order so rendered component maps are stable. Saving an existing
//! name replaces the record in place; there is no deletion.
//!
//! The registry is an explicit value, usually shared as `Arc<Registry>`
//! between a [`Reflector`] and whatever renders the documents.

use {
    crate::{
        builtins,
        error::{SchemaError, SchemaResult},
        logging,
        metadata::Metadata,
        reflect::Reflector,
        schema::{Components, ModelSchema},
    },
    indexmap::IndexMap,
    std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

type Entries = IndexMap<String, Arc<Metadata>>;

/// Registry of reflected models, keyed by qualified name.
///
/// Reads may run concurrently with each other; saves take the write lock.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<Entries>,
}

impl Registry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared registry seeded with the built-in primitive models
    /// and `ValidationError`.
    pub fn with_builtins() -> Arc<Self> {
        let registry = Arc::new(Self::new());
        builtins::seed(&Reflector::new(Arc::clone(&registry)));
        registry
    }

    // The entries are only ever appended or replaced whole, so a panic in
    // another thread cannot leave them half-written.
    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, qualified: &str) -> Option<Arc<Metadata>> {
        self.read().get(qualified).cloned()
    }

    /// Insert or replace the record stored under its qualified name.
    pub fn save(&self, meta: Metadata) -> Arc<Metadata> {
        let meta = Arc::new(meta);
        let name = meta.qualified_name().to_string();

        let mut entries = self.write();
        // `insert` keeps the original slot of an existing key
        let replaced = entries.insert(name.clone(), Arc::clone(&meta)).is_some();
        let total = entries.len();
        drop(entries);

        logging::log_registry_upsert(&name, replaced, total);
        meta
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.read().contains_key(qualified)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Qualified names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of every record in insertion order.
    pub fn all(&self) -> Vec<Arc<Metadata>> {
        self.read().values().cloned().collect()
    }

    /// Render the record stored under `qualified`.
    pub fn render(&self, qualified: &str) -> SchemaResult<ModelSchema> {
        match self.get(qualified) {
            Some(meta) => Ok(ModelSchema::from_metadata(&meta)),
            None => {
                logging::log_unknown_model(qualified);
                Err(SchemaError::UnknownModel(qualified.to_string()))
            }
        }
    }

    /// Render every record into an OpenAPI `components` section.
    pub fn components(&self) -> Components {
        let schemas = self
            .all()
            .iter()
            .map(|meta| {
                (
                    meta.qualified_name().to_string(),
                    ModelSchema::from_metadata(meta),
                )
            })
            .collect();
        Components { schemas }
    }
}
