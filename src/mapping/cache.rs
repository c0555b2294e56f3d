//! Process-wide cache of resolved binding metadata.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::declare::Mapped;
use super::metadata::BindingMetadata;
use crate::error::Result;

/// Resolved metadata keyed by target type.
///
/// Only successful resolutions are stored. A type that fails to resolve
/// fails again on the next lookup.
#[derive(Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl MetadataCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the metadata for `T`, resolving it on first use.
    pub fn get_or_resolve<T: Mapped>(&self) -> Result<Arc<BindingMetadata<T>>> {
        if let Some(found) = self.get::<T>() {
            return Ok(found);
        }

        let resolved = Arc::new(BindingMetadata::<T>::resolve()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have resolved T while the lock was released.
        let entry = entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::clone(&resolved) as Arc<dyn Any + Send + Sync>);
        Ok(Arc::clone(entry)
            .downcast::<BindingMetadata<T>>()
            .unwrap_or(resolved))
    }

    /// Get the metadata for `T` if it has been resolved.
    pub fn get<T: Mapped>(&self) -> Option<Arc<BindingMetadata<T>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| Arc::clone(entry).downcast::<BindingMetadata<T>>().ok())
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.len())
            .finish()
    }
}
