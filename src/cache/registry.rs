//! Cache registry - central lookup for named caches.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{CacheConfig, TypedCache};

/// Registry of caches keyed by name.
///
/// Repositories and the permission checker ask for their cache by name,
/// so two components asking for `"chat_settings"` share one cache.
#[derive(Clone, Default)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cache registered under `name`, creating it with `config` if absent.
    ///
    /// # Panics
    /// Panics if `name` is already registered with different key/value types.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            return match existing.downcast_ref::<TypedCache<K, V>>() {
                Some(cache) => cache.clone(),
                None => panic!(
                    "Cache '{}' already exists with different types than {}",
                    name,
                    std::any::type_name::<TypedCache<K, V>>()
                ),
            };
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::new(name, config);
        caches.insert(name.to_string(), Box::new(cache.clone()));
        cache
    }

    pub fn len(&self) -> usize {
        self.caches.read().len()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}
