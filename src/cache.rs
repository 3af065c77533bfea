//! Per-namespace caching of dynamic [Api] handles.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use kube::api::DynamicObject;
use kube::core::ApiResource;
use kube::Api;
use kube::Client;

/// Abstraction for obtaining dynamic [Api] instances for a resource type in a namespace.
pub trait ProvideApi: Send + Sync {
    fn get(&self, resource: &ApiResource, namespace: &str) -> Arc<Api<DynamicObject>>;
}

/// Lazily creates one [Api] per resource type and namespace and keeps it around.
///
/// Cache hits only take a read lock and clone an [Arc]. Lock poisoning is ignored as the cached
/// values are never left half-written.
pub struct CachedApiProvider {
    client: Client,
    cache: RwLock<HashMap<CacheKey, Arc<Api<DynamicObject>>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    api_version: String,
    plural: String,
    namespace: String,
}

impl CacheKey {
    fn new(resource: &ApiResource, namespace: &str) -> Self {
        Self {
            api_version: resource.api_version.clone(),
            plural: resource.plural.clone(),
            namespace: namespace.to_owned(),
        }
    }
}

impl CachedApiProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

impl ProvideApi for CachedApiProvider {
    fn get(&self, resource: &ApiResource, namespace: &str) -> Arc<Api<DynamicObject>> {
        let key = CacheKey::new(resource, namespace);

        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(api) = cache.get(&key) {
                return Arc::clone(api);
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have filled the slot while we waited for the write lock
        if let Some(api) = cache.get(&key) {
            return Arc::clone(api);
        }

        let api = Arc::new(Api::<DynamicObject>::namespaced_with(
            self.client.clone(),
            namespace,
            resource,
        ));
        cache.insert(key, Arc::clone(&api));

        api
    }
}
