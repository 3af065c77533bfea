//! The minimal Kubernetes surface the resource lifecycle needs.
//!
//! Lifecycle handlers only ever get, apply and delete a single namespaced object addressed by
//! its [ApiResource]. [DynamicClient] captures exactly that, so tests can swap the cluster for an
//! in-memory implementation and [K8sClient] stays a thin layer over `kube`.

use std::sync::Arc;

use async_trait::async_trait;
use kube::api::DeleteParams;
use kube::api::DynamicObject;
use kube::api::Patch;
use kube::api::PatchParams;
use kube::core::ApiResource;
use kube::Client;

use crate::cache::CachedApiProvider;
use crate::cache::ProvideApi;

/// Namespaced get, server-side apply and delete against any resource type.
#[async_trait]
pub trait DynamicClient: Send + Sync {
    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> kube::Result<DynamicObject>;

    /// Sends `patch` as an apply patch and returns the object the server persisted.
    async fn apply(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
        params: &PatchParams,
    ) -> kube::Result<DynamicObject>;

    async fn delete(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        params: &DeleteParams,
    ) -> kube::Result<()>;
}

/// [DynamicClient] backed by a real cluster connection.
pub struct K8sClient<P = CachedApiProvider>
where
    P: ProvideApi,
{
    api_provider: P,
}

impl K8sClient<CachedApiProvider> {
    pub fn new(client: Client) -> Self {
        Self::with_api_provider(CachedApiProvider::new(client))
    }
}

impl<P> K8sClient<P>
where
    P: ProvideApi,
{
    pub fn with_api_provider(api_provider: P) -> Self {
        K8sClient { api_provider }
    }

    pub fn into_shared(self) -> Arc<dyn DynamicClient>
    where
        P: 'static,
    {
        Arc::new(self)
    }
}

#[async_trait]
impl<P> DynamicClient for K8sClient<P>
where
    P: ProvideApi,
{
    #[tracing::instrument(skip(self, resource), fields(kind = %resource.kind))]
    async fn get(&self, resource: &ApiResource, namespace: &str, name: &str) -> kube::Result<DynamicObject> {
        self.api_provider.get(resource, namespace).get(name).await
    }

    #[tracing::instrument(
        skip(self, resource, patch, params),
        fields(
            kind = %resource.kind,
            field_manager = ?params.field_manager,
            force = params.force,
        )
    )]
    async fn apply(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
        params: &PatchParams,
    ) -> kube::Result<DynamicObject> {
        self.api_provider
            .get(resource, namespace)
            .patch(name, params, &Patch::Apply(patch))
            .await
    }

    #[tracing::instrument(skip(self, resource, params), fields(kind = %resource.kind))]
    async fn delete(
        &self,
        resource: &ApiResource,
        namespace: &str,
        name: &str,
        params: &DeleteParams,
    ) -> kube::Result<()> {
        self.api_provider
            .get(resource, namespace)
            .delete(name, params)
            .await?
            .map_left(|object| {
                log::debug!(name = name, namespace = namespace; "Deletion of {:?} in progress", object.metadata.deletion_timestamp);
            })
            .map_right(|status| {
                log::debug!(name = name, namespace = namespace; "Deleted: {:?}", status.status);
            });

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::json;

    use crate::error::tests::api_error;

    /// A call observed by [MockClient]
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Get(String, String),
        Apply {
            namespace: String,
            name: String,
            patch: serde_json::Value,
            field_manager: Option<String>,
            force: bool,
        },
        Delete {
            namespace: String,
            name: String,
            propagation: Option<String>,
        },
    }

    /// In-memory cluster: applies merge the payload into a stored object, gets return it, deletes
    /// either remove it or leave it in place (to simulate finalizers).
    #[derive(Clone, Default)]
    pub struct MockClient {
        pub objects: Arc<Mutex<HashMap<(String, String), serde_json::Value>>>,
        pub calls: Arc<Mutex<Vec<Call>>>,
        /// Fields the "server" adds to every applied spec
        pub server_defaults: Arc<Mutex<serde_json::Map<String, serde_json::Value>>>,
        pub keep_on_delete: bool,
        pub fail_apply: Option<u16>,
        pub fail_delete: Option<u16>,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_object(self, namespace: &str, name: &str, object: serde_json::Value) -> Self {
            self.objects
                .lock()
                .unwrap()
                .insert((namespace.to_string(), name.to_string()), object);
            self
        }

        pub fn with_server_default(self, key: &str, value: serde_json::Value) -> Self {
            self.server_defaults.lock().unwrap().insert(key.to_string(), value);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn get_count(&self) -> usize {
            self.calls().iter().filter(|c| matches!(c, Call::Get(..))).count()
        }
    }

    fn to_dynamic(value: serde_json::Value) -> kube::Result<DynamicObject> {
        serde_json::from_value(value).map_err(kube::Error::SerdeError)
    }

    #[async_trait]
    impl DynamicClient for MockClient {
        async fn get(&self, _resource: &ApiResource, namespace: &str, name: &str) -> kube::Result<DynamicObject> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Get(namespace.to_string(), name.to_string()));
            let object = self
                .objects
                .lock()
                .unwrap()
                .get(&(namespace.to_string(), name.to_string()))
                .cloned();
            match object {
                Some(object) => to_dynamic(object),
                None => Err(api_error(404, "NotFound")),
            }
        }

        async fn apply(
            &self,
            _resource: &ApiResource,
            namespace: &str,
            name: &str,
            patch: &serde_json::Value,
            params: &PatchParams,
        ) -> kube::Result<DynamicObject> {
            self.calls.lock().unwrap().push(Call::Apply {
                namespace: namespace.to_string(),
                name: name.to_string(),
                patch: patch.clone(),
                field_manager: params.field_manager.clone(),
                force: params.force,
            });
            if let Some(code) = self.fail_apply {
                return Err(api_error(code, "Conflict"));
            }

            let mut stored = patch.clone();
            stored["metadata"]["uid"] = json!("4f1c2a9e-0000-4000-8000-000000000001");
            stored["metadata"]["resourceVersion"] = json!("1");
            let defaults = self.server_defaults.lock().unwrap().clone();
            if !defaults.is_empty() {
                if !stored["spec"].is_object() {
                    stored["spec"] = json!({});
                }
                for (key, value) in defaults {
                    if stored["spec"].get(&key).is_none() {
                        stored["spec"][key] = value;
                    }
                }
            }
            self.objects
                .lock()
                .unwrap()
                .insert((namespace.to_string(), name.to_string()), stored.clone());

            to_dynamic(stored)
        }

        async fn delete(
            &self,
            _resource: &ApiResource,
            namespace: &str,
            name: &str,
            params: &DeleteParams,
        ) -> kube::Result<()> {
            self.calls.lock().unwrap().push(Call::Delete {
                namespace: namespace.to_string(),
                name: name.to_string(),
                propagation: params.propagation_policy.as_ref().map(|p| format!("{p:?}")),
            });
            if let Some(code) = self.fail_delete {
                return Err(api_error(code, "Failure"));
            }

            let key = (namespace.to_string(), name.to_string());
            let mut objects = self.objects.lock().unwrap();
            if !objects.contains_key(&key) {
                return Err(api_error(404, "NotFound"));
            }
            if !self.keep_on_delete {
                objects.remove(&key);
            }

            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mock_client_apply_then_get() {
        // Given: An empty mock cluster
        let client = MockClient::new().with_server_default("replicas", json!(1));
        let resource = crate::thanos_ruler::api_resource();

        // When: Applying and reading back an object
        client
            .apply(
                &resource,
                "monitoring",
                "ruler",
                &json!({
                    "apiVersion": "monitoring.coreos.com/v1",
                    "kind": "ThanosRuler",
                    "metadata": {"name": "ruler", "namespace": "monitoring"},
                }),
                &PatchParams::apply("test"),
            )
            .await
            .unwrap();
        let object = client.get(&resource, "monitoring", "ruler").await.unwrap();

        // Then: The stored object carries server-side additions
        assert_eq!(object.metadata.resource_version.as_deref(), Some("1"));
        assert_eq!(object.data["spec"]["replicas"], json!(1));
        assert_eq!(client.get_count(), 1);
    }
}
