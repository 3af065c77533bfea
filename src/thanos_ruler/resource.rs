use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use kube::api::DeleteParams;
use kube::api::DynamicObject;
use kube::api::PatchParams;
use serde::Deserialize;

use super::api_resource;
use super::schema::resource_schema;
use super::types::ResourceMetadata;
use super::types::ThanosRulerResourceData;
use super::types::ThanosRulerSpec;
use super::types::API_VERSION;
use super::types::KIND;
use super::DeletionPropagation;
use crate::diagnostics::Diagnostic;
use crate::diagnostics::Diagnostics;
use crate::error::is_not_found;
use crate::error::Error;
use crate::error::Result;
use crate::k8s::DynamicClient;
use crate::provider::ProviderData;
use crate::provider::DEFAULT_FIELD_MANAGER;
use crate::schema::ResourceSchema;
use crate::value::Value;
use crate::wait;
use crate::Resource;

/// Manages one `ThanosRuler` object per resource instance through server-side apply.
pub struct ThanosRulerResource {
    client: Option<Arc<dyn DynamicClient>>,
    field_manager: String,
    force_conflicts: bool,
}

impl Default for ThanosRulerResource {
    fn default() -> Self {
        Self {
            client: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_owned(),
            force_conflicts: false,
        }
    }
}

/// The parts of a server response the provider keeps.
#[derive(Deserialize)]
struct ServerObject {
    metadata: ResourceMetadata,
    #[serde(default)]
    spec: Option<ThanosRulerSpec>,
}

impl ThanosRulerResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Arc<dyn DynamicClient>> {
        self.client.as_ref().ok_or(Error::Unconfigured)
    }

    fn patch_params(&self, data: &ThanosRulerResourceData) -> PatchParams {
        let field_manager = data.field_manager.or_default_from(&self.field_manager);
        let params = PatchParams::apply(&field_manager).validation_strict();
        if data.force_conflicts.or_default_from(&self.force_conflicts) {
            params.force()
        } else {
            params
        }
    }

    /// Applies the record and copies the persisted `metadata` and `spec` back into it.
    async fn apply(&self, mut data: ThanosRulerResourceData) -> Result<ThanosRulerResourceData> {
        let client = self.client()?;
        data.api_version = API_VERSION.to_owned();
        data.kind = KIND.to_owned();

        let payload = serde_json::to_value(&data).map_err(Error::Marshal)?;
        let params = self.patch_params(&data);
        let (namespace, name) = (data.metadata.namespace.clone(), data.metadata.name.clone());

        log::debug!(name = name.as_str(), namespace = namespace.as_str(); "Applying ThanosRuler");
        let object = client
            .apply(&api_resource(), &namespace, &name, &payload, &params)
            .await
            .map_err(|source| Error::Apply {
                name: name.clone(),
                namespace: namespace.clone(),
                source,
            })?;

        overwrite_from_server(&mut data, object)?;
        Ok(data)
    }
}

fn overwrite_from_server(data: &mut ThanosRulerResourceData, object: DynamicObject) -> Result<()> {
    let object = serde_json::to_value(object).map_err(Error::Unmarshal)?;
    let object: ServerObject = serde_json::from_value(object).map_err(Error::Unmarshal)?;
    data.metadata = object.metadata;
    data.spec = object.spec;
    Ok(())
}

fn deletion_propagation(value: &Value<String>) -> Result<Option<DeletionPropagation>> {
    let Some(value) = value.known() else {
        return Ok(None);
    };

    DeletionPropagation::from_str(value).map(Some).map_err(|_| {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(
            Diagnostic::error(
                "Invalid Attribute Value",
                format!("value must be one of: [\"Orphan\" \"Background\" \"Foreground\"], got: \"{value}\""),
            )
            .at("deletion_propagation"),
        );
        Error::InvalidConfiguration(diagnostics)
    })
}

#[async_trait]
impl Resource for ThanosRulerResource {
    type Data = ThanosRulerResourceData;

    fn metadata(&self, provider_type_name: &str) -> String {
        format!("{provider_type_name}_monitoring_coreos_com_thanos_ruler_v1")
    }

    fn schema(&self) -> &'static ResourceSchema {
        resource_schema()
    }

    fn configure(&mut self, provider_data: Option<&(dyn Any + Send + Sync)>) -> Result<()> {
        let Some(provider_data) = provider_data else {
            return Ok(());
        };
        let Some(provider_data) = provider_data.downcast_ref::<ProviderData>() else {
            return Err(Error::UnexpectedProviderData(format!("{:?}", provider_data.type_id())));
        };
        if provider_data.offline {
            return Err(Error::ProviderOffline);
        }

        self.client = provider_data.client.clone();
        self.field_manager = provider_data.field_manager.clone();
        self.force_conflicts = provider_data.force_conflicts;
        Ok(())
    }

    async fn create(&self, mut plan: ThanosRulerResourceData) -> Result<ThanosRulerResourceData> {
        plan.id = Value::Known(plan.object_id());

        let mut state = self.apply(plan).await?;
        state.resolve_unknowns();

        log::info!(id = state.object_id().as_str(); "Created ThanosRuler");
        Ok(state)
    }

    async fn read(&self, mut state: ThanosRulerResourceData) -> Result<ThanosRulerResourceData> {
        let client = self.client()?;
        let (namespace, name) = (state.metadata.namespace.clone(), state.metadata.name.clone());

        let object = client
            .get(&api_resource(), &namespace, &name)
            .await
            .map_err(|source| Error::Get {
                name: name.clone(),
                namespace: namespace.clone(),
                source,
            })?;

        overwrite_from_server(&mut state, object)?;
        state.id = Value::Known(state.object_id());
        state.resolve_unknowns();
        Ok(state)
    }

    async fn update(&self, plan: ThanosRulerResourceData) -> Result<ThanosRulerResourceData> {
        let state = self.apply(plan).await?;

        log::info!(id = state.object_id().as_str(); "Updated ThanosRuler");
        Ok(state)
    }

    async fn delete(&self, state: ThanosRulerResourceData) -> Result<()> {
        let client = self.client()?;
        let (namespace, name) = (&state.metadata.namespace, &state.metadata.name);

        let params = DeleteParams {
            propagation_policy: deletion_propagation(&state.deletion_propagation)?.map(Into::into),
            ..Default::default()
        };

        match client.delete(&api_resource(), namespace, name, &params).await {
            Ok(()) => {}
            Err(error) if is_not_found(&error) => {
                log::debug!(name = name.as_str(), namespace = namespace.as_str(); "ThanosRuler already gone");
                return Ok(());
            }
            Err(source) => {
                return Err(Error::Delete {
                    name: name.clone(),
                    namespace: namespace.clone(),
                    source,
                });
            }
        }

        if let Some(wait_for_delete) = state.wait_for_delete.known() {
            wait::until_deleted(&**client, &api_resource(), namespace, name, wait_for_delete).await?;
        }

        log::info!(name = name.as_str(), namespace = namespace.as_str(); "Deleted ThanosRuler");
        Ok(())
    }

    fn import_state(&self, id: &str) -> Result<ThanosRulerResourceData> {
        let parts: Vec<&str> = id.split('/').collect();
        let [namespace, name] = parts[..] else {
            return Err(Error::UnexpectedImportIdentifier(id.to_owned()));
        };
        if namespace.is_empty() || name.is_empty() {
            return Err(Error::UnexpectedImportIdentifier(id.to_owned()));
        }

        let mut state = ThanosRulerResourceData::new(namespace, name);
        state.id = Value::Known(id.to_owned());
        Ok(state)
    }
}
