//! Provider-wide configuration shared by every resource instance.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use kube::config::KubeConfigOptions;
use kube::config::Kubeconfig;
use kube::Client;
use kube::Config;
use serde::Deserialize;

use crate::error::Result;
use crate::k8s::DynamicClient;
use crate::k8s::K8sClient;

pub const DEFAULT_FIELD_MANAGER: &str = "terraform-provider-k8s";

/// User facing provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Path to a kubeconfig file, the default client inference is used when absent
    pub kubeconfig: Option<PathBuf>,
    /// Context of the kubeconfig to use
    pub context: Option<String>,
    pub field_manager: Option<String>,
    pub force_conflicts: Option<bool>,
    /// Only render manifests, never talk to a cluster
    pub offline: Option<bool>,
}

/// What the provider hands to each resource at configure time.
#[derive(Clone)]
pub struct ProviderData {
    pub client: Option<Arc<dyn DynamicClient>>,
    pub field_manager: String,
    pub force_conflicts: bool,
    pub offline: bool,
}

impl fmt::Debug for ProviderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderData")
            .field("client", &self.client.as_ref().map(|_| "DynamicClient"))
            .field("field_manager", &self.field_manager)
            .field("force_conflicts", &self.force_conflicts)
            .field("offline", &self.offline)
            .finish()
    }
}

impl ProviderData {
    pub fn online(client: Arc<dyn DynamicClient>, field_manager: impl Into<String>, force_conflicts: bool) -> Self {
        Self {
            client: Some(client),
            field_manager: field_manager.into(),
            force_conflicts,
            offline: false,
        }
    }

    pub fn offline(field_manager: impl Into<String>, force_conflicts: bool) -> Self {
        Self {
            client: None,
            field_manager: field_manager.into(),
            force_conflicts,
            offline: true,
        }
    }

    /// Builds provider data from configuration, connecting to the cluster unless offline.
    pub async fn from_config(config: &ProviderConfig) -> Result<Self> {
        let field_manager = config
            .field_manager
            .clone()
            .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.to_owned());
        let force_conflicts = config.force_conflicts.unwrap_or(false);

        if config.offline.unwrap_or(false) {
            log::info!("Provider configured in offline mode");
            return Ok(Self::offline(field_manager, force_conflicts));
        }

        let client = create_client(config).await?;
        log::info!(field_manager = field_manager.as_str(), force_conflicts = force_conflicts; "Provider configured");

        Ok(Self::online(K8sClient::new(client).into_shared(), field_manager, force_conflicts))
    }
}

async fn create_client(config: &ProviderConfig) -> Result<Client> {
    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..Default::default()
    };

    let kube_config = match (&config.kubeconfig, &config.context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context("failed to load kubeconfig")?
        }
        (None, Some(context)) => Config::from_kubeconfig(&options)
            .await
            .with_context(|| format!("failed to load kubeconfig context {context}"))?,
        (None, None) => Config::infer()
            .await
            .context("failed to infer Kubernetes configuration")?,
    };

    Ok(Client::try_from(kube_config)?)
}
