//! Offline rendering of `ThanosRuler` manifests.

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value as Json;

use crate::error::Result;
use crate::schema::ResourceSchema;
use crate::thanos_ruler::manifest_schema;
use crate::thanos_ruler::state::decode_envelope;
use crate::thanos_ruler::ResourceMetadata;
use crate::thanos_ruler::ThanosRulerResourceData;
use crate::thanos_ruler::ThanosRulerSpec;
use crate::DataSource;

/// Data source producing the YAML of a `ThanosRuler` without talking to a cluster.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThanosRulerManifest;

/// Configuration and result of [ThanosRulerManifest].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThanosRulerManifestData {
    pub id: Option<String>,
    pub yaml: Option<String>,
    pub metadata: ResourceMetadata,
    pub spec: Option<ThanosRulerSpec>,
}

impl ThanosRulerManifestData {
    /// Decodes a provider-shaped configuration, validating it against the manifest schema.
    pub fn from_config(config: &Json) -> Result<Self> {
        let schema = manifest_schema();
        schema.validate(config).into_result()?;

        let empty = Map::new();
        let (metadata, spec) = decode_envelope(schema, config.as_object().unwrap_or(&empty))?;
        Ok(Self {
            id: None,
            yaml: None,
            metadata,
            spec,
        })
    }
}

impl ThanosRulerManifest {
    /// Renders the object exactly as it would be applied, provider bookkeeping excluded.
    pub fn render(metadata: &ResourceMetadata, spec: Option<&ThanosRulerSpec>) -> Result<String> {
        let mut object = ThanosRulerResourceData::new(&metadata.namespace, &metadata.name);
        object.metadata = metadata.clone();
        object.spec = spec.cloned();

        Ok(serde_yaml::to_string(&object)?)
    }
}

#[async_trait]
impl DataSource for ThanosRulerManifest {
    type Data = ThanosRulerManifestData;

    fn metadata(&self, provider_type_name: &str) -> String {
        format!("{provider_type_name}_monitoring_coreos_com_thanos_ruler_v1_manifest")
    }

    fn schema(&self) -> &'static ResourceSchema {
        manifest_schema()
    }

    async fn read(&self, mut config: ThanosRulerManifestData) -> Result<ThanosRulerManifestData> {
        let yaml = Self::render(&config.metadata, config.spec.as_ref())?;
        log::debug!(name = config.metadata.name.as_str(), namespace = config.metadata.namespace.as_str(); "Rendered manifest");

        config.id = Some(format!("{}/{}", config.metadata.namespace, config.metadata.name));
        config.yaml = Some(yaml);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_metadata_type_name() {
        assert_eq!(
            ThanosRulerManifest.metadata("k8s"),
            "k8s_monitoring_coreos_com_thanos_ruler_v1_manifest"
        );
    }

    #[tokio::test]
    async fn test_read_renders_yaml() {
        // Given: A manifest configuration in provider shape
        let config = ThanosRulerManifestData::from_config(&json!({
            "metadata": {"name": "ruler", "namespace": "monitoring"},
            "spec": {"replicas": 2, "alert_drop_labels": ["replica"]},
        }))
        .unwrap();

        // When: Reading the data source
        let data = ThanosRulerManifest.read(config).await.unwrap();

        // Then: The YAML is the Kubernetes object and the id is set
        assert_eq!(data.id.as_deref(), Some("monitoring/ruler"));
        let rendered: serde_yaml::Value = serde_yaml::from_str(data.yaml.as_deref().unwrap()).unwrap();
        let expected: serde_yaml::Value = serde_yaml::from_str(
            r#"
apiVersion: monitoring.coreos.com/v1
kind: ThanosRuler
metadata:
  name: ruler
  namespace: monitoring
spec:
  alertDropLabels:
    - replica
  replicas: 2
"#,
        )
        .unwrap();
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_bookkeeping_attributes_are_not_accepted() {
        // Given: A manifest configuration with a resource-only attribute
        let result = ThanosRulerManifestData::from_config(&json!({
            "metadata": {"name": "ruler", "namespace": "monitoring"},
            "field_manager": "me",
        }));

        // Then: Validation rejects it
        assert!(result.is_err());
    }

    #[test]
    fn test_render_without_spec() {
        let metadata = ResourceMetadata {
            name: "ruler".to_string(),
            namespace: "monitoring".to_string(),
            ..Default::default()
        };

        let yaml = ThanosRulerManifest::render(&metadata, None).unwrap();

        assert!(yaml.contains("kind: ThanosRuler"));
        assert!(!yaml.contains("spec"));
    }
}
