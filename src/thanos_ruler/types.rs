//! Typed model of the `monitoring.coreos.com/v1` `ThanosRuler` custom resource.
//!
//! Core Kubernetes building blocks (containers, affinity, volumes, ...) reuse the `k8s-openapi`
//! types, only the prometheus-operator specific parts are declared here. The CRD schema derived
//! from these types feeds the provider attribute schema.

use std::collections::BTreeMap;
use std::time::Duration;

use k8s_openapi::api::core::v1::Affinity;
use k8s_openapi::api::core::v1::ConfigMapKeySelector;
use k8s_openapi::api::core::v1::Container;
use k8s_openapi::api::core::v1::EmptyDirVolumeSource;
use k8s_openapi::api::core::v1::EphemeralVolumeSource;
use k8s_openapi::api::core::v1::HostAlias;
use k8s_openapi::api::core::v1::LocalObjectReference;
use k8s_openapi::api::core::v1::PersistentVolumeClaimSpec;
use k8s_openapi::api::core::v1::PodDNSConfig;
use k8s_openapi::api::core::v1::PodSecurityContext;
use k8s_openapi::api::core::v1::ResourceRequirements;
use k8s_openapi::api::core::v1::SecretKeySelector;
use k8s_openapi::api::core::v1::Toleration;
use k8s_openapi::api::core::v1::TopologySpreadConstraint;
use k8s_openapi::api::core::v1::Volume;
use k8s_openapi::api::core::v1::VolumeMount;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::gen::SchemaGenerator;
use schemars::schema::InstanceType;
use schemars::schema::Schema;
use schemars::schema::SchemaObject;
use schemars::schema::StringValidation;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::value::Value;

pub const API_VERSION: &str = "monitoring.coreos.com/v1";
pub const KIND: &str = "ThanosRuler";

/// Prometheus style duration, e.g. `1h30m` or `0`.
pub const DURATION_PATTERN: &str =
    r"^(0|(([0-9]+)y)?(([0-9]+)w)?(([0-9]+)d)?(([0-9]+)h)?(([0-9]+)m)?(([0-9]+)s)?(([0-9]+)ms)?)$";

const DEFAULT_WAIT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_WAIT_POLL_INTERVAL_SECONDS: u64 = 5;

fn duration_schema(_: &mut SchemaGenerator) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        string: Some(Box::new(StringValidation {
            pattern: Some(DURATION_PATTERN.to_owned()),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

/// ThanosRuler defines a ThanosRuler deployment.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "monitoring.coreos.com",
    version = "v1",
    kind = "ThanosRuler",
    plural = "thanosrulers",
    shortname = "ruler",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ThanosRulerSpec {
    /// AdditionalArgs allows setting additional arguments for the ThanosRuler container. It is
    /// intended for e.g. activating hidden flags which are not supported by the dedicated
    /// configuration options yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_args: Option<Vec<Argument>>,
    /// If specified, the pod's scheduling constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,
    /// Configures the label names which should be dropped in Thanos Ruler alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_drop_labels: Option<Vec<String>>,
    /// The external Query URL the Thanos Ruler will set in the 'Source' field of all alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_query_url: Option<String>,
    /// Configures the path to the alert relabeling configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_relabel_config_file: Option<String>,
    /// Configures alert relabeling in Thanos Ruler, the relabel configuration is read from the
    /// referenced secret key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_relabel_configs: Option<SecretKeySelector>,
    /// Configures the list of Alertmanager endpoints to send alerts to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertmanagers_config: Option<SecretKeySelector>,
    /// Defines the list of Alertmanager endpoints to send alerts to. Used when
    /// `alertmanagersConfig` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertmanagers_url: Option<Vec<String>>,
    /// Containers allows injecting additional containers or modifying operator generated
    /// containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<Container>>,
    /// Defines the DNS configuration for the pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_config: Option<PodDNSConfig>,
    /// Defines the DNS policy for the pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_policy: Option<DnsPolicy>,
    /// Thanos features to enable, e.g. `promql-experimental-functions`. Enabling features the
    /// operator does not know about may break the deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_features: Option<Vec<String>>,
    /// Indicates whether information about services should be injected into pod's environment
    /// variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_service_links: Option<bool>,
    /// Enforces adding a namespace label of origin for each alert and metric that is user
    /// created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforced_namespace_label: Option<String>,
    /// Interval between consecutive evaluations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub evaluation_interval: Option<String>,
    /// List of references to PrometheusRule objects to be excluded from enforcing a namespace
    /// label of origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_from_enforcement: Option<Vec<ExcludedObjectReference>>,
    /// The external URL the Thanos Ruler instances will be available under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_prefix: Option<String>,
    /// GRPCServerTLSConfig configures the gRPC server from which Thanos Querier reads recorded
    /// rule data.
    #[serde(default, rename = "grpcServerTlsConfig", skip_serializing_if = "Option::is_none")]
    pub grpc_server_tls_config: Option<TlsConfig>,
    /// Pods' hostAliases configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_aliases: Option<Vec<HostAlias>>,
    /// Use the host's user namespace when set to true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_users: Option<bool>,
    /// Thanos container image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Image pull policy for the 'thanos', 'init-config-reloader' and 'config-reloader'
    /// containers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<ImagePullPolicy>,
    /// An optional list of references to secrets in the same namespace to use for pulling
    /// thanos images from registries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Vec<LocalObjectReference>>,
    /// InitContainers allows adding initContainers to the pod definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<Container>>,
    /// Configures the external label pairs of the ThanosRuler resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    /// ListenLocal makes the Thanos ruler listen on loopback, so that it does not bind against
    /// the Pod IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_local: Option<bool>,
    /// Log format for ThanosRuler to be configured with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
    /// Log level for ThanosRuler to be configured with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
    /// Minimum number of seconds for which a newly created pod should be ready without any of
    /// its container crashing for it to be considered available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<u32>,
    /// Define which Nodes the Pods are scheduled on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
    /// Configures object storage, read from the referenced secret key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_storage_config: Option<SecretKeySelector>,
    /// Configures the path of the object storage configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_storage_config_file: Option<String>,
    /// When a ThanosRuler deployment is paused, no actions except for deletion will be
    /// performed on the underlying objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    /// PodMetadata configures labels and annotations which are propagated to the ThanosRuler
    /// pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_metadata: Option<EmbeddedObjectMetadata>,
    /// Port name used for the pods and governing service. Defaults to 'web'.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_name: Option<String>,
    /// Priority class assigned to the Pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
    /// PrometheusRulesExcludedFromEnforce - list of Prometheus rules to be excluded from
    /// enforcing of adding namespace labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prometheus_rules_excluded_from_enforce: Option<Vec<PrometheusRuleExcludeConfig>>,
    /// Configures the list of Thanos Query endpoints from which to query metrics, read from
    /// the referenced secret key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_config: Option<SecretKeySelector>,
    /// Configures the list of Thanos Query endpoints from which to query metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_endpoints: Option<Vec<String>>,
    /// Number of thanos ruler instances to deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Minimum amount of time to wait before resending an alert to Alertmanager.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub resend_delay: Option<String>,
    /// Remote write endpoints the Thanos Ruler runs in stateless mode against. When set, rule
    /// results are pushed instead of being stored locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_write: Option<Vec<RemoteWriteSpec>>,
    /// Resources defines the resource requirements for single Pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    /// Time duration ThanosRuler shall retain data for. Default is '24h'.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub retention: Option<String>,
    /// The route prefix ThanosRuler registers HTTP handlers for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<String>,
    /// How many rules can be evaluated concurrently.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_concurrent_eval: Option<u32>,
    /// Minimum duration between alert and restored 'for' state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub rule_grace_period: Option<String>,
    /// Namespaces to be selected for Rules discovery. If unspecified, only the same namespace
    /// as the ThanosRuler object is in is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_namespace_selector: Option<LabelSelector>,
    /// Max time to tolerate prometheus outage for restoring 'for' state of alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub rule_outage_tolerance: Option<String>,
    /// The default rule group's query offset duration to use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub rule_query_offset: Option<String>,
    /// PrometheusRule objects to be selected for rule evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_selector: Option<LabelSelector>,
    /// SecurityContext holds pod-level security attributes and common container settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,
    /// ServiceAccountName is the name of the ServiceAccount to use to run the Thanos Ruler
    /// Pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    /// The name of the service name used by the underlying StatefulSet(s) as the governing
    /// service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Storage spec to specify how storage shall be used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,
    /// Optional duration in seconds the pod needs to terminate gracefully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<u64>,
    /// If specified, the pod's tolerations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,
    /// If specified, the pod's topology spread constraints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_spread_constraints: Option<Vec<TopologySpreadConstraint>>,
    /// Configures tracing, read from the referenced secret key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracing_config: Option<SecretKeySelector>,
    /// Configures the path of the tracing configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracing_config_file: Option<String>,
    /// Version of Thanos to be deployed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// VolumeMounts allows configuration of additional VolumeMounts on the output StatefulSet
    /// definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,
    /// Volumes allows configuration of additional volumes on the output StatefulSet
    /// definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Volume>>,
    /// Defines the configuration of the ThanosRuler web server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<ThanosRulerWebSpec>,
}

/// A command line argument passed to the Thanos container.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct Argument {
    /// Name of the argument, e.g. 'scrape.discovery-reload-interval'.
    #[schemars(length(min = 1))]
    pub name: String,
    /// Argument value, e.g. 30s. Can be empty for name-only arguments (e.g. --storage.tsdb.no-lockfile)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum DnsPolicy {
    ClusterFirstWithHostNet,
    ClusterFirst,
    Default,
    None,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ImagePullPolicy {
    #[serde(rename = "")]
    Unset,
    Always,
    Never,
    IfNotPresent,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[serde(rename = "")]
    Unset,
    Logfmt,
    Json,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(rename = "")]
    Unset,
    Debug,
    Info,
    Warn,
    Error,
}

/// Reference to a namespaced object excluded from namespace label enforcement.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct ExcludedObjectReference {
    /// Group of the referent. When not specified, it defaults to 'monitoring.coreos.com'
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Name of the referent. When not set, all resources in the namespace are matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Namespace of the referent.
    #[schemars(length(min = 1))]
    pub namespace: String,
    /// Resource of the referent.
    pub resource: RuleResource,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleResource {
    #[default]
    PrometheusRules,
    ServiceMonitors,
    PodMonitors,
    Probes,
    ScrapeConfigs,
}

/// PrometheusRuleExcludeConfig enables users to configure excluded PrometheusRule names and
/// their namespaces to be ignored while enforcing namespace label for alerts and metrics.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusRuleExcludeConfig {
    /// Name of the excluded PrometheusRule object.
    pub rule_name: String,
    /// Namespace of the excluded PrometheusRule object.
    pub rule_namespace: String,
}

/// Metadata that is propagated to generated objects such as pods and volume claims.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct EmbeddedObjectMetadata {
    /// Annotations is an unstructured key value map stored with a resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    /// Map of string keys and values that can be used to organize and categorize objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    /// Name must be unique within a namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// StorageSpec defines the configured storage for a group Prometheus servers.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// Deprecated: subPath usage will be removed in a future release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_mount_sub_path: Option<bool>,
    /// EmptyDirVolumeSource to be used by the StatefulSet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirVolumeSource>,
    /// EphemeralVolumeSource to be used by the StatefulSet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<EphemeralVolumeSource>,
    /// Defines the PVC spec to be used by the Prometheus StatefulSets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_claim_template: Option<EmbeddedPersistentVolumeClaim>,
}

/// PersistentVolumeClaim template embedded into a [StorageSpec].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedPersistentVolumeClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// EmbeddedMetadata contains metadata relevant to an EmbeddedResource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EmbeddedObjectMetadata>,
    /// Defines the desired characteristics of a volume requested by a pod author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<PersistentVolumeClaimSpec>,
}

/// Either a Secret or a ConfigMap key holding TLS material.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretOrConfigMap {
    /// ConfigMap containing data to use for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapKeySelector>,
    /// Secret containing data to use for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretKeySelector>,
}

/// TLS client configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    /// Certificate authority used when verifying server certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<SecretOrConfigMap>,
    /// Path to the CA cert in the Prometheus container to use for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<String>,
    /// Client certificate to present when doing client-authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<SecretOrConfigMap>,
    /// Path to the client cert file in the Prometheus container for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    /// Disable target certificate validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_verify: Option<bool>,
    /// Path to the client key file in the Prometheus container for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    /// Secret containing the client key file for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<SecretKeySelector>,
    /// Used to verify the hostname for the targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// A remote write endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteWriteSpec {
    /// The URL of the endpoint to send samples to.
    #[schemars(length(min = 1))]
    pub url: String,
    /// The name of the remote write queue, it must be unique if specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Timeout for requests to the remote write endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub remote_timeout: Option<String>,
    /// Custom HTTP headers to be sent along with each remote write request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Enables sending of exemplars over remote write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_exemplars: Option<bool>,
    /// Enables sending of native histograms over remote write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_native_histograms: Option<bool>,
    /// BasicAuth configuration for the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,
    /// Authorization section for the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
    /// TLS configuration to use for the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
    /// Optional proxy URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// Whether HTTP requests follow HTTP 3xx redirects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_redirects: Option<bool>,
    /// Whether to enable HTTP2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_http2: Option<bool>,
    /// Tuning of the remote write queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_config: Option<QueueConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct BasicAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<SecretKeySelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretKeySelector>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct Authorization {
    /// Authentication type, defaults to `Bearer`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    /// Secret key holding the credentials of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<SecretKeySelector>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_shards: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_shards: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_samples_per_send: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub batch_send_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub min_backoff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "duration_schema")]
    pub max_backoff: Option<String>,
    /// Retry upon receiving a 429 status code from the remote write storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on_rate_limit: Option<bool>,
}

/// ThanosRulerWebSpec defines the configuration of the ThanosRuler web server.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThanosRulerWebSpec {
    /// Defines HTTP parameters for web server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_config: Option<WebHttpConfig>,
    /// Defines the TLS parameters for HTTPS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<WebTlsConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebHttpConfig {
    /// List of headers that can be added to HTTP responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<WebHttpHeaders>,
    /// Enable HTTP/2 support. Note that HTTP/2 is only supported with TLS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http2: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebHttpHeaders {
    /// Set the Content-Security-Policy header to HTTP responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_security_policy: Option<String>,
    /// Set the Strict-Transport-Security header to HTTP responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_transport_security: Option<String>,
    /// Set the X-Content-Type-Options header to HTTP responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_content_type_options: Option<ContentTypeOptions>,
    /// Set the X-Frame-Options header to HTTP responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_frame_options: Option<FrameOptions>,
    /// Set the X-XSS-Protection header to all responses.
    #[serde(default, rename = "xXSSProtection", skip_serializing_if = "Option::is_none")]
    pub x_xss_protection: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ContentTypeOptions {
    #[serde(rename = "")]
    Unset,
    NoSniff,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum FrameOptions {
    #[serde(rename = "")]
    Unset,
    Deny,
    SameOrigin,
}

/// Web server TLS configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebTlsConfig {
    /// Contains the TLS certificate for the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<SecretOrConfigMap>,
    /// Path to the TLS certificate file in the container for the web server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,
    /// List of supported cipher suites for TLS versions up to TLS 1.2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher_suites: Option<Vec<String>>,
    /// The server policy for client TLS authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_auth_type: Option<String>,
    /// Contains the CA certificate for client certificate authentication to the server.
    #[serde(default, rename = "client_ca", skip_serializing_if = "Option::is_none")]
    pub client_ca: Option<SecretOrConfigMap>,
    /// Path to the CA certificate file for client certificate authentication to the server.
    #[serde(default, rename = "clientCAFile", skip_serializing_if = "Option::is_none")]
    pub client_ca_file: Option<String>,
    /// Elliptic curves that will be used in an ECDHE handshake, in preference order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_preferences: Option<Vec<String>>,
    /// Path to the TLS private key file in the container for the web server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    /// Secret containing the TLS private key for the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<SecretKeySelector>,
    /// Maximum TLS version that is acceptable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,
    /// Minimum TLS version that is acceptable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    /// Controls whether the server selects the client's most preferred cipher suite, or the
    /// server's most preferred cipher suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_server_cipher_suites: Option<bool>,
}

/// The envelope of the object as seen by the provider: only the fields the provider manages.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceMetadata {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Wait until the value at `jsonpath` equals `value` after create or update.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WaitForUpsert {
    pub jsonpath: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

/// Poll for the object to disappear after deletion.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitForDelete {
    /// Seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for WaitForDelete {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT_SECONDS,
            poll_interval: DEFAULT_WAIT_POLL_INTERVAL_SECONDS,
        }
    }
}

impl WaitForDelete {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

fn default_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECONDS
}

fn default_poll_interval() -> u64 {
    DEFAULT_WAIT_POLL_INTERVAL_SECONDS
}

/// One `ThanosRuler` object as managed by the provider.
///
/// Provider bookkeeping attributes never reach the cluster, they are skipped when the record is
/// serialized into an apply payload.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ThanosRulerResourceData {
    #[serde(skip)]
    pub id: Value<String>,
    #[serde(skip)]
    pub force_conflicts: Value<bool>,
    #[serde(skip)]
    pub field_manager: Value<String>,
    #[serde(skip)]
    pub deletion_propagation: Value<String>,
    #[serde(skip)]
    pub wait_for_upsert: Value<Vec<WaitForUpsert>>,
    #[serde(skip)]
    pub wait_for_delete: Value<WaitForDelete>,

    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ResourceMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ThanosRulerSpec>,
}

impl ThanosRulerResourceData {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION.to_owned(),
            kind: KIND.to_owned(),
            metadata: ResourceMetadata {
                name: name.into(),
                namespace: namespace.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// `namespace/name`, the identifier of the object within the provider.
    pub fn object_id(&self) -> String {
        format!("{}/{}", self.metadata.namespace, self.metadata.name)
    }

    /// Replaces unknown bookkeeping attributes with nulls so the record can be stored as state.
    pub fn resolve_unknowns(&mut self) {
        self.force_conflicts.resolve_unknown();
        self.field_manager.resolve_unknown();
        self.deletion_propagation.resolve_unknown();
        self.wait_for_upsert.resolve_unknown();
        self.wait_for_delete.resolve_unknown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_fields_are_not_serialized() {
        // Given: A record with every bookkeeping attribute set
        let mut data = ThanosRulerResourceData::new("monitoring", "ruler");
        data.id = Value::Known("monitoring/ruler".to_string());
        data.force_conflicts = Value::Known(true);
        data.field_manager = Value::Known("me".to_string());
        data.deletion_propagation = Value::Known("Orphan".to_string());
        data.wait_for_delete = Value::Known(WaitForDelete::default());

        // When: Serializing the apply payload
        let payload = serde_json::to_value(&data).unwrap();

        // Then: Only the Kubernetes envelope is present
        assert_eq!(
            payload,
            json!({
                "apiVersion": "monitoring.coreos.com/v1",
                "kind": "ThanosRuler",
                "metadata": {"name": "ruler", "namespace": "monitoring"},
            })
        );
    }

    #[test]
    fn test_spec_uses_kubernetes_field_names() {
        // Given: A spec with a few fields
        let spec = ThanosRulerSpec {
            alert_drop_labels: Some(vec!["replica".to_string()]),
            log_level: Some(LogLevel::Warn),
            grpc_server_tls_config: Some(TlsConfig {
                insecure_skip_verify: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        // When: Serializing
        let value = serde_json::to_value(&spec).unwrap();

        // Then: Field names and enum values match the CRD
        assert_eq!(
            value,
            json!({
                "alertDropLabels": ["replica"],
                "logLevel": "warn",
                "grpcServerTlsConfig": {"insecureSkipVerify": true},
            })
        );
    }

    #[test]
    fn test_web_headers_keep_upstream_acronyms() {
        // Given: Web headers including X-XSS-Protection
        let web = ThanosRulerWebSpec {
            http_config: Some(WebHttpConfig {
                headers: Some(WebHttpHeaders {
                    x_xss_protection: Some("1; mode=block".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        // When: Serializing and reading back
        let value = serde_json::to_value(&web).unwrap();
        let parsed: ThanosRulerWebSpec = serde_json::from_value(value.clone()).unwrap();

        // Then: The CRD field name is used in both directions
        assert_eq!(
            value,
            json!({"httpConfig": {"headers": {"xXSSProtection": "1; mode=block"}}})
        );
        assert_eq!(parsed, web);
    }

    #[test]
    fn test_remote_write_and_rule_grace_period_field_names() {
        // Given: A stateless ruler spec
        let spec = ThanosRulerSpec {
            enable_features: Some(vec!["promql-experimental-functions".to_string()]),
            rule_grace_period: Some("10m".to_string()),
            remote_write: Some(vec![RemoteWriteSpec {
                url: "http://receive.monitoring.svc:19291/api/v1/receive".to_string(),
                remote_timeout: Some("30s".to_string()),
                authorization: Some(Authorization {
                    type_: Some("Bearer".to_string()),
                    ..Default::default()
                }),
                queue_config: Some(QueueConfig {
                    max_shards: Some(10),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        // When: Serializing
        let value = serde_json::to_value(&spec).unwrap();

        // Then: Field names match the CRD
        assert_eq!(
            value,
            json!({
                "enableFeatures": ["promql-experimental-functions"],
                "ruleGracePeriod": "10m",
                "remoteWrite": [{
                    "url": "http://receive.monitoring.svc:19291/api/v1/receive",
                    "remoteTimeout": "30s",
                    "authorization": {"type": "Bearer"},
                    "queueConfig": {"maxShards": 10},
                }],
            })
        );
    }

    #[test]
    fn test_server_response_with_unknown_fields_deserializes() {
        // Given: A server object with status and extra metadata
        let server = json!({
            "apiVersion": "monitoring.coreos.com/v1",
            "kind": "ThanosRuler",
            "metadata": {
                "name": "ruler",
                "namespace": "monitoring",
                "uid": "4f1c2a9e",
                "generation": 2,
                "labels": {"team": "observability"},
            },
            "spec": {"replicas": 2, "futureField": {"a": 1}},
            "status": {"replicas": 2},
        });

        // When: Deserializing into the record
        let data: ThanosRulerResourceData = serde_json::from_value(server).unwrap();

        // Then: Known fields are kept and bookkeeping stays null
        assert_eq!(data.object_id(), "monitoring/ruler");
        assert_eq!(data.spec.unwrap().replicas, Some(2));
        assert_eq!(data.metadata.labels.unwrap()["team"], "observability");
        assert!(data.id.is_null());
    }

    #[test]
    fn test_resolve_unknowns() {
        // Given: A planned record with unknown bookkeeping attributes
        let mut data = ThanosRulerResourceData {
            force_conflicts: Value::Unknown,
            field_manager: Value::Known("me".to_string()),
            deletion_propagation: Value::Unknown,
            wait_for_upsert: Value::Unknown,
            wait_for_delete: Value::Unknown,
            ..ThanosRulerResourceData::new("ns", "name")
        };

        // When: Resolving
        data.resolve_unknowns();

        // Then: Unknowns become null, known values stay
        assert!(data.force_conflicts.is_null());
        assert_eq!(data.field_manager, Value::Known("me".to_string()));
        assert!(data.deletion_propagation.is_null());
        assert!(data.wait_for_upsert.is_null());
        assert!(data.wait_for_delete.is_null());
    }

    #[test]
    fn test_wait_for_delete_defaults() {
        let wait: WaitForDelete = serde_json::from_value(json!({})).unwrap();

        assert_eq!(wait.timeout(), Duration::from_secs(30));
        assert_eq!(wait.poll_interval(), Duration::from_secs(5));
    }
}
