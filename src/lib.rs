//! `tfk8s-thanos-ruler` implements the `ThanosRuler` (`monitoring.coreos.com/v1`) resource of a
//! Terraform style Kubernetes provider. Objects are managed through server-side apply, the
//! attribute schema is generated from the typed custom resource definition.
//!
//! ## Usage
//!
//! The provider host owns the plugin protocol. This crate plugs into it through the [Resource]
//! and [DataSource] traits, everything in between is plain data.
//!
//! ```no_run
//! use std::any::Any;
//!
//! use serde_json::json;
//! use tfk8s_thanos_ruler::provider::ProviderConfig;
//! use tfk8s_thanos_ruler::provider::ProviderData;
//! use tfk8s_thanos_ruler::thanos_ruler::ThanosRulerResource;
//! use tfk8s_thanos_ruler::thanos_ruler::ThanosRulerResourceData;
//! use tfk8s_thanos_ruler::Resource;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     // The provider is configured once, each resource instance receives the shared data.
//!     let provider_data = ProviderData::from_config(&ProviderConfig::default()).await?;
//!
//!     let mut resource = ThanosRulerResource::new();
//!     resource.configure(Some(&provider_data as &(dyn Any + Send + Sync)))?;
//!
//!     // Plans arrive in provider shape, with snake_case attribute names.
//!     let plan = ThanosRulerResourceData::from_config(&json!({
//!         "metadata": {"name": "ruler", "namespace": "monitoring"},
//!         "spec": {"query_endpoints": ["dnssrv+_http._tcp.thanos-query.monitoring.svc"]},
//!         "wait_for_delete": {"timeout": 60},
//!     }))?;
//!
//!     let state = resource.create(plan).await?;
//!     println!("{}", state.to_state()?);
//!
//!     resource.delete(state).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [error::Result]. At the protocol boundary an [error::Error] converts
//! into [diagnostics::Diagnostics], which carry the summary shown to the user:
//!
//! ```
//! use tfk8s_thanos_ruler::diagnostics::Diagnostics;
//! use tfk8s_thanos_ruler::thanos_ruler::ThanosRulerResource;
//! use tfk8s_thanos_ruler::Resource;
//!
//! let resource = ThanosRulerResource::new();
//! let error = resource.import_state("badid").unwrap_err();
//!
//! let diagnostics = Diagnostics::from(error);
//! assert_eq!(diagnostics.iter().next().unwrap().summary, "Unexpected Import Identifier");
//! ```

pub mod cache;
pub mod diagnostics;
pub mod error;
pub mod k8s;
pub mod manifest;
pub mod provider;
pub mod schema;
pub mod thanos_ruler;
pub mod value;
pub mod wait;

use std::any::Any;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::ResourceSchema;

/// The lifecycle of a managed resource type as driven by the provider host.
///
/// Handlers receive the decoded plan or prior state and return the new state. Any value left
/// unknown in a returned state is the caller's to resolve.
#[async_trait]
pub trait Resource: Send + Sync {
    type Data: Send + Sync;

    /// The full type name of the resource for the given provider type name.
    fn metadata(&self, provider_type_name: &str) -> String;

    fn schema(&self) -> &'static ResourceSchema;

    /// Receives provider data once before any other handler runs. `None` when the provider has
    /// not been configured yet.
    fn configure(&mut self, provider_data: Option<&(dyn Any + Send + Sync)>) -> Result<()>;

    async fn create(&self, plan: Self::Data) -> Result<Self::Data>;

    async fn read(&self, state: Self::Data) -> Result<Self::Data>;

    async fn update(&self, plan: Self::Data) -> Result<Self::Data>;

    async fn delete(&self, state: Self::Data) -> Result<()>;

    /// Builds the initial state of an imported object from its identifier.
    fn import_state(&self, id: &str) -> Result<Self::Data>;
}

/// A read-only data source.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Data: Send + Sync;

    fn metadata(&self, provider_type_name: &str) -> String;

    fn schema(&self) -> &'static ResourceSchema;

    async fn read(&self, config: Self::Data) -> Result<Self::Data>;
}
