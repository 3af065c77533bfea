//! The `monitoring.coreos.com/v1` `ThanosRuler` provider resource.

mod resource;
mod schema;
pub(crate) mod state;
mod types;

use kube::api::PropagationPolicy;
use kube::core::ApiResource;
use strum::Display;
use strum::EnumString;

pub use resource::ThanosRulerResource;
pub use schema::manifest_schema;
pub use schema::resource_schema;
pub use types::*;

/// Addressing of `thanosrulers.monitoring.coreos.com/v1` for the dynamic client.
pub fn api_resource() -> ApiResource {
    ApiResource::erase::<ThanosRuler>(&())
}

/// How the garbage collector handles dependents of a deleted object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DeletionPropagation {
    Orphan,
    Background,
    Foreground,
}

impl From<DeletionPropagation> for PropagationPolicy {
    fn from(value: DeletionPropagation) -> Self {
        match value {
            DeletionPropagation::Orphan => PropagationPolicy::Orphan,
            DeletionPropagation::Background => PropagationPolicy::Background,
            DeletionPropagation::Foreground => PropagationPolicy::Foreground,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_api_resource() {
        let resource = api_resource();

        assert_eq!(resource.group, "monitoring.coreos.com");
        assert_eq!(resource.version, "v1");
        assert_eq!(resource.api_version, API_VERSION);
        assert_eq!(resource.kind, KIND);
        assert_eq!(resource.plural, "thanosrulers");
    }

    #[test]
    fn test_deletion_propagation_is_case_insensitive() {
        assert_eq!(
            DeletionPropagation::from_str("Orphan").unwrap(),
            DeletionPropagation::Orphan
        );
        assert_eq!(
            DeletionPropagation::from_str("background").unwrap(),
            DeletionPropagation::Background
        );
        assert_eq!(
            DeletionPropagation::from_str("FOREGROUND").unwrap(),
            DeletionPropagation::Foreground
        );
        assert!(DeletionPropagation::from_str("sideways").is_err());
        assert_eq!(DeletionPropagation::Foreground.to_string(), "Foreground");
    }

    #[test]
    fn test_deletion_propagation_maps_to_kube_policy() {
        assert!(matches!(
            PropagationPolicy::from(DeletionPropagation::Orphan),
            PropagationPolicy::Orphan
        ));
        assert!(matches!(
            PropagationPolicy::from(DeletionPropagation::Background),
            PropagationPolicy::Background
        ));
        assert!(matches!(
            PropagationPolicy::from(DeletionPropagation::Foreground),
            PropagationPolicy::Foreground
        ));
    }
}
