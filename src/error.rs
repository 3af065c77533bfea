use std::time::Duration;

use thiserror::Error as ThisError;

use crate::diagnostics::Diagnostics;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Any error originating from the `kube-rs` crate that is not tied to a lifecycle call
    #[error("Kubernetes reported error: {source}")]
    Kube {
        #[from]
        source: kube::Error,
    },
    #[error("Unable to marshal resource: {0}")]
    Marshal(#[source] serde_json::Error),
    #[error("Unable to unmarshal resource: {0}")]
    Unmarshal(#[source] serde_json::Error),
    #[error("Unable to render manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),
    #[error("Could not apply {namespace}/{name}: {source}")]
    Apply {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },
    #[error("Could not get namespaced resource {namespace}/{name}: {source}")]
    Get {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },
    #[error("Could not delete {namespace}/{name}: {source}")]
    Delete {
        name: String,
        namespace: String,
        #[source]
        source: kube::Error,
    },
    #[error("Timed out after {timeout:?} waiting for {namespace}/{name} to be deleted")]
    WaitTimeout {
        name: String,
        namespace: String,
        timeout: Duration,
    },
    #[error("Expected import identifier with format 'namespace/name', got: '{0}'")]
    UnexpectedImportIdentifier(String),
    #[error("Provider is running in offline mode and cannot reach a cluster")]
    ProviderOffline,
    #[error("Expected provider data of type ProviderData, got: {0}")]
    UnexpectedProviderData(String),
    #[error("Resource has not been configured with a Kubernetes client")]
    Unconfigured,
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(Diagnostics),

    /// Errors from wiring up the provider, e.g. loading a kubeconfig
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error is a Kubernetes `404 Not Found` response.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Kube { source } | Error::Get { source, .. } | Error::Delete { source, .. } => is_not_found(source),
            _ => false,
        }
    }
}

pub(crate) fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{reason} error"),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_kube_error_conversion() {
        // Given: A kube::Error
        let kube_err = api_error(400, "BadRequest");

        // When: Converting to Error
        let error: Error = kube_err.into();

        // Then: Should be Kube variant
        assert!(matches!(error, Error::Kube { .. }));
        assert!(error.to_string().contains("Kubernetes reported error"));
    }

    #[test]
    fn test_not_found_detection() {
        // Given: A 404 and a 409 wrapped in lifecycle errors
        let gone = Error::Get {
            name: "ruler".to_string(),
            namespace: "monitoring".to_string(),
            source: api_error(404, "NotFound"),
        };
        let conflict = Error::Delete {
            name: "ruler".to_string(),
            namespace: "monitoring".to_string(),
            source: api_error(409, "Conflict"),
        };

        // Then: Only the 404 counts as not found
        assert!(gone.is_not_found());
        assert!(!conflict.is_not_found());
        assert!(!Error::ProviderOffline.is_not_found());
    }

    #[test]
    fn test_get_error_carries_name_and_namespace() {
        // Given: A failed get
        let error = Error::Get {
            name: "ruler".to_string(),
            namespace: "monitoring".to_string(),
            source: api_error(403, "Forbidden"),
        };

        // Then: The message names the object
        let message = error.to_string();
        assert!(message.contains("monitoring/ruler"));
        assert!(message.contains("Forbidden"));
    }

    #[test]
    fn test_import_identifier_error_display() {
        // Given: A malformed identifier
        let error = Error::UnexpectedImportIdentifier("badid".to_string());

        // Then: The expected format is named
        assert_eq!(
            error.to_string(),
            "Expected import identifier with format 'namespace/name', got: 'badid'"
        );
    }

    #[test]
    fn test_anyhow_error_conversion() {
        // Given: An anyhow error
        let anyhow_err = anyhow::anyhow!("kubeconfig missing");

        // When: Converting to Error
        let error: Error = anyhow_err.into();

        // Then: Should be Anyhow variant
        assert!(matches!(error, Error::Anyhow(_)));
        assert!(error.to_string().contains("kubeconfig missing"));
    }
}
