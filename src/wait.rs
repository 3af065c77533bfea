//! Polling until a deleted object is gone.

use kube::core::ApiResource;
use tokio::time::sleep;
use tokio::time::Instant;

use crate::error::is_not_found;
use crate::error::Error;
use crate::error::Result;
use crate::k8s::DynamicClient;
use crate::thanos_ruler::WaitForDelete;

/// Polls the object at a fixed interval until the API server reports it as not found.
///
/// A zero timeout checks exactly once and returns without waiting, whether or not the object
/// is still there. Otherwise the loop gives up with [Error::WaitTimeout] once more than the
/// timeout has elapsed. The future only suspends on the tokio timer, so dropping it (for example
/// through an outer `tokio::time::timeout`) stops the polling.
pub async fn until_deleted(
    client: &dyn DynamicClient,
    resource: &ApiResource,
    namespace: &str,
    name: &str,
    wait: &WaitForDelete,
) -> Result<()> {
    let timeout = wait.timeout();
    let poll_interval = wait.poll_interval();
    let start = Instant::now();

    loop {
        match client.get(resource, namespace, name).await {
            Err(error) if is_not_found(&error) => {
                log::debug!(name = name, namespace = namespace; "Object is gone");
                return Ok(());
            }
            Err(error) => {
                log::debug!(name = name, namespace = namespace; "Polling for deletion failed, retrying: {error}");
            }
            Ok(_) => {
                log::trace!(name = name, namespace = namespace; "Object still present");
            }
        }

        if timeout.is_zero() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            return Err(Error::WaitTimeout {
                name: name.to_owned(),
                namespace: namespace.to_owned(),
                timeout,
            });
        }

        sleep(poll_interval).await;
    }
}
