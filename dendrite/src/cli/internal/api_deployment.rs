/// This module provides extensions for the Kubernetes `Api<Deployment>` type.
use std::time::Duration;

use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    Api,
    runtime::{conditions::is_deployment_completed, wait::await_condition},
};
use snafu::ResultExt;

use crate::cli::{Error, error};

/// Extension trait for `kube::Api<Deployment>` providing additional utility
/// methods.
pub trait ApiDeploymentExt {
    /// Asynchronously waits for a Deployment to finish rolling out.
    ///
    /// A successful apply call only records the desired state; the rollout
    /// itself completes when the cluster reports the completion condition on
    /// the Deployment. This method waits for that condition, bounded by a
    /// timeout to prevent indefinite waiting.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the Deployment to wait for.
    /// * `namespace` - The namespace where the Deployment resides.
    /// * `timeout` - The maximum duration to wait for the rollout.
    ///
    /// # Errors
    ///
    /// Returns `Error::WaitForRollout` if the timeout is reached before the
    /// rollout completes.
    /// Returns `error::WatchRolloutSnafu` if watching the Deployment fails.
    /// Returns `error::GetDeploymentSnafu` if a direct `get` call to the
    /// Kubernetes API fails after the condition resolves without an object.
    async fn await_rollout(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Deployment, Error>;
}

impl ApiDeploymentExt for Api<Deployment> {
    async fn await_rollout(
        &self,
        name: &str,
        namespace: &str,
        timeout: Duration,
    ) -> Result<Deployment, Error> {
        let maybe_deployment = tokio::time::timeout(
            timeout,
            await_condition(self.clone(), name, is_deployment_completed()),
        )
        .await
        .map_err(|_| Error::WaitForRollout {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?
        .with_context(|_| error::WatchRolloutSnafu {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        match maybe_deployment {
            Some(deployment) => Ok(deployment),
            None => self.get(name).await.with_context(|_| error::GetDeploymentSnafu {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }
}
