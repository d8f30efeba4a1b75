use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, Args};
use dendrite_core::manifest;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    Api,
    api::{Patch, PatchParams},
};
use snafu::ResultExt;

use crate::{
    PROJECT_NAME,
    cli::{
        Error, error,
        internal::{ApiDeploymentExt, ParamsSource},
    },
    config::Config,
};

#[derive(Args, Clone)]
pub struct ApplyCommand {
    #[arg(
        short = 'f',
        long = "params",
        help = "Path to the parameters file (YAML). Defaults to `defaultParamsFile` from the \
                configuration."
    )]
    pub params_file: Option<PathBuf>,

    #[arg(
        long = "set",
        value_name = "FIELD=VALUE",
        action = ArgAction::Append,
        help = "Override one parameter before validation, e.g. `--set shardId=2`. Sequence \
                fields take comma-separated values. May be given multiple times."
    )]
    pub overrides: Vec<String>,

    #[arg(
        short = 'w',
        long = "wait",
        help = "Wait until the rollout completes before returning."
    )]
    pub wait: bool,

    #[arg(
        short = 't',
        long = "timeout-seconds",
        default_value = "300",
        help = "The maximum time in seconds to wait for the rollout to complete before timing \
                out. Only used together with --wait."
    )]
    pub timeout_secs: u64,
}

impl ApplyCommand {
    pub async fn run(self, kube_client: kube::Client, config: Config) -> Result<(), Error> {
        let Self { params_file, overrides, wait, timeout_secs } = self;
        let params = ParamsSource { params_file, overrides }.resolve(&config)?;
        let deployment = manifest::deployment(&params)?;

        let api = Api::<Deployment>::namespaced(kube_client, &params.namespace);
        let patch_params = PatchParams::apply(PROJECT_NAME);
        let _deployment = api
            .patch(&params.name, &patch_params, &Patch::Apply(&deployment))
            .await
            .with_context(|_| error::ApplyDeploymentSnafu {
                namespace: params.namespace.clone(),
                name: params.name.clone(),
            })?;
        tracing::info!(
            "deployment/{} has been applied in namespace {} ({} replicas, shard {})",
            params.name,
            params.namespace,
            params.replicas,
            params.shard_id
        );

        if wait {
            let _deployment = api
                .await_rollout(&params.name, &params.namespace, Duration::from_secs(timeout_secs))
                .await?;
            tracing::info!(
                "deployment/{} has finished rolling out in namespace {}",
                params.name,
                params.namespace
            );
        }

        Ok(())
    }
}
