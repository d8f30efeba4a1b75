use std::{io::Write, path::PathBuf};

use clap::{ArgAction, Args};
use dendrite_core::{manifest, render};
use snafu::ResultExt;

use crate::{
    cli::{Error, error, internal::ParamsSource},
    config::Config,
};

/// Annotated parameters file emitted by `dendrite example-params`.
pub const EXAMPLE_PARAMS: &str = r#"# Parameters for one shard of a logical executor deployment.
#
# `pullPolicy` may be omitted and defaults to IfNotPresent. Every other
# field is required. Values carrying digits only must be quoted inside
# `command` and `args`, which are sequences of strings.
name: encoder-0
namespace: serving
replicas: 2
jinaDeploymentName: encoder
shardId: 0
podType: WORKER
image: registry.example.com/executors/encoder:1.4.2
pullPolicy: IfNotPresent
command:
  - jina
args:
  - executor
  - --uses
  - config.yml
  - --port
  - "8081"
port: 8081
periodSeconds: 10
failureThreshold: 3
"#;

#[derive(Args, Clone)]
pub struct GenerateCommand {
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
        short = 'o',
        long = "output",
        help = "Write the manifest to this file instead of standard output."
    )]
    pub output: Option<PathBuf>,
}

impl GenerateCommand {
    pub fn run(self, config: Config) -> Result<(), Error> {
        let Self { params_file, overrides, output } = self;
        let params = ParamsSource { params_file, overrides }.resolve(&config)?;
        let deployment = manifest::deployment(&params)?;
        let document = render::to_yaml(&deployment)?;

        if let Some(path) = output {
            std::fs::write(&path, document)
                .with_context(|_| error::WriteManifestSnafu { path: path.clone() })?;
            tracing::info!(
                "manifest for deployment/{} written to {}",
                params.name,
                path.display()
            );
        } else {
            std::io::stdout().write_all(document.as_bytes()).context(error::WriteStdoutSnafu)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dendrite_core::params::{DeploymentParams, RawDeploymentParams};

    use super::*;

    #[test]
    fn test_example_params_validate() {
        let raw: RawDeploymentParams = serde_yaml::from_str(EXAMPLE_PARAMS).unwrap();
        let params = DeploymentParams::try_from(raw).unwrap();
        assert_eq!(params.name, "encoder-0");
        assert_eq!(params.port, 8081);
    }

    #[test]
    fn test_example_params_produce_a_manifest() {
        let raw: RawDeploymentParams = serde_yaml::from_str(EXAMPLE_PARAMS).unwrap();
        let params = DeploymentParams::try_from(raw).unwrap();
        let deployment = manifest::deployment(&params).unwrap();
        assert!(render::to_yaml(&deployment).is_ok());
    }
}
