use std::path::PathBuf;

use dendrite_core::params::{DeploymentParams, RawDeploymentParams};
use resolve_path::PathResolveExt;
use snafu::ResultExt;

use crate::{
    cli::{Error, error},
    config::Config,
};

/// Resolves the effective parameter set for one invocation: the parameters
/// file (given explicitly or taken from the configuration), with any
/// `FIELD=VALUE` overrides applied on top, then validated.
pub struct ParamsSource {
    pub params_file: Option<PathBuf>,
    pub overrides: Vec<String>,
}

impl ParamsSource {
    /// Loads, overrides and validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoParametersFile` if neither the command line nor the
    /// configuration names a parameters file, an I/O or parse error for an
    /// unreadable file, an override error for a malformed `FIELD=VALUE`
    /// expression, and `Error::InvalidParameters` with the full violation
    /// list if validation rejects the mapping.
    pub fn resolve(self, config: &Config) -> Result<DeploymentParams, Error> {
        let Self { params_file, overrides } = self;
        let filename = params_file
            .or_else(|| config.default_params_file.clone())
            .ok_or_else(|| error::NoParametersFileSnafu.build())?;
        let filename = filename
            .try_resolve()
            .map(|path| path.to_path_buf())
            .with_context(|_| error::ResolveFilePathSnafu { file_path: filename.clone() })?;

        let data = std::fs::read(&filename)
            .context(error::OpenParametersSnafu { filename: filename.clone() })?;
        let mut raw: RawDeploymentParams =
            serde_yaml::from_slice(&data).context(error::ParseParametersSnafu { filename })?;

        for expression in &overrides {
            apply_override(&mut raw, expression)?;
        }

        DeploymentParams::try_from(raw).map_err(Error::from)
    }
}

/// Applies one `FIELD=VALUE` override onto the raw mapping. Fields are
/// named as in the parameters file; sequence fields split their value on
/// commas. Constraint checking is left to validation.
fn apply_override(raw: &mut RawDeploymentParams, expression: &str) -> Result<(), Error> {
    let Some((field, value)) = expression.split_once('=') else {
        return error::MalformedOverrideSnafu { expression }.fail();
    };
    match field {
        "name" => raw.name = Some(value.to_string()),
        "namespace" => raw.namespace = Some(value.to_string()),
        "replicas" => raw.replicas = Some(parse_integer(field, value)?),
        "jinaDeploymentName" => raw.jina_deployment_name = Some(value.to_string()),
        "shardId" => raw.shard_id = Some(parse_integer(field, value)?),
        "podType" => raw.pod_type = Some(value.to_string()),
        "image" => raw.image = Some(value.to_string()),
        "pullPolicy" => raw.pull_policy = Some(value.to_string()),
        "command" => raw.command = Some(split_sequence(value)),
        "args" => raw.args = Some(split_sequence(value)),
        "port" => raw.port = Some(parse_integer(field, value)?),
        "periodSeconds" => raw.period_seconds = Some(parse_integer(field, value)?),
        "failureThreshold" => raw.failure_threshold = Some(parse_integer(field, value)?),
        _ => return error::UnknownOverrideFieldSnafu { field }.fail(),
    }
    Ok(())
}

fn parse_integer(field: &str, value: &str) -> Result<i64, Error> {
    value.parse().context(error::InvalidOverrideValueSnafu { field, value })
}

fn split_sequence(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_sets_string_fields() {
        let mut raw = RawDeploymentParams::default();
        apply_override(&mut raw, "name=enc-svc").unwrap();
        apply_override(&mut raw, "pullPolicy=Never").unwrap();
        assert_eq!(raw.name.as_deref(), Some("enc-svc"));
        assert_eq!(raw.pull_policy.as_deref(), Some("Never"));
    }

    #[test]
    fn test_override_parses_integer_fields() {
        let mut raw = RawDeploymentParams::default();
        apply_override(&mut raw, "shardId=2").unwrap();
        apply_override(&mut raw, "port=8080").unwrap();
        assert_eq!(raw.shard_id, Some(2));
        assert_eq!(raw.port, Some(8080));
    }

    #[test]
    fn test_override_splits_sequences_on_commas() {
        let mut raw = RawDeploymentParams::default();
        apply_override(&mut raw, "args=executor,--port,8080").unwrap();
        assert_eq!(
            raw.args,
            Some(vec!["executor".to_string(), "--port".to_string(), "8080".to_string()])
        );
    }

    #[test]
    fn test_override_splits_on_first_equals_sign_only() {
        let mut raw = RawDeploymentParams::default();
        apply_override(&mut raw, "args=executor,--uses=config.yml").unwrap();
        assert_eq!(
            raw.args,
            Some(vec!["executor".to_string(), "--uses=config.yml".to_string()])
        );
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        let mut raw = RawDeploymentParams::default();
        let err = apply_override(&mut raw, "replicas").unwrap_err();
        assert!(matches!(err, Error::MalformedOverride { .. }));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut raw = RawDeploymentParams::default();
        let err = apply_override(&mut raw, "replica=3").unwrap_err();
        assert!(matches!(err, Error::UnknownOverrideField { .. }));
    }

    #[test]
    fn test_unparseable_integer_is_rejected() {
        let mut raw = RawDeploymentParams::default();
        let err = apply_override(&mut raw, "replicas=three").unwrap_err();
        assert!(matches!(err, Error::InvalidOverrideValue { .. }));
    }
}
