//! Parameter model for one shard of a logical executor deployment.
//!
//! Orchestrators hand over a [`RawDeploymentParams`] mapping; nothing in it
//! is trusted. Conversion into [`DeploymentParams`] checks every field and
//! reports all violations at once, so a rejected request never has to be
//! resubmitted more than once.

mod error;
mod pull_policy;

use serde::{Deserialize, Serialize};

pub use self::{
    error::{ValidationError, Violation},
    pull_policy::{ImagePullPolicy, ParseImagePullPolicyError},
};
use crate::consts;

/// Unvalidated parameter mapping, keyed exactly as callers write it.
///
/// Every field is optional here; requiredness is a validation concern, not
/// a parsing concern. A missing key and an explicitly violated constraint
/// both surface as [`Violation`]s with the field names below.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeploymentParams {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub replicas: Option<i64>,
    pub jina_deployment_name: Option<String>,
    pub shard_id: Option<i64>,
    pub pod_type: Option<String>,
    pub image: Option<String>,
    pub pull_policy: Option<String>,
    pub command: Option<Vec<String>>,
    pub args: Option<Vec<String>>,
    pub port: Option<i64>,
    pub period_seconds: Option<i64>,
    pub failure_threshold: Option<i64>,
}

/// Validated parameters for one shard.
///
/// Invariants established by [`TryFrom<RawDeploymentParams>`]:
/// `name` and `namespace` are DNS-1123 labels, `jina_deployment_name` and
/// `pod_type` are valid label values, `replicas`, `period_seconds` and
/// `failure_threshold` are positive, `port` is in `1..=65535`, and
/// `command` and `args` are non-empty sequences of non-empty strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeploymentParams {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub jina_deployment_name: String,
    pub shard_id: u32,
    pub pod_type: String,
    pub image: String,
    pub pull_policy: ImagePullPolicy,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub port: u16,
    pub period_seconds: i32,
    pub failure_threshold: i32,
}

impl DeploymentParams {
    /// Name of the config map the executor environment is drawn from.
    #[must_use]
    pub fn config_map_name(&self) -> String {
        format!("{}{}", self.name, consts::CONFIG_MAP_SUFFIX)
    }
}

impl TryFrom<RawDeploymentParams> for DeploymentParams {
    type Error = ValidationError;

    fn try_from(raw: RawDeploymentParams) -> Result<Self, Self::Error> {
        let RawDeploymentParams {
            name,
            namespace,
            replicas,
            jina_deployment_name,
            shard_id,
            pod_type,
            image,
            pull_policy,
            command,
            args,
            port,
            period_seconds,
            failure_threshold,
        } = raw;

        let mut violations = Vec::new();

        let name = check_dns_label("name", name, &mut violations);
        let namespace = check_dns_label("namespace", namespace, &mut violations);
        let replicas = check_positive("replicas", replicas, &mut violations);
        let jina_deployment_name =
            check_label_value("jinaDeploymentName", jina_deployment_name, &mut violations);
        let shard_id = check_shard_id(shard_id, &mut violations);
        let pod_type = check_label_value("podType", pod_type, &mut violations);
        let image = check_non_empty("image", image, &mut violations);
        let pull_policy = check_pull_policy(pull_policy, &mut violations);
        let command = check_string_sequence("command", command, &mut violations);
        let args = check_string_sequence("args", args, &mut violations);
        let port = check_port(port, &mut violations);
        let period_seconds = check_positive("periodSeconds", period_seconds, &mut violations);
        let failure_threshold =
            check_positive("failureThreshold", failure_threshold, &mut violations);

        // A helper returns `None` exactly when it recorded a violation, so
        // this destructuring only succeeds for a fully clean parameter set.
        let (
            Some(name),
            Some(namespace),
            Some(replicas),
            Some(jina_deployment_name),
            Some(shard_id),
            Some(pod_type),
            Some(image),
            Some(pull_policy),
            Some(command),
            Some(args),
            Some(port),
            Some(period_seconds),
            Some(failure_threshold),
        ) = (
            name,
            namespace,
            replicas,
            jina_deployment_name,
            shard_id,
            pod_type,
            image,
            pull_policy,
            command,
            args,
            port,
            period_seconds,
            failure_threshold,
        )
        else {
            return Err(ValidationError { violations });
        };

        Ok(Self {
            name,
            namespace,
            replicas,
            jina_deployment_name,
            shard_id,
            pod_type,
            image,
            pull_policy,
            command,
            args,
            port,
            period_seconds,
            failure_threshold,
        })
    }
}

fn is_dns_label(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && value.bytes().all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-'))
        && !value.starts_with('-')
        && !value.ends_with('-')
}

fn is_label_value(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 63
        && value.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        && value.bytes().next().is_some_and(|b| b.is_ascii_alphanumeric())
        && value.bytes().last().is_some_and(|b| b.is_ascii_alphanumeric())
}

fn missing(field: &'static str, violations: &mut Vec<Violation>) {
    violations.push(Violation { field, message: "required but missing".to_string() });
}

fn check_dns_label(
    field: &'static str,
    value: Option<String>,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    let Some(value) = value else {
        missing(field, violations);
        return None;
    };
    if is_dns_label(&value) {
        Some(value)
    } else {
        violations.push(Violation {
            field,
            message: "must be a DNS-1123 label (lowercase alphanumerics and '-', \
                      at most 63 characters, not starting or ending with '-')"
                .to_string(),
        });
        None
    }
}

fn check_label_value(
    field: &'static str,
    value: Option<String>,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    let Some(value) = value else {
        missing(field, violations);
        return None;
    };
    if is_label_value(&value) {
        Some(value)
    } else {
        violations.push(Violation {
            field,
            message: "must be a valid label value (alphanumerics, '-', '_' and '.', \
                      at most 63 characters, starting and ending with an alphanumeric)"
                .to_string(),
        });
        None
    }
}

fn check_non_empty(
    field: &'static str,
    value: Option<String>,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    let Some(value) = value else {
        missing(field, violations);
        return None;
    };
    if value.is_empty() {
        violations.push(Violation { field, message: "must not be empty".to_string() });
        None
    } else {
        Some(value)
    }
}

fn check_positive(
    field: &'static str,
    value: Option<i64>,
    violations: &mut Vec<Violation>,
) -> Option<i32> {
    let Some(value) = value else {
        missing(field, violations);
        return None;
    };
    match i32::try_from(value) {
        Ok(value) if value >= 1 => Some(value),
        _ => {
            violations.push(Violation {
                field,
                message: "must be a positive 32-bit integer".to_string(),
            });
            None
        }
    }
}

fn check_shard_id(value: Option<i64>, violations: &mut Vec<Violation>) -> Option<u32> {
    let Some(value) = value else {
        missing("shardId", violations);
        return None;
    };
    let Ok(shard_id) = u32::try_from(value) else {
        violations.push(Violation {
            field: "shardId",
            message: "must be a non-negative 32-bit integer".to_string(),
        });
        return None;
    };
    Some(shard_id)
}

fn check_port(value: Option<i64>, violations: &mut Vec<Violation>) -> Option<u16> {
    let Some(value) = value else {
        missing("port", violations);
        return None;
    };
    match u16::try_from(value) {
        Ok(port) if port >= 1 => Some(port),
        _ => {
            violations.push(Violation {
                field: "port",
                message: "must be an integer in the range [1, 65535]".to_string(),
            });
            None
        }
    }
}

fn check_pull_policy(
    value: Option<String>,
    violations: &mut Vec<Violation>,
) -> Option<ImagePullPolicy> {
    let Some(value) = value else {
        // The one defaulted field: an absent pull policy is IfNotPresent.
        return Some(ImagePullPolicy::default());
    };
    let Ok(policy) = value.parse() else {
        violations.push(Violation {
            field: "pullPolicy",
            message: "must be one of Always, IfNotPresent, Never".to_string(),
        });
        return None;
    };
    Some(policy)
}

fn check_string_sequence(
    field: &'static str,
    value: Option<Vec<String>>,
    violations: &mut Vec<Violation>,
) -> Option<Vec<String>> {
    let Some(value) = value else {
        missing(field, violations);
        return None;
    };
    if value.is_empty() {
        violations.push(Violation { field, message: "must be a non-empty sequence".to_string() });
        None
    } else if value.iter().any(String::is_empty) {
        violations
            .push(Violation { field, message: "must not contain empty entries".to_string() });
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawDeploymentParams {
        RawDeploymentParams {
            name: Some("enc-svc".to_string()),
            namespace: Some("prod".to_string()),
            replicas: Some(3),
            jina_deployment_name: Some("enc".to_string()),
            shard_id: Some(0),
            pod_type: Some("WORKER".to_string()),
            image: Some("registry.example.com/executors/enc:1.0.0".to_string()),
            pull_policy: None,
            command: Some(vec!["jina".to_string()]),
            args: Some(vec![
                "executor".to_string(),
                "--port".to_string(),
                "8080".to_string(),
            ]),
            port: Some(8080),
            period_seconds: Some(10),
            failure_threshold: Some(3),
        }
    }

    fn violated_fields(err: &ValidationError) -> Vec<&'static str> {
        err.violations.iter().map(|violation| violation.field).collect()
    }

    #[test]
    fn test_valid_parameters() {
        let params = DeploymentParams::try_from(valid_raw()).unwrap();
        assert_eq!(params.name, "enc-svc");
        assert_eq!(params.namespace, "prod");
        assert_eq!(params.replicas, 3);
        assert_eq!(params.shard_id, 0);
        assert_eq!(params.port, 8080);
        assert_eq!(params.pull_policy, ImagePullPolicy::IfNotPresent);
    }

    #[test]
    fn test_pull_policy_defaults_to_if_not_present() {
        let mut raw = valid_raw();
        raw.pull_policy = None;
        let params = DeploymentParams::try_from(raw).unwrap();
        assert_eq!(params.pull_policy, ImagePullPolicy::IfNotPresent);
    }

    #[test]
    fn test_pull_policy_is_case_insensitive() {
        let mut raw = valid_raw();
        raw.pull_policy = Some("always".to_string());
        let params = DeploymentParams::try_from(raw).unwrap();
        assert_eq!(params.pull_policy, ImagePullPolicy::Always);
    }

    #[test]
    fn test_invalid_pull_policy_is_a_violation() {
        let mut raw = valid_raw();
        raw.pull_policy = Some("Sometimes".to_string());
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["pullPolicy"]);
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let mut raw = valid_raw();
        raw.port = Some(0);
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "port");
        assert!(err.violations[0].message.contains("[1, 65535]"));
    }

    #[test]
    fn test_port_above_range_is_rejected() {
        let mut raw = valid_raw();
        raw.port = Some(65536);
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["port"]);
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let mut raw = valid_raw();
        raw.command = Some(Vec::new());
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "command");
    }

    #[test]
    fn test_blank_command_entry_is_rejected() {
        let mut raw = valid_raw();
        raw.command = Some(vec!["jina".to_string(), String::new()]);
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["command"]);
    }

    #[test]
    fn test_empty_args_are_rejected() {
        let mut raw = valid_raw();
        raw.args = Some(Vec::new());
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["args"]);
    }

    #[test]
    fn test_all_violations_are_reported_at_once() {
        let mut raw = valid_raw();
        raw.name = Some("Enc".to_string());
        raw.port = Some(0);
        raw.command = Some(Vec::new());
        let err = DeploymentParams::try_from(raw).unwrap_err();
        let fields = violated_fields(&err);
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"port"));
        assert!(fields.contains(&"command"));
    }

    #[test]
    fn test_display_renders_every_violation() {
        let mut raw = valid_raw();
        raw.name = Some("Enc".to_string());
        raw.port = Some(0);
        raw.command = Some(Vec::new());
        let err = DeploymentParams::try_from(raw).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("invalid deployment parameters: "));
        assert!(rendered.contains("name:"));
        assert!(rendered.contains("command:"));
        assert!(rendered.contains("port:"));
    }

    #[test]
    fn test_empty_mapping_reports_every_required_field() {
        let err = DeploymentParams::try_from(RawDeploymentParams::default()).unwrap_err();
        let fields = violated_fields(&err);
        // Everything except the defaulted pull policy.
        assert_eq!(fields.len(), 12);
        assert!(!fields.contains(&"pullPolicy"));
    }

    #[test]
    fn test_name_must_be_a_dns_label() {
        for bad in ["Enc", "-enc", "enc-", "enc.svc", "enc svc", ""] {
            let mut raw = valid_raw();
            raw.name = Some(bad.to_string());
            let err = DeploymentParams::try_from(raw).unwrap_err();
            assert_eq!(violated_fields(&err), vec!["name"], "accepted {bad:?}");
        }
    }

    #[test]
    fn test_name_length_boundary() {
        let mut raw = valid_raw();
        raw.name = Some("a".repeat(63));
        assert!(DeploymentParams::try_from(raw).is_ok());

        let mut raw = valid_raw();
        raw.name = Some("a".repeat(64));
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["name"]);
    }

    #[test]
    fn test_label_values_allow_more_than_dns_labels() {
        let mut raw = valid_raw();
        raw.pod_type = Some("WORKER".to_string());
        raw.jina_deployment_name = Some("enc.v2_beta".to_string());
        assert!(DeploymentParams::try_from(raw).is_ok());

        let mut raw = valid_raw();
        raw.pod_type = Some("worker node".to_string());
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["podType"]);
    }

    #[test]
    fn test_negative_shard_id_is_rejected() {
        let mut raw = valid_raw();
        raw.shard_id = Some(-1);
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["shardId"]);
    }

    #[test]
    fn test_zero_replicas_are_rejected() {
        let mut raw = valid_raw();
        raw.replicas = Some(0);
        let err = DeploymentParams::try_from(raw).unwrap_err();
        assert_eq!(violated_fields(&err), vec!["replicas"]);
    }

    #[test]
    fn test_raw_mapping_uses_camel_case_keys() {
        let raw: RawDeploymentParams =
            serde_yaml::from_str("jinaDeploymentName: enc\nshardId: 2\nperiodSeconds: 10\n")
                .unwrap();
        assert_eq!(raw.jina_deployment_name.as_deref(), Some("enc"));
        assert_eq!(raw.shard_id, Some(2));
        assert_eq!(raw.period_seconds, Some(10));
    }

    #[test]
    fn test_config_map_name() {
        let params = DeploymentParams::try_from(valid_raw()).unwrap();
        assert_eq!(params.config_map_name(), "enc-svc-configmap");
    }
}
