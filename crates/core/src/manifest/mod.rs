//! Assembly of the executor Deployment object graph.
//!
//! [`deployment`] is the only entry point: validated parameters in, a
//! complete `apps/v1` Deployment out. Assembly is pure and deterministic,
//! and the rollout and lifecycle [`policy`] is attached unconditionally.

mod env;
pub(crate) mod error;
pub mod policy;

use std::collections::BTreeMap;

use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment},
        core::v1::{
            ConfigMapEnvSource, Container, ContainerPort, EnvFromSource, ExecAction, Lifecycle,
            LifecycleHandler, PodSpec, PodTemplateSpec, Probe,
        },
    },
    apimachinery::pkg::{
        apis::meta::v1::{LabelSelector, ObjectMeta},
        util::intstr::IntOrString,
    },
};

pub use self::{
    env::{EnvEntry, EnvValue, environment},
    error::AssemblyError,
};
use crate::{consts, params::DeploymentParams};

/// Builds the Deployment manifest for one shard.
///
/// The selector is re-checked against the pod template before the object is
/// returned, so a construction bug cannot yield a manifest the cluster
/// would reject at admission.
///
/// # Errors
///
/// Returns [`AssemblyError::SelectorMismatch`] when a selector key is not
/// carried by the pod template labels. Valid parameters never trigger it.
pub fn deployment(params: &DeploymentParams) -> Result<Deployment, AssemblyError> {
    let labels = shard_labels(params);
    let selector_labels =
        BTreeMap::from([(consts::labels::APP.to_string(), params.name.clone())]);

    let deployment = Deployment {
        metadata: ObjectMeta {
            name: Some(params.name.clone()),
            namespace: Some(params.namespace.clone()),
            labels: Some(labels.clone()),
            ..ObjectMeta::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(params.replicas),
            selector: LabelSelector {
                match_labels: Some(selector_labels),
                ..LabelSelector::default()
            },
            strategy: Some(DeploymentStrategy {
                type_: Some("RollingUpdate".to_string()),
                rolling_update: Some(RollingUpdateDeployment {
                    max_surge: Some(IntOrString::Int(policy::MAX_SURGE)),
                    max_unavailable: Some(IntOrString::Int(policy::MAX_UNAVAILABLE)),
                }),
            }),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta { labels: Some(labels), ..ObjectMeta::default() }),
                spec: Some(PodSpec {
                    containers: vec![executor_container(params)],
                    ..PodSpec::default()
                }),
            },
            ..DeploymentSpec::default()
        }),
        ..Deployment::default()
    };

    verify_selector(&deployment)?;
    Ok(deployment)
}

/// Label set shared by the deployment and its pod template. The `app` key
/// doubles as the pod selector.
fn shard_labels(params: &DeploymentParams) -> BTreeMap<String, String> {
    BTreeMap::from([
        (consts::labels::APP.to_string(), params.name.clone()),
        (
            consts::labels::JINA_DEPLOYMENT_NAME.to_string(),
            params.jina_deployment_name.clone(),
        ),
        (consts::labels::SHARD_ID.to_string(), params.shard_id.to_string()),
        (consts::labels::POD_TYPE.to_string(), params.pod_type.clone()),
        (consts::labels::NS.to_string(), params.namespace.clone()),
    ])
}

fn executor_container(params: &DeploymentParams) -> Container {
    Container {
        name: consts::EXECUTOR_CONTAINER_NAME.to_string(),
        image: Some(params.image.clone()),
        image_pull_policy: Some(params.pull_policy.to_string()),
        command: Some(params.command.clone()),
        args: Some(params.args.clone()),
        ports: Some(vec![ContainerPort {
            container_port: i32::from(params.port),
            ..ContainerPort::default()
        }]),
        env_from: Some(vec![EnvFromSource {
            config_map_ref: Some(ConfigMapEnvSource {
                name: params.config_map_name(),
                ..ConfigMapEnvSource::default()
            }),
            ..EnvFromSource::default()
        }]),
        env: Some(environment(params).into_iter().map(EnvEntry::into_env_var).collect()),
        startup_probe: Some(startup_probe(params)),
        liveness_probe: Some(liveness_probe(params)),
        lifecycle: Some(pre_stop_lifecycle()),
        ..Container::default()
    }
}

/// Gating probe: liveness monitoring starts only once this succeeds, so a
/// slow cold start gets `failure_threshold` whole periods to come up
/// instead of a single fixed delay.
fn startup_probe(params: &DeploymentParams) -> Probe {
    Probe {
        exec: Some(ExecAction { command: Some(health_check_command(params.port, None)) }),
        initial_delay_seconds: Some(policy::STARTUP_INITIAL_DELAY_SECONDS),
        period_seconds: Some(params.period_seconds),
        timeout_seconds: Some(policy::STARTUP_TIMEOUT_SECONDS),
        failure_threshold: Some(params.failure_threshold),
        ..Probe::default()
    }
}

fn liveness_probe(params: &DeploymentParams) -> Probe {
    Probe {
        exec: Some(ExecAction {
            command: Some(health_check_command(
                params.port,
                Some(policy::HEALTH_CHECK_TIMEOUT_MS),
            )),
        }),
        initial_delay_seconds: Some(policy::LIVENESS_INITIAL_DELAY_SECONDS),
        period_seconds: Some(policy::LIVENESS_PERIOD_SECONDS),
        timeout_seconds: Some(policy::LIVENESS_TIMEOUT_SECONDS),
        ..Probe::default()
    }
}

/// `jina ping executor 127.0.0.1:<port> [--timeout <ms>]`, the fixed form
/// the executor health endpoint answers.
fn health_check_command(port: u16, timeout_ms: Option<u32>) -> Vec<String> {
    let mut command = vec![
        consts::HEALTH_CHECK_BINARY.to_string(),
        "ping".to_string(),
        "executor".to_string(),
        format!("{}:{port}", consts::PROBE_ADDRESS),
    ];
    if let Some(timeout_ms) = timeout_ms {
        command.extend(["--timeout".to_string(), timeout_ms.to_string()]);
    }
    command
}

/// Unconditional drain window: the pod sleeps before the termination signal
/// is delivered, letting endpoint removal propagate while in-flight
/// requests finish.
fn pre_stop_lifecycle() -> Lifecycle {
    Lifecycle {
        pre_stop: Some(LifecycleHandler {
            exec: Some(ExecAction {
                command: Some(vec![
                    "/bin/sh".to_string(),
                    "-c".to_string(),
                    format!("sleep {}", policy::PRE_STOP_SECONDS),
                ]),
            }),
            ..LifecycleHandler::default()
        }),
        ..Lifecycle::default()
    }
}

fn verify_selector(deployment: &Deployment) -> Result<(), AssemblyError> {
    let name = deployment.metadata.name.clone().unwrap_or_default();
    let spec = deployment.spec.as_ref();
    let selector = spec.and_then(|spec| spec.selector.match_labels.as_ref());
    let template_labels = spec
        .and_then(|spec| spec.template.metadata.as_ref())
        .and_then(|metadata| metadata.labels.as_ref());

    for (key, value) in selector.into_iter().flatten() {
        let matched = template_labels.is_some_and(|labels| labels.get(key) == Some(value));
        if !matched {
            return error::SelectorMismatchSnafu { name, key: key.clone() }.fail();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RawDeploymentParams;

    fn params() -> DeploymentParams {
        DeploymentParams::try_from(RawDeploymentParams {
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
        })
        .unwrap()
    }

    fn executor(deployment: &Deployment) -> &Container {
        &deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap().containers[0]
    }

    #[test]
    fn test_selector_matches_template_labels() {
        let deployment = deployment(&params()).unwrap();
        let spec = deployment.spec.as_ref().unwrap();
        let selector = spec.selector.match_labels.as_ref().unwrap();
        let template_labels =
            spec.template.metadata.as_ref().unwrap().labels.as_ref().unwrap();

        assert_eq!(selector.get("app").map(String::as_str), Some("enc-svc"));
        for (key, value) in selector {
            assert_eq!(template_labels.get(key), Some(value));
        }
    }

    #[test]
    fn test_template_labels_are_complete() {
        let deployment = deployment(&params()).unwrap();
        let spec = deployment.spec.as_ref().unwrap();
        let labels = spec.template.metadata.as_ref().unwrap().labels.as_ref().unwrap();

        assert_eq!(labels.len(), 5);
        assert_eq!(labels.get("app").map(String::as_str), Some("enc-svc"));
        assert_eq!(labels.get("jina_deployment_name").map(String::as_str), Some("enc"));
        assert_eq!(labels.get("shard_id").map(String::as_str), Some("0"));
        assert_eq!(labels.get("pod_type").map(String::as_str), Some("WORKER"));
        assert_eq!(labels.get("ns").map(String::as_str), Some("prod"));

        assert_eq!(deployment.metadata.labels.as_ref(), Some(labels));
    }

    #[test]
    fn test_metadata_names_the_shard() {
        let deployment = deployment(&params()).unwrap();
        assert_eq!(deployment.metadata.name.as_deref(), Some("enc-svc"));
        assert_eq!(deployment.metadata.namespace.as_deref(), Some("prod"));
    }

    #[test]
    fn test_rollout_policy_is_fixed() {
        let mut other = params();
        other.name = "idx".to_string();
        other.replicas = 7;
        other.port = 9000;

        for params in [params(), other] {
            let deployment = deployment(&params).unwrap();
            let strategy =
                deployment.spec.as_ref().unwrap().strategy.as_ref().unwrap();
            assert_eq!(strategy.type_.as_deref(), Some("RollingUpdate"));
            let rolling = strategy.rolling_update.as_ref().unwrap();
            assert_eq!(rolling.max_surge, Some(IntOrString::Int(1)));
            assert_eq!(rolling.max_unavailable, Some(IntOrString::Int(0)));
        }
    }

    #[test]
    fn test_generated_values_match_parameters() {
        let deployment = deployment(&params()).unwrap();
        assert_eq!(deployment.spec.as_ref().unwrap().replicas, Some(3));

        let container = executor(&deployment);
        assert_eq!(container.name, "executor");
        assert_eq!(container.image.as_deref(), Some("registry.example.com/executors/enc:1.0.0"));
        assert_eq!(container.image_pull_policy.as_deref(), Some("IfNotPresent"));
        assert_eq!(container.command.as_ref().unwrap(), &["jina"]);
        assert_eq!(container.args.as_ref().unwrap(), &["executor", "--port", "8080"]);
        assert_eq!(container.ports.as_ref().unwrap()[0].container_port, 8080);
    }

    #[test]
    fn test_startup_probe_uses_parameterized_cadence() {
        let deployment = deployment(&params()).unwrap();
        let startup = executor(&deployment).startup_probe.as_ref().unwrap();

        assert_eq!(
            startup.exec.as_ref().unwrap().command.as_ref().unwrap(),
            &["jina", "ping", "executor", "127.0.0.1:8080"]
        );
        assert_eq!(startup.initial_delay_seconds, Some(5));
        assert_eq!(startup.period_seconds, Some(10));
        assert_eq!(startup.timeout_seconds, Some(10));
        assert_eq!(startup.failure_threshold, Some(3));
    }

    #[test]
    fn test_liveness_probe_has_fixed_cadence() {
        let deployment = deployment(&params()).unwrap();
        let liveness = executor(&deployment).liveness_probe.as_ref().unwrap();

        assert_eq!(
            liveness.exec.as_ref().unwrap().command.as_ref().unwrap(),
            &["jina", "ping", "executor", "127.0.0.1:8080", "--timeout", "9500"]
        );
        assert_eq!(liveness.initial_delay_seconds, Some(30));
        assert_eq!(liveness.period_seconds, Some(5));
        assert_eq!(liveness.timeout_seconds, Some(10));
        assert_eq!(liveness.failure_threshold, None);
    }

    #[test]
    fn test_environment_contract() {
        let deployment = deployment(&params()).unwrap();
        let env = executor(&deployment).env.as_ref().unwrap();

        let names = env.iter().map(|var| var.name.as_str()).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "POD_UID",
                "JINA_DEPLOYMENT_NAME",
                "K8S_DEPLOYMENT_NAME",
                "K8S_NAMESPACE_NAME",
                "K8S_POD_NAME"
            ]
        );

        let pod_uid = &env[0];
        assert_eq!(pod_uid.value, None);
        let field_ref =
            pod_uid.value_from.as_ref().unwrap().field_ref.as_ref().unwrap();
        assert_eq!(field_ref.field_path, "metadata.uid");

        assert_eq!(env[1].value.as_deref(), Some("enc"));
        assert_eq!(env[2].value.as_deref(), Some("enc-svc"));
        assert_eq!(env[3].value.as_deref(), Some("prod"));

        let pod_name = &env[4];
        assert_eq!(pod_name.value, None);
        let field_ref =
            pod_name.value_from.as_ref().unwrap().field_ref.as_ref().unwrap();
        assert_eq!(field_ref.field_path, "metadata.name");
    }

    #[test]
    fn test_env_from_references_derived_config_map() {
        let deployment = deployment(&params()).unwrap();
        let env_from = executor(&deployment).env_from.as_ref().unwrap();
        let config_map = env_from[0].config_map_ref.as_ref().unwrap();
        assert_eq!(config_map.name, "enc-svc-configmap");
    }

    #[test]
    fn test_pre_stop_hook_sleeps_before_termination() {
        let deployment = deployment(&params()).unwrap();
        let lifecycle = executor(&deployment).lifecycle.as_ref().unwrap();
        let pre_stop = lifecycle.pre_stop.as_ref().unwrap();
        assert_eq!(
            pre_stop.exec.as_ref().unwrap().command.as_ref().unwrap(),
            &["/bin/sh", "-c", "sleep 2"]
        );
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let params = params();
        assert_eq!(deployment(&params).unwrap(), deployment(&params).unwrap());
    }
}
