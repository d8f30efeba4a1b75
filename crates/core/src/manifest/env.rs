use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ObjectFieldSelector};

use crate::{consts, params::DeploymentParams};

/// Value of one injected environment variable.
///
/// Identity fields of the pod (its UID, its generated name) do not exist
/// until the cluster schedules it, so those entries stay symbolic field
/// references instead of being resolved at generation time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EnvValue {
    Literal(String),
    FieldRef(&'static str),
}

/// One entry of the executor environment contract.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnvEntry {
    pub name: &'static str,
    pub value: EnvValue,
}

impl EnvEntry {
    /// Lowers the entry to its Kubernetes representation.
    #[must_use]
    pub fn into_env_var(self) -> EnvVar {
        let Self { name, value } = self;
        match value {
            EnvValue::Literal(value) => {
                EnvVar { name: name.to_string(), value: Some(value), ..EnvVar::default() }
            }
            EnvValue::FieldRef(field_path) => EnvVar {
                name: name.to_string(),
                value_from: Some(EnvVarSource {
                    field_ref: Some(ObjectFieldSelector {
                        api_version: Some("v1".to_string()),
                        field_path: field_path.to_string(),
                    }),
                    ..EnvVarSource::default()
                }),
                ..EnvVar::default()
            },
        }
    }
}

/// The fixed environment contract of the executor container, in the order
/// it appears in the manifest.
#[must_use]
pub fn environment(params: &DeploymentParams) -> Vec<EnvEntry> {
    vec![
        EnvEntry {
            name: consts::env::POD_UID,
            value: EnvValue::FieldRef(consts::field_paths::POD_UID),
        },
        EnvEntry {
            name: consts::env::JINA_DEPLOYMENT_NAME,
            value: EnvValue::Literal(params.jina_deployment_name.clone()),
        },
        EnvEntry {
            name: consts::env::K8S_DEPLOYMENT_NAME,
            value: EnvValue::Literal(params.name.clone()),
        },
        EnvEntry {
            name: consts::env::K8S_NAMESPACE_NAME,
            value: EnvValue::Literal(params.namespace.clone()),
        },
        EnvEntry {
            name: consts::env::K8S_POD_NAME,
            value: EnvValue::FieldRef(consts::field_paths::POD_NAME),
        },
    ]
}
