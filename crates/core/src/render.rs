//! Rendering of assembled manifests to YAML.

use k8s_openapi::api::apps::v1::Deployment;
use snafu::ResultExt;

use crate::manifest::{AssemblyError, error::SerializeManifestSnafu};

/// Renders the Deployment to a YAML document ready for submission to a
/// cluster API.
///
/// Pure formatting: nothing is validated here, and the output for a given
/// object is stable. Parsing the document back yields an equal Deployment.
///
/// # Errors
///
/// Returns [`AssemblyError::SerializeManifest`] when the object graph
/// cannot be encoded as YAML.
pub fn to_yaml(deployment: &Deployment) -> Result<String, AssemblyError> {
    serde_yaml::to_string(deployment).with_context(|_| SerializeManifestSnafu {
        name: deployment.metadata.name.clone().unwrap_or_default(),
    })
}
