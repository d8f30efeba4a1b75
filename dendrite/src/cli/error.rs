use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    InvalidParameters { source: dendrite_core::params::ValidationError },

    #[snafu(display("{source}"))]
    Assembly { source: dendrite_core::manifest::AssemblyError },

    #[snafu(display("No parameters file was given and the configuration defines no default"))]
    NoParametersFile,

    #[snafu(display("Failed to resolve file path {}, error: {source}", file_path.display()))]
    ResolveFilePath { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to open parameters file {}, error: {source}", filename.display()))]
    OpenParameters { filename: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse parameters file {}, error: {source}", filename.display()))]
    ParseParameters { filename: PathBuf, source: serde_yaml::Error },

    #[snafu(display("Invalid override '{expression}', expected FIELD=VALUE"))]
    MalformedOverride { expression: String },

    #[snafu(display("'{field}' is not a deployment parameter"))]
    UnknownOverrideField { field: String },

    #[snafu(display("Invalid value '{value}' for '{field}', error: {source}"))]
    InvalidOverrideValue { field: String, value: String, source: std::num::ParseIntError },

    #[snafu(display("Failed to write manifest to {}, error: {source}", path.display()))]
    WriteManifest { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to initialize Kubernetes client configuration, error: {source}"))]
    KubeConfig { source: kube::Error },

    #[snafu(display(
        "Failed to apply deployment {name} in namespace {namespace}, error: {source}"
    ))]
    ApplyDeployment {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Failed to get deployment {name} status in namespace {namespace}, error: {source}"
    ))]
    GetDeployment {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::Error, Box::new)))]
        source: Box<kube::Error>,
    },

    #[snafu(display(
        "Timed out waiting for deployment '{name}' to finish rolling out in namespace '{namespace}'"
    ))]
    WaitForRollout { namespace: String, name: String },

    #[snafu(display(
        "Failed to wait for deployment {name} rollout in namespace {namespace}, error: {source}"
    ))]
    WatchRollout {
        namespace: String,
        name: String,
        #[snafu(source(from(kube::runtime::wait::Error, Box::new)))]
        source: Box<kube::runtime::wait::Error>,
    },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<dendrite_core::params::ValidationError> for Error {
    fn from(source: dendrite_core::params::ValidationError) -> Self {
        Self::InvalidParameters { source }
    }
}

impl From<dendrite_core::manifest::AssemblyError> for Error {
    fn from(source: dendrite_core::manifest::AssemblyError) -> Self { Self::Assembly { source } }
}
