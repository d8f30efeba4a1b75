//! Names shared by the assembler and its callers.

pub mod labels {
    //! Label keys applied to the generated pod template.

    /// Pod-selector key; its value is always the deployment name.
    pub const APP: &str = "app";

    /// Logical deployment the shard belongs to.
    pub const JINA_DEPLOYMENT_NAME: &str = "jina_deployment_name";

    /// Shard index within the logical deployment.
    pub const SHARD_ID: &str = "shard_id";

    /// Role of the pod in the deployment topology.
    pub const POD_TYPE: &str = "pod_type";

    /// Namespace echo, for filtering without a field selector.
    pub const NS: &str = "ns";
}

pub mod env {
    //! Environment variable names injected into the executor container.

    pub const POD_UID: &str = "POD_UID";
    pub const JINA_DEPLOYMENT_NAME: &str = "JINA_DEPLOYMENT_NAME";
    pub const K8S_DEPLOYMENT_NAME: &str = "K8S_DEPLOYMENT_NAME";
    pub const K8S_NAMESPACE_NAME: &str = "K8S_NAMESPACE_NAME";
    pub const K8S_POD_NAME: &str = "K8S_POD_NAME";
}

pub mod field_paths {
    //! Downward API field paths, resolved by the kubelet after scheduling.

    pub const POD_UID: &str = "metadata.uid";
    pub const POD_NAME: &str = "metadata.name";
}

/// Name of the single container in the generated pod template.
pub const EXECUTOR_CONTAINER_NAME: &str = "executor";

/// Health check binary invoked by both probes.
pub const HEALTH_CHECK_BINARY: &str = "jina";

/// Address the probes dial; executors always answer on loopback.
pub const PROBE_ADDRESS: &str = "127.0.0.1";

/// Suffix appended to the deployment name to form the config map reference.
pub const CONFIG_MAP_SUFFIX: &str = "-configmap";
