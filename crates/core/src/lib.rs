//! Core model for sharded executor Deployments: a validated parameter set,
//! a pure manifest assembler carrying the fixed rollout and lifecycle
//! policy, and a YAML renderer. No I/O happens here; every function is a
//! plain value transformation.

pub mod consts;
pub mod manifest;
pub mod params;
pub mod render;

pub use self::{
    manifest::{AssemblyError, EnvEntry, EnvValue},
    params::{DeploymentParams, ImagePullPolicy, RawDeploymentParams, ValidationError, Violation},
};
