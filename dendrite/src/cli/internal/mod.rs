//! Internal utilities and extensions for CLI commands.
//!
//! This module provides the pieces commands share: an extension trait for
//! watching Deployment rollouts and the resolver that turns a parameters
//! file plus command-line overrides into a validated parameter set.

mod api_deployment;
mod params_source;

pub use self::{api_deployment::ApiDeploymentExt, params_source::ParamsSource};
