//! Rollout and lifecycle policy attached to every generated Deployment.
//!
//! These values are fixed, not parameters: all shards of a logical
//! deployment carry identical rollout and drain behaviour. Per pod the
//! encoded lifecycle is starting (gated by the startup probe, up to
//! `failureThreshold` periods), then live under liveness monitoring, then
//! a fixed drain sleep before the termination signal is delivered.

/// Extra replicas the cluster may create during a rollout.
pub const MAX_SURGE: i32 = 1;

/// Replicas the rollout may drop below the declared count: none.
pub const MAX_UNAVAILABLE: i32 = 0;

/// Delay before the first startup probe attempt.
pub const STARTUP_INITIAL_DELAY_SECONDS: i32 = 5;

/// Wall-clock budget for a single startup probe attempt.
pub const STARTUP_TIMEOUT_SECONDS: i32 = 10;

/// Delay before the first liveness probe attempt once startup has passed.
pub const LIVENESS_INITIAL_DELAY_SECONDS: i32 = 30;

/// Liveness probe cadence.
pub const LIVENESS_PERIOD_SECONDS: i32 = 5;

/// Wall-clock budget for a single liveness probe attempt.
pub const LIVENESS_TIMEOUT_SECONDS: i32 = 10;

/// Timeout handed to the liveness health check call itself, kept below
/// `LIVENESS_TIMEOUT_SECONDS` so the call fails before the probe does.
pub const HEALTH_CHECK_TIMEOUT_MS: u32 = 9_500;

/// Drain window slept in the pre-stop hook before termination proceeds.
pub const PRE_STOP_SECONDS: u32 = 2;
