#![warn(missing_docs)]
//! # vps-desk-app
//!
//! ## Purpose
//! Orchestrates auth, account mirroring, countdowns, gauges, provisioning,
//! and UI state for `vps-desk`.
//!
//! ## Responsibilities
//! - Own the per-session [`DashboardController`] and its handler protocol:
//!   validate precondition, commit the remote update, mutate the mirror,
//!   re-render, toast.
//! - Guard every handler against reentrant invocation.
//! - Provide runtime configuration (kill switch, store timeout budget) from
//!   environment variables.
//! - Provide per-run file logging for handler and countdown activity.
//!
//! ## Data flow
//! Auth snapshot -> session guard -> account load -> render loop; host timers
//! drive the lease countdown, ad gate, and gauge refresh; action handlers
//! push updates through the store client before touching the mirror.
//!
//! ## Ownership and lifetimes
//! The controller owns all session state and is constructed on sign-in and
//! discarded on sign-out; collaborators arrive as `Arc` trait objects.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. User-visible failures
//! (precondition, remote update, timeout) surface as toasts and outcome
//! values, not as `Err` returns.
//!
//! ## Security and privacy notes
//! - Point-mutating handlers honor the `VPS_DESK_ACTIONS_ENABLED` kill
//!   switch.
//! - Log lines carry stage/action labels and counters, never identity or
//!   document payloads.

pub mod controller;
pub mod logging;

use std::sync::Arc;

use thiserror::Error;
use vps_desk_auth::AuthError;
use vps_desk_core::CoreError;
use vps_desk_countdown::{CountdownError, TickCadence};
use vps_desk_provision::Provisioner;
use vps_desk_store::{
    DEFAULT_UPDATE_TIMEOUT_MS, StoreClient, StoreError, StorePolicy, StoreTransport,
};

pub use controller::{
    ActionOutcome, AuthChangeOutcome, DashboardController, PendingReveal,
};

/// Build-time application version loaded from root `VERSION`.
pub const APP_VERSION: &str = env!("VPS_DESK_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Consolidated runtime status snapshot for simple host projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Whether auth/load gates and the kill switch currently allow actions.
    pub actions_allowed: bool,
    /// Auth state as human-readable string.
    pub auth: String,
    /// Account-load state.
    pub load: String,
    /// Lease countdown phase.
    pub countdown: String,
    /// Number of toasts currently stacked.
    pub open_toasts: usize,
}

/// Projects controller state into a flat status snapshot.
pub fn project_runtime_status(controller: &DashboardController) -> RuntimeStatus {
    let ui = controller.ui();
    RuntimeStatus {
        actions_allowed: ui.can_run_actions() && actions_enabled_from_env(),
        auth: format!("{:?}", ui.auth),
        load: format!("{:?}", ui.load),
        countdown: format!("{:?}", controller.countdown_phase()),
        open_toasts: ui.toasts.len(),
    }
}

/// Checks the runtime kill-switch env var.
///
/// Semantics:
/// - Unset => actions enabled.
/// - `0`, `false`, `off` (case-insensitive) => actions disabled.
/// - Any other value => actions enabled.
pub fn actions_enabled_from_env() -> bool {
    match std::env::var("VPS_DESK_ACTIONS_ENABLED") {
        Ok(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        Err(_) => true,
    }
}

/// Reads the store timeout budget from `VPS_DESK_STORE_TIMEOUT_MS`.
///
/// Unset, unparsable, or zero values fall back to the default budget.
pub fn store_timeout_from_env() -> u64 {
    std::env::var("VPS_DESK_STORE_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|timeout_ms| *timeout_ms > 0)
        .unwrap_or(DEFAULT_UPDATE_TIMEOUT_MS)
}

/// Builds the store policy from environment configuration.
pub fn store_policy_from_env() -> StorePolicy {
    StorePolicy {
        timeout_ms: store_timeout_from_env(),
    }
}

/// Schedules deterministic host-timer fire times at the given cadence.
///
/// # Errors
/// Returns [`AppError::Countdown`] when the cadence interval is zero.
pub fn schedule_ticks(
    interval_ms: u64,
    start_ms: u64,
    count: usize,
) -> Result<Vec<u64>, AppError> {
    let cadence = TickCadence::new(interval_ms).map_err(AppError::Countdown)?;
    Ok(cadence.scheduled_times(start_ms, count))
}

/// Builds a controller over the given collaborators with env-driven policy.
///
/// # Errors
/// Returns [`AppError::Store`] when the store endpoint violates client
/// policy.
pub fn build_dashboard(
    endpoint: impl Into<String>,
    transport: Arc<dyn StoreTransport>,
    provisioner: Arc<dyn Provisioner>,
) -> Result<DashboardController, AppError> {
    let client = StoreClient::new(endpoint, store_policy_from_env(), transport)?;
    Ok(DashboardController::new(client, provisioner))
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session guard error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    /// Account model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// Store client error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Tick cadence error.
    #[error("countdown error: {0}")]
    Countdown(CountdownError),
    /// A handler was invoked before the account mirror was loaded.
    #[error("dashboard is not initialized")]
    NotLoaded,
}
