//! Per-session dashboard controller.
//!
//! Owns the account mirror, the lease and ad countdowns, the gauge simulator,
//! and all UI state. Every action handler follows one protocol: validate the
//! precondition, commit the remote update, mutate the mirror, re-render,
//! toast. Handlers are guarded against reentrant invocation with per-handler
//! busy flags.

use std::sync::Arc;

use vps_desk_auth::{GuardDirective, IdentityHandle, SessionGuard};
use vps_desk_core::{
    AD_REWARD_POINTS, Account, EXTEND_LEASE_COST_POINTS, EXTEND_LEASE_HOURS, LeaseOption,
    SECONDS_PER_HOUR,
};
use vps_desk_countdown::{AdGate, CountdownPhase, LeaseCountdown, TickEffect};
use vps_desk_gauges::{GaugeSample, GaugeSimulator, GaugeView, project_gauges};
use vps_desk_provision::{ConnectionEndpoints, ProvisionRequest, Provisioner};
use vps_desk_store::{AccountUpdate, StoreClient};
use vps_desk_ui::{DashboardView, LoadStatus, ModalKind, ToastSeverity, UiAuthState, UiState};

use crate::logging::{log_error, log_info};
use crate::{AppError, actions_enabled_from_env, app_version};

/// Result of one handler invocation, surfaced to the host for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Remote update committed and the mirror was updated.
    Committed,
    /// A precondition rejected the action; a toast was shown.
    Rejected,
    /// The invocation was ignored (reentrant call, kill switch, or a
    /// declined confirmation).
    Ignored,
    /// The remote update failed; the mirror is untouched and an error toast
    /// was shown.
    Failed,
}

/// Result of one observed auth-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeOutcome {
    /// First sign-in: the mirror loaded and the dashboard started.
    DashboardLoaded,
    /// First sign-in, but the account load failed; the retry prompt is up.
    LoadFailed,
    /// Identity unchanged; nothing to do.
    AlreadyActive,
    /// Signed out: session state was discarded and the host must navigate to
    /// [`vps_desk_auth::LANDING_PAGE`].
    Redirect,
}

/// Provisioning result waiting for its artificial readiness delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReveal {
    /// Endpoints to surface once the delay elapses.
    pub endpoints: ConnectionEndpoints,
    /// Epoch milliseconds at which the reveal becomes due.
    pub reveal_at_ms: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ActionFlags {
    claim_ad: bool,
    create_lease: bool,
    extend_lease: bool,
    stop_lease: bool,
}

/// Session-scoped orchestrator constructed on sign-in.
pub struct DashboardController {
    store: StoreClient,
    provisioner: Arc<dyn Provisioner>,
    guard: SessionGuard,
    identity: Option<IdentityHandle>,
    account_id: Option<String>,
    account: Option<Account>,
    ui: UiState,
    countdown: LeaseCountdown,
    gauges: GaugeSimulator,
    gauge_view: GaugeView,
    ad_gate: Option<AdGate>,
    pending_reveal: Option<PendingReveal>,
    revealed_endpoints: Option<ConnectionEndpoints>,
    busy: ActionFlags,
}

impl DashboardController {
    /// Creates a controller with no session.
    pub fn new(store: StoreClient, provisioner: Arc<dyn Provisioner>) -> Self {
        Self {
            store,
            provisioner,
            guard: SessionGuard::new(),
            identity: None,
            account_id: None,
            account: None,
            ui: UiState::new(app_version()),
            countdown: LeaseCountdown::new(),
            gauges: GaugeSimulator::new(),
            gauge_view: project_gauges(GaugeSample {
                cpu_percent: 0,
                ram_used_gb: 0.0,
                storage_used_gb: 0,
            }),
            ad_gate: None,
            pending_reveal: None,
            revealed_endpoints: None,
            busy: ActionFlags::default(),
        }
    }

    /// Replaces the gauge simulator; used to pin samples in tests.
    pub fn with_gauges(mut self, gauges: GaugeSimulator) -> Self {
        self.gauges = gauges;
        self
    }

    /// Applies one observed auth-state snapshot.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when the provider hands over an unusable
    /// identity.
    pub fn handle_auth_change(
        &mut self,
        snapshot: Option<IdentityHandle>,
    ) -> Result<AuthChangeOutcome, AppError> {
        match self.guard.observe(snapshot)? {
            GuardDirective::LoadDashboard(handle) => {
                self.ui.auth = UiAuthState::SignedIn;
                self.account_id = Some(handle.user_id.clone());
                self.identity = Some(handle);
                if self.load_account() {
                    Ok(AuthChangeOutcome::DashboardLoaded)
                } else {
                    Ok(AuthChangeOutcome::LoadFailed)
                }
            }
            GuardDirective::AlreadyActive => Ok(AuthChangeOutcome::AlreadyActive),
            GuardDirective::RedirectToLanding => {
                self.teardown();
                Ok(AuthChangeOutcome::Redirect)
            }
        }
    }

    /// Re-attempts a failed account load; user-initiated from the retry
    /// prompt.
    pub fn retry_load(&mut self) -> bool {
        log_info("account", "load_retry", "user requested account reload");
        self.load_account()
    }

    fn load_account(&mut self) -> bool {
        let Some(account_id) = self.account_id.clone() else {
            return false;
        };

        let document = match self.store.fetch_account(&account_id) {
            Ok(document) => document,
            Err(error) => {
                self.ui.load = LoadStatus::Failed;
                log_error("account", "load_failed", &error.to_string());
                return false;
            }
        };

        let mut account = match Account::from_document(&document) {
            Ok(account) => account,
            Err(error) => {
                self.ui.load = LoadStatus::Failed;
                log_error("account", "load_invalid", &error.to_string());
                return false;
            }
        };

        // Provider profile fills presentation gaps the document leaves open.
        if let Some(identity) = &self.identity {
            if document.display_name.is_none()
                && let Some(name) = &identity.display_name
            {
                account.display_name = name.clone();
            }
            if account.avatar_url.is_none() {
                account.avatar_url = identity.avatar_url.clone();
            }
        }

        let lease_active = account.has_active_lease();
        self.account = Some(account);
        self.ui.load = LoadStatus::Loaded;
        self.refresh_countdown();
        self.refresh_gauges();
        log_info(
            "account",
            "load_success",
            &format!("lease_active={lease_active}"),
        );
        true
    }

    fn teardown(&mut self) {
        self.identity = None;
        self.account_id = None;
        self.account = None;
        self.countdown.cancel();
        self.ad_gate = None;
        self.pending_reveal = None;
        self.revealed_endpoints = None;
        self.busy = ActionFlags::default();
        self.ui = UiState::new(self.ui.version.clone());
        log_info("session", "teardown", "session state discarded");
    }

    fn refresh_countdown(&mut self) {
        let remaining = self
            .account
            .as_ref()
            .map_or(0, |account| account.vps_time_seconds);
        if self.countdown.try_start(remaining) {
            log_info(
                "lease",
                "countdown_started",
                &format!("remaining_seconds={remaining}"),
            );
        }
    }

    /// Consumes one 1-second lease tick, persisting throttled checkpoints.
    pub fn on_lease_tick(&mut self) -> TickEffect {
        let Some(remaining) = self
            .account
            .as_ref()
            .map(|account| account.vps_time_seconds)
        else {
            return TickEffect {
                remaining_seconds: 0,
                persist_due: false,
                expired: false,
            };
        };

        let effect = self.countdown.tick(remaining);
        if let Some(account) = self.account.as_mut() {
            account.vps_time_seconds = effect.remaining_seconds;
        }

        if effect.persist_due
            && let Some(account_id) = self.account_id.clone()
        {
            let update = AccountUpdate::new().set_vps_time(effect.remaining_seconds as i64);
            match self.store.update_account(&account_id, update) {
                Ok(_) => log_info(
                    "lease",
                    "persisted",
                    &format!("remaining_seconds={}", effect.remaining_seconds),
                ),
                // Background checkpoint; the next multiple-of-60 tick retries.
                Err(error) => log_error("lease", "persist_failed", &error.to_string()),
            }
        }

        if effect.expired {
            self.ui.show_expiry_notice();
            log_info("lease", "expired", "countdown reached zero");
        }

        effect
    }

    /// Draws a fresh gauge sample; fired every five seconds by the host.
    pub fn refresh_gauges(&mut self) {
        self.gauge_view = project_gauges(self.gauges.sample());
    }

    /// Projects the current mirror and gauge sample into render fields.
    pub fn render(&self) -> DashboardView {
        vps_desk_ui::project_dashboard(self.account.as_ref(), self.gauge_view)
    }

    /// Opens the ad dialog and arms a fresh claim gate.
    pub fn open_ad_dialog(&mut self) {
        self.ui.open_modal(ModalKind::AdWatch);
        self.ad_gate = Some(AdGate::new());
        log_info("actions", "ad_dialog_opened", "claim gate armed");
    }

    /// Consumes one 1-second ad-gate tick while the ad dialog is open.
    ///
    /// # Returns
    /// Remaining gate seconds, or `None` when no gate is armed.
    pub fn on_ad_gate_tick(&mut self) -> Option<u32> {
        self.ad_gate.as_mut().map(AdGate::tick)
    }

    /// Claims the fixed ad reward once the gate window elapsed.
    ///
    /// # Errors
    /// Returns [`AppError::NotLoaded`] when no mirror is loaded and
    /// [`AppError::Core`] when a committed remote update cannot be mirrored.
    pub fn claim_ad_reward(&mut self, now_ms: u64) -> Result<ActionOutcome, AppError> {
        if self.busy.claim_ad {
            log_info("actions", "claim_ignored", "claim already in flight");
            return Ok(ActionOutcome::Ignored);
        }
        if !actions_enabled_from_env() {
            self.ui
                .push_toast("Actions are currently disabled", ToastSeverity::Warning, now_ms);
            return Ok(ActionOutcome::Ignored);
        }
        if self.account.is_none() {
            return Err(AppError::NotLoaded);
        }
        if !self.ad_gate.as_ref().is_some_and(AdGate::is_complete) {
            self.ui.push_toast(
                "Finish the ad before claiming points",
                ToastSeverity::Warning,
                now_ms,
            );
            return Ok(ActionOutcome::Rejected);
        }

        self.busy.claim_ad = true;
        let outcome = self.commit_claim(now_ms);
        self.busy.claim_ad = false;
        outcome
    }

    fn commit_claim(&mut self, now_ms: u64) -> Result<ActionOutcome, AppError> {
        let account_id = self.account_id.clone().ok_or(AppError::NotLoaded)?;
        let update = AccountUpdate::new()
            .increment_points(AD_REWARD_POINTS as i64)
            .increment_daily_ads(1);

        if let Err(error) = self.store.update_account(&account_id, update) {
            log_error("actions", "claim_failed", &error.to_string());
            self.ui
                .push_toast("Error claiming points", ToastSeverity::Error, now_ms);
            return Ok(ActionOutcome::Failed);
        }

        let account = self.account.as_mut().ok_or(AppError::NotLoaded)?;
        account.commit_reward(AD_REWARD_POINTS)?;
        let daily_ads = account.daily_ads;

        self.ad_gate = None;
        self.ui.close_modal(ModalKind::AdWatch);
        self.ui
            .push_toast("+5 points earned", ToastSeverity::Success, now_ms);
        log_info("actions", "claim_success", &format!("daily_ads={daily_ads}"));
        Ok(ActionOutcome::Committed)
    }

    /// Purchases a new lease from the selected creation-dialog option.
    ///
    /// The busy flag stays held until [`DashboardController::poll_provision`]
    /// reveals the connection endpoints, so a second create while
    /// provisioning is in flight is ignored.
    ///
    /// # Errors
    /// Returns [`AppError::NotLoaded`] when no mirror is loaded and
    /// [`AppError::Core`] when a committed remote update cannot be mirrored.
    pub fn create_lease(
        &mut self,
        option: LeaseOption,
        os_version: &str,
        language: &str,
        now_ms: u64,
    ) -> Result<ActionOutcome, AppError> {
        if self.busy.create_lease {
            log_info("actions", "create_ignored", "create already in flight");
            return Ok(ActionOutcome::Ignored);
        }
        if !actions_enabled_from_env() {
            self.ui
                .push_toast("Actions are currently disabled", ToastSeverity::Warning, now_ms);
            return Ok(ActionOutcome::Ignored);
        }
        let account = self.account.as_ref().ok_or(AppError::NotLoaded)?;
        if !account.can_afford(option.cost_points) {
            self.ui
                .push_toast("Not enough points", ToastSeverity::Error, now_ms);
            log_info(
                "actions",
                "create_rejected",
                &format!("cost={} balance={}", option.cost_points, account.points),
            );
            return Ok(ActionOutcome::Rejected);
        }

        self.busy.create_lease = true;
        let account_id = self.account_id.clone().ok_or(AppError::NotLoaded)?;
        let grant_seconds = option.grant_seconds();
        let update = AccountUpdate::new()
            .increment_points(-(option.cost_points as i64))
            .increment_vps_time(grant_seconds as i64);

        if let Err(error) = self.store.update_account(&account_id, update) {
            self.busy.create_lease = false;
            log_error("actions", "create_failed", &error.to_string());
            self.ui
                .push_toast("Error creating server", ToastSeverity::Error, now_ms);
            return Ok(ActionOutcome::Failed);
        }

        let account = self.account.as_mut().ok_or(AppError::NotLoaded)?;
        account.commit_spend(option.cost_points, grant_seconds)?;

        self.ui.close_modal(ModalKind::CreateLease);
        self.ui.dismiss_expiry_notice();
        self.refresh_countdown();
        self.ui
            .push_toast("Creating server...", ToastSeverity::Info, now_ms);
        log_info(
            "actions",
            "create_committed",
            &format!("hours={} cost={}", option.hours, option.cost_points),
        );

        let request = ProvisionRequest {
            lease_hours: option.hours,
            os_version: os_version.to_string(),
            language: language.to_string(),
        };
        match self.provisioner.provision(&request) {
            Ok(ticket) => {
                self.pending_reveal = Some(PendingReveal {
                    endpoints: ticket.endpoints,
                    reveal_at_ms: now_ms.saturating_add(ticket.ready_after_ms),
                });
                log_info(
                    "provision",
                    "requested",
                    &format!("ready_after_ms={}", ticket.ready_after_ms),
                );
            }
            Err(error) => {
                self.busy.create_lease = false;
                log_error("provision", "request_failed", &error.to_string());
                self.ui.push_toast(
                    "Error preparing connection details",
                    ToastSeverity::Error,
                    now_ms,
                );
            }
        }

        Ok(ActionOutcome::Committed)
    }

    /// Reveals provisioned endpoints once their readiness delay elapsed.
    ///
    /// # Returns
    /// The endpoints on the call that performs the reveal, `None` otherwise.
    pub fn poll_provision(&mut self, now_ms: u64) -> Option<ConnectionEndpoints> {
        if !self
            .pending_reveal
            .as_ref()
            .is_some_and(|pending| now_ms >= pending.reveal_at_ms)
        {
            return None;
        }

        let pending = self.pending_reveal.take()?;
        self.revealed_endpoints = Some(pending.endpoints.clone());
        self.ui.open_modal(ModalKind::ConnectionInfo);
        self.ui
            .push_toast("Server created successfully", ToastSeverity::Success, now_ms);
        self.busy.create_lease = false;
        log_info("provision", "revealed", "connection endpoints ready");
        Some(pending.endpoints)
    }

    /// Extends the active lease by the fixed paid extension.
    ///
    /// # Errors
    /// Returns [`AppError::NotLoaded`] when no mirror is loaded and
    /// [`AppError::Core`] when a committed remote update cannot be mirrored.
    pub fn extend_lease(&mut self, now_ms: u64) -> Result<ActionOutcome, AppError> {
        if self.busy.extend_lease {
            log_info("actions", "extend_ignored", "extend already in flight");
            return Ok(ActionOutcome::Ignored);
        }
        if !actions_enabled_from_env() {
            self.ui
                .push_toast("Actions are currently disabled", ToastSeverity::Warning, now_ms);
            return Ok(ActionOutcome::Ignored);
        }
        let account = self.account.as_ref().ok_or(AppError::NotLoaded)?;
        if !account.can_afford(EXTEND_LEASE_COST_POINTS) {
            self.ui.push_toast(
                "Not enough points, extension costs 300",
                ToastSeverity::Error,
                now_ms,
            );
            return Ok(ActionOutcome::Rejected);
        }

        self.busy.extend_lease = true;
        let outcome = self.commit_extend(now_ms);
        self.busy.extend_lease = false;
        outcome
    }

    fn commit_extend(&mut self, now_ms: u64) -> Result<ActionOutcome, AppError> {
        let account_id = self.account_id.clone().ok_or(AppError::NotLoaded)?;
        let grant_seconds = u64::from(EXTEND_LEASE_HOURS) * SECONDS_PER_HOUR;
        let update = AccountUpdate::new()
            .increment_points(-(EXTEND_LEASE_COST_POINTS as i64))
            .increment_vps_time(grant_seconds as i64);

        if let Err(error) = self.store.update_account(&account_id, update) {
            log_error("actions", "extend_failed", &error.to_string());
            self.ui
                .push_toast("Error extending server time", ToastSeverity::Error, now_ms);
            return Ok(ActionOutcome::Failed);
        }

        let account = self.account.as_mut().ok_or(AppError::NotLoaded)?;
        account.commit_spend(EXTEND_LEASE_COST_POINTS, grant_seconds)?;

        self.ui.dismiss_expiry_notice();
        self.refresh_countdown();
        self.ui
            .push_toast("+6 hours added to your server", ToastSeverity::Success, now_ms);
        log_info(
            "actions",
            "extend_success",
            &format!("grant_seconds={grant_seconds}"),
        );
        Ok(ActionOutcome::Committed)
    }

    /// Stops the active lease, discarding its remaining time.
    ///
    /// `confirmed` carries the host's destructive-confirmation answer; a
    /// declined confirmation leaves all state untouched.
    ///
    /// # Errors
    /// Returns [`AppError::NotLoaded`] when no mirror is loaded.
    pub fn stop_lease(&mut self, confirmed: bool, now_ms: u64) -> Result<ActionOutcome, AppError> {
        if self.busy.stop_lease {
            log_info("actions", "stop_ignored", "stop already in flight");
            return Ok(ActionOutcome::Ignored);
        }
        if !actions_enabled_from_env() {
            self.ui
                .push_toast("Actions are currently disabled", ToastSeverity::Warning, now_ms);
            return Ok(ActionOutcome::Ignored);
        }
        let account = self.account.as_ref().ok_or(AppError::NotLoaded)?;
        if !account.has_active_lease() {
            self.ui
                .push_toast("No active server to stop", ToastSeverity::Warning, now_ms);
            return Ok(ActionOutcome::Rejected);
        }
        if !confirmed {
            log_info("actions", "stop_declined", "confirmation dismissed");
            return Ok(ActionOutcome::Ignored);
        }

        self.busy.stop_lease = true;
        let outcome = self.commit_stop(now_ms);
        self.busy.stop_lease = false;
        outcome
    }

    fn commit_stop(&mut self, now_ms: u64) -> Result<ActionOutcome, AppError> {
        let account_id = self.account_id.clone().ok_or(AppError::NotLoaded)?;
        let update = AccountUpdate::new().set_vps_time(0);

        if let Err(error) = self.store.update_account(&account_id, update) {
            log_error("actions", "stop_failed", &error.to_string());
            self.ui
                .push_toast("Error stopping server", ToastSeverity::Error, now_ms);
            return Ok(ActionOutcome::Failed);
        }

        let account = self.account.as_mut().ok_or(AppError::NotLoaded)?;
        account.clear_lease();
        self.countdown.cancel();
        self.ui
            .push_toast("Server stopped", ToastSeverity::Info, now_ms);
        log_info("actions", "stop_success", "lease cleared");
        Ok(ActionOutcome::Committed)
    }

    /// Records a clipboard copy so the host shows the confirmation glyph.
    pub fn confirm_copy(&mut self, control: &str, now_ms: u64) {
        self.ui.confirm_copy(control, now_ms);
    }

    /// Drops expired toasts and copy glyphs.
    pub fn prune_transients(&mut self, now_ms: u64) {
        self.ui.prune_toasts(now_ms);
        self.ui.prune_copy_confirmations(now_ms);
    }

    /// Returns the account mirror, when loaded.
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Returns the UI state snapshot.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Returns mutable UI state for host-side modal plumbing.
    pub fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    /// Returns the lease countdown phase.
    pub fn countdown_phase(&self) -> CountdownPhase {
        self.countdown.phase()
    }

    /// Returns the seconds left on the ad gate, when armed.
    pub fn ad_gate_remaining(&self) -> Option<u32> {
        self.ad_gate.as_ref().map(AdGate::remaining_seconds)
    }

    /// Returns `true` while a provisioning reveal is outstanding.
    pub fn provision_pending(&self) -> bool {
        self.pending_reveal.is_some()
    }

    /// Returns the endpoints shown in the connection-info dialog.
    pub fn revealed_endpoints(&self) -> Option<&ConnectionEndpoints> {
        self.revealed_endpoints.as_ref()
    }
}
