#![warn(missing_docs)]
//! # vps-desk-ui
//!
//! ## Purpose
//! Defines the UI-facing runtime state model for `vps-desk`.
//!
//! ## Responsibilities
//! - Represent auth, account-load, modal, toast, and copy-glyph state.
//! - Track the blocking lease-expiry notice.
//! - Project the account mirror and gauge sample into render-ready fields.
//!
//! ## Data flow
//! Controller events mutate [`UiState`]; the rendering host reads
//! [`DashboardView`] snapshots produced by [`project_dashboard`].
//!
//! ## Ownership and lifetimes
//! `UiState` owns all of its values to keep event handling free of
//! cross-layer borrowing.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors; all timestamp
//! inputs are caller-provided so expiry logic stays deterministic.
//!
//! ## Security and privacy notes
//! UI state intentionally excludes identifiers and store payloads; toasts
//! carry only display text.

use vps_desk_core::{Account, DEFAULT_DISPLAY_NAME, format_remaining_time};
use vps_desk_gauges::GaugeView;

/// Toast lifetime before auto-dismissal, in milliseconds.
pub const TOAST_DISMISS_MS: u64 = 3_000;

/// Copy-confirmation glyph lifetime, in milliseconds.
pub const COPY_CONFIRM_MS: u64 = 2_000;

/// UI auth projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAuthState {
    /// No authenticated user.
    SignedOut,
    /// Valid authenticated session.
    SignedIn,
}

/// Account-load lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load attempted yet.
    NotLoaded,
    /// Mirror loaded and rendering.
    Loaded,
    /// Load failed; the retry prompt is visible.
    Failed,
}

/// Severity channel for toast styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastSeverity {
    /// Completed action.
    Success,
    /// Failed action.
    Error,
    /// Rejected precondition.
    Warning,
    /// Neutral progress notice.
    Info,
}

/// One stacked toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Display text.
    pub message: String,
    /// Styling severity.
    pub severity: ToastSeverity,
    /// Creation timestamp in epoch milliseconds.
    pub shown_at_ms: u64,
}

impl Toast {
    /// Returns `true` once the auto-dismiss window elapsed at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.shown_at_ms) >= TOAST_DISMISS_MS
    }
}

/// Modal dialogs the dashboard can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Ad-watch dialog with the claim gate.
    AdWatch,
    /// Lease-creation dialog.
    CreateLease,
    /// Connection-info dialog revealed after provisioning.
    ConnectionInfo,
}

/// One active clipboard-copy confirmation glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyConfirmation {
    /// Host-side control identifier the glyph replaces.
    pub control: String,
    /// Creation timestamp in epoch milliseconds.
    pub shown_at_ms: u64,
}

impl CopyConfirmation {
    /// Returns `true` once the glyph should revert at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.shown_at_ms) >= COPY_CONFIRM_MS
    }
}

/// Aggregate UI runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Current auth status.
    pub auth: UiAuthState,
    /// Account-load status driving the retry prompt.
    pub load: LoadStatus,
    /// Currently open modals, oldest first.
    pub open_modals: Vec<ModalKind>,
    /// Stacked toast notifications, oldest first.
    pub toasts: Vec<Toast>,
    /// Active copy-confirmation glyphs.
    pub copy_confirmations: Vec<CopyConfirmation>,
    /// Whether the blocking lease-expiry notice is visible.
    pub expiry_notice: bool,
}

impl UiState {
    /// Creates default UI state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            auth: UiAuthState::SignedOut,
            load: LoadStatus::NotLoaded,
            open_modals: Vec::new(),
            toasts: Vec::new(),
            copy_confirmations: Vec::new(),
            expiry_notice: false,
        }
    }

    /// Returns `true` when action controls should be live.
    pub fn can_run_actions(&self) -> bool {
        self.auth == UiAuthState::SignedIn && self.load == LoadStatus::Loaded
    }

    /// Returns `true` when the load-failure retry prompt is visible.
    pub fn retry_available(&self) -> bool {
        self.load == LoadStatus::Failed
    }

    /// Opens a modal; reopening an already-open modal is a no-op.
    pub fn open_modal(&mut self, kind: ModalKind) {
        if !self.is_modal_open(kind) {
            self.open_modals.push(kind);
        }
    }

    /// Closes a modal when open.
    pub fn close_modal(&mut self, kind: ModalKind) {
        self.open_modals.retain(|open| *open != kind);
    }

    /// Returns `true` when the given modal is open.
    pub fn is_modal_open(&self, kind: ModalKind) -> bool {
        self.open_modals.contains(&kind)
    }

    /// Handles a click on a modal's backdrop: closes that modal.
    pub fn click_outside(&mut self, kind: ModalKind) {
        self.close_modal(kind);
    }

    /// Appends one toast stamped at `now_ms`.
    pub fn push_toast(&mut self, message: impl Into<String>, severity: ToastSeverity, now_ms: u64) {
        self.toasts.push(Toast {
            message: message.into(),
            severity,
            shown_at_ms: now_ms,
        });
    }

    /// Drops toasts whose auto-dismiss window elapsed.
    pub fn prune_toasts(&mut self, now_ms: u64) {
        self.toasts.retain(|toast| !toast.is_expired(now_ms));
    }

    /// Shows the copy-confirmation glyph for one control.
    pub fn confirm_copy(&mut self, control: impl Into<String>, now_ms: u64) {
        let control = control.into();
        self.copy_confirmations
            .retain(|confirmation| confirmation.control != control);
        self.copy_confirmations.push(CopyConfirmation {
            control,
            shown_at_ms: now_ms,
        });
    }

    /// Drops copy glyphs whose revert window elapsed.
    pub fn prune_copy_confirmations(&mut self, now_ms: u64) {
        self.copy_confirmations
            .retain(|confirmation| !confirmation.is_expired(now_ms));
    }

    /// Returns `true` while the glyph for `control` is visible.
    pub fn copy_glyph_visible(&self, control: &str) -> bool {
        self.copy_confirmations
            .iter()
            .any(|confirmation| confirmation.control == control)
    }

    /// Raises the blocking lease-expiry notice.
    pub fn show_expiry_notice(&mut self) {
        self.expiry_notice = true;
    }

    /// Dismisses the blocking lease-expiry notice.
    pub fn dismiss_expiry_notice(&mut self) {
        self.expiry_notice = false;
    }
}

/// Render-ready dashboard field snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Presentation name.
    pub display_name: String,
    /// Avatar image location, when present.
    pub avatar_url: Option<String>,
    /// Points balance text for the header widget.
    pub points_text: String,
    /// Points balance text repeated inside the creation dialog.
    pub modal_points_text: String,
    /// Formatted `HH:MM:SS` lease countdown.
    pub countdown_text: String,
    /// Gauge render geometry.
    pub gauges: GaugeView,
}

/// Projects the mirror and the current gauge sample into render fields.
///
/// Pure function of its inputs: repeated calls without a mirror mutation in
/// between produce identical snapshots.
pub fn project_dashboard(account: Option<&Account>, gauges: GaugeView) -> DashboardView {
    let (display_name, avatar_url, points, vps_time_seconds) = match account {
        Some(account) => (
            account.display_name.clone(),
            account.avatar_url.clone(),
            account.points,
            account.vps_time_seconds,
        ),
        None => (DEFAULT_DISPLAY_NAME.to_string(), None, 0, 0),
    };

    let points_text = format_points(points);
    DashboardView {
        display_name,
        avatar_url,
        modal_points_text: points_text.clone(),
        points_text,
        countdown_text: format_remaining_time(vps_time_seconds),
        gauges,
    }
}

/// Formats a points balance with thousands separators.
pub fn format_points(points: u64) -> String {
    let digits = points.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
