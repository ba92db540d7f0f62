#![warn(missing_docs)]
//! # vps-desk-auth
//!
//! ## Purpose
//! Implements session observation and the sign-in guard for `vps-desk`.
//!
//! ## Responsibilities
//! - Model the identity handle delivered by the external provider.
//! - Decide, per auth-state change, whether to start the dashboard exactly
//!   once or redirect to the landing page.
//! - Sanitize provider-supplied avatar locations to HTTPS-only URLs.
//!
//! ## Data flow
//! Host polls [`IdentityProvider`] -> snapshot becomes an [`AuthEvent`] ->
//! [`SessionGuard::on_auth_event`] yields a [`GuardDirective`] the controller
//! acts on (load mirror, tear down, or nothing).
//!
//! ## Ownership and lifetimes
//! Identity values are owned (`String`) to decouple provider SDK lifetimes
//! from guard state.
//!
//! ## Error model
//! Malformed identities are surfaced as [`AuthError`], allowing the host to
//! stay on the landing page instead of starting a broken session.
//!
//! ## Security and privacy notes
//! This crate never logs identity values. Avatar URLs from the provider are
//! dropped unless they parse as `https`.
//!
//! ## Example
//! ```rust
//! use vps_desk_auth::{AuthEvent, GuardDirective, SessionGuard};
//!
//! let mut guard = SessionGuard::new();
//! let directive = guard.on_auth_event(AuthEvent::SignedOut).unwrap();
//! assert!(matches!(directive, GuardDirective::RedirectToLanding));
//! ```

use thiserror::Error;
use url::Url;

/// Landing page target for unauthenticated visitors.
pub const LANDING_PAGE: &str = "index.html";

/// Identity snapshot delivered by the external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityHandle {
    /// Stable user identifier; keys the remote account document.
    pub user_id: String,
    /// Presentation name from the provider profile, when present.
    pub display_name: Option<String>,
    /// Avatar image location from the provider profile, when present.
    pub avatar_url: Option<String>,
}

/// One observed change of the provider's auth state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A user is signed in.
    SignedIn(IdentityHandle),
    /// No user is signed in (including the initial unauthenticated load).
    SignedOut,
}

/// Current guard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No authenticated identity.
    SignedOut,
    /// Authenticated with the contained identity.
    SignedIn(IdentityHandle),
}

/// Action the controller must take after an auth-state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDirective {
    /// First sign-in of this session: load the account mirror and start the
    /// dashboard.
    LoadDashboard(IdentityHandle),
    /// Identity unchanged and the dashboard is already started.
    AlreadyActive,
    /// No identity: discard session state and navigate to [`LANDING_PAGE`].
    RedirectToLanding,
}

/// Session guard with explicit one-time dashboard start semantics.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    state: SessionState,
    dashboard_started: bool,
}

impl SessionGuard {
    /// Creates a guard in the signed-out state.
    pub fn new() -> Self {
        Self {
            state: SessionState::SignedOut,
            dashboard_started: false,
        }
    }

    /// Returns the current session state snapshot.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the signed-in identity, when present.
    pub fn identity(&self) -> Option<&IdentityHandle> {
        match &self.state {
            SessionState::SignedIn(handle) => Some(handle),
            SessionState::SignedOut => None,
        }
    }

    /// Applies one auth-state change.
    ///
    /// Repeated sign-in events for the same user yield
    /// [`GuardDirective::AlreadyActive`] so the account load happens exactly
    /// once per session; a sign-in under a different user id starts a fresh
    /// session.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidIdentity`] when the provider hands over a
    /// blank user id.
    pub fn on_auth_event(&mut self, event: AuthEvent) -> Result<GuardDirective, AuthError> {
        match event {
            AuthEvent::SignedIn(handle) => {
                if handle.user_id.trim().is_empty() {
                    return Err(AuthError::InvalidIdentity(
                        "provider delivered an empty user id".to_string(),
                    ));
                }

                let same_user = matches!(
                    &self.state,
                    SessionState::SignedIn(current) if current.user_id == handle.user_id
                );
                if same_user && self.dashboard_started {
                    return Ok(GuardDirective::AlreadyActive);
                }

                let handle = IdentityHandle {
                    avatar_url: sanitize_avatar_url(handle.avatar_url.as_deref()),
                    ..handle
                };
                self.state = SessionState::SignedIn(handle.clone());
                self.dashboard_started = true;
                Ok(GuardDirective::LoadDashboard(handle))
            }
            AuthEvent::SignedOut => {
                self.state = SessionState::SignedOut;
                self.dashboard_started = false;
                Ok(GuardDirective::RedirectToLanding)
            }
        }
    }

    /// Convenience wrapper turning a provider snapshot into an event.
    ///
    /// # Errors
    /// Propagates [`SessionGuard::on_auth_event`] failures.
    pub fn observe(
        &mut self,
        snapshot: Option<IdentityHandle>,
    ) -> Result<GuardDirective, AuthError> {
        match snapshot {
            Some(handle) => self.on_auth_event(AuthEvent::SignedIn(handle)),
            None => self.on_auth_event(AuthEvent::SignedOut),
        }
    }
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Abstract identity provider consumed by the host loop.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current identity, or `None` when signed out.
    fn current_identity(&self) -> Option<IdentityHandle>;

    /// Ends the provider session.
    ///
    /// # Errors
    /// Returns [`AuthError::Provider`] when the provider rejects the call.
    fn sign_out(&self) -> Result<(), AuthError>;
}

/// Keeps an avatar location only when it parses as an `https` URL.
pub fn sanitize_avatar_url(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    let parsed = Url::parse(raw).ok()?;
    if parsed.scheme() != "https" {
        return None;
    }
    Some(raw.to_string())
}

/// Errors produced by session guard logic.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider delivered an unusable identity.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),
    /// Provider call failure (sign-out or snapshot retrieval).
    #[error("identity provider failure: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for guard transitions and avatar sanitization.

    use super::*;

    fn handle(user_id: &str) -> IdentityHandle {
        IdentityHandle {
            user_id: user_id.to_string(),
            display_name: Some("Ada".to_string()),
            avatar_url: None,
        }
    }

    #[test]
    fn dashboard_loads_exactly_once_per_session() {
        let mut guard = SessionGuard::new();

        let first = guard
            .on_auth_event(AuthEvent::SignedIn(handle("user-1")))
            .expect("event should apply");
        assert!(matches!(first, GuardDirective::LoadDashboard(_)));

        let second = guard
            .on_auth_event(AuthEvent::SignedIn(handle("user-1")))
            .expect("event should apply");
        assert!(matches!(second, GuardDirective::AlreadyActive));
    }

    #[test]
    fn sign_out_redirects_and_allows_a_fresh_load() {
        let mut guard = SessionGuard::new();
        guard
            .on_auth_event(AuthEvent::SignedIn(handle("user-1")))
            .expect("event should apply");

        let directive = guard
            .on_auth_event(AuthEvent::SignedOut)
            .expect("event should apply");
        assert!(matches!(directive, GuardDirective::RedirectToLanding));
        assert!(guard.identity().is_none());

        let reload = guard
            .on_auth_event(AuthEvent::SignedIn(handle("user-1")))
            .expect("event should apply");
        assert!(matches!(reload, GuardDirective::LoadDashboard(_)));
    }

    #[test]
    fn blank_user_id_is_rejected() {
        let mut guard = SessionGuard::new();
        assert!(
            guard
                .on_auth_event(AuthEvent::SignedIn(handle("  ")))
                .is_err()
        );
    }

    #[test]
    fn avatar_urls_must_be_https() {
        assert_eq!(
            sanitize_avatar_url(Some("https://cdn.example.test/a.png")),
            Some("https://cdn.example.test/a.png".to_string())
        );
        assert_eq!(sanitize_avatar_url(Some("http://cdn.example.test/a.png")), None);
        assert_eq!(sanitize_avatar_url(Some("not a url")), None);
        assert_eq!(sanitize_avatar_url(None), None);
    }
}
