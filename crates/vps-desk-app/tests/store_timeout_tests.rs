//! Integration tests for bounded store timeouts and their user feedback.

mod common;

use std::sync::Arc;

use vps_desk_app::{ActionOutcome, store_timeout_from_env};
use vps_desk_core::AccountDocument;
use vps_desk_store::{
    DEFAULT_UPDATE_TIMEOUT_MS, FetchRequest, InMemoryAccountStore, StoreError, StoreTransport,
    UpdateEnvelope,
};
use vps_desk_ui::ToastSeverity;

/// Serves reads but reports every write as exceeding its budget.
#[derive(Debug)]
struct StalledTransport {
    inner: InMemoryAccountStore,
}

impl StoreTransport for StalledTransport {
    fn fetch_document(&self, request: &FetchRequest) -> Result<AccountDocument, StoreError> {
        self.inner.fetch_document(request)
    }

    fn apply_update(&self, _envelope: &UpdateEnvelope) -> Result<(), StoreError> {
        Err(StoreError::Timeout)
    }
}

#[test]
fn store_timeout_tests_surface_a_visible_failure_instead_of_hanging() {
    let transport = Arc::new(StalledTransport {
        inner: InMemoryAccountStore::with_account(
            common::USER_ID,
            common::fixture_document(400, 0),
        ),
    });
    let mut controller = common::signed_in_controller_over(transport);

    let outcome = controller.extend_lease(1_000).expect("extend should run");
    assert_eq!(outcome, ActionOutcome::Failed);

    let account = controller.account().expect("mirror should be loaded");
    assert_eq!(account.points, 400);
    assert_eq!(account.vps_time_seconds, 0);

    let toast = controller.ui().toasts.last().expect("toast should be shown");
    assert_eq!(toast.severity, ToastSeverity::Error);
}

#[test]
fn store_timeout_tests_env_budget_falls_back_on_bad_values() {
    // Safety:
    // - Integration tests mutate process env in a single-threaded test body.
    // - We reset the variable before returning.
    unsafe { std::env::set_var("VPS_DESK_STORE_TIMEOUT_MS", "2500") };
    assert_eq!(store_timeout_from_env(), 2_500);

    // Safety: see rationale above.
    unsafe { std::env::set_var("VPS_DESK_STORE_TIMEOUT_MS", "not-a-number") };
    assert_eq!(store_timeout_from_env(), DEFAULT_UPDATE_TIMEOUT_MS);

    // Safety: see rationale above.
    unsafe { std::env::set_var("VPS_DESK_STORE_TIMEOUT_MS", "0") };
    assert_eq!(store_timeout_from_env(), DEFAULT_UPDATE_TIMEOUT_MS);

    // Safety: see rationale above.
    unsafe { std::env::remove_var("VPS_DESK_STORE_TIMEOUT_MS") };
    assert_eq!(store_timeout_from_env(), DEFAULT_UPDATE_TIMEOUT_MS);
}
