//! Integration tests for account loading and the retry prompt.

mod common;

use std::sync::Arc;

use vps_desk_app::{AuthChangeOutcome, DashboardController};
use vps_desk_core::DEFAULT_DISPLAY_NAME;
use vps_desk_provision::SimulatedProvisioner;
use vps_desk_store::InMemoryAccountStore;
use vps_desk_ui::LoadStatus;

#[test]
fn account_load_tests_missing_document_shows_retry_prompt() {
    let store = Arc::new(InMemoryAccountStore::new());
    let provisioner = Arc::new(SimulatedProvisioner::from_seed(1));
    let mut controller =
        DashboardController::new(common::client_for(store.clone()), provisioner);

    let outcome = controller
        .handle_auth_change(Some(common::fixture_identity()))
        .expect("sign-in should apply");
    assert_eq!(outcome, AuthChangeOutcome::LoadFailed);
    assert_eq!(controller.ui().load, LoadStatus::Failed);
    assert!(controller.ui().retry_available());
    assert!(!controller.ui().can_run_actions());

    // Dependent fields stay in their defaults until a load succeeds.
    let view = controller.render();
    assert_eq!(view.display_name, DEFAULT_DISPLAY_NAME);
    assert_eq!(view.points_text, "0");
    assert_eq!(view.countdown_text, "00:00:00");
}

#[test]
fn account_load_tests_retry_recovers_once_the_document_exists() {
    let store = Arc::new(InMemoryAccountStore::new());
    let provisioner = Arc::new(SimulatedProvisioner::from_seed(1));
    let mut controller =
        DashboardController::new(common::client_for(store.clone()), provisioner);
    controller
        .handle_auth_change(Some(common::fixture_identity()))
        .expect("sign-in should apply");
    assert!(controller.ui().retry_available());

    store.insert_account(common::USER_ID, common::fixture_document(250, 0));
    assert!(controller.retry_load());
    assert_eq!(controller.ui().load, LoadStatus::Loaded);
    assert_eq!(controller.render().points_text, "250");
}

#[test]
fn account_load_tests_repeated_sign_in_loads_only_once() {
    let (mut controller, _store) = common::signed_in_controller(250, 0);
    let outcome = controller
        .handle_auth_change(Some(common::fixture_identity()))
        .expect("sign-in should apply");
    assert_eq!(outcome, AuthChangeOutcome::AlreadyActive);
}

#[test]
fn account_load_tests_sign_out_discards_session_state() {
    let (mut controller, _store) = common::signed_in_controller(250, 7_200);
    let outcome = controller
        .handle_auth_change(None)
        .expect("sign-out should apply");
    assert_eq!(outcome, AuthChangeOutcome::Redirect);
    assert!(controller.account().is_none());
    assert_eq!(controller.ui().load, LoadStatus::NotLoaded);
    assert_eq!(controller.render().points_text, "0");
}
