//! Tests mirror construction and balance arithmetic invariants.

use vps_desk_core::{AD_REWARD_POINTS, Account, AccountDocument, CoreError, SECONDS_PER_HOUR};

fn document(points: i64, vps_time: i64) -> AccountDocument {
    AccountDocument {
        points,
        vps_time,
        daily_ads: 0,
        display_name: Some("Ada".to_string()),
        avatar_url: None,
    }
}

#[test]
fn account_mirror_tests_spend_deducts_cost_and_grants_seconds() {
    let mut account = Account::from_document(&document(250, 0)).expect("mirror should build");
    account
        .commit_spend(200, 4 * SECONDS_PER_HOUR)
        .expect("spend should commit");
    assert_eq!(account.points, 50);
    assert_eq!(account.vps_time_seconds, 14_400);
}

#[test]
fn account_mirror_tests_overspend_is_rejected_without_mutation() {
    let mut account = Account::from_document(&document(100, 60)).expect("mirror should build");
    let error = account
        .commit_spend(300, 6 * SECONDS_PER_HOUR)
        .expect_err("overspend should fail");
    assert!(matches!(
        error,
        CoreError::InsufficientPoints {
            needed: 300,
            available: 100
        }
    ));
    assert_eq!(account.points, 100);
    assert_eq!(account.vps_time_seconds, 60);
}

#[test]
fn account_mirror_tests_reward_adds_points_and_bumps_counter() {
    let mut account = Account::from_document(&document(0, 0)).expect("mirror should build");
    account
        .commit_reward(AD_REWARD_POINTS)
        .expect("reward should commit");
    assert_eq!(account.points, 5);
    assert_eq!(account.daily_ads, 1);
}

#[test]
fn account_mirror_tests_clear_lease_zeroes_remaining_time() {
    let mut account = Account::from_document(&document(10, 500)).expect("mirror should build");
    assert!(account.has_active_lease());
    account.clear_lease();
    assert!(!account.has_active_lease());
    assert_eq!(account.vps_time_seconds, 0);
}
