//! Tests account-document contract validation and defaulting.

use vps_desk_core::{Account, DEFAULT_DISPLAY_NAME, parse_account_document};

#[test]
fn document_contract_tests_accept_full_document() {
    let raw = r#"{
        "points": 250,
        "vpsTime": 7200,
        "dailyAds": 4,
        "displayName": "Ada",
        "avatarUrl": "https://cdn.example.test/ada.png"
    }"#;

    let document = parse_account_document(raw).expect("contract should validate");
    let account = Account::from_document(&document).expect("mirror should build");
    assert_eq!(account.points, 250);
    assert_eq!(account.vps_time_seconds, 7_200);
    assert_eq!(account.daily_ads, 4);
    assert_eq!(account.display_name, "Ada");
    assert_eq!(
        account.avatar_url.as_deref(),
        Some("https://cdn.example.test/ada.png")
    );
}

#[test]
fn document_contract_tests_reject_negative_balances() {
    assert!(parse_account_document(r#"{"points":-1,"vpsTime":0,"dailyAds":0}"#).is_err());
    assert!(parse_account_document(r#"{"points":0,"vpsTime":-5,"dailyAds":0}"#).is_err());
    assert!(parse_account_document(r#"{"points":0,"vpsTime":0,"dailyAds":-2}"#).is_err());
}

#[test]
fn document_contract_tests_default_display_name_when_absent_or_blank() {
    let absent = parse_account_document(r#"{"points":10,"vpsTime":0,"dailyAds":0}"#)
        .expect("contract should validate");
    let blank =
        parse_account_document(r#"{"points":10,"vpsTime":0,"dailyAds":0,"displayName":"  "}"#)
            .expect("contract should validate");

    assert_eq!(
        Account::from_document(&absent)
            .expect("mirror should build")
            .display_name,
        DEFAULT_DISPLAY_NAME
    );
    assert_eq!(
        Account::from_document(&blank)
            .expect("mirror should build")
            .display_name,
        DEFAULT_DISPLAY_NAME
    );
}
