#![warn(missing_docs)]
//! # vps-desk-core
//!
//! ## Purpose
//! Defines the account data model shared across the `vps-desk` workspace.
//!
//! ## Responsibilities
//! - Mirror the remote account document (points, lease seconds, ad counter).
//! - Validate the camelCase account-document wire contract.
//! - Apply spend/reward/lease mutations with balance invariants.
//! - Format remaining lease time for display.
//!
//! ## Data flow
//! Store fetch returns raw JSON -> [`parse_account_document`] validates the
//! contract -> [`Account::from_document`] builds the in-memory mirror ->
//! action handlers mutate the mirror after their remote update commits.
//!
//! ## Ownership and lifetimes
//! The mirror owns all of its values (`String`/integers) so the controller can
//! hold it across handler calls without borrowing from transport buffers.
//!
//! ## Error model
//! Contract violations (negative balances, malformed JSON) and invariant
//! violations (overspend, overflow) return [`CoreError`] variants with
//! caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate never logs document contents; account identifiers are treated as
//! opaque values and are never transformed.
//!
//! ## Example
//! ```rust
//! use vps_desk_core::{Account, format_remaining_time, parse_account_document};
//!
//! let raw = r#"{"points":250,"vpsTime":0,"dailyAds":3,"displayName":"Ada"}"#;
//! let document = parse_account_document(raw).expect("contract should validate");
//! let account = Account::from_document(&document).expect("mirror should build");
//! assert_eq!(account.points, 250);
//! assert_eq!(format_remaining_time(account.vps_time_seconds), "00:00:00");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds granted per purchased lease hour.
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Fixed cost of one lease extension in points.
pub const EXTEND_LEASE_COST_POINTS: u64 = 300;

/// Fixed duration of one lease extension in hours.
pub const EXTEND_LEASE_HOURS: u32 = 6;

/// Points granted for one completed ad view.
pub const AD_REWARD_POINTS: u64 = 5;

/// Fallback display name when the account document carries none.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Raw account document as stored remotely, camelCase wire fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDocument {
    /// Current points balance.
    pub points: i64,
    /// Remaining lease time in seconds.
    pub vps_time: i64,
    /// Lifetime ad-claim counter.
    pub daily_ads: i64,
    /// Optional presentation name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional avatar image location.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// In-memory mirror of one authenticated user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Non-negative points balance.
    pub points: u64,
    /// Non-negative remaining lease seconds; 0 means no active lease.
    pub vps_time_seconds: u64,
    /// Ad-claim counter, informational only.
    pub daily_ads: u64,
    /// Presentation name, defaulted when the document carries none.
    pub display_name: String,
    /// Avatar image location, when present.
    pub avatar_url: Option<String>,
}

impl Account {
    /// Builds the mirror from a validated wire document.
    ///
    /// # Errors
    /// Returns [`CoreError::NegativeField`] when a balance-like field is below
    /// zero; the contract requires non-negative integers.
    pub fn from_document(document: &AccountDocument) -> Result<Self, CoreError> {
        let points = non_negative("points", document.points)?;
        let vps_time_seconds = non_negative("vpsTime", document.vps_time)?;
        let daily_ads = non_negative("dailyAds", document.daily_ads)?;

        let display_name = document
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string();

        Ok(Self {
            points,
            vps_time_seconds,
            daily_ads,
            display_name,
            avatar_url: document.avatar_url.clone(),
        })
    }

    /// Returns `true` when the balance covers `cost_points`.
    pub fn can_afford(&self, cost_points: u64) -> bool {
        self.points >= cost_points
    }

    /// Returns `true` when a lease is currently active.
    pub fn has_active_lease(&self) -> bool {
        self.vps_time_seconds > 0
    }

    /// Applies a committed spend: deduct points, grant lease seconds.
    ///
    /// Callers validate affordability before the remote update; the re-check
    /// here keeps the `points >= 0` invariant unconditional.
    ///
    /// # Errors
    /// Returns [`CoreError::InsufficientPoints`] when the deduction would go
    /// negative and [`CoreError::Overflow`] when the grant cannot be
    /// represented.
    pub fn commit_spend(&mut self, cost_points: u64, grant_seconds: u64) -> Result<(), CoreError> {
        let points = self
            .points
            .checked_sub(cost_points)
            .ok_or(CoreError::InsufficientPoints {
                needed: cost_points,
                available: self.points,
            })?;
        let vps_time_seconds = self
            .vps_time_seconds
            .checked_add(grant_seconds)
            .ok_or(CoreError::Overflow)?;

        self.points = points;
        self.vps_time_seconds = vps_time_seconds;
        Ok(())
    }

    /// Applies a committed ad reward: add points, bump the ad counter.
    ///
    /// # Errors
    /// Returns [`CoreError::Overflow`] when either counter saturates.
    pub fn commit_reward(&mut self, reward_points: u64) -> Result<(), CoreError> {
        self.points = self
            .points
            .checked_add(reward_points)
            .ok_or(CoreError::Overflow)?;
        self.daily_ads = self.daily_ads.checked_add(1).ok_or(CoreError::Overflow)?;
        Ok(())
    }

    /// Zeroes the remaining lease time after a committed stop or expiry.
    pub fn clear_lease(&mut self) {
        self.vps_time_seconds = 0;
    }
}

/// One purchasable duration/cost pair offered by the creation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseOption {
    /// Lease duration in hours.
    pub hours: u32,
    /// Price in points.
    pub cost_points: u64,
}

impl LeaseOption {
    /// Returns the lease grant in seconds.
    pub fn grant_seconds(&self) -> u64 {
        u64::from(self.hours) * SECONDS_PER_HOUR
    }
}

/// Parses raw JSON into a validated account document.
///
/// # Errors
/// Returns [`CoreError::Decode`] for invalid JSON.
/// Returns [`CoreError::NegativeField`] when the contract's non-negative
/// integer fields are violated.
pub fn parse_account_document(raw: &str) -> Result<AccountDocument, CoreError> {
    let document: AccountDocument = serde_json::from_str(raw).map_err(CoreError::Decode)?;

    non_negative("points", document.points)?;
    non_negative("vpsTime", document.vps_time)?;
    non_negative("dailyAds", document.daily_ads)?;

    Ok(document)
}

/// Formats remaining lease seconds as a zero-padded `HH:MM:SS` string.
///
/// Hours widen beyond two digits for long leases; minutes and seconds stay in
/// `[0, 60)`.
pub fn format_remaining_time(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, CoreError> {
    u64::try_from(value).map_err(|_| CoreError::NegativeField { field, value })
}

/// Error type for account model validation and mutation failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON decoding of the account document failed.
    #[error("account document decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// A contract field that must be non-negative was below zero.
    #[error("account field {field} must be non-negative, got {value}")]
    NegativeField {
        /// Wire name of the offending field.
        field: &'static str,
        /// Observed value.
        value: i64,
    },
    /// A spend would drive the points balance negative.
    #[error("insufficient points: need {needed}, have {available}")]
    InsufficientPoints {
        /// Points required by the action.
        needed: u64,
        /// Points currently available.
        available: u64,
    },
    /// A counter mutation cannot be represented.
    #[error("account counter overflow")]
    Overflow,
}
