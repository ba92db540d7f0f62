#![warn(missing_docs)]
//! # vps-desk-store
//!
//! ## Purpose
//! Provides the account-store client used by the dashboard controller.
//!
//! ## Responsibilities
//! - Describe remote mutations as typed per-field set/increment deltas.
//! - Validate the store endpoint policy (HTTPS, versioned accounts path).
//! - Attach a bounded timeout budget and an idempotency key to every update.
//! - Expose a deterministic in-memory transport for tests and the demo shell.
//!
//! ## Data flow
//! Controller builds an [`AccountUpdate`] -> [`StoreClient`] wraps it in an
//! [`UpdateEnvelope`] -> [`StoreTransport`] applies it atomically against the
//! remote document.
//!
//! ## Ownership and lifetimes
//! Envelopes own their values so transports can retry-safely serialize them
//! without borrowing controller state.
//!
//! ## Error model
//! Endpoint violations, missing documents, timeouts, and store-side constraint
//! rejections are reported as [`StoreError`] values. The client never retries;
//! retries are user-initiated by design.
//!
//! ## Security and privacy notes
//! Account identifiers are opaque; document contents are never logged by this
//! crate.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;
use vps_desk_core::AccountDocument;

/// Required store path suffix for the v1 accounts collection.
pub const REQUIRED_STORE_PATH: &str = "/v1/accounts";

/// Default per-call timeout budget in milliseconds.
pub const DEFAULT_UPDATE_TIMEOUT_MS: u64 = 10_000;

/// One field mutation inside an atomic account update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldDelta {
    /// Absolute overwrite of the field value.
    Set(i64),
    /// Relative adjustment applied atomically by the store.
    Increment(i64),
}

/// Per-field deltas applied atomically in one store call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    /// Points balance delta, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<FieldDelta>,
    /// Remaining lease seconds delta, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vps_time: Option<FieldDelta>,
    /// Ad counter delta, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_ads: Option<FieldDelta>,
}

impl AccountUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a relative points adjustment.
    pub fn increment_points(mut self, delta: i64) -> Self {
        self.points = Some(FieldDelta::Increment(delta));
        self
    }

    /// Adds a relative lease-seconds adjustment.
    pub fn increment_vps_time(mut self, delta: i64) -> Self {
        self.vps_time = Some(FieldDelta::Increment(delta));
        self
    }

    /// Overwrites the remaining lease seconds.
    pub fn set_vps_time(mut self, value: i64) -> Self {
        self.vps_time = Some(FieldDelta::Set(value));
        self
    }

    /// Adds a relative ad-counter adjustment.
    pub fn increment_daily_ads(mut self, delta: i64) -> Self {
        self.daily_ads = Some(FieldDelta::Increment(delta));
        self
    }

    /// Returns `true` when no field is touched.
    pub fn is_empty(&self) -> bool {
        self.points.is_none() && self.vps_time.is_none() && self.daily_ads.is_none()
    }
}

/// Read request forwarded to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Target account document id.
    pub account_id: String,
    /// Budget the transport must answer within, in milliseconds.
    pub timeout_ms: u64,
}

/// Update request forwarded to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEnvelope {
    /// Target account document id.
    pub account_id: String,
    /// Field deltas applied atomically.
    pub update: AccountUpdate,
    /// Client-assigned idempotency key for duplicate suppression.
    pub idempotency_key: String,
    /// Budget the transport must answer within, in milliseconds.
    pub timeout_ms: u64,
}

/// Outcome of one committed update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Idempotency key the update was committed under.
    pub idempotency_key: String,
}

/// Abstract transport to the remote document store.
///
/// Implementations must apply every delta of one envelope atomically and must
/// return within the envelope's timeout budget, reporting
/// [`StoreError::Timeout`] when they cannot.
pub trait StoreTransport: Send + Sync {
    /// Reads one account document.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when no document exists for the id.
    fn fetch_document(&self, request: &FetchRequest) -> Result<AccountDocument, StoreError>;

    /// Applies one atomic update envelope.
    ///
    /// # Errors
    /// Returns [`StoreError::Constraint`] when a delta would drive a
    /// non-negative field below zero.
    fn apply_update(&self, envelope: &UpdateEnvelope) -> Result<(), StoreError>;
}

/// Client policy for remote calls.
///
/// There is deliberately no retry knob: failed updates surface to the user
/// and are retried by re-clicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePolicy {
    /// Per-call timeout budget in milliseconds.
    pub timeout_ms: u64,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_UPDATE_TIMEOUT_MS,
        }
    }
}

/// Account-store client that validates endpoint policy and stamps envelopes.
#[derive(Clone)]
pub struct StoreClient {
    endpoint: String,
    policy: StorePolicy,
    transport: Arc<dyn StoreTransport>,
    sequence: Arc<Mutex<u64>>,
}

impl StoreClient {
    /// Creates a validated store client.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidEndpoint`] when the URL is not HTTPS or
    /// does not include the required `/v1/accounts` path.
    pub fn new(
        endpoint: impl Into<String>,
        policy: StorePolicy,
        transport: Arc<dyn StoreTransport>,
    ) -> Result<Self, StoreError> {
        let endpoint = endpoint.into();
        validate_store_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            policy,
            transport,
            sequence: Arc::new(Mutex::new(0)),
        })
    }

    /// Reads the account document for `account_id`.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidRequest`] for a blank id and propagates
    /// transport failures as-is.
    pub fn fetch_account(&self, account_id: &str) -> Result<AccountDocument, StoreError> {
        if account_id.trim().is_empty() {
            return Err(StoreError::InvalidRequest(
                "account id is empty".to_string(),
            ));
        }

        self.transport.fetch_document(&FetchRequest {
            account_id: account_id.to_string(),
            timeout_ms: self.policy.timeout_ms,
        })
    }

    /// Applies one atomic update to the account document.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidRequest`] for a blank id or an empty
    /// update, and propagates transport failures as-is.
    pub fn update_account(
        &self,
        account_id: &str,
        update: AccountUpdate,
    ) -> Result<UpdateReport, StoreError> {
        if account_id.trim().is_empty() {
            return Err(StoreError::InvalidRequest(
                "account id is empty".to_string(),
            ));
        }
        if update.is_empty() {
            return Err(StoreError::InvalidRequest(
                "update touches no fields".to_string(),
            ));
        }

        let sequence = {
            let mut guard = self
                .sequence
                .lock()
                .map_err(|_| StoreError::Transport("update sequence lock poisoned".to_string()))?;
            *guard += 1;
            *guard
        };

        let idempotency_key = idempotency_key_for_update(account_id, sequence, &update)?;
        let envelope = UpdateEnvelope {
            account_id: account_id.to_string(),
            update,
            idempotency_key: idempotency_key.clone(),
            timeout_ms: self.policy.timeout_ms,
        };

        self.transport.apply_update(&envelope)?;
        Ok(UpdateReport { idempotency_key })
    }

    /// Returns the configured store endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Validates v1 store endpoint constraints.
///
/// # Errors
/// Returns [`StoreError::InvalidEndpoint`] for non-HTTPS or path mismatch.
pub fn validate_store_endpoint(endpoint: &str) -> Result<(), StoreError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| StoreError::InvalidEndpoint(format!("invalid store url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(StoreError::InvalidEndpoint(
            "store endpoint must use https".to_string(),
        ));
    }

    if !parsed.path().ends_with(REQUIRED_STORE_PATH) {
        return Err(StoreError::InvalidEndpoint(format!(
            "store endpoint path must end with {REQUIRED_STORE_PATH}"
        )));
    }

    Ok(())
}

/// Derives the idempotency key for one update envelope.
///
/// The key is a hex SHA-256 over the account id, the client-local sequence
/// number, and the canonical update JSON, so duplicate submissions of the
/// same logical update are distinguishable from wire-level replays.
///
/// # Errors
/// Returns [`StoreError::Codec`] when the update cannot be canonicalized.
pub fn idempotency_key_for_update(
    account_id: &str,
    sequence: u64,
    update: &AccountUpdate,
) -> Result<String, StoreError> {
    let canonical = serde_json::to_vec(update).map_err(StoreError::Codec)?;

    let mut hasher = Sha256::new();
    hasher.update(account_id.as_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

/// Deterministic in-memory store for tests and the demo shell.
///
/// Applies envelopes under one lock so every update is atomic, and rejects
/// deltas that would drive a non-negative field below zero, matching the
/// remote store's constraints.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    documents: Mutex<std::collections::HashMap<String, AccountDocument>>,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one account document.
    pub fn with_account(account_id: impl Into<String>, document: AccountDocument) -> Self {
        let store = Self::new();
        store.insert_account(account_id, document);
        store
    }

    /// Inserts or replaces one account document.
    pub fn insert_account(&self, account_id: impl Into<String>, document: AccountDocument) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(account_id.into(), document);
        }
    }

    /// Returns a snapshot of one stored document, when present.
    pub fn document(&self, account_id: &str) -> Option<AccountDocument> {
        self.documents
            .lock()
            .ok()
            .and_then(|documents| documents.get(account_id).cloned())
    }
}

impl StoreTransport for InMemoryAccountStore {
    fn fetch_document(&self, request: &FetchRequest) -> Result<AccountDocument, StoreError> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| StoreError::Transport("account table lock poisoned".to_string()))?;
        documents
            .get(&request.account_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(request.account_id.clone()))
    }

    fn apply_update(&self, envelope: &UpdateEnvelope) -> Result<(), StoreError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| StoreError::Transport("account table lock poisoned".to_string()))?;
        let document = documents
            .get_mut(&envelope.account_id)
            .ok_or_else(|| StoreError::NotFound(envelope.account_id.clone()))?;

        // Invariant:
        // - All deltas of one envelope commit together or not at all.
        let mut staged = document.clone();
        if let Some(delta) = envelope.update.points {
            staged.points = apply_delta("points", staged.points, delta)?;
        }
        if let Some(delta) = envelope.update.vps_time {
            staged.vps_time = apply_delta("vpsTime", staged.vps_time, delta)?;
        }
        if let Some(delta) = envelope.update.daily_ads {
            staged.daily_ads = apply_delta("dailyAds", staged.daily_ads, delta)?;
        }

        *document = staged;
        Ok(())
    }
}

fn apply_delta(field: &'static str, current: i64, delta: FieldDelta) -> Result<i64, StoreError> {
    let next = match delta {
        FieldDelta::Set(value) => value,
        FieldDelta::Increment(amount) => current
            .checked_add(amount)
            .ok_or_else(|| StoreError::Constraint(format!("{field} increment overflows")))?,
    };

    if next < 0 {
        return Err(StoreError::Constraint(format!(
            "{field} must stay non-negative, update would set {next}"
        )));
    }

    Ok(next)
}

/// Store layer error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Endpoint violates security or contract requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Request is malformed before reaching the transport.
    #[error("invalid store request: {0}")]
    InvalidRequest(String),
    /// No document exists for the account id.
    #[error("account document not found: {0}")]
    NotFound(String),
    /// Transport did not answer within the timeout budget.
    #[error("store call timed out")]
    Timeout,
    /// Transport runtime failure.
    #[error("store transport failure: {0}")]
    Transport(String),
    /// Store-side constraint rejected the update.
    #[error("store constraint violation: {0}")]
    Constraint(String),
    /// Update canonicalization failed.
    #[error("update codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint policy, atomic deltas, and idempotency keys.

    use super::*;

    fn seeded_client(store: Arc<InMemoryAccountStore>) -> StoreClient {
        StoreClient::new(
            "https://store.example.test/v1/accounts",
            StorePolicy::default(),
            store,
        )
        .expect("client should build")
    }

    fn document(points: i64, vps_time: i64) -> AccountDocument {
        AccountDocument {
            points,
            vps_time,
            daily_ads: 0,
            display_name: None,
            avatar_url: None,
        }
    }

    #[test]
    fn validates_expected_endpoint_policy() {
        validate_store_endpoint("https://store.example.test/v1/accounts")
            .expect("endpoint should pass");
        assert!(validate_store_endpoint("http://store.example.test/v1/accounts").is_err());
        assert!(validate_store_endpoint("https://store.example.test/v2/other").is_err());
    }

    #[test]
    fn update_applies_all_deltas_atomically() {
        let store = Arc::new(InMemoryAccountStore::with_account(
            "user-1",
            document(250, 0),
        ));
        let client = seeded_client(store.clone());

        client
            .update_account(
                "user-1",
                AccountUpdate::new()
                    .increment_points(-200)
                    .increment_vps_time(14_400),
            )
            .expect("update should commit");

        let updated = store.document("user-1").expect("document should exist");
        assert_eq!(updated.points, 50);
        assert_eq!(updated.vps_time, 14_400);
    }

    #[test]
    fn negative_result_rejects_the_whole_envelope() {
        let store = Arc::new(InMemoryAccountStore::with_account(
            "user-1",
            document(100, 60),
        ));
        let client = seeded_client(store.clone());

        let error = client
            .update_account(
                "user-1",
                AccountUpdate::new()
                    .increment_points(-300)
                    .increment_vps_time(21_600),
            )
            .expect_err("constraint should reject");
        assert!(matches!(error, StoreError::Constraint(_)));

        let untouched = store.document("user-1").expect("document should exist");
        assert_eq!(untouched.points, 100);
        assert_eq!(untouched.vps_time, 60);
    }

    #[test]
    fn empty_update_is_rejected_before_transport() {
        let store = Arc::new(InMemoryAccountStore::new());
        let client = seeded_client(store);
        assert!(matches!(
            client.update_account("user-1", AccountUpdate::new()),
            Err(StoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn idempotency_keys_differ_per_sequence() {
        let update = AccountUpdate::new().increment_points(5).increment_daily_ads(1);
        let first = idempotency_key_for_update("user-1", 1, &update).expect("key should derive");
        let second = idempotency_key_for_update("user-1", 2, &update).expect("key should derive");
        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn missing_document_reports_not_found() {
        let store = Arc::new(InMemoryAccountStore::new());
        let client = seeded_client(store);
        assert!(matches!(
            client.fetch_account("ghost"),
            Err(StoreError::NotFound(_))
        ));
    }
}
