//! Shared fixtures for app integration tests.

use std::sync::Arc;

use vps_desk_app::DashboardController;
use vps_desk_auth::IdentityHandle;
use vps_desk_core::AccountDocument;
use vps_desk_provision::SimulatedProvisioner;
use vps_desk_store::{InMemoryAccountStore, StoreClient, StorePolicy, StoreTransport};

/// Account id used by every fixture session.
pub const USER_ID: &str = "user-1";

/// Artificial provisioning delay used by fixture controllers.
#[allow(dead_code)]
pub const PROVISION_DELAY_MS: u64 = 3_000;

/// Creates a deterministic account document fixture.
#[allow(dead_code)]
pub fn fixture_document(points: i64, vps_time: i64) -> AccountDocument {
    AccountDocument {
        points,
        vps_time,
        daily_ads: 0,
        display_name: Some("Ada".to_string()),
        avatar_url: None,
    }
}

/// Creates the identity handle matching [`USER_ID`].
#[allow(dead_code)]
pub fn fixture_identity() -> IdentityHandle {
    IdentityHandle {
        user_id: USER_ID.to_string(),
        display_name: Some("Ada".to_string()),
        avatar_url: None,
    }
}

/// Builds a store client over any transport with the default policy.
#[allow(dead_code)]
pub fn client_for(transport: Arc<dyn StoreTransport>) -> StoreClient {
    StoreClient::new(
        "https://store.example.test/v1/accounts",
        StorePolicy::default(),
        transport,
    )
    .expect("store client should build")
}

/// Builds a controller over any transport and signs the fixture user in.
#[allow(dead_code)]
pub fn signed_in_controller_over(transport: Arc<dyn StoreTransport>) -> DashboardController {
    let provisioner = Arc::new(SimulatedProvisioner::from_seed(9).with_delay_ms(PROVISION_DELAY_MS));
    let mut controller = DashboardController::new(client_for(transport), provisioner);
    controller
        .handle_auth_change(Some(fixture_identity()))
        .expect("sign-in should apply");
    controller
}

/// Builds a signed-in controller over a seeded in-memory store.
#[allow(dead_code)]
pub fn signed_in_controller(
    points: i64,
    vps_time: i64,
) -> (DashboardController, Arc<InMemoryAccountStore>) {
    let store = Arc::new(InMemoryAccountStore::with_account(
        USER_ID,
        fixture_document(points, vps_time),
    ));
    let controller = signed_in_controller_over(store.clone());
    (controller, store)
}
