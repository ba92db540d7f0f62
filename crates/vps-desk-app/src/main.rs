#![warn(missing_docs)]
//! # vps-desk-app binary
//!
//! Headless demo shell: wires the dashboard controller to the in-memory
//! account store, a mock identity provider, and the simulated provisioner,
//! then walks one scripted session with per-run file logging.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use vps_desk_app::{app_version, build_dashboard, logging, project_runtime_status};
use vps_desk_auth::{AuthError, IdentityHandle, IdentityProvider, LANDING_PAGE};
use vps_desk_core::{AccountDocument, LeaseOption};
use vps_desk_provision::SimulatedProvisioner;
use vps_desk_store::InMemoryAccountStore;

const STORE_ENDPOINT: &str = "https://store.vps-desk.test/v1/accounts";
const DEMO_USER_ID: &str = "demo-user";

#[derive(Default)]
struct MockIdentityProvider;

impl IdentityProvider for MockIdentityProvider {
    fn current_identity(&self) -> Option<IdentityHandle> {
        Some(IdentityHandle {
            user_id: DEMO_USER_ID.to_string(),
            display_name: Some("Demo User".to_string()),
            avatar_url: Some("https://cdn.vps-desk.test/demo.png".to_string()),
        })
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// CLI entry point.
fn main() {
    if let Err(error) = run() {
        eprintln!("vps-desk demo failed: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    logging::initialize_run_logger()?;
    println!("vps-desk-app {}", app_version());

    let store = Arc::new(InMemoryAccountStore::with_account(
        DEMO_USER_ID,
        AccountDocument {
            points: 250,
            vps_time: 0,
            daily_ads: 0,
            display_name: Some("Demo User".to_string()),
            avatar_url: None,
        },
    ));
    let provisioner = Arc::new(SimulatedProvisioner::new().with_delay_ms(0));
    let mut controller = build_dashboard(STORE_ENDPOINT, store.clone(), provisioner)
        .map_err(|error| format!("controller init failed: {error}"))?;

    let provider = MockIdentityProvider;
    let outcome = controller
        .handle_auth_change(provider.current_identity())
        .map_err(|error| format!("sign-in failed: {error}"))?;
    println!("auth: {outcome:?}");

    let view = controller.render();
    println!(
        "signed in as {} with {} points, lease {}",
        view.display_name, view.points_text, view.countdown_text
    );

    let now_ms = unix_timestamp_millis();
    let outcome = controller
        .create_lease(
            LeaseOption {
                hours: 4,
                cost_points: 200,
            },
            "ubuntu-22.04",
            "python",
            now_ms,
        )
        .map_err(|error| format!("create failed: {error}"))?;
    println!("create: {outcome:?}");

    if let Some(endpoints) = controller.poll_provision(unix_timestamp_millis()) {
        println!(
            "connect via {} or {}",
            endpoints.rdp_address, endpoints.web_console_url
        );
    }

    for _ in 0..3 {
        controller.on_lease_tick();
    }
    let view = controller.render();
    println!(
        "after 3 ticks: lease {} / balance {}",
        view.countdown_text, view.points_text
    );

    let status = project_runtime_status(&controller);
    println!(
        "actions_allowed={} countdown={} toasts={}",
        status.actions_allowed, status.countdown, status.open_toasts
    );

    provider
        .sign_out()
        .map_err(|error| format!("sign-out failed: {error}"))?;
    controller
        .handle_auth_change(None)
        .map_err(|error| format!("sign-out handling failed: {error}"))?;
    println!("signed out; navigate to {LANDING_PAGE}");

    let remote = store
        .document(DEMO_USER_ID)
        .ok_or_else(|| "demo document disappeared".to_string())?;
    println!(
        "remote document: points={} vpsTime={}",
        remote.points, remote.vps_time
    );
    Ok(())
}

fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64)
}
