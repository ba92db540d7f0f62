#![warn(missing_docs)]
//! # vps-desk-provision
//!
//! ## Purpose
//! Defines the provisioning seam behind lease creation.
//!
//! ## Responsibilities
//! - Define a backend-agnostic provisioning trait.
//! - Ship the simulated provisioner used by the product today: fabricated
//!   connection endpoints behind a fixed artificial readiness delay.
//!
//! ## Data flow
//! Create-lease handler builds a [`ProvisionRequest`] -> [`Provisioner`]
//! returns a [`ProvisionTicket`] -> the controller reveals the endpoints once
//! the ticket's delay elapses.
//!
//! ## Ownership and lifetimes
//! Tickets own their endpoint strings so reveal logic never borrows from the
//! provisioner.
//!
//! ## Error model
//! Malformed requests and backend failures are reported as
//! [`ProvisionError`] values.
//!
//! ## Security and privacy notes
//! The simulated backend fabricates addresses from an RNG; no real host is
//! contacted and no request field is logged.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// RDP port advertised on fabricated endpoints.
pub const RDP_PORT: u16 = 3_389;

/// Web console port advertised on fabricated endpoints.
pub const WEB_CONSOLE_PORT: u16 = 8_006;

/// Default artificial readiness delay in milliseconds.
pub const DEFAULT_PROVISION_DELAY_MS: u64 = 3_000;

/// Provisioning parameters collected from the creation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Purchased lease duration in hours.
    pub lease_hours: u32,
    /// Selected operating system image.
    pub os_version: String,
    /// Selected preinstalled language runtime.
    pub language: String,
}

/// Connection details revealed to the user after provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEndpoints {
    /// Remote-desktop address, `host:3389`.
    pub rdp_address: String,
    /// Browser console URL, `http://host:8006`.
    pub web_console_url: String,
}

/// Provisioning outcome plus the delay before it may be revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionTicket {
    /// Endpoints to surface in the connection-info dialog.
    pub endpoints: ConnectionEndpoints,
    /// Milliseconds to wait before revealing the endpoints.
    pub ready_after_ms: u64,
}

/// Trait implemented by concrete provisioning backends.
///
/// The in-repo implementation is a simulation; a real orchestration backend
/// substitutes here without touching handler logic.
pub trait Provisioner: Send + Sync {
    /// Provisions one server for the given request.
    ///
    /// # Errors
    /// Returns [`ProvisionError::InvalidRequest`] for unusable parameters and
    /// [`ProvisionError::Backend`] for runtime failures.
    fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionTicket, ProvisionError>;
}

/// Derives both advertised endpoints from one fabricated address.
pub fn derive_endpoints(octets: [u8; 4]) -> ConnectionEndpoints {
    let host = format!(
        "{}.{}.{}.{}",
        octets[0], octets[1], octets[2], octets[3]
    );
    ConnectionEndpoints {
        rdp_address: format!("{host}:{RDP_PORT}"),
        web_console_url: format!("http://{host}:{WEB_CONSOLE_PORT}"),
    }
}

/// Simulated provisioning backend with a seedable RNG.
#[derive(Debug)]
pub struct SimulatedProvisioner {
    rng: Mutex<StdRng>,
    delay_ms: u64,
}

impl SimulatedProvisioner {
    /// Creates a simulator seeded from OS entropy with the default delay.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            delay_ms: DEFAULT_PROVISION_DELAY_MS,
        }
    }

    /// Creates a simulator with a fixed seed for deterministic tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            delay_ms: DEFAULT_PROVISION_DELAY_MS,
        }
    }

    /// Overrides the artificial readiness delay.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

impl Default for SimulatedProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl Provisioner for SimulatedProvisioner {
    fn provision(&self, request: &ProvisionRequest) -> Result<ProvisionTicket, ProvisionError> {
        if request.lease_hours == 0 {
            return Err(ProvisionError::InvalidRequest(
                "lease duration must be positive".to_string(),
            ));
        }
        if request.os_version.trim().is_empty() || request.language.trim().is_empty() {
            return Err(ProvisionError::InvalidRequest(
                "os version and language selections are required".to_string(),
            ));
        }

        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ProvisionError::Backend("address rng lock poisoned".to_string()))?;
        let octets = [
            rng.random_range(0..255_u8),
            rng.random_range(0..255_u8),
            rng.random_range(0..255_u8),
            rng.random_range(0..255_u8),
        ];

        Ok(ProvisionTicket {
            endpoints: derive_endpoints(octets),
            ready_after_ms: self.delay_ms,
        })
    }
}

/// Provisioning layer error type.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Request parameters cannot be provisioned.
    #[error("invalid provision request: {0}")]
    InvalidRequest(String),
    /// Backend runtime failure.
    #[error("provisioning backend failure: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for the simulated backend.

    use super::*;

    fn request() -> ProvisionRequest {
        ProvisionRequest {
            lease_hours: 4,
            os_version: "ubuntu-22.04".to_string(),
            language: "python".to_string(),
        }
    }

    #[test]
    fn simulated_ticket_advertises_both_ports_on_one_host() {
        let provisioner = SimulatedProvisioner::from_seed(11).with_delay_ms(250);
        let ticket = provisioner
            .provision(&request())
            .expect("provisioning should succeed");

        let host = ticket
            .endpoints
            .rdp_address
            .strip_suffix(":3389")
            .expect("rdp endpoint should carry the rdp port");
        assert_eq!(
            ticket.endpoints.web_console_url,
            format!("http://{host}:8006")
        );
        assert_eq!(host.split('.').count(), 4);
        assert_eq!(ticket.ready_after_ms, 250);
    }

    #[test]
    fn identical_seeds_fabricate_identical_endpoints() {
        let first = SimulatedProvisioner::from_seed(3)
            .provision(&request())
            .expect("provisioning should succeed");
        let second = SimulatedProvisioner::from_seed(3)
            .provision(&request())
            .expect("provisioning should succeed");
        assert_eq!(first, second);
    }

    #[test]
    fn blank_selections_are_rejected() {
        let provisioner = SimulatedProvisioner::from_seed(1);
        let mut invalid = request();
        invalid.os_version = " ".to_string();
        assert!(matches!(
            provisioner.provision(&invalid),
            Err(ProvisionError::InvalidRequest(_))
        ));

        let mut zero_hours = request();
        zero_hours.lease_hours = 0;
        assert!(provisioner.provision(&zero_hours).is_err());
    }
}
