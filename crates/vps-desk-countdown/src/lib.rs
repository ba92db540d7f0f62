#![warn(missing_docs)]
//! # vps-desk-countdown
//!
//! ## Purpose
//! Provides the lease countdown state machine and the ad-gate countdown.
//!
//! ## Responsibilities
//! - Model the stopped/running/expired lease countdown with its 60-second
//!   persistence throttle.
//! - Model the short ad gate that holds the claim control closed.
//! - Provide deterministic cadence helpers used by the app orchestrator.
//!
//! ## Data flow
//! Host timer fires once per second -> controller calls
//! [`LeaseCountdown::tick`] with the mirrored remaining seconds -> the
//! returned [`TickEffect`] tells the controller what to render, when to
//! persist, and when the lease expired.
//!
//! ## Ownership and lifetimes
//! The countdown owns only its phase; the remaining-seconds value stays in
//! the account mirror and is passed in per tick, so virtual-time tests drive
//! the machine without any real timer.
//!
//! ## Error model
//! Invalid cadence configuration returns [`CountdownError`]. Phase logic
//! favors explicit no-op effects over recoverable errors.
//!
//! ## Security and privacy notes
//! This crate holds no user data beyond the tick arithmetic it is handed.

use thiserror::Error;

/// Fixed lease countdown period in milliseconds.
pub const LEASE_TICK_INTERVAL_MS: u64 = 1_000;

/// Remaining-seconds values that are exact multiples of this are persisted.
pub const PERSIST_EVERY_SECONDS: u64 = 60;

/// Seconds the ad gate holds the claim control closed.
pub const AD_GATE_SECONDS: u32 = 15;

/// Lease countdown phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    /// No tick source is active.
    Stopped,
    /// Ticks are being consumed and remaining time is positive.
    Running,
    /// A tick observed the remaining time reach zero.
    Expired,
}

/// Effects of one countdown tick, applied by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickEffect {
    /// Remaining seconds after this tick.
    pub remaining_seconds: u64,
    /// `true` when the new value must be persisted to the store.
    pub persist_due: bool,
    /// `true` when this tick transitioned the countdown to `Expired`.
    pub expired: bool,
}

/// Lease countdown with explicit legal transitions.
///
/// The machine never mutates the account mirror itself; callers pass the
/// mirrored remaining seconds into [`LeaseCountdown::tick`] and apply the
/// returned effect.
#[derive(Debug, Clone)]
pub struct LeaseCountdown {
    phase: CountdownPhase,
}

impl LeaseCountdown {
    /// Creates a countdown in the `Stopped` phase.
    pub fn new() -> Self {
        Self {
            phase: CountdownPhase::Stopped,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    /// Returns `true` while ticks are being consumed.
    pub fn is_running(&self) -> bool {
        self.phase == CountdownPhase::Running
    }

    /// Starts the countdown when remaining time is positive and no countdown
    /// is already active.
    ///
    /// # Returns
    /// `true` when this call transitioned the machine to `Running`.
    pub fn try_start(&mut self, remaining_seconds: u64) -> bool {
        if self.phase == CountdownPhase::Running || remaining_seconds == 0 {
            return false;
        }
        self.phase = CountdownPhase::Running;
        true
    }

    /// Consumes one 1-second tick.
    ///
    /// While running, the remaining time decrements by one; the new value is
    /// due for persistence whenever it is an exact multiple of
    /// [`PERSIST_EVERY_SECONDS`] (including zero, so the store learns the
    /// lease ended), and reaching zero transitions the machine to `Expired`.
    /// Ticks outside the `Running` phase are explicit no-ops.
    pub fn tick(&mut self, remaining_seconds: u64) -> TickEffect {
        if self.phase != CountdownPhase::Running {
            return TickEffect {
                remaining_seconds,
                persist_due: false,
                expired: false,
            };
        }

        if remaining_seconds == 0 {
            // Invariant:
            // - `Running` requires positive remaining time at start; observing
            //   zero here means an external reset, so expire without a write.
            self.phase = CountdownPhase::Expired;
            return TickEffect {
                remaining_seconds: 0,
                persist_due: false,
                expired: true,
            };
        }

        let remaining = remaining_seconds - 1;
        let expired = remaining == 0;
        if expired {
            self.phase = CountdownPhase::Expired;
        }

        TickEffect {
            remaining_seconds: remaining,
            persist_due: remaining % PERSIST_EVERY_SECONDS == 0,
            expired,
        }
    }

    /// Halts the countdown immediately, regardless of phase.
    pub fn cancel(&mut self) {
        self.phase = CountdownPhase::Stopped;
    }
}

impl Default for LeaseCountdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Countdown that holds the ad claim control closed for a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdGate {
    remaining_seconds: u32,
}

impl AdGate {
    /// Opens a fresh gate at [`AD_GATE_SECONDS`].
    pub fn new() -> Self {
        Self {
            remaining_seconds: AD_GATE_SECONDS,
        }
    }

    /// Consumes one 1-second tick and returns the remaining gate seconds.
    pub fn tick(&mut self) -> u32 {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.remaining_seconds
    }

    /// Returns the seconds left before the claim control opens.
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Returns `true` once the gate window fully elapsed.
    pub fn is_complete(&self) -> bool {
        self.remaining_seconds == 0
    }
}

impl Default for AdGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated periodic cadence used by the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCadence {
    /// Period between ticks in milliseconds.
    pub interval_ms: u64,
}

impl TickCadence {
    /// Creates a validated cadence.
    ///
    /// # Errors
    /// Returns [`CountdownError::InvalidInterval`] when `interval_ms == 0`.
    pub fn new(interval_ms: u64) -> Result<Self, CountdownError> {
        if interval_ms == 0 {
            return Err(CountdownError::InvalidInterval);
        }
        Ok(Self { interval_ms })
    }

    /// Computes deterministic fire timestamps for this cadence.
    ///
    /// # Returns
    /// Vector of `count` timestamps starting at `start_ms` with
    /// `interval_ms` spacing.
    pub fn scheduled_times(&self, start_ms: u64, count: usize) -> Vec<u64> {
        (0..count)
            .map(|index| start_ms.saturating_add(self.interval_ms.saturating_mul(index as u64)))
            .collect()
    }
}

/// Countdown layer error type.
#[derive(Debug, Error)]
pub enum CountdownError {
    /// Cadence interval must be positive.
    #[error("invalid cadence: interval must be greater than zero")]
    InvalidInterval,
}
