#![warn(missing_docs)]
//! # vps-desk-gauges
//!
//! ## Purpose
//! Fabricates the display-only resource utilization gauges.
//!
//! ## Responsibilities
//! - Sample pseudo-random CPU/RAM/storage readings on demand.
//! - Project samples into the ring and bar geometry the dashboard renders.
//!
//! ## Data flow
//! App gauge tick fires every five seconds -> [`GaugeSimulator::sample`]
//! draws one reading -> [`project_gauges`] turns it into render geometry.
//!
//! ## Ownership and lifetimes
//! The simulator owns its RNG; samples and projections are `Copy` values.
//!
//! ## Error model
//! Sampling and projection are total functions; this crate defines no error
//! type.
//!
//! ## Security and privacy notes
//! Gauge values are fabricated decoration with no relation to any real
//! resource; nothing here is persisted or transmitted.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed gauge refresh period in milliseconds.
pub const GAUGE_REFRESH_INTERVAL_MS: u64 = 5_000;

/// Inclusive lower bound for simulated CPU utilization.
pub const CPU_PERCENT_MIN: u8 = 20;

/// Exclusive upper bound for simulated CPU utilization.
pub const CPU_PERCENT_MAX: u8 = 50;

/// Lower bound for simulated RAM usage in GB.
pub const RAM_USED_GB_MIN: f32 = 1.5;

/// Upper bound for simulated RAM usage in GB.
pub const RAM_USED_GB_MAX: f32 = 4.5;

/// Inclusive lower bound for simulated storage usage in GB.
pub const STORAGE_USED_GB_MIN: u8 = 25;

/// Exclusive upper bound for simulated storage usage in GB.
pub const STORAGE_USED_GB_MAX: u8 = 45;

/// Rendered RAM capacity in GB; fill percentage is computed against it.
pub const RAM_CAPACITY_GB: f32 = 8.0;

/// Rendered storage capacity in GB; fill percentage is computed against it.
pub const STORAGE_CAPACITY_GB: f32 = 50.0;

/// Radius of the CPU progress ring in SVG user units.
pub const CPU_RING_RADIUS: f32 = 54.0;

/// One fabricated utilization reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSample {
    /// Simulated CPU utilization percentage.
    pub cpu_percent: u8,
    /// Simulated RAM usage in GB, one decimal.
    pub ram_used_gb: f32,
    /// Simulated storage usage in GB.
    pub storage_used_gb: u8,
}

/// Render geometry derived from one gauge sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeView {
    /// CPU percentage as numeric text.
    pub cpu_percent: u8,
    /// Stroke offset for the CPU progress ring.
    pub cpu_ring_offset: f32,
    /// RAM usage in GB as numeric text.
    pub ram_used_gb: f32,
    /// RAM bar width percentage against [`RAM_CAPACITY_GB`].
    pub ram_fill_percent: f32,
    /// Storage usage in GB as numeric text.
    pub storage_used_gb: u8,
    /// Storage bar width percentage against [`STORAGE_CAPACITY_GB`].
    pub storage_fill_percent: f32,
}

/// Pseudo-random gauge source with a seedable RNG for deterministic tests.
#[derive(Debug, Clone)]
pub struct GaugeSimulator {
    rng: StdRng,
}

impl GaugeSimulator {
    /// Creates a simulator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a simulator with a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws one fabricated utilization reading.
    pub fn sample(&mut self) -> GaugeSample {
        let cpu_percent = self.rng.random_range(CPU_PERCENT_MIN..CPU_PERCENT_MAX);
        let ram_raw = self.rng.random_range(RAM_USED_GB_MIN..RAM_USED_GB_MAX);
        let storage_used_gb = self
            .rng
            .random_range(STORAGE_USED_GB_MIN..STORAGE_USED_GB_MAX);

        GaugeSample {
            cpu_percent,
            ram_used_gb: (ram_raw * 10.0).round() / 10.0,
            storage_used_gb,
        }
    }
}

impl Default for GaugeSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Projects one sample into dashboard render geometry.
///
/// # Semantics
/// The CPU ring offset shrinks linearly from the full circumference at 0% to
/// zero at 100%; RAM and storage fills are plain percentages of their fixed
/// capacities.
pub fn project_gauges(sample: GaugeSample) -> GaugeView {
    let circumference = 2.0 * std::f32::consts::PI * CPU_RING_RADIUS;
    let cpu_fraction = f32::from(sample.cpu_percent) / 100.0;

    GaugeView {
        cpu_percent: sample.cpu_percent,
        cpu_ring_offset: circumference - cpu_fraction * circumference,
        ram_used_gb: sample.ram_used_gb,
        ram_fill_percent: sample.ram_used_gb / RAM_CAPACITY_GB * 100.0,
        storage_used_gb: sample.storage_used_gb,
        storage_fill_percent: f32::from(sample.storage_used_gb) / STORAGE_CAPACITY_GB * 100.0,
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for sample ranges and projection geometry.

    use super::*;

    #[test]
    fn seeded_samples_stay_inside_documented_ranges() {
        let mut simulator = GaugeSimulator::from_seed(7);
        for _ in 0..200 {
            let sample = simulator.sample();
            assert!((CPU_PERCENT_MIN..CPU_PERCENT_MAX).contains(&sample.cpu_percent));
            assert!(sample.ram_used_gb >= RAM_USED_GB_MIN);
            assert!(sample.ram_used_gb <= RAM_USED_GB_MAX);
            assert!(
                (STORAGE_USED_GB_MIN..STORAGE_USED_GB_MAX).contains(&sample.storage_used_gb)
            );
            // One-decimal rounding holds exactly in tenths.
            assert_eq!(sample.ram_used_gb, (sample.ram_used_gb * 10.0).round() / 10.0);
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_samples() {
        let mut first = GaugeSimulator::from_seed(42);
        let mut second = GaugeSimulator::from_seed(42);
        for _ in 0..10 {
            assert_eq!(first.sample(), second.sample());
        }
    }

    #[test]
    fn projection_maps_percentages_onto_geometry() {
        let view = project_gauges(GaugeSample {
            cpu_percent: 25,
            ram_used_gb: 4.0,
            storage_used_gb: 25,
        });

        let circumference = 2.0 * std::f32::consts::PI * CPU_RING_RADIUS;
        assert!((view.cpu_ring_offset - circumference * 0.75).abs() < 1e-3);
        assert!((view.ram_fill_percent - 50.0).abs() < 1e-6);
        assert!((view.storage_fill_percent - 50.0).abs() < 1e-6);
    }
}
