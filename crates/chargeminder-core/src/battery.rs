//! Simulated battery drain between explicit readings.
//!
//! A [`BatterySnapshot`] anchors a known level at a point in time. Reading
//! the level later extrapolates a drain at a rate drawn from a
//! [`RateSource`]. With [`SeededRates`] each read draws a fresh rate, so two
//! reads of the same snapshot at the same instant may differ: the level is a
//! simulation, not a measurement. Tests pin the rate with [`FixedRates`].

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::storage::BatteryConfig;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Last anchored battery reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterySnapshot {
    pub level: u8,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Level after draining from `snapshot` until `now_ms` at `rate_per_hour`.
///
/// Never negative and never above the anchored level; a clock that went
/// backwards counts as zero elapsed time.
pub fn decayed_level(snapshot: &BatterySnapshot, now_ms: i64, rate_per_hour: f64) -> u8 {
    let elapsed_ms = now_ms.saturating_sub(snapshot.timestamp).max(0);
    let elapsed_hours = elapsed_ms as f64 / MS_PER_HOUR;
    let drained = elapsed_hours * rate_per_hour.max(0.0);
    let level = (snapshot.level as f64 - drained).round();
    level.clamp(0.0, snapshot.level as f64) as u8
}

/// Source of the randomized quantities used by the simulator.
pub trait RateSource: Send {
    /// Drain rate in percent per hour, within `[min, max]`.
    fn drain_rate(&mut self, min: f64, max: f64) -> f64;

    /// Percentage points added by one charge, within `[min, max]`.
    fn charge_amount(&mut self, min: u8, max: u8) -> u8;
}

/// Uniform draws from a PCG generator.
pub struct SeededRates {
    rng: Mcg128Xsl64,
}

impl SeededRates {
    /// `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self { rng }
    }
}

impl RateSource for SeededRates {
    fn drain_rate(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn charge_amount(&mut self, min: u8, max: u8) -> u8 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Constant rates for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRates {
    pub drain_per_hour: f64,
    pub charge_amount: u8,
}

impl RateSource for FixedRates {
    fn drain_rate(&mut self, _min: f64, _max: f64) -> f64 {
        self.drain_per_hour
    }

    fn charge_amount(&mut self, _min: u8, _max: u8) -> u8 {
        self.charge_amount
    }
}

/// Device battery query. Returns a fraction in `[0, 1]` when available.
pub trait BatteryProbe {
    fn read_fraction(&self) -> Option<f64>;
}

/// Probe for surfaces without a battery API.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBatteryProbe;

impl BatteryProbe for NoBatteryProbe {
    fn read_fraction(&self) -> Option<f64> {
        None
    }
}

/// Convert a probe fraction to a whole percentage.
pub fn fraction_to_level(fraction: f64) -> Option<u8> {
    if !fraction.is_finite() {
        return None;
    }
    Some((fraction.clamp(0.0, 1.0) * 100.0).round() as u8)
}

/// Drain and charge arithmetic bound to a [`BatteryConfig`].
pub struct BatterySimulator {
    config: BatteryConfig,
    rates: Box<dyn RateSource>,
}

impl BatterySimulator {
    pub fn new(config: BatteryConfig, rates: Box<dyn RateSource>) -> Self {
        Self { config, rates }
    }

    /// Simulated level now. Draws a new rate on every call.
    pub fn current_level(&mut self, snapshot: &BatterySnapshot, now_ms: i64) -> u8 {
        let (min, max) = self.config.drain_range_per_hour();
        let rate = self.rates.drain_rate(min, max);
        decayed_level(snapshot, now_ms, rate)
    }

    /// Level after a partial, randomized charge. Capped at 100.
    pub fn charged_level(&mut self, level: u8) -> u8 {
        let bump = self
            .rates
            .charge_amount(self.config.charge_bump_min, self.config.charge_bump_max);
        level.saturating_add(bump).min(100)
    }

    pub fn default_level(&self) -> u8 {
        self.config.default_level.min(100)
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }
}
