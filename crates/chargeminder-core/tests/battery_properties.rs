//! Property tests for the battery drain simulation.

use chargeminder_core::battery::{decayed_level, BatterySimulator, BatterySnapshot, SeededRates};
use chargeminder_core::storage::{BatteryConfig, DrainProfile};
use proptest::prelude::*;

const HOUR_MS: i64 = 3_600_000;

proptest! {
    #[test]
    fn decayed_level_stays_within_anchor(
        level in 0u8..=100,
        elapsed_ms in 0i64..(30 * 24 * HOUR_MS),
        rate in 0.0f64..120.0,
    ) {
        let snapshot = BatterySnapshot { level, timestamp: 1_000 };
        let now = decayed_level(&snapshot, 1_000 + elapsed_ms, rate);
        prop_assert!(now <= level);
    }

    #[test]
    fn decayed_level_is_non_increasing_in_elapsed_time(
        level in 0u8..=100,
        a in 0i64..(48 * HOUR_MS),
        b in 0i64..(48 * HOUR_MS),
        rate in 0.0f64..60.0,
    ) {
        let snapshot = BatterySnapshot { level, timestamp: 0 };
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(decayed_level(&snapshot, late, rate) <= decayed_level(&snapshot, early, rate));
    }

    #[test]
    fn clock_skew_never_raises_level(level in 0u8..=100, skew_ms in 1i64..HOUR_MS) {
        let snapshot = BatterySnapshot { level, timestamp: 10 * HOUR_MS };
        prop_assert_eq!(decayed_level(&snapshot, 10 * HOUR_MS - skew_ms, 5.0), level);
    }

    #[test]
    fn simulated_reads_stay_within_configured_drain(
        seed in any::<u64>(),
        level in 10u8..=100,
        minutes in 0i64..=60,
        per_minute in any::<bool>(),
    ) {
        let mut config = BatteryConfig::default();
        if per_minute {
            config.drain_profile = DrainProfile::PerMinute;
        }
        let (min, max) = config.drain_range_per_hour();
        let mut sim = BatterySimulator::new(config, Box::new(SeededRates::new(Some(seed))));
        let snapshot = BatterySnapshot { level, timestamp: 0 };
        let now_ms = minutes * 60_000;

        let hours = minutes as f64 / 60.0;
        let lowest = (level as f64 - hours * max).round().max(0.0) as u8;
        let highest = (level as f64 - hours * min).round().max(0.0) as u8;
        let read = sim.current_level(&snapshot, now_ms);
        prop_assert!(read >= lowest && read <= highest, "{} not in [{}, {}]", read, lowest, highest);
    }

    #[test]
    fn charge_bump_is_capped(seed in any::<u64>(), level in 0u8..=100) {
        let config = BatteryConfig::default();
        let (lo, hi) = (config.charge_bump_min, config.charge_bump_max);
        let mut sim = BatterySimulator::new(config, Box::new(SeededRates::new(Some(seed))));
        let charged = sim.charged_level(level);
        prop_assert!(charged <= 100);
        prop_assert!(charged >= level.saturating_add(lo).min(100));
        prop_assert!(charged <= level.saturating_add(hi).min(100));
    }
}
