//! Host simulation clock with a time-acceleration ("warp") multiplier.
//!
//! At 1x the host runs its physics at `base_delta` seconds per tick. Under
//! warp each tick covers `base_delta * rate` seconds, so anything sized to
//! one tick of consumption grows with the warp rate.

use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed64, Ticks};

/// The stock warp rate table.
pub const DEFAULT_WARP_RATES: [i32; 8] = [1, 5, 10, 50, 100, 1_000, 10_000, 100_000];

/// Seconds of simulated time per physics tick at 1x.
pub fn default_base_delta() -> Fixed64 {
    Fixed64::from_num(0.02)
}

/// Time warp controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWarp {
    rates: Vec<Fixed64>,
    index: usize,
    /// Set by [`set_rate`](TimeWarp::set_rate); overrides the table entry.
    custom_rate: Option<Fixed64>,
    base_delta: Fixed64,
}

impl Default for TimeWarp {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeWarp {
    /// Clock at 1x with the stock rate table.
    pub fn new() -> Self {
        Self::with_rates(
            DEFAULT_WARP_RATES.iter().map(|r| Fixed64::from_num(*r)).collect(),
            default_base_delta(),
        )
    }

    /// Clock with a custom rate table. An empty table falls back to `[1]`.
    pub fn with_rates(mut rates: Vec<Fixed64>, base_delta: Fixed64) -> Self {
        if rates.is_empty() {
            rates.push(Fixed64::ONE);
        }
        Self {
            rates,
            index: 0,
            custom_rate: None,
            base_delta,
        }
    }

    /// Current time-acceleration multiplier.
    pub fn current_rate(&self) -> Fixed64 {
        self.custom_rate.unwrap_or(self.rates[self.index])
    }

    /// Seconds of simulated time covered by one tick at the current rate.
    pub fn fixed_delta_time(&self) -> Fixed64 {
        self.base_delta.saturating_mul(self.current_rate())
    }

    pub fn rate_index(&self) -> usize {
        self.index
    }

    pub fn rate_count(&self) -> usize {
        self.rates.len()
    }

    /// Select a table entry. Out-of-range indices clamp to the last entry.
    pub fn set_rate_index(&mut self, index: usize) {
        self.index = index.min(self.rates.len() - 1);
        self.custom_rate = None;
    }

    /// Force an arbitrary multiplier, bypassing the table.
    pub fn set_rate(&mut self, rate: Fixed64) {
        self.custom_rate = Some(rate);
    }

    /// Capture the values modules see for one tick.
    pub fn snapshot(&self, tick: Ticks) -> ClockSnapshot {
        ClockSnapshot {
            rate: self.current_rate(),
            fixed_delta_time: self.fixed_delta_time(),
            tick,
        }
    }
}

/// Clock values for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub rate: Fixed64,
    pub fixed_delta_time: Fixed64,
    pub tick: Ticks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one_x() {
        let warp = TimeWarp::new();
        assert_eq!(warp.current_rate(), Fixed64::ONE);
        assert_eq!(warp.fixed_delta_time(), default_base_delta());
        assert_eq!(warp.rate_count(), DEFAULT_WARP_RATES.len());
    }

    #[test]
    fn delta_scales_with_rate() {
        let mut warp = TimeWarp::new();
        warp.set_rate_index(4);
        assert_eq!(warp.current_rate(), Fixed64::from_num(100));
        assert_eq!(
            warp.fixed_delta_time(),
            default_base_delta() * Fixed64::from_num(100)
        );
    }

    #[test]
    fn index_clamps_to_table() {
        let mut warp = TimeWarp::new();
        warp.set_rate_index(99);
        assert_eq!(warp.rate_index(), DEFAULT_WARP_RATES.len() - 1);
        assert_eq!(warp.current_rate(), Fixed64::from_num(100_000));
    }

    #[test]
    fn custom_rate_overrides_until_index_is_set() {
        let mut warp = TimeWarp::new();
        warp.set_rate(Fixed64::from_num(3));
        assert_eq!(warp.current_rate(), Fixed64::from_num(3));
        warp.set_rate_index(1);
        assert_eq!(warp.current_rate(), Fixed64::from_num(5));
    }

    #[test]
    fn empty_table_falls_back_to_one() {
        let warp = TimeWarp::with_rates(Vec::new(), Fixed64::ONE);
        assert_eq!(warp.current_rate(), Fixed64::ONE);
    }

    #[test]
    fn snapshot_captures_tick() {
        let mut warp = TimeWarp::with_rates(vec![Fixed64::ONE], Fixed64::ONE);
        warp.set_rate(Fixed64::from_num(10));
        let snap = warp.snapshot(42);
        assert_eq!(snap.tick, 42);
        assert_eq!(snap.rate, Fixed64::from_num(10));
        assert_eq!(snap.fixed_delta_time, Fixed64::from_num(10));
    }
}
