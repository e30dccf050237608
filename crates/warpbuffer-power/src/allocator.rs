//! Buffer sizing for analytic mode.
//!
//! Buffering only smooths the timing gap between sparse ticks. It never
//! covers a real deficit: when consumption exceeds production the buffer is
//! cleared back to nominal. Otherwise the buffer is sized to hold one tick
//! of consumption times the scale factor, minus whatever the vessel's own
//! containers already hold. The size is recomputed from current rates every
//! tick and never accumulates.

use warpbuffer_core::fixed::{EXTRA_CEILING, Fixed64, NET_FLOOR, clamp};

/// Everything one allocation decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationInput {
    pub production: Fixed64,
    pub consumption: Fixed64,
    /// Simulated seconds covered by one tick.
    pub delta_time: Fixed64,
    pub buffer_scale: Fixed64,
    /// Vessel-wide capacity of the resource, excluding any buffer growth.
    pub total_existing_max: Fixed64,
}

/// What the storage manager should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// Shortfall: return the reservoir to nominal capacity.
    Clear,
    /// Balanced or surplus: capacity becomes `nominal + extra`.
    Resize {
        /// One tick of consumption times the scale factor.
        desired: Fixed64,
        /// Portion of `desired` not already covered by existing capacity.
        extra: Fixed64,
    },
}

/// Production minus consumption, clamped to `[NET_FLOOR, 0]`. Surplus is
/// discarded: only the sign of a shortfall matters.
pub fn net_power(production: Fixed64, consumption: Fixed64) -> Fixed64 {
    clamp(
        production.saturating_sub(consumption),
        NET_FLOOR,
        Fixed64::ZERO,
    )
}

pub fn allocate(input: &AllocationInput) -> Allocation {
    if net_power(input.production, input.consumption) < Fixed64::ZERO {
        return Allocation::Clear;
    }
    let desired = input
        .consumption
        .saturating_mul(input.delta_time)
        .saturating_mul(input.buffer_scale);
    let extra = clamp(
        desired.saturating_sub(input.total_existing_max),
        Fixed64::ZERO,
        EXTRA_CEILING,
    );
    Allocation::Resize { desired, extra }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warpbuffer_core::test_utils::fixed;

    fn input(production: f64, consumption: f64, dt: f64, scale: f64, existing: f64) -> AllocationInput {
        AllocationInput {
            production: fixed(production),
            consumption: fixed(consumption),
            delta_time: fixed(dt),
            buffer_scale: fixed(scale),
            total_existing_max: fixed(existing),
        }
    }

    #[test]
    fn net_is_never_positive() {
        assert_eq!(net_power(fixed(50.0), fixed(30.0)), Fixed64::ZERO);
        assert_eq!(net_power(fixed(30.0), fixed(30.0)), Fixed64::ZERO);
        assert_eq!(net_power(fixed(20.0), fixed(30.0)), fixed(-10.0));
    }

    #[test]
    fn net_is_floored() {
        assert_eq!(net_power(Fixed64::ZERO, fixed(50_000_000.0)), NET_FLOOR);
    }

    #[test]
    fn surplus_sizes_from_consumption() {
        // 30 * 1 * 1.5 = 45, existing 40 -> extra 5
        let a = allocate(&input(50.0, 30.0, 1.0, 1.5, 40.0));
        assert_eq!(
            a,
            Allocation::Resize {
                desired: fixed(45.0),
                extra: fixed(5.0),
            }
        );
    }

    #[test]
    fn shortfall_clears() {
        assert_eq!(allocate(&input(20.0, 30.0, 1.0, 1.5, 40.0)), Allocation::Clear);
    }

    #[test]
    fn exact_balance_resizes() {
        let a = allocate(&input(30.0, 30.0, 2.0, 1.0, 10.0));
        assert_eq!(
            a,
            Allocation::Resize {
                desired: fixed(60.0),
                extra: fixed(50.0),
            }
        );
    }

    #[test]
    fn existing_capacity_covers_desired() {
        let a = allocate(&input(50.0, 30.0, 1.0, 1.5, 100.0));
        assert_eq!(
            a,
            Allocation::Resize {
                desired: fixed(45.0),
                extra: Fixed64::ZERO,
            }
        );
    }

    #[test]
    fn surplus_magnitude_does_not_change_size() {
        let small = allocate(&input(31.0, 30.0, 1.0, 1.5, 0.0));
        let large = allocate(&input(10_000.0, 30.0, 1.0, 1.5, 0.0));
        assert_eq!(small, large);
    }

    #[test]
    fn extra_is_capped() {
        let a = allocate(&input(1e6, 1e6, 100.0, 1.5, 0.0));
        match a {
            Allocation::Resize { extra, .. } => assert_eq!(extra, EXTRA_CEILING),
            Allocation::Clear => panic!("expected resize"),
        }
    }

    #[test]
    fn zero_consumption_needs_no_extra() {
        let a = allocate(&input(5.0, 0.0, 1.0, 1.5, 0.0));
        assert_eq!(
            a,
            Allocation::Resize {
                desired: Fixed64::ZERO,
                extra: Fixed64::ZERO,
            }
        );
    }
}
