//! Production/consumption totals over a snapshot.
//!
//! Totals are always summed fresh from the live module rates; nothing is
//! cached between calls.

use warpbuffer_core::fixed::Fixed64;
use warpbuffer_core::vessel::Vessel;

use crate::registry::ElectricalSnapshot;

/// Summed instantaneous rates for one vessel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerTotals {
    pub production: Fixed64,
    pub consumption: Fixed64,
}

impl PowerTotals {
    /// `true` when consumption strictly exceeds production.
    pub fn is_shortfall(&self) -> bool {
        self.consumption > self.production
    }
}

pub fn total_production(snapshot: &ElectricalSnapshot, vessel: &Vessel, resource: &str) -> Fixed64 {
    snapshot
        .producers
        .iter()
        .map(|p| p.rate(vessel, resource))
        .fold(Fixed64::ZERO, |acc, r| acc.saturating_add(r))
}

pub fn total_consumption(
    snapshot: &ElectricalSnapshot,
    vessel: &Vessel,
    resource: &str,
) -> Fixed64 {
    snapshot
        .consumers
        .iter()
        .map(|c| c.rate(vessel, resource))
        .fold(Fixed64::ZERO, |acc, r| acc.saturating_add(r))
}

pub fn aggregate(snapshot: &ElectricalSnapshot, vessel: &Vessel, resource: &str) -> PowerTotals {
    PowerTotals {
        production: total_production(snapshot, vessel, resource),
        consumption: total_consumption(snapshot, vessel, resource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::rebuild;
    use warpbuffer_core::test_utils::*;
    use warpbuffer_core::vessel::ELECTRIC_CHARGE;

    fn mixed_vessel() -> Vessel {
        let mut vessel = Vessel::new("lander");
        vessel.add_part(battery_part("battery", 100.0, 200.0));
        vessel.add_part(module_part(
            "power",
            vec![solar_panel(4.0), solar_panel(2.5), fuel_cell(1.5)],
        ));
        vessel.add_part(module_part(
            "loads",
            vec![reaction_wheel(1.0), antenna(3.0), isru(10.0)],
        ));
        vessel
    }

    #[test]
    fn sums_every_registered_rate() {
        let vessel = mixed_vessel();
        let snapshot = rebuild(Some(&vessel), ELECTRIC_CHARGE).unwrap().snapshot;
        let totals = aggregate(&snapshot, &vessel, ELECTRIC_CHARGE);
        assert_eq!(totals.production, fixed(8.0));
        assert_eq!(totals.consumption, fixed(14.0));
        assert!(totals.is_shortfall());
    }

    #[test]
    fn follows_live_rate_changes_without_rebuild() {
        let mut vessel = mixed_vessel();
        let snapshot = rebuild(Some(&vessel), ELECTRIC_CHARGE).unwrap().snapshot;
        let panel = snapshot.producers[0].module;
        set_declared_rate(&mut vessel, panel, 20.0);
        assert_eq!(
            total_production(&snapshot, &vessel, ELECTRIC_CHARGE),
            fixed(24.0)
        );
    }

    #[test]
    fn empty_snapshot_totals_zero() {
        let vessel = mixed_vessel();
        let totals = aggregate(&ElectricalSnapshot::default(), &vessel, ELECTRIC_CHARGE);
        assert_eq!(totals, PowerTotals::default());
        assert!(!totals.is_shortfall());
    }

    #[test]
    fn balanced_totals_are_not_a_shortfall() {
        let totals = PowerTotals {
            production: fixed(5.0),
            consumption: fixed(5.0),
        };
        assert!(!totals.is_shortfall());
    }
}
