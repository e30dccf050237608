//! Buffer storage: the reservoir's authoritative state and its mirrors.
//!
//! [`BufferState`] is the single source of truth. Every mutation goes
//! through [`BufferStorage`], which first reads back the live amount (host
//! physics moves it between ticks), computes the new state, and then calls
//! [`BufferStorage::sync`] to write both the live container and the part's
//! durable snapshot record. A vessel can be saved at any point between
//! ticks, so there is no deferred sync.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use warpbuffer_core::fixed::{Fixed64, clamp, fixed64_to_f64};
use warpbuffer_core::id::ContainerRef;
use warpbuffer_core::vessel::Vessel;

use crate::registry::ReservoirCandidate;

// ---------------------------------------------------------------------------
// BufferState
// ---------------------------------------------------------------------------

/// Reservoir state.
///
/// Invariants: `0 <= amount <= capacity` and `capacity >= nominal_capacity`.
/// The constructors and transitions below are the only way these values
/// change, and each one re-establishes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferState {
    pub amount: Fixed64,
    pub capacity: Fixed64,
    pub nominal_capacity: Fixed64,
    pub scale_factor: Fixed64,
}

impl BufferState {
    /// State at nominal capacity. `amount` is clamped into range.
    pub fn new(nominal_capacity: Fixed64, amount: Fixed64, scale_factor: Fixed64) -> Self {
        let nominal_capacity = nominal_capacity.max(Fixed64::ZERO);
        Self {
            amount: clamp(amount, Fixed64::ZERO, nominal_capacity),
            capacity: nominal_capacity,
            nominal_capacity,
            scale_factor,
        }
    }

    /// New capacity, never below nominal. `amount` is truncated, never raised.
    pub fn resized(&self, capacity: Fixed64) -> Self {
        let capacity = capacity.max(self.nominal_capacity);
        Self {
            amount: clamp(self.amount, Fixed64::ZERO, capacity),
            capacity,
            ..*self
        }
    }

    /// Back to nominal capacity.
    pub fn cleared(&self) -> Self {
        self.resized(self.nominal_capacity)
    }

    /// Take a new amount reading, clamped into `[0, capacity]`.
    pub fn with_amount(&self, amount: Fixed64) -> Self {
        Self {
            amount: clamp(amount, Fixed64::ZERO, self.capacity),
            ..*self
        }
    }

    pub fn holds_invariants(&self) -> bool {
        self.amount >= Fixed64::ZERO
            && self.amount <= self.capacity
            && self.capacity >= self.nominal_capacity
    }
}

// ---------------------------------------------------------------------------
// BufferStorage
// ---------------------------------------------------------------------------

/// Owns the discovered reservoir and every write to it.
#[derive(Debug, Clone)]
pub struct BufferStorage {
    resource: String,
    reservoir: Option<ContainerRef>,
    /// Name of the reservoir's part when it was discovered.
    reservoir_part: String,
    state: Option<BufferState>,
}

impl BufferStorage {
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            reservoir: None,
            reservoir_part: String::new(),
            state: None,
        }
    }

    pub fn reservoir(&self) -> Option<ContainerRef> {
        self.reservoir
    }

    pub fn state(&self) -> Option<&BufferState> {
        self.state.as_ref()
    }

    /// Nominal capacity, or zero without a reservoir.
    pub fn nominal_capacity(&self) -> Fixed64 {
        self.state
            .map(|s| s.nominal_capacity)
            .unwrap_or(Fixed64::ZERO)
    }

    /// Current capacity, or zero without a reservoir.
    pub fn current_capacity(&self) -> Fixed64 {
        self.state.map(|s| s.capacity).unwrap_or(Fixed64::ZERO)
    }

    /// Adopt the reservoir found by a rebuild.
    ///
    /// The nominal capacity is recorded only the first time a container is
    /// seen. A container counts as the same one when both its slot address
    /// and its part's name match the recorded reservoir; rediscovering it
    /// keeps the recorded nominal capacity, even if the live container is
    /// currently enlarged (for example after reloading an unfocused save).
    pub fn discover(
        &mut self,
        found: Option<ReservoirCandidate>,
        vessel: &Vessel,
        scale_factor: Fixed64,
    ) {
        match found {
            Some(candidate)
                if self.reservoir == Some(candidate.container)
                    && self.reservoir_part == part_name(vessel, &candidate) =>
            {
                if let Some(state) = self.state.as_mut() {
                    state.scale_factor = scale_factor;
                }
                self.pull_amount(vessel);
            }
            Some(candidate) => {
                let amount = vessel
                    .container(candidate.container)
                    .map(|c| c.amount)
                    .unwrap_or(Fixed64::ZERO);
                let part = part_name(vessel, &candidate);
                info!(
                    "located storage on {} with {} initial {}",
                    part,
                    fixed64_to_f64(candidate.max_amount),
                    self.resource
                );
                self.reservoir = Some(candidate.container);
                self.reservoir_part = part.to_string();
                self.state = Some(BufferState::new(
                    candidate.max_amount,
                    amount,
                    scale_factor,
                ));
            }
            None => {
                if self.reservoir.is_some() {
                    debug!("reservoir no longer present on '{}'", vessel.name);
                }
                info!(
                    "could not find a {} storage part on '{}'",
                    self.resource, vessel.name
                );
                self.reservoir = None;
                self.reservoir_part.clear();
                self.state = None;
            }
        }
    }

    /// Set capacity (never below nominal), clamp amount, sync.
    pub fn apply_capacity(&mut self, vessel: &mut Vessel, capacity: Fixed64) -> Option<BufferState> {
        self.pull_amount(vessel)?;
        let next = self.state?.resized(capacity);
        self.commit(vessel, next)
    }

    /// Return to nominal capacity, clamp amount, sync. Idempotent.
    pub fn clear(&mut self, vessel: &mut Vessel) -> Option<BufferState> {
        debug!("clearing buffer storage on '{}'", vessel.name);
        self.pull_amount(vessel)?;
        let next = self.state?.cleared();
        self.commit(vessel, next)
    }

    /// Write the authoritative state to the live container and to the
    /// reservoir's own snapshot record. Other containers on the same part
    /// are left alone.
    pub fn sync(&self, vessel: &mut Vessel) {
        let (Some(reservoir), Some(state)) = (self.reservoir, self.state) else {
            return;
        };
        if let Some(container) = vessel.container_mut(reservoir) {
            container.amount = state.amount;
            container.max_amount = state.capacity;
        }
        if let Some(record) = vessel
            .part_mut(reservoir.part)
            .and_then(|p| p.snapshot.record_mut(reservoir.slot, &self.resource))
        {
            record.amount = state.amount;
            record.max_amount = state.capacity;
        }
    }

    fn commit(&mut self, vessel: &mut Vessel, next: BufferState) -> Option<BufferState> {
        self.state = Some(next);
        self.sync(vessel);
        Some(next)
    }

    /// Refresh `state.amount` from the live container. `None` when there is
    /// no reservoir or its container has gone away.
    fn pull_amount(&mut self, vessel: &Vessel) -> Option<()> {
        let container = vessel.container(self.reservoir?)?;
        let state = self.state.as_mut()?;
        *state = state.with_amount(container.amount);
        Some(())
    }
}

fn part_name<'v>(vessel: &'v Vessel, candidate: &ReservoirCandidate) -> &'v str {
    vessel
        .part(candidate.container.part)
        .map(|p| p.name.as_str())
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::locate_reservoir;
    use warpbuffer_core::test_utils::*;
    use warpbuffer_core::vessel::{ELECTRIC_CHARGE, Part, ResourceContainer};

    fn state(amount: f64, capacity: f64, nominal: f64) -> BufferState {
        BufferState {
            amount: fixed(amount),
            capacity: fixed(capacity),
            nominal_capacity: fixed(nominal),
            scale_factor: fixed(1.5),
        }
    }

    fn storage_on(vessel: &Vessel) -> BufferStorage {
        let mut storage = BufferStorage::new(ELECTRIC_CHARGE);
        storage.discover(locate_reservoir(vessel, ELECTRIC_CHARGE), vessel, fixed(1.5));
        storage
    }

    // -----------------------------------------------------------------------
    // BufferState
    // -----------------------------------------------------------------------

    #[test]
    fn new_state_clamps_amount_to_nominal() {
        let s = BufferState::new(fixed(100.0), fixed(150.0), fixed(1.5));
        assert_eq!(s.amount, fixed(100.0));
        assert_eq!(s.capacity, fixed(100.0));
        assert!(s.holds_invariants());
    }

    #[test]
    fn resize_never_drops_below_nominal() {
        let s = state(50.0, 100.0, 100.0).resized(fixed(20.0));
        assert_eq!(s.capacity, fixed(100.0));
    }

    #[test]
    fn resize_truncates_amount_but_never_raises_it() {
        let s = state(140.0, 150.0, 100.0);
        assert_eq!(s.resized(fixed(120.0)).amount, fixed(120.0));
        assert_eq!(s.resized(fixed(500.0)).amount, fixed(140.0));
    }

    #[test]
    fn clearing_twice_equals_clearing_once() {
        let s = state(140.0, 150.0, 100.0);
        let once = s.cleared();
        assert_eq!(once.cleared(), once);
        assert_eq!(once.capacity, fixed(100.0));
        assert_eq!(once.amount, fixed(100.0));
    }

    #[test]
    fn with_amount_clamps_into_range() {
        let s = state(10.0, 100.0, 100.0);
        assert_eq!(s.with_amount(fixed(-5.0)).amount, Fixed64::ZERO);
        assert_eq!(s.with_amount(fixed(500.0)).amount, fixed(100.0));
    }

    // -----------------------------------------------------------------------
    // BufferStorage
    // -----------------------------------------------------------------------

    #[test]
    fn discover_records_nominal_from_container() {
        let vessel = simple_vessel();
        let storage = storage_on(&vessel);
        assert_eq!(storage.reservoir(), Some(first_battery(&vessel)));
        assert_eq!(storage.nominal_capacity(), fixed(100.0));
        assert_eq!(storage.current_capacity(), fixed(100.0));
        assert_eq!(storage.state().unwrap().amount, fixed(50.0));
    }

    #[test]
    fn rediscovering_same_container_keeps_nominal() {
        let mut vessel = simple_vessel();
        let mut storage = storage_on(&vessel);
        storage.apply_capacity(&mut vessel, fixed(300.0));

        storage.discover(locate_reservoir(&vessel, ELECTRIC_CHARGE), &vessel, fixed(2.0));
        assert_eq!(storage.nominal_capacity(), fixed(100.0));
        assert_eq!(storage.state().unwrap().scale_factor, fixed(2.0));
    }

    #[test]
    fn apply_capacity_writes_container_and_snapshot() {
        let mut vessel = simple_vessel();
        let mut storage = storage_on(&vessel);
        let reservoir = first_battery(&vessel);

        let next = storage.apply_capacity(&mut vessel, fixed(105.0)).unwrap();
        assert_eq!(next.capacity, fixed(105.0));

        let live = vessel.container(reservoir).unwrap();
        assert_eq!(live.max_amount, fixed(105.0));
        assert_eq!(live.amount, fixed(50.0));

        let record = &vessel.part(reservoir.part).unwrap().snapshot.resources[0];
        assert_eq!(record.max_amount, fixed(105.0));
        assert_eq!(record.amount, fixed(50.0));
    }

    #[test]
    fn clear_truncates_amount_and_is_idempotent() {
        let mut vessel = simple_vessel();
        let mut storage = storage_on(&vessel);
        let reservoir = first_battery(&vessel);
        storage.apply_capacity(&mut vessel, fixed(150.0));
        vessel.container_mut(reservoir).unwrap().amount = fixed(140.0);

        let once = storage.clear(&mut vessel).unwrap();
        assert_eq!(once.capacity, fixed(100.0));
        assert_eq!(once.amount, fixed(100.0));

        let twice = storage.clear(&mut vessel).unwrap();
        assert_eq!(once, twice);
        let record = &vessel.part(reservoir.part).unwrap().snapshot.resources[0];
        assert_eq!(record.amount, fixed(100.0));
        assert_eq!(record.max_amount, fixed(100.0));
    }

    #[test]
    fn mutations_pick_up_host_drained_amount() {
        let mut vessel = simple_vessel();
        let mut storage = storage_on(&vessel);
        vessel.container_mut(first_battery(&vessel)).unwrap().amount = fixed(7.0);
        let next = storage.apply_capacity(&mut vessel, fixed(120.0)).unwrap();
        assert_eq!(next.amount, fixed(7.0));
    }

    #[test]
    fn no_reservoir_makes_mutations_no_ops() {
        let mut vessel = simple_vessel();
        let part = first_battery(&vessel).part;
        vessel.remove_part(part);
        let mut storage = storage_on(&vessel);
        assert!(storage.reservoir().is_none());
        assert!(storage.apply_capacity(&mut vessel, fixed(500.0)).is_none());
        assert!(storage.clear(&mut vessel).is_none());
        assert_eq!(storage.nominal_capacity(), Fixed64::ZERO);
        assert_eq!(storage.current_capacity(), Fixed64::ZERO);
    }

    #[test]
    fn vanished_container_is_skipped() {
        let mut vessel = simple_vessel();
        let mut storage = storage_on(&vessel);
        let part = first_battery(&vessel).part;
        vessel.remove_part(part);
        assert!(storage.apply_capacity(&mut vessel, fixed(500.0)).is_none());
        assert_eq!(storage.current_capacity(), fixed(100.0));
    }

    #[test]
    fn sync_leaves_sibling_container_record_alone() {
        let mut vessel = Vessel::new("probe");
        let pack = vessel.add_part(Part::new(
            "batteryPack",
            vec![],
            vec![
                ResourceContainer::new(ELECTRIC_CHARGE, fixed(50.0), fixed(100.0)),
                ResourceContainer::new(ELECTRIC_CHARGE, fixed(10.0), fixed(20.0)),
            ],
        ));
        let mut storage = storage_on(&vessel);
        assert_eq!(storage.reservoir().unwrap().slot, 0);

        storage.apply_capacity(&mut vessel, fixed(150.0));
        let records = &vessel.part(pack).unwrap().snapshot.resources;
        assert_eq!(records[0].max_amount, fixed(150.0));
        assert_eq!(records[1].amount, fixed(10.0));
        assert_eq!(records[1].max_amount, fixed(20.0));

        storage.clear(&mut vessel);
        let reloaded = Vessel::load(&vessel.save().unwrap()).unwrap();
        assert_eq!(
            reloaded.connected_totals(ELECTRIC_CHARGE),
            (fixed(60.0), fixed(120.0))
        );
    }

    #[test]
    fn reloaded_inflated_reservoir_keeps_recorded_nominal() {
        let mut vessel = simple_vessel();
        let mut storage = storage_on(&vessel);
        storage.apply_capacity(&mut vessel, fixed(300.0));

        let reloaded = Vessel::load(&vessel.save().unwrap()).unwrap();
        assert_eq!(first_battery(&reloaded), first_battery(&vessel));
        storage.discover(locate_reservoir(&reloaded, ELECTRIC_CHARGE), &reloaded, fixed(1.5));
        assert_eq!(storage.nominal_capacity(), fixed(100.0));
        assert_eq!(storage.current_capacity(), fixed(300.0));
    }

    #[test]
    fn different_part_at_same_address_is_rediscovered() {
        let vessel = simple_vessel();
        let mut storage = storage_on(&vessel);

        let mut other = Vessel::new("relay");
        other.add_part(battery_part("largeBattery", 100.0, 400.0));
        assert_eq!(first_battery(&other), first_battery(&vessel));

        storage.discover(locate_reservoir(&other, ELECTRIC_CHARGE), &other, fixed(1.5));
        assert_eq!(storage.nominal_capacity(), fixed(400.0));
        assert_eq!(storage.state().unwrap().amount, fixed(100.0));
    }
}
