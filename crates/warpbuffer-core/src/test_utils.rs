//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::collections::BTreeSet;

use crate::fixed::Fixed64;
use crate::id::{ContainerRef, ModuleRef, PartId};
use crate::vessel::*;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Module constructors
// ===========================================================================

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A module with declared sets and a host-reported rate.
pub fn declared(kind: &str, inputs: &[&str], outputs: &[&str], rate: f64) -> PartModule {
    PartModule::new(
        kind,
        ResourceIo::Declared {
            inputs: names(inputs),
            outputs: names(outputs),
            rate: fixed(rate),
        },
    )
}

/// Produces electric charge at `rate`.
pub fn solar_panel(rate: f64) -> PartModule {
    declared("ModuleDeployableSolarPanel", &[], &[ELECTRIC_CHARGE], rate)
}

/// Consumes electric charge at `rate`.
pub fn reaction_wheel(rate: f64) -> PartModule {
    declared("ModuleReactionWheel", &[ELECTRIC_CHARGE], &[], rate)
}

/// Consumes electric charge at `rate`.
pub fn antenna(rate: f64) -> PartModule {
    declared("ModuleDataTransmitter", &[ELECTRIC_CHARGE], &[], rate)
}

/// Converter: fuel in, electric charge out at `ec_out` per second.
pub fn fuel_cell(ec_out: f64) -> PartModule {
    PartModule::new(
        "ModuleResourceConverter",
        ResourceIo::Recipe {
            inputs: vec![
                RecipeLine::new("LiquidFuel", fixed(0.0016875)),
                RecipeLine::new("Oxidizer", fixed(0.0020625)),
            ],
            outputs: vec![RecipeLine::new(ELECTRIC_CHARGE, fixed(ec_out))],
        },
    )
}

/// Converter: electric charge and ore in, fuel out.
pub fn isru(ec_in: f64) -> PartModule {
    PartModule::new(
        "ModuleResourceConverter",
        ResourceIo::Recipe {
            inputs: vec![
                RecipeLine::new("Ore", fixed(0.5)),
                RecipeLine::new(ELECTRIC_CHARGE, fixed(ec_in)),
            ],
            outputs: vec![RecipeLine::new("LiquidFuel", fixed(0.45))],
        },
    )
}

/// A module that moves no resources.
pub fn decoupler() -> PartModule {
    PartModule::new("ModuleDecouple", ResourceIo::Inert)
}

// ===========================================================================
// Part constructors
// ===========================================================================

/// A part holding only an electric charge container.
pub fn battery_part(name: &str, amount: f64, max: f64) -> Part {
    Part::new(
        name,
        vec![],
        vec![ResourceContainer::new(ELECTRIC_CHARGE, fixed(amount), fixed(max))],
    )
}

/// A part with modules and no resources.
pub fn module_part(name: &str, modules: Vec<PartModule>) -> Part {
    Part::new(name, modules, vec![])
}

// ===========================================================================
// Vessel constructors
// ===========================================================================

/// Probe core with a 100 EC battery (half full), one 3 EC/s solar panel
/// and one 1 EC/s reaction wheel.
pub fn simple_vessel() -> Vessel {
    let mut vessel = Vessel::new("probe");
    vessel.add_part(battery_part("probeCore", 50.0, 100.0));
    vessel.add_part(module_part("solarPanel", vec![solar_panel(3.0)]));
    vessel.add_part(module_part("wheel", vec![reaction_wheel(1.0)]));
    vessel
}

/// Address of the first electric charge container on `vessel`.
pub fn first_battery(vessel: &Vessel) -> ContainerRef {
    vessel
        .first_container(ELECTRIC_CHARGE)
        .expect("vessel has no electric charge container")
}

/// Address of the module in `slot` of `part`.
pub fn module_ref(part: PartId, slot: usize) -> ModuleRef {
    ModuleRef { part, slot }
}

/// Overwrite the host-reported rate of a declared module.
pub fn set_declared_rate(vessel: &mut Vessel, r: ModuleRef, rate: f64) {
    if let Some(ResourceIo::Declared { rate: current, .. }) =
        vessel.module_mut(r).map(|m| &mut m.io)
    {
        *current = fixed(rate);
    }
}
