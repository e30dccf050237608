//! Component registry: which modules on a vessel produce or consume the
//! tracked resource.
//!
//! A snapshot is always built from scratch and handed back whole; callers
//! swap it in place of the old one. Nothing patches a snapshot in place.

use log::warn;
use warpbuffer_core::fixed::Fixed64;
use warpbuffer_core::id::{ContainerRef, ModuleRef};
use warpbuffer_core::vessel::Vessel;

use crate::capability;

// ---------------------------------------------------------------------------
// Registered components
// ---------------------------------------------------------------------------

/// A module registered as a producer of the tracked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerProducer {
    pub module: ModuleRef,
    pub kind: String,
}

/// A module registered as a consumer of the tracked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerConsumer {
    pub module: ModuleRef,
    pub kind: String,
}

impl PowerProducer {
    /// Current production, or zero if the module no longer exists.
    pub fn rate(&self, vessel: &Vessel, resource: &str) -> Fixed64 {
        vessel
            .module(self.module)
            .map(|m| capability::production_rate(m, resource))
            .unwrap_or(Fixed64::ZERO)
    }
}

impl PowerConsumer {
    /// Current consumption, or zero if the module no longer exists.
    pub fn rate(&self, vessel: &Vessel, resource: &str) -> Fixed64 {
        vessel
            .module(self.module)
            .map(|m| capability::consumption_rate(m, resource))
            .unwrap_or(Fixed64::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Producers and consumers of one vessel at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElectricalSnapshot {
    pub producers: Vec<PowerProducer>,
    pub consumers: Vec<PowerConsumer>,
    /// Summed capacity of every container of the resource at rebuild time.
    pub total_existing_max: Fixed64,
}

impl ElectricalSnapshot {
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty() && self.consumers.is_empty()
    }
}

/// A reservoir candidate found during a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservoirCandidate {
    pub container: ContainerRef,
    /// The container's capacity when it was found.
    pub max_amount: Fixed64,
}

/// Everything a rebuild produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rebuild {
    pub snapshot: ElectricalSnapshot,
    pub reservoir: Option<ReservoirCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The host had no structural data for the vessel.
    #[error("vessel has no structural data")]
    MissingVesselData,
}

// ---------------------------------------------------------------------------
// Rebuild
// ---------------------------------------------------------------------------

/// Classify every module of `vessel` and locate the reservoir.
///
/// A module that both draws and emits `resource` lands in both lists.
/// Classification is declarative: disabled modules are registered too.
pub fn rebuild(vessel: Option<&Vessel>, resource: &str) -> Result<Rebuild, RegistryError> {
    let Some(vessel) = vessel else {
        warn!("electrical refresh failed: vessel not initialized");
        return Err(RegistryError::MissingVesselData);
    };

    let mut snapshot = ElectricalSnapshot::default();
    for (r, module) in vessel.modules() {
        if capability::produces(module, resource) {
            snapshot.producers.push(PowerProducer {
                module: r,
                kind: module.kind.clone(),
            });
        }
        if capability::consumes(module, resource) {
            snapshot.consumers.push(PowerConsumer {
                module: r,
                kind: module.kind.clone(),
            });
        }
    }
    snapshot.total_existing_max = vessel.connected_totals(resource).1;

    Ok(Rebuild {
        snapshot,
        reservoir: locate_reservoir(vessel, resource),
    })
}

/// First container, in part order, holding `resource`.
pub fn locate_reservoir(vessel: &Vessel, resource: &str) -> Option<ReservoirCandidate> {
    let container = vessel.first_container(resource)?;
    let max_amount = vessel.container(container)?.max_amount;
    Some(ReservoirCandidate {
        container,
        max_amount,
    })
}
