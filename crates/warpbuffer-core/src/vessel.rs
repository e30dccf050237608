//! Vessel structure: parts, the modules mounted on them, and the resource
//! containers they carry.
//!
//! A [`Vessel`] is the host-side model the buffering core reads from. Parts
//! are kept in a slotmap for stable ids plus an ordering vec, because part
//! order matters (the first container holding a resource is the reservoir).
//!
//! Every part also carries a [`PartSnapshot`], the durable record written to
//! save files. Live containers and their snapshot records are independent:
//! the host only copies live values into the snapshot for the focused
//! vessel, so anything that mutates a container of a background vessel must
//! also write the snapshot itself.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::fixed::Fixed64;
use crate::id::{ContainerRef, ModuleRef, PartId};

/// Resource name for stock electrical charge.
pub const ELECTRIC_CHARGE: &str = "ElectricCharge";

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// One line of a converter recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub resource: String,
    /// Units per second at full throttle.
    pub ratio: Fixed64,
}

impl RecipeLine {
    pub fn new(resource: &str, ratio: Fixed64) -> Self {
        Self {
            resource: resource.to_string(),
            ratio,
        }
    }
}

/// How a module declares the resources it draws and emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResourceIo {
    /// Plain input/output name sets. The host reports the current rate
    /// directly (solar panels, reaction wheels, antennas, lights).
    Declared {
        inputs: BTreeSet<String>,
        outputs: BTreeSet<String>,
        /// Instantaneous rate in units per second.
        rate: Fixed64,
    },
    /// Converter or harvester with parallel recipe lines. The rate of a
    /// resource is its ratio scaled by the module's throttle.
    Recipe {
        inputs: Vec<RecipeLine>,
        outputs: Vec<RecipeLine>,
    },
    /// The module moves no resources.
    Inert,
}

/// A module mounted on a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartModule {
    /// Host-side module kind, kept for logging only.
    pub kind: String,
    pub io: ResourceIo,
    /// Disabled modules stay registered but report zero rate.
    pub enabled: bool,
    /// Activity level in `[0, 1]`, applied to recipe lines.
    pub throttle: Fixed64,
}

impl PartModule {
    pub fn new(kind: &str, io: ResourceIo) -> Self {
        Self {
            kind: kind.to_string(),
            io,
            enabled: true,
            throttle: Fixed64::ONE,
        }
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A live resource container on a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceContainer {
    pub resource: String,
    pub amount: Fixed64,
    pub max_amount: Fixed64,
}

impl ResourceContainer {
    pub fn new(resource: &str, amount: Fixed64, max_amount: Fixed64) -> Self {
        Self {
            resource: resource.to_string(),
            amount,
            max_amount,
        }
    }
}

/// Durable record of one resource entry, as written to save files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub resource: String,
    pub amount: Fixed64,
    pub max_amount: Fixed64,
}

/// Durable record of a part's resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    pub resources: Vec<ResourceSnapshot>,
}

impl PartSnapshot {
    /// Build a snapshot matching the given live containers.
    pub fn from_containers(containers: &[ResourceContainer]) -> Self {
        Self {
            resources: containers
                .iter()
                .map(|c| ResourceSnapshot {
                    resource: c.resource.clone(),
                    amount: c.amount,
                    max_amount: c.max_amount,
                })
                .collect(),
        }
    }

    /// The record mirroring the container in `slot`, if it holds `resource`.
    pub fn record_mut(&mut self, slot: usize, resource: &str) -> Option<&mut ResourceSnapshot> {
        self.resources
            .get_mut(slot)
            .filter(|r| r.resource == resource)
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// A part: a named bundle of modules and resource containers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub modules: Vec<PartModule>,
    pub resources: Vec<ResourceContainer>,
    pub snapshot: PartSnapshot,
}

impl Part {
    /// Create a part. The snapshot starts in sync with the containers.
    pub fn new(name: &str, modules: Vec<PartModule>, resources: Vec<ResourceContainer>) -> Self {
        let snapshot = PartSnapshot::from_containers(&resources);
        Self {
            name: name.to_string(),
            modules,
            resources,
            snapshot,
        }
    }

    /// Slot of the first container holding `resource`.
    pub fn container_slot(&self, resource: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.resource == resource)
    }
}

// ---------------------------------------------------------------------------
// Vessel
// ---------------------------------------------------------------------------

/// A vessel: an ordered set of parts.
#[derive(Debug, Clone, Default)]
pub struct Vessel {
    pub name: String,
    parts: SlotMap<PartId, Part>,
    order: Vec<PartId>,
}

impl Vessel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parts: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Append a part and return its id.
    pub fn add_part(&mut self, part: Part) -> PartId {
        let id = self.parts.insert(part);
        self.order.push(id);
        id
    }

    /// Remove a part. Returns it if it existed.
    pub fn remove_part(&mut self, id: PartId) -> Option<Part> {
        let part = self.parts.remove(id)?;
        self.order.retain(|p| *p != id);
        Some(part)
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id)
    }

    pub fn part_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id)
    }

    pub fn part_count(&self) -> usize {
        self.order.len()
    }

    /// Parts in vessel order.
    pub fn parts(&self) -> impl Iterator<Item = (PartId, &Part)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.parts.get(*id).map(|p| (*id, p)))
    }

    /// Every module in vessel order, with its address.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleRef, &PartModule)> + '_ {
        self.parts().flat_map(|(part, p)| {
            p.modules
                .iter()
                .enumerate()
                .map(move |(slot, m)| (ModuleRef { part, slot }, m))
        })
    }

    pub fn module(&self, r: ModuleRef) -> Option<&PartModule> {
        self.parts.get(r.part)?.modules.get(r.slot)
    }

    pub fn module_mut(&mut self, r: ModuleRef) -> Option<&mut PartModule> {
        self.parts.get_mut(r.part)?.modules.get_mut(r.slot)
    }

    pub fn container(&self, r: ContainerRef) -> Option<&ResourceContainer> {
        self.parts.get(r.part)?.resources.get(r.slot)
    }

    pub fn container_mut(&mut self, r: ContainerRef) -> Option<&mut ResourceContainer> {
        self.parts.get_mut(r.part)?.resources.get_mut(r.slot)
    }

    /// First container in part order holding `resource`.
    pub fn first_container(&self, resource: &str) -> Option<ContainerRef> {
        self.parts().find_map(|(part, p)| {
            p.container_slot(resource)
                .map(|slot| ContainerRef { part, slot })
        })
    }

    /// Sum of `(amount, max_amount)` across all containers of `resource`.
    pub fn connected_totals(&self, resource: &str) -> (Fixed64, Fixed64) {
        self.parts()
            .flat_map(|(_, p)| p.resources.iter())
            .filter(|c| c.resource == resource)
            .fold((Fixed64::ZERO, Fixed64::ZERO), |(amount, max), c| {
                (
                    amount.saturating_add(c.amount),
                    max.saturating_add(c.max_amount),
                )
            })
    }
}
