use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a part within a vessel.
    pub struct PartId;

    /// Identifies a vessel within a flight.
    pub struct VesselId;
}

/// Addresses a module by its slot inside a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleRef {
    pub part: PartId,
    pub slot: usize,
}

/// Addresses a resource container by its slot inside a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub part: PartId,
    pub slot: usize,
}

/// Identifies an event subscription. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);
