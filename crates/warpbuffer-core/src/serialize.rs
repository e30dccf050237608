//! Vessel save/load via `bitcode` with a versioned header.
//!
//! Saves are built from each part's [`PartSnapshot`](crate::vessel::PartSnapshot),
//! never from the live containers: a vessel that is not being actively
//! simulated only keeps its durable records current. Loading restores the
//! live containers from those records.

use serde::{Deserialize, Serialize};

use crate::vessel::{Part, PartModule, PartSnapshot, ResourceContainer, Vessel};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a vessel save.
pub const SAVE_MAGIC: u32 = 0x5EB0_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SAVE_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("save from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header prepended to every vessel save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveHeader {
    pub magic: u32,
    pub version: u32,
}

impl SaveHeader {
    pub fn new() -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SAVE_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SaveHeader {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Saved representation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct PartRecord {
    name: String,
    modules: Vec<PartModule>,
    snapshot: PartSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
struct VesselRecord {
    header: SaveHeader,
    name: String,
    parts: Vec<PartRecord>,
}

impl Vessel {
    /// Serialize the vessel's durable representation.
    pub fn save(&self) -> Result<Vec<u8>, SerializeError> {
        let record = VesselRecord {
            header: SaveHeader::new(),
            name: self.name.clone(),
            parts: self
                .parts()
                .map(|(_, p)| PartRecord {
                    name: p.name.clone(),
                    modules: p.modules.clone(),
                    snapshot: p.snapshot.clone(),
                })
                .collect(),
        };
        bitcode::serialize(&record).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Rebuild a vessel from a save. Live containers take the snapshot values.
    pub fn load(data: &[u8]) -> Result<Vessel, DeserializeError> {
        let record: VesselRecord =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        record.header.validate()?;

        let mut vessel = Vessel::new(&record.name);
        for p in record.parts {
            let resources = p
                .snapshot
                .resources
                .iter()
                .map(|r| ResourceContainer::new(&r.resource, r.amount, r.max_amount))
                .collect();
            vessel.add_part(Part {
                name: p.name,
                modules: p.modules,
                resources,
                snapshot: p.snapshot,
            });
        }
        Ok(vessel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ContainerRef;
    use crate::test_utils::*;
    use crate::vessel::ELECTRIC_CHARGE;

    #[test]
    fn save_uses_snapshot_not_live_values() {
        let mut vessel = Vessel::new("probe");
        let part = vessel.add_part(battery_part("battery", 40.0, 100.0));
        let c = vessel.container_mut(ContainerRef { part, slot: 0 }).unwrap();
        c.amount = fixed(5.0);
        c.max_amount = fixed(500.0);

        let loaded = Vessel::load(&vessel.save().unwrap()).unwrap();
        let (amount, max) = loaded.connected_totals(ELECTRIC_CHARGE);
        assert_eq!(amount, fixed(40.0));
        assert_eq!(max, fixed(100.0));
    }

    #[test]
    fn load_preserves_part_order_and_modules() {
        let mut vessel = Vessel::new("relay");
        vessel.add_part(Part::new("core", vec![solar_panel(2.0)], vec![]));
        vessel.add_part(battery_part("battery", 10.0, 20.0));

        let loaded = Vessel::load(&vessel.save().unwrap()).unwrap();
        assert_eq!(loaded.name, "relay");
        let names: Vec<&str> = loaded.parts().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, vec!["core", "battery"]);
        assert_eq!(loaded.modules().count(), 1);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = Vessel::load(&[1, 2, 3]);
        assert!(matches!(result, Err(DeserializeError::Decode(_))));
    }

    #[test]
    fn header_validation() {
        assert!(SaveHeader::new().validate().is_ok());

        let bad_magic = SaveHeader {
            magic: 0xDEAD_BEEF,
            version: FORMAT_VERSION,
        };
        assert!(matches!(
            bad_magic.validate(),
            Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))
        ));

        let future = SaveHeader {
            magic: SAVE_MAGIC,
            version: FORMAT_VERSION + 1,
        };
        assert!(matches!(
            future.validate(),
            Err(DeserializeError::FutureVersion(_))
        ));

        let old = SaveHeader {
            magic: SAVE_MAGIC,
            version: 0,
        };
        assert!(matches!(
            old.validate(),
            Err(DeserializeError::UnsupportedVersion(0))
        ));
    }
}
