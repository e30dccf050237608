//! Warpbuffer Core -- the host-side vessel model and flight driver.
//!
//! This crate provides the pieces a vessel-level simulation module runs
//! against: the vessel structure (parts, modules, resource containers and
//! their durable snapshots), the time warp clock, structural change events,
//! and the [`flight::Flight`] driver that calls modules each tick.
//!
//! # Tick model
//!
//! Each call to [`flight::Flight::step`] is one physics tick. Every module of
//! every vessel receives `on_fixed_update` with a [`module::ModuleContext`]
//! holding the vessel (if its structure is loaded), the clock snapshot, and
//! whether the vessel is the active one. Structural changes are delivered
//! synchronously through [`flight::Flight::notify`].
//!
//! # Key Types
//!
//! - [`vessel::Vessel`] -- Ordered parts with modules and resource containers.
//! - [`vessel::PartSnapshot`] -- The durable record a save is built from.
//! - [`clock::TimeWarp`] -- Warp rate table and fixed delta time.
//! - [`event::EventHub`] -- Explicit subscriptions for vessel events.
//! - [`module::VesselModule`] -- Lifecycle callbacks for per-vessel logic.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod clock;
pub mod event;
pub mod fixed;
pub mod flight;
pub mod id;
pub mod module;
pub mod serialize;
pub mod vessel;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
