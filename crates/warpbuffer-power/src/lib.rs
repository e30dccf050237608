//! Dynamic buffer storage for vessels under time warp.
//!
//! At normal warp the host's per-tick physics balances electrical supply and
//! demand on its own. At high warp ticks become sparse, and a consumer that
//! drains a small battery within one tick starves even though production
//! would have covered it. This crate temporarily enlarges a vessel's
//! reservoir so it can absorb one tick of consumption, and shrinks it back
//! whenever that stops being safe.
//!
//! # Design
//!
//! - [`registry`] classifies modules into producers and consumers using the
//!   predicates in [`capability`]. Snapshots are rebuilt whole, never patched.
//! - [`aggregate`] sums live rates fresh every analytic tick.
//! - [`mode`] picks low fidelity or analytic from the warp rate, with no
//!   hysteresis, and tracks focus changes.
//! - [`allocator`] decides between clearing and resizing. A real deficit is
//!   never masked: the buffer only grows when production covers demand.
//! - [`storage`] owns the reservoir's state and mirrors every change into the
//!   part's durable snapshot right away.
//! - [`controller::DynamicBufferController`] is the
//!   [`VesselModule`](warpbuffer_core::module::VesselModule) that runs it all.

pub mod aggregate;
pub mod allocator;
pub mod capability;
pub mod config;
pub mod controller;
pub mod mode;
pub mod registry;
pub mod storage;

pub use aggregate::PowerTotals;
pub use allocator::{Allocation, AllocationInput};
pub use config::BufferConfig;
pub use controller::DynamicBufferController;
pub use mode::SimulationMode;
pub use registry::{ElectricalSnapshot, PowerConsumer, PowerProducer, RegistryError};
pub use storage::{BufferState, BufferStorage};
