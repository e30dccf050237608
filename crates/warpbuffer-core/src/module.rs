//! Per-vessel modules driven by the flight.
//!
//! A [`VesselModule`] is attached to one vessel and receives lifecycle
//! callbacks from [`Flight`](crate::flight::Flight): start, one call per
//! physics tick, subscribed structural events, save, and destroy. Every
//! callback gets a [`ModuleContext`]. The default implementations are
//! no-ops, so modules only override what they need.

use crate::clock::ClockSnapshot;
use crate::event::VesselEventKind;
use crate::vessel::Vessel;

// ---------------------------------------------------------------------------
// VesselModule trait
// ---------------------------------------------------------------------------

pub trait VesselModule: std::fmt::Debug {
    /// The human-readable name of this module, used for lookup and debugging.
    fn name(&self) -> &str;

    /// Event kinds this module wants. Registered when it is attached,
    /// removed when it is destroyed.
    fn subscriptions(&self) -> &[VesselEventKind] {
        &[]
    }

    /// Called once when the module is attached to its vessel.
    fn on_start(&mut self, ctx: &mut ModuleContext<'_>) {
        let _ = ctx;
    }

    /// Called once per physics tick.
    fn on_fixed_update(&mut self, ctx: &mut ModuleContext<'_>) {
        let _ = ctx;
    }

    /// Called synchronously for each subscribed event on this vessel.
    fn on_vessel_event(&mut self, ctx: &mut ModuleContext<'_>, kind: VesselEventKind) {
        let _ = (ctx, kind);
    }

    /// Called right before the vessel's durable representation is written.
    fn on_save(&mut self, ctx: &mut ModuleContext<'_>) {
        let _ = ctx;
    }

    /// Called once when the module is detached. No callbacks follow.
    fn on_destroy(&mut self, ctx: &mut ModuleContext<'_>) {
        let _ = ctx;
    }

    /// Downcast to `&dyn Any` for type-safe access to concrete module types.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to `&mut dyn Any` for type-safe mutable access to concrete module types.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

// ---------------------------------------------------------------------------
// ModuleContext
// ---------------------------------------------------------------------------

/// Context passed to every module callback.
pub struct ModuleContext<'a> {
    /// The vessel's structure, or `None` when the host has no structural
    /// data for it (not yet loaded, or mid-unload).
    pub vessel: Option<&'a mut Vessel>,
    /// Clock values for the current tick.
    pub clock: ClockSnapshot,
    /// Whether this vessel is the one the host is actively simulating.
    pub is_active_vessel: bool,
    /// Whether the host is in a scene where vessels are simulated at all.
    pub in_flight: bool,
}
