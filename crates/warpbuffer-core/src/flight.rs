//! The flight: owns vessels, their modules, the warp clock, and the event
//! hub, and drives module callbacks.
//!
//! This is the minimal host adapter. A real host calls [`Flight::step`] once
//! per physics tick and [`Flight::notify`] from its own structural-change
//! hooks; tests drive it directly.

use log::debug;
use slotmap::SlotMap;

use crate::clock::{ClockSnapshot, TimeWarp};
use crate::event::{EventHub, VesselEvent, VesselEventKind};
use crate::fixed::Ticks;
use crate::id::{ListenerId, VesselId};
use crate::module::{ModuleContext, VesselModule};
use crate::serialize::SerializeError;
use crate::vessel::Vessel;

/// Errors returned by flight operations.
#[derive(Debug, thiserror::Error)]
pub enum FlightError {
    #[error("unknown vessel")]
    UnknownVessel,
    #[error("vessel '{0}' has no structural data loaded")]
    MissingStructure(String),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

#[derive(Debug)]
struct VesselEntry {
    /// Display name, kept even while the structure is unloaded.
    name: String,
    vessel: Option<Vessel>,
    modules: Vec<Box<dyn VesselModule>>,
    listeners: Vec<ListenerId>,
}

impl VesselEntry {
    /// Run `f` on every module with a fresh context.
    fn for_each_module<F>(&mut self, clock: ClockSnapshot, active: bool, in_flight: bool, mut f: F)
    where
        F: FnMut(&mut dyn VesselModule, &mut ModuleContext<'_>),
    {
        let VesselEntry {
            vessel, modules, ..
        } = self;
        for module in modules.iter_mut() {
            let mut ctx = ModuleContext {
                vessel: vessel.as_mut(),
                clock,
                is_active_vessel: active,
                in_flight,
            };
            f(module.as_mut(), &mut ctx);
        }
    }
}

/// Host-side driver for a set of vessels.
#[derive(Debug)]
pub struct Flight {
    vessels: SlotMap<VesselId, VesselEntry>,
    warp: TimeWarp,
    hub: EventHub,
    active: Option<VesselId>,
    tick: Ticks,
    in_flight: bool,
}

impl Default for Flight {
    fn default() -> Self {
        Self::new()
    }
}

impl Flight {
    /// Empty flight at 1x warp.
    pub fn new() -> Self {
        Self::with_warp(TimeWarp::new())
    }

    pub fn with_warp(warp: TimeWarp) -> Self {
        Self {
            vessels: SlotMap::with_key(),
            warp,
            hub: EventHub::new(),
            active: None,
            tick: 0,
            in_flight: true,
        }
    }

    // -----------------------------------------------------------------------
    // Vessels
    // -----------------------------------------------------------------------

    pub fn add_vessel(&mut self, vessel: Vessel) -> VesselId {
        self.vessels.insert(VesselEntry {
            name: vessel.name.clone(),
            vessel: Some(vessel),
            modules: Vec::new(),
            listeners: Vec::new(),
        })
    }

    pub fn vessel(&self, id: VesselId) -> Option<&Vessel> {
        self.vessels.get(id)?.vessel.as_ref()
    }

    pub fn vessel_mut(&mut self, id: VesselId) -> Option<&mut Vessel> {
        self.vessels.get_mut(id)?.vessel.as_mut()
    }

    pub fn vessel_count(&self) -> usize {
        self.vessels.len()
    }

    /// Take the vessel's structure away; modules see `None` until it is
    /// restored.
    pub fn unload_structure(&mut self, id: VesselId) -> Option<Vessel> {
        self.vessels.get_mut(id)?.vessel.take()
    }

    /// Put a structure back (for example after reloading it from a save).
    pub fn restore_structure(&mut self, id: VesselId, vessel: Vessel) -> Result<(), FlightError> {
        let entry = self.vessels.get_mut(id).ok_or(FlightError::UnknownVessel)?;
        entry.name = vessel.name.clone();
        entry.vessel = Some(vessel);
        Ok(())
    }

    pub fn active_vessel(&self) -> Option<VesselId> {
        self.active
    }

    /// Change which vessel the host is actively simulating.
    pub fn set_active_vessel(&mut self, id: Option<VesselId>) {
        self.active = id;
    }

    pub fn set_in_flight(&mut self, in_flight: bool) {
        self.in_flight = in_flight;
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    pub fn warp(&self) -> &TimeWarp {
        &self.warp
    }

    pub fn warp_mut(&mut self) -> &mut TimeWarp {
        &mut self.warp
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn event_hub(&self) -> &EventHub {
        &self.hub
    }

    // -----------------------------------------------------------------------
    // Modules
    // -----------------------------------------------------------------------

    /// Attach a module to a vessel: registers its subscriptions and calls
    /// `on_start`. Returns the module's index on the vessel.
    pub fn attach_module(
        &mut self,
        id: VesselId,
        mut module: Box<dyn VesselModule>,
    ) -> Result<usize, FlightError> {
        let clock = self.warp.snapshot(self.tick);
        let active = self.active == Some(id);
        let in_flight = self.in_flight;
        let entry = self.vessels.get_mut(id).ok_or(FlightError::UnknownVessel)?;

        let index = entry.modules.len();
        if let Some(listener) = self.hub.subscribe(id, index, module.subscriptions()) {
            entry.listeners.push(listener);
        }

        let mut ctx = ModuleContext {
            vessel: entry.vessel.as_mut(),
            clock,
            is_active_vessel: active,
            in_flight,
        };
        module.on_start(&mut ctx);
        entry.modules.push(module);
        Ok(index)
    }

    /// Typed access to a module attached to `id`.
    pub fn module<T: 'static>(&self, id: VesselId) -> Option<&T> {
        self.vessels
            .get(id)?
            .modules
            .iter()
            .find_map(|m| m.as_any().downcast_ref::<T>())
    }

    /// Typed mutable access to a module attached to `id`.
    pub fn module_mut<T: 'static>(&mut self, id: VesselId) -> Option<&mut T> {
        self.vessels
            .get_mut(id)?
            .modules
            .iter_mut()
            .find_map(|m| m.as_any_mut().downcast_mut::<T>())
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Run one physics tick: every module of every vessel gets
    /// `on_fixed_update`, then the tick counter advances.
    pub fn step(&mut self) {
        let clock = self.warp.snapshot(self.tick);
        let in_flight = self.in_flight;
        let active = self.active;
        for (id, entry) in self.vessels.iter_mut() {
            entry.for_each_module(clock, active == Some(id), in_flight, |module, ctx| {
                module.on_fixed_update(ctx)
            });
        }
        self.tick += 1;
    }

    /// Fire a structural event on `id` and deliver it synchronously.
    /// Returns the number of modules that received it.
    pub fn notify(&mut self, id: VesselId, kind: VesselEventKind) -> usize {
        let event = VesselEvent {
            kind,
            vessel: id,
            tick: self.tick,
        };
        let deliveries = self.hub.listeners_for(&event);
        let clock = self.warp.snapshot(self.tick);
        let active = self.active == Some(id);
        let in_flight = self.in_flight;
        let Some(entry) = self.vessels.get_mut(id) else {
            return 0;
        };
        debug!(
            "vessel '{}': {:?} -> {} listener(s)",
            entry.name,
            kind,
            deliveries.len()
        );

        let mut delivered = 0;
        for d in deliveries {
            let Some(module) = entry.modules.get_mut(d.module) else {
                continue;
            };
            let mut ctx = ModuleContext {
                vessel: entry.vessel.as_mut(),
                clock,
                is_active_vessel: active,
                in_flight,
            };
            module.on_vessel_event(&mut ctx, kind);
            delivered += 1;
        }
        delivered
    }

    /// Give modules a chance to settle state, then serialize the vessel.
    pub fn save_vessel(&mut self, id: VesselId) -> Result<Vec<u8>, FlightError> {
        let clock = self.warp.snapshot(self.tick);
        let active = self.active == Some(id);
        let in_flight = self.in_flight;
        let entry = self.vessels.get_mut(id).ok_or(FlightError::UnknownVessel)?;
        entry.for_each_module(clock, active, in_flight, |module, ctx| module.on_save(ctx));
        let vessel = entry
            .vessel
            .as_ref()
            .ok_or_else(|| FlightError::MissingStructure(entry.name.clone()))?;
        Ok(vessel.save()?)
    }

    /// Fire `Destroyed`, tear down the vessel's modules, and remove it.
    pub fn destroy_vessel(&mut self, id: VesselId) -> Option<Vessel> {
        if !self.vessels.contains_key(id) {
            return None;
        }
        self.notify(id, VesselEventKind::Destroyed);

        let clock = self.warp.snapshot(self.tick);
        let active = self.active == Some(id);
        let in_flight = self.in_flight;
        let mut entry = self.vessels.remove(id)?;
        entry.for_each_module(clock, active, in_flight, |module, ctx| module.on_destroy(ctx));
        for listener in &entry.listeners {
            self.hub.unsubscribe(*listener);
        }
        if self.active == Some(id) {
            self.active = None;
        }
        entry.vessel
    }
}
