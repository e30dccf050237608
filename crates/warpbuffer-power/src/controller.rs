//! The per-vessel buffering module.
//!
//! [`DynamicBufferController`] ties the pieces together. Each physics tick:
//!
//! 1. Track focus; on focus gained, refresh the electrical data first.
//! 2. Select the mode from the warp rate.
//! 3. Low fidelity: hold the reservoir at nominal capacity.
//! 4. Analytic: aggregate totals, and if anything consumes the resource,
//!    let the allocator decide between clearing and resizing.
//!
//! Structural events rebuild the snapshot from scratch. Saving and
//! destroying clear the buffer first so no inflated capacity is persisted.

use log::{debug, info};
use warpbuffer_core::event::VesselEventKind;
use warpbuffer_core::fixed::{Fixed64, fixed64_to_f64};
use warpbuffer_core::id::ContainerRef;
use warpbuffer_core::module::{ModuleContext, VesselModule};
use warpbuffer_core::vessel::Vessel;

use crate::aggregate::{self, PowerTotals};
use crate::allocator::{self, Allocation, AllocationInput};
use crate::config::BufferConfig;
use crate::mode::{FocusTransition, ModeSelector, SimulationMode};
use crate::registry::{self, ElectricalSnapshot, PowerConsumer, PowerProducer, RegistryError};
use crate::storage::{BufferState, BufferStorage};

pub const MODULE_NAME: &str = "dynamic_buffer";

#[derive(Debug)]
pub struct DynamicBufferController {
    config: BufferConfig,
    selector: ModeSelector,
    snapshot: ElectricalSnapshot,
    storage: BufferStorage,
    totals: PowerTotals,
    /// Last desired capacity computed in analytic mode.
    buffer_size: Fixed64,
    data_ready: bool,
}

impl DynamicBufferController {
    /// Low fidelity, unfocused, data not ready.
    pub fn initialize(config: BufferConfig) -> Self {
        let storage = BufferStorage::new(&config.resource);
        Self {
            config,
            selector: ModeSelector::new(),
            snapshot: ElectricalSnapshot::default(),
            storage,
            totals: PowerTotals::default(),
            buffer_size: Fixed64::ZERO,
            data_ready: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn total_production(&self) -> Fixed64 {
        self.totals.production
    }

    pub fn total_consumption(&self) -> Fixed64 {
        self.totals.consumption
    }

    pub fn totals(&self) -> PowerTotals {
        self.totals
    }

    pub fn is_analytic_mode(&self) -> bool {
        self.selector.is_analytic()
    }

    pub fn mode(&self) -> SimulationMode {
        self.selector.mode()
    }

    pub fn is_focused(&self) -> bool {
        self.selector.is_focused()
    }

    pub fn data_ready(&self) -> bool {
        self.data_ready
    }

    pub fn discovered_reservoir(&self) -> Option<ContainerRef> {
        self.storage.reservoir()
    }

    pub fn buffer_state(&self) -> Option<&BufferState> {
        self.storage.state()
    }

    pub fn buffer_nominal_capacity(&self) -> Fixed64 {
        self.storage.nominal_capacity()
    }

    pub fn buffer_current_capacity(&self) -> Fixed64 {
        self.storage.current_capacity()
    }

    pub fn buffer_scale(&self) -> Fixed64 {
        self.config.buffer_scale
    }

    pub fn buffer_size(&self) -> Fixed64 {
        self.buffer_size
    }

    /// Vessel-wide capacity of the resource at the last refresh.
    pub fn saved_vessel_max(&self) -> Fixed64 {
        self.snapshot.total_existing_max
    }

    pub fn producers(&self) -> &[PowerProducer] {
        &self.snapshot.producers
    }

    pub fn consumers(&self) -> &[PowerConsumer] {
        &self.snapshot.consumers
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Clear the buffer, rebuild the snapshot, rediscover the reservoir and
    /// recompute totals.
    ///
    /// Without structural data the snapshot is left empty, the reservoir is
    /// left as it was, and the error is returned for the caller to report.
    pub fn refresh(&mut self, mut vessel: Option<&mut Vessel>) -> Result<(), RegistryError> {
        if let Some(v) = vessel.as_deref_mut() {
            self.storage.clear(v);
        }

        let built = match registry::rebuild(vessel.as_deref(), &self.config.resource) {
            Ok(built) => built,
            Err(e) => {
                self.snapshot = ElectricalSnapshot::default();
                self.totals = PowerTotals::default();
                return Err(e);
            }
        };

        if let Some(v) = vessel.as_deref() {
            self.storage
                .discover(built.reservoir, v, self.config.buffer_scale);
            self.totals = aggregate::aggregate(&built.snapshot, v, &self.config.resource);
            info!(
                "summary: vessel '{}' - {} power producers, {} power consumers, {} max {}",
                v.name,
                built.snapshot.producers.len(),
                built.snapshot.consumers.len(),
                fixed64_to_f64(built.snapshot.total_existing_max),
                self.config.resource
            );
        }
        self.snapshot = built.snapshot;
        self.data_ready = true;
        Ok(())
    }

    /// Return the reservoir to nominal and drop the snapshot.
    pub fn teardown(&mut self, vessel: Option<&mut Vessel>) {
        if let Some(v) = vessel {
            self.storage.clear(v);
        }
        self.snapshot = ElectricalSnapshot::default();
        self.totals = PowerTotals::default();
        self.data_ready = false;
    }

    // -----------------------------------------------------------------------
    // Per-tick simulation
    // -----------------------------------------------------------------------

    fn hold_nominal(&mut self, vessel: &mut Vessel) {
        if self.storage.current_capacity() != self.storage.nominal_capacity() {
            self.storage.clear(vessel);
        }
    }

    fn simulate_analytic(&mut self, vessel: &mut Vessel, delta_time: Fixed64) {
        self.totals = aggregate::aggregate(&self.snapshot, vessel, &self.config.resource);
        if self.snapshot.consumers.is_empty() {
            return;
        }

        let input = AllocationInput {
            production: self.totals.production,
            consumption: self.totals.consumption,
            delta_time,
            buffer_scale: self.config.buffer_scale,
            total_existing_max: self.snapshot.total_existing_max,
        };
        match allocator::allocate(&input) {
            Allocation::Clear => {
                self.storage.clear(vessel);
            }
            Allocation::Resize { desired, extra } => {
                self.buffer_size = desired;
                let capacity = self.storage.nominal_capacity().saturating_add(extra);
                self.storage.apply_capacity(vessel, capacity);
            }
        }
    }

    /// One physics tick. Does nothing outside flight or before the first
    /// successful refresh.
    pub fn tick(&mut self, ctx: &mut ModuleContext<'_>) {
        if !ctx.in_flight || !self.data_ready {
            return;
        }

        if self.selector.update_focus(ctx.is_active_vessel) == FocusTransition::Gained {
            debug!("vessel changed state from unfocused to focused");
            let _ = self.refresh(ctx.vessel.as_deref_mut());
        }

        let (mode, changed) = self
            .selector
            .update_mode(ctx.clock.rate, self.config.warp_threshold);
        if changed {
            debug!("simulation mode -> {mode:?}");
        }

        let Some(vessel) = ctx.vessel.as_deref_mut() else {
            return;
        };
        match mode {
            SimulationMode::LowFidelity => self.hold_nominal(vessel),
            SimulationMode::Analytic => {
                self.simulate_analytic(vessel, ctx.clock.fixed_delta_time)
            }
        }
    }
}

impl VesselModule for DynamicBufferController {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn subscriptions(&self) -> &[VesselEventKind] {
        &VesselEventKind::ALL
    }

    fn on_start(&mut self, ctx: &mut ModuleContext<'_>) {
        let _ = self.refresh(ctx.vessel.as_deref_mut());
    }

    fn on_fixed_update(&mut self, ctx: &mut ModuleContext<'_>) {
        self.tick(ctx);
    }

    fn on_vessel_event(&mut self, ctx: &mut ModuleContext<'_>, kind: VesselEventKind) {
        debug!("refreshing electrical data from {kind:?} event");
        let _ = self.refresh(ctx.vessel.as_deref_mut());
    }

    fn on_save(&mut self, ctx: &mut ModuleContext<'_>) {
        if let Some(vessel) = ctx.vessel.as_deref_mut() {
            self.storage.clear(vessel);
        }
    }

    fn on_destroy(&mut self, ctx: &mut ModuleContext<'_>) {
        self.teardown(ctx.vessel.as_deref_mut());
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
