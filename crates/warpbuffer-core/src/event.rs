//! Structural change notifications and the subscription hub.
//!
//! The host fires a [`VesselEvent`] whenever a vessel is destroyed, put on
//! rails, or modified. Modules subscribe explicitly to the kinds they care
//! about; the [`EventHub`] is a plain observer list owned by the flight, not
//! a process-wide bus. Dispatch is synchronous: the flight asks the hub who
//! is listening and calls each module before `notify` returns.

use crate::fixed::Ticks;
use crate::id::{ListenerId, VesselId};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Discriminant for vessel events, used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VesselEventKind {
    /// The vessel is about to be removed from the flight.
    Destroyed,
    /// The vessel left active physics ("packed" / on rails).
    WentOnRails,
    /// Parts were added, removed, or rearranged.
    Modified,
}

impl VesselEventKind {
    pub const ALL: [VesselEventKind; 3] = [
        VesselEventKind::Destroyed,
        VesselEventKind::WentOnRails,
        VesselEventKind::Modified,
    ];
}

/// A structural change on one vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VesselEvent {
    pub kind: VesselEventKind,
    pub vessel: VesselId,
    pub tick: Ticks,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Subscription {
    id: ListenerId,
    vessel: VesselId,
    /// Position of the subscribing module within the vessel's module list.
    module: usize,
    kinds: Vec<VesselEventKind>,
}

/// A listener the hub resolved for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub listener: ListenerId,
    pub module: usize,
}

/// Manual observer list for vessel events.
#[derive(Debug, Default)]
pub struct EventHub {
    subscriptions: Vec<Subscription>,
    next_id: u32,
    dispatched: u64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` of `vessel` for the given kinds. An empty kind list
    /// registers nothing and returns `None`.
    pub fn subscribe(
        &mut self,
        vessel: VesselId,
        module: usize,
        kinds: &[VesselEventKind],
    ) -> Option<ListenerId> {
        if kinds.is_empty() {
            return None;
        }
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            vessel,
            module,
            kinds: kinds.to_vec(),
        });
        Some(id)
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Remove every subscription belonging to `vessel`.
    pub fn unsubscribe_vessel(&mut self, vessel: VesselId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.vessel != vessel);
        before - self.subscriptions.len()
    }

    /// Listeners for `event`, in subscription order. Counts as a dispatch.
    pub fn listeners_for(&mut self, event: &VesselEvent) -> Vec<Delivery> {
        self.dispatched += 1;
        self.subscriptions
            .iter()
            .filter(|s| s.vessel == event.vessel && s.kinds.contains(&event.kind))
            .map(|s| Delivery {
                listener: s.id,
                module: s.module,
            })
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Total number of events routed through the hub.
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched
    }
}
