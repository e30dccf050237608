//! Capability predicates: does a module draw or emit a resource, and at
//! what rate right now.
//!
//! Classification looks only at the shape of a module's declared I/O, never
//! at its kind name. Each shape has its own predicate and rate function.

use warpbuffer_core::fixed::Fixed64;
use warpbuffer_core::vessel::{PartModule, RecipeLine, ResourceIo};

// ---------------------------------------------------------------------------
// Per-shape predicates
// ---------------------------------------------------------------------------

fn lines_mention(lines: &[RecipeLine], resource: &str) -> bool {
    lines.iter().any(|l| l.resource == resource)
}

fn lines_rate(lines: &[RecipeLine], resource: &str, throttle: Fixed64) -> Fixed64 {
    let ratio = lines
        .iter()
        .filter(|l| l.resource == resource)
        .fold(Fixed64::ZERO, |acc, l| acc.saturating_add(l.ratio));
    ratio.saturating_mul(throttle).max(Fixed64::ZERO)
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// `true` if the module lists `resource` among its outputs.
pub fn produces(module: &PartModule, resource: &str) -> bool {
    match &module.io {
        ResourceIo::Declared { outputs, .. } => outputs.contains(resource),
        ResourceIo::Recipe { outputs, .. } => lines_mention(outputs, resource),
        ResourceIo::Inert => false,
    }
}

/// `true` if the module lists `resource` among its inputs.
pub fn consumes(module: &PartModule, resource: &str) -> bool {
    match &module.io {
        ResourceIo::Declared { inputs, .. } => inputs.contains(resource),
        ResourceIo::Recipe { inputs, .. } => lines_mention(inputs, resource),
        ResourceIo::Inert => false,
    }
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Instantaneous production of `resource`. Zero when disabled or when the
/// module does not produce it.
pub fn production_rate(module: &PartModule, resource: &str) -> Fixed64 {
    if !module.enabled {
        return Fixed64::ZERO;
    }
    match &module.io {
        ResourceIo::Declared { outputs, rate, .. } if outputs.contains(resource) => {
            (*rate).max(Fixed64::ZERO)
        }
        ResourceIo::Recipe { outputs, .. } => lines_rate(outputs, resource, module.throttle),
        _ => Fixed64::ZERO,
    }
}

/// Instantaneous consumption of `resource`. Zero when disabled or when the
/// module does not consume it.
pub fn consumption_rate(module: &PartModule, resource: &str) -> Fixed64 {
    if !module.enabled {
        return Fixed64::ZERO;
    }
    match &module.io {
        ResourceIo::Declared { inputs, rate, .. } if inputs.contains(resource) => {
            (*rate).max(Fixed64::ZERO)
        }
        ResourceIo::Recipe { inputs, .. } => lines_rate(inputs, resource, module.throttle),
        _ => Fixed64::ZERO,
    }
}
