//! Adapters layer: infrastructure implementations of the ports.

pub mod ai;
pub mod console;
pub mod factcheck;
