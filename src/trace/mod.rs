//! Structured execution trace
//!
//! Every dispatched step produces exactly one terminal [`Observation`],
//! handed to a sink. Sinks are best-effort: losing a trace line never
//! interrupts the bench.

pub mod observation;
pub mod sink;

pub use observation::{Observation, Status};
pub use sink::{JsonlSink, ObservationSink};
