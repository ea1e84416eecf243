//! Coordination primitives: the permit gate behind bounded channels, the
//! completion counter behind batch launches, and cooperative cancellation.

pub mod capacity_gate;
mod cancel;
mod wait_group;

pub use cancel::CancelToken;
pub use capacity_gate::{AcquireFuture, CapacityGate};
pub use wait_group::{DoneGuard, WaitFuture, WaitGroup};
