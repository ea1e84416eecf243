mod mixed;

pub use mixed::{AcquireFuture, CapacityGate};
