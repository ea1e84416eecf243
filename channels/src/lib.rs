//! Fan-out/fan-in coordination for Rust.
//!
//! `cohort` launches a batch of independent units, lets each one signal its
//! completion exactly once, and blocks the coordinator until the whole batch
//! has finished, even when some units panic. Around that core it provides the
//! primitives such batches are usually built with: a [`WaitGroup`], a
//! capacity-bounded sync/async channel, and a reader/writer-guarded map.

pub mod bounded;
pub mod coord;
pub mod error;
pub mod guarded;
pub mod launch;

pub use bounded::{bounded, bounded_async, select2, Selected};
pub use coord::{CancelToken, DoneGuard, WaitGroup};
pub use error::{CloseError, RecvError, RecvErrorTimeout, SendError, TryRecvError, TrySendError};
pub use guarded::GuardedMap;
pub use launch::{launch, Coordinator, LaunchConfig, LaunchError, LaunchReport, WorkerFault};
