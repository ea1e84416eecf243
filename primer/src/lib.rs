//! Small value-level building blocks that sit next to `cohort`.
//!
//! - [`ledger`]: a toy wallet with checked withdrawals and a thread-safe
//!   handle for concurrent deposits.
//! - [`comparison`]: the same error compared by value and by identity.
//! - [`shapes`], [`staff`], [`store`], [`presence`]: explicit traits,
//!   delegation instead of field promotion, generic stores, and a closed enum.

pub mod comparison;
pub mod ledger;
pub mod presence;
pub mod shapes;
pub mod staff;
pub mod store;

pub use comparison::{Identity, UserError};
pub use ledger::{Bitcoin, LedgerError, SharedWallet, Wallet};
pub use presence::{ParsePresenceError, Presence};
