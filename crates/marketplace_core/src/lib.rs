//! In-memory marketplace core: the service catalog with its search, filter
//! and sort pipeline, and the session ledger that drives booking.

pub mod catalog;
pub mod ledger;
pub mod seed;

pub use catalog::Catalog;
pub use ledger::{BookingState, LedgerPolicy, SessionLedger};
