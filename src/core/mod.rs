//! Services and the recomputation pass that ties them to a record store.

pub mod recompute;
pub mod services;
pub mod store;

pub use recompute::{RecomputePass, RecomputeSummary};
pub use store::{LedgerSnapshot, RecordStore};
