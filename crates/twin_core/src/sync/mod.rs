//! Save-cycle reconciliation between the local draft and the remote store.
//!
//! # Responsibility
//! - Derive create/update/delete operations from two snapshots.
//! - Replay a plan locally to predict the remote result.
//!
//! # Invariants
//! - `diff_snapshots(apply_plan(c, diff_snapshots(c, x)), x)` is empty.

pub mod diff;
pub mod replay;

pub use diff::diff_snapshots;
pub use replay::apply_plan;
