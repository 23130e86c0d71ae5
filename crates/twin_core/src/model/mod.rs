//! Wire-level domain model mirroring the remote digital-twin API.
//!
//! # Responsibility
//! - Define JSON shapes exchanged with the remote store.
//! - Define bulk operation records and flat snapshots used by the diff builder.
//!
//! # Invariants
//! - Field names on the wire match the remote API exactly (`featureName`,
//!   `isBackground`, `type`).
//! - Snapshots are order-insensitive; identity is the association key.

pub mod bulk;
pub mod digital_twin;
pub mod snapshot;
pub mod tool;
