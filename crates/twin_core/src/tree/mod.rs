//! In-memory editing model for layer groups and tools.
//!
//! # Responsibility
//! - Hold the editable tree between fetch and save.
//! - Provide generic traversal helpers for id-addressed trees.
//!
//! # Invariants
//! - Sibling `sort_order` is contiguous from 0 after every mutation.
//! - The group tree is acyclic.
//! - Mutations never perform I/O.

pub mod draft;
pub mod error;
pub mod layer_tree;
pub mod tool_list;
pub mod traversal;
