//! Use-case services on top of the draft model and the API boundary.
//!
//! # Responsibility
//! - Orchestrate fetch, edit and save of one digital twin.
//! - Keep callers decoupled from transport and diff details.

pub mod editor;
