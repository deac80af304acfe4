//! # Shared Types Crate
//!
//! Types shared between the event bus, the trigger dispatcher and the
//! publishers feeding it.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Command` and `ExecData` are defined once here.
//! - **Read-Only Events**: a published `Command` is never mutated downstream.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
