//! Domain module for Trigger Dispatch
//!
//! Contains the execution entities, the user rate limiter and errors.

pub mod entities;
pub mod errors;
pub mod rate_limiter;

pub use entities::*;
pub use errors::*;
pub use rate_limiter::UserRateLimiter;
