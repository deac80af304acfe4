//! Integration scenarios.

pub mod fixtures;

#[cfg(test)]
mod pipeline;
