//! lexplan-core — Scheduling and content-differentiation engine.
//!
//! This crate defines the data model, the forgetting-curve memory model,
//! the non-repeating content pool, and the daily selector that the rest of
//! the lexplan system builds on. Everything here is pure and synchronous:
//! the target date is always an input, randomness is always seeded, and
//! persistence belongs to `lexplan-store`.

pub mod error;
pub mod memory;
pub mod model;
pub mod parser;
pub mod pool;
pub mod scheduler;
pub mod selector;
pub mod stats;
