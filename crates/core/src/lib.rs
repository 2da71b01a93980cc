#![forbid(unsafe_code)]

//! Pure domain core of the course progression and assessment engine:
//! curriculum model, flattened lesson sequences, lock evaluation, quiz
//! definitions and scoring, progress snapshots, and statistics aggregation.
//!
//! No I/O lives here; persistence and orchestration are the `storage` and
//! `services` crates.

pub mod access;
pub mod error;
pub mod model;
pub mod sequence;
pub mod stats;
pub mod time;

pub use error::Error;
pub use time::Clock;
