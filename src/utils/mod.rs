//! Shared utilities for training runs
//!
//! Seeded random number generators and the per-epoch training logger.

pub mod logger;
pub mod rng;

pub use logger::TrainingLogger;
pub use rng::rng_from_seed;
