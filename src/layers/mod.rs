//! Layer abstractions for the autodiff engine
//!
//! This module provides the [`Layer`] trait, the per-layer [`Context`] stack
//! and the fixed set of layer kinds: Linear, ReLU, Sigmoid, Softmax, Log, Sum,
//! Dropout and MSELoss.

mod r#trait;
pub mod activation;
pub mod context;
pub mod dropout;
pub mod linear;
pub mod loss;
pub mod reduce;

// Re-export the Layer trait for convenience
pub use activation::{Log, ReLU, Sigmoid, Softmax};
pub use context::Context;
pub use dropout::Dropout;
pub use linear::Linear;
pub use loss::MSELoss;
pub use r#trait::{Layer, LossOutput, Trainable};
pub use reduce::Sum;
