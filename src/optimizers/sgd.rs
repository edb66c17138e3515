//! Stochastic Gradient Descent (SGD) optimizer implementation
//!
//! Vanilla SGD: `parameter = parameter - learning_rate * gradient`.
//! No momentum, no weight decay.

use crate::error::Result;
use crate::optimizers::Optimizer;
use crate::tensor::{ensure_shape, Matrix};
use ndarray::Zip;

/// Stochastic Gradient Descent optimizer.
///
/// `w = w - η * ∇L/∂w`
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use nn_autodiff::optimizers::{Optimizer, SGD};
///
/// let mut optimizer = SGD::new(0.1);
/// let mut params = array![[1.0f32, 2.0, 3.0]];
/// let grads = array![[0.1f32, 0.2, 0.3]];
///
/// optimizer.update(&mut params, &grads).unwrap();
/// assert!((params[[0, 0]] - 0.99).abs() < 1e-6);
/// assert!((params[[0, 2]] - 2.97).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// Creates a new SGD optimizer.
    ///
    /// Common learning rates range from 0.001 to 0.1. The MSE loss gradient
    /// is not divided by the element count, so small rates are usually needed
    /// for wide outputs.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    fn update(&mut self, parameters: &mut Matrix, gradients: &Matrix) -> Result<()> {
        ensure_shape("sgd update", parameters.shape(), gradients.shape())?;
        let lr = self.learning_rate;
        Zip::from(parameters)
            .and(gradients)
            .for_each(|param, &grad| *param -= lr * grad);
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}
