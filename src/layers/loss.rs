//! Mean squared error loss layer.

use crate::error::{NnError, Result};
use crate::layers::context::Context;
use crate::layers::r#trait::{Layer, LossOutput};
use crate::tensor::{ensure_shape, scalar_value, Tensor};

/// `mean((prediction - target)^2)`.
///
/// Backward returns `2 * (prediction - target)` without dividing by the
/// element count; the learning rate absorbs that factor. When an upstream
/// scalar is supplied it scales the result.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use nn_autodiff::layers::{Layer, MSELoss};
///
/// let mut mse = MSELoss::new();
/// let out = mse
///     .forward_with_target(&array![[1.0f32, 3.0]].into_dyn(), &array![[0.0f32, 0.0]].into_dyn())
///     .unwrap();
/// assert_eq!(out.loss, 5.0);
///
/// let grad = mse.backward(None).unwrap();
/// assert_eq!(grad, array![[2.0f32, 6.0]].into_dyn());
/// ```
#[derive(Debug)]
pub struct MSELoss {
    ctx: Context<Tensor>,
    training: bool,
}

impl MSELoss {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            training: true,
        }
    }
}

impl Default for MSELoss {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for MSELoss {
    fn name(&self) -> &'static str {
        "MSELoss"
    }

    fn forward(&mut self, _input: &Tensor) -> Result<Tensor> {
        Err(NnError::MissingTarget { layer: "MSELoss" })
    }

    fn forward_with_target(&mut self, input: &Tensor, target: &Tensor) -> Result<LossOutput> {
        ensure_shape("mse forward", input.shape(), target.shape())?;
        let diff = input - target;
        let loss = diff.mapv(|d| d * d).mean().unwrap_or(f32::NAN);
        self.ctx.save_for_backward(diff);
        Ok(LossOutput {
            loss,
            prediction: input.clone(),
        })
    }

    fn is_loss(&self) -> bool {
        true
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let diff = self.ctx.pop("MSELoss")?;
        let upstream = match grad_output {
            Some(grad) => scalar_value("mse backward", grad)?,
            None => 1.0,
        };
        Ok(diff * (2.0 * upstream))
    }

    fn reset(&mut self) {
        self.ctx.clear();
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}
