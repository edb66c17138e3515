//! Elementwise and row-wise activation layers: ReLU, Sigmoid, Softmax, Log.
//!
//! None of these layers own parameters and none of them change behavior
//! between training and evaluation mode.

use crate::error::{NnError, Result};
use crate::layers::context::Context;
use crate::layers::r#trait::{require_upstream, Layer};
use crate::tensor::{ensure_shape, Tensor};
use ndarray::{Axis, Zip};

/// Rectified linear unit: `max(x, 0)`.
///
/// Stages the input; the gradient passes where the input was strictly positive.
#[derive(Debug)]
pub struct ReLU {
    ctx: Context<Tensor>,
    training: bool,
}

impl ReLU {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            training: true,
        }
    }
}

impl Default for ReLU {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for ReLU {
    fn name(&self) -> &'static str {
        "ReLU"
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let output = input.mapv(|x| x.max(0.0));
        self.ctx.save_for_backward(input.clone());
        Ok(output)
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let input = self.ctx.pop("ReLU")?;
        let grad_output = require_upstream("ReLU", grad_output)?;
        ensure_shape("relu backward", input.shape(), grad_output.shape())?;

        let mut grad = grad_output.clone();
        grad.zip_mut_with(&input, |g, &x| {
            if x <= 0.0 {
                *g = 0.0;
            }
        });
        Ok(grad)
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

/// Logistic sigmoid `1 / (1 + e^-x)`. Stages its own output.
#[derive(Debug)]
pub struct Sigmoid {
    ctx: Context<Tensor>,
    training: bool,
}

impl Sigmoid {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            training: true,
        }
    }
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Sigmoid {
    fn name(&self) -> &'static str {
        "Sigmoid"
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let sigmoid = input.mapv(|x| 1.0 / (1.0 + (-x).exp()));
        self.ctx.save_for_backward(sigmoid.clone());
        Ok(sigmoid)
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let sigmoid = self.ctx.pop("Sigmoid")?;
        let grad_output = require_upstream("Sigmoid", grad_output)?;
        ensure_shape("sigmoid backward", sigmoid.shape(), grad_output.shape())?;

        let mut grad = grad_output.clone();
        grad.zip_mut_with(&sigmoid, |g, &s| *g *= s * (1.0 - s));
        Ok(grad)
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

/// Normalized exponential over the last axis.
///
/// The lane maximum is subtracted before exponentiating so large logits do
/// not overflow. Stages its output.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use nn_autodiff::layers::{Layer, Softmax};
///
/// let mut softmax = Softmax::new();
/// let out = softmax.forward(&array![[1000.0f32, 1000.0]].into_dyn()).unwrap();
/// assert_eq!(out, array![[0.5f32, 0.5]].into_dyn());
/// ```
#[derive(Debug)]
pub struct Softmax {
    ctx: Context<Tensor>,
    training: bool,
}

impl Softmax {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            training: true,
        }
    }
}

impl Default for Softmax {
    fn default() -> Self {
        Self::new()
    }
}

fn last_axis(context: &'static str, tensor: &Tensor) -> Result<Axis> {
    match tensor.ndim() {
        0 => Err(NnError::RankMismatch {
            context,
            expected: 1,
            got: 0,
        }),
        n => Ok(Axis(n - 1)),
    }
}

impl Layer for Softmax {
    fn name(&self) -> &'static str {
        "Softmax"
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let axis = last_axis("softmax forward", input)?;
        let mut softmax = input.clone();
        for mut lane in softmax.lanes_mut(axis) {
            let max = lane.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
            lane.mapv_inplace(|x| (x - max).exp());
            let sum = lane.sum();
            lane.mapv_inplace(|x| x / sum);
        }
        self.ctx.save_for_backward(softmax.clone());
        Ok(softmax)
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let softmax = self.ctx.pop("Softmax")?;
        let grad_output = require_upstream("Softmax", grad_output)?;
        ensure_shape("softmax backward", softmax.shape(), grad_output.shape())?;
        let axis = last_axis("softmax backward", &softmax)?;

        // (g - sum(g * s)) * s, lane by lane
        let mut grad = grad_output.clone();
        Zip::from(grad.lanes_mut(axis))
            .and(softmax.lanes(axis))
            .for_each(|mut g, s| {
                let dot = g.dot(&s);
                g.zip_mut_with(&s, |gi, &si| *gi = (*gi - dot) * si);
            });
        Ok(grad)
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

/// Natural logarithm. Non-positive inputs yield `-inf`/`NaN` unguarded.
#[derive(Debug)]
pub struct Log {
    ctx: Context<Tensor>,
    training: bool,
}

impl Log {
    pub fn new() -> Self {
        Self {
            ctx: Context::new(),
            training: true,
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Log {
    fn name(&self) -> &'static str {
        "Log"
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        self.ctx.save_for_backward(input.clone());
        Ok(input.mapv(f32::ln))
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let input = self.ctx.pop("Log")?;
        let grad_output = require_upstream("Log", grad_output)?;
        ensure_shape("log backward", input.shape(), grad_output.shape())?;
        Ok(grad_output / &input)
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
