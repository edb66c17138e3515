//! Dropout layer implementation for regularization
//!
//! During training each element is zeroed independently with probability
//! `prob` and survivors are scaled by `1 / (1 - prob)` so the expected value is
//! unchanged. During evaluation the layer is the identity in both directions.

use crate::error::{NnError, Result};
use crate::layers::context::Context;
use crate::layers::r#trait::{require_upstream, Layer};
use crate::tensor::{ensure_shape, Tensor};
use ndarray::Array;
use ndarray_rand::rand_distr::Bernoulli;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What one forward pass stages for its matching backward.
#[derive(Debug, Clone)]
enum DropoutStage {
    /// Evaluation mode: only the input shape is kept.
    Identity(Vec<usize>),
    Masked { mask: Tensor, scale: f32 },
}

/// Dropout layer.
///
/// Each forward call stages exactly one entry: the mask and scale in training
/// mode, or the input shape in evaluation mode, so backward always mirrors the
/// mode of its matching forward.
///
/// `prob == 1` is accepted and produces non-finite values, since the survivor
/// scale is infinite.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use nn_autodiff::layers::{Dropout, Layer};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut dropout = Dropout::new(0.5, &mut rng).unwrap();
/// dropout.set_training(false);
///
/// let input = array![[1.0f32, 2.0, 3.0]].into_dyn();
/// assert_eq!(dropout.forward(&input).unwrap(), input);
/// ```
#[derive(Debug)]
pub struct Dropout {
    prob: f32,
    keep: Bernoulli,
    rng: StdRng,
    ctx: Context<DropoutStage>,
    training: bool,
}

impl Dropout {
    /// Create a dropout layer with its own generator forked from `rng`.
    ///
    /// # Errors
    ///
    /// [`NnError::InvalidProbability`] when `prob` is outside `[0, 1]`.
    pub fn new<R: Rng + ?Sized>(prob: f32, rng: &mut R) -> Result<Self> {
        if !(0.0..=1.0).contains(&prob) {
            return Err(NnError::InvalidProbability { prob });
        }
        let keep = Bernoulli::new(1.0 - f64::from(prob))
            .map_err(|_| NnError::InvalidProbability { prob })?;

        Ok(Self {
            prob,
            keep,
            rng: StdRng::seed_from_u64(rng.gen()),
            ctx: Context::new(),
            training: true,
        })
    }

    /// Probability of dropping each element.
    pub fn prob(&self) -> f32 {
        self.prob
    }
}

impl Layer for Dropout {
    fn name(&self) -> &'static str {
        "Dropout"
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        if !self.training {
            self.ctx
                .save_for_backward(DropoutStage::Identity(input.shape().to_vec()));
            return Ok(input.clone());
        }

        let mask = Array::random_using(input.raw_dim(), self.keep, &mut self.rng)
            .mapv(|kept| if kept { 1.0f32 } else { 0.0 });
        let scale = 1.0 / (1.0 - self.prob);
        let output = input * &mask * scale;
        self.ctx.save_for_backward(DropoutStage::Masked { mask, scale });
        Ok(output)
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let staged = self.ctx.pop("Dropout")?;
        let grad_output = require_upstream("Dropout", grad_output)?;
        match staged {
            DropoutStage::Masked { mask, scale } => {
                ensure_shape("dropout backward", mask.shape(), grad_output.shape())?;
                Ok(grad_output * &mask * scale)
            }
            DropoutStage::Identity(shape) => {
                ensure_shape("dropout backward", &shape, grad_output.shape())?;
                Ok(grad_output.clone())
            }
        }
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
