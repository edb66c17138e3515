//! Linear (fully connected) layer implementation
//!
//! Performs `output = [input | 1] @ W`. The bias is folded into `W` as an
//! extra last row that multiplies a constant-1 column appended to the input.

use crate::error::Result;
use crate::layers::context::Context;
use crate::layers::r#trait::{require_upstream, Layer, Trainable};
use crate::tensor::{as_matrix, ensure_shape, Matrix, Tensor};
use ndarray::{s, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

const NAME: &str = "Linear";

/// Affine layer with an optional bias row.
///
/// # Fields
///
/// * `parameters` - `[input_dim + 1, output_dim]` with bias, `[input_dim, output_dim]` without
/// * `grad` - gradient of the last backward pass, same shape as `parameters`
/// * `ctx` - augmented inputs staged by `forward`
///
/// # Example
///
/// ```
/// use nn_autodiff::layers::{Layer, Linear};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let layer = Linear::new(784, 128, true, &mut rng);
/// assert_eq!(layer.parameters().unwrap().dim(), (785, 128));
/// assert_eq!(layer.parameter_count(), 785 * 128);
/// ```
pub struct Linear {
    input_dim: usize,
    output_dim: usize,
    bias: bool,
    parameters: Matrix,
    grad: Option<Matrix>,
    ctx: Context<Matrix>,
    training: bool,
}

impl Linear {
    /// Create a layer with weights drawn from `U(-k, k)`, `k = sqrt(1 / fan_in)`.
    ///
    /// `fan_in` counts the bias row when `bias` is set.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        bias: bool,
        rng: &mut R,
    ) -> Self {
        assert!(
            input_dim > 0 && output_dim > 0,
            "Linear dimensions must be greater than 0"
        );
        let rows = if bias { input_dim + 1 } else { input_dim };
        let k = (1.0 / rows as f32).sqrt();
        let parameters = Array2::random_using((rows, output_dim), Uniform::new(-k, k), rng);
        Self::with_parameters(parameters, bias)
    }

    /// Create a layer from an explicit parameter matrix.
    ///
    /// With `bias` set, the last row of `parameters` is the bias.
    ///
    /// # Panics
    ///
    /// Panics if `parameters` has no input rows left after the bias row.
    pub fn with_parameters(parameters: Matrix, bias: bool) -> Self {
        let (rows, output_dim) = parameters.dim();
        let input_dim = if bias { rows.saturating_sub(1) } else { rows };
        assert!(
            input_dim > 0 && output_dim > 0,
            "Linear dimensions must be greater than 0"
        );
        Self {
            input_dim,
            output_dim,
            bias,
            parameters,
            grad: None,
            ctx: Context::new(),
            training: true,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn has_bias(&self) -> bool {
        self.bias
    }
}

impl Layer for Linear {
    fn name(&self) -> &'static str {
        NAME
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let x = as_matrix("linear forward", input)?;
        let batch = x.nrows();
        ensure_shape("linear forward", &[batch, self.input_dim], x.shape())?;

        let augmented = if self.bias {
            let mut augmented = Array2::<f32>::ones((batch, self.input_dim + 1));
            augmented.slice_mut(s![.., ..self.input_dim]).assign(&x);
            augmented
        } else {
            x.to_owned()
        };

        let output = augmented.dot(&self.parameters);
        self.ctx.save_for_backward(augmented);
        Ok(output.into_dyn())
    }

    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor> {
        let augmented = self.ctx.pop(NAME)?;
        let grad_output = as_matrix("linear backward", require_upstream(NAME, grad_output)?)?;
        ensure_shape(
            "linear backward",
            &[augmented.nrows(), self.output_dim],
            grad_output.shape(),
        )?;

        let grad = augmented.t().dot(&grad_output);
        ensure_shape(
            "linear parameter gradient",
            self.parameters.shape(),
            grad.shape(),
        )?;
        self.grad = Some(grad);

        let weights = self.parameters.slice(s![..self.input_dim, ..]);
        Ok(grad_output.dot(&weights.t()).into_dyn())
    }

    fn reset(&mut self) {
        self.ctx.clear();
        self.grad = None;
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn parameters(&self) -> Option<&Matrix> {
        Some(&self.parameters)
    }

    fn gradient(&self) -> Option<&Matrix> {
        self.grad.as_ref()
    }

    fn trainable(&mut self) -> Option<Trainable<'_>> {
        Some(Trainable {
            layer: NAME,
            parameters: &mut self.parameters,
            gradient: self.grad.as_ref(),
        })
    }
}
