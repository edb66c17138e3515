//! Layer trait definition for autodiff layers
//!
//! Every layer kind implements [`Layer`]. The trait couples `forward` and
//! `backward` through the layer's own context stack: `forward` stages what
//! `backward` needs, `backward` pops it and returns the gradient with respect
//! to the layer input.

use crate::error::{NnError, Result};
use crate::tensor::{Matrix, Tensor};

/// Result of a terminal (loss) layer's forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LossOutput {
    /// Scalar loss for the batch.
    pub loss: f32,
    /// The activation fed into the loss layer.
    pub prediction: Tensor,
}

/// Mutable access to a trainable layer's parameters next to its gradient.
///
/// Handed to optimizers so they can update parameters in place while reading
/// the gradient produced by the most recent backward pass.
pub struct Trainable<'a> {
    pub layer: &'static str,
    pub parameters: &'a mut Matrix,
    pub gradient: Option<&'a Matrix>,
}

/// Core trait for autodiff layers.
///
/// # Contract
///
/// - `forward` pushes exactly one entry onto the layer's context stack.
/// - `backward` pops the newest entry. Calling it with an empty stack fails
///   with [`NnError::EmptyContext`], never with a fabricated gradient.
/// - Parametric layers overwrite their parameter gradient on every backward
///   call; gradients are not accumulated.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use nn_autodiff::layers::{Layer, ReLU};
///
/// let mut relu = ReLU::new();
/// let out = relu.forward(&array![[-1.0f32, 2.0]].into_dyn()).unwrap();
/// assert_eq!(out, array![[0.0f32, 2.0]].into_dyn());
///
/// let grad = relu.backward(Some(&array![[5.0f32, 5.0]].into_dyn())).unwrap();
/// assert_eq!(grad, array![[0.0f32, 5.0]].into_dyn());
/// ```
pub trait Layer {
    /// Layer kind, used in error messages.
    fn name(&self) -> &'static str;

    /// Compute the layer function and stage values for backward.
    fn forward(&mut self, input: &Tensor) -> Result<Tensor>;

    /// Forward pass of a terminal layer that also consumes a target.
    ///
    /// Only loss-capable layers override this.
    fn forward_with_target(&mut self, _input: &Tensor, _target: &Tensor) -> Result<LossOutput> {
        Err(NnError::NotALossLayer { layer: self.name() })
    }

    /// Whether this layer can terminate a computation graph.
    fn is_loss(&self) -> bool {
        false
    }

    /// Gradient with respect to the input of the most recent forward call.
    ///
    /// `grad_output` is `None` only for the root of the backward pass.
    fn backward(&mut self, grad_output: Option<&Tensor>) -> Result<Tensor>;

    /// Clear the context stack and any stored gradient.
    fn reset(&mut self);

    /// Switch between training (`true`) and evaluation (`false`) mode.
    fn set_training(&mut self, training: bool);

    /// Current mode, `true` for training.
    fn is_training(&self) -> bool;

    /// Parameter matrix, `None` for stateless layers.
    fn parameters(&self) -> Option<&Matrix> {
        None
    }

    /// Gradient with respect to the parameters from the last backward pass.
    fn gradient(&self) -> Option<&Matrix> {
        None
    }

    /// Parameters and gradient borrowed together for an optimizer update.
    fn trainable(&mut self) -> Option<Trainable<'_>> {
        None
    }

    /// Number of trainable scalars.
    fn parameter_count(&self) -> usize {
        self.parameters().map_or(0, |p| p.len())
    }
}

/// Unwrap the upstream gradient of a non-root layer.
pub(crate) fn require_upstream<'a>(
    layer: &'static str,
    grad_output: Option<&'a Tensor>,
) -> Result<&'a Tensor> {
    grad_output.ok_or(NnError::MissingUpstreamGradient { layer })
}
