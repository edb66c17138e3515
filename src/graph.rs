//! Computation graph driver.
//!
//! A [`ComputationGraph`] is a strict linear chain of layers. The last layer
//! is the loss: it receives the prediction together with the target during
//! `forward` and is the root of `backward`, which walks the chain in reverse.

use crate::error::{NnError, Result};
use crate::layers::{Layer, LossOutput};
use crate::tensor::Tensor;

/// Ordered pipeline of layers ending in a loss layer.
///
/// The sequence is fixed at construction. Layers own their parameters; the
/// graph only orders them.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use nn_autodiff::graph::ComputationGraph;
/// use nn_autodiff::layers::{Linear, MSELoss, ReLU};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let mut graph = ComputationGraph::new(vec![
///     Box::new(Linear::new(4, 3, true, &mut rng)),
///     Box::new(ReLU::new()),
///     Box::new(MSELoss::new()),
/// ])
/// .unwrap();
///
/// let out = graph
///     .forward(&array![[1.0f32, 2.0, 3.0, 4.0]].into_dyn(), &array![[0.0f32, 0.0, 0.0]].into_dyn())
///     .unwrap();
/// assert_eq!(out.prediction.shape(), &[1, 3]);
/// graph.backward().unwrap();
/// assert_eq!(graph.num_trainable(), 1);
/// ```
pub struct ComputationGraph {
    layers: Vec<Box<dyn Layer>>,
}

impl ComputationGraph {
    /// Build a graph from an ordered layer sequence.
    ///
    /// # Errors
    ///
    /// - [`NnError::GraphTooShort`] for fewer than two layers
    /// - [`NnError::NotALossLayer`] when the last layer cannot take a target
    pub fn new(layers: Vec<Box<dyn Layer>>) -> Result<Self> {
        if layers.len() < 2 {
            return Err(NnError::GraphTooShort { len: layers.len() });
        }
        if let Some(last) = layers.last() {
            if !last.is_loss() {
                return Err(NnError::NotALossLayer { layer: last.name() });
            }
        }
        Ok(Self { layers })
    }

    /// Thread `input` through every feature layer, then feed the result and
    /// `target` into the loss layer. The loss layer's output is returned as is.
    pub fn forward(&mut self, input: &Tensor, target: &Tensor) -> Result<LossOutput> {
        let (loss_layer, feature_layers) = self
            .layers
            .split_last_mut()
            .ok_or(NnError::GraphTooShort { len: 0 })?;

        let mut activation = input.clone();
        for layer in feature_layers.iter_mut() {
            activation = layer.forward(&activation)?;
        }
        loss_layer.forward_with_target(&activation, target)
    }

    /// Propagate gradients from the loss back to the first layer.
    ///
    /// The loss layer is the root and receives no upstream gradient; every
    /// earlier layer receives the gradient returned by its successor.
    pub fn backward(&mut self) -> Result<()> {
        let mut grad: Option<Tensor> = None;
        for layer in self.layers.iter_mut().rev() {
            grad = Some(layer.backward(grad.as_ref())?);
        }
        Ok(())
    }

    /// Clear every layer's context stack and gradient.
    pub fn reset(&mut self) {
        for layer in &mut self.layers {
            layer.reset();
        }
    }

    /// Alias of [`ComputationGraph::reset`].
    pub fn zero_grad(&mut self) {
        self.reset();
    }

    /// Propagate the training flag to every layer.
    pub fn set_training_mode(&mut self, training: bool) {
        for layer in &mut self.layers {
            layer.set_training(training);
        }
    }

    pub fn train(&mut self) {
        self.set_training_mode(true);
    }

    pub fn eval(&mut self) {
        self.set_training_mode(false);
    }

    /// True when every layer is in training mode.
    pub fn is_training(&self) -> bool {
        self.layers.iter().all(|layer| layer.is_training())
    }

    /// Layers that own parameters, in graph order.
    pub fn trainable_layers(&self) -> impl Iterator<Item = &(dyn Layer + 'static)> + '_ {
        self.layers
            .iter()
            .map(|layer| layer.as_ref())
            .filter(|layer| layer.parameters().is_some())
    }

    /// Mutable view of the trainable layers, in graph order. Optimizers iterate this.
    pub fn trainable_layers_mut(&mut self) -> impl Iterator<Item = &mut (dyn Layer + 'static)> + '_ {
        self.layers
            .iter_mut()
            .map(|layer| layer.as_mut())
            .filter(|layer| layer.parameters().is_some())
    }

    pub fn num_trainable(&self) -> usize {
        self.trainable_layers().count()
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.parameter_count()).sum()
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
