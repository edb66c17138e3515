//! Optimizer abstractions for parameter updates
//!
//! Optimizers define how gradients produced by [`ComputationGraph::backward`]
//! change the parameters of every trainable layer. The basic gradient descent
//! update is `weight = weight - learning_rate * gradient`.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use nn_autodiff::graph::ComputationGraph;
//! use nn_autodiff::layers::{Layer, Linear, MSELoss};
//! use nn_autodiff::optimizers::{Optimizer, SGD};
//!
//! let mut graph = ComputationGraph::new(vec![
//!     Box::new(Linear::with_parameters(array![[1.0f32], [0.0]], true)),
//!     Box::new(MSELoss::new()),
//! ])
//! .unwrap();
//! let mut optimizer = SGD::new(0.1);
//!
//! graph.forward(&array![[1.0f32]].into_dyn(), &array![[0.0f32]].into_dyn()).unwrap();
//! graph.backward().unwrap();
//! optimizer.step(&mut graph).unwrap();
//!
//! // grad = x_aug^T * 2 * (1 - 0) = [[2], [2]]
//! let w = graph.trainable_layers().next().unwrap().parameters().unwrap();
//! assert!((w[[0, 0]] - 0.8).abs() < 1e-6);
//! assert!((w[[1, 0]] + 0.2).abs() < 1e-6);
//! ```
//!
//! [`ComputationGraph::backward`]: crate::graph::ComputationGraph::backward

pub mod sgd;

pub use sgd::SGD;

use crate::error::{NnError, Result};
use crate::graph::ComputationGraph;
use crate::layers::Trainable;
use crate::tensor::Matrix;

/// Core trait for optimizers.
///
/// Implementors provide the elementwise rule in [`Optimizer::update`];
/// [`Optimizer::step`] applies it to every trainable layer of a graph, in
/// graph order. The optimizer never owns the graph, it borrows it per step.
pub trait Optimizer {
    /// Apply the update rule to one parameter matrix in place.
    ///
    /// # Errors
    ///
    /// [`NnError::ShapeMismatch`] when `gradients` does not match `parameters`.
    fn update(&mut self, parameters: &mut Matrix, gradients: &Matrix) -> Result<()>;

    /// Update every trainable layer of `graph` from its stored gradient.
    ///
    /// # Errors
    ///
    /// [`NnError::MissingGradient`] when a trainable layer has not been
    /// through a backward pass since its last reset.
    fn step(&mut self, graph: &mut ComputationGraph) -> Result<()> {
        for trainable in graph.trainable_layers_mut() {
            if let Some(Trainable {
                layer,
                parameters,
                gradient,
            }) = trainable.trainable()
            {
                let gradient = gradient.ok_or(NnError::MissingGradient { layer })?;
                self.update(parameters, gradient)?;
            }
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32;
}
