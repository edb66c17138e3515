//! Minimal reverse-mode automatic differentiation for small neural networks
//!
//! A network is a linear chain of layers ending in a loss. Each layer stages
//! what its backward pass needs on its own context stack during `forward`,
//! and the [`ComputationGraph`] walks the chain in reverse to produce
//! parameter gradients that an [`Optimizer`] then applies.
//!
//! # Modules
//!
//! - `layers`: Layer trait and the layer kinds (Linear, ReLU, Softmax, etc.)
//! - `graph`: ComputationGraph driver
//! - `optimizers`: Optimizer trait and SGD
//! - `data`: MNIST-style CSV dataset and batching
//! - `config`: Training configuration structures
//! - `architecture`: Architecture configuration and graph building
//! - `train`: Epoch training and evaluation loops
//! - `utils`: Seeded RNG handles and the training logger
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use nn_autodiff::layers::{Linear, MSELoss, Sigmoid};
//! use nn_autodiff::optimizers::{Optimizer, SGD};
//! use nn_autodiff::utils::rng_from_seed;
//! use nn_autodiff::ComputationGraph;
//!
//! let mut rng = rng_from_seed(Some(0));
//! let mut graph = ComputationGraph::new(vec![
//!     Box::new(Linear::new(2, 1, true, &mut rng)),
//!     Box::new(Sigmoid::new()),
//!     Box::new(MSELoss::new()),
//! ])?;
//! let mut sgd = SGD::new(0.1);
//!
//! let input = array![[0.0f32, 1.0], [1.0, 0.0]].into_dyn();
//! let target = array![[1.0f32], [0.0]].into_dyn();
//! let before = graph.forward(&input, &target)?.loss;
//! graph.backward()?;
//! sgd.step(&mut graph)?;
//! graph.reset();
//!
//! let after = graph.forward(&input, &target)?.loss;
//! assert!(after < before);
//! # Ok::<(), nn_autodiff::NnError>(())
//! ```

pub mod architecture;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod layers;
pub mod optimizers;
pub mod tensor;
pub mod train;
pub mod utils;

pub use error::{NnError, Result};
pub use graph::ComputationGraph;
pub use layers::{Layer, LossOutput};
pub use optimizers::{Optimizer, SGD};
pub use tensor::{Matrix, Tensor};
