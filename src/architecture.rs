//! Architecture configuration structures
//!
//! Networks can be described in JSON and turned into a [`ComputationGraph`]
//! without code changes. Validation runs before any layer is built, so a bad
//! file fails with a readable [`NnError::InvalidConfig`] instead of a shape
//! error on the first batch.

use crate::error::{NnError, Result};
use crate::graph::ComputationGraph;
use crate::layers::{Dropout, Layer, Linear, Log, MSELoss, ReLU, Sigmoid, Softmax, Sum};
use rand::Rng;
use serde::Deserialize;
use std::fs;

/// Configuration for a single layer, tagged by `layer_type`.
///
/// # Examples
///
/// ```json
/// { "layer_type": "linear", "input_size": 784, "output_size": 128 }
/// ```
///
/// ```json
/// { "layer_type": "dropout", "prob": 0.2 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "layer_type", rename_all = "snake_case")]
pub enum LayerConfig {
    Linear {
        input_size: usize,
        output_size: usize,
        /// Append a constant-1 input column (default true)
        #[serde(default = "default_bias")]
        bias: bool,
    },
    Relu,
    Sigmoid,
    Softmax,
    Log,
    Sum,
    Dropout {
        /// Probability of dropping each element
        prob: f32,
    },
    MseLoss,
}

fn default_bias() -> bool {
    true
}

impl LayerConfig {
    /// Whether this layer terminates a graph.
    pub fn is_loss(&self) -> bool {
        matches!(self, LayerConfig::Sum | LayerConfig::MseLoss)
    }

    /// Instantiate the layer, drawing any randomness from `rng`.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Box<dyn Layer>> {
        let layer: Box<dyn Layer> = match *self {
            LayerConfig::Linear {
                input_size,
                output_size,
                bias,
            } => Box::new(Linear::new(input_size, output_size, bias, rng)),
            LayerConfig::Relu => Box::new(ReLU::new()),
            LayerConfig::Sigmoid => Box::new(Sigmoid::new()),
            LayerConfig::Softmax => Box::new(Softmax::new()),
            LayerConfig::Log => Box::new(Log::new()),
            LayerConfig::Sum => Box::new(Sum::new()),
            LayerConfig::Dropout { prob } => Box::new(Dropout::new(prob, rng)?),
            LayerConfig::MseLoss => Box::new(MSELoss::new()),
        };
        Ok(layer)
    }
}

/// Configuration for the entire network: layers in application order.
///
/// # Example
///
/// ```json
/// {
///   "layers": [
///     { "layer_type": "linear", "input_size": 784, "output_size": 128 },
///     { "layer_type": "relu" },
///     { "layer_type": "dropout", "prob": 0.2 },
///     { "layer_type": "linear", "input_size": 128, "output_size": 10 },
///     { "layer_type": "softmax" },
///     { "layer_type": "mse_loss" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchitectureConfig {
    pub layers: Vec<LayerConfig>,
}

impl ArchitectureConfig {
    /// 784 → 128 → 10 classifier used when no architecture file is given.
    pub fn default_mlp() -> Self {
        Self {
            layers: vec![
                LayerConfig::Linear {
                    input_size: 784,
                    output_size: 128,
                    bias: true,
                },
                LayerConfig::Relu,
                LayerConfig::Dropout { prob: 0.2 },
                LayerConfig::Linear {
                    input_size: 128,
                    output_size: 10,
                    bias: true,
                },
                LayerConfig::Softmax,
                LayerConfig::MseLoss,
            ],
        }
    }

    /// Feature width expected by the first linear layer, if any.
    pub fn input_size(&self) -> Option<usize> {
        self.layers.iter().find_map(|layer| match *layer {
            LayerConfig::Linear { input_size, .. } => Some(input_size),
            _ => None,
        })
    }

    /// Output width of the last linear layer, if any.
    pub fn output_size(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|layer| match *layer {
            LayerConfig::Linear { output_size, .. } => Some(output_size),
            _ => None,
        })
    }
}

/// Loads an architecture configuration from a JSON file and validates it.
///
/// # Examples
///
/// ```no_run
/// use nn_autodiff::architecture::load_architecture;
///
/// let arch = load_architecture("config/architectures/mlp.json").unwrap();
/// assert!(arch.layers.len() >= 2);
/// ```
pub fn load_architecture(path: &str) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    Ok(config)
}

/// Validates an architecture configuration.
///
/// Checks that:
/// - there are at least two layers and the last one is a loss
/// - no loss appears before the last position
/// - linear sizes are non-zero and dropout probabilities lie in `[0, 1)`
/// - linear widths chain: the input size of each linear layer matches the
///   output size of the previous one (activations and dropout keep the width)
pub fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    let count = config.layers.len();
    if count < 2 {
        return Err(NnError::InvalidConfig(format!(
            "Architecture needs at least 2 layers, got {}",
            count
        )));
    }

    let mut width: Option<(usize, usize)> = None;
    for (i, layer) in config.layers.iter().enumerate() {
        let is_last = i + 1 == count;
        if layer.is_loss() != is_last {
            let message = if is_last {
                format!("Layer {}: the last layer must be a loss (sum or mse_loss)", i)
            } else {
                format!("Layer {}: a loss layer may only appear last", i)
            };
            return Err(NnError::InvalidConfig(message));
        }

        match *layer {
            LayerConfig::Linear {
                input_size,
                output_size,
                ..
            } => {
                if input_size == 0 || output_size == 0 {
                    return Err(NnError::InvalidConfig(format!(
                        "Layer {}: linear sizes must be greater than 0",
                        i
                    )));
                }
                if let Some((previous, size)) = width {
                    if size != input_size {
                        return Err(NnError::InvalidConfig(format!(
                            "Layer connection mismatch: Layer {} output size ({}) does not match Layer {} input size ({})",
                            previous, size, i, input_size
                        )));
                    }
                }
                width = Some((i, output_size));
            }
            LayerConfig::Dropout { prob } => {
                if !(0.0..1.0).contains(&prob) {
                    return Err(NnError::InvalidConfig(format!(
                        "Layer {}: dropout prob must be in [0.0, 1.0), got {}",
                        i, prob
                    )));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Builds a computation graph from an architecture configuration.
///
/// Parameters are initialized and dropout generators forked from `rng`, in
/// layer order, so a fixed seed reproduces the same network.
///
/// # Examples
///
/// ```
/// use nn_autodiff::architecture::{build_graph, ArchitectureConfig};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let graph = build_graph(&ArchitectureConfig::default_mlp(), &mut rng).unwrap();
/// assert_eq!(graph.len(), 6);
/// assert_eq!(graph.parameter_count(), 785 * 128 + 129 * 10);
/// ```
pub fn build_graph<R: Rng + ?Sized>(
    config: &ArchitectureConfig,
    rng: &mut R,
) -> Result<ComputationGraph> {
    validate_architecture(config)?;

    let layers = config
        .layers
        .iter()
        .map(|layer| layer.build(rng))
        .collect::<Result<Vec<_>>>()?;

    ComputationGraph::new(layers)
}
