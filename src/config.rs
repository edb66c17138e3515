//! Configuration structures for training
//!
//! Training runs are described by a JSON file parsed into [`TrainingConfig`].
//! Command line flags of the `mnist_mlp` binary override individual fields
//! and the result is validated again with [`validate_config`].

use crate::error::{NnError, Result};
use serde::Deserialize;
use std::fs;

/// Configuration for a training run.
///
/// Only `train_file` is required; everything else has a default.
///
/// # Example
///
/// ```json
/// {
///   "train_file": "data/mnist_train.csv",
///   "test_file": "data/mnist_test.csv",
///   "batch_size": 32,
///   "learning_rate": 0.01,
///   "epochs": 5,
///   "seed": 42,
///   "log_file": "logs/training_loss.csv",
///   "architecture": "config/architectures/mlp.json"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainingConfig {
    /// CSV file with training rows
    pub train_file: String,

    /// CSV file with evaluation rows, evaluation is skipped when absent
    #[serde(default)]
    pub test_file: Option<String>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,

    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Draw a new sample order every epoch (default true)
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,

    /// Seed for parameter init, dropout masks and shuffling. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Per-epoch CSV log destination
    #[serde(default)]
    pub log_file: Option<String>,

    /// Path to an architecture JSON file. The built-in MLP is used when absent.
    #[serde(default)]
    pub architecture: Option<String>,
}

fn default_batch_size() -> usize {
    32
}

fn default_learning_rate() -> f32 {
    0.01
}

fn default_epochs() -> usize {
    5
}

fn default_shuffle() -> bool {
    true
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            train_file: String::from("data/mnist_train.csv"),
            test_file: Some(String::from("data/mnist_test.csv")),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            shuffle: default_shuffle(),
            seed: None,
            log_file: None,
            architecture: None,
        }
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a [`TrainingConfig`] and
/// validates it.
///
/// # Examples
///
/// ```no_run
/// use nn_autodiff::config::load_config;
///
/// let cfg = load_config("config/mnist_mlp.json").unwrap();
/// assert!(cfg.batch_size > 0);
/// ```
pub fn load_config(path: &str) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    let config: TrainingConfig = serde_json::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Check value ranges of a configuration.
pub fn validate_config(config: &TrainingConfig) -> Result<()> {
    if config.train_file.trim().is_empty() {
        return Err(NnError::InvalidConfig(
            "train_file must not be empty".to_string(),
        ));
    }

    if config.batch_size == 0 {
        return Err(NnError::InvalidConfig(
            "batch_size must be greater than 0".to_string(),
        ));
    }

    if config.epochs == 0 {
        return Err(NnError::InvalidConfig(
            "epochs must be greater than 0".to_string(),
        ));
    }

    if !config.learning_rate.is_finite() || config.learning_rate <= 0.0 {
        return Err(NnError::InvalidConfig(format!(
            "learning_rate must be positive and finite, got {}",
            config.learning_rate
        )));
    }

    Ok(())
}
