//! Tests for architecture parsing and graph building
//!
//! - Loading the shipped architecture files
//! - Parsing every layer type
//! - Building graphs from configs
//! - Handling invalid JSON, missing files and broken layer chains

use ndarray::Array2;
use nn_autodiff::architecture::{
    build_graph, load_architecture, validate_architecture, ArchitectureConfig, LayerConfig,
};
use nn_autodiff::NnError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

fn load_str(contents: &str) -> Result<ArchitectureConfig, NnError> {
    let file = write_temp_config(contents);
    load_architecture(file.path().to_str().unwrap())
}

// ============================================================================
// Valid Architecture Loading Tests
// ============================================================================

mod valid_architecture_tests {
    use super::*;

    #[test]
    fn test_shipped_mlp_matches_default() {
        let config = load_architecture("config/architectures/mlp.json").unwrap();
        assert_eq!(config, ArchitectureConfig::default_mlp());
    }

    #[test]
    fn test_shipped_logistic() {
        let config = load_architecture("config/architectures/logistic.json").unwrap();
        assert_eq!(config.layers.len(), 3);
        assert_eq!(config.input_size(), Some(784));
        assert_eq!(config.layers[1], LayerConfig::Sigmoid);
    }

    #[test]
    fn test_every_layer_type_parses() {
        let config = load_str(
            r#"{
  "layers": [
    { "layer_type": "linear", "input_size": 3, "output_size": 4, "bias": false },
    { "layer_type": "relu" },
    { "layer_type": "sigmoid" },
    { "layer_type": "dropout", "prob": 0.1 },
    { "layer_type": "softmax" },
    { "layer_type": "log" },
    { "layer_type": "sum" }
  ]
}"#,
        )
        .unwrap();

        assert_eq!(
            config.layers,
            vec![
                LayerConfig::Linear {
                    input_size: 3,
                    output_size: 4,
                    bias: false
                },
                LayerConfig::Relu,
                LayerConfig::Sigmoid,
                LayerConfig::Dropout { prob: 0.1 },
                LayerConfig::Softmax,
                LayerConfig::Log,
                LayerConfig::Sum,
            ]
        );
    }
}

// ============================================================================
// Graph Building Tests
// ============================================================================

mod build_tests {
    use super::*;

    #[test]
    fn test_build_default_mlp() {
        let mut rng = StdRng::seed_from_u64(1);
        let graph = build_graph(&ArchitectureConfig::default_mlp(), &mut rng).unwrap();

        let names: Vec<_> = graph.layers().iter().map(|l| l.name()).collect();
        assert_eq!(
            names,
            vec!["Linear", "ReLU", "Dropout", "Linear", "Softmax", "MSELoss"]
        );
        assert_eq!(graph.num_trainable(), 2);
    }

    #[test]
    fn test_built_graph_runs() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = load_architecture("config/architectures/logistic.json").unwrap();
        let mut graph = build_graph(&config, &mut rng).unwrap();

        let input = Array2::<f32>::from_elem((2, 784), 0.5).into_dyn();
        let target = Array2::<f32>::zeros((2, 10)).into_dyn();
        let out = graph.forward(&input, &target).unwrap();
        assert_eq!(out.prediction.shape(), &[2, 10]);
        graph.backward().unwrap();
    }

    #[test]
    fn test_same_seed_same_parameters() {
        let config = ArchitectureConfig::default_mlp();
        let a = build_graph(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = build_graph(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        for (x, y) in a.trainable_layers().zip(b.trainable_layers()) {
            assert_eq!(x.parameters(), y.parameters());
        }
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = ArchitectureConfig {
            layers: vec![LayerConfig::Relu],
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            build_graph(&config, &mut rng),
            Err(NnError::InvalidConfig(_))
        ));
    }
}

// ============================================================================
// Invalid Architecture Tests
// ============================================================================

mod invalid_architecture_tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_architecture("config/architectures/nope.json"),
            Err(NnError::Io(_))
        ));
    }

    #[test]
    fn test_unknown_layer_type() {
        assert!(matches!(
            load_str(r#"{ "layers": [ { "layer_type": "dense", "input_size": 1, "output_size": 1 } ] }"#),
            Err(NnError::Json(_))
        ));
    }

    #[test]
    fn test_linear_missing_size() {
        assert!(matches!(
            load_str(r#"{ "layers": [ { "layer_type": "linear", "input_size": 1 }, { "layer_type": "sum" } ] }"#),
            Err(NnError::Json(_))
        ));
    }

    #[test]
    fn test_empty_layers() {
        assert!(matches!(
            load_str(r#"{ "layers": [] }"#),
            Err(NnError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_size_linear() {
        assert!(matches!(
            load_str(
                r#"{ "layers": [ { "layer_type": "linear", "input_size": 0, "output_size": 2 }, { "layer_type": "mse_loss" } ] }"#
            ),
            Err(NnError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_layer_connection_mismatch() {
        let config = ArchitectureConfig {
            layers: vec![
                LayerConfig::Linear {
                    input_size: 4,
                    output_size: 8,
                    bias: true,
                },
                LayerConfig::Relu,
                LayerConfig::Dropout { prob: 0.5 },
                LayerConfig::Linear {
                    input_size: 4,
                    output_size: 2,
                    bias: true,
                },
                LayerConfig::MseLoss,
            ],
        };
        match validate_architecture(&config) {
            Err(NnError::InvalidConfig(message)) => {
                assert!(message.contains("Layer connection mismatch"), "{}", message)
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_loss_in_the_middle() {
        let config = ArchitectureConfig {
            layers: vec![LayerConfig::Relu, LayerConfig::Sum, LayerConfig::MseLoss],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_dropout_probability_one_rejected() {
        assert!(matches!(
            load_str(r#"{ "layers": [ { "layer_type": "dropout", "prob": 1.0 }, { "layer_type": "sum" } ] }"#),
            Err(NnError::InvalidConfig(_))
        ));
    }
}
