//! Train a small MLP on MNIST-style CSV data.
//!
//! ```bash
//! cargo run --release --bin mnist_mlp -- --config config/mnist_mlp.json
//! cargo run --release --bin mnist_mlp -- --train data/mnist_train.csv --epochs 3 --seed 42
//! ```

use clap::Parser;
use nn_autodiff::architecture::{build_graph, load_architecture, ArchitectureConfig};
use nn_autodiff::config::{load_config, validate_config, TrainingConfig};
use nn_autodiff::data::MnistDataset;
use nn_autodiff::train::{evaluate, train_epoch};
use nn_autodiff::utils::{rng_from_seed, TrainingLogger};
use nn_autodiff::{NnError, SGD};
use std::error::Error;
use std::time::Instant;

#[derive(Parser, Debug, Default)]
#[command(name = "mnist_mlp", about = "Train an MLP on MNIST CSV data")]
struct Args {
    /// Training configuration JSON; flags below override its values
    #[arg(long)]
    config: Option<String>,

    /// Training CSV file
    #[arg(long)]
    train: Option<String>,

    /// Test CSV file
    #[arg(long)]
    test: Option<String>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    learning_rate: Option<f32>,

    /// Seed for initialization, dropout and shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the file order instead of shuffling every epoch
    #[arg(long)]
    no_shuffle: bool,

    /// Per-epoch CSV loss log
    #[arg(long)]
    log_file: Option<String>,
}

/// Overlay command line flags on a loaded configuration.
fn apply_overrides(mut config: TrainingConfig, args: &Args) -> TrainingConfig {
    if let Some(train) = &args.train {
        config.train_file = train.clone();
    }
    if let Some(test) = &args.test {
        config.test_file = Some(test.clone());
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(lr) = args.learning_rate {
        config.learning_rate = lr;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_shuffle {
        config.shuffle = false;
    }
    if let Some(log_file) = &args.log_file {
        config.log_file = Some(log_file.clone());
    }
    config
}

fn main() -> Result<(), Box<dyn Error>> {
    let program_start = Instant::now();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TrainingConfig::default(),
    };
    let config = apply_overrides(config, &args);
    validate_config(&config)?;

    let architecture = match &config.architecture {
        Some(path) => load_architecture(path)?,
        None => ArchitectureConfig::default_mlp(),
    };
    let mut rng = rng_from_seed(config.seed);

    println!("Loading training data...");
    let load_start = Instant::now();
    let mut train_set =
        MnistDataset::from_csv(&config.train_file, config.batch_size, config.shuffle, &mut rng)?;
    if let Some(expected) = architecture.input_size() {
        if expected != train_set.num_features() {
            return Err(Box::new(NnError::InvalidConfig(format!(
                "architecture expects {} input features, {} has {}",
                expected,
                config.train_file,
                train_set.num_features()
            ))));
        }
    }
    let mut test_set = match &config.test_file {
        Some(path) => {
            println!("Loading test data...");
            Some(MnistDataset::from_csv(path, config.batch_size, false, &mut rng)?)
        }
        None => None,
    };
    let load_time = load_start.elapsed().as_secs_f64();
    println!(
        "Loaded {} training samples ({} batches of {})",
        train_set.num_samples(),
        train_set.len(),
        config.batch_size
    );
    println!("Data loading time: {:.2} seconds", load_time);

    println!("Initializing neural network...");
    let mut graph = build_graph(&architecture, &mut rng)?;
    println!(
        "{} layers, {} trainable, {} parameters",
        graph.len(),
        graph.num_trainable(),
        graph.parameter_count()
    );
    let mut optimizer = SGD::new(config.learning_rate);
    let mut logger = match &config.log_file {
        Some(path) => Some(TrainingLogger::new(path)?),
        None => None,
    };

    println!("Training neural network...");
    let train_start = Instant::now();
    for epoch in 1..=config.epochs {
        let stats = train_epoch(&mut graph, &mut optimizer, &mut train_set)?;
        let accuracy = match test_set.as_mut() {
            Some(test_set) => Some(evaluate(&mut graph, test_set)?.accuracy),
            None => None,
        };

        match logger.as_mut() {
            Some(logger) => logger.log_epoch(epoch, stats.mean_loss, accuracy)?,
            None => match accuracy {
                Some(a) => println!(
                    "Epoch {}, Loss: {:.6}, Test Accuracy: {:.2}%",
                    epoch,
                    stats.mean_loss,
                    a * 100.0
                ),
                None => println!("Epoch {}, Loss: {:.6}", epoch, stats.mean_loss),
            },
        }
    }
    let train_time = train_start.elapsed().as_secs_f64();

    if let Some(test_set) = test_set.as_mut() {
        let result = evaluate(&mut graph, test_set)?;
        println!("Test Accuracy: {:.2}%", result.accuracy * 100.0);
    }

    println!("\n=== Performance Summary ===");
    println!("Data loading time: {:.2} seconds", load_time);
    println!("Total training time: {:.2} seconds", train_time);
    println!(
        "Total program time: {:.2} seconds",
        program_start.elapsed().as_secs_f64()
    );
    println!("========================");
    Ok(())
}
