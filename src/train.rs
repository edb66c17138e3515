//! Epoch-level training and evaluation loops.

use crate::data::MnistDataset;
use crate::error::Result;
use crate::graph::ComputationGraph;
use crate::optimizers::Optimizer;
use crate::tensor::argmax_rows;

/// Summary of one training epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    /// Mean of the per-batch losses.
    pub mean_loss: f32,
    pub batches: usize,
}

/// Summary of an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub mean_loss: f32,
    /// Fraction of rows whose prediction argmax equals the target argmax.
    pub accuracy: f32,
    pub samples: usize,
}

/// Run one pass over `dataset` in training mode.
///
/// Every batch runs `forward → backward → optimizer.step → reset`.
pub fn train_epoch<O: Optimizer + ?Sized>(
    graph: &mut ComputationGraph,
    optimizer: &mut O,
    dataset: &mut MnistDataset,
) -> Result<EpochStats> {
    graph.train();

    let mut total_loss = 0.0f32;
    let mut batches = 0usize;
    for batch in dataset.batches() {
        let output = graph.forward(&batch.input, &batch.target)?;
        graph.backward()?;
        optimizer.step(graph)?;
        graph.reset();

        total_loss += output.loss;
        batches += 1;
    }

    Ok(EpochStats {
        mean_loss: if batches > 0 {
            total_loss / batches as f32
        } else {
            0.0
        },
        batches,
    })
}

/// Forward-only pass over `dataset` in evaluation mode.
///
/// The graph's previous mode is restored afterwards, also on error.
pub fn evaluate(graph: &mut ComputationGraph, dataset: &mut MnistDataset) -> Result<Evaluation> {
    let was_training = graph.is_training();
    graph.eval();
    let result = evaluate_batches(graph, dataset);
    graph.reset();
    graph.set_training_mode(was_training);
    result
}

fn evaluate_batches(graph: &mut ComputationGraph, dataset: &mut MnistDataset) -> Result<Evaluation> {
    let mut total_loss = 0.0f32;
    let mut batches = 0usize;
    let mut correct = 0usize;
    let mut samples = 0usize;

    for batch in dataset.batches() {
        let output = graph.forward(&batch.input, &batch.target)?;
        graph.reset();

        let predicted = argmax_rows(&output.prediction)?;
        let expected = argmax_rows(&batch.target)?;
        correct += predicted
            .iter()
            .zip(&expected)
            .filter(|(p, e)| p == e)
            .count();
        samples += expected.len();
        total_loss += output.loss;
        batches += 1;
    }

    Ok(Evaluation {
        mean_loss: if batches > 0 {
            total_loss / batches as f32
        } else {
            0.0
        },
        accuracy: if samples > 0 {
            correct as f32 / samples as f32
        } else {
            0.0
        },
        samples,
    })
}
