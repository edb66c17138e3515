//! Error types shared by layers, the graph driver, the optimizer and the loader.
//!
//! Every misuse of the forward/backward contract surfaces here as a value
//! instead of a panic: popping an empty context, feeding a gradient of the
//! wrong shape, stepping without a gradient.

use thiserror::Error;

/// Errors raised by the autodiff engine and its collaborators.
#[derive(Debug, Error)]
pub enum NnError {
    /// Two shapes that must agree do not.
    #[error("shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// A tensor has the wrong number of axes.
    #[error("rank mismatch in {context}: expected rank {expected}, got rank {got}")]
    RankMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// `backward` was called on a layer with nothing staged by `forward`.
    #[error("{layer}: backward called with an empty context stack")]
    EmptyContext { layer: &'static str },

    /// A non-terminal layer was asked to backpropagate without an upstream gradient.
    #[error("{layer}: backward requires an upstream gradient")]
    MissingUpstreamGradient { layer: &'static str },

    /// A loss layer was called through the single-argument forward.
    #[error("{layer}: forward requires a target")]
    MissingTarget { layer: &'static str },

    /// The last layer of a graph cannot consume a target.
    #[error("{layer} cannot terminate a computation graph")]
    NotALossLayer { layer: &'static str },

    /// A graph needs a feature layer and a loss layer.
    #[error("a computation graph needs at least 2 layers, got {len}")]
    GraphTooShort { len: usize },

    /// The optimizer found a trainable layer without a gradient.
    #[error("{layer}: no gradient available, run forward and backward before stepping")]
    MissingGradient { layer: &'static str },

    /// A dataset row could not be parsed.
    #[error("malformed dataset row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// Dropout probability outside `[0, 1]`.
    #[error("invalid dropout probability {prob}, must be in [0, 1]")]
    InvalidProbability { prob: f32 },

    /// Configuration or architecture validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;
