//! Tensor aliases and the shape checks every layer relies on.

use crate::error::{NnError, Result};
use ndarray::{arr0, Array2, ArrayD, ArrayView2, Ix2};

/// Dynamic-rank activations and gradients.
pub type Tensor = ArrayD<f32>;

/// Parameter matrices (`[in, out]`).
pub type Matrix = Array2<f32>;

/// Wrap a scalar as a rank-0 tensor.
pub fn scalar(value: f32) -> Tensor {
    arr0(value).into_dyn()
}

/// Fail with [`NnError::ShapeMismatch`] unless `got == expected`.
pub fn ensure_shape(context: &'static str, expected: &[usize], got: &[usize]) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(NnError::ShapeMismatch {
            context,
            expected: expected.to_vec(),
            got: got.to_vec(),
        })
    }
}

/// View a tensor as `[rows, cols]`, failing on any other rank.
pub fn as_matrix<'a>(context: &'static str, tensor: &'a Tensor) -> Result<ArrayView2<'a, f32>> {
    tensor
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| NnError::RankMismatch {
            context,
            expected: 2,
            got: tensor.ndim(),
        })
}

/// Read the single value of an upstream gradient that must be scalar-like.
pub fn scalar_value(context: &'static str, tensor: &Tensor) -> Result<f32> {
    match tensor.iter().next() {
        Some(&value) if tensor.len() == 1 => Ok(value),
        _ => Err(NnError::ShapeMismatch {
            context,
            expected: vec![],
            got: tensor.shape().to_vec(),
        }),
    }
}

/// Row-wise argmax of a `[rows, cols]` tensor.
pub fn argmax_rows(tensor: &Tensor) -> Result<Vec<usize>> {
    let matrix = as_matrix("argmax", tensor)?;
    Ok(matrix
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
                    if v > best.1 {
                        (i, v)
                    } else {
                        best
                    }
                })
                .0
        })
        .collect())
}
