// Softmax forward properties and backward against an explicit Jacobian.

use approx::assert_abs_diff_eq;
use ndarray::{array, Array2, ArrayD, Axis, IxDyn};
use nn_autodiff::layers::{Layer, Softmax};
use nn_autodiff::{NnError, Tensor};

// J[i][j] = s_i * (delta_ij - s_j); returns upstream^T J for one row.
fn jacobian_vector_product(s: &[f32], upstream: &[f32]) -> Vec<f32> {
    let n = s.len();
    let mut jacobian = Array2::<f32>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let delta = if i == j { 1.0 } else { 0.0 };
            jacobian[[i, j]] = s[i] * (delta - s[j]);
        }
    }
    (0..n)
        .map(|j| (0..n).map(|i| upstream[i] * jacobian[[i, j]]).sum())
        .collect()
}

// ============================================================================
// Forward
// ============================================================================

mod forward_tests {
    use super::*;

    #[test]
    fn test_rows_sum_to_one() {
        let mut softmax = Softmax::new();
        let out = softmax
            .forward(&array![[1.0f32, 2.0, 3.0, 4.0], [-1.0, 0.0, 0.5, 9.0]].into_dyn())
            .unwrap();
        for row in out.axis_iter(Axis(0)) {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-6);
            assert!(row.iter().all(|&p| p > 0.0));
        }
    }

    #[test]
    fn test_shift_invariance() {
        let x = array![[0.3f32, -1.2, 2.0, 0.0]].into_dyn();
        let shifted = x.mapv(|v| v + 100.0);
        let a = Softmax::new().forward(&x).unwrap();
        let b = Softmax::new().forward(&shifted).unwrap();
        for (p, q) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*p, *q, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_large_inputs_stay_finite() {
        let out = Softmax::new()
            .forward(&array![[1000.0f32, 999.0, -1000.0, 0.0]].into_dyn())
            .unwrap();
        assert!(out.iter().all(|p| p.is_finite()));
        assert_abs_diff_eq!(out[[0, 0]], 1.0 / (1.0 + (-1.0f32).exp()), epsilon = 1e-5);
    }

    #[test]
    fn test_scalar_input_rejected() {
        let result = Softmax::new().forward(&ArrayD::from_elem(IxDyn(&[]), 1.0f32));
        assert!(matches!(result, Err(NnError::RankMismatch { .. })));
    }
}

// ============================================================================
// Backward
// ============================================================================

mod backward_tests {
    use super::*;

    fn check_against_jacobian(x: &Tensor, upstream: &Tensor) {
        let mut softmax = Softmax::new();
        let s = softmax.forward(x).unwrap();
        let grad = softmax.backward(Some(upstream)).unwrap();
        let last = x.ndim() - 1;

        for ((s_lane, g_lane), out_lane) in s
            .lanes(Axis(last))
            .into_iter()
            .zip(upstream.lanes(Axis(last)))
            .zip(grad.lanes(Axis(last)))
        {
            let expected = jacobian_vector_product(&s_lane.to_vec(), &g_lane.to_vec());
            for (e, a) in expected.iter().zip(out_lane.iter()) {
                assert_abs_diff_eq!(*e, *a, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_four_class_jacobian() {
        let x = array![[0.1f32, -0.4, 1.3, 0.7]].into_dyn();
        let upstream = array![[1.0f32, -2.0, 0.5, 0.25]].into_dyn();
        check_against_jacobian(&x, &upstream);
    }

    #[test]
    fn test_batched_jacobian() {
        let x = array![
            [0.1f32, -0.4, 1.3, 0.7],
            [2.0, 2.0, 2.0, 2.0],
            [-3.0, 0.0, 3.0, 1.0]
        ]
        .into_dyn();
        let upstream = array![
            [1.0f32, -2.0, 0.5, 0.25],
            [0.3, 0.3, 0.3, 0.3],
            [-1.0, 1.0, 0.0, 2.0]
        ]
        .into_dyn();
        check_against_jacobian(&x, &upstream);
    }

    #[test]
    fn test_rank_three_uses_last_axis() {
        let x = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| {
            (idx[0] as f32 - 0.5) * 0.7 + idx[1] as f32 * 0.3 - idx[2] as f32 * 0.2
        });
        let upstream = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| {
            ((idx[0] + 2 * idx[1] + 3 * idx[2]) % 5) as f32 - 2.0
        });
        check_against_jacobian(&x, &upstream);
    }

    #[test]
    fn test_uniform_upstream_gives_zero_gradient() {
        // Softmax outputs sum to 1, so a constant upstream has no effect.
        let mut softmax = Softmax::new();
        softmax.forward(&array![[0.5f32, 1.0, -2.0, 3.0]].into_dyn()).unwrap();
        let grad = softmax
            .backward(Some(&array![[4.0f32, 4.0, 4.0, 4.0]].into_dyn()))
            .unwrap();
        for g in grad.iter() {
            assert_abs_diff_eq!(*g, 0.0, epsilon = 1e-5);
        }
    }
}
