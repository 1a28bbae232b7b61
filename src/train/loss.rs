//! Loss functions for training

use crate::autograd::BackwardOp;
use crate::Tensor;
use ndarray::Array1;
use std::rc::Rc;

/// Trait for loss functions
pub trait LossFn {
    /// Compute loss given predictions and targets
    ///
    /// Returns a length-1 loss tensor wired into the backward tape: running
    /// backward on it accumulates the analytic gradient into the prediction
    /// tensor and continues into the prediction's own backward op, so the
    /// gradient reaches upstream parameters.
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}

/// Backward op shared by the losses: seed the prediction gradient with the
/// analytic loss gradient, then continue down the tape.
struct LossBackward {
    pred: Tensor,
    grad: Array1<f32>,
}

impl BackwardOp for LossBackward {
    fn backward(&self) {
        self.pred.accumulate_grad(self.grad.clone());

        if let Some(op) = self.pred.backward_op() {
            op.backward();
        }
    }
}

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)²)
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        assert!(!predictions.is_empty(), "MSE over an empty batch");

        let diff = predictions.data() - targets.data();
        let squared = &diff * &diff;
        let mse = squared.mean().unwrap_or(0.0);

        let mut loss = Tensor::from_vec(vec![mse], true);

        if predictions.requires_grad() {
            // d(MSE)/d(pred) = 2 * (pred - target) / n
            let n = predictions.len() as f32;
            let grad = &diff * (2.0 / n);

            loss.set_backward_op(Rc::new(LossBackward {
                pred: predictions.clone(),
                grad,
            }));
        }

        loss
    }

    fn name(&self) -> &str {
        "MSE"
    }
}

/// Softmax cross-entropy loss for multi-class classification
///
/// Applies a row-wise softmax to `rows × classes` logits, then computes the
/// mean cross-entropy against one-hot targets:
///
/// L = -(1/rows) Σ_rows Σ_classes target · ln(prob + ε)
///
/// Softmax and cross-entropy are fused in a single application with a single
/// mean reduction, which keeps the loss non-negative and the gradient the
/// usual `(probs - targets) / rows`.
pub struct SoftmaxCrossEntropy {
    classes: usize,
}

impl SoftmaxCrossEntropy {
    /// Create the loss for a fixed class count
    pub fn new(classes: usize) -> Self {
        assert!(classes > 0, "class count must be positive");
        Self { classes }
    }

    /// Row-wise softmax with max-subtraction for stability
    fn softmax_rows(logits: &Array1<f32>, rows: usize, cols: usize) -> Array1<f32> {
        let mut probs = vec![0.0; rows * cols];
        for i in 0..rows {
            let base = i * cols;
            let max = (0..cols).fold(f32::NEG_INFINITY, |m, j| m.max(logits[base + j]));
            let exps: Vec<f32> = (0..cols).map(|j| (logits[base + j] - max).exp()).collect();
            let sum: f32 = exps.iter().sum();
            for j in 0..cols {
                probs[base + j] = exps[j] / sum;
            }
        }
        Array1::from(probs)
    }
}

impl LossFn for SoftmaxCrossEntropy {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );
        assert_eq!(
            predictions.len() % self.classes,
            0,
            "Logit count must be a multiple of the class count"
        );
        assert!(!predictions.is_empty(), "Cross-entropy over an empty batch");

        let rows = predictions.len() / self.classes;
        let probs = Self::softmax_rows(predictions.data(), rows, self.classes);

        let ce: f32 = targets
            .data()
            .iter()
            .zip(probs.iter())
            .map(|(&t, &p)| -t * (p + 1e-10).ln())
            .sum();
        let mean_ce = ce / rows as f32;

        let mut loss = Tensor::from_vec(vec![mean_ce], true);

        if predictions.requires_grad() {
            // d(CE)/d(logits) = (probs - targets) / rows
            let grad = (&probs - targets.data()) / rows as f32;

            loss.set_backward_op(Rc::new(LossBackward {
                pred: predictions.clone(),
                grad,
            }));
        }

        loss
    }

    fn name(&self) -> &str {
        "SoftmaxCrossEntropy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{broadcast_mul, sum};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_mse_loss_basic() {
        let loss_fn = MSELoss;
        let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);

        let loss = loss_fn.forward(&pred, &target);

        // MSE = mean((0.5, 0.5, 0.5)^2) = 0.25
        assert_relative_eq!(loss.item(), 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_mse_loss_zero_for_perfect() {
        let loss_fn = MSELoss;
        let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let target = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);

        let loss = loss_fn.forward(&pred, &target);

        assert_relative_eq!(loss.item(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mse_gradient() {
        let loss_fn = MSELoss;
        let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let target = Tensor::from_vec(vec![0.0, 0.0, 0.0], false);

        let loss = loss_fn.forward(&pred, &target);

        if let Some(backward_op) = loss.backward_op() {
            backward_op.backward();
        }

        // d(MSE)/d(pred) = 2*(pred - target)/n
        let grad = pred.grad().unwrap();
        assert_relative_eq!(grad[0], 2.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], 4.0 / 3.0, epsilon = 1e-5);
        assert_relative_eq!(grad[2], 6.0 / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mse_gradient_reaches_upstream_parameters() {
        // pred = s * x with s a parameter: loss backward must continue into
        // the broadcast op so s receives a gradient.
        let s = Tensor::from_vec(vec![2.0], true);
        let x = Tensor::from_vec(vec![1.0, 2.0], false);
        let target = Tensor::from_vec(vec![0.0, 0.0], false);

        let pred = broadcast_mul(&s, &x);
        let loss = MSELoss.forward(&pred, &target);

        if let Some(backward_op) = loss.backward_op() {
            backward_op.backward();
        }

        // d/ds mean((s*x - 0)^2) = mean(2*s*x*x) = (4 + 16)/2
        let grad_s = s.grad().unwrap();
        assert_relative_eq!(grad_s[0], 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_cross_entropy_positive_and_finite() {
        let loss_fn = SoftmaxCrossEntropy::new(3);
        let logits = Tensor::from_vec(vec![2.0, 1.0, 0.5], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0, 0.0], false);

        let loss = loss_fn.forward(&logits, &targets);

        assert!(loss.item() > 0.0);
        assert!(loss.item().is_finite());
    }

    #[test]
    fn test_cross_entropy_mean_reduction() {
        // Two identical rows: mean loss equals the single-row loss
        let loss_fn = SoftmaxCrossEntropy::new(2);

        let one_row = loss_fn.forward(
            &Tensor::from_vec(vec![1.0, -1.0], true),
            &Tensor::from_vec(vec![1.0, 0.0], false),
        );
        let two_rows = loss_fn.forward(
            &Tensor::from_vec(vec![1.0, -1.0, 1.0, -1.0], true),
            &Tensor::from_vec(vec![1.0, 0.0, 1.0, 0.0], false),
        );

        assert_relative_eq!(one_row.item(), two_rows.item(), epsilon = 1e-5);
    }

    #[test]
    fn test_cross_entropy_gradient() {
        let loss_fn = SoftmaxCrossEntropy::new(2);
        let logits = Tensor::from_vec(vec![0.0, 0.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0], false);

        let loss = loss_fn.forward(&logits, &targets);
        if let Some(backward_op) = loss.backward_op() {
            backward_op.backward();
        }

        // probs = (0.5, 0.5); grad = (probs - targets) / rows
        let grad = logits.grad().unwrap();
        assert_relative_eq!(grad[0], -0.5, epsilon = 1e-5);
        assert_relative_eq!(grad[1], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_cross_entropy_near_zero_for_confident_correct() {
        let loss_fn = SoftmaxCrossEntropy::new(2);
        let logits = Tensor::from_vec(vec![20.0, -20.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0], false);

        let loss = loss_fn.forward(&logits, &targets);
        assert!(loss.item() >= 0.0);
        assert!(loss.item() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "must have same length")]
    fn test_mse_mismatched_lengths() {
        let loss_fn = MSELoss;
        let pred = Tensor::from_vec(vec![1.0, 2.0], true);
        let target = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);

        loss_fn.forward(&pred, &target);
    }

    #[test]
    fn test_loss_is_scalar() {
        let pred = Tensor::from_vec(vec![1.0, 2.0], true);
        let target = Tensor::from_vec(vec![0.0, 0.0], false);

        let loss = MSELoss.forward(&pred, &target);
        assert_eq!(loss.len(), 1);
        let _ = sum(&loss); // usable as a graph node
    }

    proptest! {
        #[test]
        fn prop_cross_entropy_non_negative(
            logits in proptest::collection::vec(-8.0f32..8.0, 4..=16),
            hot in 0usize..4,
        ) {
            let cols = 4;
            let rows = logits.len() / cols;
            let trimmed = logits[..rows * cols].to_vec();

            let mut targets = vec![0.0; rows * cols];
            for i in 0..rows {
                targets[i * cols + hot] = 1.0;
            }

            let loss = SoftmaxCrossEntropy::new(cols).forward(
                &Tensor::from_vec(trimmed, true),
                &Tensor::from_vec(targets, false),
            );

            prop_assert!(loss.item() >= 0.0);
            prop_assert!(loss.item().is_finite());
        }

        #[test]
        fn prop_mse_non_negative(
            pred in proptest::collection::vec(-50.0f32..50.0, 1..24),
            shift in -10.0f32..10.0,
        ) {
            let target: Vec<f32> = pred.iter().map(|p| p + shift).collect();
            let loss = MSELoss.forward(
                &Tensor::from_vec(pred, true),
                &Tensor::from_vec(target, false),
            );
            prop_assert!(loss.item() >= 0.0);
        }
    }
}
