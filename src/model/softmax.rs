//! Softmax (multinomial logistic) regression trained by gradient descent

use super::FitConfig;
use crate::autograd::{add_bias, matmul, softmax_rows};
use crate::io::{ModelState, ParamState};
use crate::optim::SGD;
use crate::train::{Batch, EarlyStopping, SoftmaxCrossEntropy, TrainConfig, TrainResult, Trainer};
use crate::{Error, Result, Tensor};

/// Softmax regression over C classes
///
/// Scores are `features × weights + bias` with a `features × classes` weight
/// matrix and a `classes` bias vector, both initialized from `Uniform(0, 1)`;
/// training minimizes the mean cross-entropy between the row-wise softmax of
/// the scores and one-hot targets.
pub struct SoftmaxRegression {
    weights: Tensor,
    bias: Tensor,
    n_features: usize,
    n_classes: usize,
    history: Vec<f32>,
}

impl SoftmaxRegression {
    /// Create a model with seeded uniform random parameters
    pub fn new(n_features: usize, n_classes: usize, seed: u64) -> Self {
        assert!(n_features > 0, "feature count must be positive");
        assert!(n_classes > 1, "softmax regression needs at least two classes");

        Self {
            weights: Tensor::from_uniform(n_features * n_classes, seed),
            bias: Tensor::from_uniform(n_classes, seed.wrapping_add(1)),
            n_features,
            n_classes,
            history: Vec::new(),
        }
    }

    /// Number of input features
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn check_features(&self, features: &[f32]) -> Result<usize> {
        if features.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if features.len() % self.n_features != 0 {
            return Err(Error::ShapeMismatch {
                expected: vec![self.n_features],
                got: vec![features.len()],
            });
        }
        Ok(features.len() / self.n_features)
    }

    /// Fit on a flattened row-major `rows × features` matrix and one-hot
    /// `rows × classes` targets
    pub fn fit(
        &mut self,
        features: &[f32],
        one_hot_targets: &[f32],
        config: &FitConfig,
    ) -> Result<TrainResult> {
        let rows = self.check_features(features)?;
        if one_hot_targets.len() != rows * self.n_classes {
            return Err(Error::ShapeMismatch {
                expected: vec![rows, self.n_classes],
                got: vec![one_hot_targets.len()],
            });
        }

        let params = vec![self.weights.clone(), self.bias.clone()];
        let train_config = TrainConfig::new().with_log_interval(config.log_interval);

        let mut trainer = Trainer::new(params, Box::new(SGD::new(config.lr)), train_config);
        trainer.set_loss(Box::new(SoftmaxCrossEntropy::new(self.n_classes)));
        if let Some((patience, min_delta)) = config.early_stopping {
            trainer.add_callback(EarlyStopping::new(patience, min_delta));
        }

        let batch = Batch::new(
            Tensor::from_vec(features.to_vec(), false),
            Tensor::from_vec(one_hot_targets.to_vec(), false),
        );

        let n_features = self.n_features;
        let n_classes = self.n_classes;
        let result = trainer.train(config.epochs, || vec![batch.clone()], |inputs, params| {
            let rows = inputs.len() / n_features;
            let scores = matmul(inputs, &params[0], rows, n_features, n_classes);
            add_bias(&scores, &params[1], rows, n_classes)
        })?;

        self.weights = trainer.params()[0].clone();
        self.bias = trainer.params()[1].clone();
        self.history = trainer.metrics.losses.clone();

        Ok(result)
    }

    /// Class probabilities for a flattened `rows × features` matrix
    ///
    /// Returns a flattened `rows × classes` matrix; every row sums to 1.
    pub fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>> {
        let rows = self.check_features(features)?;

        let inputs = Tensor::from_vec(features.to_vec(), false);
        let weights = Tensor::from_vec(self.weights.data().to_vec(), false);
        let bias = Tensor::from_vec(self.bias.data().to_vec(), false);

        let scores = add_bias(
            &matmul(&inputs, &weights, rows, self.n_features, self.n_classes),
            &bias,
            rows,
            self.n_classes,
        );
        let probs = softmax_rows(&scores, rows, self.n_classes);

        Ok(probs.data().to_vec())
    }

    /// Predicted class index per row
    pub fn predict(&self, features: &[f32]) -> Result<Vec<usize>> {
        let probs = self.predict_proba(features)?;
        let rows = probs.len() / self.n_classes;

        let mut classes = Vec::with_capacity(rows);
        for i in 0..rows {
            let row = &probs[i * self.n_classes..(i + 1) * self.n_classes];
            let mut best = 0;
            for (j, &p) in row.iter().enumerate() {
                if p > row[best] {
                    best = j;
                }
            }
            classes.push(best);
        }
        Ok(classes)
    }

    /// Fraction of rows whose predicted class matches the given indices
    pub fn accuracy(&self, features: &[f32], class_indices: &[usize]) -> Result<f32> {
        let predicted = self.predict(features)?;
        if predicted.len() != class_indices.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![predicted.len()],
                got: vec![class_indices.len()],
            });
        }

        let correct = predicted
            .iter()
            .zip(class_indices.iter())
            .filter(|(p, t)| p == t)
            .count();
        Ok(correct as f32 / predicted.len() as f32)
    }

    /// Per-epoch loss history from the last fit
    pub fn loss_history(&self) -> &[f32] {
        &self.history
    }

    /// Snapshot the learned parameters for serialization
    pub fn to_state(&self) -> ModelState {
        ModelState::new(
            "softmax-regression",
            vec![
                ParamState::new(
                    "weights",
                    vec![self.n_features, self.n_classes],
                    self.weights.data().to_vec(),
                ),
                ParamState::new("bias", vec![self.n_classes], self.bias.data().to_vec()),
            ],
        )
    }

    /// Restore a model from a serialized state
    pub fn from_state(state: &ModelState) -> Result<Self> {
        let weights = state.param("weights")?;
        let bias = state.param("bias")?;

        if weights.shape.len() != 2 {
            return Err(Error::ShapeMismatch {
                expected: vec![2],
                got: vec![weights.shape.len()],
            });
        }
        let (n_features, n_classes) = (weights.shape[0], weights.shape[1]);
        if weights.data.len() != n_features * n_classes || bias.data.len() != n_classes {
            return Err(Error::ShapeMismatch {
                expected: vec![n_features, n_classes],
                got: vec![weights.data.len(), bias.data.len()],
            });
        }

        Ok(Self {
            weights: Tensor::from_vec(weights.data.clone(), true),
            bias: Tensor::from_vec(bias.data.clone(), true),
            n_features,
            n_classes,
            history: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quiet_config() -> FitConfig {
        FitConfig::default().with_log_interval(1000)
    }

    /// Two well-separated 2-D clusters with one-hot labels
    fn separable_data() -> (Vec<f32>, Vec<f32>, Vec<usize>) {
        let mut features = Vec::new();
        let mut one_hot = Vec::new();
        let mut labels = Vec::new();

        for i in 0..20 {
            let offset = i as f32 * 0.01;
            // class 0 around (-1, -1)
            features.extend_from_slice(&[-1.0 + offset, -1.0 - offset]);
            one_hot.extend_from_slice(&[1.0, 0.0]);
            labels.push(0);
            // class 1 around (1, 1)
            features.extend_from_slice(&[1.0 + offset, 1.0 - offset]);
            one_hot.extend_from_slice(&[0.0, 1.0]);
            labels.push(1);
        }

        (features, one_hot, labels)
    }

    #[test]
    fn test_fit_separates_clusters() {
        let (features, one_hot, labels) = separable_data();

        let mut model = SoftmaxRegression::new(2, 2, 42);
        model
            .fit(&features, &one_hot, &quiet_config().with_epochs(200).with_lr(0.5))
            .unwrap();

        let acc = model.accuracy(&features, &labels).unwrap();
        assert!(acc > 0.95, "accuracy was {acc}");
    }

    #[test]
    fn test_loss_history_non_negative_and_decreasing() {
        let (features, one_hot, _) = separable_data();

        let mut model = SoftmaxRegression::new(2, 2, 42);
        model
            .fit(&features, &one_hot, &quiet_config().with_epochs(25))
            .unwrap();

        let history = model.loss_history();
        assert_eq!(history.len(), 25);
        assert!(history.iter().all(|&l| l >= 0.0));
        assert!(history[history.len() - 1] < history[0]);
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let (features, one_hot, _) = separable_data();

        let mut model = SoftmaxRegression::new(2, 2, 9);
        model
            .fit(&features, &one_hot, &quiet_config().with_epochs(10))
            .unwrap();

        let probs = model.predict_proba(&features).unwrap();
        let rows = probs.len() / 2;
        for i in 0..rows {
            let row_sum = probs[i * 2] + probs[i * 2 + 1];
            assert_abs_diff_eq!(row_sum, 1.0, epsilon = 1e-4);
            assert!(probs[i * 2] >= 0.0 && probs[i * 2 + 1] >= 0.0);
        }
    }

    #[test]
    fn test_fit_empty_batch() {
        let mut model = SoftmaxRegression::new(2, 2, 1);
        let result = model.fit(&[], &[], &quiet_config());
        assert!(matches!(result, Err(Error::EmptyBatch)));
    }

    #[test]
    fn test_fit_shape_mismatch() {
        let mut model = SoftmaxRegression::new(2, 2, 1);
        // 2 rows of features but targets for 1 row
        let result = model.fit(&[1.0, 2.0, 3.0, 4.0], &[1.0, 0.0], &quiet_config());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_fit_ragged_features() {
        let mut model = SoftmaxRegression::new(2, 2, 1);
        let result = model.fit(&[1.0, 2.0, 3.0], &[1.0, 0.0], &quiet_config());
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_same_seed_same_fit() {
        let (features, one_hot, _) = separable_data();
        let config = quiet_config().with_epochs(25);

        let mut a = SoftmaxRegression::new(2, 2, 17);
        let mut b = SoftmaxRegression::new(2, 2, 17);
        a.fit(&features, &one_hot, &config).unwrap();
        b.fit(&features, &one_hot, &config).unwrap();

        assert_eq!(a.weights.data(), b.weights.data());
        assert_eq!(a.bias.data(), b.bias.data());
    }

    #[test]
    fn test_state_round_trip() {
        let (features, one_hot, _) = separable_data();

        let mut model = SoftmaxRegression::new(2, 2, 23);
        model
            .fit(&features, &one_hot, &quiet_config().with_epochs(50))
            .unwrap();

        let restored = SoftmaxRegression::from_state(&model.to_state()).unwrap();
        assert_eq!(restored.n_features(), 2);
        assert_eq!(restored.n_classes(), 2);
        assert_eq!(
            restored.predict(&features).unwrap(),
            model.predict(&features).unwrap()
        );
    }
}
