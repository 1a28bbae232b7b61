//! Single-feature linear regression trained by gradient descent

use super::FitConfig;
use crate::autograd::{broadcast_add, broadcast_mul};
use crate::io::{ModelState, ParamState};
use crate::optim::SGD;
use crate::train::{Batch, EarlyStopping, MSELoss, TrainConfig, TrainResult, Trainer};
use crate::{Error, Result, Tensor};

/// Linear regression: `y ≈ slope·x + intercept`
///
/// Slope and intercept start from `Uniform(0, 1)` draws and are fitted by
/// full-batch gradient descent on the mean squared error.
///
/// # Example
///
/// ```no_run
/// use descenso::model::{FitConfig, LinearRegression};
///
/// let x: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
/// let y: Vec<f32> = x.iter().map(|v| 0.96 * v + 0.24).collect();
///
/// let mut model = LinearRegression::new(42);
/// model.fit(&x, &y, &FitConfig::default()).unwrap();
/// println!("slope: {:.3}, intercept: {:.3}", model.slope(), model.intercept());
/// ```
pub struct LinearRegression {
    slope: Tensor,
    intercept: Tensor,
    history: Vec<f32>,
}

impl LinearRegression {
    /// Create a model with seeded uniform random parameters
    pub fn new(seed: u64) -> Self {
        Self {
            slope: Tensor::from_uniform(1, seed),
            intercept: Tensor::from_uniform(1, seed.wrapping_add(1)),
            history: Vec::new(),
        }
    }

    /// Fit on paired scalar observations
    ///
    /// Fails with [`Error::EmptyBatch`] on zero samples and
    /// [`Error::ShapeMismatch`] when `x` and `y` differ in length. Each epoch
    /// prints the loss and the current slope/intercept on the configured
    /// interval.
    pub fn fit(&mut self, x: &[f32], y: &[f32], config: &FitConfig) -> Result<TrainResult> {
        if x.is_empty() {
            return Err(Error::EmptyBatch);
        }
        if x.len() != y.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![x.len()],
                got: vec![y.len()],
            });
        }

        let params = vec![self.slope.clone(), self.intercept.clone()];
        let train_config = TrainConfig::new().with_log_interval(config.log_interval);

        let mut trainer = Trainer::new(params, Box::new(SGD::new(config.lr)), train_config);
        trainer.set_loss(Box::new(MSELoss));
        trainer.trace_param("slope", 0);
        trainer.trace_param("intercept", 1);
        if let Some((patience, min_delta)) = config.early_stopping {
            trainer.add_callback(EarlyStopping::new(patience, min_delta));
        }

        let batch = Batch::new(
            Tensor::from_vec(x.to_vec(), false),
            Tensor::from_vec(y.to_vec(), false),
        );

        let result = trainer.train(config.epochs, || vec![batch.clone()], |inputs, params| {
            broadcast_add(&broadcast_mul(&params[0], inputs), &params[1])
        })?;

        self.slope = trainer.params()[0].clone();
        self.intercept = trainer.params()[1].clone();
        self.history = trainer.metrics.losses.clone();

        Ok(result)
    }

    /// Learned slope
    pub fn slope(&self) -> f32 {
        self.slope.item()
    }

    /// Learned intercept
    pub fn intercept(&self) -> f32 {
        self.intercept.item()
    }

    /// Predict a single value
    pub fn predict(&self, x: f32) -> f32 {
        self.slope() * x + self.intercept()
    }

    /// Predict a batch of values
    pub fn predict_batch(&self, x: &[f32]) -> Vec<f32> {
        x.iter().map(|&v| self.predict(v)).collect()
    }

    /// Per-epoch loss history from the last fit
    pub fn loss_history(&self) -> &[f32] {
        &self.history
    }

    /// Snapshot the learned parameters for serialization
    pub fn to_state(&self) -> ModelState {
        ModelState::new(
            "linear-regression",
            vec![
                ParamState::new("slope", vec![1], self.slope.data().to_vec()),
                ParamState::new("intercept", vec![1], self.intercept.data().to_vec()),
            ],
        )
    }

    /// Restore a model from a serialized state
    pub fn from_state(state: &ModelState) -> Result<Self> {
        let slope = state.param("slope")?;
        let intercept = state.param("intercept")?;
        if slope.data.len() != 1 || intercept.data.len() != 1 {
            return Err(Error::ShapeMismatch {
                expected: vec![1],
                got: vec![slope.data.len().max(intercept.data.len())],
            });
        }

        Ok(Self {
            slope: Tensor::from_vec(slope.data.clone(), true),
            intercept: Tensor::from_vec(intercept.data.clone(), true),
            history: Vec::new(),
        })
    }
}
