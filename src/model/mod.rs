//! Regression models trained by gradient descent

mod linear;
mod softmax;

pub use linear::LinearRegression;
pub use softmax::SoftmaxRegression;

/// Configuration shared by the model `fit` methods
#[derive(Clone, Debug)]
pub struct FitConfig {
    /// Number of training epochs
    pub epochs: usize,

    /// Learning rate
    pub lr: f32,

    /// Print progress every N epochs
    pub log_interval: usize,

    /// Optional early stopping as (patience, min_delta)
    pub early_stopping: Option<(usize, f32)>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            lr: 0.1,
            log_interval: 20,
            early_stopping: None,
        }
    }
}

impl FitConfig {
    /// Create a config with the default reference settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the epoch count
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the learning rate
    pub fn with_lr(mut self, lr: f32) -> Self {
        self.lr = lr;
        self
    }

    /// Set the logging interval
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval.max(1);
        self
    }

    /// Enable early stopping
    pub fn with_early_stopping(mut self, patience: usize, min_delta: f32) -> Self {
        self.early_stopping = Some((patience, min_delta));
        self
    }
}
