//! High-level training loop
//!
//! Provides the fixed-epoch gradient-descent loop shared by the regression
//! models:
//! - Loss functions (MSE, softmax cross-entropy)
//! - Trainer abstraction over parameters, optimizer, and callbacks
//! - Training configuration and per-epoch metrics (the plot source)
//!
//! # Example
//!
//! ```no_run
//! use descenso::optim::SGD;
//! use descenso::train::{Batch, MSELoss, TrainConfig, Trainer};
//! use descenso::Tensor;
//!
//! let params = vec![Tensor::from_uniform(1, 42)];
//! let mut trainer = Trainer::new(params, Box::new(SGD::new(0.1)), TrainConfig::default());
//! trainer.set_loss(Box::new(MSELoss));
//! ```

mod batch;
pub mod callback;
mod config;
mod loss;
mod trainer;

pub use batch::Batch;
pub use callback::{
    CallbackAction, CallbackContext, CallbackManager, EarlyStopping, ProgressCallback,
    TrainerCallback,
};
pub use config::{MetricsTracker, TrainConfig};
pub use loss::{LossFn, MSELoss, SoftmaxCrossEntropy};
pub use trainer::{TrainResult, Trainer};
