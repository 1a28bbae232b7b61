//! # Descenso: Gradient-Descent Regression Trainers
//!
//! Descenso demonstrates linear and softmax (logistic) regression trained by
//! gradient descent on a tape-based autograd engine.
//!
//! ## Architecture
//!
//! - **autograd**: Tape-based automatic differentiation over explicit tensors
//! - **optim**: SGD optimizer behind the `Optimizer` trait
//! - **train**: Fixed-epoch training loop with losses, metrics, and callbacks
//! - **model**: `LinearRegression` and `SoftmaxRegression` front-ends
//! - **data**: CSV loading, label encoding, one-hot expansion, scaling
//! - **plot**: SVG loss-curve rendering
//! - **io**: JSON export/import of learned parameters
//!
//! ## Example
//!
//! ```no_run
//! use descenso::model::{FitConfig, LinearRegression};
//!
//! let x: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();
//! let y: Vec<f32> = x.iter().map(|v| 0.96 * v + 0.24).collect();
//!
//! let mut model = LinearRegression::new(42);
//! model.fit(&x, &y, &FitConfig::default()).unwrap();
//! assert!((model.slope() - 0.96).abs() < 0.05);
//! ```

pub mod autograd;
pub mod cli;
pub mod data;
pub mod io;
pub mod model;
pub mod optim;
pub mod plot;
pub mod train;

pub mod error;

// Re-export commonly used types
pub use autograd::{backward, Tensor};
pub use error::{Error, Result};
