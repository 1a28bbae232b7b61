//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! descenso linear
//! descenso linear --csv points.csv --x height --y weight --plot loss.svg
//! descenso softmax --csv iris.csv --label species --scale
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Descenso: gradient-descent regression trainers
#[derive(Parser, Debug)]
#[command(name = "descenso")]
#[command(version)]
#[command(about = "Gradient-descent regression trainers on a tape-based autograd engine")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train the linear regression example (slope/intercept, MSE)
    Linear(LinearArgs),

    /// Train the softmax regression example (weights/bias, cross-entropy)
    Softmax(SoftmaxArgs),
}

/// Arguments for the linear command
#[derive(Args, Debug)]
pub struct LinearArgs {
    /// CSV file with the training data; without it, the reference dataset
    /// (1000 samples of y = 0.96x + 0.24) is synthesized
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Feature column name in the CSV
    #[arg(long, default_value = "x")]
    pub x: String,

    /// Target column name in the CSV
    #[arg(long, default_value = "y")]
    pub y: String,

    /// Number of training epochs
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.1)]
    pub lr: f32,

    /// Seed for parameter initialization and data synthesis
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print progress every N epochs
    #[arg(long, default_value_t = 20)]
    pub log_interval: usize,

    /// Render the loss curve to this SVG path
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Save the learned parameters as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Arguments for the softmax command
#[derive(Args, Debug)]
pub struct SoftmaxArgs {
    /// CSV file with feature columns and a label column; without it, three
    /// seeded clusters are synthesized
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Label column name in the CSV
    #[arg(long, default_value = "label")]
    pub label: String,

    /// Number of training epochs
    #[arg(long, default_value_t = 25)]
    pub epochs: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.1)]
    pub lr: f32,

    /// Seed for parameter initialization and data synthesis
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Print progress every N epochs
    #[arg(long, default_value_t = 5)]
    pub log_interval: usize,

    /// Standardize features before training
    #[arg(long)]
    pub scale: bool,

    /// Render the loss curve to this SVG path
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Save the learned parameters as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,
}
