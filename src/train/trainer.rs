//! Trainer abstraction for the fixed-epoch training loop

use super::callback::{CallbackAction, CallbackContext, CallbackManager, TrainerCallback};
use super::{Batch, LossFn, MetricsTracker, TrainConfig};
use crate::optim::{clip_grad_norm, Optimizer};
use crate::{Error, Result, Tensor};
use std::time::Instant;

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainResult {
    /// Final epoch reached
    pub final_epoch: usize,
    /// Final training loss
    pub final_loss: f32,
    /// Best loss achieved
    pub best_loss: f32,
    /// Whether training was stopped early
    pub stopped_early: bool,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}

/// High-level trainer that orchestrates the training loop
///
/// Owns the parameter tensors, an optimizer, and a loss function. Each epoch
/// is one full-batch forward pass, backward pass, and parameter update; the
/// loop runs for a fixed number of epochs unless a callback stops it or the
/// loss turns non-finite.
///
/// # Example
///
/// ```no_run
/// use descenso::optim::SGD;
/// use descenso::train::{MSELoss, TrainConfig, Trainer};
/// use descenso::Tensor;
///
/// let params = vec![Tensor::from_uniform(1, 42)];
/// let optimizer = SGD::new(0.1);
/// let config = TrainConfig::default();
///
/// let mut trainer = Trainer::new(params, Box::new(optimizer), config);
/// trainer.set_loss(Box::new(MSELoss));
/// // let result = trainer.train(200, || batches.clone(), |x, _| x.clone())?;
/// ```
pub struct Trainer {
    /// Model parameters
    params: Vec<Tensor>,

    /// Optimizer
    optimizer: Box<dyn Optimizer>,

    /// Loss function
    loss_fn: Option<Box<dyn LossFn>>,

    /// Training configuration
    config: TrainConfig,

    /// Metrics tracker
    pub metrics: MetricsTracker,

    /// Callback manager
    callbacks: CallbackManager,

    /// Length-1 parameters printed alongside the loss on the log interval
    traced: Vec<(String, usize)>,

    /// Best loss achieved during training
    best_loss: Option<f32>,

    /// Training start time
    start_time: Option<Instant>,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(params: Vec<Tensor>, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Self {
        Self {
            params,
            optimizer,
            loss_fn: None,
            config,
            metrics: MetricsTracker::new(),
            callbacks: CallbackManager::new(),
            traced: Vec::new(),
            best_loss: None,
            start_time: None,
        }
    }

    /// Set the loss function
    pub fn set_loss(&mut self, loss_fn: Box<dyn LossFn>) {
        self.loss_fn = Some(loss_fn);
    }

    /// Add a callback to the trainer
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Print the named parameter next to the loss on the log interval
    ///
    /// Only length-1 parameters can be traced.
    pub fn trace_param(&mut self, name: impl Into<String>, index: usize) {
        assert!(index < self.params.len(), "traced parameter out of range");
        assert_eq!(
            self.params[index].len(),
            1,
            "only length-1 parameters can be traced"
        );
        self.traced.push((name.into(), index));
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Set learning rate
    pub fn set_lr(&mut self, lr: f32) {
        self.optimizer.set_lr(lr);
    }

    /// Get reference to model parameters
    pub fn params(&self) -> &[Tensor] {
        &self.params
    }

    /// Get mutable reference to model parameters
    pub fn params_mut(&mut self) -> &mut [Tensor] {
        &mut self.params
    }

    /// Get reference to callback manager
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    fn build_context(&self, epoch: usize, max_epochs: usize, loss: f32) -> CallbackContext {
        CallbackContext {
            epoch,
            max_epochs,
            loss,
            lr: self.lr(),
            best_loss: self.best_loss,
            elapsed_secs: self
                .start_time
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        }
    }

    /// Perform a single training step
    ///
    /// Zeroes gradients, runs the forward pass, computes the loss, runs the
    /// backward pass, optionally clips gradients, and applies the optimizer
    /// update. Fails with [`Error::EmptyBatch`] on a zero-sample batch and
    /// [`Error::NonFiniteLoss`] when the loss evaluates to NaN or infinity.
    pub fn train_step<F>(&mut self, batch: &Batch, forward_fn: F) -> Result<f32>
    where
        F: FnOnce(&Tensor, &[Tensor]) -> Tensor,
    {
        assert!(
            self.loss_fn.is_some(),
            "Loss function must be set before training"
        );

        if batch.is_empty() {
            return Err(Error::EmptyBatch);
        }

        // Zero gradients
        self.optimizer.zero_grad(&mut self.params);

        // Forward pass over the trainer's current parameters
        let predictions = forward_fn(&batch.inputs, &self.params);

        // Compute loss
        let loss = self
            .loss_fn
            .as_ref()
            .unwrap()
            .forward(&predictions, &batch.targets);

        let loss_val = loss.item();
        if !loss_val.is_finite() {
            return Err(Error::NonFiniteLoss {
                epoch: self.metrics.epoch,
                loss: loss_val,
            });
        }

        // Backward pass
        if let Some(backward_op) = loss.backward_op() {
            backward_op.backward();
        }

        // Gradient clipping
        if let Some(max_norm) = self.config.max_grad_norm {
            clip_grad_norm(&mut self.params, max_norm);
        }

        // Optimizer step
        self.optimizer.step(&mut self.params);

        self.metrics.increment_step();

        Ok(loss_val)
    }

    /// Train for a fixed number of epochs
    ///
    /// # Arguments
    ///
    /// * `max_epochs` - Number of epochs to run (callbacks may stop sooner)
    /// * `batch_fn` - Function that returns the batches for each epoch
    /// * `forward_fn` - Closure that computes predictions from the batch
    ///   inputs and the trainer's current parameters
    pub fn train<F, B, I>(
        &mut self,
        max_epochs: usize,
        batch_fn: B,
        forward_fn: F,
    ) -> Result<TrainResult>
    where
        F: Fn(&Tensor, &[Tensor]) -> Tensor,
        B: Fn() -> I,
        I: IntoIterator<Item = Batch>,
    {
        self.start_time = Some(Instant::now());
        self.best_loss = None;
        let mut stopped_early = false;
        let mut final_loss = 0.0;

        let ctx = self.build_context(0, max_epochs, 0.0);
        if self.callbacks.on_train_begin(&ctx) == CallbackAction::Stop {
            return Ok(TrainResult {
                final_epoch: 0,
                final_loss: 0.0,
                best_loss: 0.0,
                stopped_early: true,
                elapsed_secs: self.elapsed(),
            });
        }

        for epoch in 0..max_epochs {
            let ctx = self.build_context(epoch, max_epochs, final_loss);
            if self.callbacks.on_epoch_begin(&ctx) == CallbackAction::Stop {
                stopped_early = true;
                break;
            }

            let batches: Vec<Batch> = batch_fn().into_iter().collect();
            if batches.is_empty() {
                return Err(Error::EmptyBatch);
            }

            let mut total_loss = 0.0;
            let num_batches = batches.len();
            for batch in batches {
                total_loss += self.train_step(&batch, &forward_fn)?;
            }

            let avg_loss = total_loss / num_batches as f32;
            final_loss = avg_loss;

            if self.best_loss.is_none() || avg_loss < self.best_loss.unwrap() {
                self.best_loss = Some(avg_loss);
            }

            self.metrics.record_epoch(avg_loss, self.lr());

            if (epoch + 1) % self.config.log_interval == 0 {
                self.log_progress(epoch, max_epochs, avg_loss);
            }

            let ctx = self.build_context(epoch, max_epochs, avg_loss);
            if self.callbacks.on_epoch_end(&ctx) == CallbackAction::Stop {
                stopped_early = true;
                break;
            }
        }

        let ctx = self.build_context(self.metrics.epoch, max_epochs, final_loss);
        self.callbacks.on_train_end(&ctx);

        Ok(TrainResult {
            final_epoch: self.metrics.epoch,
            final_loss,
            best_loss: self.best_loss.unwrap_or(final_loss),
            stopped_early,
            elapsed_secs: self.elapsed(),
        })
    }

    fn log_progress(&self, epoch: usize, max_epochs: usize, loss: f32) {
        if self.traced.is_empty() {
            println!("Epoch {}/{}: loss: {:.4}", epoch + 1, max_epochs, loss);
        } else {
            let rendered: Vec<String> = self
                .traced
                .iter()
                .map(|(name, idx)| format!("{}: {:.3}", name, self.params[*idx].data()[0]))
                .collect();
            println!(
                "Epoch {}/{}: loss: {:.4}, {}",
                epoch + 1,
                max_epochs,
                loss,
                rendered.join(", ")
            );
        }
    }

    fn elapsed(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}
