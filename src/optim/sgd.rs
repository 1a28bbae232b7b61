//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// SGD optimizer with optional momentum
///
/// With momentum 0 this is the plain update rule
/// `param ← param − lr × grad`.
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer without momentum
    pub fn new(lr: f32) -> Self {
        Self::with_momentum(lr, 0.0)
    }

    /// Create a new SGD optimizer with momentum
    pub fn with_momentum(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, params: &[Tensor]) {
        if self.velocities.is_empty() {
            self.velocities = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_velocities(params);

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                if self.momentum > 0.0 {
                    // v = momentum * v - lr * grad
                    let velocity = if let Some(v) = &self.velocities[i] {
                        v * self.momentum - &grad * self.lr
                    } else {
                        &grad * (-self.lr)
                    };

                    *param.data_mut() = param.data() + &velocity;
                    self.velocities[i] = Some(velocity);
                } else {
                    // param -= lr * grad
                    *param.data_mut() = param.data() - &(&grad * self.lr);
                }
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sgd_step_applies_update_rule() {
        let mut params = vec![Tensor::from_vec(vec![1.0, 2.0], true)];
        params[0].set_grad(Array1::from(vec![0.5, -0.5]));

        let mut opt = SGD::new(0.1);
        opt.step(&mut params);

        assert_abs_diff_eq!(params[0].data()[0], 0.95, epsilon = 1e-6);
        assert_abs_diff_eq!(params[0].data()[1], 2.05, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_skips_params_without_grad() {
        let mut params = vec![Tensor::from_vec(vec![1.0], true)];

        let mut opt = SGD::new(0.1);
        opt.step(&mut params);

        assert_abs_diff_eq!(params[0].data()[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_momentum_accumulates_velocity() {
        let mut params = vec![Tensor::from_vec(vec![0.0], true)];

        let mut opt = SGD::with_momentum(0.1, 0.9);

        params[0].set_grad(Array1::from(vec![1.0]));
        opt.step(&mut params);
        // first step: v = -0.1
        assert_abs_diff_eq!(params[0].data()[0], -0.1, epsilon = 1e-6);

        params[0].zero_grad();
        params[0].set_grad(Array1::from(vec![1.0]));
        opt.step(&mut params);
        // second step: v = 0.9 * -0.1 - 0.1 = -0.19
        assert_abs_diff_eq!(params[0].data()[0], -0.29, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_set_lr() {
        let mut opt = SGD::new(0.1);
        assert_abs_diff_eq!(opt.lr(), 0.1);
        opt.set_lr(0.01);
        assert_abs_diff_eq!(opt.lr(), 0.01);
    }
}
