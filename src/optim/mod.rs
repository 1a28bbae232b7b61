//! Optimizers for gradient-descent training

mod optimizer;
mod sgd;

pub use optimizer::Optimizer;
pub use sgd::SGD;

use crate::Tensor;

/// Clip gradients in place so their global L2 norm is at most `max_norm`
pub fn clip_grad_norm(params: &mut [Tensor], max_norm: f32) {
    let mut total_sq = 0.0;
    for param in params.iter() {
        if let Some(grad) = param.grad() {
            total_sq += grad.iter().map(|g| g * g).sum::<f32>();
        }
    }

    let total_norm = total_sq.sqrt();
    if total_norm > max_norm && total_norm > 0.0 {
        let factor = max_norm / total_norm;
        for param in params.iter() {
            if let Some(grad) = param.grad() {
                param.set_grad(grad * factor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    #[test]
    fn test_clip_grad_norm_scales_down() {
        let mut params = vec![Tensor::zeros(2, true)];
        params[0].set_grad(Array1::from(vec![3.0, 4.0])); // norm 5

        clip_grad_norm(&mut params, 1.0);

        let grad = params[0].grad().unwrap();
        let norm = (grad[0] * grad[0] + grad[1] * grad[1]).sqrt();
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_clip_grad_norm_leaves_small_gradients() {
        let mut params = vec![Tensor::zeros(2, true)];
        params[0].set_grad(Array1::from(vec![0.3, 0.4]));

        clip_grad_norm(&mut params, 1.0);

        let grad = params[0].grad().unwrap();
        assert_abs_diff_eq!(grad[0], 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[1], 0.4, epsilon = 1e-6);
    }
}
