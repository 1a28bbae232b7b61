//! Autograd operations with backward passes
//!
//! Each op builds its output eagerly and, when any input requires grad,
//! attaches a backward op that accumulates input gradients and then recurses
//! into the inputs' own backward ops.

use super::{BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Add two tensors
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    let data = a.data() + b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad.clone());
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
            if let Some(op) = self.b.backward_op() {
                op.backward();
            }
        }
    }
}

/// Subtract two tensors element-wise
pub fn sub(a: &Tensor, b: &Tensor) -> Tensor {
    let data = a.data() - b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SubBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SubBackward {
    a: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SubBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                // ∂L/∂b = -∂L/∂out
                self.b.accumulate_grad(grad * -1.0);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
            if let Some(op) = self.b.backward_op() {
                op.backward();
            }
        }
    }
}

/// Multiply two tensors element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    let data = a.data() * b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MulBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MulBackward {
    a: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * b
                self.a.accumulate_grad(grad * self.b.data());
            }
            if self.b.requires_grad() {
                // ∂L/∂b = ∂L/∂out * a
                self.b.accumulate_grad(grad * self.a.data());
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
            if let Some(op) = self.b.backward_op() {
                op.backward();
            }
        }
    }
}

/// Scale tensor by a scalar constant
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = a.data() * factor;
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ScaleBackward {
            a: a.clone(),
            factor,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ScaleBackward {
    a: Tensor,
    factor: f32,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad * self.factor);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Square each element
pub fn square(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x * x);
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SquareBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SquareBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SquareBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * 2a
                let grad_a = grad * &(self.a.data() * 2.0);
                self.a.accumulate_grad(grad_a);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Sum all elements into a length-1 tensor
pub fn sum(a: &Tensor) -> Tensor {
    let data = Array1::from(vec![a.data().sum()]);
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SumBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SumBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂sum * 1 (broadcast)
                let grad_val = grad[0];
                let grad_a = Array1::from(vec![grad_val; self.a.len()]);
                self.a.accumulate_grad(grad_a);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Mean of all elements as a length-1 tensor
pub fn mean(a: &Tensor) -> Tensor {
    assert!(!a.is_empty(), "mean of an empty tensor");

    let n = a.len() as f32;
    let data = Array1::from(vec![a.data().sum() / n]);
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MeanBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MeanBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MeanBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂mean / n (broadcast)
                let n = self.a.len() as f32;
                let grad_val = grad[0] / n;
                let grad_a = Array1::from(vec![grad_val; self.a.len()]);
                self.a.accumulate_grad(grad_a);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Multiply a batch tensor by a length-1 parameter tensor
///
/// Broadcasts `s` (length 1) across `x`. The scalar gradient is the dot
/// product of the output gradient with `x`, so a scalar parameter collects
/// contributions from the whole batch.
pub fn broadcast_mul(s: &Tensor, x: &Tensor) -> Tensor {
    assert_eq!(s.len(), 1, "broadcast_mul expects a length-1 left operand");

    let data = x.data() * s.data()[0];
    let requires_grad = s.requires_grad() || x.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(BroadcastMulBackward {
            s: s.clone(),
            x: x.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct BroadcastMulBackward {
    s: Tensor,
    x: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for BroadcastMulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.s.requires_grad() {
                // ∂L/∂s = Σ ∂L/∂out_i * x_i
                let grad_s = (grad * self.x.data()).sum();
                self.s.accumulate_grad(Array1::from(vec![grad_s]));
            }
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad * self.s.data()[0]);
            }

            if let Some(op) = self.s.backward_op() {
                op.backward();
            }
            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
        }
    }
}

/// Add a length-1 parameter tensor to every element of a batch tensor
pub fn broadcast_add(x: &Tensor, s: &Tensor) -> Tensor {
    assert_eq!(s.len(), 1, "broadcast_add expects a length-1 right operand");

    let data = x.data() + s.data()[0];
    let requires_grad = x.requires_grad() || s.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(BroadcastAddBackward {
            x: x.clone(),
            s: s.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct BroadcastAddBackward {
    x: Tensor,
    s: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for BroadcastAddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad.clone());
            }
            if self.s.requires_grad() {
                // ∂L/∂s = Σ ∂L/∂out_i
                self.s.accumulate_grad(Array1::from(vec![grad.sum()]));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.s.backward_op() {
                op.backward();
            }
        }
    }
}

/// Matrix multiplication
///
/// Computes C = A @ B where:
/// - A is m×k (flattened to length m*k)
/// - B is k×n (flattened to length k*n)
/// - C is m×n (flattened to length m*n)
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let mut result_data = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0;
            for p in 0..k {
                acc += a.data()[i * k + p] * b.data()[p * n + j];
            }
            result_data[i * n + j] = acc;
        }
    }

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(result_data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            // ∂L/∂A = ∂L/∂C @ B^T
            // ∂L/∂B = A^T @ ∂L/∂C

            if self.a.requires_grad() {
                let mut grad_a = vec![0.0; self.m * self.k];
                for i in 0..self.m {
                    for p in 0..self.k {
                        let mut acc = 0.0;
                        for j in 0..self.n {
                            acc += grad_output[i * self.n + j] * self.b.data()[p * self.n + j];
                        }
                        grad_a[i * self.k + p] = acc;
                    }
                }
                self.a.accumulate_grad(Array1::from(grad_a));
            }

            if self.b.requires_grad() {
                let mut grad_b = vec![0.0; self.k * self.n];
                for p in 0..self.k {
                    for j in 0..self.n {
                        let mut acc = 0.0;
                        for i in 0..self.m {
                            acc += self.a.data()[i * self.k + p] * grad_output[i * self.n + j];
                        }
                        grad_b[p * self.n + j] = acc;
                    }
                }
                self.b.accumulate_grad(Array1::from(grad_b));
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
            if let Some(op) = self.b.backward_op() {
                op.backward();
            }
        }
    }
}

/// Add a bias vector to every row of a rows×cols matrix
pub fn add_bias(scores: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(scores.len(), rows * cols, "Scores size mismatch");
    assert_eq!(bias.len(), cols, "Bias size mismatch");

    let mut data = vec![0.0; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            data[i * cols + j] = scores.data()[i * cols + j] + bias.data()[j];
        }
    }

    let requires_grad = scores.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            scores: scores.clone(),
            bias: bias.clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    scores: Tensor,
    bias: Tensor,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.scores.requires_grad() {
                self.scores.accumulate_grad(grad.clone());
            }
            if self.bias.requires_grad() {
                // ∂L/∂bias_j = Σ_i ∂L/∂out_ij (column sums)
                let mut grad_bias = vec![0.0; self.cols];
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        grad_bias[j] += grad[i * self.cols + j];
                    }
                }
                self.bias.accumulate_grad(Array1::from(grad_bias));
            }

            if let Some(op) = self.scores.backward_op() {
                op.backward();
            }
            if let Some(op) = self.bias.backward_op() {
                op.backward();
            }
        }
    }
}

/// Row-wise softmax over a rows×cols matrix
///
/// Each row is shifted by its maximum before exponentiation for numerical
/// stability; every output row sums to 1.
pub fn softmax_rows(a: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(a.len(), rows * cols, "Softmax input size mismatch");

    let mut data = vec![0.0; rows * cols];
    for i in 0..rows {
        let base = i * cols;
        let max_val = (0..cols).fold(f32::NEG_INFINITY, |m, j| m.max(a.data()[base + j]));
        let exp_vals: Vec<f32> = (0..cols)
            .map(|j| (a.data()[base + j] - max_val).exp())
            .collect();
        let sum_exp: f32 = exp_vals.iter().sum();

        for (j, &exp_val) in exp_vals.iter().enumerate() {
            data[base + j] = exp_val / sum_exp;
        }
    }

    let requires_grad = a.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let output_clone = result.clone();
        let backward_op = Rc::new(SoftmaxRowsBackward {
            a: a.clone(),
            output: output_clone,
            rows,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SoftmaxRowsBackward {
    a: Tensor,
    output: Tensor,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for SoftmaxRowsBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // Per row: ∂L/∂x = y ⊙ (∂L/∂y - (y · ∂L/∂y))
                let mut grad_a = vec![0.0; self.rows * self.cols];
                for i in 0..self.rows {
                    let base = i * self.cols;
                    let mut dot = 0.0;
                    for j in 0..self.cols {
                        dot += self.output.data()[base + j] * grad_output[base + j];
                    }
                    for j in 0..self.cols {
                        grad_a[base + j] =
                            self.output.data()[base + j] * (grad_output[base + j] - dot);
                    }
                }
                self.a.accumulate_grad(Array1::from(grad_a));
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}
