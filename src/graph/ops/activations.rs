//! Activation autograd operations: relu, parametric relu

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::Array1;

use crate::graph::{BackwardOp, Tensor};

/// ReLU activation
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    let requires_grad = a.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ReluBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ReluBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * (a > 0)
                let grad_a = grad * &self.a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
                self.a.accumulate_grad(grad_a);
            }

            if let Some(op) = self.a.backward_op() {
                op.backward();
            }
        }
    }
}

/// Parametric ReLU over an (m x n) tensor with one leak coefficient per
/// output channel.
///
/// `prelu(x) = relu(x) + alpha_j * (x - |x|) * 0.5`, where the second term
/// is `alpha_j * x` for negative inputs and zero otherwise.
pub fn prelu(x: &Tensor, alpha: &Tensor, m: usize, n: usize) -> Tensor {
    debug_assert_eq!(x.len(), m * n);
    debug_assert_eq!(alpha.len(), n);

    let alpha_data = alpha.data();
    let data: Vec<f32> = x
        .data()
        .iter()
        .enumerate()
        .map(|(idx, &v)| v.max(0.0) + alpha_data[idx % n] * (v - v.abs()) * 0.5)
        .collect();

    let requires_grad = x.requires_grad() || alpha.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(PreluBackward {
            x: x.clone(),
            alpha: alpha.clone(),
            m,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct PreluBackward {
    x: Tensor,
    alpha: Tensor,
    m: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for PreluBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            let x_data = self.x.data();

            // ∂L/∂x_ij = ∂L/∂out_ij * (1 if x > 0 else alpha_j)
            if self.x.requires_grad() {
                let alpha_data = self.alpha.data();
                let grad_x: Vec<f32> = x_data
                    .iter()
                    .enumerate()
                    .map(|(idx, &v)| {
                        let slope = if v > 0.0 { 1.0 } else { alpha_data[idx % self.n] };
                        grad_output[idx] * slope
                    })
                    .collect();
                self.x.accumulate_grad(Array1::from(grad_x));
            }

            // ∂L/∂alpha_j = Σ_i ∂L/∂out_ij * min(x_ij, 0)
            if self.alpha.requires_grad() {
                let mut grad_alpha = vec![0.0_f32; self.n];
                for i in 0..self.m {
                    for j in 0..self.n {
                        let v = x_data[i * self.n + j];
                        grad_alpha[j] += grad_output[i * self.n + j] * v.min(0.0);
                    }
                }
                self.alpha.accumulate_grad(Array1::from(grad_alpha));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.alpha.backward_op() {
                op.backward();
            }
        }
    }
}
