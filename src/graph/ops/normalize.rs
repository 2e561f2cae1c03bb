//! Batch normalization over the leading dimension

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::Array1;

use crate::graph::{BackwardOp, Tensor};

/// Batch Normalization over an (m x n) tensor.
///
/// Each of the n columns is normalized to mean=0, variance=1 using batch
/// statistics, then scaled by `gamma` and shifted by `beta` (both length n,
/// learnable center/scale):
/// `bn(x)_ij = gamma_j * (x_ij - mean_j) / sqrt(var_j + epsilon) + beta_j`
pub fn batch_norm(
    x: &Tensor,
    gamma: &Tensor,
    beta: &Tensor,
    m: usize,
    n: usize,
    epsilon: f32,
) -> Tensor {
    debug_assert_eq!(x.len(), m * n);
    debug_assert_eq!(gamma.len(), n);
    debug_assert_eq!(beta.len(), n);

    let x_data = x.data();
    let count = m as f32;

    let mut mean = vec![0.0_f32; n];
    for i in 0..m {
        for j in 0..n {
            mean[j] += x_data[i * n + j];
        }
    }
    for v in &mut mean {
        *v /= count;
    }

    let mut variance = vec![0.0_f32; n];
    for i in 0..m {
        for j in 0..n {
            let d = x_data[i * n + j] - mean[j];
            variance[j] += d * d;
        }
    }
    let std: Vec<f32> = variance.iter().map(|v| (v / count + epsilon).sqrt()).collect();

    let mut normalized = vec![0.0_f32; m * n];
    for i in 0..m {
        for j in 0..n {
            normalized[i * n + j] = (x_data[i * n + j] - mean[j]) / std[j];
        }
    }
    let normalized = Array1::from(normalized);

    let gamma_data = gamma.data();
    let beta_data = beta.data();
    let data: Array1<f32> = normalized
        .iter()
        .enumerate()
        .map(|(idx, &v)| gamma_data[idx % n] * v + beta_data[idx % n])
        .collect();

    let requires_grad = x.requires_grad() || gamma.requires_grad() || beta.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(BatchNormBackward {
            x: x.clone(),
            gamma: gamma.clone(),
            beta: beta.clone(),
            normalized,
            std,
            m,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct BatchNormBackward {
    x: Tensor,
    gamma: Tensor,
    beta: Tensor,
    normalized: Array1<f32>,
    std: Vec<f32>,
    m: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for BatchNormBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            let (m, n) = (self.m, self.n);
            let count = m as f32;

            // ∂L/∂beta_j = Σ_i ∂L/∂y_ij
            if self.beta.requires_grad() {
                let mut grad_beta = vec![0.0_f32; n];
                for i in 0..m {
                    for j in 0..n {
                        grad_beta[j] += grad_output[i * n + j];
                    }
                }
                self.beta.accumulate_grad(Array1::from(grad_beta));
            }

            // ∂L/∂gamma_j = Σ_i ∂L/∂y_ij * x̂_ij
            if self.gamma.requires_grad() {
                let mut grad_gamma = vec![0.0_f32; n];
                for i in 0..m {
                    for j in 0..n {
                        grad_gamma[j] += grad_output[i * n + j] * self.normalized[i * n + j];
                    }
                }
                self.gamma.accumulate_grad(Array1::from(grad_gamma));
            }

            // ∂L/∂x follows the standard per-column batch norm gradient:
            // ∂L/∂x_ij = (g_ij - mean_i(g) - x̂_ij * mean_i(g * x̂)) / std_j
            // with g = ∂L/∂y * gamma
            if self.x.requires_grad() {
                let gamma_data = self.gamma.data();
                let mut sum_g = vec![0.0_f32; n];
                let mut sum_g_norm = vec![0.0_f32; n];
                for i in 0..m {
                    for j in 0..n {
                        let g = grad_output[i * n + j] * gamma_data[j];
                        sum_g[j] += g;
                        sum_g_norm[j] += g * self.normalized[i * n + j];
                    }
                }

                let mut grad_x = vec![0.0_f32; m * n];
                for i in 0..m {
                    for j in 0..n {
                        let idx = i * n + j;
                        let g = grad_output[idx] * gamma_data[j];
                        grad_x[idx] = (g
                            - sum_g[j] / count
                            - self.normalized[idx] * sum_g_norm[j] / count)
                            / self.std[j];
                    }
                }
                self.x.accumulate_grad(Array1::from(grad_x));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
        }
    }
}
