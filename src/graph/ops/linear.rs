//! Matrix multiplication and bias addition

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::Array1;

use crate::graph::{BackwardOp, Tensor};

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
pub(crate) fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut transposed = vec![0.0_f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            transposed[c * rows + r] = data[r * cols + c];
        }
    }
    transposed
}

/// Row-major matrix product: (m x k) · (k x n) -> (m x n)
pub(crate) fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0_f32; m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            for j in 0..n {
                out[i * n + j] += a_ip * b[p * n + j];
            }
        }
    }
    out
}

/// Matrix multiplication with explicit dimensions
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);

    let data = matmul_compute(
        a.data().as_slice().expect("contiguous tensor data"),
        b.data().as_slice().expect("contiguous tensor data"),
        m,
        k,
        n,
    );
    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatMulBackward {
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

struct MatMulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for MatMulBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            let grad = grad_output.as_slice().expect("contiguous grad");

            // ∂L/∂A = ∂L/∂C · Bᵀ
            if self.a.requires_grad() {
                let b_data = self.b.data().as_slice().expect("contiguous tensor data");
                let b_t = transpose(b_data, self.k, self.n);
                let grad_a = matmul_compute(grad, &b_t, self.m, self.n, self.k);
                self.a.accumulate_grad(Array1::from(grad_a));
            }

            // ∂L/∂B = Aᵀ · ∂L/∂C
            if self.b.requires_grad() {
                let a_data = self.a.data().as_slice().expect("contiguous tensor data");
                let a_t = transpose(a_data, self.m, self.k);
                let grad_b = matmul_compute(&a_t, grad, self.k, self.m, self.n);
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

/// Broadcast-add a bias row to every row of an (m x n) tensor
pub fn add_bias(x: &Tensor, bias: &Tensor, m: usize, n: usize) -> Tensor {
    debug_assert_eq!(x.len(), m * n);
    debug_assert_eq!(bias.len(), n);

    let bias_data = bias.data();
    let data: Vec<f32> = x
        .data()
        .iter()
        .enumerate()
        .map(|(idx, &v)| v + bias_data[idx % n])
        .collect();

    let requires_grad = x.requires_grad() || bias.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(AddBiasBackward {
            x: x.clone(),
            bias: bias.clone(),
            m,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct AddBiasBackward {
    x: Tensor,
    bias: Tensor,
    m: usize,
    n: usize,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for AddBiasBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                self.x.accumulate_grad(grad_output.clone());
            }

            // ∂L/∂b_j = Σ_i ∂L/∂out_ij
            if self.bias.requires_grad() {
                let mut grad_bias = vec![0.0_f32; self.n];
                for i in 0..self.m {
                    for j in 0..self.n {
                        grad_bias[j] += grad_output[i * self.n + j];
                    }
                }
                self.bias.accumulate_grad(Array1::from(grad_bias));
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.bias.backward_op() {
                op.backward();
            }
        }
    }
}
