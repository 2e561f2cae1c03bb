//! Inverted dropout

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;

use crate::graph::{BackwardOp, Tensor};

/// Zero each element with probability `drop_prob`, scaling survivors by
/// `1 / (1 - drop_prob)` so the expected value is unchanged.
///
/// The caller guarantees `drop_prob` is in `[0, 1)`.
pub fn dropout(x: &Tensor, drop_prob: f32, rng: &mut StdRng) -> Tensor {
    let keep_prob = 1.0 - drop_prob;
    let mask: Array1<f32> = x
        .data()
        .iter()
        .map(|_| {
            if rng.gen::<f32>() < keep_prob {
                1.0 / keep_prob
            } else {
                0.0
            }
        })
        .collect();

    let data = x.data() * &mask;
    let requires_grad = x.requires_grad();
    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        let backward_op = Rc::new(DropoutBackward {
            x: x.clone(),
            mask,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct DropoutBackward {
    x: Tensor,
    mask: Array1<f32>,
    result_grad: Rc<RefCell<Option<Array1<f32>>>>,
}

impl BackwardOp for DropoutBackward {
    fn backward(&self) {
        if let Some(grad_output) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                // the same scaled mask gates the gradient
                self.x.accumulate_grad(grad_output * &self.mask);
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::backward;
    use ndarray::array;
    use rand::SeedableRng;

    #[test]
    fn test_zero_drop_prob_is_identity() {
        let x = Tensor::from_vec(vec![1.0, -2.0, 3.0], false);
        let mut rng = StdRng::seed_from_u64(7);

        let out = dropout(&x, 0.0, &mut rng);
        assert_eq!(out.data(), x.data());
    }

    #[test]
    fn test_survivors_are_scaled() {
        let x = Tensor::from_vec(vec![2.0; 1000], false);
        let mut rng = StdRng::seed_from_u64(7);

        let out = dropout(&x, 0.5, &mut rng);
        for &v in out.data() {
            assert!(v == 0.0 || v == 4.0);
        }
        let dropped = out.data().iter().filter(|&&v| v == 0.0).count();
        assert!(dropped > 300 && dropped < 700);
    }

    #[test]
    fn test_backward_gates_gradient_with_same_mask() {
        let x = Tensor::from_vec(vec![1.0; 8], true);
        let mut rng = StdRng::seed_from_u64(42);

        let mut out = dropout(&x, 0.5, &mut rng);
        backward(&mut out, Some(array![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]));

        let grad = x.grad().unwrap();
        for (o, g) in out.data().iter().zip(grad.iter()) {
            // forward output and gradient share the mask pattern
            assert_eq!(*o == 0.0, *g == 0.0);
        }
    }
}
