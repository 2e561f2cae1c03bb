//! Tape-based graph construction for the guesser's layers
//!
//! Tensors carry flat `f32` buffers plus a gradient tape; shaped ops take
//! their dimensions explicitly. All variable creation goes through an
//! explicit [`GraphBuilder`] carrying the scope path, the variable registry,
//! and the reuse policy — there is no global graph state.
//!
//! # Example
//!
//! ```
//! use adivinar::graph::{affine_layer, GraphBuilder, LayerConfig, Tensor};
//!
//! let mut builder = GraphBuilder::with_seed(42);
//! let input = Tensor::from_vec(vec![0.5, -0.5, 1.0, 2.0, 0.0, -1.0], false);
//! let layer = affine_layer(&mut builder, "1", &input, 2, 4, &LayerConfig::default())?;
//! assert_eq!(layer.output.len(), 2 * 4);
//! # Ok::<(), adivinar::Error>(())
//! ```

mod backward;
mod layer;
pub mod ops;
mod scope;
mod tensor;

pub use backward::BackwardOp;
pub use layer::{
    affine_layer, parametric_relu, relu_activation, ActivationFn, AffineLayer, LayerConfig,
};
pub use scope::{GraphBuilder, Init, ReusePolicy};
pub use tensor::Tensor;

/// Perform a backward pass from a tensor.
///
/// With no explicit output gradient the pass starts from ones, the usual
/// seed for a scalar loss.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        let ones = ndarray::Array1::ones(tensor.len());
        tensor.set_grad(ones);
    }

    if let Some(op) = tensor.backward_op() {
        op.backward();
    }
}
