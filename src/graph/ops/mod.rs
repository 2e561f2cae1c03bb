//! Autograd operations used by the layer builder

mod activations;
mod dropout;
mod linear;
mod normalize;

pub use activations::{prelu, relu};
pub use dropout::dropout;
pub use linear::{add_bias, matmul};
pub use normalize::batch_norm;
