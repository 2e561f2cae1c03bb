//! Affine layer construction
//!
//! Builds `y = activation(batch_norm?(x·W + b))` inside a named scope,
//! optionally with dropout on the weight matrix. This constructs graph
//! nodes only; running a training step is the caller's business.

use super::ops;
use super::scope::{GraphBuilder, Init};
use super::Tensor;
use crate::error::{Error, Result};

/// Epsilon used inside batch normalization
const BN_EPSILON: f32 = 1e-3;

/// Activation applied after the affine transform.
///
/// Takes the builder so parametric activations can register their own
/// variables under the layer scope, plus the (rows, channels) dimensions of
/// its input.
pub type ActivationFn = fn(&mut GraphBuilder, &Tensor, usize, usize) -> Result<Tensor>;

/// ReLU as a layer activation
pub fn relu_activation(
    _builder: &mut GraphBuilder,
    x: &Tensor,
    _rows: usize,
    _channels: usize,
) -> Result<Tensor> {
    Ok(ops::relu(x))
}

/// Parametric ReLU with one learnable leak coefficient per output channel,
/// initialized to zero
pub fn parametric_relu(
    builder: &mut GraphBuilder,
    x: &Tensor,
    rows: usize,
    channels: usize,
) -> Result<Tensor> {
    let alpha = builder.variable("alpha", channels, Init::Constant(0.0))?;
    Ok(ops::prelu(x, &alpha, rows, channels))
}

/// Options for one affine layer
#[derive(Default)]
pub struct LayerConfig {
    /// Input width; defaults to the trailing dimension of the input tensor
    pub n_in: Option<usize>,
    /// Dropout probability applied to the weight matrix, not the activations
    pub dropout: Option<f32>,
    /// Apply batch normalization before the activation
    pub batch_norm: bool,
    /// Training-mode flag, required whenever `batch_norm` is set
    pub training: Option<bool>,
    /// Activation applied last; `None` returns the raw affine output
    pub activation: Option<ActivationFn>,
}

/// An affine layer's output and its variables
pub struct AffineLayer {
    pub output: Tensor,
    pub weights: Tensor,
    pub bias: Tensor,
}

impl std::fmt::Debug for AffineLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffineLayer").finish_non_exhaustive()
    }
}

/// Build one affine layer inside scope `layer<postfix>`.
///
/// `input` is an `(batch x n_in)` tensor; the output is `(batch x n_out)`.
/// `w` has shape `(n_in, n_out)` and `b` has shape `(n_out)`.
pub fn affine_layer(
    builder: &mut GraphBuilder,
    postfix: &str,
    input: &Tensor,
    batch: usize,
    n_out: usize,
    config: &LayerConfig,
) -> Result<AffineLayer> {
    if config.batch_norm && config.training.is_none() {
        return Err(Error::Config(
            "if using batch norm then passing a training flag is required".to_string(),
        ));
    }
    if let Some(prob) = config.dropout {
        if !(0.0..1.0).contains(&prob) {
            return Err(Error::Validation(format!(
                "dropout probability must be in [0, 1), got {prob}"
            )));
        }
    }
    if batch == 0 || input.len() % batch != 0 {
        return Err(Error::Validation(format!(
            "input of {} elements does not divide into {batch} rows",
            input.len()
        )));
    }

    let n_in = config.n_in.unwrap_or(input.len() / batch);
    if input.len() != batch * n_in {
        return Err(Error::Validation(format!(
            "input of {} elements is not {batch} x {n_in}",
            input.len()
        )));
    }

    let scope_name = format!("layer{postfix}");
    builder.scope(&scope_name, |builder| {
        let weights = builder.variable(
            "w",
            n_in * n_out,
            Init::XavierUniform { fan_in: n_in, fan_out: n_out },
        )?;
        let bias = builder.variable("b", n_out, Init::Zeros)?;

        let active_weights = match config.dropout {
            Some(prob) => ops::dropout(&weights, prob, builder.rng()),
            None => weights.clone(),
        };

        let mut out = ops::matmul(input, &active_weights, batch, n_in, n_out);
        out = ops::add_bias(&out, &bias, batch, n_out);

        if config.batch_norm {
            let (gamma, beta) = builder.scope("bn", |builder| {
                let gamma = builder.variable("gamma", n_out, Init::Constant(1.0))?;
                let beta = builder.variable("beta", n_out, Init::Zeros)?;
                Ok::<_, Error>((gamma, beta))
            })?;
            out = ops::batch_norm(&out, &gamma, &beta, batch, n_out, BN_EPSILON);
        }

        if let Some(activation) = config.activation {
            out = activation(builder, &out, batch, n_out)?;
        }

        Ok(AffineLayer { output: out, weights, bias })
    })
}
