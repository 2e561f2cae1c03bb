//! Backward operation trait

/// A node on the gradient tape.
///
/// Implementations read the output gradient cell, accumulate gradients into
/// their parent tensors, and chain into the parents' own backward ops.
pub trait BackwardOp {
    fn backward(&self);
}
