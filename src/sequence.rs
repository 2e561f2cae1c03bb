//! Token sequences as embedding-row index sequences
//!
//! Converts token lists to index sequences against an [`EmbeddingTable`],
//! computes per-example lengths, and normalizes every sequence to a uniform
//! width by right-truncation or right-padding.

use ndarray::{Array1, Array2};

use crate::embedding::{EmbeddingTable, RowIndex};
use crate::error::{Error, Result};

/// Map tokens to embedding row indices; unknown tokens map to the unknown row
pub fn embedding_indices<S: AsRef<str>>(words: &[S], table: &EmbeddingTable) -> Vec<RowIndex> {
    words.iter().map(|w| table.index_of(w.as_ref())).collect()
}

/// Maximum sequence length across a collection (0 when empty)
pub fn max_sequence_len(seqs: &[Vec<RowIndex>]) -> usize {
    seqs.iter().map(Vec::len).max().unwrap_or(0)
}

/// Per-sequence lengths with a floor of one token
pub fn sequence_lengths(seqs: &[Vec<RowIndex>]) -> Array1<u32> {
    seqs.iter().map(|s| s.len().max(1) as u32).collect()
}

/// Normalize every sequence to exactly `max_len` elements in place.
///
/// Longer sequences are truncated from the right; shorter ones are
/// right-padded with `pad_index` (conventionally the unknown row, so padding
/// contributes nothing). Idempotent for a fixed `max_len` and `pad_index`.
pub fn pad_truncate(seqs: &mut [Vec<RowIndex>], max_len: usize, pad_index: RowIndex) {
    for seq in seqs {
        seq.resize(max_len, pad_index);
    }
}

/// Stack uniform-width sequences into a matrix with one row per example
pub fn to_matrix(seqs: &[Vec<RowIndex>]) -> Result<Array2<RowIndex>> {
    let width = seqs.first().map(Vec::len).unwrap_or(0);
    if seqs.iter().any(|s| s.len() != width) {
        return Err(Error::Validation(
            "sequences must share a uniform width; run pad_truncate first".to_string(),
        ));
    }
    let flat: Vec<RowIndex> = seqs.iter().flatten().copied().collect();
    Array2::from_shape_vec((seqs.len(), width), flat)
        .map_err(|e| Error::Validation(format!("sequence matrix shape error: {e}")))
}
