//! Word embedding table keyed by a restricted vocabulary
//!
//! The table is built once per run from a plain-text pretrained embedding
//! file (one token per line, `<token> <d1> ... <dN>`), keeping only the rows
//! whose token appears in the requested vocabulary. A synthetic unknown row,
//! the column-wise mean of every kept vector, is appended last; all lookup
//! misses resolve to it.

mod cache;

pub use cache::load_embeddings;

use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::safe_open;

/// Embedding row index type
pub type RowIndex = u32;

/// Fixed-dimension embedding vectors plus the token→row mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingTable {
    vectors: Array2<f32>,
    index: HashMap<String, RowIndex>,
}

impl EmbeddingTable {
    /// Build a table from a pretrained embedding reader, filtered to `vocab`.
    ///
    /// Rows are assigned in file order; the unknown row is appended last.
    /// Tokens in `vocab` that never appear in the source simply end up
    /// resolving to the unknown row.
    pub fn from_pretrained<R: BufRead>(reader: R, vocab: &HashSet<String>) -> Result<Self> {
        let mut index = HashMap::new();
        let mut flat: Vec<f32> = Vec::new();
        let mut dim: Option<usize> = None;
        let mut kept: RowIndex = 0;

        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(token) = parts.next() else {
                continue;
            };
            if !vocab.contains(token) {
                continue;
            }
            let row: Vec<f32> = parts
                .map(|v| {
                    v.parse::<f32>().map_err(|e| {
                        Error::Parse(format!("bad embedding value {v:?} for {token:?}: {e}"))
                    })
                })
                .collect::<Result<_>>()?;
            match dim {
                None => dim = Some(row.len()),
                Some(d) if d != row.len() => {
                    return Err(Error::Parse(format!(
                        "inconsistent embedding width for {token:?}: expected {d}, got {}",
                        row.len()
                    )));
                }
                Some(_) => {}
            }
            flat.extend_from_slice(&row);
            index.insert(token.to_string(), kept);
            kept += 1;
        }

        let dim = dim.ok_or_else(|| {
            Error::Config("no vocabulary tokens found in the embedding source".to_string())
        })?;
        let known = Array2::from_shape_vec((kept as usize, dim), flat)
            .map_err(|e| Error::Parse(format!("embedding shape error: {e}")))?;
        let mean = known
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::Config("cannot average an empty embedding set".to_string()))?;

        let mut vectors = Array2::zeros((kept as usize + 1, dim));
        vectors
            .slice_mut(ndarray::s![..kept as usize, ..])
            .assign(&known);
        vectors.row_mut(kept as usize).assign(&mean);

        Ok(Self { vectors, index })
    }

    /// Build a table from a pretrained embedding file on disk
    pub fn from_pretrained_file(path: impl AsRef<Path>, vocab: &HashSet<String>) -> Result<Self> {
        let reader = BufReader::new(safe_open(path)?);
        Self::from_pretrained(reader, vocab)
    }

    /// Row index for a token, falling back to the unknown row
    pub fn index_of(&self, token: &str) -> RowIndex {
        self.index.get(token).copied().unwrap_or_else(|| self.unk_index())
    }

    /// Row index of the synthetic unknown vector (always the last row)
    pub fn unk_index(&self) -> RowIndex {
        (self.vectors.nrows() - 1) as RowIndex
    }

    /// Number of known tokens (excludes the unknown row)
    pub fn known_len(&self) -> usize {
        self.vectors.nrows() - 1
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    /// One embedding row
    pub fn row(&self, i: RowIndex) -> ArrayView1<'_, f32> {
        self.vectors.row(i as usize)
    }

    /// The full vector matrix, unknown row included
    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }
}
