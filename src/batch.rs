//! Aligned mini-batches over the six parallel training arrays
//!
//! A [`Batcher`] walks non-overlapping `batch_size` windows over the
//! (optionally shuffled) example order, yielding aligned six-field batches.
//! The iterator is lazy, finite, single-pass, and non-restartable.

use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::embedding::RowIndex;
use crate::error::{Error, Result};

/// Batching behavior knobs
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Zero-pad the final undersized window up to `batch_size` instead of
    /// dropping it
    pub pad: bool,
    /// Apply one random permutation to all six arrays before windowing
    pub shuffle: bool,
    /// Fixed shuffle seed; `None` draws from thread randomness
    pub seed: Option<u64>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { pad: false, shuffle: true, seed: None }
    }
}

/// One aligned slice across the six training arrays
#[derive(Debug, Clone)]
pub struct Batch {
    pub inputs: Array2<RowIndex>,
    pub targets: Array1<u32>,
    pub lengths: Array1<u32>,
    pub answer_types: Array1<u32>,
    pub categories: Array1<u32>,
    pub genders: Array1<u32>,
}

impl Batch {
    /// Leading dimension shared by all six fields
    pub fn size(&self) -> usize {
        self.inputs.nrows()
    }
}

/// Lazy iterator over aligned batches
#[derive(Debug)]
pub struct Batcher {
    inputs: Array2<RowIndex>,
    targets: Array1<u32>,
    lengths: Array1<u32>,
    answer_types: Array1<u32>,
    categories: Array1<u32>,
    genders: Array1<u32>,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    pad: bool,
}

impl Batcher {
    /// Validate the arrays and fix the iteration order up front.
    ///
    /// All six arrays must share the leading dimension; with `shuffle` set a
    /// single permutation is drawn here and applied consistently to every
    /// batch.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        batch_size: usize,
        inputs: Array2<RowIndex>,
        targets: Array1<u32>,
        lengths: Array1<u32>,
        answer_types: Array1<u32>,
        categories: Array1<u32>,
        genders: Array1<u32>,
        options: BatchOptions,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Validation("batch size must be positive".to_string()));
        }
        let n = inputs.nrows();
        if targets.len() != n {
            return Err(Error::Validation(format!(
                "inputs and targets must share the leading dimension: {n} vs {}",
                targets.len()
            )));
        }
        for (name, len) in [
            ("lengths", lengths.len()),
            ("answer_types", answer_types.len()),
            ("categories", categories.len()),
            ("genders", genders.len()),
        ] {
            if len != n {
                return Err(Error::Validation(format!(
                    "{name} must share the leading dimension: {n} vs {len}"
                )));
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        if options.shuffle {
            match options.seed {
                Some(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => order.shuffle(&mut rand::thread_rng()),
            }
        }

        Ok(Self {
            inputs,
            targets,
            lengths,
            answer_types,
            categories,
            genders,
            order,
            cursor: 0,
            batch_size,
            pad: options.pad,
        })
    }

    fn gather(&self, window: &[usize], padded: bool) -> Batch {
        let rows = if padded { self.batch_size } else { window.len() };

        let mut inputs = Array2::zeros((rows, self.inputs.ncols()));
        inputs
            .slice_mut(s![..window.len(), ..])
            .assign(&self.inputs.select(Axis(0), window));

        let gather1 = |src: &Array1<u32>| {
            let mut out = Array1::zeros(rows);
            out.slice_mut(s![..window.len()])
                .assign(&src.select(Axis(0), window));
            out
        };

        Batch {
            inputs,
            targets: gather1(&self.targets),
            lengths: gather1(&self.lengths),
            answer_types: gather1(&self.answer_types),
            categories: gather1(&self.categories),
            genders: gather1(&self.genders),
        }
    }
}

impl Iterator for Batcher {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let window = self.order[self.cursor..end].to_vec();
        self.cursor = end;

        if window.len() == self.batch_size {
            Some(self.gather(&window, false))
        } else if self.pad {
            Some(self.gather(&window, true))
        } else {
            // undersized final window without padding: end the sequence
            self.cursor = self.order.len();
            None
        }
    }
}
