//! Data utilities for a neural question-answering guesser
//!
//! This crate is the glue between a quiz-question dataset and a classifier
//! that maps text to answer labels, with auxiliary heads for answer type,
//! category, and gender. It provides:
//!
//! - **Embedding cache** ([`embedding`]): a word→vector table built from a
//!   pretrained GloVe-format file, filtered to a vocabulary, with a
//!   mean-vector unknown row and a temp/permanent/fresh-build cache chain.
//! - **Label registries** ([`labels`]): fixed class enumerations for the
//!   auxiliary heads, normalizing unseen values to `"missing"`.
//! - **Sequence formatting** ([`sequence`]): token→index conversion, length
//!   computation, and pad/truncate to a uniform width.
//! - **Batching** ([`batch`]): aligned six-array mini-batches with optional
//!   shuffling and final-batch padding.
//! - **Layer construction** ([`graph`]): affine layers with weight dropout,
//!   batch normalization, and parametric ReLU on a tape-based tensor, built
//!   through an explicit scope-aware [`graph::GraphBuilder`].
//!
//! # Example
//!
//! ```
//! use adivinar::batch::{BatchOptions, Batcher};
//! use adivinar::embedding::EmbeddingTable;
//! use adivinar::sequence;
//! use std::collections::HashSet;
//!
//! let vocab: HashSet<String> = ["the", "cat"].iter().map(|w| w.to_string()).collect();
//! let source = "the 0.1 0.2\ncat 0.3 0.4\n";
//! let table = EmbeddingTable::from_pretrained(source.as_bytes(), &vocab)?;
//!
//! let mut seqs = vec![
//!     sequence::embedding_indices(&["the", "cat", "sat"], &table),
//!     sequence::embedding_indices(&["cat"], &table),
//! ];
//! let lengths = sequence::sequence_lengths(&seqs);
//! let width = sequence::max_sequence_len(&seqs);
//! sequence::pad_truncate(&mut seqs, width, table.unk_index());
//!
//! let inputs = sequence::to_matrix(&seqs)?;
//! let labels = ndarray::array![0, 1];
//! let aux = ndarray::array![0, 0];
//! let batcher = Batcher::new(
//!     2, inputs, labels, lengths,
//!     aux.clone(), aux.clone(), aux,
//!     BatchOptions { shuffle: false, ..BatchOptions::default() },
//! )?;
//! assert_eq!(batcher.count(), 1);
//! # Ok::<(), adivinar::Error>(())
//! ```

pub mod batch;
pub mod config;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod io;
pub mod labels;
pub mod sequence;

pub use batch::{Batch, BatchOptions, Batcher};
pub use config::EmbeddingPaths;
pub use embedding::{load_embeddings, EmbeddingTable};
pub use error::{Error, Result};
pub use graph::{GraphBuilder, Tensor};
pub use labels::{ClassRegistry, ExampleProperties, LabelField};
