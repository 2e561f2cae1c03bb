//! Path configuration for the embedding pipeline
//!
//! Paths default to the conventional on-disk layout of the guesser data
//! directory and can be overridden from a YAML file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::embedding::{load_embeddings, EmbeddingTable};
use crate::error::{Error, Result};

/// Conventional location of the pretrained GloVe embedding source
pub const DEFAULT_EMBEDDING_SOURCE: &str = "data/external/deep/glove.6B.300d.txt";

/// Paths used by the embedding cache chain
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingPaths {
    /// Pretrained plain-text embedding file
    pub source: PathBuf,
    /// Per-run temporary cache, written after a fresh build
    pub tmp_cache: PathBuf,
    /// Permanent cache restored across runs
    pub cache: PathBuf,
}

impl Default for EmbeddingPaths {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_EMBEDDING_SOURCE),
            tmp_cache: PathBuf::from("data/tmp/guesser_embeddings.bin"),
            cache: PathBuf::from("data/cache/guesser_embeddings.bin"),
        }
    }
}

impl EmbeddingPaths {
    /// Load path configuration from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse YAML config: {e}")))
    }

    /// Load the embedding table through the cache chain for these paths
    pub fn load(&self, vocab: Option<&HashSet<String>>) -> Result<EmbeddingTable> {
        load_embeddings(&self.tmp_cache, &self.cache, vocab, &self.source)
    }
}
