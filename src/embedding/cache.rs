//! On-disk embedding cache chain
//!
//! Loading prefers, in order: the temporary cache file, the permanent cache
//! file, then a fresh build from the pretrained source filtered to the
//! vocabulary. Each cache source answers found/not-found; the chain ends in
//! the mandatory builder. A fresh build persists its result to the temporary
//! cache path before returning.
//!
//! Cache files are read-if-present, written-once; there is no cross-process
//! locking, so two processes racing on a first-time build can both write.

use std::collections::HashSet;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::info;

use super::EmbeddingTable;
use crate::error::{Error, Result};
use crate::io::{safe_create, safe_open};

/// One stop on the cache-fallback chain
trait CacheSource {
    fn label(&self) -> &'static str;
    fn load(&self) -> Result<Option<EmbeddingTable>>;
}

/// A bincode-serialized table at a filesystem path
struct FileCache<'a> {
    label: &'static str,
    path: &'a Path,
}

impl CacheSource for FileCache<'_> {
    fn label(&self) -> &'static str {
        self.label
    }

    fn load(&self) -> Result<Option<EmbeddingTable>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(safe_open(self.path)?);
        let table = bincode::deserialize_from(reader).map_err(|e| {
            Error::Serialization(format!(
                "failed to decode embedding cache {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(Some(table))
    }
}

fn write_cache(path: &Path, table: &EmbeddingTable) -> Result<()> {
    let writer = BufWriter::new(safe_create(path)?);
    bincode::serialize_into(writer, table).map_err(|e| {
        Error::Serialization(format!(
            "failed to encode embedding cache {}: {e}",
            path.display()
        ))
    })
}

/// Load the embedding table, preferring the temporary cache, then the
/// permanent cache, then a fresh build from `source`.
///
/// A fresh build requires `vocab` and writes the temporary cache before
/// returning; cache hits ignore `vocab` entirely.
pub fn load_embeddings(
    tmp_cache: &Path,
    cache: &Path,
    vocab: Option<&HashSet<String>>,
    source: &Path,
) -> Result<EmbeddingTable> {
    let tmp_source = FileCache { label: "tmp", path: tmp_cache };
    let restored_source = FileCache { label: "restored", path: cache };
    let sources: [&dyn CacheSource; 2] = [&tmp_source, &restored_source];
    for candidate in sources {
        if let Some(table) = candidate.load()? {
            info!(cache = candidate.label(), "loading word embeddings from cache");
            return Ok(table);
        }
    }

    let vocab = vocab
        .ok_or_else(|| Error::Config("to create fresh embeddings a vocab is needed".to_string()))?;
    info!(source = %source.display(), "creating word embeddings and saving to cache");
    let table = EmbeddingTable::from_pretrained_file(source, vocab)?;
    write_cache(tmp_cache, &table)?;
    Ok(table)
}
