//! Scoped file-open helpers
//!
//! The embedding cache writes into directories that may not exist yet on a
//! fresh checkout, so creation goes through [`safe_create`], which makes the
//! parent directories first.

use std::fs::File;
use std::path::Path;

use crate::error::Result;

/// Open a file for reading
pub fn safe_open(path: impl AsRef<Path>) -> Result<File> {
    Ok(File::open(path.as_ref())?)
}

/// Create a file for writing, creating parent directories as needed
pub fn safe_create(path: impl AsRef<Path>) -> Result<File> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_safe_create_makes_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.bin");

        let mut file = safe_create(&path).unwrap();
        file.write_all(b"payload").unwrap();

        let mut content = String::new();
        safe_open(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "payload");
    }

    #[test]
    fn test_safe_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = safe_open(dir.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
