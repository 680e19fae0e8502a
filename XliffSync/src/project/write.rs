//! Atomic write-back of catalogs

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Replace `path` with `content` through a temporary file in the same directory
///
/// Readers see either the old or the new file, never a partial one.
///
/// # Errors
/// Returns an error if the temporary file cannot be written or moved into place.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|err| Error::PersistError {
        path: path.to_path_buf(),
        message: err.error.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("App.fr-FR.xlf");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("App.xlf");
        assert!(write_atomic(&path, "x").is_err());
    }
}
