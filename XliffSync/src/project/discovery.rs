//! Translation file discovery

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Find all translation files with extension `ext` below `dir`
///
/// Shorter paths come first, ties are broken lexicographically, so a catalog
/// in the project folder sorts before the ones in subfolders.
///
/// # Errors
/// Returns [`Error::WalkDirError`] if directory traversal fails.
pub fn find_translation_files<P: AsRef<Path>>(dir: P, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext)) {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| {
        let (a, b) = (a.as_os_str(), b.as_os_str());
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    });
    Ok(files)
}

/// Pick the generated base catalog among `files`
///
/// With `base_file` set, the file with that name (or relative path) is used.
/// Otherwise the first file named `*.g.<ext>`.
///
/// # Errors
/// Returns [`Error::BaseFileNotFound`] if no file qualifies.
pub fn resolve_base_file(files: &[PathBuf], dir: &Path, base_file: &str, ext: &str) -> Result<PathBuf> {
    let found = if base_file.is_empty() {
        let suffix = format!(".g.{ext}");
        files.iter().find(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
        })
    } else {
        files.iter().find(|path| {
            path.file_name().is_some_and(|name| name == base_file) || path.ends_with(base_file)
        })
    };

    found.cloned().ok_or_else(|| Error::BaseFileNotFound {
        dir: dir.to_path_buf(),
    })
}

/// Path of a new target catalog for `language` next to `base`
///
/// `App.g.xlf` becomes `App.fr-FR.xlf`, any other `App.xlf` becomes `App.fr-FR.xlf`.
pub fn new_target_path(base: &Path, language: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = stem.strip_suffix(".g").unwrap_or(&stem);
    let name = match base.extension() {
        Some(ext) => format!("{stem}.{language}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{language}"),
    };
    base.with_file_name(name)
}
