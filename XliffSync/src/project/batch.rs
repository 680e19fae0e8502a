//! Batch operations over the catalogs of a project folder
//!
//! A [`Project`] is the generated base catalog plus every other catalog found
//! below the project folder. Batch operations never stop at a failing file: the
//! failure is logged, recorded in the [`BatchReport`] and the next file is processed.

use indexmap::IndexMap;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::discovery::{find_translation_files, new_target_path, resolve_base_file};
use super::write::write_atomic;
use crate::check::{CheckOptions, CheckReport, check_document};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::formats::xliff::XliffDocument;
use crate::sync::{SyncStats, new_target, synchronize_documents};

/// Progress of a batch operation
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
    pub current_file: Option<String>,
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Synchronized with the base catalog
    Synced { path: PathBuf, stats: SyncStats },
    /// New target catalog written
    Created {
        path: PathBuf,
        language: String,
        stats: SyncStats,
    },
    /// Overwritten with the catalog of its master language
    Copied { path: PathBuf, master: PathBuf },
    Checked {
        path: PathBuf,
        report: CheckReport,
        written: bool,
    },
    Imported { path: PathBuf, count: usize },
    Skipped { path: PathBuf, reason: String },
    Failed { path: PathBuf, error: Error },
}

impl FileOutcome {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Synced { path, .. }
            | FileOutcome::Created { path, .. }
            | FileOutcome::Copied { path, .. }
            | FileOutcome::Checked { path, .. }
            | FileOutcome::Imported { path, .. }
            | FileOutcome::Skipped { path, .. }
            | FileOutcome::Failed { path, .. } => path,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }
}

/// Result of a batch operation
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !o.is_failure() && !matches!(o, FileOutcome::Skipped { .. }))
            .count()
    }

    #[must_use]
    pub fn fail_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Check results of this batch.
    pub fn checks(&self) -> impl Iterator<Item = (&Path, &CheckReport)> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Checked { path, report, .. } => Some((path.as_path(), report)),
            _ => None,
        })
    }

    pub(crate) fn push(&mut self, outcome: FileOutcome) {
        if let FileOutcome::Failed { path, error } = &outcome {
            warn!(path = %path.display(), %error, "failed");
        }
        self.outcomes.push(outcome);
    }
}

/// The catalogs of one project folder.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    settings: Settings,
    base: PathBuf,
    targets: Vec<PathBuf>,
}

impl Project {
    /// Discover the catalogs below `root`
    ///
    /// # Errors
    /// Returns an error if the folder cannot be walked or has no base catalog.
    pub fn open<P: AsRef<Path>>(root: P, settings: Settings) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let files = find_translation_files(&root, &settings.file_type)?;
        let base = resolve_base_file(&files, &root, &settings.base_file, &settings.file_type)?;
        let targets = files.into_iter().filter(|path| *path != base).collect();
        Ok(Project {
            root,
            settings,
            base,
            targets,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn base_file(&self) -> &Path {
        &self.base
    }

    #[must_use]
    pub fn targets(&self) -> &[PathBuf] {
        &self.targets
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn load(&self, path: &Path) -> Result<XliffDocument> {
        XliffDocument::read(path, self.settings.document())
    }

    fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }

    // ==================== Sync ====================

    /// Synchronize every target catalog with the base catalog
    ///
    /// With `matchingOriginalOnly`, targets of another `original` are skipped.
    /// With equivalent languages enabled, catalogs of an equivalent language are
    /// overwritten with their synchronized master catalog afterwards. The
    /// automatic checks run last.
    ///
    /// # Errors
    /// Returns an error only if the base catalog cannot be loaded; per-file
    /// failures are part of the report.
    pub fn sync_all<F>(&self, progress: F) -> Result<BatchReport>
    where
        F: Fn(&BatchProgress),
    {
        let source = self.load(&self.base)?;
        let source_original = source.original().map(str::to_string);
        let equivalents = self.equivalent_patterns()?;

        let mut report = BatchReport::default();
        let mut masters: IndexMap<String, PathBuf> = IndexMap::new();
        let mut slaves: Vec<(String, String, PathBuf)> = Vec::new();

        let total = self.targets.len();
        for (index, path) in self.targets.iter().enumerate() {
            progress(&BatchProgress {
                current: index + 1,
                total,
                current_file: Some(self.display_name(path)),
            });

            let target = match self.load(path) {
                Ok(target) => target,
                Err(error) => {
                    report.push(FileOutcome::Failed {
                        path: path.clone(),
                        error,
                    });
                    continue;
                }
            };

            if self.settings.matching_original_only
                && target.original().map(str::to_string) != source_original
            {
                report.push(FileOutcome::Skipped {
                    path: path.clone(),
                    reason: "original differs from the base catalog".to_string(),
                });
                continue;
            }

            if let Some(language) = target.target_language() {
                if self.settings.equivalent_languages.contains_key(&language) {
                    masters.insert(language, path.clone());
                } else if let Some(master) = master_language(&equivalents, &language) {
                    slaves.push((master.to_string(), language, path.clone()));
                    continue;
                }
            }

            report.push(self.write_synced(&source, &target, path));
        }

        for (master, language, path) in slaves {
            let Some(master_path) = masters.get(&master) else {
                report.push(FileOutcome::Skipped {
                    path,
                    reason: format!("no catalog for master language {master}"),
                });
                continue;
            };
            report.push(self.copy_from_master(master_path, &language, path));
        }

        info!(
            targets = total,
            synced = report.success_count(),
            failed = report.fail_count(),
            "project synchronized"
        );
        self.auto_check(&mut report, None);
        Ok(report)
    }

    /// Synchronize one target catalog, or all of them when `target` is the base.
    ///
    /// # Errors
    /// Returns an error if the base catalog cannot be loaded.
    pub fn sync_file<F>(&self, target: &Path, progress: F) -> Result<BatchReport>
    where
        F: Fn(&BatchProgress),
    {
        if same_file(target, &self.base) {
            return self.sync_all(progress);
        }

        let source = self.load(&self.base)?;
        let mut report = BatchReport::default();
        progress(&BatchProgress {
            current: 1,
            total: 1,
            current_file: Some(self.display_name(target)),
        });
        match self.load(target) {
            Ok(document) => report.push(self.write_synced(&source, &document, target)),
            Err(error) => report.push(FileOutcome::Failed {
                path: target.to_path_buf(),
                error,
            }),
        }
        self.auto_check(&mut report, Some(target));
        Ok(report)
    }

    /// Create a target catalog per language next to the base catalog
    ///
    /// Languages that already have a catalog get it synchronized instead.
    ///
    /// # Errors
    /// Returns [`Error::NoTargetSpecified`] without languages, or an error if the
    /// base catalog cannot be loaded.
    pub fn create_target_files<F>(&self, languages: &[String], progress: F) -> Result<BatchReport>
    where
        F: Fn(&BatchProgress),
    {
        if languages.is_empty() {
            return Err(Error::NoTargetSpecified);
        }
        let source = self.load(&self.base)?;
        let mut report = BatchReport::default();

        for (index, language) in languages.iter().enumerate() {
            let path = new_target_path(&self.base, language);
            progress(&BatchProgress {
                current: index + 1,
                total: languages.len(),
                current_file: Some(self.display_name(&path)),
            });

            if path.exists() {
                match self.load(&path) {
                    Ok(document) => report.push(self.write_synced(&source, &document, &path)),
                    Err(error) => report.push(FileOutcome::Failed { path, error }),
                }
                continue;
            }

            let target = new_target(&source, language);
            let (merged, stats) = synchronize_documents(&source, &target, &self.settings.sync());
            let outcome = match merged.extract().and_then(|content| write_atomic(&path, &content)) {
                Ok(()) => {
                    info!(path = %path.display(), %language, "target created");
                    FileOutcome::Created {
                        path,
                        language: language.clone(),
                        stats,
                    }
                }
                Err(error) => FileOutcome::Failed { path, error },
            };
            report.push(outcome);
        }
        Ok(report)
    }

    fn write_synced(&self, source: &XliffDocument, target: &XliffDocument, path: &Path) -> FileOutcome {
        let (merged, stats) = synchronize_documents(source, target, &self.settings.sync());
        match merged.extract().and_then(|content| write_atomic(path, &content)) {
            Ok(()) => {
                info!(path = %path.display(), missing = stats.missing, "synchronized");
                FileOutcome::Synced {
                    path: path.to_path_buf(),
                    stats,
                }
            }
            Err(error) => FileOutcome::Failed {
                path: path.to_path_buf(),
                error,
            },
        }
    }

    fn copy_from_master(&self, master: &Path, language: &str, path: PathBuf) -> FileOutcome {
        let copied = self.load(master).and_then(|mut document| {
            document.set_target_language(language);
            write_atomic(&path, &document.extract()?)
        });
        match copied {
            Ok(()) => {
                info!(path = %path.display(), master = %master.display(), "copied from master language");
                FileOutcome::Copied {
                    path,
                    master: master.to_path_buf(),
                }
            }
            Err(error) => FileOutcome::Failed { path, error },
        }
    }

    fn equivalent_patterns(&self) -> Result<Vec<(Regex, String)>> {
        if !self.settings.equivalent_languages_enabled {
            return Ok(Vec::new());
        }
        self.settings
            .equivalent_languages
            .iter()
            .map(|(master, pattern)| Ok((Regex::new(pattern)?, master.clone())))
            .collect()
    }

    // ==================== Check ====================

    /// Run the checker on every target catalog, or only on `only`
    ///
    /// Catalogs with detected or resolved problems are written back.
    pub fn check(&self, options: &CheckOptions, only: Option<&Path>) -> BatchReport {
        let mut report = BatchReport::default();
        let targets: Vec<&Path> = match only {
            Some(path) => vec![path],
            None => self.targets.iter().map(PathBuf::as_path).collect(),
        };
        for path in targets {
            report.push(self.check_file(options, path));
        }
        report
    }

    fn check_file(&self, options: &CheckOptions, path: &Path) -> FileOutcome {
        let checked = self.load(path).and_then(|mut document| {
            let report = check_document(&mut document, options);
            let written = report.needs_write();
            if written {
                write_atomic(path, &document.extract()?)?;
            }
            Ok((report, written))
        });
        match checked {
            Ok((report, written)) => {
                info!(
                    path = %path.display(),
                    missing = report.missing_count,
                    needs_work = report.needs_work_count,
                    resolved = report.resolved_count,
                    "checked"
                );
                FileOutcome::Checked {
                    path: path.to_path_buf(),
                    report,
                    written,
                }
            }
            Err(error) => FileOutcome::Failed {
                path: path.to_path_buf(),
                error,
            },
        }
    }

    fn auto_check(&self, report: &mut BatchReport, only: Option<&Path>) {
        if let Some(options) = self.settings.auto_check() {
            let checks = self.check(&options, only);
            report.outcomes.extend(checks.outcomes);
        }
    }
}

fn master_language<'a>(equivalents: &'a [(Regex, String)], language: &str) -> Option<&'a str> {
    equivalents
        .iter()
        .find(|(pattern, _)| pattern.is_match(language))
        .map(|(_, master)| master.as_str())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
