//! Importing translations from other catalogs into the project

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::batch::{BatchReport, FileOutcome, Project};
use super::write::write_atomic;
use crate::formats::xliff::{TranslationState, XliffDocument};
use crate::formats::xml::{Attributes, NodeId, XmlFragment};

/// Source text plus developer note of a unit
type ImportKey = (String, Option<String>);

/// Translations of one imported catalog by source text and developer note.
#[derive(Debug, Default)]
pub struct TranslationMemory {
    language: Option<String>,
    entries: HashMap<ImportKey, XmlFragment>,
}

impl TranslationMemory {
    /// Collect the first translation per key of `document`.
    #[must_use]
    pub fn from_document(document: &XliffDocument) -> Self {
        let mut entries = HashMap::new();
        for &unit in document.translation_units() {
            if !document.unit_has_translation(unit) {
                continue;
            }
            let Some(key) = import_key(document, unit) else {
                continue;
            };
            if let Some(content) = document.unit_translation_children(unit) {
                entries.entry(key).or_insert(content);
            }
        }
        TranslationMemory {
            language: document.target_language(),
            entries,
        }
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// By source text and developer note, falling back to the source text alone.
    fn lookup(&self, key: ImportKey) -> Option<&XmlFragment> {
        if let Some(content) = self.entries.get(&key) {
            return Some(content);
        }
        let (source, _) = key;
        self.entries.get(&(source, None))
    }

    /// Fill the units of `document` from this memory. Returns the number of
    /// imported translations.
    pub fn apply(&self, document: &mut XliffDocument, replace: bool) -> usize {
        let mut imported = 0;
        let units = document.translation_units().to_vec();
        for unit in units {
            if !replace && document.unit_has_translation(unit) {
                continue;
            }
            let Some(content) = import_key(document, unit).and_then(|key| self.lookup(key)) else {
                continue;
            };
            set_translation(document, unit, content);
            debug!(unit = ?document.unit_id(unit), "translation imported");
            imported += 1;
        }
        imported
    }
}

fn import_key(document: &XliffDocument, unit: NodeId) -> Option<ImportKey> {
    let source = document.unit_source_text(unit).filter(|s| !s.is_empty())?;
    Some((source, document.unit_developer_note(unit)))
}

fn set_translation(document: &mut XliffDocument, unit: NodeId, content: &XmlFragment) {
    if document.target_node(unit).is_some() {
        document.set_unit_translation(unit, content);
    } else {
        let target = document.create_target_node(Attributes::new(), Some(content));
        document.append_target_node(unit, target);
    }
    document.set_state(unit, TranslationState::Translated);
}

impl Project {
    /// Import the translations of `files` into every project catalog with the
    /// same target language
    ///
    /// Units that already carry a translation keep it unless
    /// `replaceTranslationsDuringImport` is set. Catalogs that received at least
    /// one translation are written back.
    pub fn import_translations(&self, files: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        let replace = self.settings().replace_translations_during_import;

        for file in files {
            let memory = match XliffDocument::read(file, self.settings().document()) {
                Ok(document) => TranslationMemory::from_document(&document),
                Err(error) => {
                    report.push(FileOutcome::Failed {
                        path: file.clone(),
                        error,
                    });
                    continue;
                }
            };
            info!(file = %file.display(), entries = memory.len(), "import file read");

            for target in self.targets() {
                if target == file {
                    continue;
                }
                if let Some(outcome) = self.import_into(&memory, target, replace) {
                    report.push(outcome);
                }
            }
        }
        report
    }

    fn import_into(&self, memory: &TranslationMemory, path: &Path, replace: bool) -> Option<FileOutcome> {
        let mut document = match XliffDocument::read(path, self.settings().document()) {
            Ok(document) => document,
            Err(error) => {
                return Some(FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error,
                });
            }
        };
        if document.target_language().as_deref() != memory.language() {
            return None;
        }

        let count = memory.apply(&mut document, replace);
        if count == 0 {
            return None;
        }
        let written = document
            .extract()
            .and_then(|content| write_atomic(path, &content));
        Some(match written {
            Ok(()) => {
                info!(path = %path.display(), count, "translations imported");
                FileOutcome::Imported {
                    path: path.to_path_buf(),
                    count,
                }
            }
            Err(error) => FileOutcome::Failed {
                path: path.to_path_buf(),
                error,
            },
        })
    }
}
