//! Run configuration
//!
//! [`Settings`] mirrors the `xliffSync.*` settings bag of the editor extension the
//! files usually come from. It is read once per run and projected into the
//! option structs each component takes, so nothing below this module reads
//! configuration on its own.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::check::{CheckOptions, NeedsWorkRule, RuleSet};
use crate::error::{Error, Result};
use crate::formats::xml::SerializeOptions;
use crate::sync::{
    MatchStrategies, MergeOptions, SourceChangePolicy, SyncOptions, TranslationSources, UnitMaps,
};

/// `missingTranslation` value that stands for the empty string.
pub const MISSING_TRANSLATION_EMPTY: &str = "%EMPTY%";

/// Prefix used by editor settings files.
const SETTINGS_PREFIX: &str = "xliffSync.";

/// All tunables of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // Notes
    pub developer_note_designation: String,
    pub xliff_generator_note_designation: String,

    // Matching
    pub find_by_xliff_generator_note_and_source: bool,
    pub find_by_xliff_generator_and_developer_note: bool,
    pub find_by_xliff_generator_note: bool,
    pub find_by_source_and_developer_note: bool,
    pub find_by_source: bool,
    pub unit_maps: UnitMaps,

    // Merging
    pub preserve_target_attributes: bool,
    pub preserve_target_attributes_order: bool,
    pub preserve_target_child_nodes: bool,
    pub missing_translation: String,
    pub needs_work_translation_substate: String,
    pub add_needs_work_translation_note: bool,
    pub use_self_closing_tags: bool,
    pub headless: bool,
    pub parse_from_developer_note: bool,
    pub parse_from_developer_note_overwrite: bool,
    pub parse_from_developer_note_separator: String,
    pub parse_from_developer_note_trim_characters: String,
    pub copy_from_source_for_same_language: bool,
    pub copy_from_source_for_languages: Vec<String>,
    pub detect_source_text_changes: bool,
    pub clear_translation_after_source_text_change: bool,
    pub ignore_line_ending_type_changes: bool,

    // Checking
    pub ignore_line_ending_type_changes_in_checks: bool,
    pub need_work_translation_rules: Vec<NeedsWorkRule>,
    pub need_work_translation_rules_enable_all: bool,
    pub auto_check_missing_translations: bool,
    pub auto_check_need_work_translations: bool,

    // Project
    pub file_type: String,
    pub base_file: String,
    pub matching_original_only: bool,
    pub equivalent_languages_enabled: bool,
    /// Master language to a pattern matching its equivalent languages
    pub equivalent_languages: IndexMap<String, String>,
    pub replace_translations_during_import: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let equivalent_languages = [
            ("de-DE", "de-.*"),
            ("fr-FR", "fr-.*"),
            ("en-US", "en-.*"),
            ("nl-NL", "nl-.*"),
        ]
        .into_iter()
        .map(|(master, pattern)| (master.to_string(), pattern.to_string()))
        .collect();

        Self {
            developer_note_designation: "Developer".to_string(),
            xliff_generator_note_designation: "Xliff Generator".to_string(),
            find_by_xliff_generator_note_and_source: true,
            find_by_xliff_generator_and_developer_note: true,
            find_by_xliff_generator_note: true,
            find_by_source_and_developer_note: false,
            find_by_source: false,
            unit_maps: UnitMaps::All,
            preserve_target_attributes: false,
            preserve_target_attributes_order: false,
            preserve_target_child_nodes: false,
            missing_translation: MISSING_TRANSLATION_EMPTY.to_string(),
            needs_work_translation_substate: "xliffSync:needsWork".to_string(),
            add_needs_work_translation_note: true,
            use_self_closing_tags: true,
            headless: false,
            parse_from_developer_note: false,
            parse_from_developer_note_overwrite: false,
            parse_from_developer_note_separator: "|".to_string(),
            parse_from_developer_note_trim_characters: String::new(),
            copy_from_source_for_same_language: false,
            copy_from_source_for_languages: Vec::new(),
            detect_source_text_changes: true,
            clear_translation_after_source_text_change: false,
            ignore_line_ending_type_changes: false,
            ignore_line_ending_type_changes_in_checks: false,
            need_work_translation_rules: vec![
                NeedsWorkRule::OptionMemberCount,
                NeedsWorkRule::OptionLeadingSpaces,
                NeedsWorkRule::Placeholders,
            ],
            need_work_translation_rules_enable_all: false,
            auto_check_missing_translations: false,
            auto_check_need_work_translations: false,
            file_type: "xlf".to_string(),
            base_file: String::new(),
            matching_original_only: true,
            equivalent_languages_enabled: false,
            equivalent_languages,
            replace_translations_during_import: false,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or holds invalid settings.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse settings from JSON text
    ///
    /// Keys may be plain (`findBySource`), prefixed (`xliffSync.findBySource`) or
    /// nested in an `xliffSync` object. Unknown keys are ignored.
    ///
    /// # Errors
    /// Returns an error for invalid JSON, wrongly typed values, unknown rule
    /// names or invalid equivalent-language patterns.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build settings from an already parsed JSON value.
    ///
    /// # Errors
    /// See [`Settings::from_json_str`].
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(Error::InvalidSetting {
                key: "(root)".to_string(),
                message: "expected a JSON object".to_string(),
            });
        };

        let mut flattened = Map::new();
        for (key, value) in entries {
            if key == "xliffSync" {
                if let Value::Object(nested) = value {
                    flattened.extend(nested);
                    continue;
                }
            }
            let key = if let Some(stripped) = key.strip_prefix(SETTINGS_PREFIX) {
                stripped.to_string()
            } else {
                key
            };
            flattened.insert(key, value);
        }

        let settings: Settings = serde_json::from_value(Value::Object(flattened))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.parse_from_developer_note && self.parse_from_developer_note_separator.is_empty() {
            return Err(Error::InvalidSetting {
                key: "parseFromDeveloperNoteSeparator".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.file_type.is_empty() {
            return Err(Error::InvalidSetting {
                key: "fileType".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        for pattern in self.equivalent_languages.values() {
            regex::Regex::new(pattern)?;
        }
        Ok(())
    }

    /// The missing-translation sentinel with `%EMPTY%` resolved.
    #[must_use]
    pub fn missing_translation_text(&self) -> &str {
        if self.missing_translation == MISSING_TRANSLATION_EMPTY {
            ""
        } else {
            &self.missing_translation
        }
    }

    /// Settings used by the document layer.
    #[must_use]
    pub fn document(&self) -> DocumentSettings {
        DocumentSettings {
            developer_note_designation: self.developer_note_designation.clone(),
            generator_note_designation: self.xliff_generator_note_designation.clone(),
            missing_translation: self.missing_translation_text().to_string(),
            needs_work_substate: self.needs_work_translation_substate.clone(),
            add_needs_work_note: self.add_needs_work_translation_note,
            developer_note_separator: self.parse_from_developer_note_separator.clone(),
            developer_note_trim_characters: self.parse_from_developer_note_trim_characters.clone(),
            serialize: SerializeOptions {
                headless: self.headless,
                self_closing: self.use_self_closing_tags,
            },
        }
    }

    #[must_use]
    pub fn strategies(&self) -> MatchStrategies {
        MatchStrategies {
            generator_note_and_source: self.find_by_xliff_generator_note_and_source,
            generator_and_developer_note: self.find_by_xliff_generator_and_developer_note,
            generator_note: self.find_by_xliff_generator_note,
            source_and_developer_note: self.find_by_source_and_developer_note,
            source: self.find_by_source,
            unit_maps: self.unit_maps,
        }
    }

    #[must_use]
    pub fn merge(&self) -> MergeOptions {
        MergeOptions {
            preserve_target_attributes: self.preserve_target_attributes,
            preserve_target_attributes_order: self.preserve_target_attributes_order,
            preserve_target_child_nodes: self.preserve_target_child_nodes,
            detect_source_text_changes: self.detect_source_text_changes,
            source_change_policy: if self.clear_translation_after_source_text_change {
                SourceChangePolicy::Clear
            } else {
                SourceChangePolicy::Flag
            },
            ignore_line_ending_changes: self.ignore_line_ending_type_changes,
        }
    }

    #[must_use]
    pub fn sources(&self) -> TranslationSources {
        TranslationSources {
            parse_from_developer_note: self.parse_from_developer_note,
            parse_from_developer_note_overwrite: self.parse_from_developer_note_overwrite,
            copy_from_source_for_same_language: self.copy_from_source_for_same_language,
            copy_from_source_for_languages: self.copy_from_source_for_languages.clone(),
        }
    }

    /// Matching, merging and translation-source options together.
    #[must_use]
    pub fn sync(&self) -> SyncOptions {
        SyncOptions {
            strategies: self.strategies(),
            merge: self.merge(),
            sources: self.sources(),
        }
    }

    /// Checker options with both rule families enabled.
    #[must_use]
    pub fn check(&self) -> CheckOptions {
        CheckOptions {
            check_missing: true,
            check_needs_work: true,
            rules: RuleSet::new(
                self.need_work_translation_rules.iter().copied(),
                self.need_work_translation_rules_enable_all,
            ),
            copy_from_source_for_languages: self.copy_from_source_for_languages.clone(),
            ignore_line_endings: self.ignore_line_ending_type_changes_in_checks,
        }
    }

    /// Checker options for the automatic check after a sync, if any is enabled.
    #[must_use]
    pub fn auto_check(&self) -> Option<CheckOptions> {
        if !self.auto_check_missing_translations && !self.auto_check_need_work_translations {
            return None;
        }
        Some(CheckOptions {
            check_missing: self.auto_check_missing_translations,
            check_needs_work: self.auto_check_need_work_translations,
            ..self.check()
        })
    }
}

/// Settings the document layer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    /// `note[from|category]` value of developer notes
    pub developer_note_designation: String,
    /// `note[from|category]` value of generator notes
    pub generator_note_designation: String,
    /// Sentinel content of a missing translation (already resolved, may be empty)
    pub missing_translation: String,
    /// 2.0 `subState` value that marks needs-work
    pub needs_work_substate: String,
    /// Whether tool notes are written at all
    pub add_needs_work_note: bool,
    pub developer_note_separator: String,
    pub developer_note_trim_characters: String,
    pub serialize: SerializeOptions,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Settings::default().document()
    }
}
