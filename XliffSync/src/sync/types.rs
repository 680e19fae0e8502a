//! Core types for matching and merge operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which lookup indexes are built for a target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnitMaps {
    /// Index every enabled strategy.
    #[default]
    All,
    /// Index ids only; the other strategies scan.
    Id,
    /// Build no index at all.
    #[serde(rename = "None")]
    Disabled,
}

/// Matching strategies tried after the id lookup, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchStrategies {
    pub generator_note_and_source: bool,
    pub generator_and_developer_note: bool,
    pub generator_note: bool,
    /// Donor search: takes the translation only.
    pub source_and_developer_note: bool,
    /// Donor search: takes the translation only.
    pub source: bool,
    pub unit_maps: UnitMaps,
}

impl Default for MatchStrategies {
    fn default() -> Self {
        Self {
            generator_note_and_source: true,
            generator_and_developer_note: true,
            generator_note: true,
            source_and_developer_note: false,
            source: false,
            unit_maps: UnitMaps::All,
        }
    }
}

impl MatchStrategies {
    /// Only match by id.
    #[must_use]
    pub fn id_only() -> Self {
        Self {
            generator_note_and_source: false,
            generator_and_developer_note: false,
            generator_note: false,
            source_and_developer_note: false,
            source: false,
            unit_maps: UnitMaps::All,
        }
    }

    /// Every strategy on.
    #[must_use]
    pub fn all() -> Self {
        Self {
            source_and_developer_note: true,
            source: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn uses_generator_note(&self) -> bool {
        self.generator_note_and_source || self.generator_and_developer_note || self.generator_note
    }
}

/// What to do with an existing translation whose source text changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceChangePolicy {
    /// Keep the translation, add a note and mark it as needing work.
    #[default]
    Flag,
    /// Drop the translation and mark it missing.
    Clear,
}

/// Options for merging a unit
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Target attribute values win over the source's
    pub preserve_target_attributes: bool,
    /// With `preserve_target_attributes`, also keep the target's attribute order
    pub preserve_target_attributes_order: bool,
    /// Carry non-standard target unit children (e.g. `alt-trans`) over
    pub preserve_target_child_nodes: bool,
    /// Compare old and new source text
    pub detect_source_text_changes: bool,
    pub source_change_policy: SourceChangePolicy,
    /// Treat CRLF and LF as equal when comparing source text
    pub ignore_line_ending_changes: bool,
}

/// Translation sources consulted after matching found nothing.
#[derive(Debug, Clone, Default)]
pub struct TranslationSources {
    /// Read `lang=translation` entries from the developer note
    pub parse_from_developer_note: bool,
    /// Prefer the developer note even over an existing translation
    pub parse_from_developer_note_overwrite: bool,
    /// Copy the source when source and target language are equal
    pub copy_from_source_for_same_language: bool,
    /// Copy the source for these target languages
    pub copy_from_source_for_languages: Vec<String>,
}

/// Everything a synchronization run needs.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub strategies: MatchStrategies,
    pub merge: MergeOptions,
    pub sources: TranslationSources,
}

/// How a source unit found its counterpart or translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Id,
    GeneratorNoteAndSource,
    GeneratorAndDeveloperNote,
    GeneratorNote,
    SourceAndDeveloperNote,
    Source,
    DeveloperNote,
    CopiedFromSource,
}

impl MatchKind {
    /// Identity matches hand over the whole target unit; the others only content.
    #[must_use]
    pub fn is_identity(self) -> bool {
        matches!(
            self,
            Self::Id | Self::GeneratorNoteAndSource | Self::GeneratorAndDeveloperNote | Self::GeneratorNote
        )
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Id => "id",
            Self::GeneratorNoteAndSource => "generator note + source",
            Self::GeneratorAndDeveloperNote => "generator note + developer note",
            Self::GeneratorNote => "generator note",
            Self::SourceAndDeveloperNote => "source + developer note",
            Self::Source => "source",
            Self::DeveloperNote => "developer note",
            Self::CopiedFromSource => "copied from source",
        };
        f.write_str(name)
    }
}

/// Result of merging one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The unit ended up with the missing-translation sentinel.
    pub missing: bool,
    /// The source text differs from the previous target's source text.
    pub source_changed: bool,
}

/// Counters for a synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Units in the merged document
    pub units: usize,
    pub by_id: usize,
    pub by_generator_note_and_source: usize,
    pub by_generator_and_developer_note: usize,
    pub by_generator_note: usize,
    pub by_source_and_developer_note: usize,
    pub by_source: usize,
    pub from_developer_note: usize,
    pub copied_from_source: usize,
    /// Translations reused from another unit with the same source
    pub donor_reuse: usize,
    /// Units left with the missing-translation sentinel
    pub missing: usize,
    /// Units whose source text changed
    pub source_changed: usize,
}

impl SyncStats {
    pub(crate) fn record(&mut self, kind: MatchKind) {
        let counter = match kind {
            MatchKind::Id => &mut self.by_id,
            MatchKind::GeneratorNoteAndSource => &mut self.by_generator_note_and_source,
            MatchKind::GeneratorAndDeveloperNote => &mut self.by_generator_and_developer_note,
            MatchKind::GeneratorNote => &mut self.by_generator_note,
            MatchKind::SourceAndDeveloperNote => &mut self.by_source_and_developer_note,
            MatchKind::Source => &mut self.by_source,
            MatchKind::DeveloperNote => &mut self.from_developer_note,
            MatchKind::CopiedFromSource => &mut self.copied_from_source,
        };
        *counter += 1;
    }

    /// Units that found a target unit or a translation.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.by_id
            + self.by_generator_note_and_source
            + self.by_generator_and_developer_note
            + self.by_generator_note
            + self.by_source_and_developer_note
            + self.by_source
    }
}

/// Serialized merged document plus run counters.
#[derive(Debug, Clone)]
pub struct SyncOutput {
    pub content: String,
    pub stats: SyncStats,
}
