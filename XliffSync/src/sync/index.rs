//! Lookup indexes over the units of a target document
//!
//! A [`MatchIndex`] is built once per target document from the enabled
//! strategies. Every index keeps the first unit per key in document order, which
//! is also what the linear scan in the matcher returns, so both paths agree.

use std::collections::HashMap;
use std::hash::Hash;

use super::types::{MatchStrategies, UnitMaps};
use crate::formats::xliff::XliffDocument;
use crate::formats::xml::NodeId;

/// Matching keys of one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitKeys {
    pub id: Option<String>,
    /// Serialized `<source>` element
    pub source: Option<String>,
    pub developer_note: Option<String>,
    pub generator_note: Option<String>,
    /// Carries a usable translation (may donate it)
    pub has_translation: bool,
}

impl UnitKeys {
    #[must_use]
    pub fn of(document: &XliffDocument, unit: NodeId) -> Self {
        UnitKeys {
            id: document.unit_id(unit).map(str::to_string),
            source: document.unit_source(unit),
            developer_note: document.unit_developer_note(unit),
            generator_note: document.unit_generator_note(unit),
            has_translation: document.unit_has_translation(unit),
        }
    }

    pub(crate) fn id_key(&self) -> Option<String> {
        self.id.clone()
    }

    pub(crate) fn generator_note_and_source_key(&self) -> Option<(String, String)> {
        Some((self.generator_note.clone()?, self.source.clone()?))
    }

    pub(crate) fn generator_and_developer_note_key(&self) -> Option<(String, String)> {
        Some((self.generator_note.clone()?, self.developer_note.clone()?))
    }

    pub(crate) fn generator_note_key(&self) -> Option<String> {
        self.generator_note.clone()
    }

    pub(crate) fn source_and_developer_note_key(&self) -> Option<(String, Option<String>)> {
        Some((self.source.clone()?, self.developer_note.clone()))
    }

    pub(crate) fn source_key(&self) -> Option<String> {
        self.source.clone()
    }
}

/// Precomputed key → first unit maps. A `None` map means that strategy scans.
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    pub(crate) by_id: Option<HashMap<String, NodeId>>,
    pub(crate) by_generator_note_and_source: Option<HashMap<(String, String), NodeId>>,
    pub(crate) by_generator_and_developer_note: Option<HashMap<(String, String), NodeId>>,
    pub(crate) by_generator_note: Option<HashMap<String, NodeId>>,
    pub(crate) by_source_and_developer_note: Option<HashMap<(String, Option<String>), NodeId>>,
    pub(crate) by_source: Option<HashMap<String, NodeId>>,
}

impl MatchIndex {
    /// Build the indexes `strategies` ask for.
    ///
    /// Only the key of each built map is read from the units.
    #[must_use]
    pub fn build(document: &XliffDocument, strategies: &MatchStrategies) -> Self {
        if strategies.unit_maps == UnitMaps::Disabled {
            return Self::default();
        }
        let mut index = MatchIndex {
            by_id: Some(collect(document, false, id_of)),
            ..Self::default()
        };
        if strategies.unit_maps != UnitMaps::All {
            return index;
        }

        if strategies.generator_note_and_source {
            index.by_generator_note_and_source =
                Some(collect(document, false, generator_note_and_source_of));
        }
        if strategies.generator_and_developer_note {
            index.by_generator_and_developer_note =
                Some(collect(document, false, generator_and_developer_note_of));
        }
        if strategies.generator_note {
            index.by_generator_note = Some(collect(document, false, generator_note_of));
        }
        if strategies.source_and_developer_note {
            index.by_source_and_developer_note =
                Some(collect(document, true, source_and_developer_note_of));
        }
        if strategies.source {
            index.by_source = Some(collect(document, true, source_of));
        }
        index
    }

    /// Number of built maps.
    #[must_use]
    pub fn map_count(&self) -> usize {
        [
            self.by_id.is_some(),
            self.by_generator_note_and_source.is_some(),
            self.by_generator_and_developer_note.is_some(),
            self.by_generator_note.is_some(),
            self.by_source_and_developer_note.is_some(),
            self.by_source.is_some(),
        ]
        .into_iter()
        .filter(|&built| built)
        .count()
    }
}

/// Reads one matching key of a target unit.
pub(crate) type KeyFn<K> = fn(&XliffDocument, NodeId) -> Option<K>;

pub(crate) fn id_of(document: &XliffDocument, unit: NodeId) -> Option<String> {
    document.unit_id(unit).map(str::to_string)
}

pub(crate) fn generator_note_and_source_of(
    document: &XliffDocument,
    unit: NodeId,
) -> Option<(String, String)> {
    Some((document.unit_generator_note(unit)?, document.unit_source(unit)?))
}

pub(crate) fn generator_and_developer_note_of(
    document: &XliffDocument,
    unit: NodeId,
) -> Option<(String, String)> {
    Some((document.unit_generator_note(unit)?, document.unit_developer_note(unit)?))
}

pub(crate) fn generator_note_of(document: &XliffDocument, unit: NodeId) -> Option<String> {
    document.unit_generator_note(unit)
}

pub(crate) fn source_and_developer_note_of(
    document: &XliffDocument,
    unit: NodeId,
) -> Option<(String, Option<String>)> {
    Some((document.unit_source(unit)?, document.unit_developer_note(unit)))
}

pub(crate) fn source_of(document: &XliffDocument, unit: NodeId) -> Option<String> {
    document.unit_source(unit)
}

/// Whether `unit` has `probe` as key and, for donor searches, a usable translation.
pub(crate) fn unit_matches<K: Eq>(
    document: &XliffDocument,
    unit: NodeId,
    probe: &K,
    key: KeyFn<K>,
    donors_only: bool,
) -> bool {
    key(document, unit).as_ref() == Some(probe)
        && (!donors_only || document.unit_has_translation(unit))
}

fn collect<K: Eq + Hash>(
    document: &XliffDocument,
    donors_only: bool,
    key: KeyFn<K>,
) -> HashMap<K, NodeId> {
    let mut map = HashMap::new();
    for &unit in document.translation_units() {
        let Some(key) = key(document, unit) else {
            continue;
        };
        if donors_only && !document.unit_has_translation(unit) {
            continue;
        }
        map.entry(key).or_insert(unit);
    }
    map
}
