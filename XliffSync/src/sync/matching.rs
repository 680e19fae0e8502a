//! Finding the counterpart of a source unit in a target document
//!
//! Strategies are tried in a fixed order and the first hit wins:
//! id, generator note + source, generator note + developer note, generator note,
//! then the two donor searches (source + developer note, source). Identity
//! matches hand the whole target unit to the merge; donor matches only lend
//! their translation content.

use std::collections::HashMap;
use std::hash::Hash;

use super::index::{self, KeyFn, MatchIndex, UnitKeys};
use super::types::{MatchKind, MatchStrategies};
use crate::formats::xliff::XliffDocument;
use crate::formats::xml::{NodeId, XmlFragment};

/// What the matcher found for a source unit.
#[derive(Debug, Clone)]
pub struct UnitMatch {
    pub kind: MatchKind,
    /// Set for identity matches
    pub target_unit: Option<NodeId>,
    /// Set for donor matches
    pub translation: Option<XmlFragment>,
    /// The donor translation came from the per-source memo
    pub reused: bool,
}

/// Matches source units against one target document.
#[derive(Debug)]
pub struct Matcher<'a> {
    target: &'a XliffDocument,
    strategies: MatchStrategies,
    index: MatchIndex,
    /// First donor translation per serialized source
    donors_by_source: HashMap<String, Option<XmlFragment>>,
}

impl<'a> Matcher<'a> {
    /// Index `target` for the enabled strategies.
    #[must_use]
    pub fn new(target: &'a XliffDocument, strategies: MatchStrategies) -> Self {
        let index = MatchIndex::build(target, &strategies);
        Self::with_index(target, strategies, index)
    }

    #[must_use]
    pub fn with_index(
        target: &'a XliffDocument,
        strategies: MatchStrategies,
        index: MatchIndex,
    ) -> Self {
        Matcher {
            target,
            strategies,
            index,
            donors_by_source: HashMap::new(),
        }
    }

    #[must_use]
    pub fn index(&self) -> &MatchIndex {
        &self.index
    }

    /// Find the target unit or donor translation for a source unit with `keys`.
    pub fn find(&mut self, keys: &UnitKeys) -> Option<UnitMatch> {
        if let Some(unit) = self.lookup(
            self.index.by_id.as_ref(),
            keys.id_key(),
            index::id_of,
            false,
        ) {
            return Some(identity(MatchKind::Id, unit));
        }

        let strategies = self.strategies;
        if strategies.generator_note_and_source {
            if let Some(unit) = self.lookup(
                self.index.by_generator_note_and_source.as_ref(),
                keys.generator_note_and_source_key(),
                index::generator_note_and_source_of,
                false,
            ) {
                return Some(identity(MatchKind::GeneratorNoteAndSource, unit));
            }
        }
        if strategies.generator_and_developer_note {
            if let Some(unit) = self.lookup(
                self.index.by_generator_and_developer_note.as_ref(),
                keys.generator_and_developer_note_key(),
                index::generator_and_developer_note_of,
                false,
            ) {
                return Some(identity(MatchKind::GeneratorAndDeveloperNote, unit));
            }
        }
        if strategies.generator_note {
            if let Some(unit) = self.lookup(
                self.index.by_generator_note.as_ref(),
                keys.generator_note_key(),
                index::generator_note_of,
                false,
            ) {
                return Some(identity(MatchKind::GeneratorNote, unit));
            }
        }
        if strategies.source_and_developer_note {
            if let Some(unit) = self.lookup(
                self.index.by_source_and_developer_note.as_ref(),
                keys.source_and_developer_note_key(),
                index::source_and_developer_note_of,
                true,
            ) {
                return self.donor(MatchKind::SourceAndDeveloperNote, unit);
            }
        }
        if strategies.source {
            if let Some(source) = keys.source_key() {
                return self.find_by_source(source);
            }
        }
        None
    }

    fn find_by_source(&mut self, source: String) -> Option<UnitMatch> {
        if let Some(cached) = self.donors_by_source.get(&source) {
            return cached.clone().map(|translation| UnitMatch {
                kind: MatchKind::Source,
                target_unit: None,
                translation: Some(translation),
                reused: true,
            });
        }

        let donor = self.lookup(
            self.index.by_source.as_ref(),
            Some(source.clone()),
            index::source_of,
            true,
        );
        let translation = donor.and_then(|unit| self.target.unit_translation_children(unit));
        self.donors_by_source.insert(source, translation.clone());
        translation.map(|translation| UnitMatch {
            kind: MatchKind::Source,
            target_unit: None,
            translation: Some(translation),
            reused: false,
        })
    }

    fn donor(&self, kind: MatchKind, unit: NodeId) -> Option<UnitMatch> {
        let translation = self.target.unit_translation_children(unit)?;
        Some(UnitMatch {
            kind,
            target_unit: None,
            translation: Some(translation),
            reused: false,
        })
    }

    /// Indexed lookup when the map exists, linear scan with the same predicate otherwise.
    fn lookup<K: Eq + Hash>(
        &self,
        map: Option<&HashMap<K, NodeId>>,
        probe: Option<K>,
        key: KeyFn<K>,
        donors_only: bool,
    ) -> Option<NodeId> {
        let probe = probe?;
        match map {
            Some(map) => map.get(&probe).copied(),
            None => scan(self.target, &probe, key, donors_only),
        }
    }
}

/// First unit in document order whose key equals `probe`.
fn scan<K: Eq>(
    document: &XliffDocument,
    probe: &K,
    key: KeyFn<K>,
    donors_only: bool,
) -> Option<NodeId> {
    document
        .translation_units()
        .iter()
        .copied()
        .find(|&unit| index::unit_matches(document, unit, probe, key, donors_only))
}

fn identity(kind: MatchKind, unit: NodeId) -> UnitMatch {
    UnitMatch {
        kind,
        target_unit: Some(unit),
        translation: None,
        reused: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentSettings;
    use crate::sync::types::UnitMaps;

    const TARGET: &str = r#"<xliff version="1.2"><file source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="greet"><source>Hello</source><target>Bonjour</target><note from="Xliff Generator">Page A - Control Greet</note></trans-unit>
<trans-unit id="other"><source>Hello</source><target>Salut</target><note from="Developer">Comment</note><note from="Xliff Generator">Page B - Control Greet</note></trans-unit>
<trans-unit id="untranslated"><source>Bye</source></trans-unit>
<trans-unit id="bye"><source>Bye</source><target>Au revoir</target></trans-unit>
</body></file></xliff>"#;

    fn target() -> XliffDocument {
        XliffDocument::load(TARGET, DocumentSettings::default()).unwrap()
    }

    fn keys(id: &str, source: &str, dev: Option<&str>, generator: Option<&str>) -> UnitKeys {
        UnitKeys {
            id: Some(id.to_string()),
            source: Some(format!("<source>{source}</source>")),
            developer_note: dev.map(str::to_string),
            generator_note: generator.map(str::to_string),
            has_translation: false,
        }
    }

    #[test]
    fn test_id_wins_over_generator_note() {
        let doc = target();
        let mut matcher = Matcher::new(&doc, MatchStrategies::all());
        let found = matcher
            .find(&keys("greet", "Hello", Some("Comment"), Some("Page B - Control Greet")))
            .unwrap();
        assert_eq!(found.kind, MatchKind::Id);
        assert_eq!(found.target_unit, doc.find_unit_by_id("greet"));
    }

    #[test]
    fn test_generator_note_and_source() {
        let doc = target();
        let mut matcher = Matcher::new(&doc, MatchStrategies::default());
        let found = matcher
            .find(&keys("renamed", "Hello", None, Some("Page B - Control Greet")))
            .unwrap();
        assert_eq!(found.kind, MatchKind::GeneratorNoteAndSource);
        assert_eq!(found.target_unit, doc.find_unit_by_id("other"));
    }

    #[test]
    fn test_donor_by_source_and_developer_note() {
        let doc = target();
        let mut matcher = Matcher::new(&doc, MatchStrategies::all());
        let found = matcher
            .find(&keys("greet2", "Hello", Some("Comment"), None))
            .unwrap();
        assert_eq!(found.kind, MatchKind::SourceAndDeveloperNote);
        assert_eq!(found.target_unit, None);
        assert_eq!(found.translation.unwrap().text(), "Salut");
    }

    #[test]
    fn test_donor_by_source_skips_untranslated_and_memoizes() {
        let doc = target();
        let mut matcher = Matcher::new(&doc, MatchStrategies::all());
        let first = matcher.find(&keys("x1", "Bye", None, None)).unwrap();
        assert_eq!(first.kind, MatchKind::Source);
        assert_eq!(first.translation.unwrap().text(), "Au revoir");
        assert!(!first.reused);

        let second = matcher.find(&keys("x2", "Bye", None, None)).unwrap();
        assert!(second.reused);
        assert!(matcher.find(&keys("x3", "Unknown", None, None)).is_none());
    }

    #[test]
    fn test_disabled_strategies_do_not_match() {
        let doc = target();
        let mut matcher = Matcher::new(&doc, MatchStrategies::id_only());
        assert!(matcher
            .find(&keys("renamed", "Hello", None, Some("Page A - Control Greet")))
            .is_none());
    }

    #[test]
    fn test_index_and_scan_agree() {
        let doc = target();
        let probes = [
            keys("greet", "Hello", None, None),
            keys("n1", "Hello", None, Some("Page A - Control Greet")),
            keys("n2", "Other", Some("Comment"), Some("Page B - Control Greet")),
            keys("n3", "Hello", Some("Comment"), None),
            keys("n4", "Bye", None, None),
            keys("n5", "Nothing", None, None),
        ];
        let scanning = MatchStrategies {
            unit_maps: UnitMaps::Disabled,
            ..MatchStrategies::all()
        };

        let mut indexed = Matcher::new(&doc, MatchStrategies::all());
        let mut linear = Matcher::new(&doc, scanning);
        for probe in &probes {
            let a = indexed.find(probe);
            let b = linear.find(probe);
            assert_eq!(a.as_ref().map(|m| m.kind), b.as_ref().map(|m| m.kind));
            assert_eq!(
                a.as_ref().and_then(|m| m.target_unit),
                b.as_ref().and_then(|m| m.target_unit)
            );
            assert_eq!(
                a.and_then(|m| m.translation).map(|t| t.text()),
                b.and_then(|m| m.translation).map(|t| t.text())
            );
        }
    }
}
