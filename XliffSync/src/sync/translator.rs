//! Synchronizing a target catalog with the generated source catalog

use tracing::{debug, info};

use super::index::UnitKeys;
use super::matching::Matcher;
use super::types::{MatchKind, SyncOptions, SyncOutput, SyncStats, TranslationSources};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::formats::xliff::{XliffDocument, XliffVersion};
use crate::formats::xml::{NodeId, XmlFragment};

/// Synchronize a target document (or a new one for `target_language`) with `source`
///
/// The result is the source document with every unit merged with its match in
/// the target, serialized with the configured output policy.
///
/// # Errors
/// Returns [`Error::NoOutputGenerated`] if `source` is not a valid XLIFF document
/// or neither `target` nor `target_language` is given, and the load errors of
/// the target document.
pub fn synchronize(
    source: &str,
    target: Option<&str>,
    target_language: Option<&str>,
    settings: &Settings,
) -> Result<SyncOutput> {
    let document_settings = settings.document();
    let source = XliffDocument::parse(source, document_settings.clone())?;
    if !source.is_valid() {
        return Err(Error::NoOutputGenerated {
            reason: "the source is not a valid XLIFF 1.2 or 2.0 document".to_string(),
        });
    }

    let target = match (target, target_language) {
        (Some(text), _) => XliffDocument::load(text, document_settings)?,
        (None, Some(language)) => new_target(&source, language),
        (None, None) => {
            return Err(Error::NoOutputGenerated {
                reason: "no target document or target language given".to_string(),
            });
        }
    };

    let (merged, stats) = synchronize_documents(&source, &target, &settings.sync());
    Ok(SyncOutput {
        content: merged.extract()?,
        stats,
    })
}

/// An empty target document in the source's version.
#[must_use]
pub fn new_target(source: &XliffDocument, language: &str) -> XliffDocument {
    let version = source.version().unwrap_or(XliffVersion::V12);
    XliffDocument::create(version, language, source.settings().clone())
}

/// Merge every unit of a copy of `source` with its match in `target`.
#[must_use]
pub fn synchronize_documents(
    source: &XliffDocument,
    target: &XliffDocument,
    options: &SyncOptions,
) -> (XliffDocument, SyncStats) {
    let mut merged = source.clone();
    if let Some(language) = target.target_language() {
        merged.set_target_language(&language);
    }

    let copy_from_source = copies_from_source(&merged, &options.sources);
    let mut matcher = Matcher::new(target, options.strategies);
    let mut stats = SyncStats::default();

    let units = merged.translation_units().to_vec();
    stats.units = units.len();
    for unit in units {
        let found = matcher.find(&UnitKeys::of(&merged, unit));
        let target_unit = found.as_ref().and_then(|m| m.target_unit);
        let mut translation = found.as_ref().and_then(|m| m.translation.clone());
        if let Some(found) = &found {
            stats.record(found.kind);
            if found.reused {
                stats.donor_reuse += 1;
            }
            debug!(unit = ?merged.unit_id(unit), kind = %found.kind, "matched");
        }

        let has_existing = target_unit.is_some_and(|t| target.unit_has_translation(t));
        if translation.is_none() {
            translation = fallback_translation(
                &merged,
                unit,
                has_existing,
                copy_from_source,
                &options.sources,
                &mut stats,
            );
        }

        let outcome = merged.merge_unit(
            unit,
            target_unit.map(|t| (target, t)),
            translation.as_ref(),
            &options.merge,
        );
        if outcome.missing {
            stats.missing += 1;
        }
        if outcome.source_changed {
            stats.source_changed += 1;
        }
    }

    info!(
        language = ?merged.target_language(),
        units = stats.units,
        matched = stats.matched(),
        missing = stats.missing,
        changed = stats.source_changed,
        "synchronized"
    );
    merged.compact();
    (merged, stats)
}

fn copies_from_source(merged: &XliffDocument, sources: &TranslationSources) -> bool {
    let Some(target_language) = merged.target_language() else {
        return false;
    };
    let same_language = merged.source_language().as_deref() == Some(target_language.as_str());
    (sources.copy_from_source_for_same_language && same_language)
        || sources.copy_from_source_for_languages.contains(&target_language)
}

/// Developer-note translation, then a copy of the source.
fn fallback_translation(
    merged: &XliffDocument,
    unit: NodeId,
    has_existing: bool,
    copy_from_source: bool,
    sources: &TranslationSources,
    stats: &mut SyncStats,
) -> Option<XmlFragment> {
    if sources.parse_from_developer_note
        && (!has_existing || sources.parse_from_developer_note_overwrite)
    {
        if let Some(text) = merged.unit_translation_from_developer_note(unit) {
            stats.record(MatchKind::DeveloperNote);
            return Some(XmlFragment::from_text(&text));
        }
    }
    if copy_from_source && !has_existing {
        if let Some(content) = merged.unit_source_children(unit) {
            stats.record(MatchKind::CopiedFromSource);
            return Some(content);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::xliff::TranslationState;

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2">
  <file source-language="en-US" target-language="en-US" original="App">
    <body>
      <trans-unit id="a">
        <source>Hello</source>
        <note from="Developer">fr-FR=Bonjour|de-DE=Hallo</note>
      </trans-unit>
      <trans-unit id="b">
        <source>Bye</source>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    #[test]
    fn test_new_target_language() {
        let output = synchronize(SOURCE, None, Some("fr-FR"), &Settings::default()).unwrap();
        assert!(output.content.contains("target-language=\"fr-FR\""));
        assert_eq!(output.stats.units, 2);
        assert_eq!(output.stats.missing, 2);
    }

    #[test]
    fn test_merged_document_keeps_no_replaced_nodes() {
        // The developer note overwrites the imported target content
        let settings = Settings {
            parse_from_developer_note: true,
            parse_from_developer_note_overwrite: true,
            ..Settings::default()
        };
        let source = XliffDocument::load(SOURCE, settings.document()).unwrap();
        let target = XliffDocument::load(
            &SOURCE
                .replace("target-language=\"en-US\"", "target-language=\"fr-FR\"")
                .replace("<source>Hello</source>", "<source>Hello</source><target><g id=\"1\">Salut</g></target>"),
            settings.document(),
        )
        .unwrap();

        let (merged, _) = synchronize_documents(&source, &target, &settings.sync());
        let reparsed = XliffDocument::load(&merged.extract().unwrap(), settings.document()).unwrap();
        assert_eq!(merged.tree().node_count(), reparsed.tree().node_count());
        let unit = merged.find_unit_by_id("a").unwrap();
        assert_eq!(
            merged.unit_translation_text(unit).as_deref(),
            Some("Bonjour")
        );
    }

    #[test]
    fn test_requires_target_or_language() {
        assert!(matches!(
            synchronize(SOURCE, None, None, &Settings::default()),
            Err(Error::NoOutputGenerated { .. })
        ));
        assert!(matches!(
            synchronize("<xliff version=\"3.0\"/>", None, Some("fr-FR"), &Settings::default()),
            Err(Error::NoOutputGenerated { .. })
        ));
    }

    #[test]
    fn test_developer_note_translation() {
        let settings = Settings {
            parse_from_developer_note: true,
            ..Settings::default()
        };
        let output = synchronize(SOURCE, None, Some("fr-FR"), &settings).unwrap();
        let doc = XliffDocument::load(&output.content, settings.document()).unwrap();
        let unit = doc.find_unit_by_id("a").unwrap();
        assert_eq!(doc.unit_translation_text(unit).as_deref(), Some("Bonjour"));
        assert_eq!(doc.state(unit), Some(TranslationState::Translated));
        assert_eq!(output.stats.from_developer_note, 1);
    }

    #[test]
    fn test_copy_from_source_for_same_language() {
        let settings = Settings {
            copy_from_source_for_same_language: true,
            ..Settings::default()
        };
        let output = synchronize(SOURCE, None, Some("en-US"), &settings).unwrap();
        let doc = XliffDocument::load(&output.content, settings.document()).unwrap();
        let unit = doc.find_unit_by_id("b").unwrap();
        assert_eq!(doc.unit_translation_text(unit).as_deref(), Some("Bye"));
        assert_eq!(output.stats.copied_from_source, 2);
        assert_eq!(output.stats.missing, 0);
    }
}
