//! Translation checks on a synchronized target document
//!
//! Two rule families run per unit. The missing rule flags units that need a
//! translation but carry none. The needs-work rules flag suspicious
//! translations: the first enabled rule that fires attaches a tool note and moves
//! the unit to needs-work. A unit whose earlier problem no longer occurs loses
//! its tool note again.

mod rules;
mod types;

pub use rules::{
    consecutive_spaces_inconsistent, first_problem, option_leading_spaces_mismatch,
    option_member_count_mismatch, placeholders_mismatch, UnitTexts,
};
pub use types::{
    CheckOptions, CheckReport, NeedsWorkRule, Problem, RuleSet, PROBLEM_NOTE_PREFIX,
};

use tracing::debug;

use crate::formats::xliff::{TranslationState, XliffDocument};
use crate::formats::xml::NodeId;

/// Run the enabled checks over every unit of `document`, updating states and
/// tool notes in place.
pub fn check_document(document: &mut XliffDocument, options: &CheckOptions) -> CheckReport {
    let mut report = CheckReport::default();
    let source_equals_target_expected = source_equals_target_expected(document, options);

    let units = document.translation_units().to_vec();
    for unit in units {
        if options.check_missing && is_missing(document, unit) {
            document.set_state(unit, TranslationState::Missing);
            report.missing_count += 1;
        }
        if !options.check_needs_work {
            continue;
        }

        match detect_problem(document, unit, options, source_equals_target_expected) {
            Some(problem) => {
                debug!(unit = ?document.unit_id(unit), rule = %problem.rule(), "problem detected");
                document.set_xliff_sync_note(unit, &problem.note());
                document.set_state(unit, TranslationState::NeedsWork);
                report.needs_work_count += 1;
            }
            None if document.state(unit) == Some(TranslationState::NeedsWork) => {
                // An emptied translation stays flagged.
                if has_problem_note(document, unit) && document.unit_has_translation(unit) {
                    document.try_delete_xliff_sync_note(unit);
                    document.set_state(unit, TranslationState::Translated);
                    report.resolved_count += 1;
                    debug!(unit = ?document.unit_id(unit), "problem resolved");
                } else {
                    report.needs_work_count += 1;
                }
            }
            None => {
                if document.try_delete_xliff_sync_note(unit) {
                    report.resolved_count += 1;
                    debug!(unit = ?document.unit_id(unit), "stale tool note removed");
                }
            }
        }
    }
    report
}

fn source_equals_target_expected(document: &XliffDocument, options: &CheckOptions) -> bool {
    let Some(target_language) = document.target_language() else {
        return false;
    };
    document.source_language().as_deref() == Some(target_language.as_str())
        || options.copy_from_source_for_languages.contains(&target_language)
}

fn is_missing(document: &XliffDocument, unit: NodeId) -> bool {
    document.unit_needs_translation(unit)
        && document
            .unit_translation_text(unit)
            .is_none_or(|text| text.is_empty() || text == document.settings().missing_translation)
}

fn has_problem_note(document: &XliffDocument, unit: NodeId) -> bool {
    document
        .unit_xliff_sync_note(unit)
        .is_some_and(|note| note.starts_with(PROBLEM_NOTE_PREFIX))
}

/// Needs-work rules only look at units with both a source and a translation text.
fn detect_problem(
    document: &XliffDocument,
    unit: NodeId,
    options: &CheckOptions,
    source_equals_target_expected: bool,
) -> Option<Problem> {
    let mut source = document.unit_source_text(unit).filter(|s| !s.is_empty())?;
    let mut translation = document.unit_translation_text(unit).filter(|t| !t.is_empty())?;
    if options.ignore_line_endings {
        source = source.replace("\r\n", "\n");
        translation = translation.replace("\r\n", "\n");
    }
    let developer_note = document.unit_developer_note(unit).unwrap_or_default();
    let generator_note = document.unit_generator_note(unit);

    let texts = UnitTexts {
        source: &source,
        translation: &translation,
        developer_note: &developer_note,
        generator_note: generator_note.as_deref(),
        source_equals_target_expected,
    };
    first_problem(&texts, &options.rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentSettings, Settings};
    use crate::sync::SOURCE_CHANGED_NOTE;
    use pretty_assertions::assert_eq;

    fn options(rules: &[NeedsWorkRule]) -> CheckOptions {
        CheckOptions {
            check_missing: true,
            check_needs_work: true,
            rules: RuleSet::new(rules.iter().copied(), false),
            ..CheckOptions::default()
        }
    }

    fn load(content: &str) -> XliffDocument {
        XliffDocument::load(content, DocumentSettings::default()).unwrap()
    }

    const PLACEHOLDERS_V12: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2">
  <file source-language="en-US" target-language="fr-FR" original="App">
    <body>
      <trans-unit id="value">
        <source>Value: %1, %2</source>
        <target state="translated">Valeur : %1</target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    #[test]
    fn test_placeholder_problem_detected_then_resolved() {
        let mut doc = load(PLACEHOLDERS_V12);
        let options = options(&[NeedsWorkRule::Placeholders]);
        let unit = doc.find_unit_by_id("value").unwrap();

        let report = check_document(&mut doc, &options);
        assert_eq!(report.needs_work_count, 1);
        assert!(report.problem_detected());
        assert_eq!(doc.state(unit), Some(TranslationState::NeedsWork));
        assert_eq!(
            doc.unit_xliff_sync_note(unit).as_deref(),
            Some(Problem::PlaceholderMismatch.note().as_str())
        );

        let fixed = crate::formats::xml::XmlFragment::from_text("Valeur : %1, %2");
        doc.set_unit_translation(unit, &fixed);
        let report = check_document(&mut doc, &options);
        assert!(report.problem_resolved());
        assert!(!report.problem_detected());
        assert_eq!(doc.unit_xliff_sync_note(unit), None);
        assert_eq!(doc.state(unit), Some(TranslationState::Translated));

        // Back to the untouched layout
        let expected = PLACEHOLDERS_V12.replace("Valeur : %1<", "Valeur : %1, %2<");
        assert_eq!(doc.extract().unwrap(), expected);
    }

    #[test]
    fn test_emptied_translation_is_not_resolved() {
        let mut doc = load(
            r#"<xliff version="1.2"><file source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="a"><source>Value: %1</source><target></target></trans-unit>
</body></file></xliff>"#,
        );
        let unit = doc.find_unit_by_id("a").unwrap();
        doc.set_xliff_sync_note(unit, &Problem::PlaceholderMismatch.note());
        doc.set_state(unit, TranslationState::NeedsWork);

        let only_needs_work = CheckOptions {
            check_missing: false,
            ..options(&[NeedsWorkRule::Placeholders])
        };
        let report = check_document(&mut doc, &only_needs_work);
        assert_eq!(report.resolved_count, 0);
        assert_eq!(report.needs_work_count, 1);
        assert_eq!(doc.state(unit), Some(TranslationState::NeedsWork));
        assert_eq!(
            doc.unit_xliff_sync_note(unit),
            Some(Problem::PlaceholderMismatch.note())
        );
    }

    #[test]
    fn test_stale_problem_note_on_translated_unit_is_removed() {
        let mut doc = load(&format!(
            r#"<xliff version="1.2"><file source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="a"><source>Open %1</source><target state="translated">Ouvrir %1</target><note from="XLIFF Sync" annotates="general" priority="1">{}</note></trans-unit>
</body></file></xliff>"#,
            Problem::PlaceholderMismatch.note()
        ));
        let unit = doc.find_unit_by_id("a").unwrap();

        let report = check_document(&mut doc, &options(&[NeedsWorkRule::Placeholders]));
        assert_eq!(report.resolved_count, 1);
        assert_eq!(report.needs_work_count, 0);
        assert!(report.needs_write());
        assert_eq!(doc.unit_xliff_sync_note(unit), None);
        assert_eq!(doc.state(unit), Some(TranslationState::Translated));
        assert!(!doc.extract().unwrap().contains(PROBLEM_NOTE_PREFIX));
    }

    #[test]
    fn test_missing_translations() {
        let mut doc = load(
            r#"<xliff version="1.2"><file source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="a"><source>A</source></trans-unit>
<trans-unit id="b"><source>B</source><target/></trans-unit>
<trans-unit id="c" translate="no"><source>C</source></trans-unit>
<trans-unit id="d"><source>D</source><target>Dé</target></trans-unit>
</body></file></xliff>"#,
        );
        let report = check_document(&mut doc, &options(&[]));
        assert_eq!(report.missing_count, 2);
        assert_eq!(report.needs_work_count, 0);

        let a = doc.find_unit_by_id("a").unwrap();
        assert_eq!(doc.state(a), Some(TranslationState::Missing));
        let c = doc.find_unit_by_id("c").unwrap();
        assert_eq!(doc.target_node(c), None);
    }

    #[test]
    fn test_custom_sentinel_counts_as_missing() {
        let settings = Settings {
            missing_translation: "TODO".to_string(),
            ..Settings::default()
        };
        let mut doc = XliffDocument::load(
            r#"<xliff version="1.2"><file source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="a"><source>A</source><target>TODO</target></trans-unit>
</body></file></xliff>"#,
            settings.document(),
        )
        .unwrap();
        assert_eq!(check_document(&mut doc, &settings.check()).missing_count, 1);
    }

    #[test]
    fn test_source_equals_target_for_same_language() {
        let mut doc = load(
            r#"<xliff version="2.0" srcLang="en-US" trgLang="en-US"><file id="f1">
<unit id="u1"><segment state="translated"><source>Color</source><target>Colour</target></segment></unit>
</file></xliff>"#,
        );
        let report = check_document(&mut doc, &options(&[NeedsWorkRule::SourceEqualsTarget]));
        assert_eq!(report.needs_work_count, 1);
        let unit = doc.find_unit_by_id("u1").unwrap();
        assert_eq!(doc.state(unit), Some(TranslationState::NeedsWork));
        assert!(doc.extract().unwrap().contains(r#"<notes><note category="XLIFF Sync""#));
    }

    #[test]
    fn test_source_change_needs_work_is_kept() {
        let mut doc = load(&format!(
            r#"<xliff version="1.2"><file source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="a"><source>Hello</source><target state="needs-adaptation">Bonjour</target><note from="XLIFF Sync" annotates="general" priority="1">{SOURCE_CHANGED_NOTE}</note></trans-unit>
</body></file></xliff>"#
        ));
        let report = check_document(&mut doc, &options(&[NeedsWorkRule::Placeholders]));
        assert_eq!(report.needs_work_count, 1);
        assert!(!report.problem_resolved());
        let unit = doc.find_unit_by_id("a").unwrap();
        assert_eq!(doc.unit_xliff_sync_note(unit).as_deref(), Some(SOURCE_CHANGED_NOTE));
    }

    #[test]
    fn test_line_endings_in_checks() {
        let content = "<xliff version=\"1.2\"><file source-language=\"en-US\" target-language=\"fr-FR\"><body>\n<trans-unit id=\"a\"><source>Line\r\nbreak</source><target>Ligne\nsuite</target></trans-unit>\n</body></file></xliff>";
        let rules = [NeedsWorkRule::ConsecutiveSpacesConsistent];

        let mut doc = load(content);
        assert_eq!(check_document(&mut doc, &options(&rules)).needs_work_count, 1);

        let mut doc = load(content);
        let ignoring = CheckOptions {
            ignore_line_endings: true,
            ..options(&rules)
        };
        assert_eq!(check_document(&mut doc, &ignoring).needs_work_count, 0);
    }

    #[test]
    fn test_disabled_families() {
        let mut doc = load(PLACEHOLDERS_V12);
        let only_missing = CheckOptions {
            check_needs_work: false,
            ..options(&[NeedsWorkRule::Placeholders])
        };
        let report = check_document(&mut doc, &only_missing);
        assert!(!report.needs_write());
    }
}
