use pretty_assertions::assert_eq;
use xliffsync::check::{NeedsWorkRule, PROBLEM_NOTE_PREFIX, Problem, RuleSet, check_document};
use xliffsync::config::{DocumentSettings, Settings};
use xliffsync::formats::xml::XmlFragment;
use xliffsync::prelude::*;
use xliffsync::sync::{MatchIndex, MatchStrategies, SOURCE_CHANGED_NOTE, UnitKeys, UnitMaps};

fn v12(target_language: &str, units: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2">
  <file source-language="en-US" target-language="{target_language}" original="App">
    <body>
{units}
    </body>
  </file>
</xliff>"#
    )
}

fn sync(source: &str, target: &str, settings: &Settings) -> SyncOutput {
    synchronize(source, Some(target), None, settings).unwrap()
}

#[test]
fn test_unmatched_unit_gets_missing_target() {
    let source = v12(
        "en-US",
        r#"      <trans-unit id="greet">
        <source>Hello %1</source>
      </trans-unit>"#,
    );
    let target = v12(
        "fr-FR",
        r#"      <trans-unit id="other">
        <source>Other</source>
        <target state="translated">Autre</target>
      </trans-unit>"#,
    );
    let settings = Settings {
        missing_translation: "TODO".to_string(),
        ..Settings::default()
    };

    let output = sync(&source, &target, &settings);
    let expected = v12(
        "fr-FR",
        r#"      <trans-unit id="greet">
        <source>Hello %1</source>
        <target state="needs-translation">TODO</target>
      </trans-unit>"#,
    );
    assert_eq!(output.content, expected);
    assert_eq!(output.stats.missing, 1);
}

#[test]
fn test_donor_by_source_and_developer_note() {
    let source = v12(
        "en-US",
        r#"      <trans-unit id="greet2">
        <source>Hello</source>
        <note from="Developer">Comment</note>
      </trans-unit>"#,
    );
    let target = v12(
        "fr-FR",
        r#"      <trans-unit id="greet">
        <source>Hello</source>
        <target state="translated">Bonjour <g id="1">tous</g></target>
        <note from="Developer">Comment</note>
      </trans-unit>"#,
    );
    let settings = Settings {
        find_by_source_and_developer_note: true,
        ..Settings::default()
    };

    let output = sync(&source, &target, &settings);
    let merged = XliffDocument::load(&output.content, settings.document()).unwrap();
    let unit = merged.find_unit_by_id("greet2").unwrap();
    assert!(output.content.contains(r#"<target state="translated">Bonjour <g id="1">tous</g></target>"#));
    assert_eq!(merged.state(unit), Some(TranslationState::Translated));
    assert_eq!(output.stats.by_source_and_developer_note, 1);
}

#[test]
fn test_changed_source_is_flagged() {
    let source = v12(
        "en-US",
        r#"      <trans-unit id="greet">
        <source>Hello %1 %2</source>
      </trans-unit>"#,
    );
    let target = v12(
        "fr-FR",
        r#"      <trans-unit id="greet">
        <source>Hello %1</source>
        <target state="translated">Bonjour %1</target>
      </trans-unit>"#,
    );

    let output = sync(&source, &target, &Settings::default());
    let expected = v12(
        "fr-FR",
        &format!(
            r#"      <trans-unit id="greet">
        <source>Hello %1 %2</source>
        <target state="needs-adaptation">Bonjour %1</target>
        <note from="XLIFF Sync" annotates="general" priority="1">{SOURCE_CHANGED_NOTE}</note>
      </trans-unit>"#
        ),
    );
    assert_eq!(output.content, expected);
    assert_eq!(output.stats.source_changed, 1);
}

#[test]
fn test_changed_source_is_cleared() {
    let source = v12("en-US", r#"<trans-unit id="greet"><source>Hello %1 %2</source></trans-unit>"#);
    let target = v12(
        "fr-FR",
        r#"<trans-unit id="greet"><source>Hello %1</source><target state="translated">Bonjour %1</target></trans-unit>"#,
    );
    let settings = Settings {
        clear_translation_after_source_text_change: true,
        ..Settings::default()
    };

    let output = sync(&source, &target, &settings);
    let merged = XliffDocument::load(&output.content, settings.document()).unwrap();
    let unit = merged.find_unit_by_id("greet").unwrap();
    assert_eq!(merged.unit_translation_text(unit).as_deref(), Some(""));
    assert_eq!(merged.state(unit), Some(TranslationState::Missing));
    assert_eq!(merged.unit_xliff_sync_note(unit), None);
}

#[test]
fn test_untranslatable_unit_loses_target() {
    let source = v12(
        "en-US",
        r#"      <trans-unit id="code" translate="no">
        <source>SKU-1</source>
      </trans-unit>"#,
    );
    let target = v12(
        "fr-FR",
        r#"      <trans-unit id="code" translate="no">
        <source>SKU-1</source>
        <target>SKU-1</target>
      </trans-unit>"#,
    );

    let output = sync(&source, &target, &Settings::default());
    assert!(!output.content.contains("<target"));
    assert_eq!(output.stats.missing, 0);
}

#[test]
fn test_placeholder_problem_and_resolution() {
    let content = v12(
        "fr-FR",
        r#"      <trans-unit id="value">
        <source>Value: %1, %2</source>
        <target state="translated">Valeur : %1</target>
      </trans-unit>"#,
    );
    let settings = Settings {
        need_work_translation_rules: vec![NeedsWorkRule::Placeholders],
        ..Settings::default()
    };
    let options = settings.check();

    let mut doc = XliffDocument::load(&content, settings.document()).unwrap();
    let unit = doc.find_unit_by_id("value").unwrap();
    let first = check_document(&mut doc, &options);
    assert!(first.problem_detected());
    assert_eq!(doc.state(unit), Some(TranslationState::NeedsWork));
    assert_eq!(
        doc.unit_xliff_sync_note(unit),
        Some(Problem::PlaceholderMismatch.note())
    );

    // Fix the translation on disk and check the reloaded file
    let fixed = doc.extract().unwrap().replace(">Valeur : %1<", ">Valeur : %1, %2<");
    let mut doc = XliffDocument::load(&fixed, settings.document()).unwrap();
    let unit = doc.find_unit_by_id("value").unwrap();
    let second = check_document(&mut doc, &options);
    assert!(second.problem_resolved());
    assert_eq!(second.needs_work_count, 0);
    assert_ne!(doc.state(unit), Some(TranslationState::NeedsWork));
    assert!(!doc.extract().unwrap().contains(PROBLEM_NOTE_PREFIX));
}

#[test]
fn test_id_match_wins_over_generator_note() {
    let source = v12(
        "en-US",
        r#"<trans-unit id="a"><source>Hello</source><note from="Xliff Generator">Page B</note></trans-unit>"#,
    );
    let target = v12(
        "fr-FR",
        r#"<trans-unit id="b"><source>Hello</source><target state="translated">Par note</target><note from="Xliff Generator">Page B</note></trans-unit>
<trans-unit id="a"><source>Hello</source><target state="translated">Par id</target><note from="Xliff Generator">Page A</note></trans-unit>"#,
    );

    let output = sync(&source, &target, &Settings::default());
    assert!(output.content.contains("Par id"));
    assert!(!output.content.contains("Par note"));
    assert_eq!(output.stats.by_id, 1);
}

#[test]
fn test_missing_sentinel_for_every_unmatched_unit() {
    let settings = Settings {
        missing_translation: "[missing]".to_string(),
        ..Settings::default()
    };
    let units: String = (0..5)
        .map(|i| format!(r#"<trans-unit id="u{i}"><source>Text {i}</source></trans-unit>"#))
        .collect();
    let source = v12("en-US", &units);

    let output = synchronize(&source, None, Some("de-DE"), &settings).unwrap();
    let merged = XliffDocument::load(&output.content, settings.document()).unwrap();
    for &unit in merged.translation_units() {
        assert_eq!(merged.unit_translation_text(unit).as_deref(), Some("[missing]"));
        assert_eq!(merged.state(unit), Some(TranslationState::Missing));
    }
    assert_eq!(output.stats.missing, 5);
}

#[test]
fn test_sync_is_idempotent() {
    let source = v12(
        "en-US",
        r#"      <trans-unit id="a">
        <source>Hello %1</source>
        <note from="Xliff Generator">Page A</note>
      </trans-unit>
      <trans-unit id="b">
        <source>New</source>
      </trans-unit>"#,
    );
    let target = v12(
        "fr-FR",
        r#"      <trans-unit id="a">
        <source>Hello %1</source>
        <target state="translated">Bonjour %1</target>
        <alt-trans><target>Salut</target></alt-trans>
        <note from="Xliff Generator">Page A</note>
      </trans-unit>"#,
    );
    let settings = Settings {
        preserve_target_child_nodes: true,
        ..Settings::default()
    };

    let once = sync(&source, &target, &settings);
    let twice = sync(&source, &once.content, &settings);
    assert_eq!(twice.content, once.content);
}

#[test]
fn test_round_trip_without_merge() {
    let content = v12(
        "fr-FR",
        r#"      <!-- generated -->
      <group id="g1">
        <trans-unit id="a" size-unit="char" translate="yes" xml:space="preserve">
          <source>Fish &amp; Chips &lt;b&gt;</source>
          <target state="translated">Poisson &amp; frites</target>
          <note from="Developer" annotates="general" priority="2"/>
        </trans-unit>
      </group>"#,
    );
    let doc = XliffDocument::load(&content, DocumentSettings::default()).unwrap();
    assert_eq!(doc.extract().unwrap(), content);
}

#[test]
fn test_state_round_trip_for_both_versions() {
    let v20 = r#"<xliff version="2.0" srcLang="en-US" trgLang="fr-FR"><file id="f"><unit id="u"><segment><source>A</source><target>B</target></segment></unit></file></xliff>"#;
    let v12 = v12("fr-FR", r#"<trans-unit id="u"><source>A</source></trans-unit>"#);
    for content in [v20, v12.as_str()] {
        let mut doc = XliffDocument::load(content, DocumentSettings::default()).unwrap();
        let unit = doc.find_unit_by_id("u").unwrap();
        for state in [
            TranslationState::Missing,
            TranslationState::NeedsWork,
            TranslationState::Translated,
        ] {
            doc.set_state(unit, state);
            assert_eq!(doc.state(unit), Some(state), "{content}");
        }
    }
}

#[test]
fn test_indexed_and_linear_matching_agree() {
    let target = XliffDocument::load(
        &v12(
            "fr-FR",
            r#"<trans-unit id="a"><source>Save</source><target>Enregistrer</target><note from="Developer">Button</note><note from="Xliff Generator">Page A - Action Save</note></trans-unit>
<trans-unit id="b"><source>Save</source><target>Sauver</target><note from="Xliff Generator">Page B - Action Save</note></trans-unit>
<trans-unit id="c"><source>Close</source></trans-unit>
<trans-unit id="d"><source>Close</source><target>Fermer</target><note from="Developer">Button</note></trans-unit>"#,
        ),
        DocumentSettings::default(),
    )
    .unwrap();
    let source = XliffDocument::load(
        &v12(
            "en-US",
            r#"<trans-unit id="a"><source>Other</source></trans-unit>
<trans-unit id="x1"><source>Save</source><note from="Xliff Generator">Page B - Action Save</note></trans-unit>
<trans-unit id="x2"><source>Save</source><note from="Developer">Button</note><note from="Xliff Generator">Page C</note></trans-unit>
<trans-unit id="x3"><source>Close</source><note from="Developer">Button</note></trans-unit>
<trans-unit id="x4"><source>Close</source></trans-unit>
<trans-unit id="x5"><source>Unknown</source></trans-unit>"#,
        ),
        DocumentSettings::default(),
    )
    .unwrap();

    let indexed = MatchStrategies::all();
    let linear = MatchStrategies {
        unit_maps: UnitMaps::Disabled,
        ..MatchStrategies::all()
    };
    assert_eq!(MatchIndex::build(&target, &linear).map_count(), 0);

    let mut with_index = Matcher::new(&target, indexed);
    let mut without_index = Matcher::new(&target, linear);
    for &unit in source.translation_units() {
        let keys = UnitKeys::of(&source, unit);
        let a = with_index.find(&keys);
        let b = without_index.find(&keys);
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

#[test]
fn test_placeholder_rule_flags_missing_placeholder() {
    for enable_all in [false, true] {
        let options = CheckOptions {
            check_missing: false,
            check_needs_work: true,
            rules: RuleSet::new([NeedsWorkRule::Placeholders], enable_all),
            ..CheckOptions::default()
        };
        let mut doc = XliffDocument::load(
            &v12(
                "fr-FR",
                r#"<trans-unit id="a"><source>Open %1</source><target>Ouvrir</target></trans-unit>"#,
            ),
            DocumentSettings::default(),
        )
        .unwrap();
        assert_eq!(check_document(&mut doc, &options).needs_work_count, 1);
    }
}

#[test]
fn test_v20_sync_keeps_segment_state_and_notes() {
    let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="2.0" xmlns="urn:oasis:names:tc:xliff:document:2.0" srcLang="en-US" trgLang="en-US">
  <file id="f1" original="App">
    <unit id="u1">
      <notes>
        <note category="Developer">Greeting</note>
      </notes>
      <segment>
        <source>Hello</source>
      </segment>
    </unit>
  </file>
</xliff>"#;
    let target = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="2.0" xmlns="urn:oasis:names:tc:xliff:document:2.0" srcLang="en-US" trgLang="nl-NL">
  <file id="f1" original="App">
    <unit id="u1">
      <notes>
        <note category="Developer">Greeting</note>
      </notes>
      <segment state="translated">
        <source>Hello</source>
        <target>Hallo</target>
      </segment>
    </unit>
  </file>
</xliff>"#;

    let output = sync(source, target, &Settings::default());
    assert_eq!(output.content, target);
}

#[test]
fn test_fragment_translation_is_copied() {
    let mut doc = XliffDocument::load(
        &v12("fr-FR", r#"<trans-unit id="a"><source>A</source><target/></trans-unit>"#),
        DocumentSettings::default(),
    )
    .unwrap();
    let unit = doc.find_unit_by_id("a").unwrap();
    doc.set_unit_translation(unit, &XmlFragment::from_text("Å"));
    assert_eq!(doc.unit_translation_text(unit).as_deref(), Some("Å"));
}
