//! Per-version structural knowledge of XLIFF documents
//!
//! Everything that differs between XLIFF 1.2 and 2.0 (where languages live,
//! how units nest, how notes and states are encoded) sits behind
//! [`XliffSchema`]. The document layer only talks to the trait.

use super::state::{TranslationState, XliffVersion};
use crate::formats::xml::{Attributes, NodeId, XmlChild, XmlTree};

/// Structural operations that depend on the XLIFF version.
pub trait XliffSchema: std::fmt::Debug + Send + Sync {
    fn version(&self) -> XliffVersion;

    fn source_language(&self, tree: &XmlTree, root: NodeId) -> Option<String>;

    fn target_language(&self, tree: &XmlTree, root: NodeId) -> Option<String>;

    fn set_target_language(&self, tree: &mut XmlTree, root: NodeId, language: &str);

    /// Translation units in document order.
    fn translation_units(&self, tree: &XmlTree, root: NodeId) -> Vec<NodeId>;

    /// The element that holds `<source>` and `<target>` for a unit.
    fn segment(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId>;

    /// The element that holds a unit's notes, if present.
    fn notes_parent(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId>;

    /// Like [`Self::notes_parent`], creating the container when the version needs one.
    fn ensure_notes_parent(&self, tree: &mut XmlTree, unit: NodeId) -> NodeId;

    /// Attribute that names who wrote a note (`from` or `category`).
    fn note_discriminator(&self) -> &'static str;

    /// The element carrying the state attributes.
    fn state_node(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId>;

    fn read_state(&self, attributes: &Attributes, needs_work_substate: &str)
    -> Option<TranslationState>;

    fn write_state(
        &self,
        attributes: &mut Attributes,
        state: TranslationState,
        needs_work_substate: &str,
    );

    /// Whether a target unit child with this name is carried over to the merged unit.
    fn is_preservable_child(&self, name: &str) -> bool;

    /// A minimal document for a new target language.
    fn create_shell(&self, target_language: &str) -> XmlTree;
}

/// The strategy for a version.
#[must_use]
pub fn schema_for(version: XliffVersion) -> &'static dyn XliffSchema {
    match version {
        XliffVersion::V12 => &Xliff12,
        XliffVersion::V20 => &Xliff20,
    }
}

// ==================== XLIFF 1.2 ====================

/// XLIFF 1.2: `file/body/trans-unit`, languages on `<file>`, state on `<target>`.
#[derive(Debug, Clone, Copy)]
pub struct Xliff12;

const V12_UNIT_CHILDREN: [&str; 7] = [
    "source",
    "seg-source",
    "target",
    "context-group",
    "count-group",
    "prop-group",
    "note",
];

impl Xliff12 {
    fn collect_units(tree: &XmlTree, parent: NodeId, units: &mut Vec<NodeId>) {
        for child in tree.child_elements(parent) {
            match tree.name(child) {
                "trans-unit" => units.push(child),
                "group" => Self::collect_units(tree, child, units),
                _ => {}
            }
        }
    }
}

impl XliffSchema for Xliff12 {
    fn version(&self) -> XliffVersion {
        XliffVersion::V12
    }

    fn source_language(&self, tree: &XmlTree, root: NodeId) -> Option<String> {
        let file = tree.find_descendant(root, "file")?;
        tree.attribute(file, "source-language").map(str::to_string)
    }

    fn target_language(&self, tree: &XmlTree, root: NodeId) -> Option<String> {
        let file = tree.find_descendant(root, "file")?;
        tree.attribute(file, "target-language").map(str::to_string)
    }

    fn set_target_language(&self, tree: &mut XmlTree, root: NodeId, language: &str) {
        if let Some(file) = tree.find_descendant(root, "file") {
            tree.set_attribute(file, "target-language", language);
        }
    }

    fn translation_units(&self, tree: &XmlTree, root: NodeId) -> Vec<NodeId> {
        let mut units = Vec::new();
        if let Some(body) = tree.find_descendant(root, "body") {
            Self::collect_units(tree, body, &mut units);
        }
        units
    }

    fn segment(&self, _tree: &XmlTree, unit: NodeId) -> Option<NodeId> {
        Some(unit)
    }

    fn notes_parent(&self, _tree: &XmlTree, unit: NodeId) -> Option<NodeId> {
        Some(unit)
    }

    fn ensure_notes_parent(&self, _tree: &mut XmlTree, unit: NodeId) -> NodeId {
        unit
    }

    fn note_discriminator(&self) -> &'static str {
        "from"
    }

    fn state_node(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId> {
        tree.find_child(unit, "target")
    }

    fn read_state(&self, attributes: &Attributes, _needs_work_substate: &str)
    -> Option<TranslationState> {
        match attributes.get("state").map(String::as_str) {
            Some("needs-translation") => Some(TranslationState::Missing),
            Some("needs-adaptation" | "needs-l10n") => Some(TranslationState::NeedsWork),
            Some("translated") => Some(TranslationState::Translated),
            _ => None,
        }
    }

    fn write_state(
        &self,
        attributes: &mut Attributes,
        state: TranslationState,
        _needs_work_substate: &str,
    ) {
        let value = match state {
            TranslationState::Missing => "needs-translation",
            TranslationState::NeedsWork => "needs-adaptation",
            TranslationState::Translated => "translated",
        };
        attributes.insert("state".to_string(), value.to_string());
    }

    fn is_preservable_child(&self, name: &str) -> bool {
        name == "alt-trans" || !V12_UNIT_CHILDREN.contains(&name)
    }

    fn create_shell(&self, target_language: &str) -> XmlTree {
        let mut tree = XmlTree::with_root("xliff");
        if let Some(root) = tree.root() {
            tree.set_attribute(root, "version", "1.2");
            let mut attributes = Attributes::new();
            attributes.insert("target-language".to_string(), target_language.to_string());
            let file = tree.create_element_with("file", attributes);
            tree.append_child(root, XmlChild::Element(file));
        }
        tree
    }
}

// ==================== XLIFF 2.0 ====================

/// XLIFF 2.0: `file/unit/segment`, languages on the root, state on `<segment>`.
#[derive(Debug, Clone, Copy)]
pub struct Xliff20;

const V20_UNIT_CHILDREN: [&str; 4] = ["segment", "ignorable", "notes", "originalData"];

impl XliffSchema for Xliff20 {
    fn version(&self) -> XliffVersion {
        XliffVersion::V20
    }

    fn source_language(&self, tree: &XmlTree, root: NodeId) -> Option<String> {
        tree.attribute(root, "srcLang").map(str::to_string)
    }

    fn target_language(&self, tree: &XmlTree, root: NodeId) -> Option<String> {
        tree.attribute(root, "trgLang").map(str::to_string)
    }

    fn set_target_language(&self, tree: &mut XmlTree, root: NodeId, language: &str) {
        tree.set_attribute(root, "trgLang", language);
    }

    fn translation_units(&self, tree: &XmlTree, root: NodeId) -> Vec<NodeId> {
        let Some(file) = tree.find_descendant(root, "file") else {
            return Vec::new();
        };
        tree.child_elements(file)
            .filter(|&child| tree.name(child) == "unit")
            .collect()
    }

    fn segment(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId> {
        tree.find_child(unit, "segment")
    }

    fn notes_parent(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId> {
        tree.find_child(unit, "notes")
    }

    fn ensure_notes_parent(&self, tree: &mut XmlTree, unit: NodeId) -> NodeId {
        if let Some(notes) = tree.find_child(unit, "notes") {
            return notes;
        }
        let notes = tree.create_element("notes");

        // <notes> has to come before the first segment.
        let first_segment = tree.children(unit).iter().position(|child| {
            child
                .as_element()
                .is_some_and(|id| matches!(tree.name(id), "segment" | "ignorable"))
        });
        match first_segment {
            Some(index) => {
                let indent = index
                    .checked_sub(1)
                    .map(|i| &tree.children(unit)[i])
                    .filter(|child| child.is_whitespace())
                    .cloned();
                tree.insert_child(unit, index, XmlChild::Element(notes));
                if let Some(indent) = indent {
                    tree.insert_child(unit, index + 1, indent);
                }
            }
            None => tree.append_child(unit, XmlChild::Element(notes)),
        }
        notes
    }

    fn note_discriminator(&self) -> &'static str {
        "category"
    }

    fn state_node(&self, tree: &XmlTree, unit: NodeId) -> Option<NodeId> {
        tree.find_child(unit, "segment")
    }

    fn read_state(&self, attributes: &Attributes, needs_work_substate: &str)
    -> Option<TranslationState> {
        match attributes.get("state").map(String::as_str) {
            Some("initial") => Some(TranslationState::Missing),
            Some("translated") => {
                if attributes.get("subState").map(String::as_str) == Some(needs_work_substate) {
                    Some(TranslationState::NeedsWork)
                } else {
                    Some(TranslationState::Translated)
                }
            }
            _ => None,
        }
    }

    fn write_state(
        &self,
        attributes: &mut Attributes,
        state: TranslationState,
        needs_work_substate: &str,
    ) {
        match state {
            TranslationState::Missing => {
                attributes.insert("state".to_string(), "initial".to_string());
                attributes.shift_remove("subState");
            }
            TranslationState::NeedsWork => {
                attributes.insert("state".to_string(), "translated".to_string());
                attributes.insert("subState".to_string(), needs_work_substate.to_string());
            }
            TranslationState::Translated => {
                attributes.insert("state".to_string(), "translated".to_string());
                attributes.shift_remove("subState");
            }
        }
    }

    fn is_preservable_child(&self, name: &str) -> bool {
        !V20_UNIT_CHILDREN.contains(&name)
    }

    fn create_shell(&self, target_language: &str) -> XmlTree {
        let mut tree = XmlTree::with_root("xliff");
        if let Some(root) = tree.root() {
            tree.set_attribute(root, "version", "2.0");
            tree.set_attribute(root, "trgLang", target_language);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::xml::parse_xml;

    #[test]
    fn test_v12_units_include_nested_groups_in_document_order() {
        let tree = parse_xml(
            r#"<xliff version="1.2"><file><body>
<trans-unit id="a"/>
<group><group><trans-unit id="b"/></group></group>
<trans-unit id="c"/>
</body></file></xliff>"#,
        )
        .unwrap();
        let root = tree.root().unwrap();
        let ids: Vec<_> = Xliff12
            .translation_units(&tree, root)
            .into_iter()
            .map(|unit| tree.attribute(unit, "id").unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_v20_state_mapping() {
        let mut attributes = Attributes::new();
        for state in [
            TranslationState::NeedsWork,
            TranslationState::Missing,
            TranslationState::Translated,
        ] {
            Xliff20.write_state(&mut attributes, state, "xliffSync:needsWork");
            assert_eq!(Xliff20.read_state(&attributes, "xliffSync:needsWork"), Some(state));
        }
        assert!(!attributes.contains_key("subState"));
    }

    #[test]
    fn test_v12_reads_needs_l10n_as_needs_work() {
        let mut attributes = Attributes::new();
        attributes.insert("state".to_string(), "needs-l10n".to_string());
        assert_eq!(Xliff12.read_state(&attributes, ""), Some(TranslationState::NeedsWork));
        attributes.insert("state".to_string(), "final".to_string());
        assert_eq!(Xliff12.read_state(&attributes, ""), None);
    }

    #[test]
    fn test_preservable_children() {
        assert!(Xliff12.is_preservable_child("alt-trans"));
        assert!(Xliff12.is_preservable_child("custom"));
        assert!(!Xliff12.is_preservable_child("note"));
        assert!(Xliff20.is_preservable_child("mtc:matches"));
        assert!(!Xliff20.is_preservable_child("segment"));
    }

    #[test]
    fn test_v20_notes_container_goes_before_segment() {
        let mut tree = parse_xml("<unit id=\"u\">\n  <segment/>\n</unit>").unwrap();
        let unit = tree.root().unwrap();
        let notes = Xliff20.ensure_notes_parent(&mut tree, unit);
        let names: Vec<_> = tree.child_elements(unit).map(|id| tree.name(id).to_string()).collect();
        assert_eq!(names, vec!["notes", "segment"]);
        assert_eq!(Xliff20.ensure_notes_parent(&mut tree, unit), notes);
    }
}
