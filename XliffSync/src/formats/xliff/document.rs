//! XLIFF document wrapper
//!
//! [`XliffDocument`] owns the XML tree of one catalog and exposes units, content,
//! notes and states the same way for XLIFF 1.2 and 2.0. Version differences are
//! delegated to the [`XliffSchema`] picked when the document is loaded.
//!
//! Accessors on an invalid document (unsupported or missing version) return
//! `None` or nothing, so batch callers can skip such files after one check of
//! [`XliffDocument::is_valid`].

use std::cell::OnceCell;
use std::fs;
use std::path::Path;

use super::schema::{XliffSchema, schema_for};
use super::state::{TranslationState, XliffVersion};
use crate::config::DocumentSettings;
use crate::error::{Error, Result};
use crate::formats::xml::{
    Attributes, NodeId, SerializeOptions, XmlChild, XmlFragment, XmlTree, flatten_text,
    parse_xml, serialize_element, serialize_xml,
};

/// Designation of notes written by this tool.
pub const XLIFF_SYNC_NOTE_DESIGNATION: &str = "XLIFF Sync";

/// An XLIFF 1.2 or 2.0 document.
#[derive(Debug, Clone)]
pub struct XliffDocument {
    pub(crate) tree: XmlTree,
    pub(crate) root: NodeId,
    pub(crate) schema: Option<&'static dyn XliffSchema>,
    pub(crate) settings: DocumentSettings,
    units: OnceCell<Vec<NodeId>>,
}

impl XliffDocument {
    /// Read and validate a document from disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a usable XLIFF document.
    pub fn read<P: AsRef<Path>>(path: P, settings: DocumentSettings) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::load(&content, settings)
    }

    /// Parse and validate a document
    ///
    /// # Errors
    /// Returns [`Error::MalformedDocument`] for broken XML,
    /// [`Error::UnsupportedVersion`] if the version is absent or unknown, and
    /// [`Error::MissingSourceLanguage`] if no source language is declared.
    pub fn load(content: &str, settings: DocumentSettings) -> Result<Self> {
        let document = Self::parse(content, settings)?;
        if document.schema.is_none() {
            return Err(Error::UnsupportedVersion {
                version: document.raw_version().map(str::to_string),
            });
        }
        if document.source_language().is_none_or(|language| language.is_empty()) {
            return Err(Error::MissingSourceLanguage);
        }
        Ok(document)
    }

    /// Parse a document without validating it.
    ///
    /// # Errors
    /// Returns [`Error::MalformedDocument`] only; check [`Self::is_valid`] afterwards.
    pub fn parse(content: &str, settings: DocumentSettings) -> Result<Self> {
        let tree = parse_xml(content)?;
        let root = tree
            .root()
            .ok_or_else(|| Error::malformed("no root element"))?;
        let schema = if tree.name(root) == "xliff" {
            tree.attribute(root, "version")
                .and_then(|version| version.parse::<XliffVersion>().ok())
                .map(schema_for)
        } else {
            None
        };
        Ok(Self::from_parts(tree, root, schema, settings))
    }

    /// An empty shell for a new target language.
    #[must_use]
    pub fn create(version: XliffVersion, target_language: &str, settings: DocumentSettings) -> Self {
        let schema = schema_for(version);
        let mut tree = schema.create_shell(target_language);
        let root = match tree.root() {
            Some(root) => root,
            None => {
                let root = tree.create_element("xliff");
                tree.set_root(root);
                root
            }
        };
        Self::from_parts(tree, root, Some(schema), settings)
    }

    fn from_parts(
        tree: XmlTree,
        root: NodeId,
        schema: Option<&'static dyn XliffSchema>,
        settings: DocumentSettings,
    ) -> Self {
        XliffDocument {
            tree,
            root,
            schema,
            settings,
            units: OnceCell::new(),
        }
    }

    /// Serialize the document with the configured self-closing and declaration policy
    ///
    /// # Errors
    /// Returns [`Error::NoOutputGenerated`] for an invalid document.
    pub fn extract(&self) -> Result<String> {
        if !self.is_valid() {
            return Err(Error::NoOutputGenerated {
                reason: format!(
                    "unsupported XLIFF version {}",
                    self.raw_version().unwrap_or("(none)")
                ),
            });
        }
        serialize_xml(&self.tree, self.settings.serialize)
    }

    /// Drop elements that are no longer reachable from the root
    ///
    /// Unit and node handles taken before are invalid afterwards.
    pub fn compact(&mut self) {
        self.tree = self.tree.compacted();
        if let Some(root) = self.tree.root() {
            self.root = root;
        }
        self.units = OnceCell::new();
    }

    // ==================== Document properties ====================

    /// Supported version with a resolvable source language.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.schema.is_some() && self.source_language().is_some_and(|language| !language.is_empty())
    }

    #[must_use]
    pub fn version(&self) -> Option<XliffVersion> {
        self.schema.map(|schema| schema.version())
    }

    /// The root `version` attribute as written.
    #[must_use]
    pub fn raw_version(&self) -> Option<&str> {
        self.tree.attribute(self.root, "version")
    }

    #[must_use]
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    #[must_use]
    pub fn source_language(&self) -> Option<String> {
        self.schema?.source_language(&self.tree, self.root)
    }

    #[must_use]
    pub fn target_language(&self) -> Option<String> {
        self.schema?.target_language(&self.tree, self.root)
    }

    pub fn set_target_language(&mut self, language: &str) {
        if let Some(schema) = self.schema {
            schema.set_target_language(&mut self.tree, self.root, language);
        }
    }

    /// The `original` attribute of the first `<file>`.
    #[must_use]
    pub fn original(&self) -> Option<&str> {
        self.schema?;
        let file = self.tree.find_descendant(self.root, "file")?;
        self.tree.attribute(file, "original")
    }

    /// Translation units in document order (computed on first use).
    pub fn translation_units(&self) -> &[NodeId] {
        self.units.get_or_init(|| match self.schema {
            Some(schema) => schema.translation_units(&self.tree, self.root),
            None => Vec::new(),
        })
    }

    /// First unit with the given id, by linear scan.
    #[must_use]
    pub fn find_unit_by_id(&self, id: &str) -> Option<NodeId> {
        self.translation_units()
            .iter()
            .copied()
            .find(|&unit| self.unit_id(unit) == Some(id))
    }

    // ==================== Unit content ====================

    #[must_use]
    pub fn unit_id(&self, unit: NodeId) -> Option<&str> {
        self.tree.attribute(unit, "id")
    }

    /// `translate` attribute, defaulting to yes.
    #[must_use]
    pub fn unit_needs_translation(&self, unit: NodeId) -> bool {
        self.tree
            .attribute(unit, "translate")
            .is_none_or(|translate| translate == "yes")
    }

    /// The element holding `<source>`/`<target>` of a unit.
    #[must_use]
    pub fn segment_node(&self, unit: NodeId) -> Option<NodeId> {
        self.schema?.segment(&self.tree, unit)
    }

    #[must_use]
    pub fn source_node(&self, unit: NodeId) -> Option<NodeId> {
        let segment = self.segment_node(unit)?;
        self.tree.find_child(segment, "source")
    }

    #[must_use]
    pub fn target_node(&self, unit: NodeId) -> Option<NodeId> {
        let segment = self.segment_node(unit)?;
        self.tree.find_child(segment, "target")
    }

    /// The serialized `<source>` element, used as a matching key.
    #[must_use]
    pub fn unit_source(&self, unit: NodeId) -> Option<String> {
        let source = self.source_node(unit)?;
        serialize_element(&self.tree, source, SerializeOptions::fragment()).ok()
    }

    /// Rich content of `<source>`, detached from this document.
    #[must_use]
    pub fn unit_source_children(&self, unit: NodeId) -> Option<XmlFragment> {
        let source = self.source_node(unit)?;
        Some(XmlFragment::copy_of(&self.tree, self.tree.children(source)))
    }

    /// Flattened `<source>` text.
    #[must_use]
    pub fn unit_source_text(&self, unit: NodeId) -> Option<String> {
        let source = self.source_node(unit)?;
        Some(flatten_text(&self.tree, self.tree.children(source)))
    }

    /// Rich content of `<target>`, detached from this document.
    #[must_use]
    pub fn unit_translation_children(&self, unit: NodeId) -> Option<XmlFragment> {
        let target = self.target_node(unit)?;
        Some(XmlFragment::copy_of(&self.tree, self.tree.children(target)))
    }

    /// Flattened `<target>` text.
    #[must_use]
    pub fn unit_translation_text(&self, unit: NodeId) -> Option<String> {
        let target = self.target_node(unit)?;
        Some(flatten_text(&self.tree, self.tree.children(target)))
    }

    /// A translation that is present, non-empty and not the missing sentinel.
    #[must_use]
    pub fn unit_has_translation(&self, unit: NodeId) -> bool {
        self.unit_translation_text(unit)
            .is_some_and(|text| !text.is_empty() && text != self.settings.missing_translation)
    }

    #[must_use]
    pub fn unit_developer_note(&self, unit: NodeId) -> Option<String> {
        self.note_text(unit, &self.settings.developer_note_designation)
    }

    #[must_use]
    pub fn unit_generator_note(&self, unit: NodeId) -> Option<String> {
        self.note_text(unit, &self.settings.generator_note_designation)
    }

    /// Text of the tool note, if any.
    #[must_use]
    pub fn unit_xliff_sync_note(&self, unit: NodeId) -> Option<String> {
        self.note_text(unit, XLIFF_SYNC_NOTE_DESIGNATION)
    }

    /// The translation for the target language embedded in the developer note as
    /// `lang=translation` entries.
    #[must_use]
    pub fn unit_translation_from_developer_note(&self, unit: NodeId) -> Option<String> {
        let note = self.unit_developer_note(unit)?;
        let language = self.target_language()?;
        let separator = self.settings.developer_note_separator.as_str();
        if separator.is_empty() {
            return None;
        }

        let translation = note.split(separator).find_map(|entry| {
            let (entry_language, translation) = entry.split_once('=')?;
            (entry_language == language).then_some(translation)
        })?;

        let trim = self.settings.developer_note_trim_characters.as_str();
        Some(translation.trim_matches(|c: char| trim.contains(c)).to_string())
    }

    fn note_node(&self, unit: NodeId, designation: &str) -> Option<(NodeId, usize)> {
        let schema = self.schema?;
        let parent = schema.notes_parent(&self.tree, unit)?;
        let discriminator = schema.note_discriminator();
        let index = self.tree.children(parent).iter().position(|child| {
            child.as_element().is_some_and(|note| {
                self.tree.name(note) == "note"
                    && self.tree.attribute(note, discriminator) == Some(designation)
            })
        })?;
        Some((parent, index))
    }

    fn note_text(&self, unit: NodeId, designation: &str) -> Option<String> {
        let (parent, index) = self.note_node(unit, designation)?;
        let note = self.tree.children(parent)[index].as_element()?;
        let texts: Vec<&str> = self
            .tree
            .children(note)
            .iter()
            .filter_map(XmlChild::as_text)
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    // ==================== Targets ====================

    /// A detached `<target>` element with a copy of `content`.
    pub fn create_target_node(&mut self, attributes: Attributes, content: Option<&XmlFragment>) -> NodeId {
        let target = self.tree.create_element_with("target", attributes);
        if let Some(content) = content {
            let children = self.tree.import_children(content.tree(), content.children());
            self.tree.set_children(target, children);
        }
        target
    }

    /// Put `target` in place: replace an existing `<target>`, else insert it after
    /// `<source>` (repeating the whitespace before `<source>`), else append it.
    pub fn append_target_node(&mut self, unit: NodeId, target: NodeId) {
        let Some(segment) = self.segment_node(unit) else {
            return;
        };
        if let Some(index) = self.tree.find_child_index(segment, "target") {
            self.tree.replace_child(segment, index, XmlChild::Element(target));
        } else if let Some(index) = self.tree.find_child_index(segment, "source") {
            self.insert_after(segment, index, target);
        } else {
            self.tree.append_child(segment, XmlChild::Element(target));
        }
    }

    /// Remove `<target>` together with the whitespace before it.
    pub fn delete_target_node(&mut self, unit: NodeId) -> bool {
        let Some(segment) = self.segment_node(unit) else {
            return false;
        };
        match self.tree.find_child_index(segment, "target") {
            Some(index) => {
                self.remove_with_whitespace(segment, index);
                true
            }
            None => false,
        }
    }

    /// Empty the `<target>`, keeping its attributes.
    pub fn clear_unit_translation(&mut self, unit: NodeId) {
        if let Some(target) = self.target_node(unit) {
            self.tree.set_children(target, Vec::new());
        }
    }

    /// Replace the `<target>` content with a copy of `content`.
    pub fn set_unit_translation(&mut self, unit: NodeId, content: &XmlFragment) {
        if let Some(target) = self.target_node(unit) {
            let children = self.tree.import_children(content.tree(), content.children());
            self.tree.set_children(target, children);
        }
    }

    #[must_use]
    pub fn target_attribute(&self, unit: NodeId, key: &str) -> Option<&str> {
        let target = self.target_node(unit)?;
        self.tree.attribute(target, key)
    }

    /// Set an attribute on `<target>`, creating the target if needed.
    pub fn set_target_attribute(&mut self, unit: NodeId, key: &str, value: &str) {
        match self.target_node(unit) {
            Some(target) => self.tree.set_attribute(target, key, value),
            None => {
                let mut attributes = Attributes::new();
                attributes.insert(key.to_string(), value.to_string());
                let target = self.create_target_node(attributes, None);
                self.append_target_node(unit, target);
            }
        }
    }

    // ==================== States ====================

    #[must_use]
    pub fn state(&self, unit: NodeId) -> Option<TranslationState> {
        let schema = self.schema?;
        let node = schema.state_node(&self.tree, unit)?;
        schema.read_state(&self.tree.element(node).attributes, &self.settings.needs_work_substate)
    }

    /// Write `state` on the state node. A 1.2 unit without `<target>` gets an empty
    /// one; a 2.0 unit without `<segment>` is left alone.
    pub fn set_state(&mut self, unit: NodeId, state: TranslationState) {
        let Some(schema) = self.schema else {
            return;
        };
        match schema.state_node(&self.tree, unit) {
            Some(node) => {
                let attributes = &mut self.tree.element_mut(node).attributes;
                schema.write_state(attributes, state, &self.settings.needs_work_substate);
            }
            None if schema.version() == XliffVersion::V12 => {
                let mut attributes = Attributes::new();
                self.update_state_attributes(&mut attributes, state);
                let target = self.create_target_node(attributes, None);
                self.append_target_node(unit, target);
            }
            None => {}
        }
    }

    /// Apply the version's encoding of `state` to an attribute map.
    pub fn update_state_attributes(&self, attributes: &mut Attributes, state: TranslationState) {
        if let Some(schema) = self.schema {
            schema.write_state(attributes, state, &self.settings.needs_work_substate);
        }
    }

    // ==================== Tool notes ====================

    /// Add or replace the tool note of a unit. Does nothing when tool notes are disabled.
    pub fn set_xliff_sync_note(&mut self, unit: NodeId, text: &str) {
        if !self.settings.add_needs_work_note {
            return;
        }
        let Some(schema) = self.schema else {
            return;
        };

        let mut attributes = Attributes::new();
        attributes.insert(
            schema.note_discriminator().to_string(),
            XLIFF_SYNC_NOTE_DESIGNATION.to_string(),
        );
        attributes.insert("annotates".to_string(), "general".to_string());
        attributes.insert("priority".to_string(), "1".to_string());

        if let Some((parent, index)) = self.note_node(unit, XLIFF_SYNC_NOTE_DESIGNATION) {
            if let Some(note) = self.tree.children(parent)[index].as_element() {
                self.tree.element_mut(note).attributes = attributes;
                self.tree.set_children(note, vec![XmlChild::Text(text.to_string())]);
            }
            return;
        }

        let note = self.tree.create_element_with("note", attributes);
        self.tree.append_child(note, XmlChild::Text(text.to_string()));

        let parent = schema.ensure_notes_parent(&mut self.tree, unit);
        let anchor = if schema.version() == XliffVersion::V12 {
            self.tree.find_child_index(parent, "target")
        } else {
            None
        };
        match anchor.or_else(|| self.last_element_index(parent)) {
            Some(index) => self.insert_after(parent, index, note),
            None => self.tree.append_child(parent, XmlChild::Element(note)),
        }
    }

    /// Remove the tool note. Returns whether there was one.
    pub fn try_delete_xliff_sync_note(&mut self, unit: NodeId) -> bool {
        let Some((parent, index)) = self.note_node(unit, XLIFF_SYNC_NOTE_DESIGNATION) else {
            return false;
        };
        self.remove_with_whitespace(parent, index);

        // A 2.0 <notes> must not be left empty.
        if parent != unit && self.tree.child_elements(parent).next().is_none() {
            if let Some(index) = self.tree.child_index(unit, parent) {
                self.remove_with_whitespace(unit, index);
            }
        }
        true
    }

    // ==================== Tree helpers ====================

    fn last_element_index(&self, parent: NodeId) -> Option<usize> {
        self.tree
            .children(parent)
            .iter()
            .rposition(|child| child.as_element().is_some())
    }

    /// Insert `node` right after `children[index]`, repeating the whitespace run
    /// that precedes `children[index]`.
    pub(crate) fn insert_after(&mut self, parent: NodeId, index: usize, node: NodeId) {
        let indent = index
            .checked_sub(1)
            .map(|i| &self.tree.children(parent)[i])
            .filter(|child| child.is_whitespace())
            .cloned();
        let mut position = index + 1;
        if let Some(indent) = indent {
            self.tree.insert_child(parent, position, indent);
            position += 1;
        }
        self.tree.insert_child(parent, position, XmlChild::Element(node));
    }

    /// Remove `children[index]` and the whitespace separating it from its previous
    /// sibling, or from its next sibling when it comes first.
    pub(crate) fn remove_with_whitespace(&mut self, parent: NodeId, index: usize) {
        self.tree.remove_child(parent, index);
        let children = self.tree.children(parent);
        let before = index > 0 && children[index - 1].is_whitespace();
        let after = !before && children.get(index).is_some_and(XmlChild::is_whitespace);
        if before {
            self.tree.remove_child(parent, index - 1);
        } else if after {
            self.tree.remove_child(parent, index);
        }
    }
}
