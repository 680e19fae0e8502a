//! Merging one source unit with its matched target unit
//!
//! The merged document starts as a copy of the generated (source) catalog and
//! every unit is updated in place: attributes are reconciled, the previous
//! `<target>` is carried over, the translatability and translation content are
//! applied, and source text changes are flagged.

use tracing::debug;

use super::types::{MergeOptions, MergeOutcome, SourceChangePolicy};
use crate::formats::xliff::{TranslationState, XliffDocument, XliffVersion};
use crate::formats::xml::{
    Attributes, NodeId, SerializeOptions, XmlChild, XmlFragment, serialize_element,
};

/// Tool note attached when the source text of a translated unit changed.
pub const SOURCE_CHANGED_NOTE: &str = "Source text has changed. Please review the translation.";

impl XliffDocument {
    /// Merge `target` (a unit of another document) and `translation` into `unit`
    ///
    /// `target` is the identity match of `unit`, `translation` is content found by
    /// a donor search or another translation source. Merging the same inputs twice
    /// gives the same result as merging once.
    pub fn merge_unit(
        &mut self,
        unit: NodeId,
        target: Option<(&XliffDocument, NodeId)>,
        translation: Option<&XmlFragment>,
        options: &MergeOptions,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let Some(schema) = self.schema else {
            return outcome;
        };

        let mut target_node = None;
        if let Some((target_doc, target_unit)) = target {
            self.reconcile_attributes(unit, &target_doc.tree.element(target_unit).attributes, options);
            target_node = target_doc
                .target_node(target_unit)
                .map(|node| self.tree.import(&target_doc.tree, node));
            if options.preserve_target_child_nodes {
                self.preserve_child_nodes(unit, target_doc, target_unit);
            }
            if schema.version() == XliffVersion::V20 {
                self.copy_segment_state(unit, target_doc, target_unit);
            }
        }

        if !self.unit_needs_translation(unit) {
            if self.delete_target_node(unit) {
                debug!(unit = ?self.unit_id(unit), "removed target of untranslatable unit");
            }
            return outcome;
        }

        let content = translation.filter(|content| !self.is_missing_sentinel(content));
        let existing = target_node.is_some();
        let target_node =
            target_node.unwrap_or_else(|| self.create_target_node(Attributes::new(), None));
        self.append_target_node(unit, target_node);

        if let Some(content) = content {
            self.set_unit_translation(unit, content);
            self.set_state(unit, TranslationState::Translated);
        } else if !existing {
            self.fill_missing(unit);
        } else if options.detect_source_text_changes {
            if let Some((target_doc, target_unit)) = target {
                outcome.source_changed =
                    self.detect_source_change(unit, target_doc, target_unit, options);
            }
        }

        outcome.missing = !self.unit_has_translation(unit);
        outcome
    }

    fn is_missing_sentinel(&self, content: &XmlFragment) -> bool {
        content.is_empty() || content.as_single_text() == Some(self.settings.missing_translation.as_str())
    }

    /// Sentinel content and missing state.
    fn fill_missing(&mut self, unit: NodeId) {
        let sentinel = self.settings.missing_translation.clone();
        if let Some(target) = self.target_node(unit) {
            let children = if sentinel.is_empty() {
                Vec::new()
            } else {
                vec![XmlChild::Text(sentinel)]
            };
            self.tree.set_children(target, children);
        }
        self.set_state(unit, TranslationState::Missing);
    }

    fn reconcile_attributes(&mut self, unit: NodeId, target: &Attributes, options: &MergeOptions) {
        let attributes = &mut self.tree.element_mut(unit).attributes;
        if !options.preserve_target_attributes {
            // Source wins; target-only (or filled-in) attributes are added.
            for (key, value) in target {
                if attributes.get(key).is_none_or(String::is_empty) {
                    attributes.insert(key.clone(), value.clone());
                }
            }
        } else if options.preserve_target_attributes_order {
            let mut merged = target.clone();
            if let Some(id) = attributes.get("id") {
                merged.insert("id".to_string(), id.clone());
            }
            for (key, value) in attributes.iter() {
                if merged.get(key).is_none_or(String::is_empty) {
                    merged.insert(key.clone(), value.clone());
                }
            }
            *attributes = merged;
        } else {
            for (key, value) in target {
                if key != "id" {
                    attributes.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Re-add non-standard children of the target unit (e.g. `alt-trans`) after the
    /// last element of the merged unit. Children already present are skipped.
    fn preserve_child_nodes(&mut self, unit: NodeId, target_doc: &XliffDocument, target_unit: NodeId) {
        let Some(schema) = self.schema else {
            return;
        };
        for child in target_doc.tree.child_elements(target_unit) {
            if !schema.is_preservable_child(target_doc.tree.name(child)) {
                continue;
            }
            let Ok(rendered) = serialize_element(&target_doc.tree, child, SerializeOptions::fragment()) else {
                continue;
            };
            let present = self.tree.child_elements(unit).any(|own| {
                serialize_element(&self.tree, own, SerializeOptions::fragment())
                    .is_ok_and(|own| own == rendered)
            });
            if present {
                continue;
            }

            let copy = self.tree.import(&target_doc.tree, child);
            let last = self
                .tree
                .children(unit)
                .iter()
                .rposition(|c| c.as_element().is_some());
            match last {
                Some(index) => self.insert_after(unit, index, copy),
                None => self.tree.append_child(unit, XmlChild::Element(copy)),
            }
        }
    }

    fn copy_segment_state(&mut self, unit: NodeId, target_doc: &XliffDocument, target_unit: NodeId) {
        let (Some(segment), Some(target_segment)) =
            (self.segment_node(unit), target_doc.segment_node(target_unit))
        else {
            return;
        };
        let previous = &target_doc.tree.element(target_segment).attributes;
        let attributes = &mut self.tree.element_mut(segment).attributes;
        for key in ["state", "subState"] {
            match previous.get(key) {
                Some(value) => {
                    attributes.insert(key.to_string(), value.clone());
                }
                None => {
                    attributes.shift_remove(key);
                }
            }
        }
    }

    /// Compare the source text with the one the translation was made for.
    fn detect_source_change(
        &mut self,
        unit: NodeId,
        target_doc: &XliffDocument,
        target_unit: NodeId,
        options: &MergeOptions,
    ) -> bool {
        if !target_doc.unit_has_translation(target_unit) {
            return false;
        }
        let (Some(previous), Some(current)) = (
            target_doc.unit_source_text(target_unit),
            self.unit_source_text(unit),
        ) else {
            return false;
        };

        let changed = if options.ignore_line_ending_changes {
            previous.replace("\r\n", "\n") != current.replace("\r\n", "\n")
        } else {
            previous != current
        };
        if !changed {
            return false;
        }

        debug!(unit = ?self.unit_id(unit), policy = ?options.source_change_policy, "source text changed");
        match options.source_change_policy {
            SourceChangePolicy::Clear => self.fill_missing(unit),
            SourceChangePolicy::Flag => {
                self.set_xliff_sync_note(unit, SOURCE_CHANGED_NOTE);
                self.set_state(unit, TranslationState::NeedsWork);
            }
        }
        true
    }
}
