//! XML tree structures
//!
//! Elements live in an arena owned by [`XmlTree`] and point at each other through
//! [`NodeId`] handles. Children hold handles downwards and every element keeps a
//! non-owning `parent` handle upwards, so the tree never forms ownership cycles.
//!
//! The arena only grows. Elements that are detached from their parent, replaced
//! or imported and dropped stay in it until [`XmlTree::compacted`] copies the
//! reachable part into a fresh tree; serialization only walks what is reachable
//! from the root.

use indexmap::IndexMap;

/// Ordered attribute map (insertion order is the rendered order).
pub type Attributes = IndexMap<String, String>;

/// Handle to an element inside an [`XmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A child of an element: a nested element or a run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    /// A nested element.
    Element(NodeId),
    /// Unescaped character data (text and CDATA runs are merged).
    Text(String),
    /// A comment, kept verbatim.
    Comment(String),
}

impl XmlChild {
    /// The element handle, if this child is an element.
    #[must_use]
    pub fn as_element(&self) -> Option<NodeId> {
        match self {
            XmlChild::Element(id) => Some(*id),
            _ => None,
        }
    }

    /// The text, if this child is a text run.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlChild::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for a non-empty text run made of whitespace only.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, XmlChild::Text(text) if !text.is_empty() && text.chars().all(char::is_whitespace))
    }
}

/// An element in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified tag name (`prefix:local` or `local`).
    pub name: String,
    /// Namespace prefix, empty when unprefixed.
    pub prefix: String,
    /// Local part of the tag name.
    pub local: String,
    /// Resolved namespace URI, empty when unknown.
    pub uri: String,
    /// Attributes in document order.
    pub attributes: Attributes,
    /// Ordered mixed content.
    pub children: Vec<XmlChild>,
    /// Element whose `children` contain this one.
    pub parent: Option<NodeId>,
    /// Whether the element was written as `<name/>`.
    pub is_self_closing: bool,
}

impl XmlElement {
    /// Creates a detached element with the given qualified name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let (prefix, local) = match name.split_once(':') {
            Some((prefix, local)) => (prefix.to_string(), local.to_string()),
            None => (String::new(), name.to_string()),
        };
        XmlElement {
            name: name.to_string(),
            prefix,
            local,
            uri: String::new(),
            attributes: Attributes::new(),
            children: Vec::new(),
            parent: None,
            is_self_closing: false,
        }
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// The `<?xml ...?>` declaration of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        XmlDeclaration {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: None,
        }
    }
}

/// An XML document tree
///
/// Append-only: every created or imported element keeps its slot, so a tree that
/// is edited many times should be replaced by [`XmlTree::compacted`].
#[derive(Debug, Clone, Default)]
pub struct XmlTree {
    nodes: Vec<XmlElement>,
    root: Option<NodeId>,
    declaration: Option<XmlDeclaration>,
}

impl XmlTree {
    /// Creates an empty tree without a root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree whose root element has the given name.
    #[must_use]
    pub fn with_root(name: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.create_element(name);
        tree.root = Some(root);
        tree
    }

    /// The root element, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The declaration read from the input, if it had one.
    #[must_use]
    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    pub fn set_declaration(&mut self, declaration: Option<XmlDeclaration>) {
        self.declaration = declaration;
    }

    /// Number of arena slots, reachable or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A copy holding only the elements reachable from the root
    ///
    /// Handles into `self` are not valid in the copy.
    #[must_use]
    pub fn compacted(&self) -> XmlTree {
        let mut tree = XmlTree {
            declaration: self.declaration.clone(),
            ..XmlTree::default()
        };
        if let Some(root) = self.root {
            let copy = tree.import(self, root);
            tree.root = Some(copy);
        }
        tree
    }

    /// Adds a detached element to the arena.
    pub fn insert_element(&mut self, element: XmlElement) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(element);
        id
    }

    /// Creates a detached, empty element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.insert_element(XmlElement::new(name))
    }

    /// Creates a detached element with attributes.
    pub fn create_element_with(&mut self, name: &str, attributes: Attributes) -> NodeId {
        let mut element = XmlElement::new(name);
        element.attributes = attributes;
        self.insert_element(element)
    }

    /// Borrow an element.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn element(&self, id: NodeId) -> &XmlElement {
        &self.nodes[id.0]
    }

    /// Mutably borrow an element.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this tree.
    pub fn element_mut(&mut self, id: NodeId) -> &mut XmlElement {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        &self.element(id).name
    }

    #[must_use]
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        self.element(id).attribute(key)
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        self.element_mut(id)
            .attributes
            .insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[XmlChild] {
        &self.element(id).children
    }

    /// Element children in document order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).iter().filter_map(XmlChild::as_element)
    }

    /// First direct child element with the given name.
    #[must_use]
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id).find(|&child| self.name(child) == name)
    }

    /// Position of `name`'s first direct element child in `children`.
    #[must_use]
    pub fn find_child_index(&self, id: NodeId, name: &str) -> Option<usize> {
        self.children(id).iter().position(|child| {
            child
                .as_element()
                .is_some_and(|element| self.name(element) == name)
        })
    }

    /// Depth-first search for the first element named `name`, starting with `id` itself.
    #[must_use]
    pub fn find_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        if self.name(id) == name {
            return Some(id);
        }
        self.child_elements(id)
            .find_map(|child| self.find_descendant(child, name))
    }

    /// Position of `child` among `parent`'s children.
    #[must_use]
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent)
            .iter()
            .position(|c| c.as_element() == Some(child))
    }

    /// Appends a child, adopting it if it is an element.
    pub fn append_child(&mut self, parent: NodeId, child: XmlChild) {
        self.adopt(parent, &child);
        self.element_mut(parent).children.push(child);
    }

    /// Inserts a child at `index`, adopting it if it is an element.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: XmlChild) {
        self.adopt(parent, &child);
        let children = &mut self.element_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Replaces the child at `index`, detaching the previous one.
    pub fn replace_child(&mut self, parent: NodeId, index: usize, child: XmlChild) -> XmlChild {
        self.adopt(parent, &child);
        let old = std::mem::replace(&mut self.element_mut(parent).children[index], child);
        self.orphan(&old);
        old
    }

    /// Removes and returns the child at `index`.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> XmlChild {
        let old = self.element_mut(parent).children.remove(index);
        self.orphan(&old);
        old
    }

    /// Replaces all children of `parent`.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<XmlChild>) {
        for child in &children {
            self.adopt(parent, child);
        }
        let old = std::mem::replace(&mut self.element_mut(parent).children, children);
        for child in &old {
            self.orphan(child);
        }
    }

    /// Removes `id` from its parent. Returns false if it was not attached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.element(id).parent else {
            return false;
        };
        match self.child_index(parent, id) {
            Some(index) => {
                self.remove_child(parent, index);
                true
            }
            None => false,
        }
    }

    /// Deep-copies `id` from `other` into this arena as a detached element.
    pub fn import(&mut self, other: &XmlTree, id: NodeId) -> NodeId {
        let source = other.element(id);
        let copy = self.insert_element(XmlElement {
            name: source.name.clone(),
            prefix: source.prefix.clone(),
            local: source.local.clone(),
            uri: source.uri.clone(),
            attributes: source.attributes.clone(),
            children: Vec::new(),
            parent: None,
            is_self_closing: source.is_self_closing,
        });
        let children = self.import_children(other, &source.children);
        self.set_children(copy, children);
        copy
    }

    /// Deep-copies a child list from `other`; the copies are not yet attached.
    pub fn import_children(&mut self, other: &XmlTree, children: &[XmlChild]) -> Vec<XmlChild> {
        children
            .iter()
            .map(|child| match child {
                XmlChild::Element(id) => XmlChild::Element(self.import(other, *id)),
                XmlChild::Text(text) => XmlChild::Text(text.clone()),
                XmlChild::Comment(text) => XmlChild::Comment(text.clone()),
            })
            .collect()
    }

    /// Resolves the namespace URI of `id` from `xmlns` declarations in scope.
    pub(crate) fn resolve_namespace(&self, id: NodeId) -> String {
        let element = self.element(id);
        let key = if element.prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", element.prefix)
        };
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(uri) = self.attribute(node, &key) {
                return uri.to_string();
            }
            current = self.element(node).parent;
        }
        String::new()
    }

    fn adopt(&mut self, parent: NodeId, child: &XmlChild) {
        if let XmlChild::Element(id) = child {
            self.element_mut(*id).parent = Some(parent);
        }
    }

    fn orphan(&mut self, child: &XmlChild) {
        if let XmlChild::Element(id) = child {
            self.element_mut(*id).parent = None;
        }
    }
}

/// Detached rich content (the children of a `<source>` or `<target>`), with its
/// own arena so it can be moved between documents.
#[derive(Debug, Clone, Default)]
pub struct XmlFragment {
    tree: XmlTree,
    children: Vec<XmlChild>,
}

impl XmlFragment {
    /// A fragment holding a single text run.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        XmlFragment {
            tree: XmlTree::new(),
            children: vec![XmlChild::Text(text.to_string())],
        }
    }

    /// Copies `children` out of `tree`.
    #[must_use]
    pub fn copy_of(tree: &XmlTree, children: &[XmlChild]) -> Self {
        let mut own = XmlTree::new();
        let children = own.import_children(tree, children);
        XmlFragment {
            tree: own,
            children,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    #[must_use]
    pub fn children(&self) -> &[XmlChild] {
        &self.children
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The text if the fragment is exactly one text run.
    #[must_use]
    pub fn as_single_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [XmlChild::Text(text)] => Some(text),
            _ => None,
        }
    }

    /// Flattened text: text runs verbatim, inline elements serialized.
    #[must_use]
    pub fn text(&self) -> String {
        super::writer::flatten_text(&self.tree, &self.children)
    }
}
