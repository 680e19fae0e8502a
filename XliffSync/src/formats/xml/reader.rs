//! XML reading into the arena tree
//!
//! Whitespace, comments and mixed content are kept as they appear so that a
//! parse/serialize cycle reproduces the input modulo escaping and line endings.

use super::node::{NodeId, XmlChild, XmlDeclaration, XmlElement, XmlTree};
use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// Read an XML file from disk
///
/// # Errors
/// Returns an error if the file cannot be read or is not well-formed XML.
pub fn read_xml<P: AsRef<Path>>(path: P) -> Result<XmlTree> {
    let content = fs::read_to_string(path)?;
    parse_xml(&content)
}

/// Parse XML text into a tree
///
/// The declaration is kept on the tree; processing instructions and doctype are
/// skipped. CDATA is folded into the surrounding text.
///
/// # Errors
/// Returns [`Error::MalformedDocument`] for unbalanced tags, multiple roots,
/// character data outside the root, or a document without a root element.
pub fn parse_xml(content: &str) -> Result<XmlTree> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = Reader::from_str(content);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut tree = XmlTree::new();
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let id = open_element(&mut tree, &reader, &e, &stack, false)?;
                stack.push(id);
            }
            Ok(Event::Empty(e)) => {
                open_element(&mut tree, &reader, &e, &stack, true)?;
            }
            Ok(Event::End(_)) => {
                if stack.pop().is_none() {
                    return Err(Error::malformed(format!(
                        "unexpected closing tag at position {}",
                        reader.buffer_position()
                    )));
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| {
                    Error::malformed(format!("{err} at position {}", reader.buffer_position()))
                })?;
                push_text(&mut tree, &stack, &text, reader.buffer_position())?;
            }
            Ok(Event::CData(e)) => {
                let text = reader.decoder().decode(&e)?;
                push_text(&mut tree, &stack, &text, reader.buffer_position())?;
            }
            Ok(Event::Comment(e)) => {
                if let Some(&parent) = stack.last() {
                    let text = reader.decoder().decode(&e)?;
                    tree.append_child(parent, XmlChild::Comment(text.into_owned()));
                }
            }
            Ok(Event::Decl(e)) => {
                tree.set_declaration(Some(read_declaration(&reader, &e)?));
            }
            Ok(Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::malformed(format!(
                    "{e} at position {}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(&open) = stack.last() {
        return Err(Error::malformed(format!(
            "unclosed element <{}>",
            tree.name(open)
        )));
    }
    if tree.root().is_none() {
        return Err(Error::malformed("no root element"));
    }
    Ok(tree)
}

fn read_declaration(reader: &Reader<&[u8]>, decl: &BytesDecl) -> Result<XmlDeclaration> {
    let decode = |bytes: &[u8]| -> Result<String> { Ok(reader.decoder().decode(bytes)?.into_owned()) };
    let version = decode(decl.version()?.as_ref())?;
    let encoding = decl.encoding().transpose()?.map(|e| decode(e.as_ref())).transpose()?;
    let standalone = decl.standalone().transpose()?.map(|s| decode(s.as_ref())).transpose()?;
    Ok(XmlDeclaration {
        version,
        encoding,
        standalone,
    })
}

fn open_element(
    tree: &mut XmlTree,
    reader: &Reader<&[u8]>,
    start: &BytesStart,
    stack: &[NodeId],
    self_closing: bool,
) -> Result<NodeId> {
    let qname = start.name();
    let name = reader.decoder().decode(qname.as_ref())?;
    let mut element = XmlElement::new(&name);
    element.is_self_closing = self_closing;

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::malformed(e.to_string()))?;
        let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let value = attr
            .decode_and_unescape_value(reader)
            .map_err(|e| Error::malformed(format!("attribute {key}: {e}")))?
            .into_owned();
        element.attributes.insert(key, value);
    }

    let id = tree.insert_element(element);
    match stack.last() {
        Some(&parent) => tree.append_child(parent, XmlChild::Element(id)),
        None if tree.root().is_some() => {
            return Err(Error::malformed(format!(
                "multiple root elements (<{name}> at position {})",
                reader.buffer_position()
            )));
        }
        None => tree.set_root(id),
    }
    let uri = tree.resolve_namespace(id);
    tree.element_mut(id).uri = uri;
    Ok(id)
}

fn push_text(tree: &mut XmlTree, stack: &[NodeId], text: &str, position: usize) -> Result<()> {
    let Some(&parent) = stack.last() else {
        if text.chars().all(char::is_whitespace) {
            return Ok(());
        }
        return Err(Error::malformed(format!(
            "character data outside the root element at position {position}"
        )));
    };
    if text.is_empty() {
        return Ok(());
    }

    // Adjacent text and CDATA runs become one text child.
    if let Some(XmlChild::Text(last)) = tree.element_mut(parent).children.last_mut() {
        last.push_str(text);
    } else {
        tree.append_child(parent, XmlChild::Text(text.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keeps_whitespace_and_order() {
        let tree = parse_xml("<a x=\"1\" y=\"2\">\n  <b/>\n</a>").unwrap();
        let root = tree.root().unwrap();
        let keys: Vec<_> = tree.element(root).attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(tree.children(root).len(), 3);
        assert!(tree.children(root)[0].is_whitespace());
        let b = tree.find_child(root, "b").unwrap();
        assert!(tree.element(b).is_self_closing);
    }

    #[test]
    fn test_parse_unescapes_text_and_attributes() {
        let tree = parse_xml("<a t=\"&lt;x&gt;\">1 &amp; 2</a>").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.attribute(root, "t"), Some("<x>"));
        assert_eq!(tree.children(root)[0].as_text(), Some("1 & 2"));
    }

    #[test]
    fn test_cdata_merges_with_text() {
        let tree = parse_xml("<a>x<![CDATA[<y>]]>z</a>").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.children(root), &[XmlChild::Text("x<y>z".to_string())]);
    }

    #[test]
    fn test_namespace_resolution() {
        let tree = parse_xml(
            "<xliff xmlns=\"urn:oasis:names:tc:xliff:document:2.0\" xmlns:m=\"urn:m\"><m:x/></xliff>",
        )
        .unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.element(root).uri, "urn:oasis:names:tc:xliff:document:2.0");
        let child = tree.child_elements(root).next().unwrap();
        assert_eq!(tree.element(child).uri, "urn:m");
    }

    #[test]
    fn test_malformed_inputs() {
        for input in ["<a><b></a>", "<a>", "", "text only", "<a/><b/>", "<a/>trailing"] {
            assert!(
                matches!(parse_xml(input), Err(Error::MalformedDocument { .. })),
                "expected malformed: {input:?}"
            );
        }
    }
}
