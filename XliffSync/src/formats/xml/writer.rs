//! XML writing from the arena tree
//!
//! Output is not re-indented: whitespace text nodes carry the layout.

use super::node::{NodeId, XmlChild, XmlTree};
use crate::error::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Output switches for [`serialize_xml`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Omit the `<?xml ...?>` declaration. Otherwise the parsed declaration is
    /// written back, or a UTF-8 one for trees without it.
    pub headless: bool,
    /// Render childless elements that were self-closing in the input as `<x/>`.
    pub self_closing: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        SerializeOptions {
            headless: false,
            self_closing: true,
        }
    }
}

impl SerializeOptions {
    /// Options for rendering a fragment inside other text.
    #[must_use]
    pub fn fragment() -> Self {
        SerializeOptions {
            headless: true,
            self_closing: true,
        }
    }
}

/// Write an XML tree to disk
///
/// # Errors
/// Returns an error if serialization or file writing fails.
pub fn write_xml<P: AsRef<Path>>(tree: &XmlTree, path: P, options: SerializeOptions) -> Result<()> {
    let xml = serialize_xml(tree, options)?;
    fs::write(path, xml)?;
    Ok(())
}

/// Serialize a whole tree to a string
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn serialize_xml(tree: &XmlTree, options: SerializeOptions) -> Result<String> {
    let mut output = Vec::new();
    let mut writer = Writer::new(&mut output);

    if !options.headless {
        let declaration = tree.declaration().cloned().unwrap_or_default();
        writer.write_event(Event::Decl(BytesDecl::new(
            &declaration.version,
            declaration.encoding.as_deref(),
            declaration.standalone.as_deref(),
        )))?;
        writer.get_mut().write_all(b"\n")?;
    }
    if let Some(root) = tree.root() {
        write_element(&mut writer, tree, root, options)?;
    }

    Ok(String::from_utf8(output)?)
}

/// Serialize one element (and its subtree) without a declaration
///
/// # Errors
/// Returns an error if XML serialization fails.
pub fn serialize_element(tree: &XmlTree, id: NodeId, options: SerializeOptions) -> Result<String> {
    let mut output = Vec::new();
    let mut writer = Writer::new(&mut output);
    write_element(&mut writer, tree, id, options)?;
    Ok(String::from_utf8(output)?)
}

/// Flatten mixed content to a string: text runs as-is, elements serialized,
/// comments dropped.
#[must_use]
pub fn flatten_text(tree: &XmlTree, children: &[XmlChild]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            XmlChild::Text(run) => text.push_str(run),
            XmlChild::Element(id) => {
                // Writing into a Vec only fails on invalid UTF-8, which the tree cannot hold.
                if let Ok(xml) = serialize_element(tree, *id, SerializeOptions::fragment()) {
                    text.push_str(&xml);
                }
            }
            XmlChild::Comment(_) => {}
        }
    }
    text
}

/// Escape an attribute value, including whitespace characters that attribute
/// normalization would otherwise fold.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\t' => escaped.push_str("&#x9;"),
            '\n' => escaped.push_str("&#xA;"),
            '\r' => escaped.push_str("&#xD;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape character data. CRLF pairs collapse to LF, lone CRs are kept as
/// character references.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n");
    let mut escaped = String::with_capacity(normalized.len());
    for c in normalized.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\r' => escaped.push_str("&#xD;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn write_element<W: Write>(
    writer: &mut Writer<W>,
    tree: &XmlTree,
    id: NodeId,
    options: SerializeOptions,
) -> Result<()> {
    let element = tree.element(id);
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        let escaped = escape_attribute(value);
        start.push_attribute((key.as_bytes(), escaped.as_bytes()));
    }

    if element.children.is_empty() && options.self_closing && element.is_self_closing {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlChild::Element(child_id) => write_element(writer, tree, *child_id, options)?,
            XmlChild::Text(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text))))?;
            }
            XmlChild::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::xml::parse_xml;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_preserves_layout() {
        let input = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xliff version=\"1.2\">\n  <file a=\"1\">\n    <!-- note -->\n    <body/>\n  </file>\n</xliff>";
        let tree = parse_xml(input).unwrap();
        let output = serialize_xml(&tree, SerializeOptions::default()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_declaration_is_written_back() {
        let input = "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>\n<xliff version=\"2.0\"/>";
        let tree = parse_xml(input).unwrap();
        assert_eq!(
            tree.declaration().and_then(|d| d.standalone.as_deref()),
            Some("yes")
        );
        let output = serialize_xml(&tree, SerializeOptions::default()).unwrap();
        assert_eq!(output, input);

        let bare = parse_xml("<xliff version=\"2.0\"/>").unwrap();
        assert_eq!(bare.declaration(), None);
        assert_eq!(
            serialize_xml(&bare, SerializeOptions::default()).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xliff version=\"2.0\"/>"
        );
    }

    #[test]
    fn test_self_closing_switch() {
        let tree = parse_xml("<a><b/><c></c></a>").unwrap();
        let closed = serialize_xml(&tree, SerializeOptions::fragment()).unwrap();
        assert_eq!(closed, "<a><b/><c></c></a>");

        let open = serialize_xml(
            &tree,
            SerializeOptions {
                headless: true,
                self_closing: false,
            },
        )
        .unwrap();
        assert_eq!(open, "<a><b></b><c></c></a>");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_attribute("a\"b\n<&>\t"), "a&quot;b&#xA;&lt;&amp;&gt;&#x9;");
        assert_eq!(escape_text("a\r\nb\rc & <d>"), "a\nb&#xD;c &amp; &lt;d&gt;");
    }

    #[test]
    fn test_flatten_text_serializes_inline_elements() {
        let tree = parse_xml("<source>Hello <g id=\"1\">world</g><!-- c -->!</source>").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(
            flatten_text(&tree, tree.children(root)),
            "Hello <g id=\"1\">world</g>!"
        );
    }
}
