//! Storage-format XHTML parser with Confluence namespace support.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::entities::{convert_html_entities, decode_reference};
use super::tree::TreeNode;
use crate::error::StorageError;

/// Namespaces declared on the synthetic root so prefixed tags are well-formed.
const NAMESPACES: &[(&str, &str)] = &[
    ("ac", "http://www.atlassian.com/schema/confluence/4/ac/"),
    ("ri", "http://www.atlassian.com/schema/confluence/4/ri/"),
];

/// Tag of the synthetic root element.
pub(crate) const ROOT_TAG: &str = "root";

/// Parse a storage-format fragment into a tree rooted at a synthetic `root`.
pub(crate) fn parse(html: &str) -> Result<TreeNode, StorageError> {
    let html = convert_html_entities(html);

    let namespace_decls = NAMESPACES
        .iter()
        .map(|(prefix, uri)| format!(r#"xmlns:{prefix}="{uri}""#))
        .collect::<Vec<_>>()
        .join(" ");
    let wrapped = format!("<{ROOT_TAG} {namespace_decls}>{html}</{ROOT_TAG}>");

    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                let attrs = decode_attrs(&reader, &e);
                let mut root = parse_children(&mut reader, &tag)?;
                root.tag = tag;
                root.attrs = attrs;
                return Ok(root);
            }
            Event::Eof => return Ok(TreeNode::new(ROOT_TAG)),
            _ => {}
        }
        buf.clear();
    }
}

/// Read events until the end tag of `parent_tag`, collecting children and text.
fn parse_children<R: BufRead>(
    reader: &mut Reader<R>,
    parent_tag: &str,
) -> Result<TreeNode, StorageError> {
    let mut buf = Vec::new();
    let mut node = TreeNode::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = decode_name(reader, e.name().as_ref());
                let attrs = decode_attrs(reader, &e);
                let mut child = parse_children(reader, &tag)?;
                child.tag = tag;
                child.attrs = attrs;
                node.children.push(child);
            }
            Event::Empty(e) => {
                node.children.push(TreeNode {
                    tag: decode_name(reader, e.name().as_ref()),
                    attrs: decode_attrs(reader, &e),
                    ..Default::default()
                });
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                append_text(&mut node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                match decode_reference(&entity) {
                    Some(text) => append_text(&mut node, &text),
                    None => append_text(&mut node, &format!("&{entity};")),
                }
            }
            Event::CData(e) => {
                append_text(&mut node, &String::from_utf8_lossy(&e));
            }
            Event::End(e) => {
                if decode_name(reader, e.name().as_ref()) == parent_tag {
                    return Ok(node);
                }
                // Stray end tag, keep reading.
            }
            Event::Eof => return Ok(node),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader
        .decoder()
        .decode(name)
        .map_or_else(|_| String::from_utf8_lossy(name).into_owned(), Cow::into_owned)
}

fn decode_attrs<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = decode_name(reader, attr.key.as_ref());
        if key.starts_with("xmlns") {
            continue;
        }
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        attrs.insert(key, value);
    }
    attrs
}

/// Append text to the node's text, or to the last child's tail.
fn append_text(node: &mut TreeNode, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}
