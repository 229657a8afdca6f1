//! Markup serialization for document subtrees.
//!
//! Illustrations and charts are plain [`Document`] nodes; serializing them produces standalone SVG
//! that `usvg` can parse (see [`crate::render::raster`]).

use std::fmt::Write;

use crate::dom::document::{Document, NodeId};

pub(crate) const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Escape the five XML special characters for attribute values and text content.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serialize `node` and its descendants.
///
/// An `svg` element without an `xmlns` attribute gets the SVG namespace so the output is a valid
/// standalone document.
pub fn to_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    let Some(tag) = doc.tag(node) else {
        return;
    };
    let _ = write!(out, "<{tag}");
    if tag == "svg" && doc.attr(node, "xmlns").is_none() {
        let _ = write!(out, " xmlns=\"{SVG_NS}\"");
    }
    for (name, value) in doc.attrs(node) {
        let _ = write!(out, " {name}=\"{}\"", xml_escape(value));
    }

    let children = doc.children(node);
    let text = doc.text(node);
    if children.is_empty() && text.is_none() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    if let Some(text) = text {
        out.push_str(&xml_escape(text));
    }
    for child in children {
        write_node(doc, *child, out);
    }
    let _ = write!(out, "</{tag}>");
}

#[cfg(test)]
#[path = "../../tests/unit/dom/svg.rs"]
mod tests;
