//! HTML in and out of the arena [`Document`].
//!
//! Parsing goes through html5ever's standards-compliant tree builder into the
//! reference `RcDom`, which is then walked once into the arena. The browser
//! normalizations come for free: implied `html`/`head`/`body`, misnested
//! tags, entity decoding.
//!
//! Whitespace-only text nodes are dropped during the walk; comments, doctypes
//! and processing instructions are ignored. Serialization writes the arena
//! back as HTML with a leading doctype, escaping through maud so the output
//! stays consistent with the pages [`crate::site`] renders.

use crate::dom::{Document, NodeData, NodeId};
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document as html5ever_parse};
use maud::html;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse a complete HTML document.
pub fn parse_document(html: &str) -> Result<Document, MarkupError> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };

    let dom = html5ever_parse(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut html.as_bytes())?;

    let mut doc = Document::new();
    let root = doc.root();
    walk(&dom.document, root, &mut doc);
    log::debug!("parsed document with {} nodes", doc.len());
    Ok(doc)
}

fn walk(handle: &Handle, parent: NodeId, doc: &mut Document) {
    match &handle.data {
        RcNodeData::Document => {
            for child in handle.children.borrow().iter() {
                walk(child, parent, doc);
            }
        }
        RcNodeData::Element { name, attrs, .. } => {
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let borrowed: Vec<(&str, &str)> = attrs
                .iter()
                .map(|(n, v)| (n.as_str(), v.as_str()))
                .collect();
            let node = doc.create_element(parent, &name.local, &borrowed);
            for child in handle.children.borrow().iter() {
                walk(child, node, doc);
            }
        }
        RcNodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            if !text.trim().is_empty() {
                doc.append_text(parent, &text);
            }
        }
        _ => {}
    }
}

/// Serialize the whole document back to HTML.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    for &child in doc.children(doc.root()) {
        write_node(doc, child, false, &mut out);
    }
    out
}

/// Serialize one subtree (the node itself included).
pub fn serialize_node(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

fn write_node(doc: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match doc.data(id) {
        NodeData::Document => {
            for &child in doc.children(id) {
                write_node(doc, child, false, out);
            }
        }
        NodeData::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&escape(text));
            }
        }
        NodeData::Element(el) => {
            let tag = el.tag();
            out.push('<');
            out.push_str(tag);
            for (name, value) in el.attrs() {
                if value.is_empty() {
                    let _ = write!(out, " {name}");
                } else {
                    let _ = write!(out, " {name}=\"{}\"", escape(value));
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for &child in doc.children(id) {
                write_node(doc, child, raw, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}
