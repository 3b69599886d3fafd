//! In-memory document model.
//!
//! The page controller never talks to a real browser. It operates on an arena
//! of nodes that mirrors the parts of the DOM the behavior layer touches:
//! element attributes, the class list, inline style, text content, live form
//! values, focus and scroll requests.
//!
//! ## Arena Layout
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. The
//! document node is always id 0. Nodes are never removed, only mutated, which
//! matches the page: every interactive element is pre-existing markup.
//!
//! ## Selectors
//!
//! [`Selector`] covers the subset of CSS the markup contract needs:
//!
//! ```text
//! tag   #id   .class   [attr]   [attr=value]   [attr^=prefix]
//! compounds of the above, joined by the descendant combinator (whitespace)
//! ```
//!
//! Controller code builds selectors with the infallible constructors
//! ([`Selector::id`], [`Selector::class`], ...). Host input (scripts, CLI)
//! goes through [`Selector::parse`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// An element node: tag, ordered attributes and the live value of form controls.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    /// Value typed by the user; `None` means the control shows its default.
    dirty_value: Option<String>,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// The most recent scroll-into-view request issued against the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    pub target: NodeId,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
    scroll: Option<ScrollRequest>,
    fragment: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            focused: None,
            scroll: None,
            fragment: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a new element under `parent`.
    pub fn create_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let element = Element {
            tag: tag.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            dirty_value: None,
        };
        self.push(parent, NodeData::Element(element))
    }

    /// Append a text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    // ------------------------------------------------------------------
    // Tree navigation
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Next sibling that is an element, skipping text nodes.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&s| self.element(s).is_some())
    }

    /// `id` followed by each of its ancestors up to the document node.
    pub fn ancestors_inclusive(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// All nodes below `id` in tree order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors_inclusive(node).any(|n| n == ancestor)
    }

    // ------------------------------------------------------------------
    // Attributes, classes, style
    // ------------------------------------------------------------------

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        match el.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => el.attrs.push((name.to_string(), value.to_string())),
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let before = el.attrs.len();
        el.attrs.retain(|(n, _)| n != name);
        el.attrs.len() != before
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.element(id).is_none() || self.has_class(id, class) {
            return;
        }
        let list = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &list);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let list = self
            .attr(id, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &list);
    }

    /// Flip a class and return whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class);
            true
        }
    }

    /// Read one inline style property.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        parse_style(self.attr(id, "style")?)
            .into_iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v)
    }

    /// Set one inline style property, preserving the others. An empty value
    /// removes the property.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if self.element(id).is_none() {
            return;
        }
        let mut decls = self.attr(id, "style").map(parse_style).unwrap_or_default();
        decls.retain(|(p, _)| p != property);
        if !value.is_empty() {
            decls.push((property.to_string(), value.to_string()));
        }
        if decls.is_empty() {
            self.remove_attr(id, "style");
        } else {
            let css = decls
                .iter()
                .map(|(p, v)| format!("{p}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            self.set_attr(id, "style", &css);
        }
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeData::Text(t) = &self.nodes[id.0].data {
            return t.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match &self.nodes[n.0].data {
                NodeData::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children of `id` with a single text node. A lone text
    /// child is rewritten in place, so repeated updates do not grow the arena.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if self.element(id).is_none() {
            return;
        }
        if let &[child] = self.nodes[id.0].children.as_slice() {
            if let NodeData::Text(existing) = &mut self.nodes[child.0].data {
                existing.clear();
                existing.push_str(text);
                return;
            }
        }
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.append_text(id, text);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// First element with the given `id` attribute, in tree order.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_all_within(self.root(), selector)
    }

    pub fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_within(self.root(), selector)
    }

    /// Matching descendants of `scope`, in tree order.
    pub fn query_all_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    pub fn query_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.matches(n, selector))
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let Some((subject, rest)) = selector.steps.split_last() else {
            return false;
        };
        if !self.matches_compound(id, subject) {
            return false;
        }
        let mut cursor = self.parent(id);
        for step in rest.iter().rev() {
            loop {
                match cursor {
                    None => return false,
                    Some(n) => {
                        cursor = self.parent(n);
                        if self.matches_compound(n, step) {
                            break;
                        }
                    }
                }
            }
        }
        true
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if compound.tag.as_deref().is_some_and(|t| t != el.tag) {
            return false;
        }
        if compound.id.as_deref().is_some_and(|i| el.attr("id") != Some(i)) {
            return false;
        }
        if !compound.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        compound.attrs.iter().all(|filter| {
            let Some(value) = el.attr(&filter.name) else {
                return false;
            };
            match &filter.op {
                AttrOp::Exists => true,
                AttrOp::Equals(expected) => value == expected,
                AttrOp::Prefix(prefix) => value.starts_with(prefix.as_str()),
            }
        })
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        self.ancestors_inclusive(id)
            .find(|&n| self.matches(n, selector))
    }

    // ------------------------------------------------------------------
    // Form controls
    // ------------------------------------------------------------------

    /// Current value of an `input`, `textarea`, `select` or `option`.
    pub fn value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        if let Some(dirty) = &el.dirty_value {
            return dirty.clone();
        }
        self.default_value(id)
    }

    fn default_value(&self, id: NodeId) -> String {
        match self.tag_name(id) {
            Some("textarea") => self.text_content(id),
            Some("option") => self
                .attr(id, "value")
                .map(str::to_string)
                .unwrap_or_else(|| self.text_content(id).trim().to_string()),
            Some("select") => {
                let options = self.query_all_within(id, &Selector::tag("option"));
                options
                    .iter()
                    .copied()
                    .find(|&o| self.has_attr(o, "selected"))
                    .or_else(|| options.first().copied())
                    .map(|o| self.value(o))
                    .unwrap_or_default()
            }
            _ => self.attr(id, "value").unwrap_or_default().to_string(),
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.dirty_value = Some(value.to_string());
        }
    }

    /// Restore every control inside `form` to its default value.
    pub fn reset_form(&mut self, form: NodeId) {
        for node in self.descendants(form) {
            if let Some(el) = self.element_mut(node) {
                el.dirty_value = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Focus, scrolling, location
    // ------------------------------------------------------------------

    pub fn focus(&mut self, id: NodeId) {
        if self.element(id).is_some() {
            self.focused = Some(id);
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn scroll_into_view(&mut self, id: NodeId, behavior: ScrollBehavior) {
        self.scroll = Some(ScrollRequest {
            target: id,
            behavior,
        });
    }

    pub fn last_scroll(&self) -> Option<ScrollRequest> {
        self.scroll
    }

    pub fn set_fragment(&mut self, fragment: &str) {
        self.fragment = Some(fragment.to_string());
    }

    /// Location fragment set by a default anchor jump, without the `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

fn parse_style(css: &str) -> Vec<(String, String)> {
    css.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            (!prop.is_empty()).then(|| (prop.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

// ============================================================================
// Selectors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrFilter {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrFilter>,
}

/// A chain of compound selectors joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    steps: Vec<Compound>,
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Self::single(Compound {
            tag: Some(tag.to_ascii_lowercase()),
            ..Compound::default()
        })
    }

    pub fn id(id: &str) -> Self {
        Self::single(Compound {
            id: Some(id.to_string()),
            ..Compound::default()
        })
    }

    pub fn class(class: &str) -> Self {
        Self::single(Compound {
            classes: vec![class.to_string()],
            ..Compound::default()
        })
    }

    fn single(compound: Compound) -> Self {
        Self {
            steps: vec![compound],
        }
    }

    fn subject_mut(&mut self) -> &mut Compound {
        if self.steps.is_empty() {
            self.steps.push(Compound::default());
        }
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.subject_mut().classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str) -> Self {
        self.subject_mut().attrs.push(AttrFilter {
            name: name.to_string(),
            op: AttrOp::Exists,
        });
        self
    }

    pub fn with_attr_eq(mut self, name: &str, value: &str) -> Self {
        self.subject_mut().attrs.push(AttrFilter {
            name: name.to_string(),
            op: AttrOp::Equals(value.to_string()),
        });
        self
    }

    pub fn with_attr_prefix(mut self, name: &str, prefix: &str) -> Self {
        self.subject_mut().attrs.push(AttrFilter {
            name: name.to_string(),
            op: AttrOp::Prefix(prefix.to_string()),
        });
        self
    }

    /// `self inner`: elements matching `inner` that sit below a `self` match.
    pub fn descendant(mut self, inner: Selector) -> Self {
        self.steps.extend(inner.steps);
        self
    }

    /// Parse selector text supplied by a host (scripts, CLI flags).
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut in_brackets = false;
        let mut quote: Option<char> = None;
        for c in input.trim().chars() {
            match (c, quote) {
                ('"' | '\'', None) if in_brackets => quote = Some(c),
                (q, Some(open)) if q == open => quote = None,
                ('[', None) => in_brackets = true,
                (']', None) => in_brackets = false,
                (w, None) if w.is_whitespace() && !in_brackets => {
                    if !current.is_empty() {
                        chunks.push(std::mem::take(&mut current));
                    }
                    continue;
                }
                _ => {}
            }
            current.push(c);
        }
        if in_brackets || quote.is_some() {
            return Err(invalid("unterminated attribute filter"));
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        if chunks.is_empty() {
            return Err(invalid("empty selector"));
        }

        let steps = chunks
            .iter()
            .map(|chunk| parse_compound(chunk).map_err(|reason| invalid(&reason)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }
}

impl std::str::FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(src: &str) -> (&str, &str) {
    let end = src.find(|c: char| !is_ident_char(c)).unwrap_or(src.len());
    src.split_at(end)
}

fn parse_compound(chunk: &str) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut rest = chunk;

    if let Some(after) = rest.strip_prefix('*') {
        rest = after;
    } else {
        let (tag, after) = take_ident(rest);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
            rest = after;
        }
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '#' | '.' => {
                let (ident, after) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return Err(format!("expected a name after `{c}`"));
                }
                if c == '#' {
                    compound.id = Some(ident.to_string());
                } else {
                    compound.classes.push(ident.to_string());
                }
                rest = after;
            }
            '[' => {
                let close = rest.find(']').ok_or("unterminated attribute filter")?;
                compound.attrs.push(parse_attr_filter(&rest[1..close])?);
                rest = &rest[close + 1..];
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }
    Ok(compound)
}

fn parse_attr_filter(body: &str) -> Result<AttrFilter, String> {
    let unquote = |v: &str| {
        let v = v.trim();
        v.strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(v)
            .to_string()
    };

    let (name, op) = if let Some((name, value)) = body.split_once("^=") {
        (name, AttrOp::Prefix(unquote(value)))
    } else if let Some((name, value)) = body.split_once('=') {
        (name, AttrOp::Equals(unquote(value)))
    } else {
        (body, AttrOp::Exists)
    };
    let name = name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return Err(format!("invalid attribute name `{name}`"));
    }
    Ok(AttrFilter {
        name: name.to_ascii_lowercase(),
        op,
    })
}
