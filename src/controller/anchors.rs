//! Page utilities: the footer year and smooth in-page anchor scrolling.

use super::{EventContext, Missing};
use crate::config::MarkupConfig;
use crate::dom::{Document, NodeId, ScrollBehavior, Selector};
use crate::events::{EventKind, Handler, Registry};

#[derive(Debug, Clone)]
pub struct Anchors {
    links: Vec<NodeId>,
}

impl Anchors {
    /// Write the year once and bind every `a[href^="#"]`.
    pub(super) fn setup(
        doc: &mut Document,
        markup: &MarkupConfig,
        year: i32,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let year_node = doc.get_element_by_id(&markup.year_id);
        if let Some(node) = year_node {
            doc.set_text_content(node, &year.to_string());
        }

        let links = doc.query_all(&Selector::tag("a").with_attr_prefix("href", "#"));
        for &link in &links {
            registry.bind(link, EventKind::Click, Handler::SmoothScroll);
        }

        if year_node.is_none() && links.is_empty() {
            return Err(Missing(format!("#{} or a[href^=\"#\"]", markup.year_id)));
        }
        Ok(Self { links })
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Element an in-page `href` points at. A bare `#` points nowhere.
pub fn anchor_target(doc: &Document, href: &str) -> Option<NodeId> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() {
        return None;
    }
    doc.get_element_by_id(id)
}

pub(super) fn smooth_scroll(doc: &mut Document, ctx: &mut EventContext<'_>, fallback_to_default: bool) {
    let target = doc
        .attr(ctx.current_target, "href")
        .and_then(|href| anchor_target(doc, href));
    match target {
        Some(target) => {
            ctx.prevent_default();
            doc.scroll_into_view(target, ScrollBehavior::Smooth);
        }
        // Missing target: the click is swallowed unless configured otherwise.
        None if !fallback_to_default => ctx.prevent_default(),
        None => {}
    }
}
