//! Lazy image loading for the gallery.
//!
//! Gallery images ship their real source in a pending attribute (`data-src`).
//! With an observer available, each image is promoted the first time it comes
//! within the root margin of the viewport, then unobserved. Without one, every
//! image is promoted synchronously during setup.
//!
//! Promotion is one-way. An image whose `src` actually changed gets an error
//! handler that dims it on load failure; failures are terminal.

use super::{Environment, Missing};
use crate::config::{BehaviorConfig, LazyLoadConfig, MarkupConfig};
use crate::dom::{Document, NodeId, Selector};
use crate::events::{EventKind, Handler, Registry};
use crate::observer::{IntersectionEntry, IntersectionObserver};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLoad {
    /// Waiting to become visible.
    Pending,
    Loaded,
    /// Load error after promotion; dimmed, never retried.
    Failed,
}

#[derive(Debug, Clone)]
struct LazyImage {
    node: NodeId,
    state: ImageLoad,
}

#[derive(Debug, Clone)]
pub struct LazyGallery {
    images: Vec<LazyImage>,
    observer: Option<IntersectionObserver>,
}

impl LazyGallery {
    pub(super) fn setup(
        doc: &mut Document,
        config: &BehaviorConfig,
        env: &Environment,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let markup = &config.markup;
        let nodes = doc.query_all(&Selector::class(&markup.gallery_item_class));
        if nodes.is_empty() {
            return Err(Missing::class(&markup.gallery_item_class));
        }

        let mut gallery = Self {
            images: nodes
                .iter()
                .map(|&node| LazyImage {
                    node,
                    state: ImageLoad::Pending,
                })
                .collect(),
            observer: None,
        };

        if config.lazy_load.dim_unpromoted_failures {
            for (index, &node) in nodes.iter().enumerate() {
                registry.bind(node, EventKind::Error, Handler::DimFailedImage(index));
            }
        }

        if env.intersection_observer {
            let mut observer = IntersectionObserver::new(config.lazy_load.margin());
            for &node in &nodes {
                observer.observe(node);
            }
            gallery.observer = Some(observer);
        } else {
            log::debug!("no intersection observer, promoting {} images now", nodes.len());
            for index in 0..gallery.images.len() {
                gallery.promote(doc, index, registry, markup);
            }
        }
        Ok(gallery)
    }

    pub fn observer(&self) -> Option<&IntersectionObserver> {
        self.observer.as_ref()
    }

    pub fn states(&self) -> impl Iterator<Item = (NodeId, ImageLoad)> + '_ {
        self.images.iter().map(|i| (i.node, i.state))
    }

    pub(super) fn on_intersections(
        &mut self,
        doc: &mut Document,
        entries: &[IntersectionEntry],
        registry: &mut Registry,
        markup: &MarkupConfig,
    ) {
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let observing = self
                .observer
                .as_ref()
                .is_some_and(|o| o.is_observing(entry.target));
            if !observing {
                continue;
            }
            if let Some(index) = self.images.iter().position(|i| i.node == entry.target) {
                self.promote(doc, index, registry, markup);
            }
            if let Some(observer) = self.observer.as_mut() {
                observer.unobserve(entry.target);
            }
        }
    }

    /// Move the pending source into `src` and drop the pending marker.
    fn promote(&mut self, doc: &mut Document, index: usize, registry: &mut Registry, markup: &MarkupConfig) {
        let node = self.images[index].node;
        let source = doc
            .attr(node, &markup.pending_src_attr)
            .filter(|s| !s.is_empty())
            .or_else(|| doc.attr(node, "src"))
            .map(str::to_string);

        let changed = match source {
            Some(src) if !src.is_empty() && doc.attr(node, "src") != Some(src.as_str()) => {
                doc.set_attr(node, "src", &src);
                true
            }
            _ => false,
        };
        doc.remove_attr(node, &markup.pending_src_attr);
        let image = &mut self.images[index];
        if image.state != ImageLoad::Failed {
            image.state = ImageLoad::Loaded;
        }

        let dim = Handler::DimFailedImage(index);
        if changed && !registry.is_bound(node, EventKind::Error, dim) {
            registry.bind(node, EventKind::Error, dim);
        }
    }

    pub(super) fn mark_failed(&mut self, doc: &mut Document, index: usize, lazy: &LazyLoadConfig) {
        let Some(image) = self.images.get_mut(index) else {
            return;
        };
        image.state = ImageLoad::Failed;
        doc.set_style(image.node, "opacity", &lazy.failed_opacity.to_string());
        log::debug!("image {} failed to load, dimmed", image.node);
    }
}
