//! Gallery lightbox overlay.

use super::Missing;
use crate::config::MarkupConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::events::{EventKind, Handler, Registry};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LightboxState {
    Hidden,
    Showing { src: String, caption: String },
}

impl LightboxState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Showing { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Lightbox {
    grid: NodeId,
    overlay: NodeId,
    image: Option<NodeId>,
    caption: Option<NodeId>,
    state: LightboxState,
}

impl Lightbox {
    pub(super) fn setup(
        doc: &mut Document,
        markup: &MarkupConfig,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let grid = doc
            .get_element_by_id(&markup.gallery_grid_id)
            .ok_or_else(|| Missing::id(&markup.gallery_grid_id))?;
        let overlay = doc
            .get_element_by_id(&markup.lightbox_id)
            .ok_or_else(|| Missing::id(&markup.lightbox_id))?;
        let image = doc.get_element_by_id(&markup.lightbox_image_id);
        let caption = doc.get_element_by_id(&markup.lightbox_caption_id);

        registry.bind(grid, EventKind::Click, Handler::OpenLightbox);
        if let Some(close) = doc.get_element_by_id(&markup.lightbox_close_id) {
            registry.bind(close, EventKind::Click, Handler::CloseLightbox);
        }
        registry.bind(overlay, EventKind::Click, Handler::LightboxBackdrop);

        let state = if doc.has_class(overlay, &markup.hidden_class) {
            LightboxState::Hidden
        } else {
            LightboxState::Showing {
                src: image
                    .and_then(|i| doc.attr(i, "src"))
                    .unwrap_or_default()
                    .to_string(),
                caption: caption.map(|c| doc.text_content(c)).unwrap_or_default(),
            }
        };
        Ok(Self {
            grid,
            overlay,
            image,
            caption,
            state,
        })
    }

    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    /// Show the gallery image the click landed on, if any.
    pub(super) fn open_from(&mut self, doc: &mut Document, target: NodeId, markup: &MarkupConfig) {
        let Some(img) = doc
            .closest(target, &Selector::tag("img"))
            .filter(|&img| doc.contains(self.grid, img))
        else {
            return;
        };
        let non_empty = |name: &str| doc.attr(img, name).filter(|v| !v.is_empty());
        let src = non_empty("src")
            .or_else(|| non_empty(&markup.pending_src_attr))
            .unwrap_or_default()
            .to_string();
        let caption = doc.attr(img, "alt").unwrap_or_default().to_string();

        self.state = LightboxState::Showing { src, caption };
        self.render(doc, markup);
    }

    pub(super) fn close(&mut self, doc: &mut Document, markup: &MarkupConfig) {
        self.state = LightboxState::Hidden;
        self.render(doc, markup);
    }

    /// Close only when the overlay itself was clicked, not its content.
    pub(super) fn close_on_backdrop(&mut self, doc: &mut Document, target: NodeId, markup: &MarkupConfig) {
        if target == self.overlay {
            self.close(doc, markup);
        }
    }

    fn render(&self, doc: &mut Document, markup: &MarkupConfig) {
        let (src, caption) = match &self.state {
            LightboxState::Hidden => {
                doc.add_class(self.overlay, &markup.hidden_class);
                doc.set_attr(self.overlay, "aria-hidden", "true");
                ("", "")
            }
            LightboxState::Showing { src, caption } => {
                doc.remove_class(self.overlay, &markup.hidden_class);
                doc.set_attr(self.overlay, "aria-hidden", "false");
                (src.as_str(), caption.as_str())
            }
        };
        if let Some(image) = self.image {
            doc.set_attr(image, "src", src);
            doc.set_attr(image, "alt", caption);
        }
        if let Some(node) = self.caption {
            doc.set_text_content(node, caption);
        }
    }
}
