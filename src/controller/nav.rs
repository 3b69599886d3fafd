//! Mobile navigation toggle.

use super::{Missing, Visibility};
use crate::config::MarkupConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::events::{EventKind, Handler, Registry};

#[derive(Debug, Clone)]
pub struct NavMenu {
    toggle: NodeId,
    list: NodeId,
    state: Visibility,
}

impl NavMenu {
    pub(super) fn setup(
        doc: &mut Document,
        markup: &MarkupConfig,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let toggle = doc
            .get_element_by_id(&markup.hamburger_id)
            .ok_or_else(|| Missing::id(&markup.hamburger_id))?;
        let list = doc
            .query(&Selector::class(&markup.nav_list_class))
            .ok_or_else(|| Missing::class(&markup.nav_list_class))?;

        registry.bind(toggle, EventKind::Click, Handler::ToggleNav);
        registry.bind(list, EventKind::Click, Handler::CloseNavOnLink);

        let nav = Self {
            toggle,
            list,
            state: Visibility::from_open(doc.has_class(list, &markup.open_class)),
        };
        nav.render(doc, markup);
        Ok(nav)
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    pub(super) fn toggle(&mut self, doc: &mut Document, markup: &MarkupConfig) {
        self.state = self.state.toggled();
        self.render(doc, markup);
    }

    pub(super) fn close(&mut self, doc: &mut Document, markup: &MarkupConfig) {
        self.state = Visibility::Closed;
        self.render(doc, markup);
    }

    /// Close when the click landed on (or inside) a link within the list.
    pub(super) fn close_on_link(&mut self, doc: &mut Document, target: NodeId, markup: &MarkupConfig) {
        let on_link = doc
            .closest(target, &Selector::tag("a"))
            .is_some_and(|link| doc.contains(self.list, link));
        if on_link {
            self.close(doc, markup);
        }
    }

    fn render(&self, doc: &mut Document, markup: &MarkupConfig) {
        if self.state.is_open() {
            doc.add_class(self.list, &markup.open_class);
        } else {
            doc.remove_class(self.list, &markup.open_class);
        }
        doc.set_attr(self.toggle, "aria-expanded", self.state.aria_expanded());
    }
}
