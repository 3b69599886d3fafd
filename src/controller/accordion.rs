//! FAQ accordion: at most one panel open at a time.
//!
//! Each toggle carries its own flag, read from the panel's inline `display`
//! at setup. A click reads only the clicked entry's flag, closes every panel,
//! then reopens the clicked one if it was closed.

use super::{Missing, Visibility};
use crate::config::MarkupConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::events::{EventKind, Handler, Registry};

#[derive(Debug, Clone)]
struct Entry {
    panel: NodeId,
    state: Visibility,
}

#[derive(Debug, Clone)]
pub struct Accordion {
    /// One entry per toggle, by binding index.
    entries: Vec<Entry>,
    /// Every panel that is force-closed on a toggle.
    panels: Vec<NodeId>,
}

impl Accordion {
    pub(super) fn setup(
        doc: &mut Document,
        markup: &MarkupConfig,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let toggles = doc.query_all(&Selector::class(&markup.accordion_button_class));
        let mut entries = Vec::new();
        for toggle in toggles {
            // A toggle without an adjacent panel has nothing to control.
            let Some(panel) = doc.next_element_sibling(toggle) else {
                log::debug!("accordion toggle {toggle} has no panel, skipped");
                continue;
            };
            let open = doc.style(panel, "display").as_deref() == Some("block");
            registry.bind(toggle, EventKind::Click, Handler::ToggleAccordion(entries.len()));
            entries.push(Entry {
                panel,
                state: Visibility::from_open(open),
            });
        }
        if entries.is_empty() {
            return Err(Missing::class(&markup.accordion_button_class));
        }

        let mut panels = doc.query_all(&Selector::class(&markup.accordion_panel_class));
        for entry in &entries {
            if !panels.contains(&entry.panel) {
                panels.push(entry.panel);
            }
        }

        Ok(Self { entries, panels })
    }

    /// First panel whose toggle is open. Markup may start with several.
    pub fn open_panel(&self) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|e| e.state.is_open())
            .map(|e| e.panel)
    }

    pub(super) fn toggle(&mut self, doc: &mut Document, index: usize) {
        let Some(was_open) = self.entries.get(index).map(|e| e.state.is_open()) else {
            return;
        };
        for entry in &mut self.entries {
            entry.state = Visibility::Closed;
        }
        self.entries[index].state = Visibility::from_open(!was_open);

        let open = self.open_panel();
        for &panel in &self.panels {
            let display = if Some(panel) == open { "block" } else { "none" };
            doc.set_style(panel, "display", display);
        }
    }
}
