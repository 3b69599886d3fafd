//! Submenu toggles.
//!
//! Each `.sub-btn` inside a `.has-sub` group flips that group's `.sub-list`.
//! The open flag belongs to the group, so several buttons in one group share
//! it. Groups are independent of each other. Escape closes all of them, including
//! stray `.sub-list` elements no button controls.

use super::{Missing, Visibility};
use crate::config::MarkupConfig;
use crate::dom::{Document, NodeId, Selector};
use crate::events::{EventKind, Handler, Registry};

#[derive(Debug, Clone)]
struct Group {
    node: NodeId,
    /// Every toggle inside the group; they share one flag.
    buttons: Vec<NodeId>,
    list: Option<NodeId>,
    state: Visibility,
}

#[derive(Debug, Clone)]
pub struct Submenus {
    groups: Vec<Group>,
    /// Every submenu list in the page, controlled or not.
    lists: Vec<NodeId>,
}

impl Submenus {
    pub(super) fn setup(
        doc: &mut Document,
        markup: &MarkupConfig,
        registry: &mut Registry,
    ) -> Result<Self, Missing> {
        let group_sel = Selector::class(&markup.submenu_group_class);
        let list_sel = Selector::class(&markup.submenu_list_class);
        let buttons = doc.query_all(
            &group_sel
                .clone()
                .descendant(Selector::class(&markup.submenu_button_class)),
        );
        let lists = doc.query_all(&list_sel);
        if buttons.is_empty() && lists.is_empty() {
            return Err(Missing(format!(
                ".{} .{}",
                markup.submenu_group_class, markup.submenu_button_class
            )));
        }

        let mut groups: Vec<Group> = Vec::new();
        for button in buttons {
            let Some(node) = doc.closest(button, &group_sel) else {
                continue;
            };
            let index = match groups.iter().position(|g| g.node == node) {
                Some(index) => index,
                None => {
                    let list = doc.query_within(node, &list_sel);
                    let open = list.is_some_and(|l| doc.has_class(l, &markup.open_class));
                    groups.push(Group {
                        node,
                        buttons: Vec::new(),
                        list,
                        state: Visibility::from_open(open),
                    });
                    groups.len() - 1
                }
            };
            groups[index].buttons.push(button);
            registry.bind(button, EventKind::Click, Handler::ToggleSubmenu(index));
        }

        let submenus = Self { groups, lists };
        for group in &submenus.groups {
            render(doc, group, markup);
        }
        Ok(submenus)
    }

    /// One state per `.has-sub` group, in document order.
    pub fn states(&self) -> impl Iterator<Item = Visibility> + '_ {
        self.groups.iter().map(|g| g.state)
    }

    pub(super) fn toggle(&mut self, doc: &mut Document, index: usize, markup: &MarkupConfig) {
        if let Some(group) = self.groups.get_mut(index) {
            group.state = group.state.toggled();
            render(doc, group, markup);
        }
    }

    pub(super) fn close_all(&mut self, doc: &mut Document, markup: &MarkupConfig) {
        for group in &mut self.groups {
            group.state = Visibility::Closed;
            render(doc, group, markup);
        }
        for &list in &self.lists {
            doc.remove_class(list, &markup.open_class);
        }
    }
}

fn render(doc: &mut Document, group: &Group, markup: &MarkupConfig) {
    if let Some(list) = group.list {
        if group.state.is_open() {
            doc.add_class(list, &markup.open_class);
        } else {
            doc.remove_class(list, &markup.open_class);
        }
    }
    for &button in &group.buttons {
        doc.set_attr(button, "aria-expanded", group.state.aria_expanded());
    }
}
