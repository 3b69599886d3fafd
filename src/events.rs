//! Synthetic events and the handler registry.
//!
//! Every behavior the controller performs is named by a [`Handler`] variant.
//! Setup binds handlers to `(node, event kind)` pairs in a [`Registry`];
//! dispatch looks them up while bubbling from the target to the document.
//! Handlers are data, not closures, so tests can inspect exactly what was
//! wired and invoke any of it by dispatching a plain [`Event`].

use crate::dom::NodeId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    Submit,
    KeyDown,
    /// Resource load failure (images).
    Error,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::KeyDown => "keydown",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// An event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    /// Key name for `KeyDown` events (`"Escape"`, `"Enter"`, ...).
    pub key: Option<String>,
}

impl Event {
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            key: None,
        }
    }

    pub fn submit(form: NodeId) -> Self {
        Self {
            kind: EventKind::Submit,
            target: form,
            key: None,
        }
    }

    pub fn key_down(target: NodeId, key: &str) -> Self {
        Self {
            kind: EventKind::KeyDown,
            target,
            key: Some(key.to_string()),
        }
    }

    pub fn error(target: NodeId) -> Self {
        Self {
            kind: EventKind::Error,
            target,
            key: None,
        }
    }
}

/// Every behavior a binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handler {
    ToggleNav,
    CloseNavOnLink,
    /// Index into the controller's submenu list.
    ToggleSubmenu(usize),
    /// Index into the controller's lazy image list.
    DimFailedImage(usize),
    OpenLightbox,
    CloseLightbox,
    LightboxBackdrop,
    /// Index into the controller's accordion entries.
    ToggleAccordion(usize),
    SubmitAdmission,
    ClearAdmission,
    SmoothScroll,
    DismissOnEscape,
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToggleNav => f.write_str("toggle-nav"),
            Self::CloseNavOnLink => f.write_str("close-nav-on-link"),
            Self::ToggleSubmenu(i) => write!(f, "toggle-submenu[{i}]"),
            Self::DimFailedImage(i) => write!(f, "dim-failed-image[{i}]"),
            Self::OpenLightbox => f.write_str("open-lightbox"),
            Self::CloseLightbox => f.write_str("close-lightbox"),
            Self::LightboxBackdrop => f.write_str("lightbox-backdrop"),
            Self::ToggleAccordion(i) => write!(f, "toggle-accordion[{i}]"),
            Self::SubmitAdmission => f.write_str("submit-admission"),
            Self::ClearAdmission => f.write_str("clear-admission"),
            Self::SmoothScroll => f.write_str("smooth-scroll"),
            Self::DismissOnEscape => f.write_str("dismiss-on-escape"),
        }
    }
}

/// Mapping from `(node, event kind)` to the handlers bound there, in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    bindings: BTreeMap<(NodeId, EventKind), Vec<Handler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, node: NodeId, kind: EventKind, handler: Handler) {
        self.bindings.entry((node, kind)).or_default().push(handler);
    }

    pub fn handlers_for(&self, node: NodeId, kind: EventKind) -> &[Handler] {
        self.bindings
            .get(&(node, kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_bound(&self, node: NodeId, kind: EventKind, handler: Handler) -> bool {
        self.handlers_for(node, kind).contains(&handler)
    }

    /// Total number of handler bindings.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings in `(node, kind)` order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, EventKind, Handler)> + '_ {
        self.bindings
            .iter()
            .flat_map(|(&(node, kind), handlers)| handlers.iter().map(move |&h| (node, kind, h)))
    }
}

/// What happened while dispatching one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Handlers that ran, in order.
    pub handled: Vec<Handler>,
    pub default_prevented: bool,
    /// Default action the dispatcher performed afterwards, if any.
    pub default_action: Option<DefaultAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultAction {
    /// A submit button click submitted its form.
    SubmitForm(NodeId),
    /// An in-page anchor jumped to a fragment.
    Jump(String),
}
