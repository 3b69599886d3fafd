//! # Site Behavior
//!
//! The interactive layer of a small admissions website, as a headless,
//! typed page controller. A page is parsed into an in-memory [`dom`]
//! document; [`controller::PageController::init`] finds the components the
//! markup contains and wires them; hosts then deliver [`events`] and
//! visibility changes, and the controller updates the document.
//!
//! Components:
//!
//! - Mobile navigation toggle and nested submenus
//! - Lazy gallery images, promoted when they come near the viewport
//! - A lightbox showing the clicked gallery image
//! - A single-open FAQ accordion
//! - Admission form validation with simulated submission
//! - The footer year and smooth in-page anchor scrolling
//! - Escape to dismiss every open overlay
//!
//! # Architecture
//!
//! ```text
//! page.html ──parse──▶ Document ──init──▶ PageController ◀── events / intersections
//!                          ▲                    │
//!                          └──── renders state ─┘
//! ```
//!
//! Every transient UI state lives in a typed field on its component. Classes,
//! `aria-*` attributes and inline styles are output, rendered from that state
//! after each change. Handlers are plain [`events::Handler`] values in an
//! explicit [`events::Registry`], so tests dispatch synthetic events and
//! inspect exactly what was bound where.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dom`] | Arena document: tree, attributes, classes, styles, selectors, form values, focus |
//! | [`markup`] | HTML parsing (html5ever) into the arena and serialization back out |
//! | [`events`] | Event kinds, the handler enum, the registry and dispatch outcomes |
//! | [`observer`] | Intersection observer model: root margin, geometry, entries |
//! | [`controller`] | Setup steps, per-component state and event dispatch |
//! | [`config`] | `config.toml` loading, merging and validation: copy, colors, markup names |
//! | [`site`] | Reference page rendered with Maud from configurable content |
//! | [`script`] | TOML interaction scripts replayed against a page |
//! | [`output`] | CLI output formatting for reports, step logs and state |
//!
//! # Design Decisions
//!
//! ## Isolated Setup Steps
//!
//! A page missing some components still gets the rest. Each setup step looks
//! up its own elements and is skipped, with a logged warning and an entry in
//! the [`controller::SetupReport`], when they are absent.
//!
//! ## Simulated Submission
//!
//! The admission form never leaves the process. A valid form yields a
//! [`controller::Submission`], reachable through
//! [`controller::PageController::last_submission`], for a host to forward.

pub mod config;
pub mod controller;
pub mod dom;
pub mod events;
pub mod markup;
pub mod observer;
pub mod output;
pub mod script;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;
