//! The page interaction controller.
//!
//! [`PageController::init`] runs once against a parsed [`Document`]. It
//! performs independent setup steps, one per component, each of which
//! looks up its elements, records its typed state and binds handlers in the
//! [`Registry`]. A step whose elements are missing is skipped and reported;
//! it never stops the steps after it.
//!
//! | Component | Module | Elements |
//! |-----------|--------|----------|
//! | Navigation toggle | [`nav`] | `#hamburger`, `.nav-list` |
//! | Submenus | [`submenu`] | `.has-sub .sub-btn`, `.sub-list` |
//! | Lazy images | [`lazy`] | `.gallery-item[data-src]` |
//! | Lightbox | [`lightbox`] | `#galleryGrid`, `#lightbox`, `#lightboxImg`, `#lightboxCaption`, `#lightboxClose` |
//! | FAQ accordion | [`accordion`] | `.accordion-btn` + next sibling `.accordion-panel` |
//! | Admission form | [`form`] | `#admissionForm`, `#formStatus`, `#clearForm` |
//! | Utilities | [`anchors`] | `#year`, `a[href^="#"]` |
//! | Escape dismissal | this module | the document |
//!
//! Names above are the stock [`MarkupConfig`] values.
//!
//! ## State Ownership
//!
//! Each component keeps its state in a typed field ([`Visibility`],
//! [`ImageLoad`], [`LightboxState`], [`FormStatus`]). Classes, `aria-*`
//! attributes and inline styles are rendered from that state after every
//! change; the controller never reads them back to decide what to do.
//!
//! ## Dispatch
//!
//! [`PageController::dispatch`] bubbles an [`Event`] from its target up to
//! the document node, running the handlers bound at each step. When no
//! handler prevented the default, the dispatcher performs the browser's
//! default action: submit buttons submit their form, in-page anchors jump.

pub mod accordion;
pub mod anchors;
pub mod form;
pub mod lazy;
pub mod lightbox;
pub mod nav;
pub mod submenu;

pub use form::{Field, FormOutcome, FormStatus, Submission};
pub use lazy::ImageLoad;
pub use lightbox::LightboxState;

use crate::config::{BehaviorConfig, MarkupConfig};
use crate::dom::{Document, NodeId, ScrollBehavior, ScrollRequest, Selector};
use crate::events::{DefaultAction, DispatchOutcome, Event, EventKind, Handler, Registry};
use crate::observer::{IntersectionEntry, IntersectionObserver, Rect};
use accordion::Accordion;
use anchors::Anchors;
use chrono::Datelike;
use form::AdmissionForm;
use lazy::LazyGallery;
use lightbox::Lightbox;
use nav::NavMenu;
use serde::Serialize;
use std::fmt;
use submenu::Submenus;

/// Open/closed state of a toggleable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Open,
    #[default]
    Closed,
}

impl Visibility {
    pub fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }

    /// Value for `aria-expanded`.
    pub fn aria_expanded(self) -> &'static str {
        if self.is_open() { "true" } else { "false" }
    }
}

/// Capabilities of the host the page runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    /// Whether the host can report element visibility asynchronously.
    pub intersection_observer: bool,
    /// Calendar year written into the year element.
    pub year: i32,
}

impl Environment {
    /// A modern browser: visibility observation available, local clock year.
    pub fn detect() -> Self {
        Self {
            intersection_observer: true,
            year: chrono::Local::now().year(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::detect()
    }
}

/// A setup step of [`PageController::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SetupStep {
    Navigation,
    Submenus,
    LazyImages,
    Lightbox,
    Accordion,
    AdmissionForm,
    Utilities,
    EscapeKey,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigation => "Navigation",
            Self::Submenus => "Submenus",
            Self::LazyImages => "Lazy images",
            Self::Lightbox => "Lightbox",
            Self::Accordion => "Accordion",
            Self::AdmissionForm => "Admission form",
            Self::Utilities => "Utilities",
            Self::EscapeKey => "Escape key",
        };
        f.write_str(name)
    }
}

/// Description of the element a skipped step could not find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Missing(pub String);

impl Missing {
    pub(crate) fn id(id: &str) -> Self {
        Self(format!("#{id}"))
    }

    pub(crate) fn class(class: &str) -> Self {
        Self(format!(".{class}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum StepOutcome {
    Bound { bindings: usize },
    Skipped { missing: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: SetupStep,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// What [`PageController::init`] found and wired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub steps: Vec<StepReport>,
}

impl SetupReport {
    pub fn outcome(&self, step: SetupStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }

    pub fn is_bound(&self, step: SetupStep) -> bool {
        matches!(self.outcome(step), Some(StepOutcome::Bound { .. }))
    }
}

/// Per-dispatch view handed to handlers.
pub(crate) struct EventContext<'a> {
    pub event: &'a Event,
    pub current_target: NodeId,
    pub default_prevented: bool,
}

impl EventContext<'_> {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

#[derive(Debug, Clone)]
pub struct PageController {
    config: BehaviorConfig,
    registry: Registry,
    report: SetupReport,
    nav: Option<NavMenu>,
    submenus: Option<Submenus>,
    gallery: Option<LazyGallery>,
    lightbox: Option<Lightbox>,
    accordion: Option<Accordion>,
    form: Option<AdmissionForm>,
    anchors: Option<Anchors>,
}

impl PageController {
    /// Wire every component found in `doc`. Runs each setup step once.
    pub fn init(doc: &mut Document, config: BehaviorConfig, env: &Environment) -> Self {
        let mut registry = Registry::new();
        let mut report = SetupReport::default();
        let markup = &config.markup;

        let nav = record(&mut report, &mut registry, SetupStep::Navigation, |reg| {
            NavMenu::setup(doc, markup, reg)
        });
        let submenus = record(&mut report, &mut registry, SetupStep::Submenus, |reg| {
            Submenus::setup(doc, markup, reg)
        });
        let gallery = record(&mut report, &mut registry, SetupStep::LazyImages, |reg| {
            LazyGallery::setup(doc, &config, env, reg)
        });
        let lightbox = record(&mut report, &mut registry, SetupStep::Lightbox, |reg| {
            Lightbox::setup(doc, markup, reg)
        });
        let accordion = record(&mut report, &mut registry, SetupStep::Accordion, |reg| {
            Accordion::setup(doc, markup, reg)
        });
        let form = record(&mut report, &mut registry, SetupStep::AdmissionForm, |reg| {
            AdmissionForm::setup(doc, markup, reg)
        });
        let anchors = record(&mut report, &mut registry, SetupStep::Utilities, |reg| {
            Anchors::setup(doc, markup, env.year, reg)
        });
        record(&mut report, &mut registry, SetupStep::EscapeKey, |reg| {
            reg.bind(doc.root(), EventKind::KeyDown, Handler::DismissOnEscape);
            Ok(())
        });

        log::debug!("controller initialized with {} bindings", registry.len());
        Self {
            config,
            registry,
            report,
            nav,
            submenus,
            gallery,
            lightbox,
            accordion,
            form,
            anchors,
        }
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn report(&self) -> &SetupReport {
        &self.report
    }

    fn markup(&self) -> &MarkupConfig {
        &self.config.markup
    }

    // ------------------------------------------------------------------
    // Event delivery
    // ------------------------------------------------------------------

    /// Deliver `event`, bubbling from its target to the document node.
    pub fn dispatch(&mut self, doc: &mut Document, event: &Event) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let path: Vec<NodeId> = doc.ancestors_inclusive(event.target).collect();
        for current_target in path {
            let handlers = self
                .registry
                .handlers_for(current_target, event.kind)
                .to_vec();
            for handler in handlers {
                let mut ctx = EventContext {
                    event,
                    current_target,
                    default_prevented: outcome.default_prevented,
                };
                log::debug!("{} on {current_target} -> {handler}", event.kind);
                self.run(doc, handler, &mut ctx);
                outcome.default_prevented = ctx.default_prevented;
                outcome.handled.push(handler);
            }
        }

        if !outcome.default_prevented {
            outcome.default_action = self.perform_default(doc, event, &mut outcome.handled);
        }
        outcome
    }

    fn run(&mut self, doc: &mut Document, handler: Handler, ctx: &mut EventContext<'_>) {
        let markup = &self.config.markup;
        match handler {
            Handler::ToggleNav => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.toggle(doc, markup);
                }
            }
            Handler::CloseNavOnLink => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.close_on_link(doc, ctx.event.target, markup);
                }
            }
            Handler::ToggleSubmenu(index) => {
                if let Some(submenus) = self.submenus.as_mut() {
                    submenus.toggle(doc, index, markup);
                }
            }
            Handler::DimFailedImage(index) => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.mark_failed(doc, index, &self.config.lazy_load);
                }
            }
            Handler::OpenLightbox => {
                if let Some(lightbox) = self.lightbox.as_mut() {
                    lightbox.open_from(doc, ctx.event.target, markup);
                }
            }
            Handler::CloseLightbox => {
                if let Some(lightbox) = self.lightbox.as_mut() {
                    lightbox.close(doc, markup);
                }
            }
            Handler::LightboxBackdrop => {
                if let Some(lightbox) = self.lightbox.as_mut() {
                    lightbox.close_on_backdrop(doc, ctx.event.target, markup);
                }
            }
            Handler::ToggleAccordion(index) => {
                if let Some(accordion) = self.accordion.as_mut() {
                    accordion.toggle(doc, index);
                }
            }
            Handler::SubmitAdmission => {
                if let Some(form) = self.form.as_mut() {
                    ctx.prevent_default();
                    form.submit(doc, &self.config);
                }
            }
            Handler::ClearAdmission => {
                if let Some(form) = self.form.as_mut() {
                    form.clear(doc);
                }
            }
            Handler::SmoothScroll => {
                anchors::smooth_scroll(doc, ctx, self.config.anchors.fallback_to_default);
            }
            Handler::DismissOnEscape => {
                if ctx.event.key.as_deref() == Some("Escape") {
                    self.dismiss_all(doc);
                }
            }
        }
    }

    /// Close the nav, every submenu and the lightbox.
    fn dismiss_all(&mut self, doc: &mut Document) {
        let markup = &self.config.markup;
        if let Some(nav) = self.nav.as_mut() {
            nav.close(doc, markup);
        }
        if let Some(submenus) = self.submenus.as_mut() {
            submenus.close_all(doc, markup);
        }
        if let Some(lightbox) = self.lightbox.as_mut().filter(|l| l.state().is_open()) {
            lightbox.close(doc, markup);
        }
    }

    fn perform_default(
        &mut self,
        doc: &mut Document,
        event: &Event,
        handled: &mut Vec<Handler>,
    ) -> Option<DefaultAction> {
        if event.kind != EventKind::Click {
            return None;
        }

        if let Some(form) = submitted_form(doc, event.target) {
            let nested = self.dispatch(doc, &Event::submit(form));
            handled.extend(nested.handled);
            return Some(DefaultAction::SubmitForm(form));
        }

        let link = doc.closest(event.target, &Selector::tag("a").with_attr_prefix("href", "#"))?;
        let fragment = doc.attr(link, "href")?.trim_start_matches('#').to_string();
        doc.set_fragment(&fragment);
        if let Some(target) = doc.get_element_by_id(&fragment) {
            doc.scroll_into_view(target, ScrollBehavior::Instant);
        }
        Some(DefaultAction::Jump(fragment))
    }

    /// Deliver a batch of visibility changes from the host's observer.
    pub fn on_intersections(&mut self, doc: &mut Document, entries: &[IntersectionEntry]) {
        if let Some(gallery) = self.gallery.as_mut() {
            gallery.on_intersections(doc, entries, &mut self.registry, &self.config.markup);
        }
    }

    /// Compute intersections from element boxes and deliver them.
    pub fn observe_viewport(&mut self, doc: &mut Document, boxes: &[(NodeId, Rect)], viewport: Rect) {
        let entries = match self.observer() {
            Some(observer) => observer.compute_entries(boxes, viewport),
            None => return,
        };
        self.on_intersections(doc, &entries);
    }

    // ------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------

    pub fn nav_state(&self) -> Option<Visibility> {
        self.nav.as_ref().map(NavMenu::state)
    }

    pub fn submenu_states(&self) -> Vec<Visibility> {
        self.submenus
            .as_ref()
            .map(|s| s.states().collect())
            .unwrap_or_default()
    }

    pub fn image_states(&self) -> Vec<(NodeId, ImageLoad)> {
        self.gallery
            .as_ref()
            .map(|g| g.states().collect())
            .unwrap_or_default()
    }

    pub fn observer(&self) -> Option<&IntersectionObserver> {
        self.gallery.as_ref().and_then(LazyGallery::observer)
    }

    pub fn lightbox_state(&self) -> Option<&LightboxState> {
        self.lightbox.as_ref().map(Lightbox::state)
    }

    /// Panel currently open in the accordion, if any.
    pub fn open_panel(&self) -> Option<NodeId> {
        self.accordion.as_ref().and_then(Accordion::open_panel)
    }

    pub fn form_status(&self) -> Option<&FormStatus> {
        self.form.as_ref().map(AdmissionForm::status)
    }

    /// The last successful submission, ready to be sent to a real backend.
    pub fn last_submission(&self) -> Option<&Submission> {
        self.form.as_ref().and_then(AdmissionForm::last_submission)
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.as_ref().map_or(0, Anchors::len)
    }

    /// Serializable view of every component's state.
    pub fn snapshot(&self, doc: &Document) -> UiSnapshot {
        let markup = self.markup();
        UiSnapshot {
            nav: self.nav_state(),
            submenus: self.submenu_states(),
            images: self
                .image_states()
                .into_iter()
                .map(|(node, state)| ImageSnapshot {
                    node,
                    state,
                    src: doc.attr(node, "src").unwrap_or_default().to_string(),
                    pending: doc.attr(node, &markup.pending_src_attr).map(str::to_string),
                })
                .collect(),
            lightbox: self.lightbox_state().cloned(),
            open_panel: self.open_panel(),
            form: self.form_status().cloned(),
            status_text: doc
                .get_element_by_id(&markup.form_status_id)
                .map(|s| doc.text_content(s)),
            focused: doc.focused(),
            scroll: doc.last_scroll(),
        }
    }
}

fn record<T>(
    report: &mut SetupReport,
    registry: &mut Registry,
    step: SetupStep,
    setup: impl FnOnce(&mut Registry) -> Result<T, Missing>,
) -> Option<T> {
    let before = registry.len();
    match setup(registry) {
        Ok(component) => {
            let bindings = registry.len() - before;
            log::debug!("{step}: {bindings} bindings");
            report.steps.push(StepReport {
                step,
                outcome: StepOutcome::Bound { bindings },
            });
            Some(component)
        }
        Err(Missing(missing)) => {
            log::warn!("{step}: skipped, no {missing} in page");
            report.steps.push(StepReport {
                step,
                outcome: StepOutcome::Skipped { missing },
            });
            None
        }
    }
}

/// The form a click on `target` submits, if `target` is a submit control.
fn submitted_form(doc: &Document, target: NodeId) -> Option<NodeId> {
    let control = doc.ancestors_inclusive(target).find(|&n| {
        let kind = doc.attr(n, "type").map(str::to_ascii_lowercase);
        match doc.tag_name(n) {
            Some("button") => kind.is_none_or(|k| k == "submit"),
            Some("input") => kind.as_deref() == Some("submit"),
            _ => false,
        }
    })?;
    doc.closest(control, &Selector::tag("form"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSnapshot {
    pub node: NodeId,
    pub state: ImageLoad,
    pub src: String,
    pub pending: Option<String>,
}

/// Every component's state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiSnapshot {
    pub nav: Option<Visibility>,
    pub submenus: Vec<Visibility>,
    pub images: Vec<ImageSnapshot>,
    pub lightbox: Option<LightboxState>,
    pub open_panel: Option<NodeId>,
    pub form: Option<FormStatus>,
    pub status_text: Option<String>,
    pub focused: Option<NodeId>,
    pub scroll: Option<ScrollRequest>,
}

#[cfg(test)]
mod tests;
