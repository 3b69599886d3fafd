//! Shared test utilities for the site-behavior test suite.
//!
//! Provides a fixture page covering the whole markup contract, lookup helpers
//! that panic with a clear message on miss, and shortcuts for dispatching
//! events through a controller.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (mut doc, mut ctl) = fixture_page();
//! let hamburger = by_id(&doc, "hamburger");
//! click(&mut ctl, &mut doc, hamburger);
//! assert!(has_class(&doc, by_class(&doc, "nav-list"), "show"));
//! ```

use crate::config::BehaviorConfig;
use crate::controller::{Environment, PageController};
use crate::dom::{Document, NodeId, Selector};
use crate::events::{DispatchOutcome, Event};
use crate::markup::parse_document;

/// Markup exercising every component the controller wires.
pub const FIXTURE_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head><title>Admissions</title></head>
<body>
  <header>
    <button id="hamburger" aria-expanded="false">Menu</button>
    <nav>
      <ul class="nav-list">
        <li><a href="#about" id="nav-about">About</a></li>
        <li class="has-sub">
          <button class="sub-btn" id="programs-btn" aria-expanded="false">Programs</button>
          <ul class="sub-list" id="programs-list">
            <li><a href="/programs/web">Web Development</a></li>
          </ul>
        </li>
        <li class="has-sub">
          <button class="sub-btn" id="campus-btn" aria-expanded="false">Campus</button>
          <ul class="sub-list" id="campus-list">
            <li><a href="/campus/tour"><span id="tour-label">Tour</span></a></li>
          </ul>
        </li>
        <li><a href="#missing" id="nav-missing">Nowhere</a></li>
      </ul>
    </nav>
  </header>
  <section id="about"><h2>About</h2></section>
  <section id="gallery">
    <div id="galleryGrid">
      <img class="gallery-item" id="img-lab" src="placeholder.gif" data-src="lab.jpg" alt="Computer lab">
      <img class="gallery-item" id="img-hall" src="placeholder.gif" data-src="hall.jpg" alt="Main hall">
      <img class="gallery-item" id="img-ready" src="ready.jpg" alt="">
    </div>
  </section>
  <div id="lightbox" class="lightbox hidden" aria-hidden="true">
    <button id="lightboxClose">Close</button>
    <img id="lightboxImg" src="" alt="">
    <p id="lightboxCaption"></p>
  </div>
  <section id="faq">
    <button class="accordion-btn" id="faq-a">Who can apply?</button>
    <div class="accordion-panel" id="panel-a"><p>Anyone.</p></div>
    <button class="accordion-btn" id="faq-b">Is it free?</button>
    <div class="accordion-panel" id="panel-b"><p>Yes.</p></div>
  </section>
  <form id="admissionForm">
    <input name="name" id="f-name">
    <input name="email" id="f-email">
    <input name="phone" id="f-phone">
    <select name="course" id="f-course">
      <option value="">Select a course</option>
      <option value="web">Web Development</option>
    </select>
    <button type="submit" id="f-submit">Apply</button>
    <button type="button" id="clearForm">Clear</button>
  </form>
  <p id="formStatus"></p>
  <footer>&copy; <span id="year">2000</span></footer>
</body>
</html>"##;

pub const TEST_YEAR: i32 = 2026;

pub fn browser_env() -> Environment {
    Environment {
        intersection_observer: true,
        year: TEST_YEAR,
    }
}

pub fn legacy_env() -> Environment {
    Environment {
        intersection_observer: false,
        ..browser_env()
    }
}

/// Parse [`FIXTURE_PAGE`] and initialize a controller with stock config.
pub fn fixture_page() -> (Document, PageController) {
    page_with(FIXTURE_PAGE, BehaviorConfig::default(), &browser_env())
}

pub fn page_with(html: &str, config: BehaviorConfig, env: &Environment) -> (Document, PageController) {
    let mut doc = parse_document(html).unwrap();
    let ctl = PageController::init(&mut doc, config, env);
    (doc, ctl)
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

pub fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(id)
        .unwrap_or_else(|| panic!("no element with id '{id}' in fixture"))
}

pub fn by_class(doc: &Document, class: &str) -> NodeId {
    doc.query(&Selector::class(class))
        .unwrap_or_else(|| panic!("no element with class '{class}' in fixture"))
}

pub fn has_class(doc: &Document, node: NodeId, class: &str) -> bool {
    doc.has_class(node, class)
}

// =========================================================================
// Event shortcuts
// =========================================================================

pub fn click(ctl: &mut PageController, doc: &mut Document, target: NodeId) -> DispatchOutcome {
    ctl.dispatch(doc, &Event::click(target))
}

pub fn press(ctl: &mut PageController, doc: &mut Document, key: &str) -> DispatchOutcome {
    let target = doc.focused().unwrap_or(doc.root());
    ctl.dispatch(doc, &Event::key_down(target, key))
}

/// Fill the admission form controls by id.
pub fn fill(doc: &mut Document, values: &[(&str, &str)]) {
    for (id, value) in values {
        let node = by_id(doc, id);
        doc.set_value(node, value);
    }
}
