use super::*;
use crate::observer::{Rect, RootMargin};
use crate::test_helpers::*;

// =========================================================================
// Setup
// =========================================================================

#[test]
fn fixture_binds_every_step() {
    let (_, ctl) = fixture_page();
    for step in [
        SetupStep::Navigation,
        SetupStep::Submenus,
        SetupStep::LazyImages,
        SetupStep::Lightbox,
        SetupStep::Accordion,
        SetupStep::AdmissionForm,
        SetupStep::Utilities,
        SetupStep::EscapeKey,
    ] {
        assert!(ctl.report().is_bound(step), "{step} not bound");
    }
}

#[test]
fn missing_elements_skip_only_their_step() {
    let html = FIXTURE_PAGE.replace("id=\"hamburger\"", "id=\"menu\"");
    let (doc, ctl) = page_with(&html, BehaviorConfig::default(), &browser_env());
    assert_eq!(
        ctl.report().outcome(SetupStep::Navigation),
        Some(&StepOutcome::Skipped {
            missing: "#hamburger".to_string()
        })
    );
    assert!(ctl.report().is_bound(SetupStep::Lightbox));
    assert!(ctl.report().is_bound(SetupStep::AdmissionForm));
    assert_eq!(ctl.nav_state(), None);
    assert_eq!(doc.text_content(by_id(&doc, "year")), "2026");
}

#[test]
fn empty_page_skips_everything_but_escape() {
    let (_, ctl) = page_with(
        "<p>Nothing here</p>",
        BehaviorConfig::default(),
        &browser_env(),
    );
    let bound: Vec<SetupStep> = ctl
        .report()
        .steps
        .iter()
        .filter(|s| matches!(s.outcome, StepOutcome::Bound { .. }))
        .map(|s| s.step)
        .collect();
    assert_eq!(bound, vec![SetupStep::EscapeKey]);
}

#[test]
fn year_written_once_at_init() {
    let (doc, _) = fixture_page();
    assert_eq!(doc.text_content(by_id(&doc, "year")), TEST_YEAR.to_string());
}

#[test]
fn custom_markup_names_are_honored() {
    let html = FIXTURE_PAGE
        .replace("class=\"nav-list\"", "class=\"menu-items\"")
        .replace("id=\"hamburger\"", "id=\"burger\"");
    let mut config = BehaviorConfig::default();
    config.markup.nav_list_class = "menu-items".to_string();
    config.markup.hamburger_id = "burger".to_string();
    config.markup.open_class = "is-open".to_string();

    let (mut doc, mut ctl) = page_with(&html, config, &browser_env());
    let burger = by_id(&doc, "burger");
    click(&mut ctl, &mut doc, burger);
    assert_eq!(ctl.config().markup.open_class, "is-open");
    assert!(has_class(&doc, by_class(&doc, "menu-items"), "is-open"));
}

// =========================================================================
// Navigation and submenus
// =========================================================================

#[test]
fn nav_flag_and_aria_always_agree() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    let list = by_class(&doc, "nav-list");
    for expected_open in [true, false, true, true, false] {
        if ctl.nav_state().map(Visibility::is_open) != Some(expected_open) {
            click(&mut ctl, &mut doc, hamburger);
        }
        let open = has_class(&doc, list, "show");
        assert_eq!(open, expected_open);
        assert_eq!(
            doc.attr(hamburger, "aria-expanded"),
            Some(if open { "true" } else { "false" })
        );
    }
}

#[test]
fn nav_link_click_closes_open_menu() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    click(&mut ctl, &mut doc, hamburger);
    let programs = by_id(&doc, "programs-btn");
    click(&mut ctl, &mut doc, programs);

    let about_link = by_id(&doc, "nav-about");
    let outcome = click(&mut ctl, &mut doc, about_link);
    assert!(outcome.handled.contains(&Handler::CloseNavOnLink));
    assert_eq!(ctl.nav_state(), Some(Visibility::Closed));
    assert!(!has_class(&doc, by_class(&doc, "nav-list"), "show"));
    assert_eq!(doc.attr(by_id(&doc, "hamburger"), "aria-expanded"), Some("false"));
}

#[test]
fn nav_closes_on_click_inside_link_content() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    click(&mut ctl, &mut doc, hamburger);
    let tour_label = by_id(&doc, "tour-label");
    click(&mut ctl, &mut doc, tour_label);
    assert_eq!(ctl.nav_state(), Some(Visibility::Closed));
}

#[test]
fn nav_stays_open_on_non_link_click() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    click(&mut ctl, &mut doc, hamburger);
    let programs = by_id(&doc, "programs-btn");
    click(&mut ctl, &mut doc, programs);
    assert_eq!(ctl.nav_state(), Some(Visibility::Open));
}

#[test]
fn submenus_toggle_independently() {
    let (mut doc, mut ctl) = fixture_page();
    let programs = by_id(&doc, "programs-btn");
    let campus = by_id(&doc, "campus-btn");

    click(&mut ctl, &mut doc, programs);
    click(&mut ctl, &mut doc, campus);
    assert_eq!(ctl.submenu_states(), vec![Visibility::Open, Visibility::Open]);
    assert!(has_class(&doc, by_id(&doc, "programs-list"), "show"));
    assert_eq!(doc.attr(campus, "aria-expanded"), Some("true"));

    click(&mut ctl, &mut doc, programs);
    assert_eq!(ctl.submenu_states(), vec![Visibility::Closed, Visibility::Open]);
    assert!(!has_class(&doc, by_id(&doc, "programs-list"), "show"));
    assert!(has_class(&doc, by_id(&doc, "campus-list"), "show"));
}

#[test]
fn buttons_in_one_group_share_its_state() {
    let html = FIXTURE_PAGE.replace(
        "aria-expanded=\"false\">Programs</button>",
        "aria-expanded=\"false\">Programs</button>\n          \
         <button class=\"sub-btn\" id=\"programs-more\">More</button>",
    );
    let (mut doc, mut ctl) = page_with(&html, BehaviorConfig::default(), &browser_env());
    let programs = by_id(&doc, "programs-btn");
    let more = by_id(&doc, "programs-more");
    let campus = by_id(&doc, "campus-btn");
    let list = by_id(&doc, "programs-list");

    let toggles: Vec<(NodeId, Handler)> = ctl
        .registry()
        .iter()
        .filter(|(_, _, h)| matches!(h, Handler::ToggleSubmenu(_)))
        .map(|(node, _, h)| (node, h))
        .collect();
    assert_eq!(
        toggles,
        vec![
            (programs, Handler::ToggleSubmenu(0)),
            (more, Handler::ToggleSubmenu(0)),
            (campus, Handler::ToggleSubmenu(1)),
        ]
    );

    click(&mut ctl, &mut doc, programs);
    assert!(has_class(&doc, list, "show"));
    assert_eq!(doc.attr(more, "aria-expanded"), Some("true"));

    click(&mut ctl, &mut doc, more);
    assert!(!has_class(&doc, list, "show"));
    assert_eq!(ctl.submenu_states(), vec![Visibility::Closed, Visibility::Closed]);
    assert_eq!(doc.attr(programs, "aria-expanded"), Some("false"));
}

// =========================================================================
// Lazy images
// =========================================================================

#[test]
fn observer_registers_every_gallery_image() {
    let (doc, ctl) = fixture_page();
    let observer = ctl.observer().unwrap();
    assert_eq!(observer.observed().count(), 3);
    assert_eq!(observer.margin(), RootMargin::default());
    assert_eq!(doc.attr(by_id(&doc, "img-lab"), "data-src"), Some("lab.jpg"));
}

#[test]
fn intersection_promotes_and_unobserves() {
    let (mut doc, mut ctl) = fixture_page();
    let lab = by_id(&doc, "img-lab");
    let hall = by_id(&doc, "img-hall");
    ctl.on_intersections(
        &mut doc,
        &[
            IntersectionEntry {
                target: lab,
                is_intersecting: true,
            },
            IntersectionEntry {
                target: hall,
                is_intersecting: false,
            },
        ],
    );

    assert_eq!(doc.attr(lab, "src"), Some("lab.jpg"));
    assert!(!doc.has_attr(lab, "data-src"));
    assert_eq!(doc.attr(hall, "src"), Some("placeholder.gif"));

    let observer = ctl.observer().unwrap();
    assert!(!observer.is_observing(lab));
    assert!(observer.is_observing(hall));
}

#[test]
fn every_image_ends_on_its_pending_source() {
    let (mut doc, mut ctl) = fixture_page();
    let images: Vec<NodeId> = ["img-lab", "img-hall", "img-ready"]
        .iter()
        .map(|id| by_id(&doc, id))
        .collect();
    let entries: Vec<IntersectionEntry> = images
        .iter()
        .map(|&target| IntersectionEntry {
            target,
            is_intersecting: true,
        })
        .collect();
    ctl.on_intersections(&mut doc, &entries);

    let srcs: Vec<&str> = images.iter().map(|&i| doc.attr(i, "src").unwrap()).collect();
    assert_eq!(srcs, vec!["lab.jpg", "hall.jpg", "ready.jpg"]);
    assert!(images.iter().all(|&i| !doc.has_attr(i, "data-src")));
    assert!(
        ctl.image_states()
            .iter()
            .all(|(_, state)| *state == ImageLoad::Loaded)
    );
}

#[test]
fn legacy_host_promotes_synchronously() {
    let (doc, ctl) = page_with(FIXTURE_PAGE, BehaviorConfig::default(), &legacy_env());
    assert!(ctl.observer().is_none());
    assert_eq!(doc.attr(by_id(&doc, "img-hall"), "src"), Some("hall.jpg"));
    assert!(!doc.has_attr(by_id(&doc, "img-hall"), "data-src"));
}

#[test]
fn viewport_geometry_drives_promotion() {
    let (mut doc, mut ctl) = fixture_page();
    let lab = by_id(&doc, "img-lab");
    let hall = by_id(&doc, "img-hall");
    let boxes = [
        (lab, Rect::new(0.0, 850.0, 400.0, 300.0)),
        (hall, Rect::new(0.0, 1400.0, 400.0, 300.0)),
    ];
    ctl.observe_viewport(&mut doc, &boxes, Rect::new(0.0, 0.0, 1280.0, 800.0));
    assert_eq!(doc.attr(lab, "src"), Some("lab.jpg"));
    assert_eq!(doc.attr(hall, "src"), Some("placeholder.gif"));

    ctl.observe_viewport(&mut doc, &boxes, Rect::new(0.0, 700.0, 1280.0, 800.0));
    assert_eq!(doc.attr(hall, "src"), Some("hall.jpg"));
}

#[test]
fn load_error_after_promotion_dims_image() {
    let (mut doc, mut ctl) = fixture_page();
    let lab = by_id(&doc, "img-lab");
    ctl.on_intersections(
        &mut doc,
        &[IntersectionEntry {
            target: lab,
            is_intersecting: true,
        }],
    );
    let outcome = ctl.dispatch(&mut doc, &Event::error(lab));
    assert_eq!(outcome.handled, vec![Handler::DimFailedImage(0)]);
    assert_eq!(doc.style(lab, "opacity").as_deref(), Some("0.5"));
    assert_eq!(ctl.image_states()[0], (lab, ImageLoad::Failed));
}

#[test]
fn load_error_without_promotion_is_ignored_by_default() {
    let (mut doc, mut ctl) = fixture_page();
    let ready = by_id(&doc, "img-ready");
    ctl.on_intersections(
        &mut doc,
        &[IntersectionEntry {
            target: ready,
            is_intersecting: true,
        }],
    );
    let outcome = ctl.dispatch(&mut doc, &Event::error(ready));
    assert!(outcome.handled.is_empty());
    assert_eq!(doc.style(ready, "opacity"), None);
}

#[test]
fn load_error_without_promotion_dims_when_configured() {
    let mut config = BehaviorConfig::default();
    config.lazy_load.dim_unpromoted_failures = true;
    config.lazy_load.failed_opacity = 0.3;
    let (mut doc, mut ctl) = page_with(FIXTURE_PAGE, config, &browser_env());
    let ready = by_id(&doc, "img-ready");
    ctl.dispatch(&mut doc, &Event::error(ready));
    assert_eq!(doc.style(ready, "opacity").as_deref(), Some("0.3"));
}

#[test]
fn failed_image_stays_failed_after_promotion() {
    let mut config = BehaviorConfig::default();
    config.lazy_load.dim_unpromoted_failures = true;
    let (mut doc, mut ctl) = page_with(FIXTURE_PAGE, config, &browser_env());
    let lab = by_id(&doc, "img-lab");
    ctl.dispatch(&mut doc, &Event::error(lab));
    assert_eq!(ctl.image_states()[0], (lab, ImageLoad::Failed));

    ctl.on_intersections(
        &mut doc,
        &[IntersectionEntry {
            target: lab,
            is_intersecting: true,
        }],
    );
    assert_eq!(doc.attr(lab, "src"), Some("lab.jpg"));
    assert_eq!(ctl.image_states()[0], (lab, ImageLoad::Failed));
    assert_eq!(doc.style(lab, "opacity").as_deref(), Some("0.5"));
    assert_eq!(ctl.registry().handlers_for(lab, EventKind::Error).len(), 1);
}

// =========================================================================
// Lightbox
// =========================================================================

#[test]
fn gallery_click_opens_lightbox_with_pending_source() {
    let (mut doc, mut ctl) = fixture_page();
    let hall = by_id(&doc, "img-hall");
    click(&mut ctl, &mut doc, hall);

    let overlay = by_id(&doc, "lightbox");
    assert!(!has_class(&doc, overlay, "hidden"));
    assert_eq!(doc.attr(overlay, "aria-hidden"), Some("false"));
    // src is a placeholder, so the resolved src wins over data-src
    assert_eq!(doc.attr(by_id(&doc, "lightboxImg"), "src"), Some("placeholder.gif"));
    assert_eq!(doc.text_content(by_id(&doc, "lightboxCaption")), "Main hall");
}

#[test]
fn lightbox_falls_back_to_pending_source_when_src_empty() {
    let html = FIXTURE_PAGE.replace(
        "src=\"placeholder.gif\" data-src=\"lab.jpg\"",
        "data-src=\"lab.jpg\"",
    );
    let (mut doc, mut ctl) = page_with(&html, BehaviorConfig::default(), &browser_env());
    let lab = by_id(&doc, "img-lab");
    click(&mut ctl, &mut doc, lab);
    assert_eq!(
        ctl.lightbox_state(),
        Some(&LightboxState::Showing {
            src: "lab.jpg".to_string(),
            caption: "Computer lab".to_string()
        })
    );
}

#[test]
fn lightbox_closes_on_button_and_backdrop_only() {
    let (mut doc, mut ctl) = fixture_page();
    let overlay = by_id(&doc, "lightbox");
    let shown = by_id(&doc, "lightboxImg");

    let lab = by_id(&doc, "img-lab");
    click(&mut ctl, &mut doc, lab);
    click(&mut ctl, &mut doc, shown);
    assert!(ctl.lightbox_state().unwrap().is_open());

    click(&mut ctl, &mut doc, overlay);
    assert_eq!(ctl.lightbox_state(), Some(&LightboxState::Hidden));
    assert!(has_class(&doc, overlay, "hidden"));
    assert_eq!(doc.attr(shown, "src"), Some(""));
    assert_eq!(doc.text_content(by_id(&doc, "lightboxCaption")), "");

    click(&mut ctl, &mut doc, lab);
    let close = by_id(&doc, "lightboxClose");
    click(&mut ctl, &mut doc, close);
    assert_eq!(ctl.lightbox_state(), Some(&LightboxState::Hidden));
}

#[test]
fn click_on_grid_gap_does_not_open() {
    let (mut doc, mut ctl) = fixture_page();
    let grid = by_id(&doc, "galleryGrid");
    click(&mut ctl, &mut doc, grid);
    assert_eq!(ctl.lightbox_state(), Some(&LightboxState::Hidden));
}

// =========================================================================
// Accordion
// =========================================================================

#[test]
fn accordion_keeps_single_panel_open() {
    let (mut doc, mut ctl) = fixture_page();
    let (a, b) = (by_id(&doc, "panel-a"), by_id(&doc, "panel-b"));

    let faq_a = by_id(&doc, "faq-a");
    click(&mut ctl, &mut doc, faq_a);
    assert_eq!(ctl.open_panel(), Some(a));

    let faq_b = by_id(&doc, "faq-b");
    click(&mut ctl, &mut doc, faq_b);
    assert_eq!(ctl.open_panel(), Some(b));
    assert_eq!(doc.style(a, "display").as_deref(), Some("none"));
    assert_eq!(doc.style(b, "display").as_deref(), Some("block"));

    click(&mut ctl, &mut doc, faq_b);
    assert_eq!(ctl.open_panel(), None);
    assert_eq!(doc.style(b, "display").as_deref(), Some("none"));
}

#[test]
fn accordion_reads_initially_open_panel_from_markup() {
    let html = FIXTURE_PAGE.replace(
        "id=\"panel-b\"",
        "id=\"panel-b\" style=\"display: block\"",
    );
    let (mut doc, mut ctl) = page_with(&html, BehaviorConfig::default(), &browser_env());
    assert_eq!(ctl.open_panel(), Some(by_id(&doc, "panel-b")));
    let faq_b = by_id(&doc, "faq-b");
    click(&mut ctl, &mut doc, faq_b);
    assert_eq!(ctl.open_panel(), None);
}

#[test]
fn accordion_closes_clicked_panel_when_markup_opens_several() {
    let html = FIXTURE_PAGE
        .replace("id=\"panel-a\"", "id=\"panel-a\" style=\"display: block\"")
        .replace("id=\"panel-b\"", "id=\"panel-b\" style=\"display: block\"");
    let (mut doc, mut ctl) = page_with(&html, BehaviorConfig::default(), &browser_env());
    let (a, b) = (by_id(&doc, "panel-a"), by_id(&doc, "panel-b"));
    assert_eq!(ctl.open_panel(), Some(a));

    let faq_b = by_id(&doc, "faq-b");
    click(&mut ctl, &mut doc, faq_b);
    assert_eq!(doc.style(a, "display").as_deref(), Some("none"));
    assert_eq!(doc.style(b, "display").as_deref(), Some("none"));
    assert_eq!(ctl.open_panel(), None);

    click(&mut ctl, &mut doc, faq_b);
    assert_eq!(ctl.open_panel(), Some(b));
    assert_eq!(doc.style(b, "display").as_deref(), Some("block"));
}

// =========================================================================
// Admission form
// =========================================================================

#[test]
fn empty_name_reports_error_and_focuses() {
    let (mut doc, mut ctl) = fixture_page();
    fill(&mut doc, &[("f-email", "a@b.co"), ("f-phone", "0300")]);
    let form = by_id(&doc, "admissionForm");
    let outcome = ctl.dispatch(&mut doc, &Event::submit(form));

    assert!(outcome.default_prevented);
    let status = by_id(&doc, "formStatus");
    assert_eq!(doc.text_content(status), "Please enter full name.");
    assert_eq!(doc.style(status, "color").as_deref(), Some("#7f1d1d"));
    assert_eq!(doc.focused(), Some(by_id(&doc, "f-name")));
    // not reset
    assert_eq!(doc.value(by_id(&doc, "f-email")), "a@b.co");
    assert_eq!(ctl.form_status(), Some(&FormStatus::Invalid(Field::Name)));
}

#[test]
fn email_without_domain_dot_is_rejected() {
    let (mut doc, mut ctl) = fixture_page();
    fill(&mut doc, &[("f-name", "Sara"), ("f-email", "a@b")]);
    let form = by_id(&doc, "admissionForm");
    ctl.dispatch(&mut doc, &Event::submit(form));
    assert_eq!(
        doc.text_content(by_id(&doc, "formStatus")),
        "Please enter a valid email."
    );
    assert_eq!(doc.focused(), Some(by_id(&doc, "f-email")));
}

#[test]
fn missing_course_is_last_check() {
    let (mut doc, mut ctl) = fixture_page();
    fill(
        &mut doc,
        &[("f-name", "Sara"), ("f-email", "sara@uni.edu"), ("f-phone", "0300")],
    );
    let form = by_id(&doc, "admissionForm");
    ctl.dispatch(&mut doc, &Event::submit(form));
    assert_eq!(ctl.form_status(), Some(&FormStatus::Invalid(Field::Course)));
    assert_eq!(doc.focused(), Some(by_id(&doc, "f-course")));
}

#[test]
fn valid_form_shows_success_and_resets() {
    let (mut doc, mut ctl) = fixture_page();
    fill(
        &mut doc,
        &[
            ("f-name", "Sara Ahmed"),
            ("f-email", "sara@uni.edu"),
            ("f-phone", "0300 1234567"),
            ("f-course", "web"),
        ],
    );
    let form = by_id(&doc, "admissionForm");
    ctl.dispatch(&mut doc, &Event::submit(form));

    let status = by_id(&doc, "formStatus");
    assert_eq!(
        doc.text_content(status),
        "Application sent — thank you! We will email you within 48–72 hours."
    );
    assert_eq!(doc.style(status, "color").as_deref(), Some("#064e3b"));
    for id in ["f-name", "f-email", "f-phone", "f-course"] {
        assert_eq!(doc.value(by_id(&doc, id)), "", "{id} not reset");
    }
    assert_eq!(ctl.last_submission().unwrap().name, "Sara Ahmed");
}

#[test]
fn submit_button_click_submits_form() {
    let (mut doc, mut ctl) = fixture_page();
    let submit = by_id(&doc, "f-submit");
    let outcome = click(&mut ctl, &mut doc, submit);
    let form = by_id(&doc, "admissionForm");
    assert_eq!(outcome.default_action, Some(DefaultAction::SubmitForm(form)));
    assert!(outcome.handled.contains(&Handler::SubmitAdmission));
    assert_eq!(ctl.form_status(), Some(&FormStatus::Invalid(Field::Name)));
}

#[test]
fn clear_resets_form_and_status() {
    let (mut doc, mut ctl) = fixture_page();
    fill(&mut doc, &[("f-email", "a@b")]);
    let form = by_id(&doc, "admissionForm");
    ctl.dispatch(&mut doc, &Event::submit(form));
    assert!(!doc.text_content(by_id(&doc, "formStatus")).is_empty());

    let clear = by_id(&doc, "clearForm");
    let outcome = click(&mut ctl, &mut doc, clear);
    assert_eq!(outcome.default_action, None);
    assert_eq!(doc.text_content(by_id(&doc, "formStatus")), "");
    assert_eq!(doc.value(by_id(&doc, "f-email")), "");
    assert_eq!(ctl.form_status(), Some(&FormStatus::Idle));
}

// =========================================================================
// Anchors
// =========================================================================

#[test]
fn anchor_scrolls_smoothly_to_target() {
    let (mut doc, mut ctl) = fixture_page();
    let about_link = by_id(&doc, "nav-about");
    assert_eq!(ctl.anchor_count(), 2);
    let outcome = click(&mut ctl, &mut doc, about_link);
    assert!(outcome.default_prevented);
    assert_eq!(outcome.default_action, None);
    assert_eq!(
        doc.last_scroll(),
        Some(ScrollRequest {
            target: by_id(&doc, "about"),
            behavior: ScrollBehavior::Smooth
        })
    );
}

#[test]
fn anchor_to_missing_target_is_swallowed() {
    let (mut doc, mut ctl) = fixture_page();
    let missing_link = by_id(&doc, "nav-missing");
    let outcome = click(&mut ctl, &mut doc, missing_link);
    assert!(outcome.default_prevented);
    assert_eq!(doc.last_scroll(), None);
    assert_eq!(doc.fragment(), None);
}

#[test]
fn anchor_to_missing_target_can_fall_back() {
    let mut config = BehaviorConfig::default();
    config.anchors.fallback_to_default = true;
    let (mut doc, mut ctl) = page_with(FIXTURE_PAGE, config, &browser_env());
    let missing_link = by_id(&doc, "nav-missing");
    let outcome = click(&mut ctl, &mut doc, missing_link);
    assert!(!outcome.default_prevented);
    assert_eq!(
        outcome.default_action,
        Some(DefaultAction::Jump("missing".to_string()))
    );
    assert_eq!(doc.fragment(), Some("missing"));
}

// =========================================================================
// Escape
// =========================================================================

#[test]
fn escape_closes_lightbox_submenu_and_nav() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    click(&mut ctl, &mut doc, hamburger);
    let campus = by_id(&doc, "campus-btn");
    click(&mut ctl, &mut doc, campus);
    let lab = by_id(&doc, "img-lab");
    click(&mut ctl, &mut doc, lab);

    press(&mut ctl, &mut doc, "Escape");
    assert_eq!(ctl.nav_state(), Some(Visibility::Closed));
    assert_eq!(ctl.submenu_states(), vec![Visibility::Closed, Visibility::Closed]);
    assert!(!has_class(&doc, by_id(&doc, "campus-list"), "show"));
    assert_eq!(doc.attr(by_id(&doc, "campus-btn"), "aria-expanded"), Some("false"));
    assert!(has_class(&doc, by_id(&doc, "lightbox"), "hidden"));
    assert_eq!(doc.attr(by_id(&doc, "lightbox"), "aria-hidden"), Some("true"));
}

#[test]
fn escape_with_everything_closed_is_a_no_op() {
    let (mut doc, mut ctl) = fixture_page();
    let before = crate::markup::serialize(&doc);
    for _ in 0..2 {
        press(&mut ctl, &mut doc, "Escape");
        assert_eq!(crate::markup::serialize(&doc), before);
    }
    assert_eq!(ctl.lightbox_state(), Some(&LightboxState::Hidden));
}

#[test]
fn other_keys_are_ignored() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    click(&mut ctl, &mut doc, hamburger);
    let outcome = press(&mut ctl, &mut doc, "Enter");
    assert_eq!(outcome.handled, vec![Handler::DismissOnEscape]);
    assert_eq!(ctl.nav_state(), Some(Visibility::Open));
}

#[test]
fn escape_bubbles_from_focused_field() {
    let (mut doc, mut ctl) = fixture_page();
    let hamburger = by_id(&doc, "hamburger");
    click(&mut ctl, &mut doc, hamburger);
    doc.focus(by_id(&doc, "f-name"));
    press(&mut ctl, &mut doc, "Escape");
    assert_eq!(ctl.nav_state(), Some(Visibility::Closed));
}

// =========================================================================
// Snapshot
// =========================================================================

#[test]
fn snapshot_reflects_state() {
    let (mut doc, mut ctl) = fixture_page();
    let faq_a = by_id(&doc, "faq-a");
    click(&mut ctl, &mut doc, faq_a);
    let snapshot = ctl.snapshot(&doc);
    assert_eq!(snapshot.nav, Some(Visibility::Closed));
    assert_eq!(snapshot.open_panel, Some(by_id(&doc, "panel-a")));
    assert_eq!(snapshot.images.len(), 3);
    assert_eq!(snapshot.images[0].pending.as_deref(), Some("lab.jpg"));
    assert_eq!(snapshot.status_text.as_deref(), Some(""));
}
