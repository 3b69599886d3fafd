//! CLI output formatting for setup reports, script replays and UI state.
//!
//! # Information-First Display
//!
//! Every entity leads with its semantic identity: a positional index and the
//! component or step name. Details (what was missing, which handlers ran,
//! node ids) follow as indented context lines, so the output reads as an
//! inventory of the page's behavior first and a debugging aid second.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! 001 Navigation: 2 bindings
//! 002 Submenus: 2 bindings
//! 003 Lazy images: skipped
//!     Missing: .gallery-item
//! ...
//! Wired 7 of 8 steps
//! ```
//!
//! ## Simulate
//!
//! ```text
//! 001 click #hamburger
//!     Handlers: toggle-nav
//! 002 click button[type=submit]
//!     Handlers: submit-admission
//!     Default: submit form #57
//! ```
//!
//! followed by the final state:
//!
//! ```text
//! Navigation: open
//! Submenus: closed, open
//! Images
//!     001 #23 loaded: lab.jpg
//!     002 #25 pending: placeholder.gif (then hall.jpg)
//! Lightbox: hidden
//! Accordion: all closed
//! Form: invalid (email)
//!     Status: Please enter a valid email.
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::controller::{
    FormStatus, ImageLoad, LightboxState, SetupReport, StepOutcome, UiSnapshot, Visibility,
};
use crate::dom::ScrollBehavior;
use crate::events::DefaultAction;
use crate::script::StepRecord;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn visibility(v: Visibility) -> &'static str {
    match v {
        Visibility::Open => "open",
        Visibility::Closed => "closed",
    }
}

fn image_state(state: ImageLoad) -> &'static str {
    match state {
        ImageLoad::Pending => "pending",
        ImageLoad::Loaded => "loaded",
        ImageLoad::Failed => "failed",
    }
}

// ============================================================================
// Check: setup report
// ============================================================================

/// Format the setup report: one line per step, skipped steps with what was missing.
pub fn format_setup_report(report: &SetupReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut bound = 0;

    for (i, step) in report.steps.iter().enumerate() {
        let header = format!("{} {}", format_index(i + 1), step.step);
        match &step.outcome {
            StepOutcome::Bound { bindings } => {
                bound += 1;
                lines.push(format!("{}: {}", header, plural(*bindings, "binding")));
            }
            StepOutcome::Skipped { missing } => {
                lines.push(format!("{}: skipped", header));
                lines.push(format!("{}Missing: {}", indent(1), missing));
            }
        }
    }

    lines.push(format!("Wired {} of {} steps", bound, report.steps.len()));
    lines
}

pub fn print_setup_report(report: &SetupReport) {
    for line in format_setup_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Simulate: step log
// ============================================================================

/// Format the replayed steps with the handlers each one triggered.
pub fn format_step_log(steps: &[StepRecord]) -> Vec<String> {
    let mut lines = Vec::new();

    for step in steps {
        lines.push(format!("{} {}", format_index(step.index + 1), step.description));
        if !step.handled.is_empty() {
            let names: Vec<String> = step.handled.iter().map(ToString::to_string).collect();
            lines.push(format!("{}Handlers: {}", indent(1), names.join(", ")));
        }
        if step.default_prevented {
            lines.push(format!("{}Default prevented", indent(1)));
        }
        match &step.default_action {
            Some(DefaultAction::SubmitForm(form)) => {
                lines.push(format!("{}Default: submit form {}", indent(1), form));
            }
            Some(DefaultAction::Jump(fragment)) => {
                lines.push(format!("{}Default: jump to #{}", indent(1), fragment));
            }
            None => {}
        }
    }

    lines
}

pub fn print_step_log(steps: &[StepRecord]) {
    for line in format_step_log(steps) {
        println!("{}", line);
    }
}

// ============================================================================
// Simulate: final state
// ============================================================================

/// Format the state of every wired component. Components the page lacks are omitted.
pub fn format_snapshot(snapshot: &UiSnapshot) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(nav) = snapshot.nav {
        lines.push(format!("Navigation: {}", visibility(nav)));
    }
    if !snapshot.submenus.is_empty() {
        let states: Vec<&str> = snapshot.submenus.iter().copied().map(visibility).collect();
        lines.push(format!("Submenus: {}", states.join(", ")));
    }

    if !snapshot.images.is_empty() {
        lines.push("Images".to_string());
        for (i, image) in snapshot.images.iter().enumerate() {
            let mut line = format!(
                "{}{} {} {}: {}",
                indent(1),
                format_index(i + 1),
                image.node,
                image_state(image.state),
                image.src
            );
            if let Some(pending) = &image.pending {
                line.push_str(&format!(" (then {})", pending));
            }
            lines.push(line);
        }
    }

    match &snapshot.lightbox {
        Some(LightboxState::Hidden) => lines.push("Lightbox: hidden".to_string()),
        Some(LightboxState::Showing { src, caption }) if caption.is_empty() => {
            lines.push(format!("Lightbox: showing {}", src));
        }
        Some(LightboxState::Showing { src, caption }) => {
            lines.push(format!("Lightbox: showing {} \"{}\"", src, caption));
        }
        None => {}
    }

    lines.push(match snapshot.open_panel {
        Some(panel) => format!("Accordion: {} open", panel),
        None => "Accordion: all closed".to_string(),
    });

    if let Some(form) = &snapshot.form {
        lines.push(match form {
            FormStatus::Idle => "Form: idle".to_string(),
            FormStatus::Invalid(field) => {
                let name = format!("{:?}", field).to_lowercase();
                format!("Form: invalid ({})", name)
            }
            FormStatus::Sent => "Form: sent".to_string(),
        });
        if let Some(text) = snapshot.status_text.as_deref().filter(|t| !t.is_empty()) {
            lines.push(format!("{}Status: {}", indent(1), truncate(text, 60)));
        }
    }

    if let Some(focused) = snapshot.focused {
        lines.push(format!("Focus: {}", focused));
    }
    if let Some(scroll) = snapshot.scroll {
        let behavior = match scroll.behavior {
            ScrollBehavior::Smooth => "smooth",
            ScrollBehavior::Instant => "instant",
        };
        lines.push(format!("Scroll: {} ({})", scroll.target, behavior));
    }

    lines
}

pub fn print_snapshot(snapshot: &UiSnapshot) {
    for line in format_snapshot(snapshot) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
