//! Interaction scripts: replay a host session against a page.
//!
//! A script is a TOML file with an optional `[environment]` table and a list
//! of `[[steps]]`. Each step names an `action` and addresses elements by
//! selector:
//!
//! ```toml
//! [environment]
//! intersection_observer = true
//! year = 2026
//!
//! [[steps]]
//! action = "click"
//! selector = "#hamburger"
//!
//! [[steps]]
//! action = "fill"
//! selector = "input[name=email]"
//! value = "applicant@example.org"
//!
//! [[steps]]
//! action = "intersect"
//! selector = ".gallery-item"
//!
//! [[steps]]
//! action = "viewport"
//! y = 0
//! width = 1280
//! height = 800
//! boxes = [{ selector = "#img-lab", y = 900, height = 300 }]
//!
//! [[steps]]
//! action = "key"
//! key = "Escape"
//! ```
//!
//! | Action | Fields | Effect |
//! |--------|--------|--------|
//! | `click` | `selector` | click event on the first match |
//! | `key` | `key`, optional `selector` | keydown on the match, else the focused element, else the document |
//! | `fill` | `selector`, `value` | set the control's live value (no event) |
//! | `submit` | `selector` | submit event on the matching form |
//! | `intersect` | `selector`, `visible` (default true) | observer entries for every match |
//! | `image-error` | `selector` | load error on the first match |
//! | `viewport` | `x`, `y`, `width`, `height`, `boxes` | observer entries computed from geometry |

use crate::config::BehaviorConfig;
use crate::controller::{Environment, PageController, SetupReport, UiSnapshot};
use crate::dom::{Document, DomError, NodeId, Selector};
use crate::events::{DefaultAction, DispatchOutcome, Event, Handler};
use crate::markup::{MarkupError, parse_document};
use crate::observer::{IntersectionEntry, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("script parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("page parse error: {0}")]
    Markup(#[from] MarkupError),
    #[error(transparent)]
    Selector(#[from] DomError),
    #[error("step {step}: nothing matches `{selector}`")]
    NoMatch { step: usize, selector: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptEnvironment {
    pub intersection_observer: bool,
    /// Year written into the page; the local clock when absent.
    pub year: Option<i32>,
}

impl Default for ScriptEnvironment {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            year: None,
        }
    }
}

impl ScriptEnvironment {
    pub fn resolve(&self) -> Environment {
        Environment {
            intersection_observer: self.intersection_observer,
            year: self.year.unwrap_or_else(|| Environment::detect().year),
        }
    }
}

fn default_true() -> bool {
    true
}

/// An element box for a `viewport` step. Unset coordinates are zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxSpec {
    pub selector: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Click {
        selector: String,
    },
    Key {
        key: String,
        #[serde(default)]
        selector: Option<String>,
    },
    Fill {
        selector: String,
        value: String,
    },
    Submit {
        selector: String,
    },
    Intersect {
        selector: String,
        #[serde(default = "default_true")]
        visible: bool,
    },
    ImageError {
        selector: String,
    },
    Viewport {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        width: f64,
        height: f64,
        #[serde(default)]
        boxes: Vec<BoxSpec>,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click { selector } => write!(f, "click {selector}"),
            Self::Key { key, selector: None } => write!(f, "key {key}"),
            Self::Key {
                key,
                selector: Some(selector),
            } => write!(f, "key {key} on {selector}"),
            Self::Fill { selector, value } => write!(f, "fill {selector} = {value:?}"),
            Self::Submit { selector } => write!(f, "submit {selector}"),
            Self::Intersect {
                selector,
                visible: true,
            } => write!(f, "intersect {selector}"),
            Self::Intersect {
                selector,
                visible: false,
            } => write!(f, "leave {selector}"),
            Self::ImageError { selector } => write!(f, "image-error {selector}"),
            Self::Viewport { y, height, .. } => write!(f, "viewport y={y} h={height}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    pub environment: ScriptEnvironment,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub description: String,
    pub handled: Vec<Handler>,
    pub default_prevented: bool,
    pub default_action: Option<DefaultAction>,
}

/// Result of replaying a script.
#[derive(Debug)]
pub struct ScriptRun {
    pub report: SetupReport,
    pub steps: Vec<StepRecord>,
    pub snapshot: UiSnapshot,
    pub document: Document,
}

/// Parse `page`, initialize a controller and replay every step in order.
pub fn run_script(page: &str, script: &Script, config: BehaviorConfig) -> Result<ScriptRun, ScriptError> {
    let mut doc = parse_document(page)?;
    let env = script.environment.resolve();
    let mut ctl = PageController::init(&mut doc, config, &env);

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        log::debug!("step {index}: {step}");
        let outcome = apply(&mut ctl, &mut doc, index, step)?;
        steps.push(StepRecord {
            index,
            description: step.to_string(),
            handled: outcome.handled,
            default_prevented: outcome.default_prevented,
            default_action: outcome.default_action,
        });
    }

    Ok(ScriptRun {
        report: ctl.report().clone(),
        steps,
        snapshot: ctl.snapshot(&doc),
        document: doc,
    })
}

fn apply(
    ctl: &mut PageController,
    doc: &mut Document,
    index: usize,
    step: &Step,
) -> Result<DispatchOutcome, ScriptError> {
    let outcome = match step {
        Step::Click { selector } => {
            let target = first_match(doc, index, selector)?;
            ctl.dispatch(doc, &Event::click(target))
        }
        Step::Key { key, selector } => {
            let target = match selector {
                Some(selector) => first_match(doc, index, selector)?,
                None => doc.focused().unwrap_or(doc.root()),
            };
            ctl.dispatch(doc, &Event::key_down(target, key))
        }
        Step::Fill { selector, value } => {
            let target = first_match(doc, index, selector)?;
            doc.set_value(target, value);
            DispatchOutcome::default()
        }
        Step::Submit { selector } => {
            let target = first_match(doc, index, selector)?;
            ctl.dispatch(doc, &Event::submit(target))
        }
        Step::Intersect { selector, visible } => {
            let entries: Vec<IntersectionEntry> = all_matches(doc, index, selector)?
                .into_iter()
                .map(|target| IntersectionEntry {
                    target,
                    is_intersecting: *visible,
                })
                .collect();
            ctl.on_intersections(doc, &entries);
            DispatchOutcome::default()
        }
        Step::ImageError { selector } => {
            let target = first_match(doc, index, selector)?;
            ctl.dispatch(doc, &Event::error(target))
        }
        Step::Viewport {
            x,
            y,
            width,
            height,
            boxes,
        } => {
            let boxes = boxes
                .iter()
                .map(|b| {
                    let node = first_match(doc, index, &b.selector)?;
                    Ok((node, Rect::new(b.x, b.y, b.width, b.height)))
                })
                .collect::<Result<Vec<_>, ScriptError>>()?;
            ctl.observe_viewport(doc, &boxes, Rect::new(*x, *y, *width, *height));
            DispatchOutcome::default()
        }
    };
    Ok(outcome)
}

fn all_matches(doc: &Document, step: usize, selector: &str) -> Result<Vec<NodeId>, ScriptError> {
    let nodes = doc.query_all(&Selector::parse(selector)?);
    if nodes.is_empty() {
        return Err(ScriptError::NoMatch {
            step,
            selector: selector.to_string(),
        });
    }
    Ok(nodes)
}

fn first_match(doc: &Document, step: usize, selector: &str) -> Result<NodeId, ScriptError> {
    Ok(all_matches(doc, step, selector)?[0])
}
