//! Visibility observation for lazy-loaded images.
//!
//! Browsers hand the page an `IntersectionObserver`; headless hosts have no
//! layout engine, so this module models the observer itself: the set of
//! observed nodes, the root margin, and an intersection test over element
//! boxes and a viewport. A browser host can ignore the geometry and feed
//! native entries straight to [`crate::controller::PageController::on_intersections`].

use crate::dom::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid root margin `{0}`: expected 1-4 pixel lengths like `120px 0px`")]
pub struct RootMarginError(String);

/// CSS-style margin around the viewport, in pixels.
///
/// Accepts the `margin` shorthand: one to four lengths, each `Npx` or `0`.
/// `"120px 0px"` grows the viewport by 120px above and below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self {
            top: 120.0,
            right: 0.0,
            bottom: 120.0,
            left: 0.0,
        }
    }
}

impl FromStr for RootMargin {
    type Err = RootMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RootMarginError(s.to_string());
        let values = s
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                if number != part || number == "0" {
                    number
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(err)
                } else {
                    Err(err())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => return Err(err()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Axis-aligned box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn expand(&self, margin: &RootMargin) -> Self {
        Self {
            x: self.x - margin.left,
            y: self.y - margin.top,
            width: self.width + margin.left + margin.right,
            height: self.height + margin.top + margin.bottom,
        }
    }

    /// Overlap test; touching edges count, as they do for zero-height images.
    fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

#[derive(Debug, Clone, Default)]
pub struct IntersectionObserver {
    margin: RootMargin,
    observed: BTreeSet<NodeId>,
}

impl IntersectionObserver {
    pub fn new(margin: RootMargin) -> Self {
        Self {
            margin,
            observed: BTreeSet::new(),
        }
    }

    pub fn margin(&self) -> RootMargin {
        self.margin
    }

    pub fn observe(&mut self, target: NodeId) {
        self.observed.insert(target);
    }

    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.observed.contains(&target)
    }

    pub fn observed(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.observed.iter().copied()
    }

    /// Entries for every observed node that has a box, against `viewport`
    /// grown by the root margin. Unobserved nodes are ignored.
    pub fn compute_entries(&self, boxes: &[(NodeId, Rect)], viewport: Rect) -> Vec<IntersectionEntry> {
        let root = viewport.expand(&self.margin);
        boxes
            .iter()
            .filter(|(target, _)| self.is_observing(*target))
            .map(|(target, rect)| IntersectionEntry {
                target: *target,
                is_intersecting: root.intersects(rect),
            })
            .collect()
    }
}
