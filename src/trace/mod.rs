//! Core types for trajectory synthesis
//!
//! Defines the fundamental data structures flowing through the pipeline:
//! screen points, click targets, time-stamped samples, input events, and
//! the composite trace a session returns.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A pair of floating-point screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Fail with `InvalidGeometry` unless both coordinates are finite.
    pub fn validate(&self, what: &str) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidGeometry(format!(
                "{what} has non-finite coordinates ({}, {})",
                self.x, self.y
            )))
        }
    }
}

/// A click target: center plus bounding-box extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl Target {
    pub fn new(center: Point, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// The width Fitts' Law sees: the tighter of the two extents.
    pub fn effective_width(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Whether a point lies inside the bounding box (inclusive edges).
    pub fn contains(&self, p: Point) -> bool {
        (p.x - self.center.x).abs() <= self.width / 2.0
            && (p.y - self.center.y).abs() <= self.height / 2.0
    }

    /// Fail with `InvalidGeometry` on non-finite coordinates or
    /// non-positive extents.
    pub fn validate(&self) -> Result<()> {
        self.center.validate("target center")?;
        if !self.width.is_finite() || !self.height.is_finite() || self.width <= 0.0 || self.height <= 0.0
        {
            return Err(Error::InvalidGeometry(format!(
                "target extents must be positive and finite, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Pointer buttons the driver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// One cursor sample: time in seconds from trace start plus position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the first sample of the trace
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(t: f64, x: f64, y: f64) -> Self {
        Self { t, x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Kind of a scheduled input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEventKind {
    ButtonDown,
    ButtonUp,
}

/// A button event scheduled on the trace timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Seconds since the first sample of the trace
    pub t: f64,
    pub kind: InputEventKind,
    pub button: MouseButton,
    /// Cursor position at emission time
    pub x: f64,
    pub y: f64,
}

/// An ordered cursor trace with its scheduled input events.
///
/// Invariants: timestamps are strictly increasing, the first sample has
/// `t = 0`, and events are ordered by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub samples: Vec<Sample>,
    pub events: Vec<InputEvent>,
}

impl Trace {
    pub fn new(samples: Vec<Sample>, events: Vec<InputEvent>) -> Self {
        debug_assert!(
            samples.windows(2).all(|w| w[1].t > w[0].t),
            "trace timestamps must be strictly increasing"
        );
        debug_assert!(samples.first().map(|s| s.t == 0.0).unwrap_or(true));
        Self { samples, events }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Trace span in seconds, 0 for traces shorter than two samples.
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0.0,
        }
    }

    /// Straight-line distance from first to last sample.
    pub fn chord_length(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => first.point().distance_to(last.point()),
            _ => 0.0,
        }
    }

    /// Summed inter-sample path length.
    pub fn arc_length(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| w[0].point().distance_to(w[1].point()))
            .sum()
    }

    /// Timestamps strictly increasing and starting at zero.
    pub fn is_monotonic(&self) -> bool {
        self.samples.first().map(|s| s.t == 0.0).unwrap_or(true)
            && self.samples.windows(2).all(|w| w[1].t > w[0].t)
    }
}
