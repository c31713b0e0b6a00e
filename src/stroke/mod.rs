//! Directional pointer strokes.
//!
//! - `tracker` - pure classifier turning samples into a collapsed direction list
//! - `sampler` - per-state sampler that classifies queued points on a worker thread

pub mod sampler;
pub mod tracker;

pub use sampler::StrokeSampler;
pub use tracker::StrokeTracker;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl StrokeDirection {
    /// Classify a displacement by its dominant axis (screen coordinates, y grows downward).
    /// Ties go to the horizontal axis.
    #[must_use]
    pub fn from_delta(dx: f32, dy: f32) -> Option<Self> {
        let abs_x = dx.abs();
        let abs_y = dy.abs();
        if abs_x == 0.0 && abs_y == 0.0 {
            return None;
        }

        if abs_x >= abs_y {
            if dx > 0.0 {
                Some(Self::Right)
            } else {
                Some(Self::Left)
            }
        } else if dy > 0.0 {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }

    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Up => 'U',
            Self::Down => 'D',
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

impl fmt::Display for StrokeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Pointer position in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Render a stroke as tokens, e.g. `DR`
#[must_use]
pub fn format_stroke(strokes: &[StrokeDirection]) -> String {
    strokes.iter().map(|dir| dir.token()).collect()
}
