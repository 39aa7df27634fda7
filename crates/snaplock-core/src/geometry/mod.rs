//! Integer screen geometry shared by the packer, locks, and scenes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned integer rectangle in screen coordinates.
///
/// `right` and `bottom` are exclusive, matching the platform convention
/// where a window at `x = 0` with `width = 960` ends at `x = 960`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    /// Saturates at `i32::MAX` for rects that reach past the coordinate space.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Overlapping region, or `None` when the rects only touch or are apart.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        ))
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RectParseError {
    #[error("expected 4 comma-separated integers, got '{input}'")]
    WrongArity { input: String },

    #[error("invalid integer '{value}' in rect '{input}'")]
    InvalidNumber { input: String, value: String },

    #[error("rect '{input}' has a negative width or height")]
    NegativeSize { input: String },

    #[error("rect '{input}' extends past the coordinate range")]
    OutOfRange { input: String },
}

impl FromStr for Rect {
    type Err = RectParseError;

    /// Parses the `x,y,w,h` form used by the lock file and the CLI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(RectParseError::WrongArity {
                input: s.to_string(),
            });
        }

        let mut values = [0i32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<i32>()
                .map_err(|_| RectParseError::InvalidNumber {
                    input: s.to_string(),
                    value: part.to_string(),
                })?;
        }

        let [x, y, width, height] = values;
        if width < 0 || height < 0 {
            return Err(RectParseError::NegativeSize {
                input: s.to_string(),
            });
        }
        if x.checked_add(width).is_none() || y.checked_add(height).is_none() {
            return Err(RectParseError::OutOfRange {
                input: s.to_string(),
            });
        }
        Ok(Rect::new(x, y, width, height))
    }
}
