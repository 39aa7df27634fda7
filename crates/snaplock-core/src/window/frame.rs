use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Invisible border the compositor adds around a window for its drop shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameInsets {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl FrameInsets {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Insets implied by a logical window rect and its visible rect.
    pub fn between(logical: Rect, visible: Rect) -> Self {
        Self {
            left: visible.left().saturating_sub(logical.left()),
            top: visible.top().saturating_sub(logical.top()),
            right: logical.right().saturating_sub(visible.right()),
            bottom: logical.bottom().saturating_sub(visible.bottom()),
        }
    }

    /// Logical rect whose visible part is `visible`.
    pub fn expand(&self, visible: Rect) -> Rect {
        Rect::new(
            visible.x.saturating_sub(self.left),
            visible.y.saturating_sub(self.top),
            visible
                .width
                .saturating_add(self.left)
                .saturating_add(self.right),
            visible
                .height
                .saturating_add(self.top)
                .saturating_add(self.bottom),
        )
    }

    /// Visible part of a logical rect.
    pub fn shrink(&self, logical: Rect) -> Rect {
        Rect::new(
            logical.x.saturating_add(self.left),
            logical.y.saturating_add(self.top),
            logical
                .width
                .saturating_sub(self.left)
                .saturating_sub(self.right),
            logical
                .height
                .saturating_sub(self.top)
                .saturating_sub(self.bottom),
        )
    }
}

/// Logical rect to hand to the platform's move call so that the window's
/// visible rect lands exactly on `target`.
pub fn compensated_target(logical: Rect, visible: Rect, target: Rect) -> Rect {
    FrameInsets::between(logical, visible).expand(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compensation_adds_shadow_padding() {
        // Typical shadow: 7px left/right/bottom, none on top.
        let logical = Rect::new(93, 100, 814, 607);
        let visible = Rect::new(100, 100, 800, 600);
        let target = Rect::new(0, 0, 960, 540);

        let moved = compensated_target(logical, visible, target);
        assert_eq!(moved, Rect::new(-7, 0, 974, 547));
        assert_eq!(FrameInsets::between(logical, visible).shrink(moved), target);
    }

    #[test]
    fn test_compensation_without_padding_is_identity() {
        let r = Rect::new(10, 10, 500, 500);
        let target = Rect::new(0, 0, 300, 200);
        assert_eq!(compensated_target(r, r, target), target);
    }
}
