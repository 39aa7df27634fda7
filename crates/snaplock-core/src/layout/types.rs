use serde::Serialize;

use crate::geometry::Rect;
use crate::window::WindowHandle;

/// Target rect for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub handle: WindowHandle,
    pub rect: Rect,
    pub locked: bool,
}

/// Result of one packing pass: locked placements first, then normals, in
/// input order. Holds exactly one placement per input handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    placements: Vec<Placement>,
    /// Set when normals had to share rects or fall back to the work area.
    degraded: bool,
}

impl LayoutPlan {
    pub(crate) fn new(placements: Vec<Placement>, degraded: bool) -> Self {
        Self {
            placements,
            degraded,
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn rect_for(&self, handle: WindowHandle) -> Option<Rect> {
        self.placements
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| p.rect)
    }

    pub fn normals(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|p| !p.locked)
    }
}

impl<'a> IntoIterator for &'a LayoutPlan {
    type Item = &'a Placement;
    type IntoIter = std::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}
