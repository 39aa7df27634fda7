//! Gap packing: carve locked rects out of the work area, then hand the
//! remaining gaps to normal windows, largest first.

use tracing::{debug, warn};

use super::types::{LayoutPlan, Placement};
use crate::config::defaults::DEFAULT_MIN_GAP_EXTENT;
use crate::geometry::Rect;
use crate::window::WindowHandle;

/// Remainder of `gap` after removing `cut`.
///
/// Bands come out as top, bottom, left, right. The left and right bands span
/// only the rows covered by the intersection, so the bands never overlap.
pub fn subtract_rect(gap: Rect, cut: Rect) -> Vec<Rect> {
    let Some(hit) = gap.intersect(&cut) else {
        return vec![gap];
    };

    let mut bands = Vec::with_capacity(4);
    if hit.top() > gap.top() {
        bands.push(Rect::new(gap.x, gap.y, gap.width, hit.top() - gap.top()));
    }
    if hit.bottom() < gap.bottom() {
        bands.push(Rect::new(
            gap.x,
            hit.bottom(),
            gap.width,
            gap.bottom() - hit.bottom(),
        ));
    }
    if hit.left() > gap.left() {
        bands.push(Rect::new(gap.x, hit.y, hit.left() - gap.left(), hit.height));
    }
    if hit.right() < gap.right() {
        bands.push(Rect::new(
            hit.right(),
            hit.y,
            gap.right() - hit.right(),
            hit.height,
        ));
    }
    bands
}

/// Halve `rect` across its longer side. The second half takes the odd pixel.
fn split_in_half(rect: Rect) -> (Rect, Rect) {
    if rect.width > rect.height {
        let first = rect.width / 2;
        (
            Rect::new(rect.x, rect.y, first, rect.height),
            Rect::new(rect.x + first, rect.y, rect.width - first, rect.height),
        )
    } else {
        let first = rect.height / 2;
        (
            Rect::new(rect.x, rect.y, rect.width, first),
            Rect::new(rect.x, rect.y + first, rect.width, rect.height - first),
        )
    }
}

fn sort_by_area_desc(gaps: &mut [Rect]) {
    // sort_by is stable, so equal areas keep gap-set order.
    gaps.sort_by(|a, b| b.area().cmp(&a.area()));
}

/// Split the largest gap until there are at least `target` gaps.
///
/// An empty gap set stays empty.
pub fn split_until(mut gaps: Vec<Rect>, target: usize) -> Vec<Rect> {
    while gaps.len() < target && !gaps.is_empty() {
        sort_by_area_desc(&mut gaps);
        let largest = gaps.remove(0);
        let (a, b) = split_in_half(largest);
        gaps.push(a);
        gaps.push(b);
    }
    gaps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapPacker {
    min_gap_extent: i32,
}

impl Default for GapPacker {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP_EXTENT)
    }
}

impl GapPacker {
    /// Gaps with a side of `min_gap_extent` or less are discarded as slivers.
    pub fn new(min_gap_extent: i32) -> Self {
        Self { min_gap_extent }
    }

    pub fn min_gap_extent(&self) -> i32 {
        self.min_gap_extent
    }

    /// Free regions of `work_area` after subtracting each locked rect in order.
    pub fn compute_gaps(&self, work_area: Rect, locked: &[Rect]) -> Vec<Rect> {
        let mut gaps = vec![work_area];
        for cut in locked {
            gaps = gaps
                .into_iter()
                .flat_map(|gap| subtract_rect(gap, *cut))
                .filter(|g| g.width > self.min_gap_extent && g.height > self.min_gap_extent)
                .collect();
        }
        gaps
    }

    /// Place every handle: locked ones keep their rect, normals get gaps.
    ///
    /// Never fails. With fewer gaps than normals after splitting, gaps are
    /// reused cyclically; with no gaps at all, normals get the full work area.
    /// Both cases mark the plan degraded.
    pub fn assign_smart_gaps(
        &self,
        work_area: Rect,
        locked: &[(WindowHandle, Rect)],
        normals: &[WindowHandle],
    ) -> LayoutPlan {
        let locked_rects: Vec<Rect> = locked.iter().map(|(_, r)| *r).collect();
        let gaps = self.compute_gaps(work_area, &locked_rects);
        let initial_gaps = gaps.len();

        let mut gaps = split_until(gaps, normals.len());
        sort_by_area_desc(&mut gaps);

        let mut placements: Vec<Placement> = locked
            .iter()
            .map(|(handle, rect)| Placement {
                handle: *handle,
                rect: *rect,
                locked: true,
            })
            .collect();

        let degraded = !normals.is_empty() && gaps.len() < normals.len();
        for (i, handle) in normals.iter().enumerate() {
            let rect = if gaps.is_empty() {
                work_area
            } else {
                gaps[i % gaps.len()]
            };
            placements.push(Placement {
                handle: *handle,
                rect,
                locked: false,
            });
        }

        if degraded {
            warn!(
                event = "core.layout.packing_degraded",
                gaps = gaps.len(),
                normals = normals.len(),
                message = "Not enough free space, normal windows will overlap"
            );
        }
        debug!(
            event = "core.layout.packed",
            locked = locked.len(),
            normals = normals.len(),
            initial_gaps = initial_gaps,
            final_gaps = gaps.len()
        );

        LayoutPlan::new(placements, degraded)
    }
}
