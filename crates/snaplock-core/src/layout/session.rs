//! An interactive layout session.
//!
//! While a session is open the user can lock, swap, and reshuffle windows.
//! Lock edits are held in memory and flushed by [`LayoutSession::tick`]
//! after a quiet period, and always on [`LayoutSession::close`].

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::packer::GapPacker;
use super::types::LayoutPlan;
use crate::geometry::Rect;
use crate::identity::{IdentityMatcher, LockEntry, SceneItem};
use crate::locks::{LockError, LockStore, SaveDebouncer, ToggleOutcome};
use crate::window::{WindowError, WindowHandle};

pub struct LayoutSession {
    matcher: IdentityMatcher,
    packer: GapPacker,
    locks: LockStore,
    handles: Vec<WindowHandle>,
    work_area: Rect,
    shuffle_offset: usize,
    debouncer: SaveDebouncer,
    auto_exit: Option<Duration>,
    deadline: Option<Instant>,
}

impl LayoutSession {
    /// `auto_exit` of zero disables the idle timeout.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        matcher: IdentityMatcher,
        packer: GapPacker,
        locks: LockStore,
        handles: Vec<WindowHandle>,
        work_area: Rect,
        debouncer: SaveDebouncer,
        auto_exit: Duration,
        now: Instant,
    ) -> Self {
        let auto_exit = (!auto_exit.is_zero()).then_some(auto_exit);
        Self {
            matcher,
            packer,
            locks,
            handles,
            work_area,
            shuffle_offset: 0,
            debouncer,
            auto_exit,
            deadline: auto_exit.map(|d| now + d),
        }
    }

    pub fn handles(&self) -> &[WindowHandle] {
        &self.handles
    }

    pub fn locks(&self) -> &LockStore {
        &self.locks
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    pub fn shuffle_offset(&self) -> usize {
        self.shuffle_offset
    }

    /// Pack the current windows and move each one that still exists.
    ///
    /// Normal windows are rotated by the shuffle offset so each refresh
    /// hands them different gaps.
    pub fn perform_layout(&mut self) -> LayoutPlan {
        let resolution = self.locks.resolve_assignment(&self.handles, &self.matcher);
        let mut normals = resolution.normals;
        if !normals.is_empty() {
            let offset = self.shuffle_offset % normals.len();
            normals.rotate_left(offset);
        }

        let plan = self
            .packer
            .assign_smart_gaps(self.work_area, &resolution.locked, &normals);
        apply_plan(&self.matcher, &plan);

        info!(
            event = "core.layout.pass_completed",
            windows = plan.len(),
            locked = resolution.locked.len(),
            offset = self.shuffle_offset,
            degraded = plan.is_degraded()
        );
        plan
    }

    /// Replace the window list, advance the shuffle, relayout, and restart
    /// the idle timer.
    pub fn refresh(&mut self, handles: Vec<WindowHandle>, now: Instant) -> LayoutPlan {
        self.handles = handles;
        self.shuffle_offset = self.shuffle_offset.wrapping_add(1);
        self.touch(now);
        self.perform_layout()
    }

    pub fn toggle_lock(&mut self, handle: WindowHandle, now: Instant) -> ToggleOutcome {
        let outcome = self.locks.toggle(handle, &self.matcher);
        self.debouncer.mark(now);
        self.touch(now);
        outcome
    }

    pub fn remove_lock(&mut self, index: usize, now: Instant) -> Result<LockEntry, LockError> {
        let entry = self.locks.remove(index)?;
        self.debouncer.mark(now);
        Ok(entry)
    }

    /// Record a user move of `handle`. Returns true when a lock rect changed.
    pub fn on_window_moved(&mut self, handle: WindowHandle, now: Instant) -> bool {
        let rect = self.matcher.windows().visible_rect(handle);
        let changed = self.locks.refresh_rect(handle, rect, &self.matcher);
        if changed {
            debug!(event = "core.layout.lock_rect_refreshed", handle = %handle, rect = %rect);
            self.debouncer.mark(now);
        }
        changed
    }

    /// Exchange the visible rects of two windows, carrying their locks along.
    pub fn swap_windows(
        &mut self,
        a: WindowHandle,
        b: WindowHandle,
        now: Instant,
    ) -> Result<(), WindowError> {
        let windows = self.matcher.windows();
        let rect_a = windows.visible_rect(a);
        let rect_b = windows.visible_rect(b);

        windows.move_window_compensated(a, rect_b)?;
        windows.move_window_compensated(b, rect_a)?;

        let lock_a = self.locks.find(a, &self.matcher);
        let lock_b = self.locks.find(b, &self.matcher);
        let mut changed = false;
        if let Some(i) = lock_a {
            changed |= self.locks.set_rect(i, rect_b);
        }
        if let Some(i) = lock_b
            && Some(i) != lock_a
        {
            changed |= self.locks.set_rect(i, rect_a);
        }
        if changed {
            self.debouncer.mark(now);
        }

        info!(event = "core.layout.swap_completed", a = %a, b = %b);
        self.touch(now);
        Ok(())
    }

    /// Identity and current rect of every window still open.
    pub fn capture_scene_items(&self) -> Vec<SceneItem> {
        capture_items(&self.matcher, &self.handles)
    }

    /// Flush lock edits once the debounce period has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.debouncer.is_due(now) {
            return false;
        }
        self.debouncer.clear();
        self.locks.flush_if_dirty()
    }

    pub fn should_auto_exit(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Flush pending lock edits and hand back the store.
    pub fn close(mut self) -> LockStore {
        self.debouncer.clear();
        self.locks.flush_if_dirty();
        info!(event = "core.layout.session_closed", locks = self.locks.len());
        self.locks
    }

    fn touch(&mut self, now: Instant) {
        if let Some(d) = self.auto_exit {
            self.deadline = Some(now + d);
        }
    }
}

/// Move every placement whose window still exists. Failures are logged.
pub(crate) fn apply_plan(matcher: &IdentityMatcher, plan: &LayoutPlan) {
    let windows = matcher.windows();
    for placement in plan {
        if !windows.is_window(placement.handle) {
            continue;
        }
        if let Err(e) = windows.move_window_compensated(placement.handle, placement.rect) {
            warn!(
                event = "core.layout.move_failed",
                handle = %placement.handle,
                error = %e
            );
        }
    }
}

pub(crate) fn capture_items(matcher: &IdentityMatcher, handles: &[WindowHandle]) -> Vec<SceneItem> {
    let windows = matcher.windows();
    handles
        .iter()
        .filter(|h| windows.is_window(**h))
        .map(|h| matcher.capture(*h))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AppClasses;
    use crate::window::{DesktopSnapshot, SnapshotWindowSystem, WindowState, WindowSystem};
    use std::sync::Arc;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    fn h(raw: u64) -> WindowHandle {
        WindowHandle::new(raw)
    }

    fn setup(
        dir: &tempfile::TempDir,
        windows: Vec<WindowState>,
        auto_exit: Duration,
        now: Instant,
    ) -> (Arc<SnapshotWindowSystem>, LayoutSession) {
        let ws = Arc::new(SnapshotWindowSystem::new(DesktopSnapshot {
            work_area: SCREEN,
            windows,
        }));
        let matcher = IdentityMatcher::new(ws.clone(), ws.clone(), AppClasses::default());
        let handles = ws.enumerate_candidate_windows().unwrap();
        let session = LayoutSession::new(
            matcher,
            GapPacker::default(),
            LockStore::open(dir.path().join("locks.txt")),
            handles,
            SCREEN,
            SaveDebouncer::from_millis(500),
            auto_exit,
            now,
        );
        (ws, session)
    }

    fn three_windows() -> Vec<WindowState> {
        vec![
            WindowState::new(1, "code", "main.rs", Rect::new(100, 100, 800, 600)),
            WindowState::new(2, "slack", "general", Rect::new(200, 200, 800, 600)),
            WindowState::new(3, "notes", "todo", Rect::new(300, 300, 800, 600)),
        ]
    }

    #[test]
    fn test_layout_moves_all_windows_into_disjoint_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        let plan = session.perform_layout();
        assert_eq!(plan.len(), 3);
        let rects: Vec<Rect> = [1, 2, 3].iter().map(|r| ws.visible_rect(h(*r))).collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(SCREEN.contains_rect(a));
            for b in &rects[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_refresh_rotates_normals() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (_ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        let first = session.perform_layout();
        let handles = session.handles().to_vec();
        let second = session.refresh(handles, now);

        assert_eq!(session.shuffle_offset(), 1);
        assert_eq!(second.rect_for(h(2)), first.rect_for(h(1)));
        assert_eq!(second.rect_for(h(3)), first.rect_for(h(2)));
        assert_eq!(second.rect_for(h(1)), first.rect_for(h(3)));
    }

    #[test]
    fn test_locked_window_keeps_rect_across_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        ws.move_window_compensated(h(1), Rect::new(0, 0, 960, 1080)).unwrap();
        assert!(matches!(session.toggle_lock(h(1), now), ToggleOutcome::Locked(_)));

        let plan = session.perform_layout();
        assert_eq!(plan.rect_for(h(1)), Some(Rect::new(0, 0, 960, 1080)));
        for p in plan.normals() {
            assert!(!p.rect.overlaps(&Rect::new(0, 0, 960, 1080)));
        }
    }

    #[test]
    fn test_tick_flushes_after_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (_ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);
        let path = dir.path().join("locks.txt");

        session.toggle_lock(h(2), now);
        assert!(!session.tick(now + Duration::from_millis(100)));
        assert!(!path.exists());

        assert!(session.tick(now + Duration::from_millis(600)));
        assert!(path.exists());
        assert!(!session.locks().is_dirty());
    }

    #[test]
    fn test_on_window_moved_refreshes_locked_rect() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        session.toggle_lock(h(1), now);
        ws.move_window_compensated(h(1), Rect::new(0, 0, 700, 700)).unwrap();
        assert!(session.on_window_moved(h(1), now));
        assert_eq!(session.locks().entries()[0].rect, Rect::new(0, 0, 700, 700));

        assert!(!session.on_window_moved(h(2), now));
    }

    #[test]
    fn test_remove_lock_schedules_save() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (_ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        session.toggle_lock(h(1), now);
        assert!(session.tick(now + Duration::from_secs(1)));

        let later = now + Duration::from_secs(2);
        assert_eq!(session.remove_lock(0, later).unwrap().process_name, "code");
        assert!(session.remove_lock(0, later).is_err());
        assert!(session.tick(later + Duration::from_secs(1)));
        assert!(LockStore::open(dir.path().join("locks.txt")).is_empty());
    }

    #[test]
    fn test_swap_exchanges_rects_and_locks() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        session.toggle_lock(h(1), now);
        session.swap_windows(h(1), h(2), now).unwrap();

        assert_eq!(ws.visible_rect(h(1)), Rect::new(200, 200, 800, 600));
        assert_eq!(ws.visible_rect(h(2)), Rect::new(100, 100, 800, 600));
        assert_eq!(session.locks().entries()[0].rect, Rect::new(200, 200, 800, 600));
    }

    #[test]
    fn test_auto_exit_deadline_restarts_on_activity() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (_ws, mut session) = setup(&dir, three_windows(), Duration::from_secs(5), now);

        assert!(!session.should_auto_exit(now + Duration::from_secs(4)));
        session.toggle_lock(h(1), now + Duration::from_secs(4));
        assert!(!session.should_auto_exit(now + Duration::from_secs(6)));
        assert!(session.should_auto_exit(now + Duration::from_secs(9)));
    }

    #[test]
    fn test_zero_auto_exit_never_expires() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (_ws, session) = setup(&dir, three_windows(), Duration::ZERO, now);
        assert!(!session.should_auto_exit(now + Duration::from_secs(3600)));
    }

    #[test]
    fn test_capture_skips_closed_windows_and_close_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let (ws, mut session) = setup(&dir, three_windows(), Duration::ZERO, now);

        ws.remove(h(3));
        let items = session.capture_scene_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].process_name, "code");

        session.toggle_lock(h(1), now);
        let store = session.close();
        assert!(!store.is_dirty());
        assert_eq!(LockStore::open(dir.path().join("locks.txt")).len(), 1);
    }
}
