use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use rand::seq::SliceRandom;
use tracing::{error, info};

use super::context::{ERROR_VAR, HostContext, InvocationOptions};
use super::errors::HostError;
use crate::blacklist::Blacklist;
use crate::config::{Config, SnaplockConfig};
use crate::geometry::Rect;
use crate::identity::{AppClasses, IdentityMatcher, LockEntry};
use crate::layout::session::{apply_plan, capture_items};
use crate::layout::{GapPacker, LayoutPlan, LayoutSession};
use crate::locks::{LockStore, SaveDebouncer, ToggleOutcome};
use crate::process::Launcher;
use crate::scenes::{
    RestoreReport, RetryPolicy, Scene, SceneError, SceneRestorer, SceneStore, ThumbnailCapturer,
    default_scene_name,
};
use crate::window::{IdentityTextSource, WindowHandle, WindowSystem};

/// Platform adapters the service drives.
pub struct Ports {
    pub windows: Arc<dyn WindowSystem>,
    pub identity: Arc<dyn IdentityTextSource>,
    pub launcher: Arc<dyn Launcher>,
    pub thumbnailer: Arc<dyn ThumbnailCapturer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// Nothing to arrange.
    NoWindows,
    Instant(LayoutPlan),
    SessionOpened(LayoutPlan),
    /// The open session was refreshed, and closed when instant mode was set.
    SessionRefreshed { plan: LayoutPlan, closed: bool },
    /// The error was logged and written to the host's error variable.
    Failed { message: String },
}

/// Owns everything one process needs: settings, ports, the blacklist cache,
/// and at most one interactive session.
pub struct LayoutService {
    paths: Config,
    settings: SnaplockConfig,
    matcher: IdentityMatcher,
    launcher: Arc<dyn Launcher>,
    scenes: SceneStore,
    blacklist: Blacklist,
    packer: GapPacker,
    work_area: Rect,
    session: Option<LayoutSession>,
}

impl LayoutService {
    pub fn new(paths: Config, settings: SnaplockConfig, ports: Ports, work_area: Rect) -> Self {
        let matcher = IdentityMatcher::new(
            ports.windows,
            ports.identity,
            AppClasses::from_config(&settings.apps),
        );
        let scenes = SceneStore::new(paths.scenes_dir(), ports.thumbnailer);
        let blacklist = Blacklist::load(paths.blacklist_file());
        let packer = GapPacker::new(settings.layout.min_gap_extent());

        Self {
            paths,
            settings,
            matcher,
            launcher: ports.launcher,
            scenes,
            blacklist,
            packer,
            work_area,
            session: None,
        }
    }

    pub fn paths(&self) -> &Config {
        &self.paths
    }

    pub fn settings(&self) -> &SnaplockConfig {
        &self.settings
    }

    pub fn work_area(&self) -> Rect {
        self.work_area
    }

    pub fn matcher(&self) -> &IdentityMatcher {
        &self.matcher
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn blacklist_add(&mut self, process_name: &str) -> std::io::Result<bool> {
        self.blacklist.add(process_name)
    }

    /// Layout candidates with blacklisted processes removed.
    pub fn candidates(&self) -> Result<Vec<WindowHandle>, HostError> {
        let windows = self.matcher.windows();
        let handles = windows.enumerate_candidate_windows()?;
        Ok(self.blacklist.retain_allowed(handles, windows.as_ref()))
    }

    /// Handle one host trigger. Errors never escape: they are logged and
    /// stored in the context's `errMessage` variable.
    pub fn invoke(&mut self, ctx: &mut dyn HostContext, now: Instant) -> InvokeOutcome {
        let options = InvocationOptions::from_context(ctx);
        info!(
            event = "core.host.invoke_started",
            instant_mode = options.instant_mode,
            auto_exit_seconds = options.auto_exit_seconds
        );

        match self.try_invoke(options, now) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    event = "core.host.invoke_failed",
                    error = %e,
                    error_code = crate::errors::SnaplockError::error_code(&e)
                );
                let message = e.to_string();
                ctx.set_var(ERROR_VAR, &message);
                InvokeOutcome::Failed { message }
            }
        }
    }

    fn try_invoke(
        &mut self,
        options: InvocationOptions,
        now: Instant,
    ) -> Result<InvokeOutcome, HostError> {
        self.blacklist.reload();

        if self.session.is_some() {
            let handles = self.candidates()?;
            let plan = match self.session.as_mut() {
                Some(session) => session.refresh(handles, now),
                None => LayoutPlan::default(),
            };
            let closed = options.instant_mode && self.close_session();
            return Ok(InvokeOutcome::SessionRefreshed { plan, closed });
        }

        let handles = self.candidates()?;
        info!(event = "core.host.candidates_found", count = handles.len());
        if handles.is_empty() {
            return Ok(InvokeOutcome::NoWindows);
        }

        if options.instant_mode {
            return Ok(InvokeOutcome::Instant(self.instant_layout(&handles)));
        }

        let auto_exit = Duration::from_secs(options.auto_exit_seconds);
        Ok(InvokeOutcome::SessionOpened(
            self.open_session(handles, auto_exit, now),
        ))
    }

    /// One-shot layout: locks from disk, normals in random order.
    pub fn instant_layout(&self, handles: &[WindowHandle]) -> LayoutPlan {
        let locks = LockStore::open(self.paths.locks_file());
        let resolution = locks.resolve_assignment(handles, &self.matcher);
        let mut normals = resolution.normals;
        normals.shuffle(&mut rand::rng());

        let plan = self
            .packer
            .assign_smart_gaps(self.work_area, &resolution.locked, &normals);
        apply_plan(&self.matcher, &plan);

        info!(
            event = "core.host.instant_layout_completed",
            windows = plan.len(),
            locked = resolution.locked.len()
        );
        plan
    }

    /// Start an interactive session, replacing any open one, and lay it out.
    pub fn open_session(
        &mut self,
        handles: Vec<WindowHandle>,
        auto_exit: Duration,
        now: Instant,
    ) -> LayoutPlan {
        self.close_session();

        let mut session = LayoutSession::new(
            self.matcher.clone(),
            self.packer,
            LockStore::open(self.paths.locks_file()),
            handles,
            self.work_area,
            SaveDebouncer::from_millis(self.settings.locks.save_debounce_ms()),
            auto_exit,
            now,
        );
        let plan = session.perform_layout();
        self.session = Some(session);
        info!(event = "core.host.session_opened");
        plan
    }

    pub fn active_session(&self) -> Option<&LayoutSession> {
        self.session.as_ref()
    }

    pub fn active_session_mut(&mut self) -> Option<&mut LayoutSession> {
        self.session.as_mut()
    }

    /// Flush and drop the open session. Returns false if none was open.
    pub fn close_session(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.close();
                true
            }
            None => false,
        }
    }

    /// Drive debounced saves and the idle timeout. Returns true if the
    /// session closed itself.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.tick(now);
        if session.should_auto_exit(now) {
            info!(event = "core.host.session_auto_exit");
            return self.close_session();
        }
        false
    }

    /// Locks as the open session sees them, or as stored on disk.
    pub fn lock_entries(&self) -> Vec<LockEntry> {
        match &self.session {
            Some(session) => session.locks().entries().to_vec(),
            None => LockStore::open(self.paths.locks_file()).entries().to_vec(),
        }
    }

    /// Toggle the lock of a candidate window. Without an open session the
    /// change is saved immediately.
    pub fn toggle_lock(
        &mut self,
        handle: WindowHandle,
        now: Instant,
    ) -> Result<ToggleOutcome, HostError> {
        if !self.candidates()?.contains(&handle) {
            return Err(HostError::NotACandidate { handle });
        }

        if let Some(session) = self.session.as_mut() {
            return Ok(session.toggle_lock(handle, now));
        }

        let mut store = LockStore::open(self.paths.locks_file());
        let outcome = store.toggle(handle, &self.matcher);
        store.save()?;
        Ok(outcome)
    }

    pub fn remove_lock(&mut self, index: usize, now: Instant) -> Result<LockEntry, HostError> {
        if let Some(session) = self.session.as_mut() {
            return Ok(session.remove_lock(index, now)?);
        }

        let mut store = LockStore::open(self.paths.locks_file());
        let entry = store.remove(index)?;
        store.save()?;
        Ok(entry)
    }

    pub fn scenes(&self) -> Vec<Scene> {
        self.scenes.load_all()
    }

    /// Snapshot the current windows under `name`, or a timestamped default.
    pub fn save_scene(&self, name: Option<&str>) -> Result<Scene, HostError> {
        let items = match &self.session {
            Some(session) => session.capture_scene_items(),
            None => capture_items(&self.matcher, &self.candidates()?),
        };
        let name = match name {
            Some(name) => name.to_string(),
            None => default_scene_name(Local::now()),
        };
        Ok(self.scenes.save_scene(&name, items)?)
    }

    pub fn apply_scene(&self, name: &str) -> Result<RestoreReport, HostError> {
        let scene = self.scenes.find(name).ok_or_else(|| SceneError::NotFound {
            name: name.to_string(),
        })?;
        let restorer = SceneRestorer::new(
            self.matcher.clone(),
            self.launcher.clone(),
            RetryPolicy::from_config(&self.settings.restore),
        );
        Ok(restorer.apply_scene(&scene))
    }

    pub fn delete_scene(&self, name: &str) -> Result<bool, HostError> {
        Ok(self.scenes.delete(name)?)
    }

    pub fn clear_scenes(&self) -> Result<(), HostError> {
        Ok(self.scenes.clear()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::context::{AUTO_EXIT_VAR, INSTANT_MODE_VAR, VarContext};
    use crate::process::SystemLauncher;
    use crate::scenes::{ItemOutcome, NoopThumbnailer};
    use crate::window::{DesktopSnapshot, SnapshotWindowSystem, WindowState};

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    fn h(raw: u64) -> WindowHandle {
        WindowHandle::new(raw)
    }

    fn service(
        dir: &tempfile::TempDir,
        windows: Vec<WindowState>,
    ) -> (Arc<SnapshotWindowSystem>, LayoutService) {
        let ws = Arc::new(SnapshotWindowSystem::new(DesktopSnapshot {
            work_area: SCREEN,
            windows,
        }));
        let ports = Ports {
            windows: ws.clone(),
            identity: ws.clone(),
            launcher: Arc::new(SystemLauncher),
            thumbnailer: Arc::new(NoopThumbnailer),
        };
        let service = LayoutService::new(
            Config::with_data_dir(dir.path()),
            SnaplockConfig::default(),
            ports,
            SCREEN,
        );
        (ws, service)
    }

    fn windows() -> Vec<WindowState> {
        vec![
            WindowState::new(1, "code", "main.rs", Rect::new(100, 100, 800, 600)),
            WindowState::new(2, "slack", "general", Rect::new(200, 200, 800, 600)),
            WindowState::new(3, "spotify", "music", Rect::new(300, 300, 800, 600)),
        ]
    }

    #[test]
    fn test_invoke_without_windows_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (ws, mut service) = service(&dir, Vec::new());
        let mut ctx = VarContext::new();

        assert_eq!(service.invoke(&mut ctx, Instant::now()), InvokeOutcome::NoWindows);
        assert!(ws.moves().is_empty());
        assert!(service.active_session().is_none());
    }

    #[test]
    fn test_instant_invoke_moves_all_and_skips_blacklist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blacklist.txt"), "Spotify\n").unwrap();
        let (ws, mut service) = service(&dir, windows());
        let mut ctx = VarContext::new().with_var(INSTANT_MODE_VAR, "true");

        let outcome = service.invoke(&mut ctx, Instant::now());
        let InvokeOutcome::Instant(plan) = outcome else {
            panic!("expected instant layout, got {outcome:?}");
        };
        assert_eq!(plan.len(), 2);
        assert!(plan.rect_for(h(3)).is_none());
        assert_eq!(ws.visible_rect(h(3)), Rect::new(300, 300, 800, 600));
        assert!(service.active_session().is_none());

        let a = ws.visible_rect(h(1));
        let b = ws.visible_rect(h(2));
        assert!(!a.overlaps(&b));
        assert_eq!(a.area() + b.area(), SCREEN.area());
    }

    #[test]
    fn test_interactive_invoke_opens_then_refreshes_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let (_ws, mut service) = service(&dir, windows());
        let now = Instant::now();

        let mut ctx = VarContext::new().with_var(AUTO_EXIT_VAR, "10");
        assert!(matches!(
            service.invoke(&mut ctx, now),
            InvokeOutcome::SessionOpened(_)
        ));
        assert!(service.active_session().is_some());

        let outcome = service.invoke(&mut ctx, now);
        assert!(matches!(
            outcome,
            InvokeOutcome::SessionRefreshed { closed: false, .. }
        ));
        assert_eq!(service.active_session().map(|s| s.shuffle_offset()), Some(1));

        let mut instant = VarContext::new().with_var(INSTANT_MODE_VAR, "true");
        assert!(matches!(
            service.invoke(&mut instant, now),
            InvokeOutcome::SessionRefreshed { closed: true, .. }
        ));
        assert!(service.active_session().is_none());
    }

    #[test]
    fn test_tick_closes_idle_session() {
        let dir = tempfile::tempdir().unwrap();
        let (_ws, mut service) = service(&dir, windows());
        let now = Instant::now();

        service.open_session(service.candidates().unwrap(), Duration::from_secs(5), now);
        assert!(!service.tick(now + Duration::from_secs(1)));
        assert!(service.tick(now + Duration::from_secs(6)));
        assert!(service.active_session().is_none());
    }

    #[test]
    fn test_failure_sets_error_variable() {
        let dir = tempfile::tempdir().unwrap();

        /// Enumeration always fails.
        struct BrokenWindows;
        impl WindowSystem for BrokenWindows {
            fn enumerate_candidate_windows(
                &self,
            ) -> Result<Vec<WindowHandle>, crate::window::WindowError> {
                Err(crate::window::WindowError::EnumerationFailed {
                    message: "display server gone".to_string(),
                })
            }
            fn is_window(&self, _: WindowHandle) -> bool {
                false
            }
            fn process_name(&self, _: WindowHandle) -> String {
                "Unknown".to_string()
            }
            fn window_title(&self, _: WindowHandle) -> String {
                String::new()
            }
            fn visible_rect(&self, _: WindowHandle) -> Rect {
                Rect::default()
            }
            fn executable_path(&self, _: WindowHandle) -> Option<String> {
                None
            }
            fn move_window_compensated(
                &self,
                handle: WindowHandle,
                _: Rect,
            ) -> Result<(), crate::window::WindowError> {
                Err(crate::window::WindowError::WindowGone { handle })
            }
        }

        let ws = Arc::new(SnapshotWindowSystem::new(DesktopSnapshot::default()));
        let mut service = LayoutService::new(
            Config::with_data_dir(dir.path()),
            SnaplockConfig::default(),
            Ports {
                windows: Arc::new(BrokenWindows),
                identity: ws,
                launcher: Arc::new(SystemLauncher),
                thumbnailer: Arc::new(NoopThumbnailer),
            },
            SCREEN,
        );

        let mut ctx = VarContext::new();
        let outcome = service.invoke(&mut ctx, Instant::now());
        assert!(matches!(outcome, InvokeOutcome::Failed { .. }));
        assert_eq!(
            ctx.get_var(ERROR_VAR).as_deref(),
            Some("Failed to enumerate windows: display server gone")
        );
    }

    #[test]
    fn test_toggle_lock_without_session_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (_ws, mut service) = service(&dir, windows());
        let now = Instant::now();

        assert!(matches!(
            service.toggle_lock(h(1), now).unwrap(),
            ToggleOutcome::Locked(_)
        ));
        assert_eq!(service.lock_entries().len(), 1);
        assert!(matches!(
            service.toggle_lock(h(99), now),
            Err(HostError::NotACandidate { .. })
        ));

        let removed = service.remove_lock(0, now).unwrap();
        assert_eq!(removed.process_name, "code");
        assert!(service.lock_entries().is_empty());
    }

    #[test]
    fn test_locked_window_survives_instant_layout() {
        let dir = tempfile::tempdir().unwrap();
        let (ws, mut service) = service(&dir, windows());
        ws.move_window_compensated(h(1), Rect::new(0, 0, 960, 1080)).unwrap();
        service.toggle_lock(h(1), Instant::now()).unwrap();

        let plan = service.instant_layout(&service.candidates().unwrap());
        assert_eq!(plan.rect_for(h(1)), Some(Rect::new(0, 0, 960, 1080)));
        assert_eq!(ws.visible_rect(h(1)), Rect::new(0, 0, 960, 1080));
    }

    #[test]
    fn test_scene_save_and_apply_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (ws, service) = service(&dir, windows());

        let scene = service.save_scene(Some("work")).unwrap();
        assert_eq!(scene.items.len(), 3);
        assert_eq!(service.scenes().len(), 1);

        ws.move_window_compensated(h(1), Rect::new(0, 0, 500, 500)).unwrap();
        let report = service.apply_scene("work").unwrap();
        assert_eq!(report.moved(), 3);
        assert!(report.pending.is_empty());
        assert_eq!(ws.visible_rect(h(1)), Rect::new(100, 100, 800, 600));
        assert!(matches!(report.outcomes[0], ItemOutcome::Moved { .. }));

        assert!(matches!(
            service.apply_scene("missing"),
            Err(HostError::Scene(SceneError::NotFound { .. }))
        ));
        assert!(service.delete_scene("work").unwrap());
        service.clear_scenes().unwrap();
        assert!(service.scenes().is_empty());
    }

    #[test]
    fn test_default_scene_name_used_when_unnamed() {
        let dir = tempfile::tempdir().unwrap();
        let (_ws, service) = service(&dir, windows());
        let scene = service.save_scene(None).unwrap();
        assert!(scene.name.ends_with(" layout"));
    }
}
