//! Scene reconciliation.
//!
//! Each scene item is matched against the live windows once. Matches are
//! moved into place immediately. Items whose app is not running are
//! relaunched and handed to a [`RetryTask`] that polls for the new window.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::types::Scene;
use crate::config::RestoreConfig;
use crate::identity::{IdentityMatcher, SceneItem};
use crate::process::{Launcher, launch_args};
use crate::window::WindowHandle;

// Granularity of cancellation checks while a retry task waits.
const CANCEL_POLL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RestoreConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RestoreConfig) -> Self {
        Self {
            attempts: config.retry_attempts(),
            interval: Duration::from_millis(config.retry_interval_ms()),
        }
    }
}

/// What happened to one scene item during [`SceneRestorer::apply_scene`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Moved { handle: WindowHandle },
    MoveFailed { handle: WindowHandle, message: String },
    /// Launched; a retry task is waiting for its window.
    Relaunched,
    LaunchFailed { message: String },
    /// No live window and nothing to launch.
    NotFound,
}

impl ItemOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ItemOutcome::MoveFailed { .. } | ItemOutcome::LaunchFailed { .. } | ItemOutcome::NotFound
        )
    }
}

/// Final state of a [`RetryTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Placed { handle: WindowHandle, attempts: u32 },
    MoveFailed { handle: WindowHandle, attempts: u32 },
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
    /// The worker thread panicked.
    Aborted,
}

/// Background poll for one relaunched scene item.
///
/// Owns its attempt budget and cancellation flag. Dropping the task detaches
/// the worker; it keeps polling until it succeeds or runs out of attempts.
pub struct RetryTask {
    item: SceneItem,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<RetryOutcome>,
}

impl RetryTask {
    pub fn spawn(item: SceneItem, matcher: IdentityMatcher, policy: RetryPolicy) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = {
            let item = item.clone();
            let cancel = cancel.clone();
            thread::spawn(move || run_retry(&item, &matcher, policy, &cancel))
        };
        Self {
            item,
            cancel,
            worker,
        }
    }

    pub fn item(&self) -> &SceneItem {
        &self.item
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Block until the worker stops.
    pub fn join(self) -> RetryOutcome {
        self.worker.join().unwrap_or_else(|_| {
            warn!(
                event = "core.scene.retry_worker_panicked",
                process = %self.item.process_name
            );
            RetryOutcome::Aborted
        })
    }
}

/// Sleep for `total`, waking early when cancelled. Returns true on cancel.
fn wait_or_cancel(cancel: &AtomicBool, total: Duration) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        thread::sleep(CANCEL_POLL.min(deadline - now));
    }
}

fn run_retry(
    item: &SceneItem,
    matcher: &IdentityMatcher,
    policy: RetryPolicy,
    cancel: &AtomicBool,
) -> RetryOutcome {
    for attempt in 1..=policy.attempts {
        if wait_or_cancel(cancel, policy.interval) {
            info!(
                event = "core.scene.retry_cancelled",
                process = %item.process_name,
                attempts = attempt - 1
            );
            return RetryOutcome::Cancelled {
                attempts: attempt - 1,
            };
        }

        let handles = match matcher.windows().enumerate_candidate_windows() {
            Ok(handles) => handles,
            Err(e) => {
                debug!(event = "core.scene.retry_enumeration_failed", error = %e);
                continue;
            }
        };

        let Some(handle) = matcher.find_match(&handles, item) else {
            continue;
        };

        return match matcher.windows().move_window_compensated(handle, item.rect) {
            Ok(()) => {
                info!(
                    event = "core.scene.retry_placed",
                    process = %item.process_name,
                    handle = %handle,
                    attempts = attempt
                );
                RetryOutcome::Placed {
                    handle,
                    attempts: attempt,
                }
            }
            Err(e) => {
                warn!(
                    event = "core.scene.retry_move_failed",
                    process = %item.process_name,
                    handle = %handle,
                    error = %e
                );
                RetryOutcome::MoveFailed {
                    handle,
                    attempts: attempt,
                }
            }
        };
    }

    info!(
        event = "core.scene.retry_exhausted",
        process = %item.process_name,
        attempts = policy.attempts,
        message = "Relaunched window never appeared"
    );
    RetryOutcome::Exhausted {
        attempts: policy.attempts,
    }
}

/// Every retry task started by one `apply_scene` call.
#[derive(Default)]
pub struct PendingRestores {
    tasks: Vec<RetryTask>,
}

impl PendingRestores {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[RetryTask] {
        &self.tasks
    }

    pub fn cancel_all(&self) {
        for task in &self.tasks {
            task.cancel();
        }
    }

    /// Block until every task stops; outcomes are in task order.
    pub fn wait(self) -> Vec<RetryOutcome> {
        self.tasks.into_iter().map(RetryTask::join).collect()
    }
}

/// Per-item result of applying a scene.
pub struct RestoreReport {
    pub scene: String,
    /// One outcome per scene item, in item order.
    pub outcomes: Vec<ItemOutcome>,
    pub pending: PendingRestores,
}

impl RestoreReport {
    pub fn moved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Moved { .. }))
            .count()
    }

    pub fn relaunched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ItemOutcome::Relaunched))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}

pub struct SceneRestorer {
    matcher: IdentityMatcher,
    launcher: Arc<dyn Launcher>,
    policy: RetryPolicy,
}

impl SceneRestorer {
    pub fn new(matcher: IdentityMatcher, launcher: Arc<dyn Launcher>, policy: RetryPolicy) -> Self {
        Self {
            matcher,
            launcher,
            policy,
        }
    }

    /// Move matched windows, relaunch missing ones, and report per item.
    ///
    /// A live window is not reserved once matched, so two items that match
    /// the same window both move it. Never fails as a whole.
    pub fn apply_scene(&self, scene: &Scene) -> RestoreReport {
        info!(
            event = "core.scene.apply_started",
            name = %scene.name,
            items = scene.items.len()
        );

        let windows = self.matcher.windows();
        let handles = match windows.enumerate_candidate_windows() {
            Ok(handles) => handles,
            Err(e) => {
                warn!(event = "core.scene.enumeration_failed", error = %e);
                Vec::new()
            }
        };

        let mut outcomes = Vec::with_capacity(scene.items.len());
        let mut pending = PendingRestores::default();

        for item in &scene.items {
            let outcome = if let Some(handle) = self.matcher.find_match(&handles, item) {
                match windows.move_window_compensated(handle, item.rect) {
                    Ok(()) => ItemOutcome::Moved { handle },
                    Err(e) => {
                        warn!(
                            event = "core.scene.move_failed",
                            handle = %handle,
                            error = %e
                        );
                        ItemOutcome::MoveFailed {
                            handle,
                            message: e.to_string(),
                        }
                    }
                }
            } else if !item.exec_path.is_empty() {
                let args = launch_args(item, self.matcher.classes());
                match self.launcher.launch(&item.exec_path, &args) {
                    Ok(()) => {
                        pending.tasks.push(RetryTask::spawn(
                            item.clone(),
                            self.matcher.clone(),
                            self.policy,
                        ));
                        ItemOutcome::Relaunched
                    }
                    Err(e) => {
                        warn!(
                            event = "core.scene.launch_failed",
                            exec_path = %item.exec_path,
                            error = %e
                        );
                        ItemOutcome::LaunchFailed {
                            message: e.to_string(),
                        }
                    }
                }
            } else {
                debug!(
                    event = "core.scene.item_not_found",
                    fingerprint = %item.fingerprint()
                );
                ItemOutcome::NotFound
            };
            outcomes.push(outcome);
        }

        let report = RestoreReport {
            scene: scene.name.clone(),
            outcomes,
            pending,
        };
        info!(
            event = "core.scene.apply_completed",
            name = %scene.name,
            moved = report.moved(),
            relaunched = report.relaunched(),
            failed = report.failed()
        );
        report
    }
}
