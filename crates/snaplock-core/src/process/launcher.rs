use std::process::{Command, Stdio};

use tracing::{info, warn};

use super::errors::LaunchError;
use crate::identity::{AppClasses, WindowRecord};

/// Starts an executable without waiting for it.
pub trait Launcher: Send + Sync {
    fn launch(&self, exec_path: &str, args: &[String]) -> Result<(), LaunchError>;
}

/// Arguments that reopen `record` where it was: a browser window on its URL
/// or a folder browser on its folder. Other apps start bare.
pub fn launch_args(record: &WindowRecord, classes: &AppClasses) -> Vec<String> {
    if record.url.is_empty() {
        return Vec::new();
    }
    if classes.is_browser(&record.process_name) {
        return vec!["--new-window".to_string(), record.url.clone()];
    }
    if classes.is_folder_browser(&record.process_name) {
        return vec![record.url.clone()];
    }
    Vec::new()
}

/// Spawns detached child processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, exec_path: &str, args: &[String]) -> Result<(), LaunchError> {
        if exec_path.trim().is_empty() {
            return Err(LaunchError::MissingPath);
        }

        match Command::new(exec_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                info!(
                    event = "core.process.launch_completed",
                    exec_path = exec_path,
                    pid = child.id()
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    event = "core.process.launch_failed",
                    exec_path = exec_path,
                    error = %e
                );
                Err(LaunchError::SpawnFailed {
                    exec_path: exec_path.to_string(),
                    source: e,
                })
            }
        }
    }
}
