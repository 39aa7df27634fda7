//! Relaunching applications for scene restore.

pub mod errors;
pub mod launcher;

pub use errors::LaunchError;
pub use launcher::{Launcher, SystemLauncher, launch_args};
