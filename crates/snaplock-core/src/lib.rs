//! snaplock-core: gap-filling window tiling with locks and scenes
//!
//! This library holds all layout logic. Platform adapters plug in through
//! the traits in [`window`] and [`process`]; the CLI drives it against a
//! JSON desktop snapshot.
//!
//! # Main Entry Points
//!
//! - [`host`] - The per-process [`LayoutService`] and host invocation
//! - [`layout`] - Gap packing and interactive layout sessions
//! - [`identity`] - Window fingerprints and matching
//! - [`locks`] - Persisted window locks
//! - [`scenes`] - Saved arrangements and restore
//! - [`config`] - Configuration management

pub mod blacklist;
pub mod config;
pub mod errors;
pub mod events;
pub mod geometry;
pub mod host;
pub mod identity;
pub mod layout;
pub mod locks;
pub mod logging;
pub mod process;
pub mod scenes;
pub mod window;

// Re-export commonly used types at crate root for convenience
pub use blacklist::Blacklist;
pub use config::{Config, SnaplockConfig};
pub use errors::SnaplockError;
pub use geometry::Rect;
pub use host::{HostContext, HostError, InvocationOptions, InvokeOutcome, LayoutService, Ports};
pub use identity::{AppClasses, Fingerprint, IdentityMatcher, LockEntry, SceneItem, WindowRecord};
pub use layout::{GapPacker, LayoutPlan, LayoutSession, Placement};
pub use locks::{LockStore, ToggleOutcome};
pub use process::{Launcher, SystemLauncher};
pub use scenes::{ItemOutcome, RestoreReport, RetryOutcome, Scene, SceneRestorer, SceneStore};
pub use window::{
    DesktopSnapshot, IdentityTextSource, SnapshotWindowSystem, WindowHandle, WindowState,
    WindowSystem,
};

// Re-export logging initialization
pub use logging::init_logging;
