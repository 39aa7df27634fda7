//! Window platform ports.
//!
//! The core never talks to a windowing API directly. Enumeration, geometry,
//! moves, and the accessibility read of a browser address bar or folder path
//! all sit behind [`WindowSystem`] and [`IdentityTextSource`]. Platform
//! adapters implement them; [`SnapshotWindowSystem`] implements both over a
//! JSON description of the desktop and backs the CLI and the tests.

pub mod errors;
pub mod filter;
pub mod frame;
pub mod ports;
pub mod snapshot;
pub mod types;

pub use errors::WindowError;
pub use filter::{FilterRules, filter_candidates};
pub use frame::{FrameInsets, compensated_target};
pub use ports::{IdentityTextSource, WindowSystem};
pub use snapshot::{DesktopSnapshot, SnapshotWindowSystem};
pub use types::{WindowHandle, WindowState};
