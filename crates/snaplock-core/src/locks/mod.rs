//! Persisted window locks.
//!
//! A lock pins every window matching a captured identity to a fixed rect.
//! Locks live in a line-oriented text file under the data directory and are
//! written back through a debounce so dragging a locked window does not hit
//! the disk on every move event.

pub mod debounce;
pub mod errors;
pub mod persistence;
pub mod store;

pub use debounce::SaveDebouncer;
pub use errors::LockError;
pub use persistence::{format_line, load_locks, parse_line, save_locks};
pub use store::{LockResolution, LockStore, ToggleOutcome};
