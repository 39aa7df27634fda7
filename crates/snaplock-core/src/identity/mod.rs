//! Stable window identity.
//!
//! A window's native handle changes across restarts, so locks and scenes
//! refer to windows by [`Fingerprint`]: the owning process name plus a match
//! key derived from the browser domain or the cleaned title.

pub mod matcher;
pub mod title;
pub mod types;

pub use matcher::{IdentityMatcher, extract_host, normalize_browser_url};
pub use title::clean_title;
pub use types::{AppClasses, Fingerprint, LockEntry, SceneItem, WindowRecord};
