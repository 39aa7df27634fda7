//! Tiling: the gap packer and the interactive layout session built on it.

pub mod packer;
pub mod session;
pub mod types;

pub use packer::{GapPacker, split_until, subtract_rect};
pub use session::LayoutSession;
pub use types::{LayoutPlan, Placement};
