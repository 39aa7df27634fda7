//! Process-level entry point.
//!
//! A host (hotkey daemon, launcher script, the CLI) builds one
//! [`LayoutService`] per process and calls [`LayoutService::invoke`] with
//! its variable context each time the user triggers a layout.

pub mod context;
pub mod errors;
pub mod service;

pub use context::{
    AUTO_EXIT_VAR, ERROR_VAR, HostContext, INSTANT_MODE_VAR, InvocationOptions, VarContext,
};
pub use errors::HostError;
pub use service::{InvokeOutcome, LayoutService, Ports};
