use std::collections::HashMap;

pub const INSTANT_MODE_VAR: &str = "instantMode";
pub const AUTO_EXIT_VAR: &str = "autoExitSeconds";
pub const ERROR_VAR: &str = "errMessage";

/// Named string variables shared with the host.
pub trait HostContext {
    fn get_var(&self, name: &str) -> Option<String>;
    fn set_var(&mut self, name: &str, value: &str);
}

/// In-memory [`HostContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarContext {
    vars: HashMap<String, String>,
}

impl VarContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.set_var(name, value);
        self
    }
}

impl HostContext for VarContext {
    fn get_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set_var(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvocationOptions {
    pub instant_mode: bool,
    /// Idle seconds before an interactive session closes itself; 0 disables.
    pub auto_exit_seconds: u64,
}

impl InvocationOptions {
    /// `instantMode` is on only for a case-insensitive `"true"`.
    /// `autoExitSeconds` falls back to 0 when missing or not an integer.
    pub fn from_context(ctx: &dyn HostContext) -> Self {
        let instant_mode = ctx
            .get_var(INSTANT_MODE_VAR)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        let auto_exit_seconds = ctx
            .get_var(AUTO_EXIT_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Self {
            instant_mode,
            auto_exit_seconds,
        }
    }
}
