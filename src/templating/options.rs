//! Options for `initialize` and `render` calls.

use serde::{Deserialize, Serialize};

/// Options for [`Template::initialize`](super::Template::initialize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Trim stringified expression results; results that become empty are dropped.
    pub strip_result: bool,
    /// Drop none results instead of failing with `NullResult`.
    pub allow_none: bool,
    /// Hand blocks the caller's scope itself instead of a fresh copy.
    /// Expressions always receive a copy.
    pub reuse_scope: bool,
    /// Succeed without doing anything if the template is already initialized.
    pub allow_already_initialized: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            strip_result: true,
            allow_none: false,
            reuse_scope: true,
            allow_already_initialized: false,
        }
    }
}

impl InitOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strip_result(mut self, strip: bool) -> Self {
        self.strip_result = strip;
        self
    }

    #[must_use]
    pub fn allow_none(mut self, allow: bool) -> Self {
        self.allow_none = allow;
        self
    }

    #[must_use]
    pub fn reuse_scope(mut self, reuse: bool) -> Self {
        self.reuse_scope = reuse;
        self
    }

    #[must_use]
    pub fn allow_already_initialized(mut self, allow: bool) -> Self {
        self.allow_already_initialized = allow;
        self
    }

    pub(crate) fn render_options(self) -> RenderOptions {
        RenderOptions {
            strip_result: self.strip_result,
            allow_none: self.allow_none,
            reuse_scope: self.reuse_scope,
        }
    }
}

/// Options for the render family of calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Trim stringified expression results; results that become empty are dropped.
    pub strip_result: bool,
    /// Drop none results instead of failing with `NullResult`.
    pub allow_none: bool,
    /// Hand blocks the caller's scope itself instead of a fresh copy.
    /// Expressions always receive a copy.
    pub reuse_scope: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strip_result: true,
            allow_none: false,
            reuse_scope: true,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strip_result(mut self, strip: bool) -> Self {
        self.strip_result = strip;
        self
    }

    #[must_use]
    pub fn allow_none(mut self, allow: bool) -> Self {
        self.allow_none = allow;
        self
    }

    #[must_use]
    pub fn reuse_scope(mut self, reuse: bool) -> Self {
        self.reuse_scope = reuse;
        self
    }

    /// Matching initialization options, with `allow_already_initialized` off.
    #[must_use]
    pub fn init_options(self) -> InitOptions {
        InitOptions {
            strip_result: self.strip_result,
            allow_none: self.allow_none,
            reuse_scope: self.reuse_scope,
            allow_already_initialized: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let init = InitOptions::default();
        assert!(init.strip_result && init.reuse_scope);
        assert!(!init.allow_none && !init.allow_already_initialized);
        assert_eq!(init.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_builders_round_trip() {
        let render = RenderOptions::new().strip_result(false).allow_none(true).reuse_scope(false);
        let init = render.init_options().allow_already_initialized(true);
        assert!(!init.strip_result && init.allow_none && !init.reuse_scope);
        assert_eq!(init.render_options(), render);
    }
}
