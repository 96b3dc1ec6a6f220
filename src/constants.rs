//! Global constants used throughout the yatplt codebase.
//!
//! This module contains the default delimiter literals, configuration file
//! locations and environment variable names. Defining them centrally keeps
//! the parser, the configuration loader and the CLI in agreement.

/// Start of a one-time block, executed once during `initialize` and removed.
pub const ONE_TIME_BLOCK_START: &str = "{1{!";

/// End of a one-time block.
pub const ONE_TIME_BLOCK_END: &str = "!}1}";

/// Start of a one-time expression, evaluated once during `initialize`.
///
/// The stringified result replaces the directive in the fragment sequence.
pub const ONE_TIME_EXPRESSION_START: &str = "{1{%";

/// End of a one-time expression.
pub const ONE_TIME_EXPRESSION_END: &str = "%}1}";

/// Start of a comment region. Comments are removed, content included,
/// before any other tag is recognized.
pub const COMMENT_START: &str = "{{#";

/// End of a comment region.
pub const COMMENT_END: &str = "#}}";

/// Start of a render block, executed on every render and producing no output.
pub const BLOCK_START: &str = "{{!";

/// End of a render block.
pub const BLOCK_END: &str = "!}}";

/// Start of a render expression, evaluated on every render.
pub const EXPRESSION_START: &str = "{{%";

/// End of a render expression.
pub const EXPRESSION_END: &str = "%}}";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "yatplt";

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "YATPLT_CONFIG";

/// Maximum number of characters shown for a fragment preview by `check`.
pub const FRAGMENT_PREVIEW_CHARS: usize = 40;
