//! Configuration management for yatplt
//!
//! yatplt reads a single optional TOML file holding parser options, default
//! render options and custom delimiters. See [`global`] for the file format
//! and its location.
//!
//! # Precedence
//!
//! 1. `--config PATH` on the command line
//! 2. The `YATPLT_CONFIG` environment variable
//! 3. The platform default, `<config dir>/yatplt/config.toml`
//! 4. Built-in defaults when no file exists
//!
//! Command-line flags such as `--no-strip` are applied on top of the loaded
//! configuration.

pub mod global;

pub use global::TemplateConfig;
