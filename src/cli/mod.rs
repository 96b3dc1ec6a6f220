//! Command-line interface for yatplt.
//!
//! # Commands
//!
//! - `render` - Initialize and render a template file
//! - `check` - Parse a template file and list its fragments
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--config` - Use a specific configuration file (also `YATPLT_CONFIG`)
//!
//! # Examples
//!
//! ```bash
//! yatplt render page.tpl --set title=Home
//! yatplt render page.tpl --output page.html --context site='"docs"'
//! yatplt --verbose check page.tpl --format json
//! ```

mod check;
mod render;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::TemplateConfig;
use crate::core::YatpltError;
use serde_json::Value;

/// Runtime configuration for CLI execution.
///
/// Built from the global flags so that tests can run commands without
/// touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive for the log subscriber. `None` defers to `RUST_LOG`.
    pub log_level: Option<String>,

    /// Explicit configuration file, from `--config` or `YATPLT_CONFIG`.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr log subscriber.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
    }
}

/// Yet another template preprocessor.
#[derive(Parser)]
#[command(
    name = "yatplt",
    about = "Yet another template preprocessor",
    version,
    long_about = "yatplt renders text templates with one-time and per-render directives delimited by paired tags."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging). Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `<config dir>/yatplt/config.toml`. A missing file means
    /// built-in defaults.
    #[arg(short, long, global = true, env = crate::constants::CONFIG_ENV_VAR)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize and render a template.
    ///
    /// See [`render::RenderCommand`] for options.
    Render(render::RenderCommand),

    /// Parse a template and list its fragments without evaluating anything.
    Check(check::CheckCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error; the binary turns it into a user-facing message.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// - `--verbose` logs at `debug`
    /// - `--quiet` logs only errors
    /// - otherwise `RUST_LOG` applies, defaulting to `warn`
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.as_deref().map(expand_path),
        }
    }

    /// Execute with an explicit [`CliConfig`].
    ///
    /// # Errors
    ///
    /// Configuration loading errors and the command's own errors.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let settings = TemplateConfig::load_with_optional(config.config_path).await?;
        tracing::debug!("Using configuration: {:?}", settings);

        match self.command {
            Commands::Render(cmd) => cmd.execute(&settings).await,
            Commands::Check(cmd) => cmd.execute(&settings).await,
        }
    }
}

/// Expand `~` and environment variables in a command-line path.
///
/// Falls back to the literal input if expansion fails.
pub(crate) fn expand_path(input: &str) -> PathBuf {
    match shellexpand::full(input) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            tracing::debug!("Cannot expand {}: {}", input, e);
            PathBuf::from(input)
        }
    }
}

/// Parse a `KEY=VALUE` assignment.
///
/// The value is read as JSON when it parses as JSON, otherwise it is taken
/// as a plain string.
pub(crate) fn parse_assignment(input: &str) -> Result<(String, Value), YatpltError> {
    let Some((key, raw)) = input.split_once('=') else {
        return Err(YatpltError::InvalidAssignment {
            input: input.to_string(),
        });
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(YatpltError::InvalidAssignment {
            input: input.to_string(),
        });
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Parse every assignment into a scope map. Later keys override earlier ones.
pub(crate) fn parse_assignments(inputs: &[String]) -> Result<crate::templating::Scope, YatpltError> {
    inputs.iter().map(|input| parse_assignment(input)).collect()
}
