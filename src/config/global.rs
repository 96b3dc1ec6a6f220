//! User configuration for yatplt.
//!
//! The configuration file sets the parser options, the default render
//! options, and any custom delimiters. Every key is optional.
//!
//! # Configuration File Location
//!
//! - **Linux**: `~/.config/yatplt/config.toml`
//! - **macOS**: `~/Library/Application Support/yatplt/config.toml`
//! - **Windows**: `%APPDATA%\yatplt\config.toml`
//!
//! The location can be overridden with `--config` or the `YATPLT_CONFIG`
//! environment variable.
//!
//! # File Format
//!
//! ```toml
//! strip_literal_text = true
//! retain_source_text = true
//!
//! [render]
//! strip_result = true
//! allow_none = false
//! reuse_scope = true
//!
//! # Any of: one_time_block, one_time_expression, comment, block, expression
//! [delimiters.expression]
//! start = "<%="
//! end = "%>"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::core::YatpltError;
use crate::templating::{Delimiters, InitOptions, RenderOptions, TemplateParser};

/// Parser and render settings loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Trim literal text and drop literals that become empty.
    pub strip_literal_text: bool,

    /// Keep the raw text of each directive for display.
    pub retain_source_text: bool,

    /// Default options for render calls, also used for initialization.
    pub render: RenderOptions,

    pub delimiters: Delimiters,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            strip_literal_text: true,
            retain_source_text: true,
            render: RenderOptions::default(),
            delimiters: Delimiters::default(),
        }
    }
}

impl TemplateConfig {
    /// Load from the default location, or return defaults if there is no file there.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from [`TemplateConfig::default_path`].
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML syntax
    /// - The delimiters it configures are unusable
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("No default config location: {}", e);
                    return Ok(Self::default());
                }
            },
        };
        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// ```rust,no_run
    /// use yatplt::config::TemplateConfig;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = TemplateConfig::load_from(Path::new("/etc/yatplt.toml")).await?;
    /// let parser = config.parser()?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// configures unusable delimiters.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if let Err(e) = config.delimiters.validate() {
            return Err(YatpltError::ConfigParse {
                context: format!("Invalid config in {}", path.display()),
                reason: e.to_string(),
            }
            .into());
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Platform config directory joined with `yatplt/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine config directory"))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// A parser using the configured delimiters and parser options.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidDelimiters`](crate::templating::TemplateError::InvalidDelimiters)
    /// if the delimiters cannot be used.
    pub fn parser(&self) -> Result<TemplateParser, crate::templating::TemplateError> {
        self.delimiters.validate()?;
        Ok(TemplateParser::new()
            .with_delimiters(self.delimiters.clone())
            .with_strip_literal_text(self.strip_literal_text)
            .with_retain_source_text(self.retain_source_text))
    }

    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        self.render
    }

    /// Initialization options matching the render options.
    #[must_use]
    pub fn init_options(&self) -> InitOptions {
        self.render.init_options()
    }
}
