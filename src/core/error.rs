//! Error handling for yatplt
//!
//! Library code returns the strongly-typed [`TemplateError`]. The command-line
//! layer works with [`anyhow::Error`] and, right before exiting, converts
//! whatever went wrong into an [`ErrorContext`]: the error itself plus
//! optional details and an actionable suggestion, printed in color.
//!
//! # Examples
//!
//! ```rust,no_run
//! use yatplt::core::user_friendly_error;
//! use yatplt::templating::TemplateError;
//!
//! let error = anyhow::Error::from(TemplateError::NotInitialized);
//! let ctx = user_friendly_error(error);
//! ctx.display(); // error, details and suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::TemplateError;

/// Errors surfaced by the yatplt command-line tool.
#[derive(Error, Debug)]
pub enum YatpltError {
    /// Parsing, initializing or rendering a template failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The configuration file could not be parsed or holds invalid values.
    #[error("{context}: {reason}")]
    ConfigParse { context: String, reason: String },

    /// A `KEY=VALUE` command-line assignment is malformed.
    #[error("Invalid assignment '{input}': expected KEY=VALUE")]
    InvalidAssignment { input: String },

    #[error("Permission denied: {context}")]
    PermissionDenied { context: String },

    #[error("File not found: {context}")]
    FileNotFound { context: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Other { message: String },
}

/// An error with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: YatpltError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: YatpltError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error. Displayed in green.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error. Displayed in yellow.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// Recognizes [`YatpltError`], [`TemplateError`], [`std::io::Error`] and
/// [`toml::de::Error`] anywhere in the chain. Anything else is reported with
/// its full context chain as the message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<YatpltError>() {
        Ok(e) => return create_error_context(e),
        Err(e) => e,
    };

    let error = match error.downcast::<TemplateError>() {
        Ok(e) => return create_error_context(YatpltError::Template(e)),
        Err(e) => e,
    };

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(YatpltError::ConfigParse {
            context: error.to_string(),
            reason: toml_error.message().to_string(),
        })
        .with_suggestion("Check the TOML syntax of the configuration file")
        .with_details("Configuration keys: strip_literal_text, retain_source_text, [render], [delimiters.<pair>]");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let context = error.to_string();
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(YatpltError::PermissionDenied { context })
                    .with_suggestion("Check the file permissions and ownership")
                    .with_details(io_error.to_string());
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(YatpltError::FileNotFound { context })
                    .with_suggestion("Check that the file exists and the path is correct")
                    .with_details(io_error.to_string());
            }
            _ => {}
        }
    }

    ErrorContext::new(YatpltError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: YatpltError) -> ErrorContext {
    match error {
        YatpltError::Template(template_error) => template_error_context(template_error),
        YatpltError::Io(io_error) => io_error_context(io_error),
        YatpltError::ConfigParse { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the configuration file or pass another one with --config"),
        YatpltError::InvalidAssignment { .. } => ErrorContext::new(error)
            .with_suggestion("Use --set name=value; the value is read as JSON, or as a plain string")
            .with_details("Example: --set title=Home --set count=3 --set tags='[\"a\",\"b\"]'"),
        _ => ErrorContext::new(error),
    }
}

fn io_error_context(io_error: std::io::Error) -> ErrorContext {
    let suggestion = match io_error.kind() {
        std::io::ErrorKind::NotFound => Some("Check that the file exists and the path is correct"),
        std::io::ErrorKind::PermissionDenied => Some("Check the file permissions and ownership"),
        _ => None,
    };
    let ctx = ErrorContext::new(YatpltError::Io(io_error));
    match suggestion {
        Some(suggestion) => ctx.with_suggestion(suggestion),
        None => ctx,
    }
}

fn template_error_context(error: TemplateError) -> ErrorContext {
    match error {
        TemplateError::Io(io_error) => io_error_context(io_error),
        TemplateError::TagCountMismatch { .. } | TemplateError::UnmatchedTag { .. } => {
            ErrorContext::new(YatpltError::Template(error))
                .with_suggestion("Close every directive before opening the next one")
                .with_details("Directive tags cannot be nested or interleaved, and every start tag needs its own end tag")
        }
        TemplateError::Indentation { .. } => ErrorContext::new(YatpltError::Template(error))
            .with_suggestion("Indent every line of a directive body at least as deep as its first line"),
        TemplateError::InvalidDelimiters { .. } => ErrorContext::new(YatpltError::Template(error))
            .with_suggestion("Check the [delimiters] section of your configuration file")
            .with_details("Delimiters must be non-empty and all ten start/end tags must be distinct"),
        TemplateError::NullResult { .. } => ErrorContext::new(YatpltError::Template(error))
            .with_suggestion("Make sure the expression yields a value, or pass --allow-none to skip it"),
        TemplateError::Evaluation { .. } => {
            let details = std::error::Error::source(&error).map(ToString::to_string);
            let ctx = ErrorContext::new(YatpltError::Template(error)).with_suggestion(
                "Check the directive body; every name it uses must be defined in the scope or the context",
            );
            match details {
                Some(details) => ctx.with_details(details),
                None => ctx,
            }
        }
        other => ErrorContext::new(YatpltError::Template(other)),
    }
}
