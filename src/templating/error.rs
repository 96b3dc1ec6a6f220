//! Error types for template parsing and the template lifecycle.
//!
//! Every failure of the parser, the lifecycle state machine and the watched
//! wrapper is a [`TemplateError`]. Errors are surfaced synchronously to the
//! immediate caller; nothing in this crate retries.

use std::path::PathBuf;
use thiserror::Error;

/// Error produced by an [`Evaluator`](super::Evaluator) implementation.
pub type EvalError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while parsing, initializing or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A delimiter pair occurs an unequal number of times.
    #[error("{start} and {end} tags count mismatch: {starts} != {ends}")]
    TagCountMismatch {
        start: String,
        end: String,
        starts: usize,
        ends: usize,
    },

    /// A tag appears where the strict open/close alternation forbids it.
    #[error("Unmatched {tag} tag at offset {offset}{}", open_suffix(.open))]
    UnmatchedTag {
        tag: String,
        offset: usize,
        /// The tag that was open at that point, with its offset.
        open: Option<(String, usize)>,
    },

    /// Directive lines are indented less than its first line.
    #[error(
        "Inconsistent indentation in {fragment}: line {line} is indented {found}, expected at least {expected}"
    )]
    Indentation {
        fragment: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The delimiter configuration cannot be used for parsing.
    #[error("Invalid delimiter configuration: {reason}")]
    InvalidDelimiters { reason: String },

    #[error("Template already initialized")]
    AlreadyInitialized,

    #[error("Template not initialized")]
    NotInitialized,

    /// An expression evaluated to none while none results are not allowed.
    #[error("Expression returned none at {fragment}")]
    NullResult { fragment: String },

    /// A fragment of a kind that is not valid at this point of the lifecycle.
    #[error("Unexpected fragment {fragment} during {stage}")]
    UnexpectedFragment { fragment: String, stage: &'static str },

    /// The evaluator failed on a directive.
    #[error("Evaluation failed at {fragment}: {source}")]
    Evaluation {
        fragment: String,
        #[source]
        source: EvalError,
    },

    /// A watched template was rendered before it was ever loaded.
    #[error("Template {} has not been loaded", .path.display())]
    NotLoaded { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn open_suffix(open: &Option<(String, usize)>) -> String {
    match open {
        Some((tag, offset)) => format!(" (while {tag} opened at offset {offset} is unclosed)"),
        None => String::new(),
    }
}

impl TemplateError {
    /// True for both flavours of tag mismatch: unequal counts and illegal nesting.
    #[must_use]
    pub const fn is_tag_mismatch(&self) -> bool {
        matches!(self, Self::TagCountMismatch { .. } | Self::UnmatchedTag { .. })
    }

    /// True if the error was raised while parsing the source text.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::TagCountMismatch { .. }
                | Self::UnmatchedTag { .. }
                | Self::Indentation { .. }
                | Self::InvalidDelimiters { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_message_names_pair() {
        let err = TemplateError::TagCountMismatch {
            start: "{{%".into(),
            end: "%}}".into(),
            starts: 2,
            ends: 1,
        };
        assert_eq!(err.to_string(), "{{% and %}} tags count mismatch: 2 != 1");
        assert!(err.is_tag_mismatch());
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_unmatched_message_mentions_open_tag() {
        let err = TemplateError::UnmatchedTag {
            tag: "{{%".into(),
            offset: 7,
            open: Some(("{{!".into(), 0)),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Unmatched {{% tag at offset 7"));
        assert!(msg.contains("{{! opened at offset 0"));
    }

    #[test]
    fn test_evaluation_error_keeps_source() {
        use std::error::Error as _;

        let err = TemplateError::Evaluation {
            fragment: "render-block#1".into(),
            source: "boom".into(),
        };
        assert!(!err.is_tag_mismatch());
        assert_eq!(err.source().map(ToString::to_string), Some("boom".to_string()));
    }
}
