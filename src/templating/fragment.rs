//! Parsed template fragments.

use std::fmt;

use super::delimiters::{Form, PairKind, Phase};

/// One segment of a parsed template, in render order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain text, emitted verbatim.
    Literal(String),
    /// Delimited content routed to an evaluator.
    Directive(Directive),
}

impl Fragment {
    pub fn literal(text: impl Into<String>) -> Self {
        Fragment::Literal(text.into())
    }

    /// True for directives that must run during `initialize`.
    #[must_use]
    pub fn is_one_time(&self) -> bool {
        matches!(self, Fragment::Directive(d) if d.phase() == Phase::OneTime)
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Fragment::Literal(text) => Some(text),
            Fragment::Directive(_) => None,
        }
    }

    #[must_use]
    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            Fragment::Literal(_) => None,
            Fragment::Directive(directive) => Some(directive),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Literal(text) => f.write_str(text),
            Fragment::Directive(directive) => directive.fmt(f),
        }
    }
}

/// A directive fragment. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    kind: PairKind,
    index: usize,
    source: String,
    original: Option<String>,
    start_tag: String,
    end_tag: String,
}

impl Directive {
    /// Build a directive.
    ///
    /// `source` is the normalized body handed to evaluators, `original` the
    /// raw text between the tags if it is retained, and `index` the 1-based
    /// position among directives of the same kind.
    pub fn new(
        kind: PairKind,
        index: usize,
        source: impl Into<String>,
        original: Option<String>,
        start_tag: impl Into<String>,
        end_tag: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            index,
            source: source.into(),
            original,
            start_tag: start_tag.into(),
            end_tag: end_tag.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PairKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }

    #[must_use]
    pub fn form(&self) -> Form {
        self.kind.form()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The normalized body.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The raw body as written between the tags, if retained.
    #[must_use]
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    #[must_use]
    pub fn start_tag(&self) -> &str {
        &self.start_tag
    }

    #[must_use]
    pub fn end_tag(&self) -> &str {
        &self.end_tag
    }

    /// Diagnostic name, e.g. `render-expression#2`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}#{}", self.kind, self.index)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.original {
            Some(original) => write!(f, "{}{}{}", self.start_tag, original, self.end_tag),
            None => write!(f, "{}\n{}\n{}", self.start_tag, self.source, self.end_tag),
        }
    }
}
