//! Delimiter configuration and directive classification.
//!
//! A template recognizes five delimiter pairs. Four of them open directives
//! ([`PairKind`]); the fifth marks comments, which are stripped before any
//! directive is matched and never become fragments.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::TemplateError;
use crate::constants;

/// When a directive runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Runs once during `initialize` and is then removed or replaced.
    OneTime,
    /// Runs on every render call.
    Render,
}

/// What a directive produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Form {
    /// Executed for side effects; yields no output.
    Block,
    /// Evaluated; its stringified result is emitted.
    Expression,
}

/// The four directive-opening delimiter pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairKind {
    OneTimeBlock,
    OneTimeExpression,
    Block,
    Expression,
}

impl PairKind {
    /// All directive pairs, in tie-breaking order for the tag matcher.
    pub const ALL: [PairKind; 4] = [
        PairKind::OneTimeBlock,
        PairKind::OneTimeExpression,
        PairKind::Block,
        PairKind::Expression,
    ];

    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            PairKind::OneTimeBlock | PairKind::OneTimeExpression => Phase::OneTime,
            PairKind::Block | PairKind::Expression => Phase::Render,
        }
    }

    #[must_use]
    pub const fn form(self) -> Form {
        match self {
            PairKind::OneTimeBlock | PairKind::Block => Form::Block,
            PairKind::OneTimeExpression | PairKind::Expression => Form::Expression,
        }
    }

    /// Stable kebab-case name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PairKind::OneTimeBlock => "one-time-block",
            PairKind::OneTimeExpression => "one-time-expression",
            PairKind::Block => "render-block",
            PairKind::Expression => "render-expression",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            PairKind::OneTimeBlock => 0,
            PairKind::OneTimeExpression => 1,
            PairKind::Block => 2,
            PairKind::Expression => 3,
        }
    }
}

impl fmt::Display for PairKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A start/end literal pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimiterPair {
    pub start: String,
    pub end: String,
}

impl DelimiterPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// The full set of delimiter literals used by a parser.
///
/// Deserializes from a partial table: pairs that are not mentioned keep
/// their defaults.
///
/// ```toml
/// [delimiters.expression]
/// start = "<%="
/// end = "%>"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    pub one_time_block: DelimiterPair,
    pub one_time_expression: DelimiterPair,
    pub comment: DelimiterPair,
    pub block: DelimiterPair,
    pub expression: DelimiterPair,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            one_time_block: DelimiterPair::new(
                constants::ONE_TIME_BLOCK_START,
                constants::ONE_TIME_BLOCK_END,
            ),
            one_time_expression: DelimiterPair::new(
                constants::ONE_TIME_EXPRESSION_START,
                constants::ONE_TIME_EXPRESSION_END,
            ),
            comment: DelimiterPair::new(constants::COMMENT_START, constants::COMMENT_END),
            block: DelimiterPair::new(constants::BLOCK_START, constants::BLOCK_END),
            expression: DelimiterPair::new(constants::EXPRESSION_START, constants::EXPRESSION_END),
        }
    }
}

impl Delimiters {
    /// Literals for one of the directive pairs.
    #[must_use]
    pub fn pair(&self, kind: PairKind) -> &DelimiterPair {
        match kind {
            PairKind::OneTimeBlock => &self.one_time_block,
            PairKind::OneTimeExpression => &self.one_time_expression,
            PairKind::Block => &self.block,
            PairKind::Expression => &self.expression,
        }
    }

    /// Replace the literals of one directive pair.
    #[must_use]
    pub fn with_pair(mut self, kind: PairKind, pair: DelimiterPair) -> Self {
        match kind {
            PairKind::OneTimeBlock => self.one_time_block = pair,
            PairKind::OneTimeExpression => self.one_time_expression = pair,
            PairKind::Block => self.block = pair,
            PairKind::Expression => self.expression = pair,
        }
        self
    }

    /// Replace the comment literals.
    #[must_use]
    pub fn with_comment(mut self, pair: DelimiterPair) -> Self {
        self.comment = pair;
        self
    }

    fn literals(&self) -> [(&'static str, &str); 10] {
        [
            ("one_time_block.start", &self.one_time_block.start),
            ("one_time_block.end", &self.one_time_block.end),
            ("one_time_expression.start", &self.one_time_expression.start),
            ("one_time_expression.end", &self.one_time_expression.end),
            ("comment.start", &self.comment.start),
            ("comment.end", &self.comment.end),
            ("block.start", &self.block.start),
            ("block.end", &self.block.end),
            ("expression.start", &self.expression.start),
            ("expression.end", &self.expression.end),
        ]
    }

    /// Check that every literal is non-empty and that no two literals are equal.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::InvalidDelimiters`] naming the offending entries.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let literals = self.literals();

        for (name, literal) in &literals {
            if literal.is_empty() {
                return Err(TemplateError::InvalidDelimiters {
                    reason: format!("{name} must not be empty"),
                });
            }
        }

        for (i, (name, literal)) in literals.iter().enumerate() {
            if let Some((other, _)) = literals[i + 1..].iter().find(|(_, l)| l == literal) {
                return Err(TemplateError::InvalidDelimiters {
                    reason: format!("{name} and {other} are both '{literal}'"),
                });
            }
        }

        Ok(())
    }
}
