//! The evaluator capability.
//!
//! The template core never looks inside directive bodies; it only routes them
//! to an [`Evaluator`]. Blocks go to [`Evaluator::execute`], expressions to
//! [`Evaluator::evaluate`]. Both calls may suspend, and each directive runs to
//! completion before the next one starts.

use async_trait::async_trait;
use serde_json::Value;

use super::context::{Context, Scope, stringify};
use super::error::EvalError;

/// Executes or evaluates directive bodies.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Run a block body for its side effects on `context` and `scope`.
    async fn execute(&self, source: &str, context: &Context, scope: &mut Scope)
    -> Result<(), EvalError>;

    /// Evaluate an expression body. `None` (or JSON null) means "no value".
    async fn evaluate(
        &self,
        source: &str,
        context: &Context,
        scope: &mut Scope,
    ) -> Result<Option<Value>, EvalError>;
}

/// Minimal reference evaluator backing the command line tool.
///
/// Expressions are `+`-separated terms; a term is a quoted string (`'x'` or
/// `"x"`), a JSON scalar, `none`, or a name looked up in the scope and then in
/// the context. A single term yields its value as is; several terms are
/// concatenated as strings.
///
/// Blocks are sequences of `name = expression` lines, assigning into the
/// scope, or `global name = expression` lines, assigning into the context.
/// Lines starting with `#` are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupEvaluator;

impl LookupEvaluator {
    fn term(term: &str, context: &Context, scope: &Scope) -> Result<Value, EvalError> {
        let term = term.trim();
        if term.is_empty() {
            return Err("empty term".into());
        }

        for quote in ['\'', '"'] {
            if term.len() >= 2 && term.starts_with(quote) && term.ends_with(quote) {
                return Ok(Value::String(term[1..term.len() - 1].to_string()));
            }
        }
        if term == "none" {
            return Ok(Value::Null);
        }
        if let Ok(value) = serde_json::from_str::<Value>(term) {
            if !value.is_object() && !value.is_array() {
                return Ok(value);
            }
        }
        if is_identifier(term) {
            return scope
                .get(term)
                .cloned()
                .or_else(|| context.get(term))
                .ok_or_else(|| format!("name '{term}' is not defined").into());
        }

        Err(format!("unsupported term '{term}'").into())
    }

    /// Evaluate an expression against a context and scope.
    ///
    /// # Errors
    ///
    /// Unknown names, malformed terms, or concatenation with none.
    pub fn eval_expression(
        source: &str,
        context: &Context,
        scope: &Scope,
    ) -> Result<Value, EvalError> {
        let terms = split_terms(source)?;
        if let [single] = terms.as_slice() {
            return Self::term(single, context, scope);
        }

        let mut joined = String::new();
        for term in terms {
            match Self::term(term, context, scope)? {
                Value::Null => return Err(format!("cannot concatenate none ('{}')", term.trim()).into()),
                value => joined.push_str(&stringify(&value)),
            }
        }
        Ok(Value::String(joined))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Split on `+` outside of quotes.
fn split_terms(source: &str) -> Result<Vec<&str>, EvalError> {
    let mut terms = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '+') => {
                terms.push(&source[start..i]);
                start = i + 1;
            }
            (None, _) => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated string literal".into());
    }
    terms.push(&source[start..]);
    Ok(terms)
}

#[async_trait]
impl Evaluator for LookupEvaluator {
    async fn execute(
        &self,
        source: &str,
        context: &Context,
        scope: &mut Scope,
    ) -> Result<(), EvalError> {
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (global, assignment) = match line.strip_prefix("global ") {
                Some(rest) => (true, rest),
                None => (false, line),
            };
            let Some((name, expression)) = assignment.split_once('=') else {
                return Err(format!("expected assignment, got '{line}'").into());
            };
            let name = name.trim();
            if !is_identifier(name) {
                return Err(format!("invalid name '{name}'").into());
            }

            let value = Self::eval_expression(expression, context, scope)?;
            if global {
                context.insert(name, value);
            } else {
                scope.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    async fn evaluate(
        &self,
        source: &str,
        context: &Context,
        scope: &mut Scope,
    ) -> Result<Option<Value>, EvalError> {
        match Self::eval_expression(source, context, scope)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }
}
