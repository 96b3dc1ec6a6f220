//! Fragment classification.
//!
//! Turns the comment-free text and its matched tags into the ordered fragment
//! sequence: literal gaps become [`Fragment::Literal`], matched pairs become
//! [`Fragment::Directive`] with normalized bodies.

use super::delimiters::{Delimiters, PairKind};
use super::error::TemplateError;
use super::fragment::{Directive, Fragment};
use super::indent::normalize_indentation;
use super::matcher::TagMatch;

/// Options controlling how fragments are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Trim literal text and drop literals that become empty.
    pub strip_literal_text: bool,
    /// Keep the raw directive body for printing.
    pub retain_source_text: bool,
}

fn push_literal(fragments: &mut Vec<Fragment>, text: &str, strip: bool) {
    let text = if strip { text.trim() } else { text };
    if !text.is_empty() {
        fragments.push(Fragment::literal(text));
    }
}

/// Build the fragment sequence for `text` from its tag matches.
///
/// Directives whose body is blank are dropped without a trace; this is the
/// way to write a no-op block.
///
/// # Errors
///
/// [`TemplateError::Indentation`] if a directive body is inconsistently indented.
pub fn classify(
    text: &str,
    matches: &[TagMatch],
    delimiters: &Delimiters,
    options: ClassifyOptions,
) -> Result<Vec<Fragment>, TemplateError> {
    if matches.is_empty() {
        let body = if options.strip_literal_text { text.trim() } else { text };
        return Ok(vec![Fragment::literal(body)]);
    }

    let mut fragments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut counters = [0usize; PairKind::ALL.len()];
    let mut cursor = 0;

    for tag in matches {
        if cursor < tag.start {
            push_literal(&mut fragments, &text[cursor..tag.start], options.strip_literal_text);
        }
        cursor = tag.outer_end(delimiters);

        let counter = &mut counters[tag.kind.index()];
        *counter += 1;
        let index = *counter;

        let body = &text[tag.inner(delimiters)];
        if body.trim().is_empty() {
            tracing::debug!("Dropping empty {}#{}", tag.kind, index);
            continue;
        }

        let source = normalize_indentation(body).map_err(|mismatch| TemplateError::Indentation {
            fragment: format!("{}#{}", tag.kind, index),
            line: mismatch.line,
            expected: mismatch.expected,
            found: mismatch.found,
        })?;

        let pair = delimiters.pair(tag.kind);
        fragments.push(Fragment::Directive(Directive::new(
            tag.kind,
            index,
            source.into_owned(),
            options.retain_source_text.then(|| body.to_string()),
            pair.start.as_str(),
            pair.end.as_str(),
        )));
    }

    if cursor < text.len() {
        push_literal(&mut fragments, &text[cursor..], options.strip_literal_text);
    }

    Ok(fragments)
}
