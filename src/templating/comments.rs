//! Comment stripping.
//!
//! Comments are removed in a pass of their own, before directives are matched,
//! so anything inside a comment (including text that looks like a directive)
//! disappears completely.

use std::borrow::Cow;

use super::delimiters::DelimiterPair;
use super::error::TemplateError;
use super::scanner::find_all;

/// Remove every comment region, delimiters included, from `source`.
///
/// Comment start and end tags must occur equally often and strictly alternate:
/// a start inside an open comment or an end outside one is an error. Returns
/// the input unchanged (borrowed) when there are no comments.
///
/// # Errors
///
/// [`TemplateError::TagCountMismatch`] or [`TemplateError::UnmatchedTag`].
pub fn strip_comments<'a>(
    source: &'a str,
    comment: &DelimiterPair,
) -> Result<Cow<'a, str>, TemplateError> {
    let starts = find_all(source, &comment.start);
    let ends = find_all(source, &comment.end);

    if starts.len() != ends.len() {
        return Err(TemplateError::TagCountMismatch {
            start: comment.start.clone(),
            end: comment.end.clone(),
            starts: starts.len(),
            ends: ends.len(),
        });
    }
    if starts.is_empty() {
        return Ok(Cow::Borrowed(source));
    }

    let mut tags: Vec<(usize, bool)> = starts
        .into_iter()
        .map(|offset| (offset, true))
        .chain(ends.into_iter().map(|offset| (offset, false)))
        .collect();
    tags.sort_by_key(|&(offset, _)| offset);

    let mut regions = Vec::with_capacity(tags.len() / 2);
    let mut open: Option<usize> = None;
    for (offset, is_start) in tags {
        match (open, is_start) {
            (None, true) => open = Some(offset),
            (Some(start), false) => {
                regions.push((start, offset + comment.end.len()));
                open = None;
            }
            (Some(start), true) => {
                return Err(TemplateError::UnmatchedTag {
                    tag: comment.start.clone(),
                    offset,
                    open: Some((comment.start.clone(), start)),
                });
            }
            (None, false) => {
                return Err(TemplateError::UnmatchedTag {
                    tag: comment.end.clone(),
                    offset,
                    open: None,
                });
            }
        }
    }

    let mut stripped = String::with_capacity(source.len());
    let mut cursor = 0;
    for (start, end) in regions {
        // Custom literals may overlap a previous end tag.
        if start > cursor {
            stripped.push_str(&source[cursor..start]);
        }
        cursor = cursor.max(end);
    }
    stripped.push_str(&source[cursor..]);

    tracing::debug!(
        "Stripped comments: {} -> {} bytes",
        source.len(),
        stripped.len()
    );
    Ok(Cow::Owned(stripped))
}
