//! Tag matching over the comment-free source.
//!
//! All eight directive literals are located with a plain substring scan, the
//! per-pair counts are checked, and the merged, offset-sorted occurrence list
//! is validated for strict alternation: only one directive may be open at a
//! time, across all pair kinds combined. Directives of different kinds may
//! follow each other but never interleave or nest.

use super::delimiters::{Delimiters, PairKind};
use super::error::TemplateError;
use super::scanner::find_all;

/// One matched directive: the offsets of its start tag and of its end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch {
    pub kind: PairKind,
    /// Offset of the first byte of the start tag.
    pub start: usize,
    /// Offset of the first byte of the end tag.
    pub end: usize,
}

impl TagMatch {
    /// Byte range of the directive body, between the two tags. Empty when
    /// the end tag overlaps the start tag.
    #[must_use]
    pub fn inner(&self, delimiters: &Delimiters) -> std::ops::Range<usize> {
        let body_start = self.start + delimiters.pair(self.kind).start.len();
        body_start.min(self.end)..self.end
    }

    /// Offset just past the end tag.
    #[must_use]
    pub fn outer_end(&self, delimiters: &Delimiters) -> usize {
        self.end + delimiters.pair(self.kind).end.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Occurrence {
    offset: usize,
    kind: PairKind,
    is_start: bool,
}

impl Occurrence {
    fn literal<'d>(&self, delimiters: &'d Delimiters) -> &'d str {
        let pair = delimiters.pair(self.kind);
        if self.is_start { &pair.start } else { &pair.end }
    }
}

/// Locate and pair every directive tag in `text`.
///
/// `text` must already be free of comments. The returned matches are ordered
/// by offset. An end tag may overlap its own start tag (`{{%}}`); such a
/// directive has an empty body.
///
/// # Errors
///
/// - [`TemplateError::TagCountMismatch`] when some pair's start and end tags
///   occur a different number of times.
/// - [`TemplateError::UnmatchedTag`] when a tag breaks the alternation: an end
///   tag with nothing open, a start tag while another directive is open, the
///   or the end tag of a different pair.
pub fn match_tags(text: &str, delimiters: &Delimiters) -> Result<Vec<TagMatch>, TemplateError> {
    let mut occurrences = Vec::new();

    for kind in PairKind::ALL {
        let pair = delimiters.pair(kind);
        let starts = find_all(text, &pair.start);
        let ends = find_all(text, &pair.end);

        if starts.len() != ends.len() {
            return Err(TemplateError::TagCountMismatch {
                start: pair.start.clone(),
                end: pair.end.clone(),
                starts: starts.len(),
                ends: ends.len(),
            });
        }

        occurrences.extend(starts.into_iter().map(|offset| Occurrence {
            offset,
            kind,
            is_start: true,
        }));
        occurrences.extend(ends.into_iter().map(|offset| Occurrence {
            offset,
            kind,
            is_start: false,
        }));
    }

    // Stable: ties keep the pair order above.
    occurrences.sort_by_key(|o| o.offset);

    let mut matches = Vec::with_capacity(occurrences.len() / 2);
    let mut open: Option<Occurrence> = None;

    for occurrence in occurrences {
        let unmatched = |open: Option<Occurrence>| TemplateError::UnmatchedTag {
            tag: occurrence.literal(delimiters).to_string(),
            offset: occurrence.offset,
            open: open.map(|o| (o.literal(delimiters).to_string(), o.offset)),
        };

        match open {
            None if occurrence.is_start => {
                open = Some(occurrence);
            }
            Some(opened) if !occurrence.is_start && occurrence.kind == opened.kind => {
                matches.push(TagMatch {
                    kind: opened.kind,
                    start: opened.offset,
                    end: occurrence.offset,
                });
                open = None;
            }
            _ => return Err(unmatched(open)),
        }
    }

    if let Some(opened) = open {
        return Err(TemplateError::UnmatchedTag {
            tag: opened.literal(delimiters).to_string(),
            offset: opened.offset,
            open: None,
        });
    }

    tracing::debug!("Matched {} directive(s)", matches.len());
    Ok(matches)
}
