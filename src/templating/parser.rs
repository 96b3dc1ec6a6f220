//! Template parser: comment stripping, tag matching and classification.

use super::classify::{ClassifyOptions, classify};
use super::comments::strip_comments;
use super::delimiters::{DelimiterPair, Delimiters, PairKind};
use super::error::TemplateError;
use super::fragment::Fragment;
use super::matcher::match_tags;

/// Parser configuration.
///
/// All ten delimiter literals can be overridden. By default literal text
/// around directives is trimmed and raw directive bodies are retained so the
/// parsed template can be printed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParser {
    delimiters: Delimiters,
    strip_literal_text: bool,
    retain_source_text: bool,
}

impl Default for TemplateParser {
    fn default() -> Self {
        Self {
            delimiters: Delimiters::default(),
            strip_literal_text: true,
            retain_source_text: true,
        }
    }
}

impl TemplateParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Override the literals of a single directive pair.
    #[must_use]
    pub fn with_pair(mut self, kind: PairKind, start: &str, end: &str) -> Self {
        self.delimiters = self.delimiters.with_pair(kind, DelimiterPair::new(start, end));
        self
    }

    #[must_use]
    pub fn with_comment(mut self, start: &str, end: &str) -> Self {
        self.delimiters = self.delimiters.with_comment(DelimiterPair::new(start, end));
        self
    }

    #[must_use]
    pub fn with_strip_literal_text(mut self, strip: bool) -> Self {
        self.strip_literal_text = strip;
        self
    }

    #[must_use]
    pub fn with_retain_source_text(mut self, retain: bool) -> Self {
        self.retain_source_text = retain;
        self
    }

    #[must_use]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    #[must_use]
    pub fn strip_literal_text(&self) -> bool {
        self.strip_literal_text
    }

    #[must_use]
    pub fn retain_source_text(&self) -> bool {
        self.retain_source_text
    }

    /// Parse `source` into its ordered fragment sequence.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::InvalidDelimiters`] for an unusable configuration
    /// - [`TemplateError::TagCountMismatch`] / [`TemplateError::UnmatchedTag`]
    ///   for malformed pairing, in comments or directives
    /// - [`TemplateError::Indentation`] for inconsistently indented bodies
    pub fn parse(&self, source: &str) -> Result<Vec<Fragment>, TemplateError> {
        self.delimiters.validate()?;

        let text = strip_comments(source, &self.delimiters.comment)?;
        let matches = match_tags(&text, &self.delimiters)?;
        let fragments = classify(
            &text,
            &matches,
            &self.delimiters,
            ClassifyOptions {
                strip_literal_text: self.strip_literal_text,
                retain_source_text: self.retain_source_text,
            },
        )?;

        tracing::debug!(
            "Parsed {} bytes into {} fragment(s), {} one-time",
            source.len(),
            fragments.len(),
            fragments.iter().filter(|f| f.is_one_time()).count()
        );
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip_scenario() {
        let fragments = TemplateParser::new().parse("a{{%'x'+'y'%}}b").unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].as_literal(), Some("a"));
        assert_eq!(fragments[1].as_directive().unwrap().source(), "'x'+'y'");
        assert_eq!(fragments[2].as_literal(), Some("b"));
    }

    #[test]
    fn test_comment_removed_before_matching_joins_literals() {
        // The comment is cut from the text before fragments are formed, so the
        // text on both sides becomes one literal.
        let fragments = TemplateParser::new().parse("keep{{#dropped{{%'x'%}}#}}keep2").unwrap();
        assert_eq!(fragments, vec![Fragment::literal("keepkeep2")]);
    }

    #[test]
    fn test_overlapping_tags_parse_as_empty_directive() {
        let fragments = TemplateParser::new().parse("a{{%}}b").unwrap();
        assert_eq!(fragments, vec![Fragment::literal("a"), Fragment::literal("b")]);
    }

    #[test]
    fn test_unbalanced_inside_comment_is_ignored() {
        let fragments = TemplateParser::new().parse("a{{# {{% #}}b").unwrap();
        assert_eq!(fragments, vec![Fragment::literal("ab")]);
    }

    #[test]
    fn test_custom_delimiters() {
        let parser = TemplateParser::new()
            .with_pair(PairKind::Expression, "${", "}")
            .with_comment("/*", "*/")
            .with_strip_literal_text(false);
        let fragments = parser.parse("x=${ x }/* gone */;").unwrap();
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1].as_directive().unwrap().start_tag(), "${");
        assert_eq!(fragments[2].as_literal(), Some(";"));
    }

    #[test]
    fn test_invalid_delimiters() {
        let parser = TemplateParser::new().with_pair(PairKind::Block, "{{%", "%}}");
        assert!(matches!(
            parser.parse("x"),
            Err(TemplateError::InvalidDelimiters { .. })
        ));
    }

    #[test]
    fn test_interleaved_pairs_fail_sequential_succeed() {
        let parser = TemplateParser::new();
        assert!(parser.parse("{{! a {{% b !}} c %}}").unwrap_err().is_tag_mismatch());

        let fragments = parser.parse("{{! a !}} {{% b %}}").unwrap();
        let kinds: Vec<_> =
            fragments.iter().filter_map(|f| f.as_directive()).map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![PairKind::Block, PairKind::Expression]);
    }
}
