//! Indentation normalization for directive bodies.
//!
//! Directives may be indented to match the surrounding document. Before a
//! body is handed to an evaluator, the indentation of its first non-blank
//! line is removed from every line:
//!
//! ```text
//!     def myfun():
//!         return '13'
//!     aboba = 'beb'
//! ```
//!
//! becomes
//!
//! ```text
//! def myfun():
//!     return '13'
//! aboba = 'beb'
//! ```

use std::borrow::Cow;

/// A line indented less deeply than the first non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentMismatch {
    /// 1-based position among the non-blank lines.
    pub line: usize,
    pub expected: usize,
    pub found: usize,
}

fn leading_count(line: &str, ch: char) -> usize {
    line.chars().take_while(|&c| c == ch).count()
}

/// Strip the first non-blank line's indentation from every line of `body`.
///
/// The indentation character (tab or space) and depth are taken from the first
/// non-blank line. If that line is not indented, `body` is returned unchanged.
/// Otherwise blank lines are dropped, trailing whitespace is trimmed, and the
/// remaining lines are re-joined with `\n`.
///
/// # Errors
///
/// Returns [`IndentMismatch`] if a non-blank line starts with fewer copies of
/// the indentation character than the first one.
pub fn normalize_indentation(body: &str) -> Result<Cow<'_, str>, IndentMismatch> {
    let lines: Vec<&str> = body
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::trim_end)
        .collect();

    let Some(first) = lines.first() else {
        return Ok(Cow::Borrowed(body));
    };
    let indent_char = match first.chars().next() {
        Some(c @ (' ' | '\t')) => c,
        _ => return Ok(Cow::Borrowed(body)),
    };
    let depth = leading_count(first, indent_char);

    let mut normalized = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let found = leading_count(line, indent_char);
        if found < depth {
            return Err(IndentMismatch {
                line: i + 1,
                expected: depth,
                found,
            });
        }
        // Indentation characters are single-byte.
        normalized.push(&line[depth..]);
    }

    Ok(Cow::Owned(normalized.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unindented_body_unchanged() {
        let body = "x = 1\n    y = 2";
        assert!(matches!(normalize_indentation(body), Ok(Cow::Borrowed(b)) if b == body));
    }

    #[test]
    fn test_single_line_form() {
        assert_eq!(normalize_indentation(" 'x' + 'y' ").unwrap(), "'x' + 'y'");
    }

    #[test]
    fn test_uniform_four_spaces() {
        let body = "\n    a = 1\n    b = 2\n";
        assert_eq!(normalize_indentation(body).unwrap(), "a = 1\nb = 2");
    }

    #[test]
    fn test_relative_indentation_kept() {
        let body = "\n    def f():\n        return 1\n\n    x = f()\n";
        assert_eq!(normalize_indentation(body).unwrap(), "def f():\n    return 1\nx = f()");
    }

    #[test]
    fn test_tabs() {
        let body = "\n\t\ta\n\t\t\tb\n";
        assert_eq!(normalize_indentation(body).unwrap(), "a\n\tb");
    }

    #[test]
    fn test_shallower_line_rejected() {
        let body = "\n    a = 1\n  b = 2\n    c = 3\n";
        assert_eq!(
            normalize_indentation(body).unwrap_err(),
            IndentMismatch {
                line: 2,
                expected: 4,
                found: 2,
            }
        );
    }

    #[test]
    fn test_mixed_indent_char_rejected() {
        let body = "\n  a\n\t\tb\n";
        assert!(normalize_indentation(body).is_err());
    }

    #[test]
    fn test_blank_body_unchanged() {
        assert_eq!(normalize_indentation("  \n \n").unwrap(), "  \n \n");
    }
}
