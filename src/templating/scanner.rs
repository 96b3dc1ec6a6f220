//! Literal substring scanning.

/// Find every occurrence of `needle` in `haystack`, returning byte offsets in
/// ascending order.
///
/// After each match the cursor advances by one character, not by the needle
/// length, so overlapping occurrences are all reported (`"aaa"` contains
/// `"aa"` at 0 and 1). An empty needle matches nothing.
pub fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    if needle.is_empty() {
        return offsets;
    }

    let mut cursor = 0;
    while let Some(found) = haystack[cursor..].find(needle) {
        let offset = cursor + found;
        offsets.push(offset);

        // Step over one whole character so the cursor stays on a char boundary.
        let step = haystack[offset..].chars().next().map_or(1, char::len_utf8);
        cursor = offset + step;
        if cursor > haystack.len() {
            break;
        }
    }

    offsets
}
