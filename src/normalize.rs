//! Pre-parse normalization: line-ending canonicalization and stripping of
//! the directive/comment/document-marker header so the remaining lines are
//! ready for the block scanner, while keeping track of how many lines were
//! removed so error messages still report the original source's line
//! numbers.

/// Normalize `text` and split it into logical lines, returning the offset
/// to add to a zero-based cursor over those lines to recover the original
/// 1-based line number.
#[must_use]
pub fn cleanup(text: &str) -> (Vec<String>, isize) {
    let mut normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.ends_with('\n') {
        normalized.push('\n');
    }

    let mut lines: Vec<String> = normalized.split('\n').map(str::to_owned).collect();
    let mut offset: isize = 0;

    if lines.first().is_some_and(|l| l.trim_start().starts_with("%YAML")) {
        lines.remove(0);
        offset += 1;
    }

    while lines.first().is_some_and(|l| l.trim_start().starts_with('#')) {
        lines.remove(0);
        offset += 1;
    }

    let mut stripped_start = false;
    if let Some(first) = lines.first() {
        let t = first.trim();
        if t == "---" || t.starts_with("--- ") {
            lines.remove(0);
            offset += 1;
            stripped_start = true;
        }
    }

    if stripped_start
        && let Some(idx) = lines.iter().rposition(|l| !l.trim().is_empty())
        && lines[idx].trim() == "..."
    {
        lines.remove(idx);
    }

    (lines, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lf_only_is_a_no_op_besides_trailing_newline() {
        let (lines, offset) = cleanup("a: 1\nb: 2\n");
        assert_eq!(lines, vec!["a: 1", "b: 2", ""]);
        assert_eq!(offset, 0);
    }

    #[test]
    fn crlf_is_normalized() {
        let (lines, _) = cleanup("a: 1\r\nb: 2\r\n");
        assert_eq!(lines, vec!["a: 1", "b: 2", ""]);
    }

    #[test]
    fn strips_yaml_directive_and_leading_comments() {
        let (lines, offset) = cleanup("%YAML 1.1\n# a comment\n# another\na: 1\n");
        assert_eq!(lines, vec!["a: 1", ""]);
        assert_eq!(offset, 3);
    }

    #[test]
    fn strips_start_and_end_markers() {
        let (lines, offset) = cleanup("---\na: 1\n...\n");
        assert_eq!(lines, vec!["a: 1", ""]);
        assert_eq!(offset, 1);
    }
}
