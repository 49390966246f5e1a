//! The block scanner: a cursor over a document's logical lines.
//!
//! Unlike a token scanner, this one never looks inside a line's content — it
//! only tracks position, indentation, and the "next embedded block"
//! extraction that the document parser uses to recurse into nested
//! sequences and mappings.

use crate::error::{Error, Position};
use log::trace;
use smallvec::SmallVec;

/// One decoded line of a document, plus its distance from the start of the
/// (already-offset) `lines` vector it lives in.
#[derive(Clone, Debug)]
pub struct BlockScanner {
    lines: Vec<String>,
    /// -1 means "before the first line".
    cursor: isize,
    /// Added to `cursor` to compute a 1-based line number for diagnostics.
    offset: isize,
}

impl BlockScanner {
    #[must_use]
    pub fn new(lines: Vec<String>, offset: isize) -> Self {
        BlockScanner {
            lines,
            cursor: -1,
            offset,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Advance the cursor by one line. Returns `false` once past the end.
    pub fn advance(&mut self) -> bool {
        if (self.cursor + 1) < self.lines.len() as isize {
            self.cursor += 1;
            trace!(
                "scanner advanced to line {}: {:?}",
                self.line_number(),
                self.current()
            );
            true
        } else {
            self.cursor = self.lines.len() as isize;
            false
        }
    }

    pub fn retreat(&mut self) {
        if self.cursor >= 0 {
            self.cursor -= 1;
        }
    }

    #[must_use]
    pub fn at_end(&self) -> bool {
        self.cursor >= self.lines.len() as isize
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        if self.cursor < 0 {
            return None;
        }
        self.lines.get(self.cursor as usize).map(String::as_str)
    }

    /// The user-facing 1-based line number of the current cursor position.
    #[must_use]
    pub fn line_number(&self) -> usize {
        (self.cursor + self.offset + 1).max(1) as usize
    }

    pub fn position(&self) -> Position {
        Position::new(self.line_number())
    }

    /// A line is "empty" for dispatch purposes if it is blank or a comment.
    #[must_use]
    pub fn is_blank_or_comment(line: &str) -> bool {
        let trimmed = line.trim_start_matches(' ');
        trimmed.is_empty() || trimmed.starts_with('#')
    }

    #[must_use]
    pub fn is_current_empty(&self) -> bool {
        self.current().is_none_or(Self::is_blank_or_comment)
    }

    /// Count of leading ASCII spaces. Tabs in the leading run are rejected.
    pub fn indent_of(&self, line: &str) -> Result<usize, Error> {
        let mut n = 0;
        for c in line.chars() {
            match c {
                ' ' => n += 1,
                '\t' => {
                    return Err(Error::TabIndentation(self.position(), line.to_owned()));
                }
                _ => break,
            }
        }
        Ok(n)
    }

    pub fn current_indent(&self) -> Result<usize, Error> {
        match self.current() {
            Some(line) => self.indent_of(line),
            None => Ok(0),
        }
    }

    /// Skip lines that are blank or comment-only, landing the cursor on the
    /// next substantive line (or past the end).
    pub fn skip_empty(&mut self) {
        while !self.at_end() {
            if self.is_current_empty() {
                if !self.advance() {
                    break;
                }
            } else {
                break;
            }
        }
    }

    /// Extract the next embedded block: every subsequent line indented at
    /// least `indent` (or, when `indent` is `None`, at least the indentation
    /// of the first such line), each stripped of that many leading spaces.
    /// Leaves the cursor on the line that ended the block (pushed back).
    pub fn next_embedded_block(&mut self, indent: Option<usize>) -> Result<Vec<String>, Error> {
        let start_cursor = self.cursor;
        if !self.advance() {
            self.cursor = start_cursor;
            return Ok(Vec::new());
        }

        let new_indent = match indent {
            Some(k) => k,
            None => {
                // Skip leading blank lines while hunting for the indent anchor.
                while self.is_current_empty() && self.advance() {}
                if self.at_end() {
                    self.cursor = start_cursor;
                    return Ok(Vec::new());
                }
                let line = self.current().expect("checked not at end");
                self.indent_of(line)?
            }
        };

        let mut out: SmallVec<[String; 8]> = SmallVec::new();
        loop {
            if self.at_end() {
                break;
            }
            let line = self.current().expect("checked not at end").to_owned();
            if Self::is_blank_or_comment(&line) {
                out.push(String::new());
                if !self.advance() {
                    break;
                }
                continue;
            }
            let line_indent = self.indent_of(&line)?;
            if line_indent == 0 {
                // Ends the block; push the line back for the caller.
                self.retreat();
                break;
            }
            if line_indent < new_indent {
                return Err(Error::IndentationError(self.position(), line));
            }
            out.push(line.chars().skip(new_indent).collect());
            if !self.advance() {
                break;
            }
        }

        Ok(out.into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(text: &str) -> BlockScanner {
        BlockScanner::new(text.lines().map(str::to_owned).collect(), 0)
    }

    #[test]
    fn advance_and_line_number() {
        let mut s = scanner("a\nb\nc");
        assert!(s.advance());
        assert_eq!(s.line_number(), 1);
        assert_eq!(s.current(), Some("a"));
        assert!(s.advance());
        assert_eq!(s.line_number(), 2);
    }

    #[test]
    fn tab_indentation_is_rejected() {
        let s = scanner("x");
        assert!(s.indent_of("\tfoo").is_err());
    }

    #[test]
    fn embedded_block_strips_indent_and_stops_at_col0() {
        let mut s = scanner("top:\n  a: 1\n  b: 2\nnext: 3");
        assert!(s.advance()); // "top:"
        let block = s.next_embedded_block(None).unwrap();
        assert_eq!(block, vec!["a: 1".to_string(), "b: 2".to_string()]);
        assert!(s.advance());
        assert_eq!(s.current(), Some("next: 3"));
    }

    #[test]
    fn inconsistent_indent_is_an_error() {
        let mut s = scanner("top:\n    a: 1\n  b: 2");
        assert!(s.advance());
        assert!(s.next_embedded_block(None).is_err());
    }
}
