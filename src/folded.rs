//! The folded-scalar reader: literal (`|`) and folded (`>`) block scalars,
//! with their chomping (`+`/`-`/clip) and optional explicit indentation
//! indicator.

use crate::error::Error;
use crate::scanner::BlockScanner;
use crate::value::Value;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

/// Read a block scalar. `header` is the text after the mapping/sequence
/// value marker, e.g. `"|"`, `">-"`, `"|2"`. The scanner's cursor is
/// expected to sit on the line that introduced the header; on return it
/// sits on the last line consumed (the line that ended the scalar is
/// pushed back, matching [`BlockScanner::next_embedded_block`]).
pub fn read(scanner: &mut BlockScanner, header: &str) -> Result<Value, Error> {
    let literal = header.starts_with('|');
    let mut chomp = Chomp::Clip;
    let mut explicit_indent: Option<usize> = None;
    for c in header.chars().skip(1) {
        match c {
            '+' => chomp = Chomp::Keep,
            '-' => chomp = Chomp::Strip,
            '0'..='9' => {
                explicit_indent =
                    Some(explicit_indent.unwrap_or(0) * 10 + c.to_digit(10).unwrap() as usize);
            }
            _ => {}
        }
    }

    let mut out = String::new();
    let first_line = loop {
        if !scanner.advance() {
            return Ok(Value::String(apply_chomp(out, chomp)));
        }
        let line = scanner.current().expect("just advanced").to_owned();
        if line.trim().is_empty() {
            out.push('\n');
            continue;
        }
        break line;
    };

    let text_indent = match explicit_indent {
        Some(k) => k,
        None => scanner.indent_of(&first_line)?,
    };

    if text_indent == 0 {
        scanner.retreat();
        return Ok(Value::String(apply_chomp(out, chomp)));
    }

    let mut prev_indent: Option<usize> = None;
    let mut pending = Some(first_line);
    loop {
        let line = match pending.take() {
            Some(l) => l,
            None => {
                if !scanner.advance() {
                    break;
                }
                scanner.current().expect("just advanced").to_owned()
            }
        };
        if line.trim().is_empty() {
            out.push('\n');
            continue;
        }
        let indent = scanner.indent_of(&line)?;
        if indent < text_indent {
            scanner.retreat();
            break;
        }
        if !literal
            && let Some(p) = prev_indent
            && p != indent
            && out.ends_with(' ')
        {
            out.pop();
            out.push('\n');
        }
        let content: String = line.chars().skip(text_indent).collect();
        out.push_str(&content);
        out.push(if literal || indent > text_indent {
            '\n'
        } else {
            ' '
        });
        prev_indent = Some(indent);
    }

    if !literal {
        normalize_folded_tail(&mut out);
    }

    Ok(Value::String(apply_chomp(out, chomp)))
}

/// For `>` style, a trailing `" \n*"` run collapses to a single `\n` before
/// chomping is applied.
fn normalize_folded_tail(out: &mut String) {
    let trimmed_len = out.trim_end_matches('\n').len();
    if out[..trimmed_len].ends_with(' ') {
        out.truncate(trimmed_len - 1);
        out.push('\n');
    }
}

fn apply_chomp(out: String, mode: Chomp) -> String {
    match mode {
        Chomp::Keep => out,
        Chomp::Strip => out.trim_end_matches('\n').to_owned(),
        Chomp::Clip => {
            let trimmed = out.trim_end_matches('\n');
            if trimmed.len() == out.len() {
                out
            } else {
                format!("{trimmed}\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner_on(text: &str) -> BlockScanner {
        let mut s = BlockScanner::new(
            std::iter::once("text: |".to_string())
                .chain(text.lines().map(str::to_owned))
                .collect(),
            0,
        );
        s.advance(); // park on the header line
        s
    }

    #[test]
    fn literal_clip() {
        let mut s = scanner_on("  line1\n  line2\n");
        let v = read(&mut s, "|").unwrap();
        assert!(matches!(v, Value::String(ref s) if s == "line1\nline2\n"));
    }

    #[test]
    fn folded_joins_with_space() {
        let mut s = scanner_on("  line1\n  line2\n");
        let v = read(&mut s, ">").unwrap();
        assert!(matches!(v, Value::String(ref s) if s == "line1 line2\n"));
    }

    #[test]
    fn strip_removes_all_trailing_newlines() {
        let mut s = scanner_on("  line1\n\n\n");
        let v = read(&mut s, "|-").unwrap();
        assert!(matches!(v, Value::String(ref s) if s == "line1"));
    }

    #[test]
    fn keep_preserves_trailing_blanks() {
        let mut s = scanner_on("  line1\n\n");
        let v = read(&mut s, "|+").unwrap();
        assert!(matches!(v, Value::String(ref s) if s == "line1\n\n"));
    }
}
