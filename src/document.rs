//! The document parser: turns a normalized line stream into a [`Value`]
//! tree by dispatching each non-blank line to sequence-entry, mapping-entry,
//! or fallback-scalar handling, recursing into [`BlockScanner::next_embedded_block`]
//! for nested structure.
//!
//! A single parse spawns many sub-parses (one per nested block), all sharing
//! one [`AnchorTable`] so an alias can resolve to an anchor declared anywhere
//! earlier in the document, regardless of nesting depth.

use crate::anchors::AnchorTable;
use crate::error::{Error, Position};
use crate::folded;
use crate::inline;
use crate::normalize;
use crate::scanner::BlockScanner;
use crate::value::{Mapping, Value};
use log::{debug, trace};
use regex::{Regex, RegexBuilder};

const FOLDED_HINT_PATTERN: &str = r"^-+ \|.*\s";
/// Generous relative to the tiny, fixed patterns this crate builds; exists
/// so a pathological future pattern fails as a reported error rather than
/// eating unbounded memory.
const REGEX_SIZE_LIMIT: usize = 1 << 16;

/// Compile `pattern` with a bounded compiled-program size, surfacing a
/// limit violation as [`Error::RegexEngineError`] instead of panicking.
fn compile_bounded(pattern: &str, size_limit: usize, at: Position) -> Result<Regex, Error> {
    RegexBuilder::new(pattern)
        .size_limit(size_limit)
        .build()
        .map_err(|e| Error::RegexEngineError(at, e.to_string()))
}

/// Parse a complete YAML text into a [`Value`].
///
/// A stream containing more than one `---`-separated document is returned
/// as a [`Value::Sequence`] of the documents, in order.
pub fn parse(text: &str) -> Result<Value, Error> {
    let (lines, offset) = normalize::cleanup(text);
    let refs = AnchorTable::new();
    parse_block(lines, offset, &refs)
}

fn parse_block(lines: Vec<String>, offset: isize, refs: &AnchorTable) -> Result<Value, Error> {
    let mut scanner = BlockScanner::new(lines, offset);
    parse_stream(&mut scanner, refs)
}

fn is_document_marker(line: &str) -> bool {
    let t = line.trim();
    t == "---" || t.starts_with("--- ") || t == "..."
}

fn parse_stream(scanner: &mut BlockScanner, refs: &AnchorTable) -> Result<Value, Error> {
    let mut documents: Vec<Value> = Vec::new();
    let mut acc = Value::Null;
    // Whether `acc` already holds a fully-parsed top-level node group for
    // the document currently in progress. A second node group appearing
    // before the next `---`/`...` means the top level switched shape (e.g.
    // mapping to sequence) with no document separator, which is invalid
    // rather than a reason to silently discard the first group.
    let mut has_group = false;

    loop {
        scanner.skip_empty();
        if scanner.at_end() {
            break;
        }
        let line = scanner.current().expect("checked not at end").to_owned();
        let t = line.trim();
        if t == "---" || t.starts_with("--- ") {
            documents.push(std::mem::take(&mut acc));
            has_group = false;
            scanner.advance();
            continue;
        }
        if t == "..." {
            scanner.advance();
            continue;
        }
        if has_group {
            return Err(Error::StructureError(scanner.position(), line));
        }
        acc = parse_node_group(scanner, refs)?;
        has_group = true;
    }

    if documents.is_empty() {
        Ok(acc)
    } else {
        documents.push(acc);
        Ok(Value::Sequence(documents))
    }
}

/// Consume a maximal run of entries of one kind (sequence, mapping) starting
/// at the scanner's current line, or fall back to the multi-line plain
/// scalar reading when the line matches neither.
fn parse_node_group(scanner: &mut BlockScanner, refs: &AnchorTable) -> Result<Value, Error> {
    let first_line = scanner.current().expect("caller checked not at end").to_owned();
    trace!("dispatching block at line {}: {first_line:?}", scanner.line_number());

    if is_sequence_entry(&first_line) {
        let mut items = Vec::new();
        loop {
            scanner.skip_empty();
            if scanner.at_end() {
                break;
            }
            let line = scanner.current().expect("checked not at end").to_owned();
            if is_document_marker(&line) {
                break;
            }
            if scanner.indent_of(&line)? != 0 {
                return Err(Error::IndentationError(scanner.position(), line));
            }
            if !is_sequence_entry(&line) {
                break;
            }
            items.push(parse_sequence_entry(scanner, refs)?);
        }
        return Ok(Value::Sequence(items));
    }

    if split_mapping_key(&first_line).is_some() {
        let mut map = Mapping::new();
        loop {
            scanner.skip_empty();
            if scanner.at_end() {
                break;
            }
            let line = scanner.current().expect("checked not at end").to_owned();
            if is_document_marker(&line) {
                break;
            }
            if scanner.indent_of(&line)? != 0 {
                return Err(Error::IndentationError(scanner.position(), line));
            }
            let Some((key, rest)) = split_mapping_key(&line) else {
                break;
            };
            parse_mapping_entry(scanner, refs, &mut map, key, rest)?;
        }
        return Ok(Value::Mapping(map));
    }

    parse_fallback(scanner, refs)
}

/// A line opens a sequence entry when it is exactly `-` or starts with `- `.
/// A negative-number scalar like `-1` does not qualify, since there is no
/// space after the dash.
fn is_sequence_entry(line: &str) -> bool {
    line == "-" || line.starts_with("- ")
}

/// Split a mapping-entry line into its key and the raw text following the
/// colon, respecting quoting and flow-bracket nesting so a flow collection
/// given as a whole line (`{a: b}`, `[1, 2]`) is not mistaken for a key.
fn split_mapping_key(line: &str) -> Option<(Value, String)> {
    let leading = line.trim_start();
    if leading.starts_with('[') || leading.starts_with('{') {
        return None;
    }

    let chars: Vec<char> = line.chars().collect();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '{' => depth += 1,
            ']' | '}' => depth -= 1,
            ':' if depth == 0 => {
                let next = chars.get(i + 1).copied();
                if next.is_none() || next == Some(' ') {
                    let key_raw: String = chars[..i].iter().collect();
                    let key_raw = key_raw.trim();
                    if key_raw.is_empty() {
                        return None;
                    }
                    let rest: String = chars[(i + 1).min(chars.len())..].iter().collect();
                    let rest = rest.strip_prefix(' ').unwrap_or(&rest).to_owned();
                    return Some((Value::String(dequote_key(key_raw)), rest));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn dequote_key(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return unescape_double(&s[1..s.len() - 1]);
    }
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        return s[1..s.len() - 1].replace("''", "'");
    }
    s.to_owned()
}

fn unescape_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Split a leading `&name ` (or bare `&name`) anchor off a value string.
fn split_anchor(value: &str) -> (Option<String>, String) {
    if let Some(rest) = value.strip_prefix('&') {
        let name_len = rest
            .find(|c: char| c.is_whitespace())
            .unwrap_or(rest.len());
        if name_len == 0 {
            return (None, value.to_owned());
        }
        let name = &rest[..name_len];
        let after = rest[name_len..].trim_start();
        return (Some(name.to_owned()), after.to_owned());
    }
    (None, value.to_owned())
}

fn is_empty_or_comment(value: &str) -> bool {
    let t = value.trim_start();
    t.is_empty() || t.starts_with('#')
}

/// Evaluate a non-empty value that is not a nested block: an alias, a block
/// scalar header, or an inline (possibly flow) scalar/collection. Always
/// leaves the scanner parked on the next unconsumed line.
fn parse_scalar_like(
    value: &str,
    line: usize,
    source_line: &str,
    scanner: &mut BlockScanner,
    refs: &AnchorTable,
) -> Result<Value, Error> {
    let trimmed = value.trim();
    if trimmed.starts_with('|') || trimmed.starts_with('>') {
        return folded::read(scanner, trimmed);
    }
    if let Some(name) = trimmed.strip_prefix('*') {
        let name = name.split('#').next().unwrap_or(name).trim();
        let v = refs.lookup(name, Position::new(line), source_line)?;
        scanner.advance();
        return Ok(v);
    }
    let v = inline::load_inline(value, line)?;
    scanner.advance();
    Ok(v)
}

fn parse_sequence_entry(scanner: &mut BlockScanner, refs: &AnchorTable) -> Result<Value, Error> {
    let header_line = scanner.line_number();
    let line = scanner.current().expect("caller checked not at end").to_owned();
    let after_dash = if line == "-" { "" } else { &line[1..] };
    let leadspaces = after_dash.len() - after_dash.trim_start().len();
    let raw_value = after_dash.trim_start();

    let (anchor, value) = split_anchor(raw_value);

    let result = if is_empty_or_comment(&value) {
        let block_lines = scanner.next_embedded_block(None)?;
        if block_lines.is_empty() {
            Value::Null
        } else {
            parse_block(block_lines, header_line as isize, refs)?
        }
    } else if leadspaces == 1
        && let Some((Value::String(key), rest)) = split_mapping_key(&value)
    {
        let extra = scanner.next_embedded_block(Some(2))?;
        if extra.is_empty() {
            let v = parse_scalar_like(&rest, header_line, &line, scanner, refs)?;
            let mut m = Mapping::new();
            m.insert(Value::String(key), v);
            Value::Mapping(m)
        } else {
            let mut combined = Vec::with_capacity(extra.len() + 1);
            combined.push(format!("{key}: {rest}"));
            combined.extend(extra);
            parse_block(combined, header_line as isize - 1, refs)?
        }
    } else {
        parse_scalar_like(&value, header_line, &line, scanner, refs)?
    };

    if let Some(name) = anchor {
        debug!("assigning anchor `{name}` at line {header_line}");
        refs.assign(name, result.clone());
    }
    Ok(result)
}

fn parse_mapping_entry(
    scanner: &mut BlockScanner,
    refs: &AnchorTable,
    map: &mut Mapping,
    key: Value,
    raw_value: String,
) -> Result<(), Error> {
    let header_line = scanner.line_number();
    let source_line = scanner.current().expect("caller checked not at end").to_owned();
    let (anchor, value) = split_anchor(raw_value.trim_start());

    if matches!(&key, Value::String(s) if s == "<<") {
        handle_merge(scanner, refs, map, &value, header_line, &source_line)?;
        if let Some(name) = anchor {
            refs.assign(name, Value::Mapping(map.clone()));
        }
        return Ok(());
    }

    let result = if is_empty_or_comment(&value) {
        let block_lines = scanner.next_embedded_block(None)?;
        if block_lines.is_empty() {
            Value::Null
        } else {
            parse_block(block_lines, header_line as isize, refs)?
        }
    } else {
        parse_scalar_like(&value, header_line, &source_line, scanner, refs)?
    };

    map.insert(key, result.clone());

    if let Some(name) = anchor {
        debug!("assigning anchor `{name}` at line {header_line}");
        refs.assign(name, result);
    }
    Ok(())
}

/// `<<` merge-key handling (§4.6/§4.8): a bare alias replaces the whole
/// accumulator in place (so it can win over keys set before it but still
/// lose to keys set after); any other value merges its pairs in with
/// already-present keys winning.
fn handle_merge(
    scanner: &mut BlockScanner,
    refs: &AnchorTable,
    map: &mut Mapping,
    value: &str,
    line: usize,
    source_line: &str,
) -> Result<(), Error> {
    let trimmed = value.trim();
    debug!("merging `<<` at line {line}: {trimmed:?}");

    if let Some(name) = trimmed.strip_prefix('*') {
        let name = name.split('#').next().unwrap_or(name).trim();
        match refs.lookup(name, Position::new(line), source_line)? {
            Value::Mapping(src) => *map = src,
            _ => {
                return Err(Error::MergeError(
                    Position::new(line),
                    format!("anchor `{name}` is not a mapping"),
                    source_line.to_owned(),
                ));
            }
        }
        scanner.advance();
        return Ok(());
    }

    let parsed = if is_empty_or_comment(trimmed) {
        let block_lines = scanner.next_embedded_block(None)?;
        if block_lines.is_empty() {
            Value::Null
        } else {
            parse_block(block_lines, line as isize, refs)?
        }
    } else {
        parse_scalar_like(value, line, source_line, scanner, refs)?
    };

    match parsed {
        Value::Mapping(src) => {
            for (k, v) in src.iter() {
                if !map.contains_key(k) {
                    map.insert(k.clone(), v.clone());
                }
            }
        }
        Value::Sequence(items) => {
            let mut merged = Mapping::new();
            for item in items.into_iter().rev() {
                match item {
                    Value::Mapping(src) => {
                        for (k, v) in src.into_iter() {
                            merged.insert(k, v);
                        }
                    }
                    _ => {
                        return Err(Error::MergeError(
                            Position::new(line),
                            "sequence merge contains a non-mapping element".into(),
                            source_line.to_owned(),
                        ));
                    }
                }
            }
            for (k, v) in merged.iter() {
                if !map.contains_key(k) {
                    map.insert(k.clone(), v.clone());
                }
            }
        }
        _ => {
            return Err(Error::MergeError(
                Position::new(line),
                "`<<` value is neither a mapping nor a sequence of mappings".into(),
                source_line.to_owned(),
            ));
        }
    }
    Ok(())
}

/// Gather every remaining line of the current block (up to EOF or a
/// document marker) and feed it through the inline parser as one plain
/// multi-line scalar, as a last resort when no entry pattern matched.
fn parse_fallback(scanner: &mut BlockScanner, refs: &AnchorTable) -> Result<Value, Error> {
    let first_line_no = scanner.line_number();
    let mut buffer: Vec<String> = Vec::new();
    loop {
        if scanner.at_end() {
            break;
        }
        let line = scanner.current().expect("checked not at end").to_owned();
        if is_document_marker(&line) {
            break;
        }
        buffer.push(line);
        if !scanner.advance() {
            break;
        }
    }

    let text = if buffer.len() > 1 {
        let hint_re = compile_bounded(
            FOLDED_HINT_PATTERN,
            REGEX_SIZE_LIMIT,
            Position::new(first_line_no),
        )?;
        let use_newline = buffer.iter().any(|l| hint_re.is_match(l));
        let sep = if use_newline { "\n" } else { " " };
        buffer
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join(sep)
    } else {
        buffer.first().cloned().unwrap_or_default()
    };

    let value = inline::load_inline(&text, first_line_no)?;
    if let Value::Sequence(items) = &value
        && items
            .first()
            .is_some_and(|v| matches!(v, Value::String(s) if s.starts_with('*')))
    {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let Value::String(s) = &item
                && let Some(name) = s.strip_prefix('*')
            {
                out.push(refs.lookup(name.trim(), Position::new(first_line_no), &text)?);
                continue;
            }
            out.push(item.clone());
        }
        return Ok(Value::Sequence(out));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_mapping() {
        let v = parse("a: 1\nb: two\n").unwrap();
        let m = v.as_mapping().unwrap();
        assert!(matches!(m.get(&Value::String("a".into())), Some(Value::Int(1))));
        assert!(matches!(m.get(&Value::String("b".into())), Some(Value::String(s)) if s == "two"));
    }

    #[test]
    fn nested_mapping_and_sequence() {
        let v = parse("top:\n  a: 1\nlist:\n  - 1\n  - 2\n").unwrap();
        let m = v.as_mapping().unwrap();
        let top = m.get(&Value::String("top".into())).unwrap().as_mapping().unwrap();
        assert!(matches!(top.get(&Value::String("a".into())), Some(Value::Int(1))));
        let list = m.get(&Value::String("list".into())).unwrap().as_sequence().unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn sequence_of_scalars() {
        let v = parse("- 1\n- 2\n- 3\n").unwrap();
        let seq = v.as_sequence().unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn anchor_and_alias() {
        let v = parse("base: &B\n  x: 1\nref: *B\n").unwrap();
        let m = v.as_mapping().unwrap();
        let base = m.get(&Value::String("base".into())).unwrap();
        let reference = m.get(&Value::String("ref".into())).unwrap();
        assert_eq!(base, reference);
    }

    #[test]
    fn merge_key_alias_form_overrides_earlier_keys_not_later_ones() {
        let v = parse(
            "base: &B\n  x: 1\n  y: 2\nder:\n  x: 100\n  <<: *B\n  y: 9\n  z: 3\n",
        )
        .unwrap();
        let der = v
            .as_mapping()
            .unwrap()
            .get(&Value::String("der".into()))
            .unwrap()
            .as_mapping()
            .unwrap();
        assert!(matches!(der.get(&Value::String("x".into())), Some(Value::Int(1))));
        assert!(matches!(der.get(&Value::String("y".into())), Some(Value::Int(9))));
        assert!(matches!(der.get(&Value::String("z".into())), Some(Value::Int(3))));
    }

    #[test]
    fn merge_key_sequence_form_existing_keys_win() {
        let v = parse(
            "a: &A\n  k: 1\nb: &B\n  k: 2\n  j: 9\nc:\n  k: 100\n  <<: [*A, *B]\n",
        )
        .unwrap();
        let c = v
            .as_mapping()
            .unwrap()
            .get(&Value::String("c".into()))
            .unwrap()
            .as_mapping()
            .unwrap();
        assert!(matches!(c.get(&Value::String("k".into())), Some(Value::Int(100))));
        assert!(matches!(c.get(&Value::String("j".into())), Some(Value::Int(9))));
    }

    #[test]
    fn compact_mapping_in_sequence() {
        let v = parse("- key: val\n  more: stuff\n").unwrap();
        let seq = v.as_sequence().unwrap();
        assert_eq!(seq.len(), 1);
        let m = seq[0].as_mapping().unwrap();
        assert!(matches!(m.get(&Value::String("key".into())), Some(Value::String(s)) if s == "val"));
        assert!(matches!(m.get(&Value::String("more".into())), Some(Value::String(s)) if s == "stuff"));
    }

    #[test]
    fn multi_document_stream() {
        let v = parse("---\na: 1\n---\nb: 2\n").unwrap();
        let docs = v.as_sequence().unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn shape_switch_without_document_separator_is_a_structure_error() {
        // Mapping, then a sequence entry at the top level with no `---` in
        // between: the second node group can't be reconciled with the first
        // and must not silently replace it.
        let err = parse("a: 1\n- 2\n").unwrap_err();
        assert!(matches!(err, Error::StructureError(_, _)));
    }

    #[test]
    fn flow_collection_as_whole_document() {
        let v = parse("{a: 1, b: 2}\n").unwrap();
        let m = v.as_mapping().unwrap();
        assert!(matches!(m.get(&Value::String("a".into())), Some(Value::Int(1))));
    }

    #[test]
    fn block_scalar_value() {
        let v = parse("text: |\n  line1\n  line2\n").unwrap();
        let m = v.as_mapping().unwrap();
        assert!(matches!(m.get(&Value::String("text".into())), Some(Value::String(s)) if s == "line1\nline2\n"));
    }

    #[test]
    fn regex_size_limit_violation_is_a_regex_engine_error() {
        let err = compile_bounded(FOLDED_HINT_PATTERN, 0, Position::new(1)).unwrap_err();
        assert!(matches!(err, Error::RegexEngineError(_, _)));
    }

    #[test]
    fn unknown_alias_is_an_error() {
        assert!(parse("a: *missing\n").is_err());
    }
}
