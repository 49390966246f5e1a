//! Integration tests for the documented parse scenarios and the invariants
//! and laws they're meant to exercise.

use indoc::indoc;
use liteyaml::{Error, Value};
use pretty_assertions::assert_eq;

/// Surfaces the `trace!`/`debug!` instrumentation in `document`/`scanner`
/// when a test fails, without forcing every test run to print it. Safe to
/// call from every test since `try_init` is a no-op after the first call.
fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn val(s: &str) -> Value {
    init_logging();
    liteyaml::from_str_value(s).expect("valid YAML")
}

#[test]
fn scenario_1_flat_mapping() {
    let doc = val("a: 1\nb: hello\n");
    assert_eq!(doc["a"].as_i64(), Some(1));
    assert_eq!(doc["b"].as_str(), Some("hello"));
}

#[test]
fn scenario_2_sequence_of_mixed_kinds() {
    let doc = val("- 1\n- [2, 3]\n- {k: v}\n");
    let seq = doc.as_sequence().unwrap();
    assert_eq!(seq.len(), 3);
    assert_eq!(seq[0].as_i64(), Some(1));
    assert_eq!(
        seq[1].as_sequence().unwrap().iter().map(|v| v.as_i64().unwrap()).collect::<Vec<_>>(),
        vec![2, 3]
    );
    assert_eq!(seq[2]["k"].as_str(), Some("v"));
}

#[test]
fn scenario_3_merge_key_ordering() {
    let doc = val(indoc! {"
        base: &B
          x: 1
          y: 2
        der:
          <<: *B
          y: 9
          z: 3
    "});
    assert_eq!(doc["der"]["x"].as_i64(), Some(1));
    assert_eq!(doc["der"]["y"].as_i64(), Some(9));
    assert_eq!(doc["der"]["z"].as_i64(), Some(3));
}

#[test]
fn scenario_4_literal_and_folded_block_scalars() {
    let literal = val("text: |\n  line1\n  line2\n");
    assert_eq!(literal["text"].as_str(), Some("line1\nline2\n"));

    let folded = val("text: >\n  line1\n  line2\n");
    assert_eq!(folded["text"].as_str(), Some("line1 line2\n"));
}

#[test]
fn scenario_5_multi_document_stream() {
    let doc = val("---\na: 1\n---\nb: 2\n");
    let docs = doc.as_sequence().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["a"].as_i64(), Some(1));
    assert_eq!(docs[1]["b"].as_i64(), Some(2));
}

#[test]
fn scenario_6_tab_indentation_is_rejected() {
    let err = liteyaml::from_str_value("tabby:\n\tindented: x\n").unwrap_err();
    match err {
        Error::TabIndentation(pos, _) => assert_eq!(pos.line, 2),
        other => panic!("expected TabIndentation, got {other:?}"),
    }
}

#[test]
fn invariant_alias_must_be_declared_earlier() {
    let err = liteyaml::from_str_value("a: *not_yet_declared\n").unwrap_err();
    assert!(matches!(err, Error::ReferenceError(_, _, _)));
}

#[test]
fn invariant_mapping_key_uniqueness_last_write_wins_in_place() {
    // Re-declaring a key updates it in place rather than producing a
    // duplicate pair; LinkedHashMap-backed Mapping has one entry per key by
    // construction, so this also covers "no two pairs have equal keys".
    let doc = val("a: 1\na: 2\n");
    assert_eq!(doc.as_mapping().unwrap().len(), 1);
    assert_eq!(doc["a"].as_i64(), Some(2));
}

#[test]
fn invariant_error_line_numbers_match_original_source() {
    let err = liteyaml::from_str_value("a: 1\nb: 2\n    c: 3\n").unwrap_err();
    // "    c: 3" is more indented than its siblings with no preceding key to
    // own a nested block, so it is rejected as an indentation error on line 3.
    assert_eq!(err.position().unwrap().line, 3);
}

#[test]
fn invariant_parsing_is_deterministic() {
    let text = "a:\n  - 1\n  - two\n  - {x: 1.5}\nb: *missing\n";
    // Both parses fail identically (same error) since nothing here depends
    // on iteration order, hashing, or timing.
    let first = liteyaml::from_str_value(text);
    let second = liteyaml::from_str_value(text);
    assert_eq!(first.is_err(), second.is_err());
    assert!(matches!(first.unwrap_err(), Error::ReferenceError(_, _, _)));
}

#[test]
fn law_normalizing_lf_only_input_is_a_no_op() {
    let a = val("a: 1\nb: 2\n");
    let b = val("a: 1\nb: 2\n");
    assert_eq!(a, b);
}

#[test]
fn law_chomping_strip_clip_keep_are_nested_suffixes() {
    let strip = val("t: |-\n  line\n\n\n")["t"].as_str().unwrap().to_owned();
    let clip = val("t: |\n  line\n\n\n")["t"].as_str().unwrap().to_owned();
    let keep = val("t: |+\n  line\n\n\n")["t"].as_str().unwrap().to_owned();
    assert!(clip.starts_with(&strip));
    assert!(keep.starts_with(&clip));
}

#[test]
fn law_inline_round_trip_for_plain_structures() {
    // A flow rendering of a value made only of scalars/sequences/mappings
    // with string keys and no aliases re-parses to the same value.
    let doc = val("[1, two, {k: 3}]");
    let rendered = "[1, two, {k: 3}]";
    let reparsed = val(rendered);
    assert_eq!(doc, reparsed);
}

#[test]
fn reader_facade_reports_file_not_found() {
    let reader = liteyaml::Reader::new();
    assert!(matches!(
        reader.read("/definitely/not/a/real/path.yaml"),
        Err(Error::FileNotFound(_))
    ));
}
