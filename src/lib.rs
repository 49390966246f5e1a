//! A small, line-oriented parser for a practical subset of YAML 1.x: block
//! and flow sequences/mappings, single- and double-quoted scalars, anchors
//! and aliases, the `<<` merge key, and literal/folded block scalars.
//!
//! Emission (turning a [`Value`] back into YAML text) and full tag/schema
//! resolution are out of scope; this crate reads configuration-shaped YAML
//! and hands back either a dynamically-typed [`Value`] tree or, via the
//! `serde` bridge, a typed Rust struct.
//!
//! # Example
//! ```rust
//! let doc = liteyaml::from_str_value("name: widget\ncount: 3\n").unwrap();
//! assert_eq!(doc["name"].as_str(), Some("widget"));
//! assert_eq!(doc["count"].as_i64(), Some(3));
//! ```

mod anchors;
mod de;
mod document;
mod error;
mod folded;
mod inline;
mod linked_hash_map;
mod normalize;
mod reader;
mod scalar;
mod scanner;
mod value;

pub use de::{from_slice, from_str};
pub use error::{Error, Position, Result};
pub use reader::{Cache, Reader};
pub use value::{Mapping, Sequence, Value};

/// Parse `text` into a dynamically-typed [`Value`] tree.
///
/// Named distinctly from [`from_str`] (the serde-typed entry point) since
/// both are commonly imported together.
pub fn from_str_value(text: &str) -> Result<Value> {
    document::parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_example_from_the_crate_docs() {
        let doc = from_str_value("name: widget\ncount: 3\n").unwrap();
        assert_eq!(doc["name"].as_str(), Some("widget"));
        assert_eq!(doc["count"].as_i64(), Some(3));
    }

    #[test]
    fn serde_bridge_round_trip() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Doc {
            a: i32,
            b: String,
        }
        let doc: Doc = from_str("a: 1\nb: two\n").unwrap();
        assert_eq!(
            doc,
            Doc {
                a: 1,
                b: "two".into()
            }
        );
    }

    #[test]
    fn unknown_anchor_is_a_reference_error() {
        assert!(matches!(
            from_str_value("a: *missing\n"),
            Err(Error::ReferenceError(_, _, _))
        ));
    }
}
