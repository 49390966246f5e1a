use crate::linked_hash_map::LinkedHashMap;
use std::hash::{Hash, Hasher};

/// An ordered sequence of [`Value`]s.
pub type Sequence = Vec<Value>;

/// An insertion-order mapping of [`Value`] keys to [`Value`]s.
///
/// Wraps [`LinkedHashMap`] generalized from the teacher crate's
/// `LinkedHashMap<Yaml, Yaml>` to this crate's own node type. Re-inserting an
/// existing key updates it in place rather than moving it to the end, which
/// is what the merge-key semantics in [`crate::document`] rely on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mapping(LinkedHashMap<Value, Value>);

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Mapping(LinkedHashMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Mapping(LinkedHashMap::with_capacity(capacity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a key/value pair, returning the previous value if the key was
    /// already present. The position of an updated key is unchanged.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// The pair most recently inserted (by first insertion, not last update).
    #[must_use]
    pub fn back(&self) -> Option<(&Value, &Value)> {
        self.0.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.0.iter()
    }
}

impl IntoIterator for Mapping {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a Value, &'a Value);
    type IntoIter = crate::linked_hash_map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Value, Value)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        Mapping(LinkedHashMap::from_iter(iter))
    }
}

/// The dynamically-typed value tree produced by a parse.
///
/// Mirrors the teacher crate's `Yaml` enum (`Real`/`Integer`/`String`/
/// `Boolean`/`Array`/`Hash`) but generalized to the node set this parser's
/// scalar evaluator actually produces: no `Alias` or `BadValue` case, since
/// aliases are resolved to their anchor's value during parsing and indexing
/// a missing key returns `None` rather than a sentinel node.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Seconds since the Unix epoch, as parsed from an ISO-8601-ish timestamp scalar.
    Timestamp(i64),
    String(String),
    Sequence(Sequence),
    Mapping(Mapping),
}

impl Value {
    #[must_use]
    pub fn as_null(&self) -> Option<()> {
        matches!(self, Value::Null).then_some(())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<i64> {
        match *self {
            Value::Timestamp(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// A float's bit pattern stands in for its value in `Eq`/`Hash`, since IEEE
/// 754 equality (`NaN != NaN`) can't back a total order. Two different NaN
/// bit patterns are therefore distinct map keys; this only matters for the
/// degenerate case of a mapping keyed by NaN, which is not otherwise a
/// meaningful YAML document.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Timestamp(t) => {
                4u8.hash(state);
                t.hash(state);
            }
            Value::String(s) => {
                5u8.hash(state);
                s.hash(state);
            }
            Value::Sequence(a) => {
                6u8.hash(state);
                a.hash(state);
            }
            Value::Mapping(m) => {
                7u8.hash(state);
                m.hash(state);
            }
        }
    }
}

static NULL: Value = Value::Null;

impl std::ops::Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        match self {
            Value::Mapping(m) => m.get(&Value::String(key.to_owned())).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl std::ops::Index<usize> for Value {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        match self {
            Value::Sequence(s) => s.get(idx).unwrap_or(&NULL),
            Value::Mapping(m) => m.get(&Value::Int(idx as i64)).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}
