//! The anchor/alias table: a mapping from anchor name to the value it last
//! captured, shared by reference between a document parser and every
//! sub-parser it spawns for nested blocks.

use crate::error::{Error, Position};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Cheap to clone: cloning shares the same underlying table, which is the
/// point — a nested sub-parser must see anchors declared by its parent and
/// vice versa.
#[derive(Clone, Debug, Default)]
pub struct AnchorTable(Rc<RefCell<HashMap<String, Value>>>);

impl AnchorTable {
    #[must_use]
    pub fn new() -> Self {
        AnchorTable(Rc::new(RefCell::new(HashMap::new())))
    }

    /// Record (or replace) the value captured under `name`.
    pub fn assign(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(name.into(), value);
    }

    /// Look up an alias. Raises [`Error::ReferenceError`] if `name` was
    /// never assigned — callers are responsible for only calling this after
    /// the document order guarantees any legitimate anchor would already be
    /// recorded. `line` is the verbatim source line the alias appeared on,
    /// carried along for the error message.
    pub fn lookup(&self, name: &str, at: Position, line: &str) -> Result<Value, Error> {
        self.0
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ReferenceError(at, name.to_owned(), line.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_then_lookup() {
        let t = AnchorTable::new();
        t.assign("B", Value::Int(42));
        let v = t.lookup("B", Position::new(1), "ref: *B").unwrap();
        assert!(matches!(v, Value::Int(42)));
    }

    #[test]
    fn unknown_alias_is_a_reference_error() {
        let t = AnchorTable::new();
        assert!(matches!(
            t.lookup("nope", Position::new(1), "a: *nope"),
            Err(Error::ReferenceError(_, _, _))
        ));
    }

    #[test]
    fn shared_across_clones() {
        let t = AnchorTable::new();
        let sub = t.clone();
        sub.assign("shared", Value::Bool(true));
        assert!(t.lookup("shared", Position::new(1), "x: *shared").is_ok());
    }

    #[test]
    fn redeclaration_replaces() {
        let t = AnchorTable::new();
        t.assign("x", Value::Int(1));
        t.assign("x", Value::Int(2));
        assert!(matches!(
            t.lookup("x", Position::new(1), "y: *x").unwrap(),
            Value::Int(2)
        ));
    }
}
