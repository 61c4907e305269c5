use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::lang::ast::Identifier;

/// Variable environment
///
/// Names are case sensitive. Iteration is ordered by name, which is the order variables are
/// reported in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    inner: BTreeMap<Identifier, f64>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ident: &Identifier) -> Option<f64> {
        self.inner.get(ident).copied()
    }

    pub fn insert(&mut self, ident: Identifier, val: f64) {
        self.inner.insert(ident, val);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Identifier, f64> {
        self.inner.iter()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Take a working copy to evaluate one statement against
    pub fn snapshot(&self) -> Variables {
        self.clone()
    }

    /// Merge a working copy back in
    ///
    /// Only additions and updates are carried over. Nothing is ever removed.
    pub fn commit(&mut self, working: Variables) {
        self.inner.extend(working.inner);
    }
}

#[cfg(test)]
fn ident(s: &str) -> Identifier {
    Identifier(s.to_string())
}

#[test]
fn test_get_insert() {
    let mut vars = Variables::new();
    assert!(vars.is_empty());
    assert_eq!(vars.get(&ident("x")), None);

    vars.insert(ident("x"), 1.0);
    vars.insert(ident("X"), 2.0);
    vars.insert(ident("x"), 3.0);

    assert_eq!(vars.len(), 2);
    assert_eq!(vars.get(&ident("x")), Some(3.0));
    assert_eq!(vars.get(&ident("X")), Some(2.0));
}

#[test]
fn test_sorted_iteration() {
    let mut vars = Variables::new();
    for (name, val) in &[("zeta", 1.0), ("alpha", 2.0), ("mid", 3.0)] {
        vars.insert(ident(name), *val);
    }

    let names: Vec<String> = vars.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_snapshot_commit() {
    let mut vars = Variables::new();
    vars.insert(ident("a"), 1.0);
    vars.insert(ident("b"), 2.0);

    let mut working = vars.snapshot();
    working.insert(ident("b"), 20.0);
    working.insert(ident("c"), 30.0);

    // Working copy is isolated until committed
    assert_eq!(vars.get(&ident("b")), Some(2.0));
    assert_eq!(vars.get(&ident("c")), None);

    vars.commit(working);
    assert_eq!(vars.get(&ident("a")), Some(1.0));
    assert_eq!(vars.get(&ident("b")), Some(20.0));
    assert_eq!(vars.get(&ident("c")), Some(30.0));

    vars.clear();
    assert!(vars.is_empty());
}
