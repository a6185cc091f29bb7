//! Core statement types for the seshat knowledge base.
//!
//! A [`Statement`] is the atomic unit of knowledge: a predicate name applied
//! to an ordered sequence of [`Term`] arguments, each either a constant or a
//! variable. Structural equality over statements (predicate, argument order,
//! and constant/variable tags) is the store's dedup key.

use serde::{Deserialize, Serialize};

/// One argument position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A ground value.
    Constant(String),
    /// A named variable. The name is stored without the `?` sigil;
    /// `Display` adds it back.
    Variable(String),
}

impl Term {
    /// Create a constant term.
    pub fn constant(value: impl Into<String>) -> Self {
        Term::Constant(value.into())
    }

    /// Create a variable term.
    pub fn variable(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// True if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Constant(value) => write!(f, "{value}"),
            Term::Variable(name) => write!(f, "?{name}"),
        }
    }
}

/// A predicate applied to ordered arguments: `(motherof ada bing)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// The predicate name.
    pub predicate: String,
    /// The ordered arguments.
    pub args: Vec<Term>,
}

impl Statement {
    /// Create a new statement.
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// True if no argument is a variable.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(|term| !term.is_variable())
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(x: Term, y: Term) -> Statement {
        Statement::new("parentof", vec![x, y])
    }

    #[test]
    fn display_forms() {
        let stmt = parent(Term::constant("ada"), Term::variable("X"));
        assert_eq!(stmt.to_string(), "(parentof ada ?X)");
        assert_eq!(Statement::new("sunny", vec![]).to_string(), "(sunny)");
    }

    #[test]
    fn equality_is_tag_aware() {
        // A constant and a variable with the same text are different terms.
        let ground = parent(Term::constant("ada"), Term::constant("bing"));
        let templ = parent(Term::constant("ada"), Term::variable("bing"));
        assert_ne!(ground, templ);
        assert_eq!(ground, parent(Term::constant("ada"), Term::constant("bing")));
    }

    #[test]
    fn equality_respects_argument_order() {
        let ab = parent(Term::constant("a"), Term::constant("b"));
        let ba = parent(Term::constant("b"), Term::constant("a"));
        assert_ne!(ab, ba);
    }

    #[test]
    fn statements_are_hashable() {
        let mut set = std::collections::HashSet::new();
        set.insert(parent(Term::constant("ada"), Term::constant("bing")));
        set.insert(parent(Term::constant("ada"), Term::constant("bing")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ground_check() {
        assert!(parent(Term::constant("ada"), Term::constant("bing")).is_ground());
        assert!(!parent(Term::constant("ada"), Term::variable("X")).is_ground());
    }
}
