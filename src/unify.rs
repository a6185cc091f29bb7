//! Unification and instantiation over statements.
//!
//! The matcher is deliberately directional and first-order: a variable on
//! either side binds to the opposite term as the arguments are walked left
//! to right, with no occurs-check and no resolution through chains of
//! variable-to-variable bindings. Failure is an ordinary `None`, consumed
//! by control flow, never an error.

use crate::bindings::BindingList;
use crate::statement::{Statement, Term};

/// Attempt to unify two statements.
///
/// Succeeds only if the predicate names and argument counts agree and every
/// argument pair is compatible under the bindings discovered so far. A
/// variable binds to the opposite term (constant or variable); a repeated
/// variable must agree with its earlier binding; two constants must be
/// equal. The returned [`BindingList`] iterates in left-to-right discovery
/// order.
pub fn unify(a: &Statement, b: &Statement) -> Option<BindingList> {
    if a.predicate != b.predicate || a.args.len() != b.args.len() {
        return None;
    }
    let mut bindings = BindingList::new();
    for (left, right) in a.args.iter().zip(&b.args) {
        match (left, right) {
            (Term::Variable(name), other) => {
                if !bindings.test_and_bind(name, other) {
                    return None;
                }
            }
            (other, Term::Variable(name)) => {
                if !bindings.test_and_bind(name, other) {
                    return None;
                }
            }
            (Term::Constant(lhs), Term::Constant(rhs)) => {
                if lhs != rhs {
                    return None;
                }
            }
        }
    }
    Some(bindings)
}

/// Rewrite a statement under a substitution.
///
/// Bound variables are replaced by their values; unbound variables survive,
/// so a partially-matched rule keeps the variables its remaining
/// antecedents still need.
pub fn instantiate(statement: &Statement, bindings: &BindingList) -> Statement {
    let args = statement
        .args
        .iter()
        .map(|term| match term {
            Term::Variable(name) => bindings
                .bound_to(name)
                .cloned()
                .unwrap_or_else(|| term.clone()),
            Term::Constant(_) => term.clone(),
        })
        .collect();
    Statement::new(statement.predicate.clone(), args)
}
