//! Pairwise forward chaining: one fact against one rule.
//!
//! [`derive`] is the sole generator of derived knowledge. The store invokes
//! it symmetrically from its add path — a new fact against every existing
//! rule, existing facts against a new rule — and re-enters the add path
//! with whatever it produces, which drives chaining to a fixed point across
//! multi-antecedent rules: each step against the first antecedent either
//! specializes the rule (antecedents remain) or grounds its consequent
//! (last antecedent resolved). The function itself is pure; the store
//! records the justification pair for every derivation.

use crate::statement::Statement;
use crate::unify::{instantiate, unify};

/// Knowledge produced by one forward-chaining step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// The rule's last antecedent resolved: the instantiated consequent.
    Fact(Statement),
    /// Antecedents remain: a specialized, shorter rule.
    Rule {
        /// The remaining antecedents, instantiated under the binding.
        lhs: Vec<Statement>,
        /// The consequent, instantiated under the binding.
        rhs: Statement,
    },
}

/// Chain a fact against a rule's first antecedent.
///
/// Returns `None` when they do not unify (the normal, silent outcome).
/// With more than one antecedent, the result is a shorter rule whose
/// remaining antecedents and consequent are instantiated under the binding
/// (unbound variables survive for later steps). With exactly one
/// antecedent, the result is the instantiated consequent as a new fact.
pub fn derive(fact: &Statement, lhs: &[Statement], rhs: &Statement) -> Option<Derivation> {
    let first = lhs.first()?;
    let bindings = unify(fact, first)?;
    if lhs.len() > 1 {
        let remaining = lhs[1..]
            .iter()
            .map(|antecedent| instantiate(antecedent, &bindings))
            .collect();
        Some(Derivation::Rule {
            lhs: remaining,
            rhs: instantiate(rhs, &bindings),
        })
    } else {
        Some(Derivation::Fact(instantiate(rhs, &bindings)))
    }
}
