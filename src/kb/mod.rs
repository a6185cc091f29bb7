//! Knowledge records, identifiers, and result types.
//!
//! The store ([`store::KnowledgeBase`]) owns every [`Fact`] and [`Rule`]
//! record and hands out stable, never-reused ids. Justification bookkeeping
//! (`supported_by` and the mirroring `supports_*` back-references) holds
//! ids only — weak keys into the store, never ownership — so the retraction
//! cascade works by deleting entries from maps rather than juggling
//! lifetimes.

pub mod store;

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::bindings::BindingList;
use crate::statement::Statement;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Unique, niche-optimized identifier for a stored fact.
///
/// Uses `NonZeroU64` so that `Option<FactId>` is the same size as `FactId`.
/// Ids are allocated monotonically per store and never reused, so a stale
/// id can never alias a later item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct FactId(NonZeroU64);

impl FactId {
    /// Create a `FactId` from a raw `u64`. Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(FactId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fact:{}", self.0)
    }
}

/// Unique identifier for a stored rule. Same allocation discipline as
/// [`FactId`], in a separate id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RuleId(NonZeroU64);

impl RuleId {
    /// Create a `RuleId` from a raw `u64`. Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(RuleId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule:{}", self.0)
    }
}

/// Identifier for either kind of stored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemId {
    Fact(FactId),
    Rule(RuleId),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Fact(id) => write!(f, "{id}"),
            ItemId::Rule(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Justification pairs
// ---------------------------------------------------------------------------

/// One justification: the (fact, rule) pair whose combination derived an
/// item. An item with several pairs has that many independent derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportPair {
    /// The antecedent fact.
    pub fact: FactId,
    /// The rule the fact was chained against.
    pub rule: RuleId,
}

impl SupportPair {
    /// Create a new justification pair.
    pub fn new(fact: FactId, rule: RuleId) -> Self {
        Self { fact, rule }
    }

    /// True if either member of the pair is the given item.
    pub fn references(&self, id: ItemId) -> bool {
        match id {
            ItemId::Fact(fact) => self.fact == fact,
            ItemId::Rule(rule) => self.rule == rule,
        }
    }
}

impl std::fmt::Display for SupportPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.fact, self.rule)
    }
}

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

/// A stored fact with its justification bookkeeping.
///
/// Bookkeeping fields are store-private; the read-only accessors expose
/// them for justification inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    /// The statement this fact holds true.
    pub statement: Statement,
    pub(crate) asserted: bool,
    pub(crate) supported_by: Vec<SupportPair>,
    pub(crate) supports_facts: Vec<FactId>,
    pub(crate) supports_rules: Vec<RuleId>,
}

impl Fact {
    pub(crate) fn new(statement: Statement, asserted: bool) -> Self {
        Self {
            statement,
            asserted,
            supported_by: Vec::new(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
        }
    }

    /// True iff this fact was explicitly asserted by a caller (it may also
    /// carry derivation support on top).
    pub fn asserted(&self) -> bool {
        self.asserted
    }

    /// The justification pairs that derived this fact.
    pub fn supported_by(&self) -> &[SupportPair] {
        &self.supported_by
    }

    /// Facts whose justifications name this fact as an antecedent.
    pub fn supports_facts(&self) -> &[FactId] {
        &self.supports_facts
    }

    /// Rules whose justifications name this fact as an antecedent.
    pub fn supports_rules(&self) -> &[RuleId] {
        &self.supports_rules
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.statement)
    }
}

/// A stored implication rule: a conjunction of antecedent statements (`lhs`)
/// implying a consequent (`rhs`). Carries the same justification
/// bookkeeping as [`Fact`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// The ordered antecedents; chaining always resolves `lhs[0]` first.
    pub lhs: Vec<Statement>,
    /// The consequent.
    pub rhs: Statement,
    pub(crate) asserted: bool,
    pub(crate) supported_by: Vec<SupportPair>,
    pub(crate) supports_facts: Vec<FactId>,
    pub(crate) supports_rules: Vec<RuleId>,
}

impl Rule {
    pub(crate) fn new(lhs: Vec<Statement>, rhs: Statement, asserted: bool) -> Self {
        Self {
            lhs,
            rhs,
            asserted,
            supported_by: Vec::new(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
        }
    }

    /// True iff this rule was explicitly asserted by a caller.
    pub fn asserted(&self) -> bool {
        self.asserted
    }

    /// The justification pairs that derived this rule.
    pub fn supported_by(&self) -> &[SupportPair] {
        &self.supported_by
    }

    /// Facts whose justifications name this rule.
    pub fn supports_facts(&self) -> &[FactId] {
        &self.supports_facts
    }

    /// Rules whose justifications name this rule.
    pub fn supports_rules(&self) -> &[RuleId] {
        &self.supports_rules
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, antecedent) in self.lhs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{antecedent}")?;
        }
        write!(f, ") -> {}", self.rhs)
    }
}

// ---------------------------------------------------------------------------
// External input
// ---------------------------------------------------------------------------

/// External input to the store: a fact- or rule-shaped item.
///
/// The parser collaborator builds these from text; they carry structure
/// only, never bookkeeping, and every call produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    /// A fact-shaped item.
    Fact(Statement),
    /// A rule-shaped item.
    Rule {
        /// The antecedent conjunction.
        lhs: Vec<Statement>,
        /// The consequent.
        rhs: Statement,
    },
}

impl Item {
    /// Create a fact-shaped item.
    pub fn fact(statement: Statement) -> Self {
        Item::Fact(statement)
    }

    /// Create a rule-shaped item.
    pub fn rule(lhs: Vec<Statement>, rhs: Statement) -> Self {
        Item::Rule { lhs, rhs }
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Fact(statement) => write!(f, "fact: {statement}"),
            Item::Rule { lhs, rhs } => {
                write!(f, "rule: (")?;
                for (i, antecedent) in lhs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{antecedent}")?;
                }
                write!(f, ") -> {rhs}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// One successful match from a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMatch {
    /// The substitution making the query equal to the matched fact.
    pub bindings: BindingList,
    /// The stored fact(s) that produced this binding.
    pub support: Vec<FactId>,
}

/// Ordered query answer: one entry per matching stored fact, in the
/// store's insertion order. Empty for no match or an invalid query shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The matches, in fact insertion order.
    pub matches: Vec<QueryMatch>,
}

impl QueryResult {
    /// Number of matches.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterate over the matches in answer order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryMatch> {
        self.matches.iter()
    }
}

/// Outcome of a retraction cascade.
#[derive(Debug, Clone, Default)]
pub struct RetractionResult {
    /// Facts removed, the retract target first, then in cascade order.
    pub removed_facts: Vec<FactId>,
    /// Rules removed by the cascade.
    pub removed_rules: Vec<RuleId>,
    /// Deepest cascade level reached (0 when nothing depended on the
    /// target).
    pub cascade_depth: usize,
}

impl RetractionResult {
    /// True if the retraction removed nothing (absent or rule-shaped
    /// target).
    pub fn is_noop(&self) -> bool {
        self.removed_facts.is_empty() && self.removed_rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Term;

    #[test]
    fn id_niche_optimization() {
        assert_eq!(
            std::mem::size_of::<Option<FactId>>(),
            std::mem::size_of::<FactId>()
        );
        assert!(FactId::new(0).is_none());
        assert_eq!(FactId::new(42).unwrap().get(), 42);
    }

    #[test]
    fn id_display() {
        assert_eq!(FactId::new(3).unwrap().to_string(), "fact:3");
        assert_eq!(RuleId::new(2).unwrap().to_string(), "rule:2");
        assert_eq!(ItemId::Rule(RuleId::new(2).unwrap()).to_string(), "rule:2");
    }

    #[test]
    fn support_pair_references_either_member() {
        let pair = SupportPair::new(FactId::new(1).unwrap(), RuleId::new(2).unwrap());
        assert!(pair.references(ItemId::Fact(FactId::new(1).unwrap())));
        assert!(pair.references(ItemId::Rule(RuleId::new(2).unwrap())));
        assert!(!pair.references(ItemId::Fact(FactId::new(2).unwrap())));
        assert!(!pair.references(ItemId::Rule(RuleId::new(1).unwrap())));
    }

    #[test]
    fn item_display() {
        let fact = Item::fact(Statement::new(
            "motherof",
            vec![Term::constant("ada"), Term::constant("bing")],
        ));
        assert_eq!(fact.to_string(), "fact: (motherof ada bing)");

        let rule = Item::rule(
            vec![Statement::new(
                "motherof",
                vec![Term::variable("x"), Term::variable("y")],
            )],
            Statement::new("parentof", vec![Term::variable("x"), Term::variable("y")]),
        );
        assert_eq!(
            rule.to_string(),
            "rule: ((motherof ?x ?y)) -> (parentof ?x ?y)"
        );
    }

    #[test]
    fn retraction_result_noop() {
        assert!(RetractionResult::default().is_noop());
    }
}
