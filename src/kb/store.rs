//! The knowledge base store: assertion, querying, and retraction.
//!
//! Facts and rules live in id-keyed maps, dual-indexed with
//! insertion-order vectors (queries answer in assertion order) and
//! structural indexes (dedup by structural equality). Assertion
//! forward-chains to a fixed point at add time, so querying is pure
//! matching. Retraction walks the justification graph with an explicit
//! work-list, pruning every item left with neither an assertion nor a
//! surviving justification while preserving items that keep an
//! independent derivation.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{SeshatResult, StoreError};
use crate::infer::{self, Derivation};
use crate::kb::{
    Fact, FactId, Item, ItemId, QueryMatch, QueryResult, RetractionResult, Rule, RuleId,
    SupportPair,
};
use crate::statement::Statement;
use crate::unify::unify;

/// Structural dedup key for rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RuleKey {
    lhs: Vec<Statement>,
    rhs: Statement,
}

/// Support lists of a detached record, kept just long enough to drive the
/// cascade past it.
struct Detached {
    supported_by: Vec<SupportPair>,
    supports_facts: Vec<FactId>,
    supports_rules: Vec<RuleId>,
}

impl Detached {
    fn dependents(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.supports_facts
            .iter()
            .map(|&id| ItemId::Fact(id))
            .chain(self.supports_rules.iter().map(|&id| ItemId::Rule(id)))
    }
}

/// A forward-chaining knowledge base.
///
/// All collections are allocated fresh per instance. The store is
/// exclusively owned by one logical session: every mutation runs to
/// completion through `&mut self` before returning.
pub struct KnowledgeBase {
    facts: HashMap<FactId, Fact>,
    rules: HashMap<RuleId, Rule>,
    /// Insertion order; drives query answer order and chaining sweeps.
    fact_order: Vec<FactId>,
    rule_order: Vec<RuleId>,
    fact_index: HashMap<Statement, FactId>,
    rule_index: HashMap<RuleKey, RuleId>,
    next_fact: u64,
    next_rule: u64,
}

impl KnowledgeBase {
    /// Create a new empty knowledge base.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty knowledge base with capacity hints for the expected
    /// number of facts and rules.
    pub fn with_capacity(facts: usize, rules: usize) -> Self {
        Self {
            facts: HashMap::with_capacity(facts),
            rules: HashMap::with_capacity(rules),
            fact_order: Vec::with_capacity(facts),
            rule_order: Vec::with_capacity(rules),
            fact_index: HashMap::with_capacity(facts),
            rule_index: HashMap::with_capacity(rules),
            next_fact: 1,
            next_rule: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only inspection
    // -----------------------------------------------------------------------

    /// Look up a fact record by id.
    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id)
    }

    /// Look up a rule record by id.
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Iterate facts in insertion order.
    pub fn facts(&self) -> impl Iterator<Item = (FactId, &Fact)> + '_ {
        self.fact_order
            .iter()
            .filter_map(|&id| self.facts.get(&id).map(|fact| (id, fact)))
    }

    /// Iterate rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> + '_ {
        self.rule_order
            .iter()
            .filter_map(|&id| self.rules.get(&id).map(|rule| (id, rule)))
    }

    /// Number of live facts.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Number of live rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Find the stored fact structurally equal to `statement`.
    pub fn find_fact(&self, statement: &Statement) -> Option<FactId> {
        self.fact_index.get(statement).copied()
    }

    /// Find the stored rule structurally equal to `(lhs, rhs)`.
    pub fn find_rule(&self, lhs: &[Statement], rhs: &Statement) -> Option<RuleId> {
        self.rule_index
            .get(&RuleKey {
                lhs: lhs.to_vec(),
                rhs: rhs.clone(),
            })
            .copied()
    }

    /// True if a structurally equal item is live.
    pub fn contains(&self, item: &Item) -> bool {
        match item {
            Item::Fact(statement) => self.find_fact(statement).is_some(),
            Item::Rule { lhs, rhs } => self.find_rule(lhs, rhs).is_some(),
        }
    }

    /// True if the id refers to a live item.
    pub fn is_live(&self, id: ItemId) -> bool {
        match id {
            ItemId::Fact(fact) => self.facts.contains_key(&fact),
            ItemId::Rule(rule) => self.rules.contains_key(&rule),
        }
    }

    /// Justification pairs for any live item.
    pub fn supported_by(&self, id: ItemId) -> Option<&[SupportPair]> {
        match id {
            ItemId::Fact(fact) => self.facts.get(&fact).map(|f| f.supported_by()),
            ItemId::Rule(rule) => self.rules.get(&rule).map(|r| r.supported_by()),
        }
    }

    /// Items whose justifications name `id` as an antecedent.
    pub fn dependents(&self, id: ItemId) -> Option<Vec<ItemId>> {
        let (facts, rules) = match id {
            ItemId::Fact(fact) => {
                let f = self.facts.get(&fact)?;
                (&f.supports_facts, &f.supports_rules)
            }
            ItemId::Rule(rule) => {
                let r = self.rules.get(&rule)?;
                (&r.supports_facts, &r.supports_rules)
            }
        };
        Some(
            facts
                .iter()
                .map(|&f| ItemId::Fact(f))
                .chain(rules.iter().map(|&r| ItemId::Rule(r)))
                .collect(),
        )
    }

    // -----------------------------------------------------------------------
    // Assertion and chaining
    // -----------------------------------------------------------------------

    /// Assert a fact or rule into the knowledge base.
    ///
    /// The single external mutation entry point for adding knowledge:
    /// inserts the item (or merges with a structural duplicate) and
    /// forward-chains to a fixed point before returning. Returns the id of
    /// the inserted or pre-existing item.
    pub fn assert(&mut self, item: Item) -> SeshatResult<ItemId> {
        tracing::debug!(%item, "asserting");
        match item {
            Item::Fact(statement) => Ok(ItemId::Fact(self.add_fact(statement, None)?)),
            Item::Rule { lhs, rhs } => Ok(ItemId::Rule(self.add_rule(lhs, rhs, None)?)),
        }
    }

    /// Insert or merge a fact. A new fact is chained against every existing
    /// rule; a duplicate merges per [`Self::merge`].
    fn add_fact(&mut self, statement: Statement, support: Option<SupportPair>) -> SeshatResult<FactId> {
        if let Some(&id) = self.fact_index.get(&statement) {
            self.merge(ItemId::Fact(id), support);
            return Ok(id);
        }

        let id = self.next_fact_id()?;
        let mut fact = Fact::new(statement.clone(), support.is_none());
        if let Some(pair) = support {
            fact.supported_by.push(pair);
        }
        self.fact_index.insert(statement, id);
        self.facts.insert(id, fact);
        self.fact_order.push(id);
        if let Some(pair) = support {
            self.register_support(ItemId::Fact(id), pair);
        }

        for rule_id in self.rule_order.clone() {
            self.chain_pair(id, rule_id)?;
        }
        Ok(id)
    }

    /// Insert or merge a rule. A new rule is chained against every existing
    /// fact.
    fn add_rule(
        &mut self,
        lhs: Vec<Statement>,
        rhs: Statement,
        support: Option<SupportPair>,
    ) -> SeshatResult<RuleId> {
        let key = RuleKey {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        };
        if let Some(&id) = self.rule_index.get(&key) {
            self.merge(ItemId::Rule(id), support);
            return Ok(id);
        }

        let id = self.next_rule_id()?;
        let mut rule = Rule::new(lhs, rhs, support.is_none());
        if let Some(pair) = support {
            rule.supported_by.push(pair);
        }
        self.rule_index.insert(key, id);
        self.rules.insert(id, rule);
        self.rule_order.push(id);
        if let Some(pair) = support {
            self.register_support(ItemId::Rule(id), pair);
        }

        for fact_id in self.fact_order.clone() {
            self.chain_pair(fact_id, id)?;
        }
        Ok(id)
    }

    /// Merge an incoming structural duplicate into the stored item: a
    /// supported duplicate contributes an additional independent
    /// justification; an unsupported re-assertion flips the stored item to
    /// asserted.
    fn merge(&mut self, id: ItemId, support: Option<SupportPair>) {
        let Some(pair) = support else {
            match id {
                ItemId::Fact(fact) => {
                    if let Some(f) = self.facts.get_mut(&fact) {
                        f.asserted = true;
                    }
                }
                ItemId::Rule(rule) => {
                    if let Some(r) = self.rules.get_mut(&rule) {
                        r.asserted = true;
                    }
                }
            }
            return;
        };

        // An item never justifies itself; a rule like (p ?x) -> (p ?x)
        // would otherwise record one.
        if pair.references(id) {
            tracing::trace!(%id, %pair, "skipping self-justification");
            return;
        }

        let appended = match id {
            ItemId::Fact(fact) => self.facts.get_mut(&fact).is_some_and(|f| {
                if f.supported_by.contains(&pair) {
                    false
                } else {
                    f.supported_by.push(pair);
                    true
                }
            }),
            ItemId::Rule(rule) => self.rules.get_mut(&rule).is_some_and(|r| {
                if r.supported_by.contains(&pair) {
                    false
                } else {
                    r.supported_by.push(pair);
                    true
                }
            }),
        };
        if appended {
            self.register_support(id, pair);
        }
    }

    /// Forward-chain one (fact, rule) pair, inserting whatever it derives
    /// with the pair recorded as its justification.
    fn chain_pair(&mut self, fact_id: FactId, rule_id: RuleId) -> SeshatResult<()> {
        let (Some(fact), Some(rule)) = (self.facts.get(&fact_id), self.rules.get(&rule_id))
        else {
            return Ok(());
        };
        let Some(derived) = infer::derive(&fact.statement, &rule.lhs, &rule.rhs) else {
            return Ok(());
        };

        let pair = SupportPair::new(fact_id, rule_id);
        match derived {
            Derivation::Fact(statement) => {
                tracing::trace!(%statement, %fact_id, %rule_id, "derived fact");
                self.add_fact(statement, Some(pair))?;
            }
            Derivation::Rule { lhs, rhs } => {
                tracing::trace!(%rhs, %fact_id, %rule_id, "derived rule");
                self.add_rule(lhs, rhs, Some(pair))?;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Querying
    // -----------------------------------------------------------------------

    /// Query the knowledge base with a fact-shaped item.
    ///
    /// Matches the query statement against every stored fact in insertion
    /// order; inference already ran at assertion time, so querying never
    /// chains. A rule-shaped query is invalid input: it logs a diagnostic
    /// and answers empty.
    pub fn ask(&self, query: &Item) -> QueryResult {
        let Item::Fact(statement) = query else {
            tracing::warn!(%query, "invalid query: only fact-shaped items can be asked");
            return QueryResult::default();
        };

        let mut matches = Vec::new();
        for &id in &self.fact_order {
            let Some(fact) = self.facts.get(&id) else {
                continue;
            };
            if let Some(bindings) = unify(statement, &fact.statement) {
                matches.push(QueryMatch {
                    bindings,
                    support: vec![id],
                });
            }
        }
        QueryResult { matches }
    }

    // -----------------------------------------------------------------------
    // Retraction
    // -----------------------------------------------------------------------

    /// Retract a fact, cascading removal through everything left
    /// unjustified.
    ///
    /// Only facts are eligible: retracting a rule-shaped or absent item is
    /// a no-op. The located fact loses its asserted flag and is removed
    /// unconditionally; dependents are then pruned unless they keep an
    /// independent justification or were asserted themselves.
    pub fn retract(&mut self, item: &Item) -> RetractionResult {
        let Item::Fact(statement) = item else {
            tracing::debug!(%item, "retract ignores rule-shaped items");
            return RetractionResult::default();
        };
        let Some(&id) = self.fact_index.get(statement) else {
            tracing::debug!(%statement, "retract of absent fact is a no-op");
            return RetractionResult::default();
        };

        if let Some(fact) = self.facts.get_mut(&id) {
            fact.asserted = false;
        }
        let result = self.remove_cascade(ItemId::Fact(id));
        tracing::debug!(
            facts = result.removed_facts.len(),
            rules = result.removed_rules.len(),
            depth = result.cascade_depth,
            "retraction cascade complete"
        );
        result
    }

    /// Remove `seed` and walk the justification graph, pruning every item
    /// left with neither an assertion nor a surviving justification.
    ///
    /// Iterative work-list: an item reached through several parents is
    /// processed once, and an item holding an alternative justification
    /// (or its own assertion) is left in place untouched.
    fn remove_cascade(&mut self, seed: ItemId) -> RetractionResult {
        let mut result = RetractionResult::default();
        let mut queue: VecDeque<(ItemId, usize)> = VecDeque::new();
        let mut visited: HashSet<ItemId> = HashSet::new();
        queue.push_back((seed, 0));
        visited.insert(seed);

        while let Some((id, depth)) = queue.pop_front() {
            let Some(record) = self.detach(id) else {
                continue;
            };
            result.cascade_depth = result.cascade_depth.max(depth);
            match id {
                ItemId::Fact(fact) => result.removed_facts.push(fact),
                ItemId::Rule(rule) => result.removed_rules.push(rule),
            }

            // Scrub this item out of its antecedents' back-references.
            for pair in &record.supported_by {
                self.unregister_dependent(ItemId::Fact(pair.fact), id);
                self.unregister_dependent(ItemId::Rule(pair.rule), id);
            }

            // Strip pairs naming this item from each dependent, then check
            // whether the dependent is still justified.
            for dependent in record.dependents() {
                self.strip_support(dependent, id);
                if !self.is_justified(dependent) && visited.insert(dependent) {
                    queue.push_back((dependent, depth + 1));
                }
            }
        }
        result
    }

    /// Remove an item from the live collections, returning its support
    /// lists for the cascade. `None` if it was already detached.
    fn detach(&mut self, id: ItemId) -> Option<Detached> {
        match id {
            ItemId::Fact(fact_id) => {
                let fact = self.facts.remove(&fact_id)?;
                self.fact_index.remove(&fact.statement);
                self.fact_order.retain(|&f| f != fact_id);
                Some(Detached {
                    supported_by: fact.supported_by,
                    supports_facts: fact.supports_facts,
                    supports_rules: fact.supports_rules,
                })
            }
            ItemId::Rule(rule_id) => {
                let rule = self.rules.remove(&rule_id)?;
                self.rule_index.remove(&RuleKey {
                    lhs: rule.lhs,
                    rhs: rule.rhs,
                });
                self.rule_order.retain(|&r| r != rule_id);
                Some(Detached {
                    supported_by: rule.supported_by,
                    supports_facts: rule.supports_facts,
                    supports_rules: rule.supports_rules,
                })
            }
        }
    }

    /// Remove every justification pair naming `removed` from `dependent`,
    /// keeping the partners' back-references exact: a partner that shared
    /// its last pair with `removed` forgets the dependent too.
    fn strip_support(&mut self, dependent: ItemId, removed: ItemId) {
        let Some(supported_by) = self.supported_by_mut(dependent) else {
            return;
        };
        let stripped: Vec<SupportPair> = supported_by
            .iter()
            .copied()
            .filter(|pair| pair.references(removed))
            .collect();
        if stripped.is_empty() {
            return;
        }
        supported_by.retain(|pair| !pair.references(removed));
        let remaining = supported_by.clone();

        for pair in stripped {
            for partner in [ItemId::Fact(pair.fact), ItemId::Rule(pair.rule)] {
                if partner == removed {
                    continue;
                }
                if !remaining.iter().any(|p| p.references(partner)) {
                    self.unregister_dependent(partner, dependent);
                }
            }
        }
    }

    /// Record `derived` in the back-references of both members of `pair`.
    fn register_support(&mut self, derived: ItemId, pair: SupportPair) {
        self.register_dependent(ItemId::Fact(pair.fact), derived);
        self.register_dependent(ItemId::Rule(pair.rule), derived);
    }

    fn register_dependent(&mut self, antecedent: ItemId, dependent: ItemId) {
        let Some((facts, rules)) = self.support_lists_mut(antecedent) else {
            return;
        };
        match dependent {
            ItemId::Fact(fact) => {
                if !facts.contains(&fact) {
                    facts.push(fact);
                }
            }
            ItemId::Rule(rule) => {
                if !rules.contains(&rule) {
                    rules.push(rule);
                }
            }
        }
    }

    fn unregister_dependent(&mut self, antecedent: ItemId, dependent: ItemId) {
        let Some((facts, rules)) = self.support_lists_mut(antecedent) else {
            return;
        };
        match dependent {
            ItemId::Fact(fact) => facts.retain(|&f| f != fact),
            ItemId::Rule(rule) => rules.retain(|&r| r != rule),
        }
    }

    /// An item counts as justified while absent (already detached) so the
    /// cascade never re-enqueues it.
    fn is_justified(&self, id: ItemId) -> bool {
        match id {
            ItemId::Fact(fact) => self
                .facts
                .get(&fact)
                .is_none_or(|f| f.asserted || !f.supported_by.is_empty()),
            ItemId::Rule(rule) => self
                .rules
                .get(&rule)
                .is_none_or(|r| r.asserted || !r.supported_by.is_empty()),
        }
    }

    fn supported_by_mut(&mut self, id: ItemId) -> Option<&mut Vec<SupportPair>> {
        match id {
            ItemId::Fact(fact) => self.facts.get_mut(&fact).map(|f| &mut f.supported_by),
            ItemId::Rule(rule) => self.rules.get_mut(&rule).map(|r| &mut r.supported_by),
        }
    }

    fn support_lists_mut(&mut self, id: ItemId) -> Option<(&mut Vec<FactId>, &mut Vec<RuleId>)> {
        match id {
            ItemId::Fact(fact) => self
                .facts
                .get_mut(&fact)
                .map(|f| (&mut f.supports_facts, &mut f.supports_rules)),
            ItemId::Rule(rule) => self
                .rules
                .get_mut(&rule)
                .map(|r| (&mut r.supports_facts, &mut r.supports_rules)),
        }
    }

    fn next_fact_id(&mut self) -> SeshatResult<FactId> {
        let id = FactId::new(self.next_fact).ok_or(StoreError::IdExhausted { kind: "fact" })?;
        self.next_fact = self.next_fact.wrapping_add(1);
        Ok(id)
    }

    fn next_rule_id(&mut self) -> SeshatResult<RuleId> {
        let id = RuleId::new(self.next_rule).ok_or(StoreError::IdExhausted { kind: "rule" })?;
        self.next_rule = self.next_rule.wrapping_add(1);
        Ok(id)
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("facts", &self.fact_count())
            .field("rules", &self.rule_count())
            .finish()
    }
}
