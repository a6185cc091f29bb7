//! Invariant verification over the justification graph.
//!
//! Rebuilds the support relation as an explicit digraph and checks the
//! store's structural invariants: structural dedup, liveness (every live
//! item is asserted or supported), exact back-reference mirroring, absence
//! of dangling ids, and acyclicity. The store's mutation entry points are
//! designed to preserve all of these; tests run [`verify`] after every
//! mutation battery, and embedding applications can call it on demand.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{IntegrityError, SeshatResult};
use crate::kb::store::KnowledgeBase;
use crate::kb::{ItemId, SupportPair};
use crate::statement::Statement;

fn item_info(kb: &KnowledgeBase, id: ItemId) -> Option<(bool, &[SupportPair])> {
    match id {
        ItemId::Fact(fact) => kb.fact(fact).map(|f| (f.asserted(), f.supported_by())),
        ItemId::Rule(rule) => kb.rule(rule).map(|r| (r.asserted(), r.supported_by())),
    }
}

/// Verify every structural invariant of the knowledge base.
///
/// Returns the first violation found, as a diagnostic error naming the
/// offending ids.
pub fn verify(kb: &KnowledgeBase) -> SeshatResult<()> {
    // Structural dedup: no two live facts (or rules) share a structure.
    let mut seen_facts: HashMap<&Statement, ItemId> = HashMap::new();
    for (id, fact) in kb.facts() {
        if let Some(prev) = seen_facts.insert(&fact.statement, ItemId::Fact(id)) {
            return Err(IntegrityError::DuplicateStructure {
                first: prev.to_string(),
                second: id.to_string(),
            }
            .into());
        }
    }
    let mut seen_rules: HashMap<(&[Statement], &Statement), ItemId> = HashMap::new();
    for (id, rule) in kb.rules() {
        if let Some(prev) = seen_rules.insert((rule.lhs.as_slice(), &rule.rhs), ItemId::Rule(id))
        {
            return Err(IntegrityError::DuplicateStructure {
                first: prev.to_string(),
                second: id.to_string(),
            }
            .into());
        }
    }

    let items: Vec<ItemId> = kb
        .facts()
        .map(|(id, _)| ItemId::Fact(id))
        .chain(kb.rules().map(|(id, _)| ItemId::Rule(id)))
        .collect();

    let mut graph: DiGraph<ItemId, ()> = DiGraph::new();
    let mut nodes: HashMap<ItemId, NodeIndex> = HashMap::new();
    for &id in &items {
        nodes.insert(id, graph.add_node(id));
    }

    for &id in &items {
        let Some((asserted, supported_by)) = item_info(kb, id) else {
            continue;
        };

        // Liveness: present implies asserted or supported.
        if !asserted && supported_by.is_empty() {
            return Err(IntegrityError::UnjustifiedItem {
                item: id.to_string(),
            }
            .into());
        }

        // Every pair member must be live and must mirror this item in its
        // back-references; each contributes an antecedent -> derived edge.
        for pair in supported_by {
            for member in [ItemId::Fact(pair.fact), ItemId::Rule(pair.rule)] {
                if !kb.is_live(member) {
                    return Err(IntegrityError::DanglingSupport {
                        item: id.to_string(),
                        target: member.to_string(),
                    }
                    .into());
                }
                let mirrored = kb
                    .dependents(member)
                    .is_some_and(|deps| deps.contains(&id));
                if !mirrored {
                    return Err(IntegrityError::MirrorMismatch {
                        antecedent: member.to_string(),
                        dependent: id.to_string(),
                    }
                    .into());
                }
                if let (Some(&from), Some(&to)) = (nodes.get(&member), nodes.get(&id)) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        // Back-reference side of the mirror: every listed dependent must be
        // live and must hold a pair naming this item.
        for dependent in kb.dependents(id).unwrap_or_default() {
            if !kb.is_live(dependent) {
                return Err(IntegrityError::DanglingSupport {
                    item: id.to_string(),
                    target: dependent.to_string(),
                }
                .into());
            }
            let justified_here = kb
                .supported_by(dependent)
                .is_some_and(|pairs| pairs.iter().any(|pair| pair.references(id)));
            if !justified_here {
                return Err(IntegrityError::MirrorMismatch {
                    antecedent: id.to_string(),
                    dependent: dependent.to_string(),
                }
                .into());
            }
        }
    }

    toposort(&graph, None).map_err(|cycle| IntegrityError::CycleDetected {
        item: graph[cycle.node_id()].to_string(),
    })?;
    Ok(())
}
