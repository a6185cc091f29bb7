//! # seshat
//!
//! A forward-chaining rule-based knowledge base: logical facts and
//! implication rules over a first-order statement language with variables,
//! pattern-matching queries, and retraction with cascading removal of
//! everything whose justification depended on the retracted item.
//!
//! ## Architecture
//!
//! - **Statement model** (`statement`): predicates over constant/variable terms
//! - **Substitutions** (`bindings`): ordered variable bindings from unification
//! - **Matcher** (`unify`): directional unification and template instantiation
//! - **Store** (`kb`): id-keyed arena with structural dedup, assertion-time
//!   forward chaining, and work-list retraction cascades
//! - **Inference** (`infer`): pairwise fact-against-rule derivation steps
//! - **Integrity** (`integrity`): petgraph-backed invariant verification
//!
//! Chaining happens at assertion time: every new fact is combined with every
//! rule (and vice versa), and derivations re-enter the store until nothing
//! new appears. Queries are pure matching over the materialized fact set.
//! Every derived item records the (fact, rule) pairs that justify it, so
//! retracting a premise prunes exactly the knowledge that has no surviving
//! justification left.
//!
//! ## Library usage
//!
//! ```
//! use seshat::kb::store::KnowledgeBase;
//! use seshat::kb::Item;
//! use seshat::statement::{Statement, Term};
//!
//! let mut kb = KnowledgeBase::new();
//! kb.assert(Item::fact(Statement::new(
//!     "motherof",
//!     vec![Term::constant("ada"), Term::constant("bing")],
//! )))
//! .unwrap();
//! kb.assert(Item::rule(
//!     vec![Statement::new(
//!         "motherof",
//!         vec![Term::variable("x"), Term::variable("y")],
//!     )],
//!     Statement::new("parentof", vec![Term::variable("x"), Term::variable("y")]),
//! ))
//! .unwrap();
//!
//! let query = Item::fact(Statement::new(
//!     "parentof",
//!     vec![Term::constant("ada"), Term::variable("X")],
//! ));
//! let answer = kb.ask(&query);
//! assert_eq!(answer.matches[0].bindings.to_string(), "?X : bing");
//! ```

pub mod bindings;
pub mod error;
pub mod infer;
pub mod integrity;
pub mod kb;
pub mod statement;
pub mod unify;
