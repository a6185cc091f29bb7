//! Diagnostic error types for the seshat knowledge base.
//!
//! Expected outcomes — a failed unification, a retraction of something
//! absent, a rule-shaped query — are ordinary values, never errors. What
//! remains is genuinely exceptional: id-space exhaustion in the store and
//! invariant violations surfaced by integrity verification. Each variant
//! carries a miette `#[diagnostic]` code and help text so callers know
//! exactly what went wrong.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the seshat knowledge base.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes and help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum SeshatError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Integrity(#[from] IntegrityError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors raised by the knowledge base store.
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("{kind} id space exhausted: cannot allocate more than u64::MAX ids")]
    #[diagnostic(
        code(seshat::store::id_exhausted),
        help(
            "The id space is exhausted. This is extremely unlikely in \
             practice (it requires 2^64 allocations in one store); if you \
             see this error, check for an assertion loop."
        )
    )]
    IdExhausted { kind: &'static str },
}

// ---------------------------------------------------------------------------
// Integrity errors
// ---------------------------------------------------------------------------

/// Invariant violations reported by [`crate::integrity::verify`].
#[derive(Debug, Error, Diagnostic)]
pub enum IntegrityError {
    #[error("justification graph contains a cycle involving {item}")]
    #[diagnostic(
        code(seshat::integrity::cycle),
        help(
            "Forward chaining only ever derives from strictly prior items, \
             so the justification relation must stay a DAG. A cycle means \
             support bookkeeping was corrupted."
        )
    )]
    CycleDetected { item: String },

    #[error("live item {item} is neither asserted nor supported")]
    #[diagnostic(
        code(seshat::integrity::unjustified),
        help(
            "Every stored item must carry the asserted flag or at least one \
             justification pair. Retraction should have pruned this item."
        )
    )]
    UnjustifiedItem { item: String },

    #[error("back-reference mismatch between {antecedent} and {dependent}")]
    #[diagnostic(
        code(seshat::integrity::mirror),
        help(
            "supports_facts/supports_rules must list exactly the items whose \
             supported_by pairs name this item. One side of the mirror was \
             updated without the other."
        )
    )]
    MirrorMismatch {
        antecedent: String,
        dependent: String,
    },

    #[error("{item} holds a support reference to removed item {target}")]
    #[diagnostic(
        code(seshat::integrity::dangling),
        help(
            "Pruning must strip every pair naming a removed item from live \
             justification lists. A dangling id means a cascade step was \
             skipped."
        )
    )]
    DanglingSupport { item: String, target: String },

    #[error("store holds structurally equal items {first} and {second}")]
    #[diagnostic(
        code(seshat::integrity::duplicate),
        help(
            "Facts and rules deduplicate by structural equality; two live \
             items with the same structure mean the structural index and \
             the id map disagree."
        )
    )]
    DuplicateStructure { first: String, second: String },
}

/// Convenience alias for functions returning seshat results.
pub type SeshatResult<T> = std::result::Result<T, SeshatError>;
