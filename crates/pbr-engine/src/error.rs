//! Error types for packet policy construction and evaluation.
//!
//! Construction errors are raised eagerly when an AST node or a policy is
//! built or loaded, so that a malformed policy never reaches the evaluator.
//! Unresolvable VRF or FIB references are not errors at all: the evaluator
//! treats them as a non-match.

use thiserror::Error;

/// Errors raised while building or validating a packet policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A conjunction was built with no conjuncts (use `BoolExpr::True`).
    #[error("conjunction must have at least one conjunct")]
    EmptyConjunction,

    /// A FIB lookup with override IPs was built with no IPs.
    #[error("FIB lookup override must list at least one lookup IP")]
    EmptyOverrideIps,

    /// A statement or match expression references an ACL that is not defined.
    #[error("packet policy '{policy}' references undefined filter '{filter}'")]
    UndefinedFilter {
        /// The policy holding the reference.
        policy: String,
        /// The missing ACL name.
        filter: String,
    },

    /// A policy document could not be decoded.
    #[error("invalid packet policy document: {0}")]
    Decode(String),
}

impl PolicyError {
    /// Creates an undefined filter error.
    pub fn undefined_filter(policy: impl Into<String>, filter: impl Into<String>) -> Self {
        Self::UndefinedFilter {
            policy: policy.into(),
            filter: filter.into(),
        }
    }
}

/// Errors raised during evaluation.
///
/// Evaluation of a validated policy never fails; these cover inputs that
/// skipped [`crate::PacketPolicy::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// `ApplyFilter` named an ACL missing from the available ACLs.
    #[error("filter '{filter}' is not defined")]
    UndefinedFilter {
        /// The missing ACL name.
        filter: String,
    },
}

/// Result type alias for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;
