//! Boolean conditions of `If` statements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::vrf_expr::VrfExpr;
use crate::acl::AclLineMatchExpr;
use crate::error::PolicyError;

/// A condition over the in-progress flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoolExpr {
    True,
    False,
    /// All conjuncts hold.
    Conjunction(Conjunction),
    /// The flow matches an ACL match expression.
    PacketMatchExpr { expr: AclLineMatchExpr },
    /// A destination lookup in `vrf` can leave through one of `interfaces`.
    FibLookupOutgoingInterfaceIsOneOf {
        vrf: VrfExpr,
        interfaces: BTreeSet<String>,
    },
}

impl BoolExpr {
    /// Wraps a match expression.
    pub fn packet_match(expr: AclLineMatchExpr) -> Self {
        Self::PacketMatchExpr { expr }
    }

    /// Builds a conjunction.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyConjunction`] if `conjuncts` is empty.
    pub fn and(conjuncts: Vec<BoolExpr>) -> Result<Self, PolicyError> {
        Conjunction::new(conjuncts).map(Self::Conjunction)
    }

    /// Builds an outgoing-interface check.
    pub fn outgoing_interface_is_one_of<I, S>(vrf: VrfExpr, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::FibLookupOutgoingInterfaceIsOneOf {
            vrf,
            interfaces: interfaces.into_iter().map(Into::into).collect(),
        }
    }
}

/// A non-empty, ordered list of conjuncts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawConjunction")]
pub struct Conjunction {
    conjuncts: Vec<BoolExpr>,
}

impl Conjunction {
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyConjunction`] if `conjuncts` is empty.
    pub fn new(conjuncts: Vec<BoolExpr>) -> Result<Self, PolicyError> {
        if conjuncts.is_empty() {
            return Err(PolicyError::EmptyConjunction);
        }
        Ok(Self { conjuncts })
    }

    pub fn conjuncts(&self) -> &[BoolExpr] {
        &self.conjuncts
    }
}

#[derive(Deserialize)]
struct RawConjunction {
    conjuncts: Vec<BoolExpr>,
}

impl TryFrom<RawConjunction> for Conjunction {
    type Error = PolicyError;

    fn try_from(raw: RawConjunction) -> Result<Self, Self::Error> {
        Conjunction::new(raw.conjuncts)
    }
}
