//! Packet policy statements.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::bool_expr::BoolExpr;
use crate::transformation::Transformation;

/// One statement of a packet policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Statement {
    /// Run `body` when `condition` holds.
    If {
        condition: BoolExpr,
        body: Vec<Statement>,
    },
    /// Stop with `action`.
    Return { action: Action },
    /// Run the flow through a named ACL; a deny drops the packet.
    ApplyFilter { filter_name: String },
    /// Rewrite the flow.
    ApplyTransformation { transformation: Transformation },
}

impl Statement {
    pub fn if_then(condition: BoolExpr, body: Vec<Statement>) -> Self {
        Self::If { condition, body }
    }

    pub fn ret(action: Action) -> Self {
        Self::Return { action }
    }

    pub fn apply_filter(filter_name: impl Into<String>) -> Self {
        Self::ApplyFilter {
            filter_name: filter_name.into(),
        }
    }

    pub fn apply_transformation(transformation: Transformation) -> Self {
        Self::ApplyTransformation { transformation }
    }
}
