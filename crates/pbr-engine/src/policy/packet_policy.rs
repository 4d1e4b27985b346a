//! The packet policy container and its load-time validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::action::Action;
use super::bool_expr::BoolExpr;
use super::statement::Statement;
use crate::acl::AclsByName;
use crate::error::PolicyError;
use crate::transformation::Transformation;

/// A named, ordered list of statements with a fallback action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketPolicy {
    pub name: String,
    pub statements: Vec<Statement>,
    pub default_action: Action,
}

impl PacketPolicy {
    pub fn new(name: impl Into<String>, statements: Vec<Statement>, default_action: Action) -> Self {
        Self {
            name: name.into(),
            statements,
            default_action,
        }
    }

    /// Decodes a policy from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Decode`] for malformed documents, including
    /// empty conjunctions and override lookups without IPs.
    pub fn from_json(doc: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(doc).map_err(|e| PolicyError::Decode(e.to_string()))
    }

    /// Names of all ACLs the policy uses, through `ApplyFilter` statements,
    /// `PermittedByAcl` conditions and transformation guards.
    pub fn referenced_filters(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        collect_statements(&self.statements, &mut out);
        out
    }

    /// Checks that every referenced ACL exists in `acls`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UndefinedFilter`] for the first missing name,
    /// in lexicographic order.
    pub fn validate(&self, acls: &AclsByName) -> Result<(), PolicyError> {
        match self
            .referenced_filters()
            .into_iter()
            .find(|name| !acls.contains_key(*name))
        {
            Some(missing) => Err(PolicyError::undefined_filter(&self.name, missing)),
            None => Ok(()),
        }
    }
}

fn collect_statements<'a>(statements: &'a [Statement], out: &mut BTreeSet<&'a str>) {
    for statement in statements {
        match statement {
            Statement::If { condition, body } => {
                collect_bool_expr(condition, out);
                collect_statements(body, out);
            }
            Statement::Return { .. } => {}
            Statement::ApplyFilter { filter_name } => {
                out.insert(filter_name.as_str());
            }
            Statement::ApplyTransformation { transformation } => {
                collect_transformation(transformation, out);
            }
        }
    }
}

fn collect_bool_expr<'a>(expr: &'a BoolExpr, out: &mut BTreeSet<&'a str>) {
    match expr {
        BoolExpr::True | BoolExpr::False | BoolExpr::FibLookupOutgoingInterfaceIsOneOf { .. } => {}
        BoolExpr::Conjunction(c) => {
            for conjunct in c.conjuncts() {
                collect_bool_expr(conjunct, out);
            }
        }
        BoolExpr::PacketMatchExpr { expr } => expr.referenced_acls(out),
    }
}

fn collect_transformation<'a>(t: &'a Transformation, out: &mut BTreeSet<&'a str>) {
    t.guard.referenced_acls(out);
    if let Some(next) = &t.and_then {
        collect_transformation(next, out);
    }
    if let Some(next) = &t.or_else {
        collect_transformation(next, out);
    }
}
