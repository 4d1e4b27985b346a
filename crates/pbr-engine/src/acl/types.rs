//! Access list types.

use pbr_types::Flow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::ip_space::IpSpacesByName;
use super::match_expr::AclLineMatchExpr;
use super::matcher::AclMatcher;

/// ACLs defined on a device, by name.
pub type AclsByName = HashMap<String, AccessList>;

/// Action of an ACL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineAction {
    Permit,
    Deny,
}

impl fmt::Display for LineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit => write!(f, "PERMIT"),
            Self::Deny => write!(f, "DENY"),
        }
    }
}

impl FromStr for LineAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PERMIT" | "ACCEPT" => Ok(Self::Permit),
            "DENY" | "DROP" | "REJECT" => Ok(Self::Deny),
            _ => Err(format!("Unknown line action: {}", s)),
        }
    }
}

/// A single ACL line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclLine {
    /// Line name as shown in the configuration (optional).
    #[serde(default)]
    pub name: Option<String>,
    pub action: LineAction,
    pub match_expr: AclLineMatchExpr,
}

impl AclLine {
    pub fn permit(match_expr: AclLineMatchExpr) -> Self {
        Self {
            name: None,
            action: LineAction::Permit,
            match_expr,
        }
    }

    pub fn deny(match_expr: AclLineMatchExpr) -> Self {
        Self {
            name: None,
            action: LineAction::Deny,
            match_expr,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Outcome of filtering a flow through an [`AccessList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterResult {
    pub action: LineAction,
    /// Index of the matching line; `None` for the implicit deny.
    pub matched_line: Option<usize>,
}

impl FilterResult {
    pub fn is_permitted(&self) -> bool {
        self.action == LineAction::Permit
    }
}

/// An ordered access list. The first matching line decides; a flow matching
/// no line is denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessList {
    pub name: String,
    pub lines: Vec<AclLine>,
}

impl AccessList {
    pub fn new(name: impl Into<String>, lines: Vec<AclLine>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    /// Filters `flow` through this list.
    pub fn filter(
        &self,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &AclsByName,
        ip_spaces: &IpSpacesByName,
        matcher: &dyn AclMatcher,
    ) -> FilterResult {
        self.lines
            .iter()
            .position(|line| matcher.matches(&line.match_expr, flow, ingress_interface, acls, ip_spaces))
            .map(|idx| FilterResult {
                action: self.lines[idx].action,
                matched_line: Some(idx),
            })
            .unwrap_or(FilterResult {
                action: LineAction::Deny,
                matched_line: None,
            })
    }
}
