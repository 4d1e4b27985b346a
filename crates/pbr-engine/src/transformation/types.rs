//! Packet transformation definitions.

use pbr_types::{FlowBuilder, IpAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::acl::AclLineMatchExpr;
use crate::trace::TransformationType;

/// A single header rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationStep {
    AssignSourceIp(IpAddress),
    AssignDestinationIp(IpAddress),
    AssignSourcePort(u16),
    AssignDestinationPort(u16),
    /// Matches but leaves the packet untouched.
    Noop,
}

impl TransformationStep {
    /// Applies this rewrite to `flow`.
    pub fn apply(&self, flow: &mut FlowBuilder) {
        match self {
            Self::AssignSourceIp(ip) => flow.set_src_ip(*ip),
            Self::AssignDestinationIp(ip) => flow.set_dst_ip(*ip),
            Self::AssignSourcePort(port) => flow.set_src_port(*port),
            Self::AssignDestinationPort(port) => flow.set_dst_port(*port),
            Self::Noop => {}
        }
    }
}

impl fmt::Display for TransformationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssignSourceIp(ip) => write!(f, "src-ip := {}", ip),
            Self::AssignDestinationIp(ip) => write!(f, "dst-ip := {}", ip),
            Self::AssignSourcePort(port) => write!(f, "src-port := {}", port),
            Self::AssignDestinationPort(port) => write!(f, "dst-port := {}", port),
            Self::Noop => write!(f, "noop"),
        }
    }
}

/// A guarded chain of rewrites.
///
/// When `guard` matches, `steps` are applied and evaluation continues with
/// `and_then`; otherwise it continues with `or_else`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transformation {
    pub transformation_type: TransformationType,
    #[serde(default = "default_guard")]
    pub guard: AclLineMatchExpr,
    #[serde(default)]
    pub steps: Vec<TransformationStep>,
    #[serde(default)]
    pub and_then: Option<Box<Transformation>>,
    #[serde(default)]
    pub or_else: Option<Box<Transformation>>,
}

fn default_guard() -> AclLineMatchExpr {
    AclLineMatchExpr::True
}

impl Transformation {
    /// Starts an unconditional transformation.
    pub fn always(transformation_type: TransformationType) -> Self {
        Self::when(AclLineMatchExpr::True, transformation_type)
    }

    /// Starts a transformation guarded by `guard`.
    pub fn when(guard: AclLineMatchExpr, transformation_type: TransformationType) -> Self {
        Self {
            transformation_type,
            guard,
            steps: Vec::new(),
            and_then: None,
            or_else: None,
        }
    }

    pub fn apply(mut self, step: TransformationStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn and_then(mut self, next: Transformation) -> Self {
        self.and_then = Some(Box::new(next));
        self
    }

    pub fn or_else(mut self, next: Transformation) -> Self {
        self.or_else = Some(Box::new(next));
        self
    }
}
