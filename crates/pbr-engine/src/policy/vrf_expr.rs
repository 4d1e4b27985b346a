//! Expressions naming the VRF a FIB lookup runs in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A VRF reference, resolved at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VrfExpr {
    /// A VRF named explicitly in the configuration.
    LiteralVrfName(String),
    /// The VRF owning the interface the packet arrived on.
    IngressInterfaceVrf,
}

impl VrfExpr {
    /// Creates a literal VRF reference.
    pub fn literal(name: impl Into<String>) -> Self {
        Self::LiteralVrfName(name.into())
    }
}

impl fmt::Display for VrfExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiteralVrfName(name) => write!(f, "{}", name),
            Self::IngressInterfaceVrf => write!(f, "<ingress-interface-vrf>"),
        }
    }
}
