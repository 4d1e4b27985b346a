//! Evaluator configuration.

use serde::{Deserialize, Serialize};

/// Default bound on chained `NextVrf` lookups.
pub const DEFAULT_MAX_NEXT_VRF_DEPTH: usize = 32;

/// Configuration for [`crate::PacketPolicyEvaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum number of `NextVrf` hops followed by one outgoing-interface
    /// check before the branch is treated as a non-match.
    pub max_next_vrf_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_next_vrf_depth: DEFAULT_MAX_NEXT_VRF_DEPTH,
        }
    }
}

impl EvaluatorConfig {
    /// Reads a configuration document. Missing fields take their defaults.
    pub fn from_json(doc: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(doc)
    }

    pub fn with_max_next_vrf_depth(mut self, depth: usize) -> Self {
        self.max_next_vrf_depth = depth;
        self
    }
}
