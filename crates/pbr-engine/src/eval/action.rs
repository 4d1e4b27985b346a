//! Resolution of a policy's [`Action`] into a concrete forwarding decision.

use pbr_types::{Flow, IpAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use super::context::EvaluationEnv;
use super::vrf::VrfExprEvaluator;
use crate::policy::{Action, OverrideLookupIp};

/// How the packet leaves the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForwardingDecision {
    Drop,
    /// Route `lookup_ip` in `vrf`, optionally through a policy-chosen next hop.
    FibLookup {
        vrf: String,
        lookup_ip: IpAddress,
        #[serde(default)]
        next_hop_override: Option<IpAddress>,
    },
}

impl fmt::Display for ForwardingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::FibLookup {
                vrf,
                lookup_ip,
                next_hop_override: Some(nh),
            } => write!(f, "lookup {} in {} via {}", lookup_ip, vrf, nh),
            Self::FibLookup { vrf, lookup_ip, .. } => write!(f, "lookup {} in {}", lookup_ip, vrf),
        }
    }
}

/// Turns actions into [`ForwardingDecision`]s against the FIBs in an
/// [`EvaluationEnv`].
#[derive(Debug, Clone, Copy)]
pub struct ActionResolver<'a> {
    env: EvaluationEnv<'a>,
}

impl<'a> ActionResolver<'a> {
    pub fn new(env: EvaluationEnv<'a>) -> Self {
        Self { env }
    }

    pub fn resolve(&self, action: &Action, flow: &Flow) -> ForwardingDecision {
        let vrfs = VrfExprEvaluator::new(self.env.src_interface_vrf);
        let mut action = action;
        loop {
            match action {
                Action::Drop => return ForwardingDecision::Drop,
                Action::FibLookup { vrf } => {
                    return ForwardingDecision::FibLookup {
                        vrf: vrfs.resolve(vrf).to_string(),
                        lookup_ip: flow.dst_ip(),
                        next_hop_override: None,
                    };
                }
                Action::FibLookupOverrideLookupIp(o) => {
                    // The override VRF only qualifies the next hop; the
                    // packet itself is routed in the ingress VRF.
                    let vrf = vrfs.resolve(o.vrf());
                    if let Some(ip) = self.first_resolvable(o, vrf) {
                        return ForwardingDecision::FibLookup {
                            vrf: self.env.src_interface_vrf.to_string(),
                            lookup_ip: flow.dst_ip(),
                            next_hop_override: Some(ip),
                        };
                    }
                    trace!(vrf, "no override IP resolved, using default action");
                    action = o.default_action();
                }
            }
        }
    }

    /// First override IP with a usable FIB entry in `vrf`.
    fn first_resolvable(&self, o: &OverrideLookupIp, vrf: &str) -> Option<IpAddress> {
        let fib = self.env.fibs.get(vrf)?;
        o.ips().iter().copied().find(|ip| {
            let entries = fib.get(ip);
            if o.require_connected() {
                entries.iter().any(|e| e.is_connected())
            } else {
                !entries.is_empty()
            }
        })
    }
}
