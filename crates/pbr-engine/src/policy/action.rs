//! Terminal actions of a packet policy.

use pbr_types::IpAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::vrf_expr::VrfExpr;
use crate::error::PolicyError;

/// What to do with a packet once a policy reaches a decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Discard the packet.
    Drop,
    /// Forward by destination lookup in the given VRF.
    FibLookup { vrf: VrfExpr },
    /// Forward towards the first resolvable override IP, or fall back.
    FibLookupOverrideLookupIp(OverrideLookupIp),
}

impl Action {
    /// Creates a FIB lookup in a literal VRF.
    pub fn fib_lookup(vrf: impl Into<String>) -> Self {
        Self::FibLookup {
            vrf: VrfExpr::literal(vrf),
        }
    }

    /// Creates a FIB lookup in the ingress interface's VRF.
    pub fn fib_lookup_ingress_vrf() -> Self {
        Self::FibLookup {
            vrf: VrfExpr::IngressInterfaceVrf,
        }
    }

    /// Returns true for [`Action::Drop`].
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop => write!(f, "DROP"),
            Self::FibLookup { vrf } => write!(f, "FIB_LOOKUP({})", vrf),
            Self::FibLookupOverrideLookupIp(o) => write!(
                f,
                "FIB_LOOKUP_OVERRIDE({}, ips={}, else {})",
                o.vrf(),
                o.ips().len(),
                o.default_action()
            ),
        }
    }
}

/// FIB lookup whose next hop is taken from a list of override IPs.
///
/// The IPs are tried in order; the first one the FIB can resolve (via a
/// connected route only, when `require_connected` is set) is used as the
/// next hop. When none resolves, `default_action` applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOverrideLookupIp")]
pub struct OverrideLookupIp {
    ips: Vec<IpAddress>,
    vrf: VrfExpr,
    require_connected: bool,
    default_action: Box<Action>,
}

impl OverrideLookupIp {
    /// Creates the override lookup.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyOverrideIps`] if `ips` is empty.
    pub fn new(
        ips: Vec<IpAddress>,
        vrf: VrfExpr,
        require_connected: bool,
        default_action: Action,
    ) -> Result<Self, PolicyError> {
        if ips.is_empty() {
            return Err(PolicyError::EmptyOverrideIps);
        }
        Ok(Self {
            ips,
            vrf,
            require_connected,
            default_action: Box::new(default_action),
        })
    }

    pub fn ips(&self) -> &[IpAddress] {
        &self.ips
    }

    pub fn vrf(&self) -> &VrfExpr {
        &self.vrf
    }

    pub fn require_connected(&self) -> bool {
        self.require_connected
    }

    pub fn default_action(&self) -> &Action {
        &self.default_action
    }
}

impl From<OverrideLookupIp> for Action {
    fn from(o: OverrideLookupIp) -> Self {
        Action::FibLookupOverrideLookupIp(o)
    }
}

#[derive(Deserialize)]
struct RawOverrideLookupIp {
    ips: Vec<IpAddress>,
    vrf: VrfExpr,
    #[serde(default)]
    require_connected: bool,
    default_action: Box<Action>,
}

impl TryFrom<RawOverrideLookupIp> for OverrideLookupIp {
    type Error = PolicyError;

    fn try_from(raw: RawOverrideLookupIp) -> Result<Self, Self::Error> {
        OverrideLookupIp::new(raw.ips, raw.vrf, raw.require_connected, *raw.default_action)
    }
}
