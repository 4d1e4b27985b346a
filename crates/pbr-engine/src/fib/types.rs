//! FIB entry types.

use pbr_types::{IpAddress, IpPrefix};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol of the route a FIB entry was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteProtocol {
    /// Directly connected subnet.
    Connected,
    Local,
    #[default]
    Static,
    Ospf,
    Bgp,
    Isis,
}

impl fmt::Display for RouteProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "CONNECTED"),
            Self::Local => write!(f, "LOCAL"),
            Self::Static => write!(f, "STATIC"),
            Self::Ospf => write!(f, "OSPF"),
            Self::Bgp => write!(f, "BGP"),
            Self::Isis => write!(f, "ISIS"),
        }
    }
}

impl FromStr for RouteProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CONNECTED" => Ok(Self::Connected),
            "LOCAL" => Ok(Self::Local),
            "STATIC" => Ok(Self::Static),
            "OSPF" => Ok(Self::Ospf),
            "BGP" => Ok(Self::Bgp),
            "ISIS" => Ok(Self::Isis),
            _ => Err(format!("Unknown route protocol: {}", s)),
        }
    }
}

/// Forwarding behavior of a FIB entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FibAction {
    /// Send out of an interface.
    Forward {
        interface_name: String,
        /// IP to ARP for, when the next hop is not the destination itself.
        #[serde(default)]
        arp_ip: Option<IpAddress>,
    },
    /// Continue the lookup in another VRF (VRF leaking).
    NextVrf {
        vrf_name: String,
        /// Address to look up in the next VRF instead of the destination.
        #[serde(default)]
        override_ip: Option<IpAddress>,
    },
    /// Blackhole.
    NullRoute,
}

impl fmt::Display for FibAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward {
                interface_name,
                arp_ip: Some(ip),
            } => write!(f, "forward {} via {}", interface_name, ip),
            Self::Forward { interface_name, .. } => write!(f, "forward {}", interface_name),
            Self::NextVrf {
                vrf_name,
                override_ip: Some(ip),
            } => write!(f, "next-vrf {} lookup {}", vrf_name, ip),
            Self::NextVrf { vrf_name, .. } => write!(f, "next-vrf {}", vrf_name),
            Self::NullRoute => write!(f, "null-route"),
        }
    }
}

/// One forwarding path for a destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FibEntry {
    pub action: FibAction,
    /// Prefix of the top-level route this entry resolves.
    pub prefix: IpPrefix,
    /// Protocol of the top-level route.
    #[serde(default)]
    pub protocol: RouteProtocol,
}

impl FibEntry {
    pub fn new(prefix: IpPrefix, action: FibAction) -> Self {
        Self {
            action,
            prefix,
            protocol: RouteProtocol::default(),
        }
    }

    /// A directly connected route out of `interface`.
    pub fn connected(prefix: IpPrefix, interface: impl Into<String>) -> Self {
        Self::new(prefix, FibAction::forward(interface)).with_protocol(RouteProtocol::Connected)
    }

    pub fn with_protocol(mut self, protocol: RouteProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.protocol == RouteProtocol::Connected
    }
}

impl FibAction {
    pub fn forward(interface: impl Into<String>) -> Self {
        Self::Forward {
            interface_name: interface.into(),
            arp_ip: None,
        }
    }

    pub fn next_vrf(vrf: impl Into<String>) -> Self {
        Self::NextVrf {
            vrf_name: vrf.into(),
            override_ip: None,
        }
    }

    pub fn next_vrf_override(vrf: impl Into<String>, ip: IpAddress) -> Self {
        Self::NextVrf {
            vrf_name: vrf.into(),
            override_ip: Some(ip),
        }
    }
}
