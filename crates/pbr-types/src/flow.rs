//! Packet flow descriptors.
//!
//! A [`Flow`] is the concrete packet header a simulation pushes through a
//! device. It is immutable; rewriting happens on a [`FlowBuilder`] which is
//! then finalized into a new [`Flow`].

use crate::{IpAddress, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IP protocol number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpProtocol(u8);

impl IpProtocol {
    pub const ICMP: Self = IpProtocol(1);
    pub const TCP: Self = IpProtocol(6);
    pub const UDP: Self = IpProtocol(17);
    pub const GRE: Self = IpProtocol(47);
    pub const ICMPV6: Self = IpProtocol(58);

    pub const fn new(number: u8) -> Self {
        IpProtocol(number)
    }

    pub const fn number(&self) -> u8 {
        self.0
    }

    /// Returns true if this protocol carries L4 ports.
    pub const fn has_ports(&self) -> bool {
        matches!(self.0, 6 | 17)
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ICMP => write!(f, "ICMP"),
            Self::TCP => write!(f, "TCP"),
            Self::UDP => write!(f, "UDP"),
            Self::GRE => write!(f, "GRE"),
            Self::ICMPV6 => write!(f, "IPV6-ICMP"),
            IpProtocol(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for IpProtocol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ICMP" => Ok(Self::ICMP),
            "TCP" => Ok(Self::TCP),
            "UDP" => Ok(Self::UDP),
            "GRE" => Ok(Self::GRE),
            "IPV6-ICMP" | "ICMPV6" => Ok(Self::ICMPV6),
            other => other
                .parse::<u8>()
                .map(IpProtocol)
                .map_err(|_| ParseError::InvalidIpProtocol(s.to_string())),
        }
    }
}

/// Header fields a transformation can rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowField {
    SrcIp,
    DstIp,
    SrcPort,
    DstPort,
    IpProtocol,
    Dscp,
}

impl FlowField {
    pub const ALL: [FlowField; 6] = [
        FlowField::SrcIp,
        FlowField::DstIp,
        FlowField::SrcPort,
        FlowField::DstPort,
        FlowField::IpProtocol,
        FlowField::Dscp,
    ];

    /// Renders this field's value in `flow`.
    pub fn value_of(&self, flow: &Flow) -> String {
        match self {
            Self::SrcIp => flow.src_ip.to_string(),
            Self::DstIp => flow.dst_ip.to_string(),
            Self::SrcPort => flow.src_port.to_string(),
            Self::DstPort => flow.dst_port.to_string(),
            Self::IpProtocol => flow.ip_protocol.to_string(),
            Self::Dscp => flow.dscp.to_string(),
        }
    }
}

impl fmt::Display for FlowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SrcIp => write!(f, "SRC_IP"),
            Self::DstIp => write!(f, "DST_IP"),
            Self::SrcPort => write!(f, "SRC_PORT"),
            Self::DstPort => write!(f, "DST_PORT"),
            Self::IpProtocol => write!(f, "IP_PROTOCOL"),
            Self::Dscp => write!(f, "DSCP"),
        }
    }
}

/// An immutable packet header description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flow {
    ingress_node: String,
    ingress_interface: Option<String>,
    ingress_vrf: Option<String>,
    src_ip: IpAddress,
    dst_ip: IpAddress,
    ip_protocol: IpProtocol,
    src_port: u16,
    dst_port: u16,
    dscp: u8,
    ecn: u8,
    icmp_type: u8,
    icmp_code: u8,
    tcp_flags: u8,
    packet_length: u16,
}

impl Flow {
    /// Starts a builder for a flow entering `ingress_node`.
    pub fn builder(ingress_node: impl Into<String>) -> FlowBuilder {
        FlowBuilder::new(ingress_node)
    }

    /// Returns a builder seeded with this flow's headers.
    pub fn to_builder(&self) -> FlowBuilder {
        FlowBuilder {
            inner: self.clone(),
        }
    }

    pub fn ingress_node(&self) -> &str {
        &self.ingress_node
    }

    pub fn ingress_interface(&self) -> Option<&str> {
        self.ingress_interface.as_deref()
    }

    pub fn ingress_vrf(&self) -> Option<&str> {
        self.ingress_vrf.as_deref()
    }

    pub fn src_ip(&self) -> IpAddress {
        self.src_ip
    }

    pub fn dst_ip(&self) -> IpAddress {
        self.dst_ip
    }

    pub fn ip_protocol(&self) -> IpProtocol {
        self.ip_protocol
    }

    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    pub fn dst_port(&self) -> u16 {
        self.dst_port
    }

    pub fn dscp(&self) -> u8 {
        self.dscp
    }

    pub fn ecn(&self) -> u8 {
        self.ecn
    }

    pub fn icmp_type(&self) -> u8 {
        self.icmp_type
    }

    pub fn icmp_code(&self) -> u8 {
        self.icmp_code
    }

    pub fn tcp_flags(&self) -> u8 {
        self.tcp_flags
    }

    pub fn packet_length(&self) -> u16 {
        self.packet_length
    }

    /// Returns the rewritable fields whose values differ in `other`.
    pub fn changed_fields(&self, other: &Flow) -> Vec<FlowField> {
        FlowField::ALL
            .into_iter()
            .filter(|field| field.value_of(self) != field.value_of(other))
            .collect()
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start={}", self.ingress_node)?;
        if let Some(iface) = &self.ingress_interface {
            write!(f, " interface={}", iface)?;
        }
        if let Some(vrf) = &self.ingress_vrf {
            write!(f, " vrf={}", vrf)?;
        }
        write!(f, " [{}", self.src_ip)?;
        if self.ip_protocol.has_ports() {
            write!(f, ":{}", self.src_port)?;
        }
        write!(f, "->{}", self.dst_ip)?;
        if self.ip_protocol.has_ports() {
            write!(f, ":{}", self.dst_port)?;
        }
        write!(f, " {}]", self.ip_protocol)
    }
}

/// Mutable form of a [`Flow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowBuilder {
    inner: Flow,
}

impl FlowBuilder {
    /// Creates a builder with unspecified addresses, TCP and zero ports.
    pub fn new(ingress_node: impl Into<String>) -> Self {
        Self {
            inner: Flow {
                ingress_node: ingress_node.into(),
                ingress_interface: None,
                ingress_vrf: None,
                src_ip: IpAddress::v4(0, 0, 0, 0),
                dst_ip: IpAddress::v4(0, 0, 0, 0),
                ip_protocol: IpProtocol::TCP,
                src_port: 0,
                dst_port: 0,
                dscp: 0,
                ecn: 0,
                icmp_type: 0,
                icmp_code: 0,
                tcp_flags: 0,
                packet_length: 512,
            },
        }
    }

    /// Read access to the headers as currently rewritten.
    pub fn current(&self) -> &Flow {
        &self.inner
    }

    pub fn with_ingress_interface(mut self, iface: impl Into<String>) -> Self {
        self.inner.ingress_interface = Some(iface.into());
        self
    }

    pub fn with_ingress_vrf(mut self, vrf: impl Into<String>) -> Self {
        self.inner.ingress_vrf = Some(vrf.into());
        self
    }

    pub fn with_src_ip(mut self, ip: IpAddress) -> Self {
        self.set_src_ip(ip);
        self
    }

    pub fn with_dst_ip(mut self, ip: IpAddress) -> Self {
        self.set_dst_ip(ip);
        self
    }

    pub fn with_ip_protocol(mut self, protocol: IpProtocol) -> Self {
        self.set_ip_protocol(protocol);
        self
    }

    pub fn with_src_port(mut self, port: u16) -> Self {
        self.set_src_port(port);
        self
    }

    pub fn with_dst_port(mut self, port: u16) -> Self {
        self.set_dst_port(port);
        self
    }

    pub fn with_dscp(mut self, dscp: u8) -> Self {
        self.set_dscp(dscp);
        self
    }

    pub fn with_ecn(mut self, ecn: u8) -> Self {
        self.inner.ecn = ecn;
        self
    }

    pub fn with_icmp(mut self, icmp_type: u8, icmp_code: u8) -> Self {
        self.inner.icmp_type = icmp_type;
        self.inner.icmp_code = icmp_code;
        self
    }

    pub fn with_tcp_flags(mut self, flags: u8) -> Self {
        self.inner.tcp_flags = flags;
        self
    }

    pub fn with_packet_length(mut self, length: u16) -> Self {
        self.inner.packet_length = length;
        self
    }

    pub fn set_src_ip(&mut self, ip: IpAddress) {
        self.inner.src_ip = ip;
    }

    pub fn set_dst_ip(&mut self, ip: IpAddress) {
        self.inner.dst_ip = ip;
    }

    pub fn set_ip_protocol(&mut self, protocol: IpProtocol) {
        self.inner.ip_protocol = protocol;
    }

    pub fn set_src_port(&mut self, port: u16) {
        self.inner.src_port = port;
    }

    pub fn set_dst_port(&mut self, port: u16) {
        self.inner.dst_port = port;
    }

    pub fn set_dscp(&mut self, dscp: u8) {
        self.inner.dscp = dscp;
    }

    /// Replaces every header with those of `flow`.
    pub fn reset_to(&mut self, flow: Flow) {
        self.inner = flow;
    }

    pub fn build(self) -> Flow {
        self.inner
    }
}

impl From<Flow> for FlowBuilder {
    fn from(flow: Flow) -> Self {
        Self { inner: flow }
    }
}
