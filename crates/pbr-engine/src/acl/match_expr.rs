//! ACL line match expressions.
//!
//! These are the packet predicates shared by ACL lines, packet policy
//! conditions and transformation guards.

use pbr_types::{IpAddress, IpPrefix, IpProtocol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::ip_space::IpSpace;

/// Inclusive L4 port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    /// Creates a range covering `start..=end`.
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Creates a range covering exactly one port.
    pub const fn single(port: u16) -> Self {
        Self::new(port, port)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Constraints on packet header fields.
///
/// Every populated field must match; an absent or empty field is
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSpace {
    pub src_ips: Option<IpSpace>,
    pub dst_ips: Option<IpSpace>,
    pub ip_protocols: Vec<IpProtocol>,
    pub src_ports: Vec<PortRange>,
    pub dst_ports: Vec<PortRange>,
    pub dscps: Vec<u8>,
}

impl HeaderSpace {
    pub fn with_src_ips(mut self, space: IpSpace) -> Self {
        self.src_ips = Some(space);
        self
    }

    pub fn with_dst_ips(mut self, space: IpSpace) -> Self {
        self.dst_ips = Some(space);
        self
    }

    pub fn with_ip_protocol(mut self, protocol: IpProtocol) -> Self {
        self.ip_protocols.push(protocol);
        self
    }

    pub fn with_src_ports(mut self, range: PortRange) -> Self {
        self.src_ports.push(range);
        self
    }

    pub fn with_dst_ports(mut self, range: PortRange) -> Self {
        self.dst_ports.push(range);
        self
    }

    pub fn with_dscp(mut self, dscp: u8) -> Self {
        self.dscps.push(dscp);
        self
    }
}

/// Boolean predicate over a packet and its ingress interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclLineMatchExpr {
    True,
    False,
    /// Header field constraints.
    MatchHeaderSpace(HeaderSpace),
    /// Packet entered on one of these interfaces.
    MatchSrcInterface(BTreeSet<String>),
    /// Packet is permitted by the named ACL.
    PermittedByAcl(String),
    And(Vec<AclLineMatchExpr>),
    Or(Vec<AclLineMatchExpr>),
    Not(Box<AclLineMatchExpr>),
}

impl AclLineMatchExpr {
    pub fn header_space(space: HeaderSpace) -> Self {
        Self::MatchHeaderSpace(space)
    }

    /// Matches packets whose destination is in `prefix`.
    pub fn match_dst_prefix(prefix: IpPrefix) -> Self {
        Self::header_space(HeaderSpace::default().with_dst_ips(IpSpace::prefix(prefix)))
    }

    /// Matches packets whose destination is exactly `ip`.
    pub fn match_dst(ip: IpAddress) -> Self {
        Self::header_space(HeaderSpace::default().with_dst_ips(IpSpace::ip(ip)))
    }

    /// Matches packets whose source is in `prefix`.
    pub fn match_src_prefix(prefix: IpPrefix) -> Self {
        Self::header_space(HeaderSpace::default().with_src_ips(IpSpace::prefix(prefix)))
    }

    pub fn match_src_interface<I, S>(ifaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MatchSrcInterface(ifaces.into_iter().map(Into::into).collect())
    }

    pub fn permitted_by_acl(name: impl Into<String>) -> Self {
        Self::PermittedByAcl(name.into())
    }

    pub fn not(expr: AclLineMatchExpr) -> Self {
        Self::Not(Box::new(expr))
    }

    /// Collects the names of ACLs this expression depends on.
    pub fn referenced_acls<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::True | Self::False | Self::MatchHeaderSpace(_) | Self::MatchSrcInterface(_) => {}
            Self::PermittedByAcl(name) => {
                out.insert(name.as_str());
            }
            Self::And(exprs) | Self::Or(exprs) => {
                for expr in exprs {
                    expr.referenced_acls(out);
                }
            }
            Self::Not(expr) => expr.referenced_acls(out),
        }
    }
}
