//! Network primitives shared by the packet policy engine.
//!
//! This crate provides type-safe representations of the values a simulated
//! packet carries through policy evaluation:
//!
//! - [`IpAddress`]: IPv4 and IPv6 addresses
//! - [`IpPrefix`]: IP network prefixes (CIDR notation) with containment checks
//! - [`IpProtocol`]: IP protocol numbers with well-known names
//! - [`Flow`]: an immutable packet header description
//! - [`FlowBuilder`]: the mutable form of a [`Flow`] used while rewriting headers

mod flow;
mod ip;

pub use flow::{Flow, FlowBuilder, FlowField, IpProtocol};
pub use ip::{IpAddress, IpPrefix};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid IP protocol: {0}")]
    InvalidIpProtocol(String),
}
