//! Access lists and packet match expressions.
//!
//! Packet policies consult ACLs in two ways: `PacketMatchExpr` conditions
//! evaluate a match expression through an [`AclMatcher`], and `ApplyFilter`
//! statements run a flow through a named [`AccessList`].
//!
//! [`HeaderSpaceMatcher`] is the matcher used when the caller does not
//! supply its own.

mod ip_space;
mod match_expr;
mod matcher;
mod types;

pub use ip_space::{IpSpace, IpSpacesByName};
pub use match_expr::{AclLineMatchExpr, HeaderSpace, PortRange};
pub use matcher::{AclMatcher, HeaderSpaceMatcher};
pub use types::{AccessList, AclLine, AclsByName, FilterResult, LineAction};
