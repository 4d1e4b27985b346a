//! Packet policy AST.
//!
//! A [`PacketPolicy`] is an ordered list of [`Statement`]s evaluated top to
//! bottom against one flow. The first `Return` (or a denying `ApplyFilter`)
//! decides the packet's [`Action`]; a policy that falls through uses its
//! default action.
//!
//! All nodes are plain immutable values. Nodes with structural invariants
//! ([`Conjunction`], [`OverrideLookupIp`]) can only be built through
//! validating constructors, from code and from JSON alike.

mod action;
mod bool_expr;
mod packet_policy;
mod statement;
mod vrf_expr;

pub use action::{Action, OverrideLookupIp};
pub use bool_expr::{BoolExpr, Conjunction};
pub use packet_policy::PacketPolicy;
pub use statement::Statement;
pub use vrf_expr::VrfExpr;
