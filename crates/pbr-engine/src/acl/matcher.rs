//! Evaluation of [`AclLineMatchExpr`] against a concrete flow.

use pbr_types::Flow;

use super::ip_space::IpSpacesByName;
use super::match_expr::{AclLineMatchExpr, HeaderSpace};
use super::types::{AclsByName, LineAction};
use tracing::warn;

/// Decides whether a flow satisfies a match expression.
///
/// Implementations must be free of side effects: the packet policy
/// evaluator may call them any number of times for one flow.
pub trait AclMatcher: Send + Sync {
    fn matches(
        &self,
        expr: &AclLineMatchExpr,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &AclsByName,
        ip_spaces: &IpSpacesByName,
    ) -> bool;
}

/// Default matcher evaluating header-space constraints field by field.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSpaceMatcher;

impl HeaderSpaceMatcher {
    fn header_space_matches(space: &HeaderSpace, flow: &Flow, ip_spaces: &IpSpacesByName) -> bool {
        if let Some(src) = &space.src_ips {
            if !src.contains(&flow.src_ip(), ip_spaces) {
                return false;
            }
        }
        if let Some(dst) = &space.dst_ips {
            if !dst.contains(&flow.dst_ip(), ip_spaces) {
                return false;
            }
        }
        if !space.ip_protocols.is_empty() && !space.ip_protocols.contains(&flow.ip_protocol()) {
            return false;
        }
        // Port constraints only hold for protocols that carry ports.
        if !space.src_ports.is_empty()
            && !(flow.ip_protocol().has_ports()
                && space.src_ports.iter().any(|r| r.contains(flow.src_port())))
        {
            return false;
        }
        if !space.dst_ports.is_empty()
            && !(flow.ip_protocol().has_ports()
                && space.dst_ports.iter().any(|r| r.contains(flow.dst_port())))
        {
            return false;
        }
        space.dscps.is_empty() || space.dscps.contains(&flow.dscp())
    }
}

impl HeaderSpaceMatcher {
    /// `resolving` holds the ACLs whose lines are being matched further up
    /// the stack; a reference back to one of them does not match.
    fn matches_inner<'a>(
        &self,
        expr: &'a AclLineMatchExpr,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &'a AclsByName,
        ip_spaces: &IpSpacesByName,
        resolving: &mut Vec<&'a str>,
    ) -> bool {
        match expr {
            AclLineMatchExpr::True => true,
            AclLineMatchExpr::False => false,
            AclLineMatchExpr::MatchHeaderSpace(space) => {
                Self::header_space_matches(space, flow, ip_spaces)
            }
            AclLineMatchExpr::MatchSrcInterface(ifaces) => {
                ingress_interface.is_some_and(|iface| ifaces.contains(iface))
            }
            AclLineMatchExpr::PermittedByAcl(name) => {
                if resolving.contains(&name.as_str()) {
                    warn!(acl = %name, "ACL references itself, treating as no match");
                    return false;
                }
                let Some(acl) = acls.get(name) else {
                    return false;
                };
                resolving.push(name);
                // First matching line decides; no match is an implicit deny.
                let permitted = acl
                    .lines
                    .iter()
                    .find(|line| {
                        self.matches_inner(
                            &line.match_expr,
                            flow,
                            ingress_interface,
                            acls,
                            ip_spaces,
                            resolving,
                        )
                    })
                    .is_some_and(|line| line.action == LineAction::Permit);
                resolving.pop();
                permitted
            }
            AclLineMatchExpr::And(exprs) => exprs.iter().all(|e| {
                self.matches_inner(e, flow, ingress_interface, acls, ip_spaces, resolving)
            }),
            AclLineMatchExpr::Or(exprs) => exprs.iter().any(|e| {
                self.matches_inner(e, flow, ingress_interface, acls, ip_spaces, resolving)
            }),
            AclLineMatchExpr::Not(inner) => {
                !self.matches_inner(inner, flow, ingress_interface, acls, ip_spaces, resolving)
            }
        }
    }
}

impl AclMatcher for HeaderSpaceMatcher {
    fn matches(
        &self,
        expr: &AclLineMatchExpr,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &AclsByName,
        ip_spaces: &IpSpacesByName,
    ) -> bool {
        let mut resolving = Vec::new();
        self.matches_inner(expr, flow, ingress_interface, acls, ip_spaces, &mut resolving)
    }
}
