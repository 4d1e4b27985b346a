//! Evaluation of `If` conditions.

use pbr_types::{Flow, IpAddress};
use std::collections::BTreeSet;
use tracing::{trace, warn};

use super::context::EvaluationEnv;
use super::vrf::VrfExprEvaluator;
use crate::acl::AclMatcher;
use crate::config::EvaluatorConfig;
use crate::fib::FibAction;
use crate::policy::BoolExpr;

/// Evaluates [`BoolExpr`]s against the current flow. Has no side effects.
#[derive(Clone, Copy)]
pub struct BoolExprEvaluator<'a> {
    env: EvaluationEnv<'a>,
    matcher: &'a dyn AclMatcher,
    max_next_vrf_depth: usize,
}

impl<'a> BoolExprEvaluator<'a> {
    pub fn new(env: EvaluationEnv<'a>, matcher: &'a dyn AclMatcher, config: &EvaluatorConfig) -> Self {
        Self {
            env,
            matcher,
            max_next_vrf_depth: config.max_next_vrf_depth,
        }
    }

    pub fn eval(&self, expr: &BoolExpr, flow: &Flow) -> bool {
        match expr {
            BoolExpr::True => true,
            BoolExpr::False => false,
            BoolExpr::Conjunction(c) => c.conjuncts().iter().all(|e| self.eval(e, flow)),
            BoolExpr::PacketMatchExpr { expr } => self.matcher.matches(
                expr,
                flow,
                Some(self.env.src_interface),
                self.env.acls,
                self.env.ip_spaces,
            ),
            BoolExpr::FibLookupOutgoingInterfaceIsOneOf { vrf, interfaces } => {
                let vrf = VrfExprEvaluator::new(self.env.src_interface_vrf).resolve(vrf);
                let mut path = Vec::new();
                self.exits_through(vrf, flow.dst_ip(), flow.dst_ip(), interfaces, &mut path)
            }
        }
    }

    /// Returns true if any FIB path for `lookup_ip` in `vrf` leaves through
    /// one of `interfaces`. `path` holds the (VRF, IP) lookups already on the
    /// current recursion path.
    fn exits_through<'v>(
        &self,
        vrf: &'v str,
        lookup_ip: IpAddress,
        dst_ip: IpAddress,
        interfaces: &BTreeSet<String>,
        path: &mut Vec<(&'v str, IpAddress)>,
    ) -> bool
    where
        'a: 'v,
    {
        if path.contains(&(vrf, lookup_ip)) {
            warn!(vrf, ip = %lookup_ip, "NextVrf cycle, treating branch as no match");
            return false;
        }
        if path.len() > self.max_next_vrf_depth {
            warn!(
                vrf,
                ip = %lookup_ip,
                max_depth = self.max_next_vrf_depth,
                "NextVrf chain too deep, treating branch as no match"
            );
            return false;
        }
        let fibs: &'a _ = self.env.fibs;
        let Some(fib) = fibs.get(vrf) else {
            trace!(vrf, "no FIB for VRF");
            return false;
        };

        path.push((vrf, lookup_ip));
        let mut found = false;
        for entry in fib.get(&lookup_ip) {
            let hit = match &entry.action {
                FibAction::Forward { interface_name, .. } => interfaces.contains(interface_name),
                FibAction::NextVrf {
                    vrf_name,
                    override_ip,
                } => {
                    let next_ip = override_ip.unwrap_or(dst_ip);
                    trace!(from = vrf, to = %vrf_name, ip = %next_ip, "following NextVrf");
                    self.exits_through(vrf_name.as_str(), next_ip, dst_ip, interfaces, path)
                }
                FibAction::NullRoute => false,
            };
            if hit {
                found = true;
                break;
            }
        }
        path.pop();
        found
    }
}
