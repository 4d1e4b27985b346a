//! Per-call evaluation inputs and state.

use pbr_types::{Flow, FlowBuilder};

use crate::acl::{AclsByName, IpSpacesByName};
use crate::fib::FibsByVrf;
use crate::trace::TraceStep;

/// Read-only context of one evaluation: where the packet entered and the
/// network state it is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationEnv<'a> {
    /// Interface the packet arrived on.
    pub src_interface: &'a str,
    /// VRF of `src_interface`.
    pub src_interface_vrf: &'a str,
    pub acls: &'a AclsByName,
    pub ip_spaces: &'a IpSpacesByName,
    pub fibs: &'a FibsByVrf,
}

impl<'a> EvaluationEnv<'a> {
    pub fn new(
        src_interface: &'a str,
        src_interface_vrf: &'a str,
        acls: &'a AclsByName,
        ip_spaces: &'a IpSpacesByName,
        fibs: &'a FibsByVrf,
    ) -> Self {
        Self {
            src_interface,
            src_interface_vrf,
            acls,
            ip_spaces,
            fibs,
        }
    }
}

/// Mutable state threaded through the statements of one evaluation.
#[derive(Debug, Clone)]
pub struct EvalState {
    /// The in-progress flow, rewritten by transformations.
    pub flow: FlowBuilder,
    /// Trace steps in execution order.
    pub trace: Vec<TraceStep>,
}

impl EvalState {
    pub fn new(flow: &Flow) -> Self {
        Self {
            flow: flow.to_builder(),
            trace: Vec::new(),
        }
    }

    /// Returns true once any transformation has run.
    pub fn has_transformed(&self) -> bool {
        self.trace.iter().any(TraceStep::is_transformation)
    }
}
