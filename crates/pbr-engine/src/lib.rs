//! Packet policy (policy-based routing) evaluation engine.
//!
//! Given a packet [`Flow`], the interface it arrived on and that interface's
//! VRF, the engine runs a [`PacketPolicy`] to decide what happens to the
//! packet, producing:
//!
//! - the final flow, after any transformations (NAT) the policy applied,
//! - the terminal [`Action`] (drop, or a FIB lookup in some VRF),
//! - the ordered [`TraceStep`]s of every filter and transformation that ran.
//!
//! # Architecture
//!
//! ```text
//! PacketPolicyEvaluator
//!   └── StatementEvaluator      (one statement at a time, shared EvalState)
//!         ├── BoolExprEvaluator (If conditions; FIB lookups across VRFs)
//!         ├── AclMatcher        (PacketMatchExpr, ApplyFilter)
//!         └── TransformationEvaluator (ApplyTransformation)
//! ActionResolver                (Action -> ForwardingDecision)
//! ```
//!
//! The ACL matcher and the transformation evaluator are trait objects so
//! callers can plug in their own; [`HeaderSpaceMatcher`] and
//! [`StepTransformationEvaluator`] are used by default.
//!
//! # Example
//!
//! ```
//! use pbr_engine::{
//!     evaluate, Action, AclsByName, BoolExpr, AclLineMatchExpr, FibsByVrf,
//!     IpSpacesByName, PacketPolicy, Statement,
//! };
//! use pbr_types::{Flow, IpAddress};
//!
//! let policy = PacketPolicy::new(
//!     "pbr",
//!     vec![Statement::if_then(
//!         BoolExpr::packet_match(AclLineMatchExpr::match_dst_prefix(
//!             "10.0.0.0/24".parse().unwrap(),
//!         )),
//!         vec![Statement::ret(Action::fib_lookup("blue"))],
//!     )],
//!     Action::fib_lookup_ingress_vrf(),
//! );
//! let flow = Flow::builder("r1").with_dst_ip(IpAddress::v4(10, 0, 0, 5)).build();
//!
//! let result = evaluate(
//!     &flow,
//!     "Ethernet0",
//!     "default",
//!     &policy,
//!     &AclsByName::new(),
//!     &IpSpacesByName::new(),
//!     &FibsByVrf::new(),
//!     &policy.default_action,
//! )
//! .unwrap();
//! assert_eq!(result.action, Action::fib_lookup("blue"));
//! ```

pub mod acl;
pub mod config;
pub mod error;
pub mod eval;
pub mod fib;
pub mod policy;
pub mod trace;
pub mod transformation;

pub use acl::{
    AccessList, AclLine, AclLineMatchExpr, AclMatcher, AclsByName, FilterResult, HeaderSpace,
    HeaderSpaceMatcher, IpSpace, IpSpacesByName, LineAction, PortRange,
};
pub use config::EvaluatorConfig;
pub use error::{EvalError, EvalResult, PolicyError};
pub use eval::{
    ActionResolver, BoolExprEvaluator, EvalState, EvaluationEnv, ForwardingDecision,
    PacketPolicyEvaluator, PacketPolicyResult, StatementEvaluator, VrfExprEvaluator,
};
pub use fib::{Fib, FibAction, FibEntry, FibsByVrf, RouteProtocol};
pub use policy::{Action, BoolExpr, Conjunction, OverrideLookupIp, PacketPolicy, Statement, VrfExpr};
pub use trace::{
    FilterStep, FilterType, FlowDiff, StepAction, TraceStep, TransformationTraceStep,
    TransformationType,
};
pub use transformation::{
    StepTransformationEvaluator, Transformation, TransformationEvaluator, TransformationResult,
    TransformationStep,
};

use pbr_types::Flow;

/// Evaluates `policy` on `flow` with the default collaborators and
/// configuration, using `default_action` when no statement decides.
///
/// # Errors
///
/// Returns [`EvalError::UndefinedFilter`] if an `ApplyFilter` that runs
/// names an ACL missing from `acls`.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    flow: &Flow,
    src_interface: &str,
    src_interface_vrf: &str,
    policy: &PacketPolicy,
    acls: &AclsByName,
    ip_spaces: &IpSpacesByName,
    fibs: &FibsByVrf,
    default_action: &Action,
) -> EvalResult<PacketPolicyResult> {
    let env = EvaluationEnv::new(src_interface, src_interface_vrf, acls, ip_spaces, fibs);
    PacketPolicyEvaluator::default().evaluate(flow, policy, &env, default_action)
}

/// Like [`evaluate`], with the policy's own default action.
///
/// # Errors
///
/// As [`evaluate`].
pub fn evaluate_policy(
    flow: &Flow,
    src_interface: &str,
    src_interface_vrf: &str,
    policy: &PacketPolicy,
    acls: &AclsByName,
    ip_spaces: &IpSpacesByName,
    fibs: &FibsByVrf,
) -> EvalResult<PacketPolicyResult> {
    let env = EvaluationEnv::new(src_interface, src_interface_vrf, acls, ip_spaces, fibs);
    PacketPolicyEvaluator::default().evaluate_policy(flow, policy, &env)
}
