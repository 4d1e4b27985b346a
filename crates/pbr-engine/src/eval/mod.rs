//! Packet policy evaluation.
//!
//! [`PacketPolicyEvaluator`] runs a policy's statements in order against
//! an [`EvalState`] created per call. Conditions go through
//! [`BoolExprEvaluator`], statements through [`StatementEvaluator`], and the
//! resulting action can be turned into a [`ForwardingDecision`] with
//! [`ActionResolver`].

mod action;
mod bool_expr;
mod context;
mod evaluator;
mod statement;
mod vrf;

pub use action::{ActionResolver, ForwardingDecision};
pub use bool_expr::BoolExprEvaluator;
pub use context::{EvalState, EvaluationEnv};
pub use evaluator::{PacketPolicyEvaluator, PacketPolicyResult};
pub use statement::StatementEvaluator;
pub use vrf::VrfExprEvaluator;
