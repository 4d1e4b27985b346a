//! Top-level packet policy evaluation.

use pbr_types::Flow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::action::{ActionResolver, ForwardingDecision};
use super::context::{EvalState, EvaluationEnv};
use super::statement::StatementEvaluator;
use crate::acl::{AclMatcher, HeaderSpaceMatcher};
use crate::config::EvaluatorConfig;
use crate::error::EvalResult;
use crate::policy::{Action, PacketPolicy};
use crate::trace::TraceStep;
use crate::transformation::{StepTransformationEvaluator, TransformationEvaluator};

/// Outcome of evaluating a packet policy on one flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketPolicyResult {
    /// The flow after all transformations that ran.
    pub final_flow: Flow,
    pub action: Action,
    /// Trace steps of the statements that ran, in order.
    pub trace_steps: Vec<TraceStep>,
}

impl PacketPolicyResult {
    /// Resolves [`Self::action`] against the FIBs in `env`.
    pub fn forwarding_decision(&self, env: &EvaluationEnv<'_>) -> ForwardingDecision {
        ActionResolver::new(*env).resolve(&self.action, &self.final_flow)
    }
}

/// Evaluates packet policies.
///
/// Holds the ACL matcher and transformation evaluator collaborators. The
/// evaluator keeps no per-call state and can be shared across threads.
#[derive(Clone)]
pub struct PacketPolicyEvaluator {
    matcher: Arc<dyn AclMatcher>,
    transformer: Arc<dyn TransformationEvaluator>,
    config: EvaluatorConfig,
}

impl PacketPolicyEvaluator {
    pub fn new(matcher: Arc<dyn AclMatcher>, transformer: Arc<dyn TransformationEvaluator>) -> Self {
        Self {
            matcher,
            transformer,
            config: EvaluatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates `policy` on `flow`, falling back to `default_action` when
    /// no statement decides.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EvalError::UndefinedFilter`] if an `ApplyFilter`
    /// that runs names an ACL missing from `env`. Policies that passed
    /// [`PacketPolicy::validate`] against the same ACLs never fail.
    #[instrument(skip_all, fields(policy = %policy.name, flow = %flow))]
    pub fn evaluate(
        &self,
        flow: &Flow,
        policy: &PacketPolicy,
        env: &EvaluationEnv<'_>,
        default_action: &Action,
    ) -> EvalResult<PacketPolicyResult> {
        let statements = StatementEvaluator::new(
            *env,
            self.matcher.as_ref(),
            self.transformer.as_ref(),
            &self.config,
        );
        let mut state = EvalState::new(flow);

        let action = match statements.eval_all(&policy.statements, &mut state)? {
            Some(action) => action,
            None => {
                debug!(%default_action, "no statement decided, using default action");
                default_action.clone()
            }
        };
        debug!(%action, steps = state.trace.len(), "policy evaluated");

        Ok(PacketPolicyResult {
            final_flow: state.flow.build(),
            action,
            trace_steps: state.trace,
        })
    }

    /// Evaluates `policy` with its own default action.
    ///
    /// # Errors
    ///
    /// As [`Self::evaluate`].
    pub fn evaluate_policy(
        &self,
        flow: &Flow,
        policy: &PacketPolicy,
        env: &EvaluationEnv<'_>,
    ) -> EvalResult<PacketPolicyResult> {
        self.evaluate(flow, policy, env, &policy.default_action)
    }
}

impl Default for PacketPolicyEvaluator {
    fn default() -> Self {
        let matcher: Arc<dyn AclMatcher> = Arc::new(HeaderSpaceMatcher);
        let transformer = Arc::new(StepTransformationEvaluator::new(Arc::clone(&matcher)));
        Self::new(matcher, transformer)
    }
}

impl std::fmt::Debug for PacketPolicyEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketPolicyEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
