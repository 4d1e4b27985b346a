//! Statement execution.

use tracing::debug;

use super::bool_expr::BoolExprEvaluator;
use super::context::{EvalState, EvaluationEnv};
use crate::acl::AclMatcher;
use crate::config::EvaluatorConfig;
use crate::error::{EvalError, EvalResult};
use crate::policy::{Action, Statement};
use crate::trace::{FilterStep, FilterType, StepAction, TraceStep};
use crate::transformation::TransformationEvaluator;

/// Executes statements against an [`EvalState`].
///
/// Each statement yields `Some(action)` when it decides the packet's fate,
/// which ends the whole policy, or `None` to continue with the next one.
#[derive(Clone, Copy)]
pub struct StatementEvaluator<'a> {
    env: EvaluationEnv<'a>,
    matcher: &'a dyn AclMatcher,
    transformer: &'a dyn TransformationEvaluator,
    conditions: BoolExprEvaluator<'a>,
}

impl<'a> StatementEvaluator<'a> {
    pub fn new(
        env: EvaluationEnv<'a>,
        matcher: &'a dyn AclMatcher,
        transformer: &'a dyn TransformationEvaluator,
        config: &EvaluatorConfig,
    ) -> Self {
        Self {
            env,
            matcher,
            transformer,
            conditions: BoolExprEvaluator::new(env, matcher, config),
        }
    }

    /// Runs `statements` in order, stopping at the first decision.
    pub fn eval_all(&self, statements: &[Statement], state: &mut EvalState) -> EvalResult<Option<Action>> {
        for statement in statements {
            if let Some(action) = self.eval(statement, state)? {
                return Ok(Some(action));
            }
        }
        Ok(None)
    }

    pub fn eval(&self, statement: &Statement, state: &mut EvalState) -> EvalResult<Option<Action>> {
        match statement {
            Statement::Return { action } => {
                debug!(%action, "return");
                Ok(Some(action.clone()))
            }
            Statement::If { condition, body } => {
                if self.conditions.eval(condition, state.flow.current()) {
                    debug!("condition matched");
                    self.eval_all(body, state)
                } else {
                    Ok(None)
                }
            }
            Statement::ApplyFilter { filter_name } => self.apply_filter(filter_name, state),
            Statement::ApplyTransformation { transformation } => {
                let result = self.transformer.eval(
                    transformation,
                    state.flow.current(),
                    Some(self.env.src_interface),
                    self.env.acls,
                    self.env.ip_spaces,
                );
                debug!(
                    transformation_type = %transformation.transformation_type,
                    steps = result.trace_steps.len(),
                    "transformation applied"
                );
                state.flow.reset_to(result.output_flow);
                state.trace.extend(result.trace_steps);
                Ok(None)
            }
        }
    }

    fn apply_filter(&self, filter_name: &str, state: &mut EvalState) -> EvalResult<Option<Action>> {
        let acl = self
            .env
            .acls
            .get(filter_name)
            .ok_or_else(|| EvalError::UndefinedFilter {
                filter: filter_name.to_string(),
            })?;

        let filter_type = if state.has_transformed() {
            FilterType::PostTransformationIngressFilter
        } else {
            FilterType::IngressFilter
        };
        let flow = state.flow.current().clone();
        let result = acl.filter(
            &flow,
            Some(self.env.src_interface),
            self.env.acls,
            self.env.ip_spaces,
            self.matcher,
        );
        let action = if result.is_permitted() {
            StepAction::Permitted
        } else {
            StepAction::Denied
        };
        debug!(
            filter = filter_name,
            %filter_type,
            %action,
            line = ?result.matched_line,
            "filter applied"
        );

        state.trace.push(TraceStep::Filter(FilterStep {
            filter: filter_name.to_string(),
            filter_type,
            input_interface: self.env.src_interface.to_string(),
            flow,
            action,
        }));

        Ok((action == StepAction::Denied).then_some(Action::Drop))
    }
}
