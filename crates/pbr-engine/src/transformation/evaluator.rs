//! Transformation evaluation.

use pbr_types::Flow;
use std::sync::Arc;
use tracing::trace;

use super::types::Transformation;
use crate::acl::{AclMatcher, AclsByName, HeaderSpaceMatcher, IpSpacesByName};
use crate::trace::{FlowDiff, StepAction, TraceStep, TransformationTraceStep};

/// Output of evaluating a transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationResult {
    pub output_flow: Flow,
    pub trace_steps: Vec<TraceStep>,
}

/// Rewrites a flow according to a [`Transformation`].
pub trait TransformationEvaluator: Send + Sync {
    fn eval(
        &self,
        transformation: &Transformation,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &AclsByName,
        ip_spaces: &IpSpacesByName,
    ) -> TransformationResult;
}

/// Default evaluator: walks the guard / `and_then` / `or_else` chain and
/// emits one trace step per transformation whose guard matched.
#[derive(Clone)]
pub struct StepTransformationEvaluator {
    matcher: Arc<dyn AclMatcher>,
}

impl StepTransformationEvaluator {
    pub fn new(matcher: Arc<dyn AclMatcher>) -> Self {
        Self { matcher }
    }
}

impl Default for StepTransformationEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(HeaderSpaceMatcher))
    }
}

impl std::fmt::Debug for StepTransformationEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepTransformationEvaluator").finish_non_exhaustive()
    }
}

impl TransformationEvaluator for StepTransformationEvaluator {
    fn eval(
        &self,
        transformation: &Transformation,
        flow: &Flow,
        ingress_interface: Option<&str>,
        acls: &AclsByName,
        ip_spaces: &IpSpacesByName,
    ) -> TransformationResult {
        let mut current = flow.clone();
        let mut trace_steps = Vec::new();
        let mut next = Some(transformation);

        while let Some(t) = next {
            if !self
                .matcher
                .matches(&t.guard, &current, ingress_interface, acls, ip_spaces)
            {
                next = t.or_else.as_deref();
                continue;
            }

            let mut builder = current.to_builder();
            for step in &t.steps {
                step.apply(&mut builder);
            }
            let rewritten = builder.build();
            let flow_diffs = FlowDiff::between(&current, &rewritten);
            let action = if flow_diffs.is_empty() {
                StepAction::Permitted
            } else {
                StepAction::Transformed
            };
            trace!(
                transformation_type = %t.transformation_type,
                diffs = flow_diffs.len(),
                "transformation guard matched"
            );
            trace_steps.push(TraceStep::Transformation(TransformationTraceStep {
                transformation_type: t.transformation_type,
                flow_diffs,
                action,
            }));
            current = rewritten;
            next = t.and_then.as_deref();
        }

        TransformationResult {
            output_flow: current,
            trace_steps,
        }
    }
}
