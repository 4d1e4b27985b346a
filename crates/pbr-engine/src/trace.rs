//! Diagnostic trace records produced while evaluating a packet policy.
//!
//! Trace steps are appended in the order statements execute and are handed
//! back to the caller unchanged, for display and debugging.

use pbr_types::{Flow, FlowField};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome recorded on a trace step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepAction {
    Permitted,
    Denied,
    Transformed,
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permitted => write!(f, "PERMITTED"),
            Self::Denied => write!(f, "DENIED"),
            Self::Transformed => write!(f, "TRANSFORMED"),
        }
    }
}

/// Where in the ingress pipeline a filter ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    /// Filter applied to the packet as received.
    IngressFilter,
    /// Filter applied after the packet was rewritten.
    PostTransformationIngressFilter,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IngressFilter => write!(f, "INGRESS_FILTER"),
            Self::PostTransformationIngressFilter => write!(f, "POST_TRANSFORMATION_INGRESS_FILTER"),
        }
    }
}

/// An ACL applied to the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStep {
    pub filter: String,
    pub filter_type: FilterType,
    pub input_interface: String,
    /// Flow as it was when the filter ran.
    pub flow: Flow,
    pub action: StepAction,
}

/// Kind of rewrite a transformation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationType {
    SourceNat,
    DestNat,
    StaticNat,
}

impl fmt::Display for TransformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNat => write!(f, "SOURCE_NAT"),
            Self::DestNat => write!(f, "DEST_NAT"),
            Self::StaticNat => write!(f, "STATIC_NAT"),
        }
    }
}

/// One header field changed by a transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDiff {
    pub field: FlowField,
    pub old_value: String,
    pub new_value: String,
}

impl FlowDiff {
    /// Lists the differences between two flows.
    pub fn between(before: &Flow, after: &Flow) -> Vec<FlowDiff> {
        before
            .changed_fields(after)
            .into_iter()
            .map(|field| FlowDiff {
                field,
                old_value: field.value_of(before),
                new_value: field.value_of(after),
            })
            .collect()
    }
}

impl fmt::Display for FlowDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.field, self.old_value, self.new_value)
    }
}

/// A transformation evaluated against the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationTraceStep {
    pub transformation_type: TransformationType,
    pub flow_diffs: Vec<FlowDiff>,
    pub action: StepAction,
}

/// A single entry in an evaluation trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceStep {
    Filter(FilterStep),
    Transformation(TransformationTraceStep),
}

impl TraceStep {
    pub fn action(&self) -> StepAction {
        match self {
            Self::Filter(step) => step.action,
            Self::Transformation(step) => step.action,
        }
    }

    pub fn is_transformation(&self) -> bool {
        matches!(self, Self::Transformation(_))
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(step) => write!(
                f,
                "{} {} on {}: {}",
                step.filter_type, step.filter, step.input_interface, step.action
            ),
            Self::Transformation(step) => {
                write!(f, "{}: {}", step.transformation_type, step.action)?;
                for diff in &step.flow_diffs {
                    write!(f, " [{}]", diff)?;
                }
                Ok(())
            }
        }
    }
}
