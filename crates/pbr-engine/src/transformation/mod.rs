//! Packet transformations (NAT-like header rewrites).
//!
//! `ApplyTransformation` statements hand the current flow to a
//! [`TransformationEvaluator`] and continue with its output flow.
//! [`StepTransformationEvaluator`] is the evaluator used when the caller
//! does not supply its own.

mod evaluator;
mod types;

pub use evaluator::{StepTransformationEvaluator, TransformationEvaluator, TransformationResult};
pub use types::{Transformation, TransformationStep};
