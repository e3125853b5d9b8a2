//! The `PlanGenerator` trait and its error taxonomy.
//!
//! A generator turns a [`PlanRequest`] into a [`PlanResponse`] by way of an
//! external model. The trait is object-safe so the server can hold one as
//! `Arc<dyn PlanGenerator>`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::validate::PlanValidationError;
use crate::schema::{PlanRequest, PlanResponse};

/// Reasons a model-backed generation attempt failed.
///
/// Every variant triggers the deterministic fallback.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model call timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no completion text")]
    EmptyCompletion,

    #[error("model output failed validation: {0}")]
    ValidationFailure(#[from] PlanValidationError),
}

impl GenerationError {
    /// Short, stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::EmptyCompletion => "empty_completion",
            Self::ValidationFailure(_) => "validation_failure",
        }
    }
}

/// Adapter interface for model-backed plan generation.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Human-readable name for logs (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Produce a plan that already satisfies the schedule invariants.
    ///
    /// Implementations validate model output before returning it; the caller
    /// only appends the energy tip.
    async fn generate(&self, request: &PlanRequest) -> Result<PlanResponse, GenerationError>;
}

// Compile-time assertion: PlanGenerator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};
