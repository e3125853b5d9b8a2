//! Model-backed plan generation with deterministic fallback.
//!
//! ```text
//! generate_plan(generator, request)
//!     |
//!     +-- generator configured? --no--> build_fallback_plan(request)
//!     |
//!     v
//! PlanGenerator::generate(request)
//!     |-- Ok(plan)  --> plan + coaching tip        (PlanSource::Model)
//!     '-- Err(any)  --> build_fallback_plan(request) (PlanSource::Fallback)
//! ```
//!
//! The generator is an injected collaborator; nothing here holds global state.

pub mod generator;
pub mod openrouter;
pub mod prompt;
pub mod validate;

use std::fmt;

use tracing::warn;

pub use generator::{GenerationError, PlanGenerator};
pub use openrouter::{ModelConfig, OpenRouterGenerator};
pub use prompt::{build_system_prompt, build_user_prompt};
pub use validate::{PlanValidationError, parse_plan_json, validate_generated_plan};

use crate::scheduler::build_fallback_plan;
use crate::schema::{PlanRequest, PlanResponse};
use crate::time::FormatError;

/// Which path produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Model,
    Fallback,
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// A plan together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlan {
    pub plan: PlanResponse,
    pub source: PlanSource,
}

/// Produce a plan, preferring the model and falling back on any failure.
///
/// The fallback receives the original request untouched. Its only failure
/// mode, an unparsable `start_time`, is returned to the caller.
pub async fn generate_plan(
    generator: Option<&dyn PlanGenerator>,
    request: &PlanRequest,
) -> Result<GeneratedPlan, FormatError> {
    if let Some(generator) = generator {
        match generator.generate(request).await {
            Ok(mut plan) => {
                plan.tips
                    .push(request.energy_level.coaching_tip().to_string());
                return Ok(GeneratedPlan {
                    plan,
                    source: PlanSource::Model,
                });
            }
            Err(err) => {
                warn!(
                    generator = generator.name(),
                    kind = err.kind(),
                    error = %err,
                    "model generation failed, using deterministic fallback"
                );
            }
        }
    }

    Ok(GeneratedPlan {
        plan: build_fallback_plan(request)?,
        source: PlanSource::Fallback,
    })
}
