//! Parsing and validation of model output.
//!
//! Parses the model's completion text into a [`PlanResponse`] and checks it
//! against the request:
//! - One block per goal, with task labels matching the goals in order.
//! - Every time is a valid `HH:MM`.
//! - The first block starts at the requested start time.
//! - Blocks are contiguous (each starts where the previous one ended).
//! - Scheduled minutes fit within `available_hours`.
//! - `priority_order` is a permutation of the goals.

use thiserror::Error;

use crate::schema::{PlanRequest, PlanResponse};
use crate::time::{ClockTime, FormatError};

/// Errors that can occur while parsing or validating a generated plan.
#[derive(Debug, Error)]
pub enum PlanValidationError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid request start_time: {0}")]
    RequestStartTime(FormatError),

    #[error("expected {expected} schedule blocks, got {actual}")]
    BlockCount { expected: usize, actual: usize },

    #[error("block {index} is for task {actual:?}, expected {expected:?}")]
    TaskMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("block {index} has an invalid time: {source}")]
    InvalidTime { index: usize, source: FormatError },

    #[error("first block starts at {actual}, expected {expected}")]
    StartMismatch { expected: String, actual: String },

    #[error("block {index} starts at {start} but the previous block ends at {previous_end}")]
    NotContiguous {
        index: usize,
        previous_end: String,
        start: String,
    },

    #[error("schedule spans {scheduled} minutes but only {available} are available")]
    OverBudget { scheduled: u64, available: u64 },

    #[error("priority_order is not a permutation of the goals")]
    PriorityOrder,
}

/// Parse completion text into a plan.
///
/// Models often wrap JSON in a Markdown code fence; the fence is stripped
/// before parsing.
pub fn parse_plan_json(content: &str) -> Result<PlanResponse, PlanValidationError> {
    Ok(serde_json::from_str(strip_code_fence(content))?)
}

/// Validate a generated plan against the request it answers.
///
/// On success every block time is rewritten in zero-padded `HH:MM` form.
pub fn validate_generated_plan(
    request: &PlanRequest,
    mut plan: PlanResponse,
) -> Result<PlanResponse, PlanValidationError> {
    let start =
        ClockTime::parse(&request.start_time).map_err(PlanValidationError::RequestStartTime)?;

    if plan.schedule.len() != request.goals.len() {
        return Err(PlanValidationError::BlockCount {
            expected: request.goals.len(),
            actual: plan.schedule.len(),
        });
    }

    let mut previous_end: Option<ClockTime> = None;
    let mut scheduled: u64 = 0;

    for (index, (block, goal)) in plan.schedule.iter_mut().zip(&request.goals).enumerate() {
        if block.task != *goal {
            return Err(PlanValidationError::TaskMismatch {
                index,
                expected: goal.clone(),
                actual: block.task.clone(),
            });
        }

        let block_start = ClockTime::parse(&block.start_time)
            .map_err(|source| PlanValidationError::InvalidTime { index, source })?;
        let block_end = ClockTime::parse(&block.end_time)
            .map_err(|source| PlanValidationError::InvalidTime { index, source })?;

        match previous_end {
            None if block_start != start => {
                return Err(PlanValidationError::StartMismatch {
                    expected: start.to_string(),
                    actual: block_start.to_string(),
                });
            }
            Some(end) if block_start != end => {
                return Err(PlanValidationError::NotContiguous {
                    index,
                    previous_end: end.to_string(),
                    start: block_start.to_string(),
                });
            }
            _ => {}
        }

        scheduled += u64::from(block_start.minutes_until(block_end));
        previous_end = Some(block_end);
        block.start_time = block_start.to_string();
        block.end_time = block_end.to_string();
    }

    let available = u64::from(request.available_hours) * 60;
    if scheduled > available {
        return Err(PlanValidationError::OverBudget {
            scheduled,
            available,
        });
    }

    if !is_permutation(&plan.priority_order, &request.goals) {
        return Err(PlanValidationError::PriorityOrder);
    }

    Ok(plan)
}

fn is_permutation(candidate: &[String], goals: &[String]) -> bool {
    let mut a: Vec<&str> = candidate.iter().map(String::as_str).collect();
    let mut b: Vec<&str> = goals.iter().map(String::as_str).collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Strip a surrounding Markdown code fence (```json ... ```), if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
