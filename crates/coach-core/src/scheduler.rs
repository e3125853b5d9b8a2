//! Deterministic fallback scheduler.
//!
//! Converts a [`PlanRequest`] into a plan without any external call. Blocks
//! are laid out back to back from `start_time`, one per goal, in goal order.
//! The same input always produces the same output.

use crate::schema::{EnergyLevel, PlanRequest, PlanResponse, TimeBlock};
use crate::time::{ClockTime, FormatError, format_minutes};

/// Tip that opens every fallback plan.
pub const BASE_TIP: &str = "Focus on one task at a time";

/// Build a plan from the request alone.
///
/// Fails only when `start_time` is not a valid `HH:MM` time.
pub fn build_fallback_plan(request: &PlanRequest) -> Result<PlanResponse, FormatError> {
    let start = ClockTime::parse(&request.start_time)?;
    let duration = minutes_per_task(
        request.available_hours,
        request.energy_level,
        request.goals.len(),
    );

    Ok(PlanResponse {
        priority_order: request.goals.clone(),
        schedule: lay_out_blocks(&request.goals, start, duration),
        tips: fallback_tips(request.energy_level),
    })
}

/// Minutes allotted to each goal.
///
/// High and medium energy split the hours evenly. Low energy divides over one
/// extra slot, leaving room for breaks. A goal count of zero is treated as one.
pub fn minutes_per_task(available_hours: u32, energy: EnergyLevel, goal_count: usize) -> u64 {
    let total = u64::from(available_hours) * 60;
    let task_count = goal_count.max(1) as u64;
    match energy {
        EnergyLevel::High | EnergyLevel::Medium => total / task_count,
        EnergyLevel::Low => total / (task_count + 1),
    }
}

/// Contiguous blocks of `duration` minutes, starting at `start`.
pub fn lay_out_blocks(goals: &[String], start: ClockTime, duration: u64) -> Vec<TimeBlock> {
    let mut current = u64::from(start.minutes());
    goals
        .iter()
        .map(|goal| {
            let end = current + duration;
            let block = TimeBlock {
                task: goal.clone(),
                start_time: format_minutes(current),
                end_time: format_minutes(end),
            };
            current = end;
            block
        })
        .collect()
}

/// The base tip followed by one energy-specific tip.
pub fn fallback_tips(energy: EnergyLevel) -> Vec<String> {
    vec![BASE_TIP.to_string(), energy.fallback_tip().to_string()]
}
