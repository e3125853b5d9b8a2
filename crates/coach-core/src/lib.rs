//! Core planning logic for the daily coach.
//!
//! - [`schema`]: request/response records and boundary validation.
//! - [`time`]: `HH:MM` wall-clock arithmetic.
//! - [`scheduler`]: the deterministic fallback scheduler.
//! - [`generate`]: model-backed generation with fallback orchestration.

pub mod generate;
pub mod scheduler;
pub mod schema;
pub mod time;
