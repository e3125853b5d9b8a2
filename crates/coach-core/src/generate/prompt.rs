//! Prompt construction for model-backed planning.
//!
//! Pure string assembly, no I/O.

use crate::schema::{EnergyLevel, PlanRequest};

/// JSON response contract included in the system prompt.
const RESPONSE_CONTRACT: &str = r#"## Response Format

Reply with a single JSON object and nothing else:

```json
{
  "priority_order": ["goal", "..."],
  "schedule": [
    {"task": "goal", "start_time": "HH:MM", "end_time": "HH:MM"}
  ],
  "tips": ["short advice", "..."]
}
```

- `priority_order` lists every goal exactly once, most important first.
- `schedule` has exactly one block per goal, in the order the goals were given.
- Each block's `task` is the goal text, copied verbatim.
- The first block starts at `start_time`; each later block starts where the previous one ends.
- The blocks together must not exceed `available_hours`.
"#;

/// Energy-level handling guidance included in the system prompt.
const ENERGY_GUIDELINES: &str = r#"## Energy Level Handling

- **high**: longer deep-focus work blocks, fewer breaks.
- **medium**: balanced work blocks.
- **low**: shorter tasks, gentle pacing and breaks.
"#;

/// Build the system prompt for the planning model.
pub fn build_system_prompt() -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str("# Personal Productivity Coach\n\n");
    prompt.push_str(
        "You are an AI personal productivity coach. \
         Turn the user's goals into a realistic plan for today.\n\n",
    );
    prompt.push_str("You MUST follow these rules:\n");
    prompt.push_str("1. Start the schedule from the provided start_time.\n");
    prompt.push_str("2. Split available_hours across all tasks.\n");
    prompt.push_str("3. Each task must have start_time and end_time in HH:MM format.\n");
    prompt.push_str("4. Do not leave the schedule empty.\n\n");

    prompt.push_str(ENERGY_GUIDELINES);
    prompt.push('\n');
    prompt.push_str(RESPONSE_CONTRACT);
    prompt.push('\n');
    prompt.push_str("Be practical, clear, and motivating.\n");

    prompt
}

/// Build the user message carrying the request.
pub fn build_user_prompt(request: &PlanRequest) -> String {
    let mut prompt = String::with_capacity(512);

    prompt.push_str("Plan my day.\n\n");
    prompt.push_str(&format!("- **Start time:** {}\n", request.start_time));
    prompt.push_str(&format!(
        "- **Available hours:** {}\n",
        request.available_hours
    ));
    prompt.push_str(&format!(
        "- **Energy level:** {} ({})\n",
        request.energy_level,
        energy_hint(request.energy_level)
    ));

    prompt.push_str("\n### Goals\n\n");
    for (i, goal) in request.goals.iter().enumerate() {
        prompt.push_str(&format!("{}. {goal}\n", i + 1));
    }

    if request.distractions.is_empty() {
        prompt.push_str("\n- **Distractions:** none reported\n");
    } else {
        prompt.push_str("\n### Distractions to Plan Around\n\n");
        for distraction in &request.distractions {
            prompt.push_str(&format!("- {distraction}\n"));
        }
    }

    prompt
}

fn energy_hint(level: EnergyLevel) -> &'static str {
    match level {
        EnergyLevel::High => "favor long focus blocks",
        EnergyLevel::Medium => "keep blocks balanced",
        EnergyLevel::Low => "keep blocks short and gentle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PlanRequest {
        PlanRequest {
            goals: vec!["Study".to_string(), "Workout".to_string()],
            available_hours: 6,
            distractions: vec!["phone".to_string()],
            start_time: "07:30".to_string(),
            energy_level: EnergyLevel::Low,
        }
    }

    #[test]
    fn system_prompt_contains_rules_and_contract() {
        let prompt = build_system_prompt();
        assert!(prompt.contains("Start the schedule from the provided start_time"));
        assert!(prompt.contains("Do not leave the schedule empty"));
        assert!(prompt.contains("\"priority_order\""));
        assert!(prompt.contains("## Energy Level Handling"));
    }

    #[test]
    fn user_prompt_lists_goals_in_order() {
        let prompt = build_user_prompt(&request());
        let study = prompt.find("1. Study").expect("first goal");
        let workout = prompt.find("2. Workout").expect("second goal");
        assert!(study < workout);
    }

    #[test]
    fn user_prompt_includes_inputs() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.contains("**Start time:** 07:30"));
        assert!(prompt.contains("**Available hours:** 6"));
        assert!(prompt.contains("**Energy level:** low (keep blocks short and gentle)"));
        assert!(prompt.contains("- phone"));
    }

    #[test]
    fn user_prompt_without_distractions() {
        let mut req = request();
        req.distractions.clear();
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("**Distractions:** none reported"));
        assert!(!prompt.contains("### Distractions"));
    }
}
