//! `coach plan`: generate a plan from a request file without running a server.

use std::io::Read;

use anyhow::{Context, Result};

use coach_core::generate::{self, GeneratedPlan, PlanGenerator};
use coach_core::schema::PlanRequest;

/// Read a request from `path`, or stdin when `path` is `-`.
pub fn read_request(path: &str) -> Result<PlanRequest> {
    let contents = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {path}"))?
    };
    parse_request(&contents)
}

/// Parse and validate a JSON request body.
pub fn parse_request(contents: &str) -> Result<PlanRequest> {
    let request: PlanRequest =
        serde_json::from_str(contents).context("request is not a valid plan request")?;
    request.validate().context("request failed validation")?;
    Ok(request)
}

/// Generate the plan and render it as pretty JSON.
pub async fn render_plan(
    generator: Option<&dyn PlanGenerator>,
    request: &PlanRequest,
) -> Result<(GeneratedPlan, String)> {
    let generated = generate::generate_plan(generator, request)
        .await
        .context("failed to build plan")?;
    let rendered =
        serde_json::to_string_pretty(&generated.plan).context("failed to serialize plan")?;
    Ok((generated, rendered))
}

/// Execute `coach plan <file>`.
pub async fn run_plan(generator: Option<&dyn PlanGenerator>, path: &str) -> Result<()> {
    let request = read_request(path)?;
    let (generated, rendered) = render_plan(generator, &request).await?;
    tracing::info!(source = %generated.source, goals = request.goals.len(), "plan generated");
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::generate::PlanSource;

    const REQUEST: &str = r#"{
        "goals": ["A", "B"],
        "available_hours": 4,
        "distractions": [],
        "start_time": "08:00",
        "energy_level": "high"
    }"#;

    #[test]
    fn reads_request_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("request.json");
        std::fs::write(&path, REQUEST).unwrap();

        let request = read_request(path.to_str().unwrap()).unwrap();
        assert_eq!(request.goals, vec!["A", "B"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let msg = format!("{:#}", read_request("/definitely/not/here.json").unwrap_err());
        assert!(msg.contains("failed to read request file"), "unexpected: {msg}");
    }

    #[test]
    fn invalid_request_is_rejected() {
        let err = parse_request(r#"{"goals":["A"],"available_hours":1,"start_time":"9am","energy_level":"low"}"#)
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("request failed validation"), "unexpected: {msg}");
        assert!(msg.contains("start_time"), "unexpected: {msg}");
    }

    #[test]
    fn malformed_json_is_rejected() {
        let msg = format!("{:#}", parse_request("[]").unwrap_err());
        assert!(msg.contains("not a valid plan request"), "unexpected: {msg}");
    }

    #[tokio::test]
    async fn renders_fallback_plan() {
        let request = parse_request(REQUEST).unwrap();
        let (generated, rendered) = render_plan(None, &request).await.unwrap();

        assert_eq!(generated.source, PlanSource::Fallback);
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["schedule"][0]["start_time"], "08:00");
        assert_eq!(json["schedule"][0]["end_time"], "10:00");
        assert_eq!(json["schedule"][1]["end_time"], "12:00");
        assert!(rendered.contains('\n'), "output should be pretty-printed");
    }
}
