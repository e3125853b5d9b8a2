use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use coach_core::generate::{self, PlanGenerator};
use coach_core::schema::{PlanRequest, PlanResponse};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    /// Request was well-formed HTTP but its content is unusable.
    pub fn unprocessable(err: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Shared, immutable per-process state.
#[derive(Clone, Default)]
pub struct AppState {
    /// Model-backed generator; `None` serves fallback plans only.
    pub generator: Option<Arc<dyn PlanGenerator>>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate-plan", post(generate_plan))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("coach serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("coach serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "Daily coach backend is running" }))
}

async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let Json(request) = payload?;
    request.validate().map_err(AppError::unprocessable)?;

    let generated = generate::generate_plan(state.generator.as_deref(), &request)
        .await
        .map_err(AppError::unprocessable)?;

    tracing::info!(
        source = %generated.source,
        goals = request.goals.len(),
        energy = %request.energy_level,
        "plan generated"
    );

    Ok(Json(generated.plan))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use coach_core::generate::{GenerationError, PlanGenerator};
    use coach_core::schema::{PlanRequest, PlanResponse, TimeBlock};

    use super::AppState;

    // -----------------------------------------------------------------------
    // Stub generators
    // -----------------------------------------------------------------------

    struct FailingGenerator;

    #[async_trait]
    impl PlanGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _request: &PlanRequest) -> Result<PlanResponse, GenerationError> {
            Err(GenerationError::Transport("connection refused".into()))
        }
    }

    /// Returns one even block per goal, mimicking a well-behaved model.
    struct EvenSplitGenerator;

    #[async_trait]
    impl PlanGenerator for EvenSplitGenerator {
        fn name(&self) -> &str {
            "even-split"
        }

        async fn generate(&self, request: &PlanRequest) -> Result<PlanResponse, GenerationError> {
            Ok(PlanResponse {
                priority_order: request.goals.iter().rev().cloned().collect(),
                schedule: request
                    .goals
                    .iter()
                    .map(|goal| TimeBlock {
                        task: goal.clone(),
                        start_time: request.start_time.clone(),
                        end_time: request.start_time.clone(),
                    })
                    .collect(),
                tips: vec!["Drink water".to_string()],
            })
        }
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn offline() -> AppState {
        AppState::default()
    }

    fn with_generator(generator: impl PlanGenerator + 'static) -> AppState {
        AppState {
            generator: Some(Arc::new(generator)),
        }
    }

    async fn get(state: AppState, uri: &str) -> axum::response::Response {
        let app = super::build_router(state);
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_plan(state: AppState, body: &str) -> axum::response::Response {
        let app = super::build_router(state);
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate-plan")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request_json(goals: &[&str], hours: u32, start: &str, energy: &str) -> String {
        serde_json::json!({
            "goals": goals,
            "available_hours": hours,
            "distractions": ["phone", "social media"],
            "start_time": start,
            "energy_level": energy,
        })
        .to_string()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_index_reports_status() {
        let resp = get(offline(), "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "Daily coach backend is running");
    }

    #[tokio::test]
    async fn test_generate_plan_offline_uses_fallback() {
        let resp = post_plan(offline(), &request_json(&["Write report"], 2, "09:00", "medium")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(
            json,
            serde_json::json!({
                "priority_order": ["Write report"],
                "schedule": [
                    { "task": "Write report", "start_time": "09:00", "end_time": "11:00" }
                ],
                "tips": [
                    "Focus on one task at a time",
                    "Maintain a steady and balanced workflow"
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_generate_plan_falls_back_when_model_fails() {
        let resp = post_plan(
            with_generator(FailingGenerator),
            &request_json(&["A", "B"], 3, "08:00", "low"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["schedule"][0]["end_time"], "09:00");
        assert_eq!(json["schedule"][1]["start_time"], "09:00");
        assert_eq!(json["schedule"][1]["end_time"], "10:00");
        assert_eq!(json["tips"][1], "Keep tasks light and avoid burnout");
    }

    #[tokio::test]
    async fn test_generate_plan_uses_model_output() {
        let resp = post_plan(
            with_generator(EvenSplitGenerator),
            &request_json(&["A", "B"], 4, "08:00", "high"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["priority_order"], serde_json::json!(["B", "A"]));
        assert_eq!(
            json["tips"],
            serde_json::json!(["Drink water", "Use your high energy for deep, focused work"])
        );
    }

    #[tokio::test]
    async fn test_generate_plan_accepts_unpadded_start_time() {
        let resp = post_plan(offline(), &request_json(&["A"], 1, "9:00", "high")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["schedule"][0]["start_time"], "09:00");
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_bad_start_time() {
        let resp = post_plan(offline(), &request_json(&["A"], 1, "25:00", "high")).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        let msg = json["error"].as_str().expect("error message");
        assert!(msg.contains("start_time"), "unexpected error: {msg}");
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_empty_goal() {
        let resp = post_plan(offline(), &request_json(&["A", ""], 1, "09:00", "high")).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "goal at index 1 is empty");
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_unknown_energy_level() {
        let resp = post_plan(offline(), &request_json(&["A"], 1, "09:00", "sleepy")).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_missing_field() {
        let resp = post_plan(offline(), r#"{"goals":["A"],"start_time":"09:00","energy_level":"low"}"#).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_generate_plan_rejects_malformed_json() {
        let resp = post_plan(offline(), "{not json").await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_generate_plan_empty_goals() {
        let resp = post_plan(offline(), &request_json(&[], 5, "09:00", "medium")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["schedule"], serde_json::json!([]));
        assert_eq!(json["priority_order"], serde_json::json!([]));
        assert!(!json["tips"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = super::build_router(offline());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::ORIGIN, "https://coach.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .expect("should have CORS header"),
            "*"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let resp = get(offline(), "/plans").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
