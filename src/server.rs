use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::error;
use serde::Serialize;
use serde_json::json;

use crate::db::Interval;
use crate::tracker::{StartOutcome, StopOutcome, Tracker};

#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
}

/// Store and codec failures surface as opaque server-side errors. The single
/// request fails; the process keeps serving.
pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/start", post(start_interval))
        .route("/stop", post(stop_interval))
        .route("/intervals", get(list_intervals))
        .route("/intervals/active", get(active_interval))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn start_interval(State(state): State<AppState>) -> Result<Response, ApiError> {
    let outcome = state.tracker.start_interval().await?;
    let status = match outcome {
        StartOutcome::Created { .. } => StatusCode::CREATED,
        StartOutcome::AlreadyRunning => StatusCode::OK,
    };
    Ok((status, Json(outcome)).into_response())
}

async fn stop_interval(State(state): State<AppState>) -> Result<Json<StopOutcome>, ApiError> {
    Ok(Json(state.tracker.stop_interval().await?))
}

async fn list_intervals(State(state): State<AppState>) -> Result<Json<Vec<Interval>>, ApiError> {
    Ok(Json(state.tracker.list_intervals().await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveIntervalResponse {
    started_at: Option<DateTime<Utc>>,
}

async fn active_interval(
    State(state): State<AppState>,
) -> Result<Json<ActiveIntervalResponse>, ApiError> {
    let active = state.tracker.active_interval().await?;
    Ok(Json(ActiveIntervalResponse {
        started_at: active.map(|active| active.started_at),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::db::Database;

    fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().expect("temp dir");
        let db = Database::new(dir.path().join("stint.sqlite3")).expect("open database");
        let router = app(AppState {
            tracker: Tracker::new(db),
        });
        (dir, router)
    }

    fn request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("build request")
    }

    async fn response_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read response body");
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (_dir, router) = test_app();

        let response = router
            .oneshot(request("GET", "/health"))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);

        let value = response_json(response).await;
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn start_reports_created_then_already_running() {
        let (_dir, router) = test_app();

        let first = router
            .clone()
            .oneshot(request("POST", "/start"))
            .await
            .expect("request");
        assert_eq!(first.status(), StatusCode::CREATED);
        let value = response_json(first).await;
        assert_eq!(value["status"], "created");
        assert!(value["startedAt"].is_string());

        let second = router
            .oneshot(request("POST", "/start"))
            .await
            .expect("request");
        assert_eq!(second.status(), StatusCode::OK);
        let value = response_json(second).await;
        assert_eq!(value["status"], "alreadyRunning");
    }

    #[tokio::test]
    async fn stop_closes_the_active_interval() {
        let (_dir, router) = test_app();

        let start = router
            .clone()
            .oneshot(request("POST", "/start"))
            .await
            .expect("request");
        let started_at = response_json(start).await["startedAt"]
            .as_str()
            .expect("startedAt missing")
            .to_string();

        let stop = router
            .clone()
            .oneshot(request("POST", "/stop"))
            .await
            .expect("request");
        assert_eq!(stop.status(), StatusCode::OK);
        let value = response_json(stop).await;
        assert_eq!(value["status"], "closed");
        assert_eq!(value["interval"]["startedAt"], started_at.as_str());
        assert!(value["interval"]["id"].is_string());
        assert!(value["interval"]["endedAt"].is_string());

        let list = router
            .oneshot(request("GET", "/intervals"))
            .await
            .expect("request");
        assert_eq!(list.status(), StatusCode::OK);
        let intervals = response_json(list).await;
        let intervals = intervals.as_array().expect("listing is not an array");
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0]["startedAt"], started_at.as_str());
    }

    #[tokio::test]
    async fn stop_with_nothing_open_reports_no_active_interval() {
        let (_dir, router) = test_app();

        let response = router
            .oneshot(request("POST", "/stop"))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::OK);

        let value = response_json(response).await;
        assert_eq!(value["status"], "noActiveInterval");
    }

    #[tokio::test]
    async fn active_reports_open_interval_or_null() {
        let (_dir, router) = test_app();

        let idle = router
            .clone()
            .oneshot(request("GET", "/intervals/active"))
            .await
            .expect("request");
        assert_eq!(idle.status(), StatusCode::OK);
        assert!(response_json(idle).await["startedAt"].is_null());

        let start = router
            .clone()
            .oneshot(request("POST", "/start"))
            .await
            .expect("request");
        let started_at = response_json(start).await["startedAt"]
            .as_str()
            .expect("startedAt missing")
            .to_string();

        let running = router
            .oneshot(request("GET", "/intervals/active"))
            .await
            .expect("request");
        let value = response_json(running).await;
        assert_eq!(value["startedAt"], started_at.as_str());
    }
}
