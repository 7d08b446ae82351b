use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use pulse_core::{Category, Overview, SessionRecord, SiteStat, WeeklyTrend};
use pulse_store::{SaveScheduler, TrackingStore};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Serialize)]
struct ApiError {
    error: String,
}

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<TrackingStore>>,
    saver: Arc<SaveScheduler>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackPayload {
    domain: Option<String>,
    time_spent: Option<u64>,
    category: Option<String>,
    timestamp: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct TrackResponse {
    success: bool,
    total: u64,
}

#[derive(Serialize, Deserialize)]
struct SummaryResponse {
    overview: Overview,
    websites: Vec<SiteStat>,
    weekly: WeeklyTrend,
}

#[derive(Serialize, Deserialize)]
struct ResetResponse {
    success: bool,
    message: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app_dir = resolve_app_dir().or_else(|| std::env::current_dir().ok());
    let data_path = resolve_data_path_with(
        std::env::var_os("FOCUSPULSE_DATA").map(PathBuf::from),
        app_dir,
    );
    let state = build_state(data_path.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(BIND_ADDR)
        .await
        .expect("bind server");
    info!("focuspulse backend listening on http://{BIND_ADDR}");
    info!("data file: {}", data_path.display());
    axum::serve(listener, app).await.expect("serve");
}

fn build_state(data_path: PathBuf) -> AppState {
    let store = Arc::new(Mutex::new(TrackingStore::load(&data_path)));
    let saver = Arc::new(SaveScheduler::new(
        Arc::clone(&store),
        data_path,
        SaveScheduler::DEFAULT_QUIET_PERIOD,
    ));
    AppState { store, saver }
}

fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/track", post(track))
        .route("/summary", get(summary))
        .route("/reset", delete(reset))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let dist_dir = resolve_dist_dir();
    let static_service =
        ServeDir::new(&dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")));

    api.fallback_service(static_service)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn track(
    State(state): State<AppState>,
    Json(payload): Json<TrackPayload>,
) -> Result<Json<TrackResponse>, (StatusCode, Json<ApiError>)> {
    let (Some(domain), Some(time_spent), Some(category)) =
        (payload.domain, payload.time_spent, payload.category)
    else {
        return Err(to_bad_request("missing domain, timeSpent, or category"));
    };
    if domain.is_empty() || category.is_empty() {
        return Err(to_bad_request("missing domain, timeSpent, or category"));
    }

    let record = SessionRecord {
        domain,
        time_spent,
        category: Category::from_label(&category),
        timestamp: payload
            .timestamp
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    };
    let total = lock_store(&state)?.ingest(record);
    state.saver.schedule();
    Ok(Json(TrackResponse {
        success: true,
        total,
    }))
}

async fn summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<ApiError>)> {
    let today = Utc::now().date_naive();
    let store = lock_store(&state)?;
    Ok(Json(SummaryResponse {
        overview: store.overview(),
        websites: store.leaderboard(),
        weekly: store.weekly_trend(today),
    }))
}

async fn reset(
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, (StatusCode, Json<ApiError>)> {
    lock_store(&state)?.reset();
    state.saver.schedule();
    Ok(Json(ResetResponse {
        success: true,
        message: "All tracking data cleared".to_string(),
    }))
}

fn lock_store(
    state: &AppState,
) -> Result<MutexGuard<'_, TrackingStore>, (StatusCode, Json<ApiError>)> {
    state
        .store
        .lock()
        .map_err(|_| to_api_error("tracking store lock poisoned"))
}

fn to_api_error(err: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}

fn to_bad_request(err: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: err.to_string(),
        }),
    )
}

fn resolve_app_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(PathBuf::from))
}

fn resolve_data_path_with(env_override: Option<PathBuf>, app_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = env_override {
        return path;
    }
    let base = app_dir.unwrap_or_else(|| PathBuf::from("."));
    base.join("tracking-data.json")
}

fn resolve_dist_dir() -> PathBuf {
    let env_override = std::env::var_os("FOCUSPULSE_DIST").map(PathBuf::from);
    let exe_dir = resolve_app_dir();
    resolve_dist_dir_with(env_override, exe_dir)
}

fn resolve_dist_dir_with(env_override: Option<PathBuf>, exe_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    if let Some(dir) = exe_dir {
        let candidate = dir.join("dashboard");
        if candidate.is_dir() {
            return candidate;
        }
    }
    PathBuf::from("dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request, StatusCode as HttpStatus};
    use http_body_util::BodyExt;
    use std::fs;
    use tower::util::ServiceExt;

    struct TestState {
        state: AppState,
        _dir: tempfile::TempDir,
    }

    fn setup_state() -> TestState {
        let dir = tempfile::tempdir().expect("temp dir");
        let state = build_state(dir.path().join("tracking-data.json"));
        TestState { state, _dir: dir }
    }

    fn track_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/track")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&body).expect("parse body")
    }

    #[test]
    fn resolve_data_path_prefers_env_override() {
        let dir = tempfile::tempdir().expect("temp dir");
        let override_path = dir.path().join("elsewhere.json");
        let resolved = resolve_data_path_with(Some(override_path.clone()), None);
        assert_eq!(resolved, override_path);
    }

    #[test]
    fn resolve_data_path_falls_back_to_app_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let resolved = resolve_data_path_with(None, Some(dir.path().to_path_buf()));
        assert_eq!(resolved, dir.path().join("tracking-data.json"));
    }

    #[test]
    fn resolve_dist_dir_uses_exe_dashboard_when_present() {
        let dir = tempfile::tempdir().expect("temp dir");
        let dashboard = dir.path().join("dashboard");
        fs::create_dir_all(&dashboard).expect("create dashboard dir");
        let resolved = resolve_dist_dir_with(None, Some(dir.path().to_path_buf()));
        assert_eq!(resolved, dashboard);
    }

    #[test]
    fn resolve_dist_dir_falls_back_to_relative_dashboard() {
        let dir = tempfile::tempdir().expect("temp dir");
        let resolved = resolve_dist_dir_with(None, Some(dir.path().to_path_buf()));
        assert_eq!(resolved, PathBuf::from("dashboard"));
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let test_state = setup_state();
        let app = build_app(test_state.state);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
    }

    #[tokio::test]
    async fn track_rejects_missing_fields() {
        let test_state = setup_state();
        let app = build_app(test_state.state);

        let response = app
            .clone()
            .oneshot(track_request(r#"{"domain":"a.com","timeSpent":10}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), HttpStatus::BAD_REQUEST);
        let error: serde_json::Value = read_json(response).await;
        assert_eq!(
            error["error"],
            "missing domain, timeSpent, or category"
        );

        let response = app
            .oneshot(track_request(r#"{"domain":"","timeSpent":10,"category":"productive"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), HttpStatus::BAD_REQUEST);
    }

    #[tokio::test]
    async fn track_returns_the_running_total() {
        let test_state = setup_state();
        let app = build_app(test_state.state);

        let response = app
            .clone()
            .oneshot(track_request(
                r#"{"domain":"github.com","timeSpent":60,"category":"productive"}"#,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
        let body: TrackResponse = read_json(response).await;
        assert!(body.success);
        assert_eq!(body.total, 60);

        let response = app
            .oneshot(track_request(
                r#"{"domain":"github.com","timeSpent":60,"category":"productive"}"#,
            ))
            .await
            .expect("response");
        let body: TrackResponse = read_json(response).await;
        assert_eq!(body.total, 120);
    }

    #[tokio::test]
    async fn unknown_category_lands_in_the_unknown_bucket() {
        let test_state = setup_state();
        let app = build_app(test_state.state.clone());

        app.clone()
            .oneshot(track_request(
                r#"{"domain":"a.com","timeSpent":10,"category":"weird"}"#,
            ))
            .await
            .expect("response");
        app.oneshot(track_request(
            r#"{"domain":"a.com","timeSpent":5,"category":"productive"}"#,
        ))
        .await
        .expect("response");

        let store = test_state.state.store.lock().expect("lock");
        let summary = &store.summary["a.com"];
        assert_eq!(summary.unknown, 10);
        assert_eq!(summary.productive, 5);
        assert_eq!(summary.total, 15);
    }

    #[tokio::test]
    async fn summary_reports_overview_sites_and_weekly() {
        let test_state = setup_state();
        let app = build_app(test_state.state);

        app.clone()
            .oneshot(track_request(
                r#"{"domain":"github.com","timeSpent":120,"category":"productive"}"#,
            ))
            .await
            .expect("response");
        app.clone()
            .oneshot(track_request(
                r#"{"domain":"netflix.com","timeSpent":60,"category":"unproductive"}"#,
            ))
            .await
            .expect("response");

        let request = Request::builder()
            .uri("/summary")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
        let body: SummaryResponse = read_json(response).await;

        assert_eq!(body.overview.productive, 120);
        assert_eq!(body.overview.unproductive, 60);
        assert_eq!(body.overview.total, 180);
        assert_eq!(body.overview.productivity_score, 67);

        assert_eq!(body.websites.len(), 2);
        assert_eq!(body.websites[0].domain, "github.com");
        assert_eq!(body.websites[0].time, 120);

        // Timestamps defaulted to now, so everything lands in today's bucket.
        assert_eq!(body.weekly.days.len(), 7);
        let today = body.weekly.days.last().expect("today");
        assert_eq!(today.productive, 120);
        assert_eq!(today.unproductive, 60);
    }

    #[tokio::test]
    async fn reset_clears_all_state() {
        let test_state = setup_state();
        let app = build_app(test_state.state);

        app.clone()
            .oneshot(track_request(
                r#"{"domain":"github.com","timeSpent":120,"category":"productive"}"#,
            ))
            .await
            .expect("response");

        let request = Request::builder()
            .method("DELETE")
            .uri("/reset")
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
        let body: ResetResponse = read_json(response).await;
        assert!(body.success);
        assert_eq!(body.message, "All tracking data cleared");

        let request = Request::builder()
            .uri("/summary")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let body: SummaryResponse = read_json(response).await;
        assert_eq!(body.overview, Overview::default());
        assert!(body.websites.is_empty());
        assert_eq!(body.weekly.days.len(), 7);
        assert!(body
            .weekly
            .days
            .iter()
            .all(|day| day.productive == 0 && day.unproductive == 0));
    }

    #[tokio::test]
    async fn corrupt_store_file_recovers_to_empty_state() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data_path = dir.path().join("tracking-data.json");
        fs::write(&data_path, "{definitely not json").expect("write file");

        let app = build_app(build_state(data_path));
        let request = Request::builder()
            .uri("/summary")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), HttpStatus::OK);
        let body: SummaryResponse = read_json(response).await;
        assert_eq!(body.overview, Overview::default());
        assert!(body.websites.is_empty());
    }

    #[tokio::test]
    async fn track_with_explicit_timestamp_keeps_it() {
        let test_state = setup_state();
        let app = build_app(test_state.state.clone());

        app.oneshot(track_request(
            r#"{"domain":"github.com","timeSpent":30,"category":"productive","timestamp":"2025-03-01T10:00:00.000Z"}"#,
        ))
        .await
        .expect("response");

        let store = test_state.state.store.lock().expect("lock");
        assert_eq!(store.sessions[0].timestamp, "2025-03-01T10:00:00.000Z");
    }
}
