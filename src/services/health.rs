use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::services::roster::RosterService;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub roster: RosterHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RosterHealth {
    pub status: String,
    pub main_count: Option<usize>,
    pub reserve_count: Option<usize>,
    pub registration_open: Option<bool>,
    pub response_time_ms: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub roster: RosterService,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(roster: RosterService) -> Self {
        let state = AppState {
            roster,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let start = std::time::Instant::now();

    // A readable roster file is the only hard dependency
    let roster = match state.roster.store().load_document().await {
        Ok(document) => {
            let (main, reserve, open) = match document {
                Some(doc) => (doc.main.len(), doc.reserve.len(), doc.registration_open.unwrap_or(true)),
                None => (0, 0, true),
            };
            RosterHealth {
                status: "healthy".to_string(),
                main_count: Some(main),
                reserve_count: Some(reserve),
                registration_open: Some(open),
                response_time_ms: start.elapsed().as_millis() as u64,
            }
        }
        Err(e) => {
            tracing::warn!("Health check could not read roster: {}", e);
            RosterHealth {
                status: "unhealthy".to_string(),
                main_count: None,
                reserve_count: None,
                registration_open: None,
                response_time_ms: start.elapsed().as_millis() as u64,
            }
        }
    };

    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let healthy = roster.status == "healthy";
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        roster,
        uptime_seconds: uptime,
    };

    let code = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(response))
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match state.roster.store().load_document().await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{RosterLimits, SessionDefaults};
    use crate::database::store::RosterStore;
    use crate::services::roster::Caller;
    use axum_test::TestServer;
    use tempfile::TempDir;

    const ADMIN: i64 = 1;

    async fn create_test_health_service() -> (HealthService, RosterService, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = RosterStore::open(temp_dir.path().join("roster.json"), SessionDefaults::default())
            .await
            .expect("Failed to open roster store");
        let roster = RosterService::new(store, RosterLimits::TEST, ADMIN).await;

        (HealthService::new(roster.clone()), roster, temp_dir)
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_counts() {
        let (health_service, roster, _temp_dir) = create_test_health_service().await;
        roster
            .register(Caller::new(10), "Anna", None)
            .await
            .expect("register");
        let server = TestServer::new(health_service.router).expect("Failed to create test server");

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let health_response: HealthResponse = response.json();
        assert_eq!(health_response.status, "healthy");
        assert_eq!(health_response.roster.main_count, Some(1));
        assert_eq!(health_response.roster.reserve_count, Some(0));
        assert_eq!(health_response.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_endpoint_unhealthy_on_corrupt_file() {
        let (health_service, roster, _temp_dir) = create_test_health_service().await;
        tokio::fs::write(roster.store().path(), "{ not json")
            .await
            .expect("write corrupt file");
        let server = TestServer::new(health_service.router).expect("Failed to create test server");

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let health_response: HealthResponse = response.json();
        assert_eq!(health_response.roster.status, "unhealthy");
    }

    #[tokio::test]
    async fn test_readiness_endpoint() {
        let (health_service, _roster, _temp_dir) = create_test_health_service().await;
        let server = TestServer::new(health_service.router).expect("Failed to create test server");

        let response = server.get("/health/ready").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let ready_response: String = response.json();
        assert_eq!(ready_response, "ready");
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let (health_service, _roster, _temp_dir) = create_test_health_service().await;
        let server = TestServer::new(health_service.router).expect("Failed to create test server");

        let response = server.get("/health/live").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let alive_response: String = response.json();
        assert_eq!(alive_response, "alive");
    }
}
