use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use crate::store::reservations::ReservationStore;
use chrono::{DateTime, Utc};

/// How long a probe waits on the store lock before reporting unhealthy.
const STORE_PROBE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(1);

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub store: StoreHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreHealth {
    pub status: String,
    pub active_reservations: usize,
    pub response_time_ms: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub store: ReservationStore,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(store: ReservationStore) -> Self {
        let state = AppState {
            store,
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

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();

    // Probe the reservation store; a wedged lock means unhealthy
    let (store_status, active_reservations) =
        match tokio::time::timeout(STORE_PROBE_TIMEOUT, state.store.active_count()).await {
            Ok(count) => ("healthy", count),
            Err(_) => ("unhealthy", 0),
        };

    let response_time_ms = start.elapsed().as_millis() as u64;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds() as u64;

    let health_response = HealthResponse {
        status: store_status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: StoreHealth {
            status: store_status.to_string(),
            active_reservations,
            response_time_ms,
        },
        uptime_seconds: uptime,
    };

    if health_response.status == "healthy" {
        Ok(Json(health_response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    // Ready as long as the store answers within the probe window
    match tokio::time::timeout(STORE_PROBE_TIMEOUT, state.store.active_count()).await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    // Simple liveness check - if this endpoint responds, the service is alive
    Json("alive")
}
