use axum::{http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub checked_at: String,
}

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Liveness only. Backend credentials are read per request, so there is
/// nothing stateful to probe here.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ready",
        service: "nebo-server",
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Json};

    use crate::health::health;

    #[tokio::test]
    async fn health_reports_ready() {
        let (status, Json(payload)) = health().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.service, "nebo-server");
        assert!(!payload.checked_at.is_empty());
    }
}
