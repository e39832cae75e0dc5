use crate::transport::http::types::{AppState, HealthBody};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Every organization has an enrolled identity", body = HealthBody),
        (status = 503, description = "Some organizations are not provisioned", body = HealthBody),
        (status = 500, description = "Wallet unreadable", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut unprovisioned = Vec::new();
    for org in state.settings.org_ids() {
        match state.sessions.has_identity(org).await {
            Ok(true) => {}
            Ok(false) => unprovisioned.push(org.to_string()),
            Err(e) => return e.into_response(),
        }
    }

    if unprovisioned.is_empty() {
        (
            StatusCode::OK,
            Json(HealthBody {
                status: "ok".to_string(),
                unprovisioned,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "unhealthy".to_string(),
                unprovisioned,
            }),
        )
            .into_response()
    }
}
