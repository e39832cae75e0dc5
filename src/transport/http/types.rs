use crate::app::session::SessionFactory;
use crate::domain::error::GatewayError;
use crate::domain::org::OrgId;
use crate::infra::config::Settings;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Request header naming the calling organization.
pub const ORG_HEADER: &str = "org";

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionFactory>,
    pub settings: Arc<Settings>,
}

/// Organization a request acts as, set by the org guard.
#[derive(Debug, Clone)]
pub struct ResolvedOrg(pub OrgId);

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Body returned by state-changing routes.
#[derive(Serialize, Debug, ToSchema)]
pub struct MessageBody {
    pub message: String,
    /// Contract result; the key differs per route (`result`, `batteryID`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct HealthBody {
    pub status: String,
    /// Organizations without any enrolled identity.
    pub unprovisioned: Vec<String>,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Authorization { .. } => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn json_422(err: JsonRejection, expected: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody {
            error: format!("Invalid JSON body: {} (expected: {})", err, expected),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authorization_and_validation_escape_500() {
        let forbidden = GatewayError::Authorization {
            org: "org3".into(),
            route: "/registerRawMaterial".into(),
        };
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(GatewayError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::Transaction("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::UnknownIdentity("org1".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
