use crate::domain::error::GatewayError;
use crate::transport::http::routes::RoutePolicy;
use crate::transport::http::types::{AppState, ResolvedOrg, ORG_HEADER};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

/// Resolves the organization a request acts as and applies the route's
/// allowed-organization check before any session is opened.
///
/// The check is advisory: the chaincode enforces the same gates by MSP id.
pub async fn org_guard(
    State((state, policy)): State<(AppState, &'static RoutePolicy)>,
    mut request: Request,
    next: Next,
) -> Response {
    // A present but unreadable header must not fall back to the route default.
    let header = match request.headers().get(ORG_HEADER).map(|v| v.to_str()) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(_)) => {
            return GatewayError::invalid("'org' header must be visible ASCII").into_response();
        }
    };

    let resolution = match policy.resolve_org(header) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    if state.settings.org_guard && !policy.permits(&resolution.caller) {
        warn!(org = %resolution.caller, route = policy.path, "organization not permitted");
        return GatewayError::Authorization {
            org: resolution.caller.to_string(),
            route: policy.path.to_string(),
        }
        .into_response();
    }

    request.extensions_mut().insert(ResolvedOrg(resolution.session));
    next.run(request).await
}
