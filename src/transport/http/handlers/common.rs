use crate::domain::contract::{ContractRequest, InvocationKind};
use crate::domain::error::GatewayError;
use crate::domain::org::OrgId;
use crate::transport::http::routes::RoutePolicy;
use crate::transport::http::types::{json_422, AppState};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as JsonValue;
use tracing::info;

/// Runs `policy.function(args)` in a fresh session for `org` and renders the result.
pub async fn invoke(
    state: &AppState,
    org: &OrgId,
    policy: &'static RoutePolicy,
    args: Vec<String>,
) -> Result<JsonValue, GatewayError> {
    info!(%org, function = policy.function, args = args.len(), "invoking contract");
    let result = state
        .sessions
        .with_contract(org, |contract| async move {
            match policy.kind {
                InvocationKind::Submit => contract.submit_transaction(policy.function, &args).await,
                InvocationKind::Evaluate => contract.evaluate_transaction(policy.function, &args).await,
            }
        })
        .await?;
    policy.render(&result)
}

pub fn respond(result: Result<JsonValue, GatewayError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Validates a JSON body into contract arguments and invokes the route's function.
pub async fn submit_request<R: ContractRequest>(
    state: &AppState,
    org: &OrgId,
    policy: &'static RoutePolicy,
    body: Result<Json<R>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return json_422(e, R::EXPECTED),
    };
    let args = match request.into_args() {
        Ok(a) => a,
        Err(e) => return e.into_response(),
    };
    respond(invoke(state, org, policy, args).await)
}

/// Invokes the route's function with the given path parameters as arguments.
pub async fn evaluate_request(
    state: &AppState,
    org: &OrgId,
    policy: &'static RoutePolicy,
    args: Vec<String>,
) -> Response {
    respond(invoke(state, org, policy, args).await)
}
