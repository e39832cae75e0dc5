use crate::domain::contract::{
    AddMaintenanceLogRequest, BatteryIdRequest, CreateBatteryRequest, SetRecycleAvailabilityRequest,
};
use crate::transport::http::handlers::common::{evaluate_request, submit_request};
use crate::transport::http::routes::{
    ADD_MAINTENANCE_LOG, CREATE_BATTERY, QUERY_ALL_BATTERIES, QUERY_BATTERIES_WITH_ANALYSIS_REQUEST,
    QUERY_BATTERIES_WITH_MAINTENANCE_REQUEST, QUERY_BATTERIES_WITH_RECYCLE_AVAILABILITY,
    QUERY_BATTERY_DETAILS, QUERY_BATTERY_SOCE_AND_LIFE_CYCLE, QUERY_PERFORMANCE, REQUEST_ANALYSIS,
    REQUEST_MAINTENANCE, SET_RECYCLE_AVAILABILITY, VERIFY_BATTERY,
};
use crate::transport::http::types::{AppState, ResolvedOrg};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::{Extension, Json};

#[utoipa::path(
    post,
    path = "/createBattery",
    request_body = CreateBatteryRequest,
    params(("org" = Option<String>, Header, description = "Calling organization; must be org2 when present")),
    responses(
        (status = 200, description = "`{ message, batteryID }`", body = crate::transport::http::types::MessageBody),
        (status = 400, description = "Invalid material list or numbers", body = crate::transport::http::types::ErrorBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn create_battery(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<CreateBatteryRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &CREATE_BATTERY, body).await
}

#[utoipa::path(
    get,
    path = "/queryBatteryDetails/{batteryID}",
    params(
        ("batteryID" = String, Path, description = "Battery id"),
        ("org" = Option<String>, Header, description = "Calling organization (default org2)")
    ),
    responses(
        (status = 200, description = "`{ batteryDetails: <battery> }`"),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_battery_details(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    Path(battery_id): Path<String>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_BATTERY_DETAILS, vec![battery_id]).await
}

#[utoipa::path(
    get,
    path = "/queryPerformance/{batteryID}",
    params(
        ("batteryID" = String, Path, description = "Battery id"),
        ("org" = String, Header, description = "Calling organization (org3, org4 or org5)")
    ),
    responses(
        (status = 200, description = "`{ performance: <performance> }`"),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_performance(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    Path(battery_id): Path<String>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_PERFORMANCE, vec![battery_id]).await
}

#[utoipa::path(
    get,
    path = "/queryAllBatteries",
    params(("org" = String, Header, description = "Calling organization")),
    responses(
        (status = 200, description = "All batteries"),
        (status = 400, description = "Missing or invalid org header", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_all_batteries(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_ALL_BATTERIES, Vec::new()).await
}

#[utoipa::path(
    post,
    path = "/addMaintenanceLog",
    request_body = AddMaintenanceLogRequest,
    params(("org" = String, Header, description = "Calling organization (org4)")),
    responses(
        (status = 200, description = "Maintenance log added", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn add_maintenance_log(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<AddMaintenanceLogRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &ADD_MAINTENANCE_LOG, body).await
}

#[utoipa::path(
    post,
    path = "/requestMaintenance",
    request_body = BatteryIdRequest,
    params(("org" = String, Header, description = "Calling organization (org3)")),
    responses(
        (status = 200, description = "Maintenance requested", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn request_maintenance(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<BatteryIdRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &REQUEST_MAINTENANCE, body).await
}

#[utoipa::path(
    post,
    path = "/requestAnalysis",
    request_body = BatteryIdRequest,
    params(("org" = String, Header, description = "Calling organization (org3)")),
    responses(
        (status = 200, description = "Analysis requested", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn request_analysis(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<BatteryIdRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &REQUEST_ANALYSIS, body).await
}

#[utoipa::path(
    post,
    path = "/verifyBattery",
    request_body = BatteryIdRequest,
    params(("org" = String, Header, description = "Calling organization (org7)")),
    responses(
        (status = 200, description = "Battery verified", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn verify_battery(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<BatteryIdRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &VERIFY_BATTERY, body).await
}

#[utoipa::path(
    get,
    path = "/queryBatterySOCEAndLifeCycle/{batteryID}",
    params(
        ("batteryID" = String, Path, description = "Battery id"),
        ("org" = String, Header, description = "Calling organization (org3 or org5)")
    ),
    responses(
        (status = 200, description = "State of charge/health and life cycle"),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_battery_soce_and_life_cycle(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    Path(battery_id): Path<String>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_BATTERY_SOCE_AND_LIFE_CYCLE, vec![battery_id]).await
}

#[utoipa::path(
    post,
    path = "/setRecycleAvailability",
    request_body = SetRecycleAvailabilityRequest,
    params(("org" = String, Header, description = "Calling organization (org5)")),
    responses(
        (status = 200, description = "Recycle availability set", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn set_recycle_availability(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<SetRecycleAvailabilityRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &SET_RECYCLE_AVAILABILITY, body).await
}

#[utoipa::path(
    get,
    path = "/queryBatteriesWithRecycleAvailability",
    params(("org" = String, Header, description = "Calling organization (org3 or org6)")),
    responses(
        (status = 200, description = "Batteries marked available for recycling"),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_batteries_with_recycle_availability(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_BATTERIES_WITH_RECYCLE_AVAILABILITY, Vec::new()).await
}

#[utoipa::path(
    get,
    path = "/queryBatteriesWithMaintenanceRequest",
    params(("org" = String, Header, description = "Calling organization (org3 or org4)")),
    responses(
        (status = 200, description = "Batteries with an open maintenance request"),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_batteries_with_maintenance_request(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_BATTERIES_WITH_MAINTENANCE_REQUEST, Vec::new()).await
}

#[utoipa::path(
    get,
    path = "/queryBatteriesWithAnalysisRequest",
    params(("org" = String, Header, description = "Calling organization (org3 or org5)")),
    responses(
        (status = 200, description = "Batteries with an open analysis request"),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_batteries_with_analysis_request(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_BATTERIES_WITH_ANALYSIS_REQUEST, Vec::new()).await
}
