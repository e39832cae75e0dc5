use crate::domain::contract::{
    AddMaintenanceLogRequest, BatteryIdRequest, CreateBatteryRequest, ExtractMaterialsRequest,
    MaterialEntry, MaterialIdRequest, RegisterRawMaterialRequest, SetRecycleAvailabilityRequest,
};
use crate::transport::http::handlers::{batteries, health, materials};
use crate::transport::http::middleware::org_guard;
use crate::transport::http::routes::{self, RoutePolicy};
use crate::transport::http::types::{AppState, ErrorBody, HealthBody, MessageBody};
use axum::middleware;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        materials::register_raw_material,
        materials::query_material,
        materials::query_new_materials,
        materials::query_all_materials,
        materials::query_recycled_materials,
        materials::query_extracted_material,
        materials::verify_material,
        materials::extract_materials,
        batteries::create_battery,
        batteries::query_battery_details,
        batteries::query_performance,
        batteries::query_all_batteries,
        batteries::add_maintenance_log,
        batteries::request_maintenance,
        batteries::request_analysis,
        batteries::verify_battery,
        batteries::query_battery_soce_and_life_cycle,
        batteries::set_recycle_availability,
        batteries::query_batteries_with_recycle_availability,
        batteries::query_batteries_with_maintenance_request,
        batteries::query_batteries_with_analysis_request
    ),
    components(schemas(
        RegisterRawMaterialRequest,
        MaterialEntry,
        CreateBatteryRequest,
        AddMaintenanceLogRequest,
        BatteryIdRequest,
        MaterialIdRequest,
        SetRecycleAvailabilityRequest,
        ExtractMaterialsRequest,
        MessageBody,
        ErrorBody,
        HealthBody
    ))
)]
pub struct ApiDoc;

/// Wraps `method_router` with the org guard configured by `policy`.
fn guarded(
    state: &AppState,
    policy: &'static RoutePolicy,
    method_router: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    method_router.route_layer(middleware::from_fn_with_state((state.clone(), policy), org_guard))
}

pub fn create_router(app_state: AppState) -> Router {
    let s = &app_state;
    let route = |router: Router<AppState>, policy: &'static RoutePolicy, method_router| {
        router.route(policy.path, guarded(s, policy, method_router))
    };

    let mut router = Router::new().route("/health", get(health::healthcheck_handler));
    router = route(router, &routes::REGISTER_RAW_MATERIAL, post(materials::register_raw_material));
    router = route(router, &routes::QUERY_MATERIAL, get(materials::query_material));
    router = route(router, &routes::QUERY_NEW_MATERIALS, get(materials::query_new_materials));
    router = route(router, &routes::QUERY_ALL_MATERIALS, get(materials::query_all_materials));
    router = route(router, &routes::QUERY_RECYCLED_MATERIALS, get(materials::query_recycled_materials));
    router = route(router, &routes::QUERY_EXTRACTED_MATERIAL, get(materials::query_extracted_material));
    router = route(router, &routes::VERIFY_MATERIAL, post(materials::verify_material));
    router = route(router, &routes::EXTRACT_MATERIALS, post(materials::extract_materials));
    router = route(router, &routes::CREATE_BATTERY, post(batteries::create_battery));
    router = route(router, &routes::QUERY_BATTERY_DETAILS, get(batteries::query_battery_details));
    router = route(router, &routes::QUERY_PERFORMANCE, get(batteries::query_performance));
    router = route(router, &routes::QUERY_ALL_BATTERIES, get(batteries::query_all_batteries));
    router = route(router, &routes::ADD_MAINTENANCE_LOG, post(batteries::add_maintenance_log));
    router = route(router, &routes::REQUEST_MAINTENANCE, post(batteries::request_maintenance));
    router = route(router, &routes::REQUEST_ANALYSIS, post(batteries::request_analysis));
    router = route(router, &routes::VERIFY_BATTERY, post(batteries::verify_battery));
    router = route(
        router,
        &routes::QUERY_BATTERY_SOCE_AND_LIFE_CYCLE,
        get(batteries::query_battery_soce_and_life_cycle),
    );
    router = route(router, &routes::SET_RECYCLE_AVAILABILITY, post(batteries::set_recycle_availability));
    router = route(
        router,
        &routes::QUERY_BATTERIES_WITH_RECYCLE_AVAILABILITY,
        get(batteries::query_batteries_with_recycle_availability),
    );
    router = route(
        router,
        &routes::QUERY_BATTERIES_WITH_MAINTENANCE_REQUEST,
        get(batteries::query_batteries_with_maintenance_request),
    );
    router = route(
        router,
        &routes::QUERY_BATTERIES_WITH_ANALYSIS_REQUEST,
        get(batteries::query_batteries_with_analysis_request),
    );

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
