use crate::domain::contract::{ExtractMaterialsRequest, MaterialIdRequest, RegisterRawMaterialRequest};
use crate::transport::http::handlers::common::{evaluate_request, submit_request};
use crate::transport::http::routes::{
    EXTRACT_MATERIALS, QUERY_ALL_MATERIALS, QUERY_EXTRACTED_MATERIAL, QUERY_MATERIAL,
    QUERY_NEW_MATERIALS, QUERY_RECYCLED_MATERIALS, REGISTER_RAW_MATERIAL, VERIFY_MATERIAL,
};
use crate::transport::http::types::{AppState, ResolvedOrg};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::{Extension, Json};

#[utoipa::path(
    post,
    path = "/registerRawMaterial",
    request_body = RegisterRawMaterialRequest,
    params(("org" = Option<String>, Header, description = "Calling organization; must be org1 when present")),
    responses(
        (status = 200, description = "Raw material registered", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 422, description = "Malformed body", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn register_raw_material(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<RegisterRawMaterialRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &REGISTER_RAW_MATERIAL, body).await
}

#[utoipa::path(
    get,
    path = "/queryMaterial/{materialID}",
    params(
        ("materialID" = String, Path, description = "Raw material id"),
        ("org" = Option<String>, Header, description = "Calling organization (default org1)")
    ),
    responses(
        (status = 200, description = "`{ rawMaterial: <material> }`"),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_material(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    Path(material_id): Path<String>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_MATERIAL, vec![material_id]).await
}

#[utoipa::path(
    get,
    path = "/queryNewMaterials",
    params(("org" = String, Header, description = "Calling organization")),
    responses(
        (status = 200, description = "Materials with status NEW"),
        (status = 400, description = "Missing or invalid org header", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_new_materials(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_NEW_MATERIALS, Vec::new()).await
}

#[utoipa::path(
    get,
    path = "/queryAllMaterials",
    params(("org" = String, Header, description = "Calling organization")),
    responses(
        (status = 200, description = "All raw materials"),
        (status = 400, description = "Missing or invalid org header", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_all_materials(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_ALL_MATERIALS, Vec::new()).await
}

#[utoipa::path(
    get,
    path = "/queryRecycledMaterials",
    params(("org" = String, Header, description = "Calling organization")),
    responses(
        (status = 200, description = "Materials recovered by recycling"),
        (status = 400, description = "Missing or invalid org header", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_recycled_materials(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_RECYCLED_MATERIALS, Vec::new()).await
}

#[utoipa::path(
    get,
    path = "/queryExtractedMaterial/{materialID}",
    params(
        ("materialID" = String, Path, description = "Extracted material id"),
        ("org" = String, Header, description = "Calling organization")
    ),
    responses(
        (status = 200, description = "The extracted material"),
        (status = 400, description = "Missing or invalid org header", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn query_extracted_material(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    Path(material_id): Path<String>,
) -> Response {
    evaluate_request(&state, &org, &QUERY_EXTRACTED_MATERIAL, vec![material_id]).await
}

#[utoipa::path(
    post,
    path = "/verifyMaterial",
    request_body = MaterialIdRequest,
    params(("org" = String, Header, description = "Calling organization (org7)")),
    responses(
        (status = 200, description = "Material verified", body = crate::transport::http::types::MessageBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn verify_material(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<MaterialIdRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &VERIFY_MATERIAL, body).await
}

#[utoipa::path(
    post,
    path = "/extractMaterials",
    request_body = ExtractMaterialsRequest,
    params(("org" = String, Header, description = "Calling organization (org6)")),
    responses(
        (status = 200, description = "Extraction result as returned by the contract"),
        (status = 400, description = "Invalid quantities", body = crate::transport::http::types::ErrorBody),
        (status = 403, description = "Organization not permitted", body = crate::transport::http::types::ErrorBody),
        (status = 500, description = "Contract or network failure", body = crate::transport::http::types::ErrorBody)
    )
)]
pub async fn extract_materials(
    State(state): State<AppState>,
    Extension(ResolvedOrg(org)): Extension<ResolvedOrg>,
    body: Result<Json<ExtractMaterialsRequest>, JsonRejection>,
) -> Response {
    submit_request(&state, &org, &EXTRACT_MATERIALS, body).await
}
