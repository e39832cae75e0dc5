//! Per-endpoint configuration.
//!
//! Every endpoint of the gateway invokes exactly one contract function. What
//! differs between them (function name, submit or evaluate, where the calling
//! organization comes from, who may call it, how the result is wrapped) is
//! captured in a [`RoutePolicy`] so the handlers stay uniform.

use crate::domain::contract::InvocationKind;
use crate::domain::error::GatewayError;
use crate::domain::org::OrgId;
use serde_json::{Map, Value as JsonValue};

/// Where the organization a request acts as comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgSource {
    /// Always this organization. A supplied header is only checked against `allowed`.
    Fixed(&'static str),
    /// The `org` header; `default` applies when it is absent.
    Header { default: Option<&'static str> },
}

/// How a contract result becomes the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"message": ..., <result_key>: "<result text>"}`.
    Message {
        message: &'static str,
        result_key: &'static str,
        /// Leave `result_key` out when the contract returned nothing.
        omit_empty: bool,
    },
    /// `{<key>: <result JSON>}`.
    Wrapped(&'static str),
    /// The result JSON as-is.
    Raw,
}

#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub path: &'static str,
    pub function: &'static str,
    pub kind: InvocationKind,
    pub org: OrgSource,
    /// Organizations permitted to call the route; empty means any.
    pub allowed: &'static [&'static str],
    pub response: ResponseShape,
}

/// The organization a request runs as and the one it claims to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgResolution {
    pub session: OrgId,
    pub caller: OrgId,
}

impl RoutePolicy {
    pub fn resolve_org(&self, header: Option<&str>) -> Result<OrgResolution, GatewayError> {
        let header = header.map(str::trim).filter(|h| !h.is_empty());
        match self.org {
            OrgSource::Fixed(org) => {
                let session: OrgId = org.parse()?;
                let caller = match header {
                    Some(h) => h.parse()?,
                    None => session.clone(),
                };
                Ok(OrgResolution { session, caller })
            }
            OrgSource::Header { default } => {
                let name = header.or(default).ok_or_else(|| {
                    GatewayError::invalid(format!("Organization is not specified ('org' header is required for {})", self.path))
                })?;
                let org: OrgId = name.parse()?;
                Ok(OrgResolution {
                    session: org.clone(),
                    caller: org,
                })
            }
        }
    }

    pub fn permits(&self, org: &OrgId) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|a| *a == org.as_str())
    }

    /// Builds the success body from the raw contract result.
    pub fn render(&self, result: &[u8]) -> Result<JsonValue, GatewayError> {
        let text = String::from_utf8_lossy(result);
        match self.response {
            ResponseShape::Message {
                message,
                result_key,
                omit_empty,
            } => {
                let mut body = Map::new();
                body.insert("message".into(), JsonValue::from(message));
                if !(omit_empty && text.is_empty()) {
                    body.insert(result_key.into(), JsonValue::from(text.into_owned()));
                }
                Ok(JsonValue::Object(body))
            }
            ResponseShape::Wrapped(key) => {
                let mut body = Map::new();
                body.insert(key.into(), self.parse_result(&text)?);
                Ok(JsonValue::Object(body))
            }
            ResponseShape::Raw => self.parse_result(&text),
        }
    }

    fn parse_result(&self, text: &str) -> Result<JsonValue, GatewayError> {
        serde_json::from_str(text).map_err(|e| {
            GatewayError::Transaction(format!("{} returned a result that is not JSON: {}", self.function, e))
        })
    }
}

const fn submit(
    path: &'static str,
    function: &'static str,
    org: OrgSource,
    allowed: &'static [&'static str],
    message: &'static str,
) -> RoutePolicy {
    RoutePolicy {
        path,
        function,
        kind: InvocationKind::Submit,
        org,
        allowed,
        response: ResponseShape::Message {
            message,
            result_key: "result",
            omit_empty: false,
        },
    }
}

const fn evaluate(
    path: &'static str,
    function: &'static str,
    org: OrgSource,
    allowed: &'static [&'static str],
    response: ResponseShape,
) -> RoutePolicy {
    RoutePolicy {
        path,
        function,
        kind: InvocationKind::Evaluate,
        org,
        allowed,
        response,
    }
}

const HEADER: OrgSource = OrgSource::Header { default: None };
const ANY: &[&str] = &[];

pub static REGISTER_RAW_MATERIAL: RoutePolicy = submit(
    "/registerRawMaterial",
    "RegisterRawMaterial",
    OrgSource::Fixed("org1"),
    &["org1"],
    "Raw material registered successfully",
);

pub static QUERY_MATERIAL: RoutePolicy = evaluate(
    "/queryMaterial/:materialID",
    "QueryMaterial",
    OrgSource::Header { default: Some("org1") },
    ANY,
    ResponseShape::Wrapped("rawMaterial"),
);

pub static QUERY_NEW_MATERIALS: RoutePolicy =
    evaluate("/queryNewMaterials", "QueryNewMaterials", HEADER, ANY, ResponseShape::Raw);

pub static QUERY_ALL_MATERIALS: RoutePolicy =
    evaluate("/queryAllMaterials", "QueryAllMaterials", HEADER, ANY, ResponseShape::Raw);

pub static QUERY_RECYCLED_MATERIALS: RoutePolicy = evaluate(
    "/queryRecycledMaterials",
    "QueryRecycledMaterials",
    HEADER,
    ANY,
    ResponseShape::Raw,
);

pub static QUERY_EXTRACTED_MATERIAL: RoutePolicy = evaluate(
    "/queryExtractedMaterial/:materialID",
    "QueryExtractedMaterial",
    HEADER,
    ANY,
    ResponseShape::Raw,
);

pub static CREATE_BATTERY: RoutePolicy = RoutePolicy {
    path: "/createBattery",
    function: "CreateBattery",
    kind: InvocationKind::Submit,
    org: OrgSource::Fixed("org2"),
    allowed: &["org2"],
    response: ResponseShape::Message {
        message: "Battery created successfully",
        result_key: "batteryID",
        omit_empty: false,
    },
};

pub static QUERY_BATTERY_DETAILS: RoutePolicy = evaluate(
    "/queryBatteryDetails/:batteryID",
    "QueryBatteryDetails",
    OrgSource::Header { default: Some("org2") },
    ANY,
    ResponseShape::Wrapped("batteryDetails"),
);

pub static QUERY_PERFORMANCE: RoutePolicy = evaluate(
    "/queryPerformance/:batteryID",
    "QueryPerformance",
    HEADER,
    &["org3", "org4", "org5"],
    ResponseShape::Wrapped("performance"),
);

pub static QUERY_ALL_BATTERIES: RoutePolicy =
    evaluate("/queryAllBatteries", "QueryAllBatteries", HEADER, ANY, ResponseShape::Raw);

pub static ADD_MAINTENANCE_LOG: RoutePolicy = submit(
    "/addMaintenanceLog",
    "AddMaintenanceLog",
    HEADER,
    &["org4"],
    "Maintenance log added successfully",
);

pub static REQUEST_MAINTENANCE: RoutePolicy = RoutePolicy {
    path: "/requestMaintenance",
    function: "RequestMaintenance",
    kind: InvocationKind::Submit,
    org: HEADER,
    allowed: &["org3"],
    response: ResponseShape::Message {
        message: "Maintenance request created successfully.",
        result_key: "result",
        omit_empty: true,
    },
};

pub static REQUEST_ANALYSIS: RoutePolicy = RoutePolicy {
    path: "/requestAnalysis",
    function: "RequestAnalysis",
    kind: InvocationKind::Submit,
    org: HEADER,
    allowed: &["org3"],
    response: ResponseShape::Message {
        message: "Analysis request created successfully.",
        result_key: "result",
        omit_empty: true,
    },
};

pub static VERIFY_MATERIAL: RoutePolicy = submit(
    "/verifyMaterial",
    "VerifyMaterial",
    HEADER,
    &["org7"],
    "Material verified successfully",
);

pub static VERIFY_BATTERY: RoutePolicy = submit(
    "/verifyBattery",
    "VerifyBattery",
    HEADER,
    &["org7"],
    "Battery verified successfully",
);

pub static QUERY_BATTERY_SOCE_AND_LIFE_CYCLE: RoutePolicy = evaluate(
    "/queryBatterySOCEAndLifeCycle/:batteryID",
    "QueryBatterySOCEAndLifeCycle",
    HEADER,
    &["org3", "org5"],
    ResponseShape::Raw,
);

pub static SET_RECYCLE_AVAILABILITY: RoutePolicy = submit(
    "/setRecycleAvailability",
    "SetRecycleAvailability",
    HEADER,
    &["org5"],
    "Recycle availability set successfully",
);

pub static QUERY_BATTERIES_WITH_RECYCLE_AVAILABILITY: RoutePolicy = evaluate(
    "/queryBatteriesWithRecycleAvailability",
    "QueryBatteriesWithRecycleAvailability",
    HEADER,
    &["org3", "org6"],
    ResponseShape::Raw,
);

pub static QUERY_BATTERIES_WITH_MAINTENANCE_REQUEST: RoutePolicy = evaluate(
    "/queryBatteriesWithMaintenanceRequest",
    "QueryBatteriesWithMaintenanceRequest",
    HEADER,
    &["org3", "org4"],
    ResponseShape::Raw,
);

pub static QUERY_BATTERIES_WITH_ANALYSIS_REQUEST: RoutePolicy = evaluate(
    "/queryBatteriesWithAnalysisRequest",
    "QueryBatteriesWithAnalysisRequest",
    HEADER,
    &["org3", "org5"],
    ResponseShape::Raw,
);

pub static EXTRACT_MATERIALS: RoutePolicy = RoutePolicy {
    path: "/extractMaterials",
    function: "ExtractMaterials",
    kind: InvocationKind::Submit,
    org: HEADER,
    allowed: &["org6"],
    response: ResponseShape::Raw,
};

/// Every contract-backed route, in registration order.
pub static ROUTES: &[&RoutePolicy] = &[
    &REGISTER_RAW_MATERIAL,
    &QUERY_MATERIAL,
    &QUERY_NEW_MATERIALS,
    &QUERY_ALL_MATERIALS,
    &QUERY_RECYCLED_MATERIALS,
    &QUERY_EXTRACTED_MATERIAL,
    &CREATE_BATTERY,
    &QUERY_BATTERY_DETAILS,
    &QUERY_PERFORMANCE,
    &QUERY_ALL_BATTERIES,
    &ADD_MAINTENANCE_LOG,
    &REQUEST_MAINTENANCE,
    &REQUEST_ANALYSIS,
    &VERIFY_MATERIAL,
    &VERIFY_BATTERY,
    &QUERY_BATTERY_SOCE_AND_LIFE_CYCLE,
    &SET_RECYCLE_AVAILABILITY,
    &QUERY_BATTERIES_WITH_RECYCLE_AVAILABILITY,
    &QUERY_BATTERIES_WITH_MAINTENANCE_REQUEST,
    &QUERY_BATTERIES_WITH_ANALYSIS_REQUEST,
    &EXTRACT_MATERIALS,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn org(name: &str) -> OrgId {
        name.parse().unwrap()
    }

    #[test]
    fn fixed_routes_run_as_their_org_but_check_the_header() {
        let r = REGISTER_RAW_MATERIAL.resolve_org(Some("org3")).unwrap();
        assert_eq!(r.session, org("org1"));
        assert_eq!(r.caller, org("org3"));
        assert!(!REGISTER_RAW_MATERIAL.permits(&r.caller));

        let r = REGISTER_RAW_MATERIAL.resolve_org(None).unwrap();
        assert_eq!(r.caller, org("org1"));
        assert!(REGISTER_RAW_MATERIAL.permits(&r.caller));
    }

    #[test]
    fn header_routes_use_default_or_require_header() {
        let r = QUERY_MATERIAL.resolve_org(None).unwrap();
        assert_eq!(r.session, org("org1"));
        let r = QUERY_MATERIAL.resolve_org(Some("org4")).unwrap();
        assert_eq!(r.session, org("org4"));

        let err = QUERY_ALL_MATERIALS.resolve_org(None).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
        let err = QUERY_ALL_MATERIALS.resolve_org(Some("peer0")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[test]
    fn allowed_sets_match_contract_gates() {
        assert!(QUERY_PERFORMANCE.permits(&org("org4")));
        assert!(!QUERY_PERFORMANCE.permits(&org("org6")));
        assert!(VERIFY_BATTERY.permits(&org("org7")));
        assert!(!VERIFY_BATTERY.permits(&org("org6")));
        assert!(QUERY_ALL_BATTERIES.permits(&org("org6")));
    }

    #[test]
    fn message_shape_can_omit_empty_results() {
        let body = REQUEST_MAINTENANCE.render(b"").unwrap();
        assert_eq!(body, serde_json::json!({"message": "Maintenance request created successfully."}));

        let body = CREATE_BATTERY.render(b"BATTERY-1").unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "Battery created successfully", "batteryID": "BATTERY-1"})
        );

        let body = VERIFY_MATERIAL.render(b"").unwrap();
        assert_eq!(body["result"], "");
    }

    #[test]
    fn json_shapes_parse_the_contract_result() {
        let body = QUERY_MATERIAL.render(br#"{"materialID":"M1"}"#).unwrap();
        assert_eq!(body, serde_json::json!({"rawMaterial": {"materialID": "M1"}}));

        let body = QUERY_ALL_BATTERIES.render(b"[]").unwrap();
        assert_eq!(body, serde_json::json!([]));

        assert!(matches!(
            QUERY_ALL_BATTERIES.render(b"not json"),
            Err(GatewayError::Transaction(_))
        ));
    }

    #[test]
    fn every_route_path_is_unique() {
        let mut paths: Vec<_> = ROUTES.iter().map(|r| r.path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), ROUTES.len());
    }
}
