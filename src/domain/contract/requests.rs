use crate::domain::contract::{require_text, ContractRequest, Flag, Numeric};
use crate::domain::error::GatewayError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Body of `POST /registerRawMaterial` -> `RegisterRawMaterial(supplierID, name, quantity)`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRawMaterialRequest {
    #[serde(rename = "supplierID")]
    pub supplier_id: String,
    pub name: String,
    #[schema(value_type = i64)]
    pub quantity: Numeric,
}

impl ContractRequest for RegisterRawMaterialRequest {
    const EXPECTED: &'static str = "{ supplierID, name, quantity }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        let quantity = self.quantity.integer("quantity")?;
        if quantity <= 0 {
            return Err(GatewayError::invalid("'quantity' must be positive"));
        }
        Ok(vec![
            require_text("supplierID", &self.supplier_id)?,
            require_text("name", &self.name)?,
            quantity.to_string(),
        ])
    }
}

/// One raw material consumed by a new battery.
///
/// Accepts both the contract's field names and the short names the frontend
/// form uses (`type`, `amount`).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaterialEntry {
    #[serde(rename = "materialID")]
    pub material_id: String,
    #[serde(rename = "materialType", alias = "type")]
    pub material_type: String,
    #[serde(alias = "amount")]
    #[schema(value_type = i64)]
    pub quantity: Numeric,
}

/// Wire form of a material entry; field order is part of the encoding.
#[derive(Debug, Serialize)]
struct EncodedMaterial {
    #[serde(rename = "materialID")]
    material_id: String,
    #[serde(rename = "materialType")]
    material_type: String,
    quantity: i64,
}

/// Encodes a material list as `{"material1": {...}, "material2": {...}}`,
/// keeping the list order.
struct MaterialManifest<'a>(&'a [EncodedMaterial]);

impl Serialize for MaterialManifest<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (idx, material) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("material{}", idx + 1), material)?;
        }
        map.end()
    }
}

/// Body of `POST /createBattery` -> `CreateBattery(rawMaterialsJSON, weight,
/// capacity, voltage, category, totalLifeCycle)`.
///
/// `materialList` is preferred; a pre-encoded `rawMaterialsJSON` string is still
/// accepted from older clients.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBatteryRequest {
    #[serde(rename = "materialList", default)]
    pub material_list: Option<Vec<MaterialEntry>>,
    #[serde(rename = "rawMaterialsJSON", default)]
    pub raw_materials_json: Option<String>,
    #[schema(value_type = f64)]
    pub weight: Numeric,
    #[schema(value_type = f64)]
    pub capacity: Numeric,
    #[schema(value_type = f64)]
    pub voltage: Numeric,
    pub category: String,
    #[serde(rename = "totalLifeCycle", alias = "lifecycle")]
    #[schema(value_type = i64)]
    pub total_life_cycle: Numeric,
}

impl CreateBatteryRequest {
    fn encode_materials(&self) -> Result<String, GatewayError> {
        if let Some(list) = &self.material_list {
            if list.is_empty() {
                return Err(GatewayError::invalid("'materialList' must not be empty"));
            }
            let encoded = list
                .iter()
                .enumerate()
                .map(|(idx, entry)| {
                    let quantity = entry.quantity.integer(&format!("materialList[{}].quantity", idx))?;
                    if quantity <= 0 {
                        return Err(GatewayError::invalid(format!(
                            "'materialList[{}].quantity' must be positive",
                            idx
                        )));
                    }
                    Ok(EncodedMaterial {
                        material_id: require_text("materialID", &entry.material_id)?,
                        material_type: require_text("materialType", &entry.material_type)?,
                        quantity,
                    })
                })
                .collect::<Result<Vec<_>, GatewayError>>()?;
            return serde_json::to_string(&MaterialManifest(&encoded))
                .map_err(|e| GatewayError::invalid(format!("failed to encode materialList: {}", e)));
        }

        match &self.raw_materials_json {
            Some(raw) => {
                let parsed: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
                    GatewayError::invalid(format!("'rawMaterialsJSON' is not valid JSON: {}", e))
                })?;
                if !parsed.is_object() {
                    return Err(GatewayError::invalid("'rawMaterialsJSON' must encode an object"));
                }
                Ok(raw.clone())
            }
            None => Err(GatewayError::invalid(
                "either 'materialList' or 'rawMaterialsJSON' is required",
            )),
        }
    }
}

impl ContractRequest for CreateBatteryRequest {
    const EXPECTED: &'static str =
        "{ materialList: [{ materialID, materialType, quantity }], weight, capacity, voltage, category, totalLifeCycle }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        let materials = self.encode_materials()?;
        let total_life_cycle = self.total_life_cycle.integer("totalLifeCycle")?;
        Ok(vec![
            materials,
            self.weight.to_arg(),
            self.capacity.to_arg(),
            self.voltage.to_arg(),
            require_text("category", &self.category)?,
            total_life_cycle.to_string(),
        ])
    }
}

/// Body of `POST /addMaintenanceLog`; the whole log is passed as one JSON argument.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMaintenanceLogRequest {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    #[serde(default)]
    pub info: String,
    #[serde(rename = "maintenanceDate", default)]
    pub maintenance_date: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "SOC", alias = "soc", default)]
    #[schema(value_type = Option<f64>)]
    pub soc: Option<Numeric>,
    #[serde(rename = "SOH", alias = "soh", default)]
    #[schema(value_type = Option<f64>)]
    pub soh: Option<Numeric>,
    #[serde(rename = "remainingLifeCycle", default)]
    #[schema(value_type = Option<i64>)]
    pub remaining_life_cycle: Option<Numeric>,
}

#[derive(Debug, Serialize)]
struct MaintenanceLogPayload {
    #[serde(rename = "batteryID")]
    battery_id: String,
    info: String,
    #[serde(rename = "maintenanceDate")]
    maintenance_date: String,
    company: String,
    #[serde(rename = "SOC", skip_serializing_if = "Option::is_none")]
    soc: Option<f64>,
    #[serde(rename = "SOH", skip_serializing_if = "Option::is_none")]
    soh: Option<f64>,
    #[serde(rename = "remainingLifeCycle", skip_serializing_if = "Option::is_none")]
    remaining_life_cycle: Option<i64>,
}

impl ContractRequest for AddMaintenanceLogRequest {
    const EXPECTED: &'static str =
        "{ batteryID, info, maintenanceDate, company, SOC, SOH, remainingLifeCycle }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        let payload = MaintenanceLogPayload {
            battery_id: require_text("batteryID", &self.battery_id)?,
            info: self.info,
            maintenance_date: self.maintenance_date,
            company: self.company,
            soc: self.soc.as_ref().and_then(Numeric::as_f64),
            soh: self.soh.as_ref().and_then(Numeric::as_f64),
            remaining_life_cycle: self
                .remaining_life_cycle
                .as_ref()
                .map(|n| n.integer("remainingLifeCycle"))
                .transpose()?,
        };
        let encoded = serde_json::to_string(&payload)
            .map_err(|e| GatewayError::invalid(format!("failed to encode maintenance log: {}", e)))?;
        Ok(vec![encoded])
    }
}

/// Body carrying only a battery id (maintenance/analysis requests, verification).
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatteryIdRequest {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
}

impl ContractRequest for BatteryIdRequest {
    const EXPECTED: &'static str = "{ batteryID }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        Ok(vec![require_text("batteryID", &self.battery_id)?])
    }
}

/// Body of `POST /verifyMaterial`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MaterialIdRequest {
    #[serde(rename = "materialID")]
    pub material_id: String,
}

impl ContractRequest for MaterialIdRequest {
    const EXPECTED: &'static str = "{ materialID }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        Ok(vec![require_text("materialID", &self.material_id)?])
    }
}

/// Body of `POST /setRecycleAvailability`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRecycleAvailabilityRequest {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    #[serde(rename = "recycleAvailability")]
    #[schema(value_type = bool)]
    pub recycle_availability: Flag,
}

impl ContractRequest for SetRecycleAvailabilityRequest {
    const EXPECTED: &'static str = "{ batteryID, recycleAvailability }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        Ok(vec![
            require_text("batteryID", &self.battery_id)?,
            self.recycle_availability.0.to_string(),
        ])
    }
}

/// Body of `POST /extractMaterials`: quantities keyed by material type.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtractMaterialsRequest {
    #[serde(rename = "batteryID")]
    pub battery_id: String,
    #[serde(rename = "extractedQuantities")]
    #[schema(value_type = Object)]
    pub extracted_quantities: BTreeMap<String, Numeric>,
}

impl ContractRequest for ExtractMaterialsRequest {
    const EXPECTED: &'static str = "{ batteryID, extractedQuantities: { <materialType>: quantity } }";

    fn into_args(self) -> Result<Vec<String>, GatewayError> {
        if self.extracted_quantities.is_empty() {
            return Err(GatewayError::invalid("'extractedQuantities' must not be empty"));
        }
        let mut quantities = BTreeMap::new();
        for (material, quantity) in &self.extracted_quantities {
            let value = quantity.integer(&format!("extractedQuantities.{}", material))?;
            if value < 0 {
                return Err(GatewayError::invalid(format!(
                    "'extractedQuantities.{}' must not be negative",
                    material
                )));
            }
            quantities.insert(material.clone(), value);
        }
        let encoded = serde_json::to_string(&quantities).map_err(|e| {
            GatewayError::invalid(format!("failed to encode extractedQuantities: {}", e))
        })?;
        Ok(vec![require_text("batteryID", &self.battery_id)?, encoded])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<T: ContractRequest>(value: serde_json::Value) -> Result<Vec<String>, GatewayError> {
        serde_json::from_value::<T>(value).unwrap().into_args()
    }

    #[test]
    fn register_raw_material_stringifies_quantity() {
        let args = parse::<RegisterRawMaterialRequest>(
            json!({"supplierID": "S1", "name": "Lithium", "quantity": 10}),
        )
        .unwrap();
        assert_eq!(args, vec!["S1", "Lithium", "10"]);
    }

    #[test]
    fn register_raw_material_rejects_fractional_quantity() {
        let err = parse::<RegisterRawMaterialRequest>(
            json!({"supplierID": "S1", "name": "Lithium", "quantity": 2.5}),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
    }

    #[test]
    fn create_battery_encodes_materials_in_list_order() {
        let body = json!({
            "materialList": [
                {"materialID": "MATERIAL-b", "type": "Nickel", "amount": "7"},
                {"materialID": "MATERIAL-a", "materialType": "Lithium", "quantity": 3}
            ],
            "weight": 450.5,
            "capacity": "4000",
            "voltage": 3.7,
            "category": "EV",
            "lifecycle": 1000
        });
        let args = parse::<CreateBatteryRequest>(body).unwrap();
        assert_eq!(
            args[0],
            r#"{"material1":{"materialID":"MATERIAL-b","materialType":"Nickel","quantity":7},"material2":{"materialID":"MATERIAL-a","materialType":"Lithium","quantity":3}}"#
        );
        assert_eq!(&args[1..], &["450.5", "4000", "3.7", "EV", "1000"]);
    }

    #[test]
    fn create_battery_orders_ten_or_more_materials_numerically() {
        let list: Vec<_> = (1..=11)
            .map(|i| json!({"materialID": format!("M{i}"), "materialType": "Cobalt", "quantity": i}))
            .collect();
        let args = parse::<CreateBatteryRequest>(json!({
            "materialList": list, "weight": 1, "capacity": 1, "voltage": 1,
            "category": "ESS", "totalLifeCycle": 10
        }))
        .unwrap();
        let pos = |key: &str| args[0].find(key).unwrap();
        assert!(pos("\"material2\"") < pos("\"material10\""));
        assert!(pos("\"material10\"") < pos("\"material11\""));
    }

    #[test]
    fn create_battery_passes_legacy_json_through() {
        let raw = r#"{"material1":{"materialID":"M1","materialType":"Lithium","quantity":1}}"#;
        let args = parse::<CreateBatteryRequest>(json!({
            "rawMaterialsJSON": raw, "weight": 1, "capacity": 2, "voltage": 3,
            "category": "EV", "totalLifeCycle": 4
        }))
        .unwrap();
        assert_eq!(args[0], raw);
    }

    #[test]
    fn create_battery_requires_materials() {
        let err = parse::<CreateBatteryRequest>(json!({
            "weight": 1, "capacity": 2, "voltage": 3, "category": "EV", "totalLifeCycle": 4
        }))
        .unwrap_err();
        assert!(err.to_string().contains("materialList"));
    }

    #[test]
    fn maintenance_log_accepts_lowercase_soc_fields() {
        let args = parse::<AddMaintenanceLogRequest>(json!({
            "batteryID": "BATTERY-1", "company": "Fixit", "info": "cell swap",
            "maintenanceDate": "2024-09-30", "soc": 80, "soh": "95"
        }))
        .unwrap();
        assert_eq!(args.len(), 1);
        let log: serde_json::Value = serde_json::from_str(&args[0]).unwrap();
        assert_eq!(log["batteryID"], "BATTERY-1");
        assert_eq!(log["SOC"], 80.0);
        assert_eq!(log["SOH"], 95.0);
        assert!(log.get("remainingLifeCycle").is_none());
    }

    #[test]
    fn extract_materials_encodes_quantities_as_json_object() {
        let args = parse::<ExtractMaterialsRequest>(json!({
            "batteryID": "BATTERY-9",
            "extractedQuantities": {"Nickel": 4, "Cobalt": "2"}
        }))
        .unwrap();
        assert_eq!(args, vec!["BATTERY-9", r#"{"Cobalt":2,"Nickel":4}"#]);
    }

    #[test]
    fn recycle_availability_renders_boolean_argument() {
        let args = parse::<SetRecycleAvailabilityRequest>(
            json!({"batteryID": "BATTERY-2", "recycleAvailability": "true"}),
        )
        .unwrap();
        assert_eq!(args, vec!["BATTERY-2", "true"]);
    }

    #[test]
    fn id_requests_reject_blank_ids() {
        assert!(parse::<BatteryIdRequest>(json!({"batteryID": "  "})).is_err());
        assert_eq!(
            parse::<MaterialIdRequest>(json!({"materialID": "MATERIAL-1"})).unwrap(),
            vec!["MATERIAL-1"]
        );
    }
}
