//! Typed request schemas for the battery-passport contract.
//!
//! The chaincode takes every argument as a string: numbers are passed in their
//! decimal form and nested objects as a single JSON-encoded string. Each request
//! type validates its payload and renders the exact argument list.

use crate::domain::error::GatewayError;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Number, Value as JsonValue};

pub mod requests;

pub use requests::{
    AddMaintenanceLogRequest, BatteryIdRequest, CreateBatteryRequest, ExtractMaterialsRequest,
    MaterialEntry, MaterialIdRequest, RegisterRawMaterialRequest, SetRecycleAvailabilityRequest,
};

/// How a contract function is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// Endorsed, ordered and committed; may change ledger state.
    Submit,
    /// Evaluated on a single peer; no ordering guarantee.
    Evaluate,
}

/// A request body that maps onto one contract function's argument list.
pub trait ContractRequest: DeserializeOwned + Send {
    /// Short description of the expected body, used in rejection messages.
    const EXPECTED: &'static str;

    fn into_args(self) -> Result<Vec<String>, GatewayError>;
}

/// A JSON number that may also arrive as a numeric string (`10` or `"10"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric(Number);

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// The value as an integer; `10.0` is accepted, `10.5` is not.
    pub fn integer(&self, field: &str) -> Result<i64, GatewayError> {
        if let Some(i) = self.0.as_i64() {
            return Ok(i);
        }
        match self.0.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
            _ => Err(GatewayError::invalid(format!(
                "'{}' must be an integer, got {}",
                field, self.0
            ))),
        }
    }

    /// Decimal string form passed to the chaincode.
    pub fn to_arg(&self) -> String {
        if let Some(i) = self.0.as_i64() {
            return i.to_string();
        }
        match self.0.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
            _ => self.0.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Number(n) => Ok(Self(n)),
            JsonValue::String(s) => parse_number(s.trim())
                .map(Self)
                .ok_or_else(|| de::Error::custom(format!("'{}' is not a number", s))),
            other => Err(de::Error::custom(format!("expected a number, got {}", other))),
        }
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// A boolean that may also arrive as `"true"` / `"false"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Bool(b) => Ok(Self(b)),
            JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Self(true)),
                "false" => Ok(Self(false)),
                _ => Err(de::Error::custom(format!("'{}' is not a boolean", s))),
            },
            other => Err(de::Error::custom(format!("expected a boolean, got {}", other))),
        }
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<String, GatewayError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::invalid(format!("'{}' must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_numbers_and_numeric_strings() {
        let n: Numeric = serde_json::from_str("10").unwrap();
        assert_eq!(n.to_arg(), "10");
        let n: Numeric = serde_json::from_str("\" 42 \"").unwrap();
        assert_eq!(n.to_arg(), "42");
        let n: Numeric = serde_json::from_str("3.5").unwrap();
        assert_eq!(n.to_arg(), "3.5");
        assert!(serde_json::from_str::<Numeric>("\"ten\"").is_err());
        assert!(serde_json::from_str::<Numeric>("true").is_err());
    }

    #[test]
    fn whole_floats_render_as_integers() {
        let n: Numeric = serde_json::from_str("12.0").unwrap();
        assert_eq!(n.to_arg(), "12");
        assert_eq!(n.integer("quantity").unwrap(), 12);

        let n: Numeric = serde_json::from_str("12.5").unwrap();
        assert!(n.integer("quantity").is_err());
    }

    #[test]
    fn flag_accepts_string_booleans() {
        let f: Flag = serde_json::from_str("\"TRUE\"").unwrap();
        assert!(f.0);
        let f: Flag = serde_json::from_str("false").unwrap();
        assert!(!f.0);
        assert!(serde_json::from_str::<Flag>("\"yes\"").is_err());
    }
}
