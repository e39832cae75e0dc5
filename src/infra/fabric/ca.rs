// Responsible for all communication with an organization's Fabric CA (REST API v1).

use crate::crypto::{auth_token, generate_enrollment_key, signing_key_from_pem};
use crate::domain::identity::Identity;
use crate::infra::fabric::profile::CertificateAuthorityInfo;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaError {
    #[error("certificate authority unreachable: {0}")]
    Unreachable(String),
    #[error("identity '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("certificate authority rejected the request: {0}")]
    Rejected(String),
    #[error("local key material error: {0}")]
    Key(String),
}

/// Certificate and key issued by an enrollment.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub certificate: String,
    pub private_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    #[serde(rename = "id")]
    pub enrollment_id: String,
    #[serde(rename = "type")]
    pub role: String,
    pub affiliation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Operations the enroller needs from a CA.
#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Exchanges `enrollment_id`/`secret` for a certificate over a fresh key.
    async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, CaError>;

    /// Registers a new identity on behalf of `registrar`; returns its enrollment secret.
    async fn register(
        &self,
        request: &RegistrationRequest,
        registrar: &Identity,
    ) -> Result<String, CaError>;

    async fn revoke(&self, enrollment_id: &str, registrar: &Identity) -> Result<(), CaError>;
}

/// Envelope of every Fabric CA response.
#[derive(Debug, Deserialize)]
struct CaResponse<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
    #[serde(default)]
    errors: Vec<CaMessage>,
}

#[derive(Debug, Deserialize)]
struct CaMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct EnrollResult {
    #[serde(rename = "Cert")]
    cert: String,
}

#[derive(Debug, Deserialize)]
struct RegisterResult {
    secret: String,
}

#[derive(Debug, Serialize)]
struct EnrollBody<'a> {
    certificate_request: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caname: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    #[serde(flatten)]
    request: &'a RegistrationRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    caname: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RevokeBody<'a> {
    id: &'a str,
    reason: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caname: Option<&'a str>,
}

/// HTTP client for one CA endpoint.
pub struct FabricCaClient {
    http: reqwest::Client,
    base_url: String,
    ca_name: Option<String>,
}

impl FabricCaClient {
    /// Builds a client from the profile's CA entry.
    ///
    /// `ca_name` overrides the profile's `caName`. With `verify_tls` off the
    /// server certificate is not checked, matching the test-network setup.
    pub fn new(
        info: &CertificateAuthorityInfo,
        ca_name: Option<String>,
        verify_tls: bool,
        timeout: Duration,
    ) -> Result<Self, CaError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(certs) = &info.tls_ca_certs {
            for pem in certs.pem.certificates() {
                let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                    .map_err(|e| CaError::Key(format!("invalid CA TLS root: {}", e)))?;
                builder = builder.add_root_certificate(cert);
            }
        }
        if !verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|e| CaError::Unreachable(e.to_string()))?;

        Ok(Self {
            http,
            base_url: info.url.trim_end_matches('/').to_string(),
            ca_name: ca_name.or_else(|| info.ca_name.clone()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Vec<u8>,
        registrar: &Identity,
    ) -> Result<Option<T>, CaError> {
        let key = signing_key_from_pem(&registrar.private_key).map_err(|e| CaError::Key(e.to_string()))?;
        let token = auth_token(&key, &registrar.certificate, "POST", path, &body);

        let response = self
            .http
            .post(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, token)
            .body(body)
            .send()
            .await
            .map_err(|e| CaError::Unreachable(e.to_string()))?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>, CaError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| CaError::Unreachable(e.to_string()))?;

    let envelope: CaResponse<T> = serde_json::from_str(&text).map_err(|_| {
        CaError::Rejected(format!("HTTP {}: {}", status.as_u16(), text.trim()))
    })?;

    if envelope.success && status.is_success() {
        return Ok(envelope.result);
    }

    let message = if envelope.errors.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        envelope
            .errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    };
    Err(CaError::Rejected(message))
}

#[async_trait]
impl CertificateAuthority for FabricCaClient {
    async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, CaError> {
        let key = generate_enrollment_key(enrollment_id).map_err(|e| CaError::Key(e.to_string()))?;
        let body = EnrollBody {
            certificate_request: &key.csr_pem,
            caname: self.ca_name.as_deref(),
        };

        let response = self
            .http
            .post(self.url("/api/v1/enroll"))
            .basic_auth(enrollment_id, Some(secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| CaError::Unreachable(e.to_string()))?;

        let result: EnrollResult = parse_response(response)
            .await?
            .ok_or_else(|| CaError::Rejected("enroll response carried no certificate".into()))?;
        let cert_bytes = STANDARD
            .decode(result.cert.trim())
            .map_err(|e| CaError::Rejected(format!("certificate is not base64: {}", e)))?;
        let certificate = String::from_utf8(cert_bytes)
            .map_err(|e| CaError::Rejected(format!("certificate is not PEM: {}", e)))?;

        Ok(Enrollment {
            certificate,
            private_key: key.private_key_pem,
        })
    }

    async fn register(
        &self,
        request: &RegistrationRequest,
        registrar: &Identity,
    ) -> Result<String, CaError> {
        let body = serde_json::to_vec(&RegisterBody {
            request,
            caname: self.ca_name.as_deref(),
        })
        .map_err(|e| CaError::Key(e.to_string()))?;

        match self.send_signed::<RegisterResult>("/api/v1/register", body, registrar).await {
            Ok(Some(result)) => Ok(result.secret),
            Ok(None) => Err(CaError::Rejected("register response carried no secret".into())),
            Err(CaError::Rejected(message)) if message.contains("already registered") => {
                Err(CaError::AlreadyRegistered(request.enrollment_id.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn revoke(&self, enrollment_id: &str, registrar: &Identity) -> Result<(), CaError> {
        let body = serde_json::to_vec(&RevokeBody {
            id: enrollment_id,
            reason: "",
            caname: self.ca_name.as_deref(),
        })
        .map_err(|e| CaError::Key(e.to_string()))?;

        self.send_signed::<serde_json::Value>("/api/v1/revoke", body, registrar)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_body_flattens_request_fields() {
        let request = RegistrationRequest {
            enrollment_id: "appUser".into(),
            role: "client".into(),
            affiliation: "org1.department1".into(),
            secret: None,
        };
        let body = serde_json::to_value(RegisterBody {
            request: &request,
            caname: Some("ca-org1"),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "id": "appUser", "type": "client",
                "affiliation": "org1.department1", "caname": "ca-org1"
            })
        );
    }

    #[test]
    fn error_envelope_parses_without_result() {
        let raw = r#"{"result":null,"errors":[{"code":74,"message":"Identity 'appUser' is already registered"}],"messages":[],"success":false}"#;
        let envelope: CaResponse<RegisterResult> = serde_json::from_str(raw).unwrap();
        assert!(!envelope.success);
        assert!(envelope.result.is_none());
        assert!(envelope.errors[0].message.contains("already registered"));
    }
}
