//! Gateway connections and contract handles.
//!
//! No native Fabric gateway client exists for Rust, so the connector talks to a
//! REST gateway sitting in front of the organization's peers. Every request is
//! signed with the caller's enrolled key so the gateway can act on its behalf.

use crate::crypto::{auth_token, signing_key_from_pem};
use crate::domain::error::GatewayError;
use crate::domain::identity::Identity;
use crate::domain::org::OrgId;
use crate::infra::fabric::profile::ConnectionProfile;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A deployed chaincode reachable through an open connection.
#[async_trait]
pub trait Contract: Send + Sync {
    /// Endorses, orders and commits `function(args)`; returns the contract result.
    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError>;

    /// Runs `function(args)` on a peer without ordering.
    async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError>;
}

/// An open connection acting as one identity.
#[async_trait]
pub trait GatewayConnection: Send + Sync {
    fn contract(&self, channel: &str, name: &str) -> Arc<dyn Contract>;

    async fn close(&self);
}

/// Opens connections to an organization's network.
#[async_trait]
pub trait GatewayConnector: Send + Sync {
    async fn connect(
        &self,
        org: &OrgId,
        profile: &ConnectionProfile,
        identity: &Identity,
    ) -> Result<Box<dyn GatewayConnection>, GatewayError>;
}

#[derive(Debug, Serialize)]
struct TransactionBody<'a> {
    function: &'a str,
    args: &'a [String],
}

#[derive(Debug, Deserialize)]
struct GatewayFailure {
    #[serde(alias = "message")]
    error: String,
}

/// Connector for REST gateways described by the connection profile.
pub struct RestGatewayConnector {
    timeout: Duration,
    verify_tls: bool,
}

impl RestGatewayConnector {
    pub fn new(timeout: Duration, verify_tls: bool) -> Self {
        Self { timeout, verify_tls }
    }
}

#[async_trait]
impl GatewayConnector for RestGatewayConnector {
    async fn connect(
        &self,
        org: &OrgId,
        profile: &ConnectionProfile,
        identity: &Identity,
    ) -> Result<Box<dyn GatewayConnection>, GatewayError> {
        let endpoint = profile.gateway_endpoint()?;

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        for pem in profile.gateway_tls_roots() {
            let cert = reqwest::Certificate::from_pem(pem.as_bytes())
                .map_err(|e| GatewayError::connection(org, format!("invalid TLS root: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }
        if !self.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::connection(org, e))?;

        // Reject unusable keys at connect time rather than on the first call.
        signing_key_from_pem(&identity.private_key).map_err(|e| GatewayError::connection(org, e))?;

        Ok(Box::new(RestConnection {
            inner: Arc::new(ConnectionInner {
                http,
                endpoint,
                identity: identity.clone(),
            }),
        }))
    }
}

struct ConnectionInner {
    http: reqwest::Client,
    endpoint: String,
    identity: Identity,
}

struct RestConnection {
    inner: Arc<ConnectionInner>,
}

#[async_trait]
impl GatewayConnection for RestConnection {
    fn contract(&self, channel: &str, name: &str) -> Arc<dyn Contract> {
        Arc::new(RestContract {
            connection: self.inner.clone(),
            path: format!("/channels/{}/contracts/{}", channel, name),
        })
    }

    async fn close(&self) {
        tracing::debug!(endpoint = %self.inner.endpoint, "gateway connection closed");
    }
}

struct RestContract {
    connection: Arc<ConnectionInner>,
    path: String,
}

impl RestContract {
    async fn invoke(&self, mode: &str, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        let conn = &self.connection;
        let uri = format!("{}/{}", self.path, mode);
        let body = serde_json::to_vec(&TransactionBody { function, args })
            .map_err(|e| GatewayError::Transaction(e.to_string()))?;

        let key = signing_key_from_pem(&conn.identity.private_key)
            .map_err(|e| GatewayError::Transaction(e.to_string()))?;
        let token = auth_token(&key, &conn.identity.certificate, "POST", &uri, &body);

        let response = conn
            .http
            .post(format!("{}{}", conn.endpoint, uri))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, token)
            .header("x-msp-id", conn.identity.msp_id.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transaction(format!("{} {}: {}", mode, function, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transaction(e.to_string()))?;

        if status.is_success() {
            return Ok(bytes.to_vec());
        }
        let message = serde_json::from_slice::<GatewayFailure>(&bytes)
            .map(|f| f.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
        Err(GatewayError::Transaction(if message.is_empty() {
            format!("{} {} failed with HTTP {}", mode, function, status.as_u16())
        } else {
            message
        }))
    }
}

#[async_trait]
impl Contract for RestContract {
    async fn submit_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        self.invoke("submit", function, args).await
    }

    async fn evaluate_transaction(&self, function: &str, args: &[String]) -> Result<Vec<u8>, GatewayError> {
        self.invoke("evaluate", function, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_body_keeps_argument_order() {
        let args = vec!["S1".to_string(), "Lithium".to_string(), "10".to_string()];
        let body = serde_json::to_value(TransactionBody {
            function: "RegisterRawMaterial",
            args: &args,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"function": "RegisterRawMaterial", "args": ["S1", "Lithium", "10"]})
        );
    }

    #[test]
    fn failure_body_accepts_error_or_message() {
        let a: GatewayFailure = serde_json::from_str(r#"{"error":"no such battery"}"#).unwrap();
        let b: GatewayFailure = serde_json::from_str(r#"{"message":"endorsement failed"}"#).unwrap();
        assert_eq!(a.error, "no such battery");
        assert_eq!(b.error, "endorsement failed");
    }
}
