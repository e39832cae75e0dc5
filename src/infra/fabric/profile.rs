//! Connection profiles (`connection-orgN.json`) as produced by the Fabric test network.

use crate::domain::error::GatewayError;
use crate::domain::org::OrgId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// PEM material that profiles carry either as one string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PemField {
    One(String),
    Many(Vec<String>),
}

impl PemField {
    pub fn certificates(&self) -> Vec<&str> {
        match self {
            PemField::One(pem) => vec![pem.as_str()],
            PemField::Many(pems) => pems.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsCaCerts {
    pub pem: PemField,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CertificateAuthorityInfo {
    pub url: String,
    #[serde(rename = "caName", default)]
    pub ca_name: Option<String>,
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerInfo {
    pub url: String,
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationInfo {
    #[serde(default)]
    pub mspid: Option<String>,
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(rename = "certificateAuthorities", default)]
    pub certificate_authorities: Vec<String>,
}

/// REST gateway fronting the organization's peers.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayInfo {
    pub url: String,
    #[serde(rename = "tlsCACerts", default)]
    pub tls_ca_certs: Option<TlsCaCerts>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub organizations: HashMap<String, OrganizationInfo>,
    #[serde(default)]
    pub peers: BTreeMap<String, PeerInfo>,
    #[serde(rename = "certificateAuthorities", default)]
    pub certificate_authorities: BTreeMap<String, CertificateAuthorityInfo>,
    #[serde(default)]
    pub gateway: Option<GatewayInfo>,
}

impl ConnectionProfile {
    pub fn from_json(content: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(content).map_err(|e| GatewayError::Profile(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, GatewayError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Profile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
            .map_err(|e| GatewayError::Profile(format!("{}: {}", path.display(), e)))
    }

    /// The CA entry for `org`: `ca.<org>.example.com` if present, else the only entry.
    pub fn certificate_authority(&self, org: &OrgId) -> Result<&CertificateAuthorityInfo, GatewayError> {
        if let Some(ca) = self.certificate_authorities.get(&org.ca_key()) {
            return Ok(ca);
        }
        let mut all = self.certificate_authorities.values();
        match (all.next(), all.next()) {
            (Some(ca), None) => Ok(ca),
            _ => Err(GatewayError::Profile(format!(
                "no certificate authority '{}' in the connection profile for {}",
                org.ca_key(),
                org
            ))),
        }
    }

    /// Base URL of the transaction gateway for this organization.
    ///
    /// Uses `gateway.url` when present, otherwise the first peer with its
    /// `grpc(s)` scheme mapped to `http(s)`.
    pub fn gateway_endpoint(&self) -> Result<String, GatewayError> {
        if let Some(gateway) = &self.gateway {
            return Ok(gateway.url.trim_end_matches('/').to_string());
        }
        let peer = self
            .peers
            .values()
            .next()
            .ok_or_else(|| GatewayError::Profile("connection profile lists no peers".into()))?;
        let url = if let Some(rest) = peer.url.strip_prefix("grpcs://") {
            format!("https://{}", rest)
        } else if let Some(rest) = peer.url.strip_prefix("grpc://") {
            format!("http://{}", rest)
        } else {
            peer.url.clone()
        };
        Ok(url.trim_end_matches('/').to_string())
    }

    /// TLS roots for the gateway endpoint chosen by [`Self::gateway_endpoint`].
    pub fn gateway_tls_roots(&self) -> Vec<&str> {
        let certs = match &self.gateway {
            Some(gateway) => gateway.tls_ca_certs.as_ref(),
            None => self.peers.values().next().and_then(|p| p.tls_ca_certs.as_ref()),
        };
        certs.map(|c| c.pem.certificates()).unwrap_or_default()
    }
}

/// Connection profiles of every configured organization, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct ConnectionProfiles {
    by_org: HashMap<OrgId, Arc<ConnectionProfile>>,
}

impl ConnectionProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, org: OrgId, profile: ConnectionProfile) {
        self.by_org.insert(org, Arc::new(profile));
    }

    pub fn get(&self, org: &OrgId) -> Result<Arc<ConnectionProfile>, GatewayError> {
        self.by_org
            .get(org)
            .cloned()
            .ok_or_else(|| GatewayError::Profile(format!("no connection profile loaded for {}", org)))
    }
}
