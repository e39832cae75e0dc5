use crate::domain::identity::{Identity, Role};
use crate::domain::org::OrgId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt wallet entry {label} for {org}: {reason}")]
    Corrupt {
        org: String,
        label: String,
        reason: String,
    },
    #[error("invalid wallet label '{0}'")]
    InvalidLabel(String),
}

impl From<WalletError> for crate::domain::GatewayError {
    fn from(value: WalletError) -> Self {
        crate::domain::GatewayError::Wallet(value.to_string())
    }
}

/// Keyed store of enrolled identities, partitioned by organization.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get(&self, org: &OrgId, label: &str) -> Result<Option<Identity>, WalletError>;

    /// Stores `identity` under `label` in the identity's own organization.
    async fn put(&self, label: &str, identity: &Identity) -> Result<(), WalletError>;

    /// Returns whether an entry was removed.
    async fn remove(&self, org: &OrgId, label: &str) -> Result<bool, WalletError>;

    async fn list(&self, org: &OrgId) -> Result<Vec<String>, WalletError>;
}

/// On-disk shape of one wallet entry, compatible with Fabric SDK file wallets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    pub credentials: Credentials,
    #[serde(rename = "mspId")]
    pub msp_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_version")]
    pub version: u32,
    /// Not written by other SDKs; inferred from the label when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub certificate: String,
    #[serde(rename = "privateKey")]
    pub private_key: String,
}

fn default_version() -> u32 {
    1
}

impl WalletEntry {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            credentials: Credentials {
                certificate: identity.certificate.clone(),
                private_key: identity.private_key.clone(),
            },
            msp_id: identity.msp_id.clone(),
            kind: "X.509".to_string(),
            version: default_version(),
            role: Some(identity.role),
        }
    }

    pub fn into_identity(self, org: &OrgId, label: &str) -> Result<Identity, WalletError> {
        if self.kind != "X.509" {
            return Err(WalletError::Corrupt {
                org: org.to_string(),
                label: label.to_string(),
                reason: format!("unsupported identity type '{}'", self.kind),
            });
        }
        let role = self.role.unwrap_or(if label.to_ascii_lowercase().contains("admin") {
            Role::Admin
        } else {
            Role::ApplicationUser
        });
        Ok(Identity {
            org: org.clone(),
            role,
            msp_id: self.msp_id,
            certificate: self.credentials.certificate,
            private_key: self.credentials.private_key,
        })
    }
}

/// Labels become file names; keep them to a safe character set.
pub(crate) fn validate_label(label: &str) -> Result<(), WalletError> {
    let ok = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '@')
        && !label.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(WalletError::InvalidLabel(label.to_string()))
    }
}

/// Process-local wallet. Useful for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryWallet {
    entries: RwLock<HashMap<(OrgId, String), Identity>>,
}

impl MemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryWallet {
    async fn get(&self, org: &OrgId, label: &str) -> Result<Option<Identity>, WalletError> {
        validate_label(label)?;
        let entries = self.entries.read().await;
        Ok(entries.get(&(org.clone(), label.to_string())).cloned())
    }

    async fn put(&self, label: &str, identity: &Identity) -> Result<(), WalletError> {
        validate_label(label)?;
        let mut entries = self.entries.write().await;
        entries.insert((identity.org.clone(), label.to_string()), identity.clone());
        Ok(())
    }

    async fn remove(&self, org: &OrgId, label: &str) -> Result<bool, WalletError> {
        validate_label(label)?;
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&(org.clone(), label.to_string())).is_some())
    }

    async fn list(&self, org: &OrgId) -> Result<Vec<String>, WalletError> {
        let entries = self.entries.read().await;
        let mut labels: Vec<String> = entries
            .keys()
            .filter(|(o, _)| o == org)
            .map(|(_, label)| label.clone())
            .collect();
        labels.sort();
        Ok(labels)
    }
}
