//! Enrolled X.509 identities.

use crate::domain::org::OrgId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Privilege level of an enrolled identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    ApplicationUser,
}

/// Wallet labels under which the two identities of every organization live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLabels {
    pub admin: String,
    pub app_user: String,
}

impl IdentityLabels {
    pub fn label_for(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin,
            Role::ApplicationUser => &self.app_user,
        }
    }
}

impl Default for IdentityLabels {
    fn default() -> Self {
        Self {
            admin: "admin".to_string(),
            app_user: "appUser".to_string(),
        }
    }
}

/// A certificate and private key issued by an organization's CA.
///
/// Identities are written once by enrollment and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub org: OrgId,
    pub role: Role,
    pub msp_id: String,
    /// PEM encoded X.509 certificate.
    pub certificate: String,
    /// PEM encoded PKCS#8 private key.
    pub private_key: String,
}

impl Identity {
    pub fn new(org: OrgId, role: Role, certificate: String, private_key: String) -> Self {
        let msp_id = org.msp_id();
        Self {
            org,
            role,
            msp_id,
            certificate,
            private_key,
        }
    }

    /// Short hex fingerprint of the certificate, used in logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.certificate.as_bytes());
        hex::encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_identity_derives_msp_id_from_org() {
        let org: OrgId = "org5".parse().unwrap();
        let identity = Identity::new(org, Role::Admin, "CERT".into(), "KEY".into());
        assert_eq!(identity.msp_id, "Org5MSP");
        assert_eq!(identity.fingerprint().len(), 16);
    }

    #[test]
    fn labels_resolve_by_role() {
        let labels = IdentityLabels::default();
        assert_eq!(labels.label_for(Role::Admin), "admin");
        assert_eq!(labels.label_for(Role::ApplicationUser), "appUser");
    }
}
