//! Provisions the admin and application identities of every organization.

use crate::crypto::signing_key_from_pem;
use crate::domain::error::GatewayError;
use crate::domain::identity::{Identity, Role};
use crate::domain::org::OrgId;
use crate::infra::config::Settings;
use crate::infra::fabric::ca::{CaError, CertificateAuthority, RegistrationRequest};
use crate::storage::wallet::IdentityStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct Enroller {
    wallet: Arc<dyn IdentityStore>,
    authorities: HashMap<OrgId, Arc<dyn CertificateAuthority>>,
    settings: Arc<Settings>,
}

impl Enroller {
    pub fn new(
        wallet: Arc<dyn IdentityStore>,
        authorities: HashMap<OrgId, Arc<dyn CertificateAuthority>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            wallet,
            authorities,
            settings,
        }
    }

    fn authority(&self, org: &OrgId) -> Result<&Arc<dyn CertificateAuthority>, GatewayError> {
        self.authorities
            .get(org)
            .ok_or_else(|| GatewayError::enrollment(org, "no certificate authority configured"))
    }

    /// Enrolls the admin of `org` unless the wallet already holds it.
    pub async fn ensure_admin(&self, org: &OrgId) -> Result<(), GatewayError> {
        let label = &self.settings.labels.admin;
        if self.wallet.get(org, label).await?.is_some() {
            info!(%org, %label, "admin identity already present in wallet");
            return Ok(());
        }

        let ca = self.authority(org)?;
        let enrollment = ca
            .enroll("admin", &self.settings.admin_secret)
            .await
            .map_err(|e| GatewayError::enrollment(org, e))?;

        let identity = Identity::new(org.clone(), Role::Admin, enrollment.certificate, enrollment.private_key);
        self.wallet.put(label, &identity).await?;
        info!(%org, %label, fingerprint = %identity.fingerprint(), "enrolled admin identity");
        Ok(())
    }

    /// Registers and enrolls the application user of `org`, vouched for by its admin.
    pub async fn ensure_app_user(&self, org: &OrgId) -> Result<(), GatewayError> {
        let labels = &self.settings.labels;
        let admin = self
            .wallet
            .get(org, &labels.admin)
            .await?
            .ok_or_else(|| GatewayError::MissingAdmin(org.to_string()))?;

        if self.wallet.get(org, &labels.app_user).await?.is_some() {
            info!(%org, label = %labels.app_user, "application identity already present in wallet");
            return Ok(());
        }

        let affiliation = self
            .settings
            .org(org)
            .map(|o| o.affiliation.clone())
            .unwrap_or_else(|| org.default_affiliation());
        let request = RegistrationRequest {
            enrollment_id: labels.app_user.clone(),
            role: "client".to_string(),
            affiliation,
            secret: None,
        };

        let ca = self.authority(org)?;
        let secret = match ca.register(&request, &admin).await {
            Ok(secret) => secret,
            Err(CaError::AlreadyRegistered(id)) => {
                info!(%org, %id, "identity already registered; revoking and registering again");
                ca.revoke(&id, &admin)
                    .await
                    .map_err(|e| GatewayError::enrollment(org, e))?;
                ca.register(&request, &admin)
                    .await
                    .map_err(|e| GatewayError::enrollment(org, e))?
            }
            Err(e) => return Err(GatewayError::enrollment(org, e)),
        };

        let enrollment = ca
            .enroll(&request.enrollment_id, &secret)
            .await
            .map_err(|e| GatewayError::enrollment(org, e))?;
        let identity = Identity::new(
            org.clone(),
            Role::ApplicationUser,
            enrollment.certificate,
            enrollment.private_key,
        );
        self.wallet.put(&labels.app_user, &identity).await?;
        info!(%org, label = %labels.app_user, fingerprint = %identity.fingerprint(), "enrolled application identity");
        Ok(())
    }

    /// Imports MSP material issued by `cryptogen` for `user` (`Admin`, `User1`, ...)
    /// of `org`, read from `<profiles_dir>/peerOrganizations/<domain>/users/<user>@<domain>/msp`.
    ///
    /// `Admin*` users replace the admin label, everyone else the application user label.
    pub async fn import_msp_identity(&self, org: &OrgId, user: &str) -> Result<Identity, GatewayError> {
        let msp = org.user_msp_dir(&self.settings.profiles_dir, user);
        let certificate = first_file_in(&msp.join("signcerts"))
            .await
            .map_err(|e| GatewayError::enrollment(org, e))?;
        let private_key = first_file_in(&msp.join("keystore"))
            .await
            .map_err(|e| GatewayError::enrollment(org, e))?;
        signing_key_from_pem(&private_key).map_err(|e| GatewayError::enrollment(org, e))?;

        let role = if user.to_ascii_lowercase().starts_with("admin") {
            Role::Admin
        } else {
            Role::ApplicationUser
        };
        let label = self.settings.labels.label_for(role);
        let identity = Identity::new(org.clone(), role, certificate, private_key);

        if self.wallet.remove(org, label).await? {
            info!(%org, %label, "replacing wallet identity");
        }
        self.wallet.put(label, &identity).await?;
        info!(%org, %user, %label, fingerprint = %identity.fingerprint(), "imported MSP identity");
        Ok(identity)
    }

    /// Enrolls the admin, then the application user, of one organization.
    pub async fn enroll_org(&self, org: &OrgId) -> Result<(), GatewayError> {
        self.ensure_admin(org).await?;
        self.ensure_app_user(org).await
    }

    /// Provisions every configured organization, one after the other.
    /// Stops at the first failure.
    pub async fn enroll_all(&self) -> Result<(), GatewayError> {
        for org in self.settings.org_ids() {
            self.enroll_org(org).await?;
        }
        info!(orgs = self.settings.orgs.len(), "all organizations enrolled");
        Ok(())
    }
}

/// Contents of the first file, by name, in `dir`.
async fn first_file_in(dir: &Path) -> Result<String, String> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| format!("cannot read {}: {}", dir.display(), e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| format!("cannot read {}: {}", dir.display(), e))?
    {
        if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }
    files.sort();
    let first = files
        .first()
        .ok_or_else(|| format!("{} contains no files", dir.display()))?;
    tokio::fs::read_to_string(first)
        .await
        .map_err(|e| format!("cannot read {}: {}", first.display(), e))
}
