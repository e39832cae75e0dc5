//! Wiring of the long-lived services shared by the binaries.

use crate::app::enroller::Enroller;
use crate::app::session::SessionFactory;
use crate::domain::error::GatewayError;
use crate::domain::org::OrgId;
use crate::infra::config::Settings;
use crate::infra::fabric::ca::{CertificateAuthority, FabricCaClient};
use crate::infra::fabric::gateway::{GatewayConnector, RestGatewayConnector};
use crate::infra::fabric::profile::{ConnectionProfile, ConnectionProfiles};
use crate::storage::wallet::{FileSystemWallet, IdentityStore};
use crate::transport::http::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct AppContext {
    pub settings: Arc<Settings>,
    pub enroller: Arc<Enroller>,
    pub sessions: Arc<SessionFactory>,
}

impl AppContext {
    /// Loads every organization's connection profile and builds the CA clients,
    /// the file-system wallet and the REST gateway connector.
    pub fn build(settings: Settings) -> Result<Self, GatewayError> {
        let mut profiles = ConnectionProfiles::new();
        let mut authorities: HashMap<OrgId, Arc<dyn CertificateAuthority>> = HashMap::new();

        for org in &settings.orgs {
            let path = settings.profile_path(&org.org);
            let profile = ConnectionProfile::load(&path)?;
            let ca_info = profile.certificate_authority(&org.org)?;
            let client = FabricCaClient::new(
                ca_info,
                org.ca_name.clone(),
                settings.ca_verify_tls,
                settings.http_timeout,
            )
            .map_err(|e| GatewayError::enrollment(&org.org, e))?;
            info!(org = %org.org, profile = %path.display(), ca = %ca_info.url, "loaded connection profile");

            authorities.insert(org.org.clone(), Arc::new(client));
            profiles.insert(org.org.clone(), profile);
        }

        let wallet: Arc<dyn IdentityStore> = Arc::new(FileSystemWallet::new(settings.wallet_dir.clone()));
        let connector: Arc<dyn GatewayConnector> = Arc::new(RestGatewayConnector::new(
            settings.http_timeout,
            settings.ca_verify_tls,
        ));

        Ok(Self::from_parts(settings, wallet, authorities, profiles, connector))
    }

    /// Assembles a context from already-built parts.
    pub fn from_parts(
        settings: Settings,
        wallet: Arc<dyn IdentityStore>,
        authorities: HashMap<OrgId, Arc<dyn CertificateAuthority>>,
        profiles: ConnectionProfiles,
        connector: Arc<dyn GatewayConnector>,
    ) -> Self {
        let settings = Arc::new(settings);
        let enroller = Arc::new(Enroller::new(wallet.clone(), authorities, settings.clone()));
        let sessions = Arc::new(SessionFactory::new(
            wallet,
            Arc::new(profiles),
            connector,
            settings.clone(),
        ));
        Self {
            settings,
            enroller,
            sessions,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            sessions: self.sessions.clone(),
            settings: self.settings.clone(),
        }
    }
}
