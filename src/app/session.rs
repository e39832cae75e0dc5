//! Per-request network sessions.
//!
//! A session is opened for exactly one HTTP request and closed before the
//! response is written. [`SessionFactory::with_contract`] is the only way the
//! HTTP layer uses sessions. A session dropped before [`Session::close`] ran,
//! for instance because the client went away mid-request, is closed on a
//! spawned task.

use crate::domain::error::GatewayError;
use crate::domain::identity::Identity;
use crate::domain::org::OrgId;
use crate::infra::config::Settings;
use crate::infra::fabric::gateway::{Contract, GatewayConnection, GatewayConnector};
use crate::infra::fabric::profile::ConnectionProfiles;
use crate::storage::wallet::IdentityStore;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct SessionFactory {
    wallet: Arc<dyn IdentityStore>,
    profiles: Arc<ConnectionProfiles>,
    connector: Arc<dyn GatewayConnector>,
    settings: Arc<Settings>,
}

impl SessionFactory {
    pub fn new(
        wallet: Arc<dyn IdentityStore>,
        profiles: Arc<ConnectionProfiles>,
        connector: Arc<dyn GatewayConnector>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            wallet,
            profiles,
            connector,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The identity requests for `org` act as: the application user, else the admin.
    async fn session_identity(&self, org: &OrgId) -> Result<Identity, GatewayError> {
        let labels = &self.settings.labels;
        if let Some(identity) = self.wallet.get(org, &labels.app_user).await? {
            return Ok(identity);
        }
        if let Some(identity) = self.wallet.get(org, &labels.admin).await? {
            debug!(%org, "no application identity; acting as admin");
            return Ok(identity);
        }
        Err(GatewayError::UnknownIdentity(org.to_string()))
    }

    /// Whether `org` has any identity requests could act as.
    pub async fn has_identity(&self, org: &OrgId) -> Result<bool, GatewayError> {
        match self.session_identity(org).await {
            Ok(_) => Ok(true),
            Err(GatewayError::UnknownIdentity(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Connects to `org`'s network and resolves its configured contract.
    pub async fn open_session(&self, org: &OrgId) -> Result<Session, GatewayError> {
        let org_settings = self
            .settings
            .org(org)
            .ok_or_else(|| GatewayError::invalid(format!("organization {} is not configured", org)))?;
        let identity = self.session_identity(org).await?;
        let profile = self.profiles.get(org)?;

        let connection = self.connector.connect(org, &profile, &identity).await?;
        let contract = connection.contract(&org_settings.channel, &org_settings.contract);
        debug!(%org, channel = %org_settings.channel, contract = %org_settings.contract, "session opened");

        Ok(Session {
            org: org.clone(),
            channel: org_settings.channel.clone(),
            contract_name: org_settings.contract.clone(),
            contract,
            connection: Some(connection),
        })
    }

    /// Opens a session, runs `f` against its contract and closes the session
    /// whether `f` succeeded or not.
    pub async fn with_contract<T, F, Fut>(&self, org: &OrgId, f: F) -> Result<T, GatewayError>
    where
        F: FnOnce(Arc<dyn Contract>) -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let session = self.open_session(org).await?;
        let result = f(session.contract()).await;
        session.close().await;
        result
    }
}

/// One open connection bound to an organization's channel and contract.
pub struct Session {
    org: OrgId,
    channel: String,
    contract_name: String,
    contract: Arc<dyn Contract>,
    connection: Option<Box<dyn GatewayConnection>>,
}

impl Session {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn contract(&self) -> Arc<dyn Contract> {
        self.contract.clone()
    }

    /// Disconnects. Consuming `self` makes a second close impossible.
    pub async fn close(mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
            debug!(org = %self.org, "session closed");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        let org = self.org.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(%org, "session dropped before close; closing in background");
                handle.spawn(async move {
                    connection.close().await;
                    debug!(%org, "session closed");
                });
            }
            Err(_) => warn!(%org, "session dropped outside a runtime; connection not closed"),
        }
    }
}
