//! Error taxonomy shared by the enroller, the session factory and the HTTP layer.

use thiserror::Error;

/// Every failure the gateway can surface to a caller.
///
/// The HTTP boundary renders all of them as `{"error": message}`; see
/// `transport::http::types` for the status mapping.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The CA was unreachable or rejected the enrollment/registration.
    #[error("enrollment failed for {org}: {reason}")]
    Enrollment { org: String, reason: String },

    /// An application identity was requested before the admin was enrolled.
    #[error("admin identity for {0} does not exist in the wallet; enroll the admin first")]
    MissingAdmin(String),

    /// A session was requested for an organization without any stored identity.
    #[error("no identity for {0} exists in the wallet")]
    UnknownIdentity(String),

    /// Opening the gateway connection failed.
    #[error("failed to connect to the network for {org}: {reason}")]
    Connection { org: String, reason: String },

    /// The contract rejected or failed to run a transaction.
    #[error("{0}")]
    Transaction(String),

    /// Advisory organization check on a route failed.
    #[error("organization '{org}' is not permitted to call {route}")]
    Authorization { org: String, route: String },

    /// The request could not be turned into contract arguments.
    #[error("{0}")]
    InvalidRequest(String),

    #[error("connection profile error: {0}")]
    Profile(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn enrollment(org: impl ToString, reason: impl ToString) -> Self {
        Self::Enrollment {
            org: org.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn connection(org: impl ToString, reason: impl ToString) -> Self {
        Self::Connection {
            org: org.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }
}
