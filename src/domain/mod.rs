//! Organizations, identities, errors and the typed contract request schemas.

pub mod contract;
pub mod error;
pub mod identity;
pub mod org;

pub use error::GatewayError;
pub use identity::{Identity, IdentityLabels, Role};
pub use org::OrgId;
