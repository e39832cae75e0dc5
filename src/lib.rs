pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AppContext, Enroller, Session, SessionFactory};
pub use domain::{GatewayError, Identity, IdentityLabels, OrgId, Role};
pub use infra::config::{OrgSettings, Settings};
pub use infra::telemetry::init_tracing;
pub use storage::wallet::{FileSystemWallet, IdentityStore, MemoryWallet};
