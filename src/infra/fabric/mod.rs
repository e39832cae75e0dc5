pub mod ca;
pub mod gateway;
pub mod profile;

pub use ca::{CaError, CertificateAuthority, Enrollment, FabricCaClient, RegistrationRequest};
pub use gateway::{Contract, GatewayConnection, GatewayConnector, RestGatewayConnector};
pub use profile::{ConnectionProfile, ConnectionProfiles};
