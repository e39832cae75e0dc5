pub mod keys;
pub mod token;

pub use keys::{generate_enrollment_key, signing_key_from_pem, EnrollmentKey, KeyError};
pub use token::auth_token;
