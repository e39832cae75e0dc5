// Key material for enrollment: P-256 keys and the PKCS#10 requests sent to the CA.

use p256::ecdsa::SigningKey;
use p256::pkcs8::DecodePrivateKey;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, PKCS_ECDSA_P256_SHA256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("key generation failed: {0}")]
    Generate(String),
    #[error("certificate request failed: {0}")]
    Csr(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

/// A freshly generated key together with its certificate signing request.
#[derive(Debug, Clone)]
pub struct EnrollmentKey {
    /// PKCS#8 PEM, the format the wallet stores.
    pub private_key_pem: String,
    /// PKCS#10 PEM with `CN=<enrollment id>`.
    pub csr_pem: String,
}

/// Generates an ECDSA P-256 key and a CSR for `common_name`.
pub fn generate_enrollment_key(common_name: &str) -> Result<EnrollmentKey, KeyError> {
    let key_pair = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256)
        .map_err(|e| KeyError::Generate(e.to_string()))?;

    let mut params =
        CertificateParams::new(Vec::<String>::new()).map_err(|e| KeyError::Csr(e.to_string()))?;
    let mut subject = DistinguishedName::new();
    subject.push(DnType::CommonName, common_name);
    params.distinguished_name = subject;

    let csr_pem = params
        .serialize_request(&key_pair)
        .and_then(|csr| csr.pem())
        .map_err(|e| KeyError::Csr(e.to_string()))?;

    Ok(EnrollmentKey {
        private_key_pem: key_pair.serialize_pem(),
        csr_pem,
    })
}

/// Loads a PKCS#8 PEM private key from the wallet for signing.
pub fn signing_key_from_pem(pem: &str) -> Result<SigningKey, KeyError> {
    SigningKey::from_pkcs8_pem(pem.trim()).map_err(|e| KeyError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_round_trips_through_pem() {
        let key = generate_enrollment_key("appUser").unwrap();
        assert!(key.private_key_pem.contains("BEGIN PRIVATE KEY"));
        assert!(key.csr_pem.contains("BEGIN CERTIFICATE REQUEST"));
        assert!(signing_key_from_pem(&key.private_key_pem).is_ok());
    }

    #[test]
    fn garbage_key_is_rejected() {
        assert!(matches!(
            signing_key_from_pem("not a key"),
            Err(KeyError::InvalidKey(_))
        ));
    }
}
