//! Fabric CA style request tokens.
//!
//! A token is `b64(cert) "." b64(sig)`, where `sig` is a DER encoded, low-S
//! ECDSA-SHA256 signature over `METHOD "." b64(uri) "." b64(body) "." b64(cert)`.
//! The CA's register/revoke endpoints require it, and the REST gateway client
//! signs its requests the same way.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};

/// The exact byte string that gets signed.
pub fn token_payload(method: &str, uri: &str, body: &[u8], certificate_pem: &str) -> String {
    format!(
        "{}.{}.{}.{}",
        method,
        STANDARD.encode(uri.as_bytes()),
        STANDARD.encode(body),
        STANDARD.encode(certificate_pem.as_bytes())
    )
}

/// Builds the `Authorization` header value for one request.
pub fn auth_token(
    key: &SigningKey,
    certificate_pem: &str,
    method: &str,
    uri: &str,
    body: &[u8],
) -> String {
    let payload = token_payload(method, uri, body, certificate_pem);
    let signature: Signature = key.sign(payload.as_bytes());
    // Fabric verifiers reject high-S signatures.
    let signature = signature.normalize_s().unwrap_or(signature);
    format!(
        "{}.{}",
        STANDARD.encode(certificate_pem.as_bytes()),
        STANDARD.encode(signature.to_der().as_bytes())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{generate_enrollment_key, signing_key_from_pem};
    use p256::ecdsa::signature::Verifier;
    use p256::ecdsa::VerifyingKey;

    #[test]
    fn token_signature_verifies_against_payload() {
        let key = generate_enrollment_key("admin").unwrap();
        let signing_key = signing_key_from_pem(&key.private_key_pem).unwrap();
        let cert = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
        let body = br#"{"id":"appUser"}"#;

        let token = auth_token(&signing_key, cert, "POST", "/api/v1/register", body);
        let (cert_part, sig_part) = token.split_once('.').unwrap();
        assert_eq!(STANDARD.decode(cert_part).unwrap(), cert.as_bytes());

        let der = STANDARD.decode(sig_part).unwrap();
        let signature = Signature::from_der(&der).unwrap();
        assert!(signature.normalize_s().is_none(), "signature must be low-S");

        let payload = token_payload("POST", "/api/v1/register", body, cert);
        VerifyingKey::from(&signing_key)
            .verify(payload.as_bytes(), &signature)
            .unwrap();
    }
}
