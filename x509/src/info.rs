use chrono::{DateTime, Utc};
use pkcs::pkcs1::RSAPublicKey;
use pkix_types::{AlgorithmIdentifier, CertificateSerialNumber, Name};
use serde::Serialize;

use crate::Certificate;
use crate::types::Version;

/// Read-only certificate metadata for display.
///
/// Names also carry their rendered `"CN: value, ..."` form. Big integers
/// serialize as decimal strings and timestamps as RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    pub version: Version,
    pub subject: Name,
    pub subject_display: String,
    pub issuer: Name,
    pub issuer_display: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub serial_number: CertificateSerialNumber,
    pub serial_number_hex: String,
    pub signature_algorithm: AlgorithmIdentifier,
    pub public_key: RSAPublicKey,
    pub key_size: u32,
}

impl CertificateInfo {
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

impl From<&Certificate> for CertificateInfo {
    fn from(cert: &Certificate) -> Self {
        CertificateInfo {
            version: cert.version(),
            subject: cert.subject().clone(),
            subject_display: cert.subject().to_string(),
            issuer: cert.issuer().clone(),
            issuer_display: cert.issuer().to_string(),
            not_before: cert.validity().not_before,
            not_after: cert.validity().not_after,
            serial_number: cert.serial_number().clone(),
            serial_number_hex: cert.serial_number().to_hex(),
            signature_algorithm: cert.signature_algorithm().clone(),
            public_key: cert.public_key().clone(),
            key_size: cert.public_key().key_size(),
        }
    }
}
