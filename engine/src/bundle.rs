use std::fmt::Write;

use pem::ToPem;
use pkcs::pkcs1::RSAPrivateKey;
use pkcs::pkcs8::PrivateKeyInfo;
use zeroize::Zeroizing;

use crate::config::KeyFormat;
use crate::error::{Error, FailureKind, Result, Stage};

/// Joins a certificate and an unencrypted private key into one PEM document.
///
/// The output is the trimmed certificate text, a newline, then the key block
/// with its own trailing newline. It holds the key in clear and is wiped
/// when dropped.
pub fn build_bundle(
    certificate: &str,
    key: &RSAPrivateKey,
    format: KeyFormat,
) -> Result<Zeroizing<String>> {
    let certificate = certificate.trim();
    if certificate.is_empty() {
        return Err(Error::new(FailureKind::MissingCertificate, Stage::Bundle));
    }

    let key_pem = match format {
        KeyFormat::RsaPrivateKey => key.to_pem().map_err(|_| encode_failed())?,
        KeyFormat::PrivateKey => PrivateKeyInfo::from_rsa(key)
            .and_then(|info| info.to_pem())
            .map_err(|_| encode_failed())?,
    };

    // sized up front so the buffer never reallocates and leaves a copy behind
    let capacity = certificate.len() + 2 * key_pem.data().len() + 128;
    let mut bundle = Zeroizing::new(String::with_capacity(capacity));
    bundle.push_str(certificate);
    bundle.push('\n');
    write!(bundle, "{key_pem}").map_err(|_| encode_failed())?;

    tracing::debug!(format = ?format, "bundle written");
    Ok(bundle)
}

fn encode_failed() -> Error {
    Error::new(FailureKind::KeyDecryptionFailed, Stage::Bundle)
}
