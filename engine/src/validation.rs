use std::str::FromStr;

use chrono::{DateTime, Utc};
use pkcs::pkcs1::RSAPrivateKey;
use pkcs::{KeyDecryptors, Passphrase};
use serde::Serialize;
use x509::{Certificate, CertificateInfo};
use zeroize::Zeroizing;

use crate::bundle::build_bundle;
use crate::config::Config;
use crate::error::{Error, FailureKind, Result, Stage};
use crate::pairing::verify_pair;

/// Result of checking a certificate against a private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub paired: bool,
    /// Present once the certificate has been parsed, even when a later stage
    /// fails.
    pub certificate: Option<CertificateInfo>,
    pub failure: Option<Error>,
    pub evaluated_at: DateTime<Utc>,
    /// Whether `evaluated_at` lies inside the certificate's validity window.
    pub currently_valid: Option<bool>,
}

impl ValidationOutcome {
    fn new(evaluated_at: DateTime<Utc>) -> Self {
        ValidationOutcome {
            paired: false,
            certificate: None,
            failure: None,
            evaluated_at,
            currently_valid: None,
        }
    }

    fn with_certificate(mut self, info: CertificateInfo) -> Self {
        self.currently_valid = Some(info.is_valid_at(self.evaluated_at));
        self.certificate = Some(info);
        self
    }

    fn failed(mut self, err: Error) -> Self {
        tracing::debug!(stage = %err.stage, kind = ?err.kind, "validation failed");
        self.paired = false;
        self.failure = Some(err);
        self
    }
}

/// Certificate and private key checks under one [`Config`].
///
/// Every entry point takes the passphrase by value; it is wiped before the
/// call returns, and so is any private key decrypted along the way.
pub struct Engine {
    config: Config,
    decryptors: KeyDecryptors,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let decryptors = KeyDecryptors::new(config.allow_unencrypted_keys);
        tracing::debug!(strategies = ?decryptors.names(), "engine configured");
        Engine { config, decryptors }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes the first certificate of a PEM document.
    pub fn parse_certificate_info(&self, certificate: &[u8]) -> Result<CertificateInfo> {
        Ok(self.certificate(certificate)?.info())
    }

    /// [`Engine::validate_at`] against the system clock.
    pub fn validate(
        &self,
        certificate: &[u8],
        key: &[u8],
        passphrase: Passphrase,
    ) -> ValidationOutcome {
        self.validate_at(certificate, key, passphrase, Utc::now())
    }

    /// Checks that `key`, decrypted with `passphrase`, is the private half of
    /// `certificate`. Validity is evaluated at `at`; an expired certificate
    /// can still pair.
    pub fn validate_at(
        &self,
        certificate: &[u8],
        key: &[u8],
        passphrase: Passphrase,
        at: DateTime<Utc>,
    ) -> ValidationOutcome {
        let outcome = ValidationOutcome::new(at);
        if let Err(err) = self.check_inputs(certificate, key, &passphrase) {
            return outcome.failed(err);
        }

        let info = match self.parse_certificate_info(certificate) {
            Ok(info) => info,
            Err(err) => return outcome.failed(err),
        };

        let paired = self.with_private_key(key, passphrase, |key| verify_pair(&info, key));
        let outcome = outcome.with_certificate(info);
        match paired {
            Ok(true) => {
                tracing::debug!("certificate and private key are a pair");
                ValidationOutcome {
                    paired: true,
                    ..outcome
                }
            }
            Ok(false) => outcome.failed(Error::new(FailureKind::KeyMismatch, Stage::Pairing)),
            Err(err) => outcome.failed(err),
        }
    }

    /// Writes the certificate and its decrypted key as one unencrypted PEM
    /// document. The certificate must parse; whether the key pairs with it
    /// is left to [`Engine::validate`].
    pub fn convert(
        &self,
        certificate: &[u8],
        key: &[u8],
        passphrase: Passphrase,
    ) -> Result<Zeroizing<String>> {
        self.check_inputs(certificate, key, &passphrase)?;
        self.certificate(certificate)?;
        let text = certificate_text(certificate)?;
        let format = self.config.bundle_key_format;

        self.with_private_key(key, passphrase, |key| build_bundle(text, key, format))?
    }

    /// Decrypts the first private key of `key` and hands it to `f`. The key
    /// only lives for the duration of the closure.
    pub fn with_private_key<T, F>(&self, key: &[u8], passphrase: Passphrase, f: F) -> Result<T>
    where
        F: FnOnce(&RSAPrivateKey) -> T,
    {
        if is_blank(key) {
            return Err(Error::new(FailureKind::MissingKey, Stage::PrivateKey));
        }
        if self.config.require_passphrase && passphrase.is_empty() {
            return Err(Error::new(FailureKind::MissingPassphrase, Stage::PrivateKey));
        }
        let text = std::str::from_utf8(key)
            .map_err(|_| Error::new(FailureKind::MalformedPem, Stage::PrivateKey))?;

        let private_key = self
            .decryptors
            .decrypt_text(text, &passphrase)
            .map_err(|err| Error::from_private_key(&err))?;
        drop(passphrase);

        Ok(f(&private_key))
    }

    fn check_inputs(&self, certificate: &[u8], key: &[u8], passphrase: &Passphrase) -> Result<()> {
        if is_blank(certificate) {
            return Err(Error::new(FailureKind::MissingCertificate, Stage::Certificate));
        }
        if is_blank(key) {
            return Err(Error::new(FailureKind::MissingKey, Stage::PrivateKey));
        }
        if self.config.require_passphrase && passphrase.is_empty() {
            return Err(Error::new(FailureKind::MissingPassphrase, Stage::PrivateKey));
        }
        Ok(())
    }

    fn certificate(&self, certificate: &[u8]) -> Result<Certificate> {
        if is_blank(certificate) {
            return Err(Error::new(FailureKind::MissingCertificate, Stage::Certificate));
        }
        let text = certificate_text(certificate)?;
        Certificate::from_str(text).map_err(|err| Error::from_certificate(&err))
    }
}

fn certificate_text(certificate: &[u8]) -> Result<&str> {
    std::str::from_utf8(certificate)
        .map_err(|_| Error::new(FailureKind::MalformedPem, Stage::Certificate))
}

fn is_blank(input: &[u8]) -> bool {
    input.iter().all(u8::is_ascii_whitespace)
}

/// [`Engine::parse_certificate_info`] with the default configuration.
pub fn parse_certificate_info(certificate: &[u8]) -> Result<CertificateInfo> {
    Engine::default().parse_certificate_info(certificate)
}

/// [`Engine::validate`] with the default configuration.
pub fn validate(certificate: &[u8], key: &[u8], passphrase: Passphrase) -> ValidationOutcome {
    Engine::default().validate(certificate, key, passphrase)
}

/// [`Engine::convert`] with the default configuration.
pub fn convert(certificate: &[u8], key: &[u8], passphrase: Passphrase) -> Result<Zeroizing<String>> {
    Engine::default().convert(certificate, key, passphrase)
}
