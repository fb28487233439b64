use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Why a validation or conversion did not succeed.
///
/// The set is closed and the wording is fixed. Lower level parser errors
/// never leak through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingCertificate,
    MissingKey,
    MissingPassphrase,
    MalformedPem,
    TruncatedInput,
    UnsupportedEncoding,
    InvalidCertificate,
    KeyDecryptionFailed,
    KeyMismatch,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            FailureKind::MissingCertificate => "no certificate was provided",
            FailureKind::MissingKey => "no private key was provided",
            FailureKind::MissingPassphrase => "no passphrase was provided",
            FailureKind::MalformedPem => "input is not valid PEM text",
            FailureKind::TruncatedInput => "encoded data ends before its declared length",
            FailureKind::UnsupportedEncoding => "encoding is not supported",
            FailureKind::InvalidCertificate => "not a valid X.509 certificate",
            FailureKind::KeyDecryptionFailed => {
                "failed to decrypt the private key, check the passphrase and key format"
            }
            FailureKind::KeyMismatch => "the private key does not match the certificate",
        };
        f.write_str(message)
    }
}

/// Where in the pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Certificate,
    PrivateKey,
    Pairing,
    Bundle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Certificate => "certificate",
            Stage::PrivateKey => "private key",
            Stage::Pairing => "pairing",
            Stage::Bundle => "bundle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("{stage}: {kind}")]
pub struct Error {
    pub kind: FailureKind,
    pub stage: Stage,
}

impl Error {
    pub fn new(kind: FailureKind, stage: Stage) -> Self {
        Error { kind, stage }
    }

    /// Classifies a certificate parsing failure. The detail is logged at
    /// debug level and then dropped.
    pub(crate) fn from_certificate(err: &x509::Error) -> Self {
        tracing::debug!(error = %err, "certificate rejected");
        let kind = match err {
            x509::Error::Pem(_) | x509::Error::NoCertificate | x509::Error::UnexpectedLabel(_) => {
                FailureKind::MalformedPem
            }
            _ => match err.der_error() {
                Some(der) if der.is_truncation() => FailureKind::TruncatedInput,
                Some(der) if der.is_unsupported_encoding() => FailureKind::UnsupportedEncoding,
                _ => FailureKind::InvalidCertificate,
            },
        };
        Error::new(kind, Stage::Certificate)
    }

    /// Classifies a private key failure. Only an unreadable PEM envelope is
    /// told apart; everything past it is a decryption failure and is not
    /// logged.
    pub(crate) fn from_private_key(err: &pkcs::Error) -> Self {
        let kind = match err {
            pkcs::Error::Pem(_) => FailureKind::MalformedPem,
            _ => FailureKind::KeyDecryptionFailed,
        };
        Error::new(kind, Stage::PrivateKey)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
