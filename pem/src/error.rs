use base64::DecodeError;
use thiserror::Error;

/// Errors that can occur when parsing or decoding PEM data.
///
/// PEM parsing follows RFC 7468, with the RFC 1421 encapsulated headers used
/// by legacy OpenSSL keys.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Missing the opening boundary marker (e.g., `-----BEGIN CERTIFICATE-----`)
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// Missing the closing boundary marker (e.g., `-----END CERTIFICATE-----`)
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// The label in the boundary marker is empty or malformed
    #[error("invalid label")]
    InvalidLabel,

    /// The BEGIN and END labels do not match
    #[error("label doesn't match: BEGIN {begin}, END {end}")]
    LabelMismatch { begin: String, end: String },

    /// The boundary pattern could not be built
    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    /// An encapsulated header line without a `name: value` form
    #[error("invalid encapsulated header: {0}")]
    InvalidHeader(String),

    /// Failed to decode base64 data
    #[error("base64 decode: {0}")]
    Base64Decode(DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
