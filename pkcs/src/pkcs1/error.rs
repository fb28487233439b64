use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected INTEGER for {field}")]
    ExpectedInteger { field: &'static str },

    #[error("empty ASN1Object")]
    EmptyAsn1Object,

    #[error("unexpected key format: expected {expected}")]
    UnexpectedKeyFormat { expected: &'static str },

    #[error("invalid version: {0} (must be 0 for two-prime or 1 for multi-prime)")]
    InvalidVersion(i64),

    #[error("otherPrimeInfos present in a two-prime key")]
    UnexpectedOtherPrimeInfos,

    #[error("negative {field}")]
    NegativeInteger { field: &'static str },

    #[error("invalid PEM: {0}")]
    InvalidPem(#[from] pem::error::Error),

    #[error("invalid DER: {0}")]
    InvalidDer(#[from] der::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
