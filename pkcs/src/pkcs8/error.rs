use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid version: {0}")]
    InvalidVersion(i64),

    #[error("expected SEQUENCE")]
    ExpectedSequence,

    #[error("expected {expected} elements, got {actual}")]
    InvalidElementCount {
        expected: &'static str,
        actual: usize,
    },

    #[error("expected OCTET STRING for {field}")]
    ExpectedOctetString { field: &'static str },

    #[error("expected INTEGER for {field}")]
    ExpectedInteger { field: &'static str },

    #[error("empty ASN1Object")]
    EmptyAsn1Object,

    #[error("unexpected key format: expected {expected}")]
    UnexpectedKeyFormat { expected: &'static str },

    #[error("unsupported private key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("unsupported encryption algorithm: {0}")]
    UnsupportedEncryptionAlgorithm(String),

    #[error("unsupported key derivation function: {0}")]
    UnsupportedKdf(String),

    #[error("unsupported PRF: {0}")]
    UnsupportedPrf(String),

    #[error("missing parameters for {0}")]
    MissingParameters(&'static str),

    #[error("{0} out of range")]
    OutOfRange(&'static str),

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),

    #[error("PKIX types error: {0}")]
    PkixTypes(#[from] pkix_types::Error),

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] crate::pkcs1::Error),
}
