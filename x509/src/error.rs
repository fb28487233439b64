use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no CERTIFICATE block found")]
    NoCertificate,
    #[error("unexpected PEM label {0}")]
    UnexpectedLabel(String),
    #[error("certificate: expected SEQUENCE")]
    CertificateExpectedSequence,
    #[error("certificate: expected 3 elements, got {0}")]
    CertificateInvalidElementCount(usize),
    #[error("certificate: expected BIT STRING for signatureValue")]
    CertificateExpectedBitString,
    #[error("certificate: empty ASN.1 object")]
    EmptyAsn1Object,
    #[error("TBSCertificate: expected SEQUENCE")]
    TbsCertificateExpectedSequence,
    #[error("TBSCertificate: expected at least 6 fields, got {0}")]
    TbsCertificateInvalidElementCount(usize),
    #[error("version: {0}")]
    InvalidVersion(String),
    #[error("validity: {0}")]
    InvalidValidity(&'static str),
    #[error("unsupported public key algorithm {0}")]
    UnsupportedPublicKeyAlgorithm(String),
    #[error("subject public key has {0} unused bits")]
    PublicKeyUnusedBits(u8),
    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),
    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),
    #[error("PKIX types error: {0}")]
    PKIXTypes(#[from] pkix_types::Error),
    #[error("RSA public key: {0}")]
    RsaPublicKey(#[from] pkcs::pkcs1::Error),
}

impl Error {
    /// The DER level failure underneath this error, if any.
    pub fn der_error(&self) -> Option<&der::error::Error> {
        match self {
            Error::Der(err) => Some(err),
            Error::Asn1(asn1::error::Error::FailedToDecodeDer(err)) => Some(err),
            Error::RsaPublicKey(pkcs::pkcs1::Error::InvalidDer(err)) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
