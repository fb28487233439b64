use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] asn1::error::Error),

    #[error("PEM error: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("DER error: {0}")]
    Der(#[from] der::error::Error),

    #[error("PKCS#1 error: {0}")]
    Pkcs1(#[from] crate::pkcs1::Error),

    #[error("PKCS#8 error: {0}")]
    Pkcs8(#[from] crate::pkcs8::Error),

    #[error(transparent)]
    PKIXTypes(#[from] pkix_types::Error),

    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    #[error("invalid key or IV length for the cipher")]
    InvalidKeyOrIvLength,

    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    InvalidCiphertextLength(usize),

    #[error("bad padding after decryption")]
    BadPadding,

    #[error("iteration count {0} out of range")]
    InvalidIterationCount(u32),

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("passphrase is not valid UTF-8")]
    PasswordNotUtf8,

    #[error("PEM block is not encrypted")]
    NotEncrypted,

    #[error("missing DEK-Info header")]
    MissingDekInfo,

    #[error("invalid DEK-Info header: {0}")]
    InvalidDekInfo(&'static str),

    #[error("no private key block found")]
    NoPrivateKey,

    #[error("unable to decrypt the private key")]
    KeyDecryptionFailed,
}

pub type Result<T> = std::result::Result<T, Error>;
