//! RSA private keys in PKCS#1 and PKCS#8 form, and their recovery from
//! password protected PEM.
//!
//! - [`pkcs1`]: `RSAPrivateKey` / `RSAPublicKey` ([RFC 8017](https://datatracker.ietf.org/doc/html/rfc8017))
//! - [`pkcs8`]: `PrivateKeyInfo` / `EncryptedPrivateKeyInfo` ([RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958))
//! - [`legacy`]: OpenSSL `Proc-Type: 4,ENCRYPTED` blocks
//! - [`decryptor`]: the ordered strategies behind [`decrypt_private_key`]

pub mod cipher;
pub mod decryptor;
pub mod error;
pub mod kdf;
pub mod legacy;
pub mod passphrase;
pub mod pkcs1;
pub mod pkcs8;

pub use decryptor::{
    KeyDecryptor, KeyDecryptors, LegacyRsaDecryptor, Pkcs8Decryptor, UnencryptedKeyDecoder,
    decrypt_private_key,
};
pub use error::{Error, Result};
pub use passphrase::Passphrase;
