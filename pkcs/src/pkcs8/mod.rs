//! PKCS#8: Private-Key Information Syntax Specification
//!
//! This module implements [RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958) (Asymmetric Key Packages)
//! which obsoletes RFC 5208 (PKCS#8 v1.2), restricted to RSA keys, and the
//! password based encryption schemes of
//! [RFC 8018](https://datatracker.ietf.org/doc/html/rfc8018) and
//! [RFC 7292](https://datatracker.ietf.org/doc/html/rfc7292) Appendix C.

mod encrypted;
mod scheme;

pub mod error;
pub mod types;

pub use encrypted::EncryptedPrivateKeyInfo;
pub use error::{Error, Result};
pub use pkix_types::{AlgorithmIdentifier, AlgorithmParameters};
pub use scheme::{EncryptionScheme, Pbkdf2Params};
pub use types::{PrivateKeyInfo, Version};
