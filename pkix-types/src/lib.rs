//! PKIX (Public Key Infrastructure using X.509) Common Types
//!
//! Type definitions shared by X.509 certificates (RFC 5280) and the PKCS
//! key containers (RFC 8017, RFC 5958).

pub mod algorithm;
pub mod directory_string;
pub mod error;
pub mod name;
pub mod oid_name;
pub mod serial_number;
pub mod subject_public_key_info;

pub use algorithm::{AlgorithmIdentifier, AlgorithmParameters};
pub use directory_string::{DirectoryString, repair_utf8_mojibake};
pub use error::{Error, Result};
pub use name::{AttributeTypeAndValue, Name, RelativeDistinguishedName};
pub use oid_name::OidName;
pub use serial_number::CertificateSerialNumber;
pub use subject_public_key_info::SubjectPublicKeyInfo;
