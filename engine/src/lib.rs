//! Certificate and RSA private key pairing.
//!
//! Takes a PEM certificate, a PEM private key and its passphrase, and reports
//! whether the two belong together. The key may be PKCS#8 encrypted, legacy
//! OpenSSL encrypted or, unless configured otherwise, unencrypted.
//!
//! ```no_run
//! use engine::validate;
//! use pkcs::Passphrase;
//!
//! let cert = std::fs::read("cert.pem").unwrap();
//! let key = std::fs::read("key.pem").unwrap();
//! let outcome = validate(&cert, &key, Passphrase::from("secret"));
//! if let Some(err) = outcome.failure {
//!     eprintln!("{err}");
//! }
//! ```
//!
//! Failures are reported as a [`FailureKind`] and the [`Stage`] it happened
//! in. Parser details are only ever written to the debug log, and never for
//! the private key.

mod bundle;
mod config;
pub mod error;
mod pairing;
mod validation;

pub use bundle::build_bundle;
pub use config::{Config, KeyFormat};
pub use error::{Error, FailureKind, Result, Stage};
pub use pairing::verify_pair;
pub use validation::{Engine, ValidationOutcome, convert, parse_certificate_info, validate};
