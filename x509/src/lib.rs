//! X.509 certificates ([RFC 5280](https://datatracker.ietf.org/doc/html/rfc5280))
//!
//! Decodes the fields needed to pair a certificate with its RSA private key:
//! names, serial number, validity window and the RSA subject public key.
//! Extensions are skipped and signatures are not verified.
//!
//! ```no_run
//! use std::str::FromStr;
//! use x509::Certificate;
//!
//! let text = std::fs::read_to_string("cert.pem").unwrap();
//! let cert = Certificate::from_str(&text).unwrap();
//! println!("{}", cert.subject());
//! ```

use std::str::FromStr;

use asn1::{ASN1Object, BitString, Element};
use certmatch::decoder::{DecodableFrom, Decoder};
use chrono::{DateTime, Utc};
use der::Der;
use pem::Pem;
use pkcs::pkcs1::RSAPublicKey;
use pkix_types::{AlgorithmIdentifier, CertificateSerialNumber, Name};

pub mod error;
mod info;
mod types;

pub use error::{Error, Result};
pub use info::CertificateInfo;
pub use types::{TBSCertificate, Validity, Version};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1

Certificate  ::=  SEQUENCE  {
    tbsCertificate       TBSCertificate,
    signatureAlgorithm   AlgorithmIdentifier,
    signatureValue       BIT STRING
}
 */

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    tbs_certificate: TBSCertificate,
    signature_algorithm: AlgorithmIdentifier,
    signature_value: BitString,
}

impl Certificate {
    pub fn tbs_certificate(&self) -> &TBSCertificate {
        &self.tbs_certificate
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifier {
        &self.signature_algorithm
    }

    pub fn signature_value(&self) -> &BitString {
        &self.signature_value
    }

    pub fn version(&self) -> Version {
        self.tbs_certificate.version
    }

    pub fn serial_number(&self) -> &CertificateSerialNumber {
        &self.tbs_certificate.serial_number
    }

    pub fn issuer(&self) -> &Name {
        &self.tbs_certificate.issuer
    }

    pub fn subject(&self) -> &Name {
        &self.tbs_certificate.subject
    }

    pub fn validity(&self) -> &Validity {
        &self.tbs_certificate.validity
    }

    pub fn public_key(&self) -> &RSAPublicKey {
        &self.tbs_certificate.public_key
    }

    /// True when `at` falls inside the validity window, bounds included.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.validity().contains(at)
    }

    /// [`Certificate::is_valid_at`] against the system clock.
    pub fn is_currently_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn info(&self) -> CertificateInfo {
        CertificateInfo::from(self)
    }
}

impl DecodableFrom<Element> for Certificate {}

impl Decoder<Element, Certificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::CertificateExpectedSequence);
        };

        match elements.as_slice() {
            [tbs_certificate, signature_algorithm, Element::BitString(signature_value)] => {
                Ok(Certificate {
                    tbs_certificate: tbs_certificate.decode()?,
                    signature_algorithm: signature_algorithm.decode()?,
                    signature_value: signature_value.clone(),
                })
            }
            [_, _, _] => Err(Error::CertificateExpectedBitString),
            _ => Err(Error::CertificateInvalidElementCount(elements.len())),
        }
    }
}

impl DecodableFrom<ASN1Object> for Certificate {}

impl Decoder<ASN1Object, Certificate> for ASN1Object {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        match self.elements() {
            [element, ..] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
        }
    }
}

impl DecodableFrom<Der> for Certificate {}

impl Decoder<Der, Certificate> for Der {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        let asn1_obj: ASN1Object = self.decode()?;
        asn1_obj.decode()
    }
}

impl DecodableFrom<&[u8]> for Certificate {}

impl Decoder<&[u8], Certificate> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        let der: Der = self.decode()?;
        der.decode()
    }
}

impl DecodableFrom<Pem> for Certificate {}

/// Accepts `CERTIFICATE`, `X509 CERTIFICATE` and `TRUSTED CERTIFICATE`.
impl Decoder<Pem, Certificate> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Certificate> {
        if !self.label().is_certificate() {
            return Err(Error::UnexpectedLabel(self.label().to_string()));
        }
        let der: Der = self.decode()?;
        der.decode()
    }
}

/// Decodes the first certificate block of a PEM document. Other blocks,
/// such as a private key in the same file, are skipped.
impl FromStr for Certificate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let blocks = pem::parse_many(s)?;
        let Some(pem) = blocks.iter().find(|pem| pem.label().is_certificate()) else {
            return Err(Error::NoCertificate);
        };
        let cert: Certificate = pem.decode()?;
        tracing::debug!(serial = %cert.serial_number(), "certificate decoded");
        Ok(cert)
    }
}
