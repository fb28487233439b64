//! Certificate Serial Number
//!
//! Defined in RFC 5280 Section 4.1.2.2
//!
//! ```asn1
//! CertificateSerialNumber ::= INTEGER
//! ```

use std::ops::Deref;

use asn1::{Element, Integer};
use certmatch::decoder::{DecodableFrom, Decoder};
use serde::Serialize;

use crate::error::{Error, Result};

/// Certificate Serial Number
///
/// Serials run up to 20 octets, so the value is kept as an arbitrary size
/// [`Integer`]. `Display` and serde both render the decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CertificateSerialNumber {
    inner: Integer,
}

impl CertificateSerialNumber {
    /// Interprets `bytes` as a big-endian signed integer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Integer::from(bytes).into()
    }

    /// Format as lowercase hex octets separated by colons, as OpenSSL does.
    ///
    /// ```
    /// use pkix_types::CertificateSerialNumber;
    ///
    /// let serial = CertificateSerialNumber::from_bytes(vec![0x00, 0x9c, 0x54, 0x8e]);
    /// assert_eq!(serial.format_hex(), "00:9c:54:8e");
    /// ```
    pub fn format_hex(&self) -> String {
        self.inner
            .as_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl From<Integer> for CertificateSerialNumber {
    fn from(inner: Integer) -> Self {
        Self { inner }
    }
}

impl std::fmt::Display for CertificateSerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Deref for CertificateSerialNumber {
    type Target = Integer;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DecodableFrom<Element> for CertificateSerialNumber {}

impl Decoder<Element, CertificateSerialNumber> for Element {
    type Error = Error;

    fn decode(&self) -> Result<CertificateSerialNumber> {
        match self {
            Element::Integer(i) => Ok(CertificateSerialNumber { inner: i.clone() }),
            _ => Err(Error::CertificateSerialNumberExpectedInteger),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        vec![0x1f, 0x2e, 0x3d, 0x4c, 0x5b, 0x6a, 0x79, 0x88, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
        "41446156801443023912721098318763773423",
        "1F2E3D4C5B6A79880123456789ABCDEF"
    )]
    #[case(vec![0x10, 0x92], "4242", "1092")]
    #[case(vec![0x00, 0xff], "255", "FF")]
    fn test_certificate_serial_number(
        #[case] bytes: Vec<u8>,
        #[case] decimal: &str,
        #[case] hex: &str,
    ) {
        let serial: CertificateSerialNumber = Element::Integer(Integer::from(bytes)).decode().unwrap();
        assert_eq!(decimal, serial.to_string());
        assert_eq!(hex, serial.to_hex());
        assert_eq!(format!(r#""{decimal}""#), serde_json::to_string(&serial).unwrap());
    }

    #[test]
    fn test_certificate_serial_number_format_hex() {
        let serial = CertificateSerialNumber::from_bytes(vec![0x48, 0xc3, 0x54, 0x8e]);
        assert_eq!("48:c3:54:8e", serial.format_hex());
    }

    #[test]
    fn test_certificate_serial_number_expected_integer() {
        let result: Result<CertificateSerialNumber> = Element::Null.decode();
        assert!(matches!(result, Err(Error::CertificateSerialNumberExpectedInteger)));
    }
}
