use std::fmt;

use asn1::{BitString, Element};
use certmatch::decoder::{DecodableFrom, Decoder};
use chrono::{DateTime, Utc};
use pkcs::pkcs1::RSAPublicKey;
use pkix_types::{AlgorithmIdentifier, CertificateSerialNumber, Name, SubjectPublicKeyInfo};
use serde::Serialize;

use crate::error::{Error, Result};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1

TBSCertificate  ::=  SEQUENCE  {
     version         [0]  EXPLICIT Version DEFAULT v1,
     serialNumber         CertificateSerialNumber,
     signature            AlgorithmIdentifier,
     issuer               Name,
     validity             Validity,
     subject              Name,
     subjectPublicKeyInfo SubjectPublicKeyInfo,
     issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
     subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
     extensions      [3]  EXPLICIT Extensions OPTIONAL
}

Version  ::=  INTEGER  {  v1(0), v2(1), v3(2)  }

Validity ::= SEQUENCE {
    notBefore      Time,
    notAfter       Time
}

Time ::= CHOICE {
    utcTime        UTCTime,
    generalTime    GeneralizedTime
}
*/

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    #[default]
    V1 = 0,
    V2 = 1,
    V3 = 2,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        let Element::Integer(i) = self else {
            return Err(Error::InvalidVersion("expected INTEGER".to_string()));
        };
        match i.to_i64() {
            Some(0) => Ok(Version::V1),
            Some(1) => Ok(Version::V2),
            Some(2) => Ok(Version::V3),
            _ => Err(Error::InvalidVersion(format!("unknown version value {i}"))),
        }
    }
}

/// Certificate validity window, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Validity {
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl Validity {
    /// Both bounds are inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.not_before <= at && at <= self.not_after
    }
}

fn time(element: &Element, field: &'static str) -> Result<DateTime<Utc>> {
    match element {
        Element::UTCTime(dt) | Element::GeneralizedTime(dt) => Ok(*dt),
        _ => Err(Error::InvalidValidity(field)),
    }
}

impl DecodableFrom<Element> for Validity {}

impl Decoder<Element, Validity> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Validity> {
        let Element::Sequence(elements) = self else {
            return Err(Error::InvalidValidity("expected SEQUENCE"));
        };
        let [not_before, not_after] = elements.as_slice() else {
            return Err(Error::InvalidValidity("expected 2 elements"));
        };
        Ok(Validity {
            not_before: time(not_before, "notBefore is not a time")?,
            not_after: time(not_after, "notAfter is not a time")?,
        })
    }
}

/// The signed portion of a certificate.
///
/// Unique identifiers and extensions are accepted but not kept. Only RSA
/// subject keys are supported, and the key is decoded eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TBSCertificate {
    pub version: Version,
    pub serial_number: CertificateSerialNumber,
    pub signature: AlgorithmIdentifier,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfo,
    pub public_key: RSAPublicKey,
}

fn rsa_public_key(spki: &SubjectPublicKeyInfo) -> Result<RSAPublicKey> {
    if !spki.algorithm().is_rsa() {
        return Err(Error::UnsupportedPublicKeyAlgorithm(spki.algorithm().name()));
    }
    let bits: &BitString = spki.subject_public_key();
    if bits.unused_bits() != 0 {
        return Err(Error::PublicKeyUnusedBits(bits.unused_bits()));
    }
    let key: RSAPublicKey = bits.as_bytes().decode()?;
    Ok(key)
}

impl DecodableFrom<Element> for TBSCertificate {}

impl Decoder<Element, TBSCertificate> for Element {
    type Error = Error;

    fn decode(&self) -> Result<TBSCertificate> {
        let Element::Sequence(elements) = self else {
            return Err(Error::TbsCertificateExpectedSequence);
        };

        let (version, fields) = match elements.as_slice() {
            [
                Element::ContextSpecific {
                    slot: 0, element, ..
                },
                rest @ ..,
            ] => (Decoder::<Element, Version>::decode(element.as_ref())?, rest),
            rest => (Version::default(), rest),
        };

        let [serial_number, signature, issuer, validity, subject, spki, _optional @ ..] = fields
        else {
            return Err(Error::TbsCertificateInvalidElementCount(fields.len()));
        };

        let subject_public_key_info: SubjectPublicKeyInfo = spki.decode()?;
        let public_key = rsa_public_key(&subject_public_key_info)?;

        Ok(TBSCertificate {
            version,
            serial_number: serial_number.decode()?,
            signature: signature.decode()?,
            issuer: issuer.decode()?,
            validity: validity.decode()?,
            subject: subject.decode()?,
            subject_public_key_info,
            public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asn1::{Integer, ObjectIdentifier};
    use chrono::TimeZone;
    use rstest::rstest;
    use std::str::FromStr;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[rstest]
    #[case::v1(Element::Integer(Integer::from(0)), Version::V1)]
    #[case::v2(Element::Integer(Integer::from(1)), Version::V2)]
    #[case::v3(Element::Integer(Integer::from(2)), Version::V3)]
    fn test_version_decode(#[case] input: Element, #[case] expected: Version) {
        let version: Version = input.decode().unwrap();
        assert_eq!(expected, version);
    }

    #[rstest]
    #[case::null(Element::Null)]
    #[case::too_large(Element::Integer(Integer::from(3)))]
    #[case::negative(Element::Integer(Integer::from(-1)))]
    #[case::utf8_string(Element::UTF8String("v1".to_string()))]
    fn test_version_decode_failure(#[case] input: Element) {
        let result: Result<Version> = input.decode();
        assert!(matches!(result, Err(Error::InvalidVersion(_))));
    }

    #[test]
    fn test_version_display_and_serialize() {
        assert_eq!("3", Version::V3.to_string());
        assert_eq!(r#""v3""#, serde_json::to_string(&Version::V3).unwrap());
    }

    #[rstest(
        input,
        expected,
        case(
            Element::Sequence(vec![
                Element::UTCTime(utc(2024, 1, 1, 0, 0, 0)),
                Element::UTCTime(utc(2026, 1, 1, 0, 0, 0)),
            ]),
            Validity { not_before: utc(2024, 1, 1, 0, 0, 0), not_after: utc(2026, 1, 1, 0, 0, 0) }
        ),
        case(
            Element::Sequence(vec![
                Element::UTCTime(utc(2024, 1, 1, 0, 0, 0)),
                Element::GeneralizedTime(utc(2051, 6, 30, 12, 0, 0)),
            ]),
            Validity { not_before: utc(2024, 1, 1, 0, 0, 0), not_after: utc(2051, 6, 30, 12, 0, 0) }
        )
    )]
    fn test_validity_decode(input: Element, expected: Validity) {
        let validity: Validity = input.decode().unwrap();
        assert_eq!(expected, validity);
    }

    #[rstest]
    #[case(Element::Null)]
    #[case(Element::Sequence(vec![Element::UTCTime(utc(2024, 1, 1, 0, 0, 0))]))]
    #[case(Element::Sequence(vec![
        Element::UTCTime(utc(2024, 1, 1, 0, 0, 0)),
        Element::UTF8String("2026".to_string()),
    ]))]
    fn test_validity_decode_failure(#[case] input: Element) {
        let result: Result<Validity> = input.decode();
        assert!(matches!(result, Err(Error::InvalidValidity(_))));
    }

    #[rstest]
    #[case(utc(2023, 12, 31, 23, 59, 59), false)]
    #[case(utc(2024, 1, 1, 0, 0, 0), true)]
    #[case(utc(2025, 1, 1, 0, 0, 0), true)]
    #[case(utc(2026, 1, 1, 0, 0, 0), true)]
    #[case(utc(2026, 1, 1, 0, 0, 1), false)]
    fn test_validity_contains(#[case] at: DateTime<Utc>, #[case] expected: bool) {
        let validity = Validity {
            not_before: utc(2024, 1, 1, 0, 0, 0),
            not_after: utc(2026, 1, 1, 0, 0, 0),
        };
        assert_eq!(expected, validity.contains(at));
    }

    fn algorithm(oid: &str) -> Element {
        Element::Sequence(vec![
            Element::ObjectIdentifier(ObjectIdentifier::from_str(oid).unwrap()),
            Element::Null,
        ])
    }

    fn tbs(spki: Element, with_version: bool) -> Element {
        let mut elements = Vec::new();
        if with_version {
            elements.push(Element::ContextSpecific {
                slot: 0,
                constructed: true,
                element: Box::new(Element::Integer(Integer::from(2))),
            });
        }
        elements.extend([
            Element::Integer(Integer::from(7)),
            algorithm("1.2.840.113549.1.1.11"),
            Element::Sequence(vec![]),
            Element::Sequence(vec![
                Element::UTCTime(utc(2024, 1, 1, 0, 0, 0)),
                Element::UTCTime(utc(2026, 1, 1, 0, 0, 0)),
            ]),
            Element::Sequence(vec![]),
            spki,
        ]);
        Element::Sequence(elements)
    }

    // SEQUENCE { INTEGER 195, INTEGER 65537 }
    fn rsa_spki() -> Element {
        Element::Sequence(vec![
            algorithm("1.2.840.113549.1.1.1"),
            Element::BitString(
                BitString::new(
                    0,
                    vec![0x30, 0x09, 0x02, 0x02, 0x00, 0xc3, 0x02, 0x03, 0x01, 0x00, 0x01],
                )
                .unwrap(),
            ),
        ])
    }

    #[rstest]
    #[case(true, Version::V3)]
    #[case(false, Version::V1)]
    fn test_tbs_certificate_decode(#[case] with_version: bool, #[case] expected: Version) {
        let tbs: TBSCertificate = tbs(rsa_spki(), with_version).decode().unwrap();

        assert_eq!(expected, tbs.version);
        assert_eq!("7", tbs.serial_number.to_string());
        assert_eq!("sha256WithRSAEncryption", tbs.signature.name());
        assert_eq!("", tbs.subject.to_string());
        assert_eq!("195", tbs.public_key.modulus.to_string());
        assert_eq!("65537", tbs.public_key.public_exponent.to_string());
    }

    #[test]
    fn test_tbs_certificate_rejects_non_rsa_key() {
        let spki = Element::Sequence(vec![
            Element::Sequence(vec![Element::ObjectIdentifier(
                ObjectIdentifier::from_str("1.3.101.112").unwrap(),
            )]),
            Element::BitString(BitString::new(0, vec![0u8; 32]).unwrap()),
        ]);
        let result: Result<TBSCertificate> = tbs(spki, true).decode();
        assert!(matches!(result, Err(Error::UnsupportedPublicKeyAlgorithm(name)) if name == "ED25519"));
    }

    #[rstest]
    #[case(Element::Null)]
    #[case(Element::Sequence(vec![Element::Integer(Integer::from(7))]))]
    #[case(Element::Sequence(vec![Element::ContextSpecific {
        slot: 0,
        constructed: true,
        element: Box::new(Element::Integer(Integer::from(9))),
    }]))]
    fn test_tbs_certificate_decode_failure(#[case] input: Element) {
        let result: Result<TBSCertificate> = input.decode();
        assert!(result.is_err());
    }
}
