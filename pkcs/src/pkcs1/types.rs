use std::fmt;

use asn1::{ASN1Object, Element, Integer};
use certmatch::decoder::{DecodableFrom, Decoder};
use certmatch::encoder::{EncodableTo, Encoder};
use der::{Der, Tlv};
use num_bigint::BigUint;
use pem::{Label, Pem, ToPem};
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::error::{Error, Result};

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}

Version ::= INTEGER { two-prime(0), multi(1) }
    (CONSTRAINED BY {-- version must be multi if otherPrimeInfos present --})
*/

/// PKCS#1 RSAPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    TwoPrime = 0,
    Multi = 1,
}

impl From<Version> for i64 {
    fn from(v: Version) -> Self {
        v as i64
    }
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as i64)
    }
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Version::TwoPrime),
            1 => Ok(Version::Multi),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

impl DecodableFrom<Element> for Version {}

impl Decoder<Element, Version> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Version> {
        let Element::Integer(int) = self else {
            return Err(Error::ExpectedInteger { field: "version" });
        };
        let value = int.to_i64().ok_or(Error::InvalidVersion(-1))?;
        Version::try_from(value)
    }
}

/// PKCS#1 RSA private key.
///
/// Every component is wiped when the key is dropped. The type is neither
/// `Clone` nor `Serialize`, and its `Debug` output only names the key size.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RSAPrivateKey {
    #[zeroize(skip)]
    pub version: Version,
    pub modulus: Integer,          // n
    pub public_exponent: Integer,  // e
    pub private_exponent: Integer, // d
    pub prime1: Integer,           // p
    pub prime2: Integer,           // q
    pub exponent1: Integer,        // d mod (p-1)
    pub exponent2: Integer,        // d mod (q-1)
    pub coefficient: Integer,      // (inverse of q) mod p
}

impl RSAPrivateKey {
    fn empty(version: Version) -> Self {
        RSAPrivateKey {
            version,
            modulus: Integer::from(0),
            public_exponent: Integer::from(0),
            private_exponent: Integer::from(0),
            prime1: Integer::from(0),
            prime2: Integer::from(0),
            exponent1: Integer::from(0),
            exponent2: Integer::from(0),
            coefficient: Integer::from(0),
        }
    }

    /// RSA modulus bit length.
    pub fn key_size(&self) -> u32 {
        self.modulus.bits() as u32
    }

    /// The public half, (n, e).
    pub fn public_key(&self) -> RSAPublicKey {
        RSAPublicKey {
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
        }
    }

    /// DER encoding of the key, wiped when dropped.
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let element = Zeroizing::new(Encoder::<RSAPrivateKey, Element>::encode(self)?);
        let tlv: Zeroizing<Tlv> = Zeroizing::new(element.encode()?);
        Ok(Zeroizing::new(tlv.encode()?))
    }
}

impl fmt::Debug for RSAPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RSAPrivateKey")
            .field("version", &self.version)
            .field("key_size", &self.key_size())
            .finish_non_exhaustive()
    }
}

fn integer(element: &Element, field: &'static str) -> Result<Integer> {
    match element {
        Element::Integer(int) => Ok(int.clone()),
        _ => Err(Error::ExpectedInteger { field }),
    }
}

fn non_negative(element: &Element, field: &'static str) -> Result<Integer> {
    let int = integer(element, field)?;
    if int.is_negative() {
        return Err(Error::NegativeInteger { field });
    }
    Ok(int)
}

impl DecodableFrom<Element> for RSAPrivateKey {}

impl Decoder<Element, RSAPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };

        match elements.as_slice() {
            [version, n, e, d, p, q, dp, dq, qinv, other @ ..] if other.len() <= 1 => {
                let version: Version = version.decode()?;
                if version == Version::TwoPrime && !other.is_empty() {
                    return Err(Error::UnexpectedOtherPrimeInfos);
                }
                // filled in place so a failure part way through still wipes the copies
                let mut key = RSAPrivateKey::empty(version);
                key.modulus = non_negative(n, "modulus")?;
                key.public_exponent = non_negative(e, "publicExponent")?;
                key.private_exponent = integer(d, "privateExponent")?;
                key.prime1 = integer(p, "prime1")?;
                key.prime2 = integer(q, "prime2")?;
                key.exponent1 = integer(dp, "exponent1")?;
                key.exponent2 = integer(dq, "exponent2")?;
                key.coefficient = integer(qinv, "coefficient")?;
                Ok(key)
            }
            _ => Err(Error::InvalidElementCount {
                expected: "9 or 10",
                actual: elements.len(),
            }),
        }
    }
}

impl EncodableTo<RSAPrivateKey> for Element {}

impl Encoder<RSAPrivateKey, Element> for RSAPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(Integer::from(self.version)),
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
            Element::Integer(self.private_exponent.clone()),
            Element::Integer(self.prime1.clone()),
            Element::Integer(self.prime2.clone()),
            Element::Integer(self.exponent1.clone()),
            Element::Integer(self.exponent2.clone()),
            Element::Integer(self.coefficient.clone()),
        ]))
    }
}

impl DecodableFrom<&[u8]> for RSAPrivateKey {}

/// Decodes a DER encoded RSAPrivateKey, wiping the intermediate trees.
impl Decoder<&[u8], RSAPrivateKey> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        let der: Zeroizing<Der> = Zeroizing::new(self.decode()?);
        let asn1_obj: Zeroizing<ASN1Object> = Zeroizing::new(der.decode()?);
        match asn1_obj.elements() {
            [element] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
            elements => Err(Error::InvalidElementCount {
                expected: "1 top level",
                actual: elements.len(),
            }),
        }
    }
}

impl DecodableFrom<Pem> for RSAPrivateKey {}

/// Unencrypted `RSA PRIVATE KEY` blocks only. Blocks carrying legacy
/// encryption headers go through [`crate::LegacyRsaDecryptor`].
impl Decoder<Pem, RSAPrivateKey> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        if *self.label() != Label::RSAPrivateKey || self.header("Proc-Type").is_some() {
            return Err(Error::UnexpectedKeyFormat {
                expected: "unencrypted RSA PRIVATE KEY",
            });
        }
        self.data().decode()
    }
}

impl ToPem for RSAPrivateKey {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::RSAPrivateKey
    }

    fn to_pem(&self) -> Result<Pem> {
        let mut der = self.to_der()?;
        Ok(Pem::new(self.pem_label(), std::mem::take(&mut *der)))
    }
}

/*
RFC 8017 - RSA Public Key

RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e
}
*/

/// PKCS#1 RSA public key. Both integers serialize as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RSAPublicKey {
    pub modulus: Integer,         // n
    pub public_exponent: Integer, // e
}

impl RSAPublicKey {
    /// RSA modulus bit length.
    pub fn key_size(&self) -> u32 {
        self.modulus.bits() as u32
    }

    /// (n, e) as unsigned big integers. Decoding rejects negative values, so
    /// this is only `None` for keys assembled by hand.
    pub fn to_biguints(&self) -> Option<(BigUint, BigUint)> {
        Some((self.modulus.to_biguint()?, self.public_exponent.to_biguint()?))
    }
}

impl DecodableFrom<Element> for RSAPublicKey {}

impl Decoder<Element, RSAPublicKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };

        match elements.as_slice() {
            [n, e] => Ok(RSAPublicKey {
                modulus: non_negative(n, "modulus")?,
                public_exponent: non_negative(e, "publicExponent")?,
            }),
            _ => Err(Error::InvalidElementCount {
                expected: "2",
                actual: elements.len(),
            }),
        }
    }
}

impl EncodableTo<RSAPublicKey> for Element {}

impl Encoder<RSAPublicKey, Element> for RSAPublicKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
        ]))
    }
}

impl DecodableFrom<&[u8]> for RSAPublicKey {}

impl Decoder<&[u8], RSAPublicKey> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        let der: Der = self.decode()?;
        let asn1_obj: ASN1Object = der.decode()?;
        match asn1_obj.elements() {
            [element] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
            elements => Err(Error::InvalidElementCount {
                expected: "1 top level",
                actual: elements.len(),
            }),
        }
    }
}

impl DecodableFrom<Pem> for RSAPublicKey {}

impl Decoder<Pem, RSAPublicKey> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        if *self.label() != Label::RSAPublicKey {
            return Err(Error::UnexpectedKeyFormat {
                expected: "RSA PUBLIC KEY",
            });
        }
        self.data().decode()
    }
}

impl ToPem for RSAPublicKey {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::RSAPublicKey
    }

    fn to_pem(&self) -> Result<Pem> {
        let element = Encoder::<RSAPublicKey, Element>::encode(self)?;
        let tlv: Tlv = element.encode()?;
        Ok(Pem::new(self.pem_label(), tlv.encode()?))
    }
}
