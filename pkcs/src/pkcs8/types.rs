use asn1::{ASN1Object, BitString, Element, Integer, ObjectIdentifier, OctetString};
use certmatch::decoder::{DecodableFrom, Decoder};
use certmatch::encoder::{EncodableTo, Encoder};
use der::{Der, Tlv};
use pem::{Label, Pem, ToPem};
use pkix_types::{AlgorithmIdentifier, AlgorithmParameters};
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::Result;
use super::error::Error;
use crate::pkcs1::RSAPrivateKey;

/*
RFC 5958 - Asymmetric Key Packages

OneAsymmetricKey ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
    privateKey                PrivateKey,
    attributes            [0] Attributes OPTIONAL,
    ...,
    [[2: publicKey        [1] PublicKey OPTIONAL ]],
    ...
}

PrivateKeyInfo ::= OneAsymmetricKey

Version ::= INTEGER { v1(0), v2(1) } (v1, ..., v2)

PrivateKey ::= OCTET STRING

PublicKey ::= BIT STRING
*/

/// PKCS#8 OneAsymmetricKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    /// Version 1 (no public key)
    V1 = 0,
    /// Version 2 (with public key)
    V2 = 1,
}

impl TryFrom<i64> for Version {
    type Error = Error;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::V1),
            1 => Ok(Version::V2),
            _ => Err(Error::InvalidVersion(value)),
        }
    }
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as i64)
    }
}

/// PrivateKeyInfo (OneAsymmetricKey)
///
/// The attributes field is skipped on decode. The private key octets are
/// wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyInfo {
    #[zeroize(skip)]
    pub version: Version,
    #[zeroize(skip)]
    pub private_key_algorithm: AlgorithmIdentifier,
    pub private_key: OctetString,
    #[zeroize(skip)]
    pub public_key: Option<BitString>,
}

impl std::fmt::Debug for PrivateKeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyInfo")
            .field("version", &self.version)
            .field("private_key_algorithm", &self.private_key_algorithm)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl PrivateKeyInfo {
    /// Wraps an RSA key as a version 1 PrivateKeyInfo.
    pub fn from_rsa(key: &RSAPrivateKey) -> Result<Self> {
        let mut der = key.to_der()?;
        let algorithm = ObjectIdentifier::new(vec![1, 2, 840, 113549, 1, 1, 1])?;
        Ok(PrivateKeyInfo {
            version: Version::V1,
            private_key_algorithm: AlgorithmIdentifier::new_with_params(
                algorithm,
                AlgorithmParameters::Null,
            ),
            private_key: OctetString::from(std::mem::take(&mut *der)),
            public_key: None,
        })
    }

    /// Decodes the inner key. Only rsaEncryption and RSASSA-PSS keys are
    /// supported.
    pub fn rsa_private_key(&self) -> Result<RSAPrivateKey> {
        if !self.private_key_algorithm.is_rsa() {
            return Err(Error::UnsupportedKeyAlgorithm(
                self.private_key_algorithm.name(),
            ));
        }
        let key: RSAPrivateKey = self.private_key.as_bytes().decode()?;
        Ok(key)
    }

    /// DER encoding, wiped when dropped.
    pub fn to_der(&self) -> Result<Zeroizing<Vec<u8>>> {
        let element = Zeroizing::new(Encoder::<PrivateKeyInfo, Element>::encode(self)?);
        let tlv: Zeroizing<Tlv> = Zeroizing::new(element.encode()?);
        Ok(Zeroizing::new(tlv.encode()?))
    }
}

impl DecodableFrom<Element> for PrivateKeyInfo {}

impl Decoder<Element, PrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };

        let [version, algorithm, private_key, optional @ ..] = elements.as_slice() else {
            return Err(Error::InvalidElementCount {
                expected: "at least 3",
                actual: elements.len(),
            });
        };

        let Element::Integer(version) = version else {
            return Err(Error::ExpectedInteger { field: "version" });
        };
        let version = version
            .to_i64()
            .ok_or(Error::OutOfRange("version"))
            .and_then(Version::try_from)?;

        let Element::OctetString(private_key) = private_key else {
            return Err(Error::ExpectedOctetString {
                field: "privateKey",
            });
        };

        let public_key = optional
            .iter()
            .find_map(|element| match element {
                Element::ContextSpecific {
                    slot: 1, element, ..
                } => match element.as_ref() {
                    Element::OctetString(bits) => Some(BitString::try_from(bits.as_bytes())),
                    _ => None,
                },
                _ => None,
            })
            .transpose()?;

        Ok(PrivateKeyInfo {
            version,
            private_key_algorithm: algorithm.decode()?,
            private_key: private_key.clone(),
            public_key,
        })
    }
}

impl EncodableTo<PrivateKeyInfo> for Element {}

impl Encoder<PrivateKeyInfo, Element> for PrivateKeyInfo {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![
            Element::Integer(Integer::from(self.version)),
            self.private_key_algorithm.encode()?,
            Element::OctetString(self.private_key.clone()),
        ];
        if let Some(public_key) = &self.public_key {
            let mut content = Vec::with_capacity(public_key.as_bytes().len() + 1);
            content.push(public_key.unused_bits());
            content.extend_from_slice(public_key.as_bytes());
            elements.push(Element::ContextSpecific {
                slot: 1,
                constructed: false,
                element: Box::new(Element::OctetString(OctetString::from(content))),
            });
        }
        Ok(Element::Sequence(elements))
    }
}

impl DecodableFrom<&[u8]> for PrivateKeyInfo {}

/// Decodes DER, wiping the intermediate trees.
impl Decoder<&[u8], PrivateKeyInfo> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
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

impl DecodableFrom<Pem> for PrivateKeyInfo {}

impl Decoder<Pem, PrivateKeyInfo> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<PrivateKeyInfo> {
        if *self.label() != Label::PrivateKey {
            return Err(Error::UnexpectedKeyFormat {
                expected: "PRIVATE KEY",
            });
        }
        self.data().decode()
    }
}

impl ToPem for PrivateKeyInfo {
    type Error = Error;

    fn pem_label(&self) -> Label {
        Label::PrivateKey
    }

    fn to_pem(&self) -> Result<Pem> {
        let mut der = self.to_der()?;
        Ok(Pem::new(self.pem_label(), std::mem::take(&mut *der)))
    }
}
