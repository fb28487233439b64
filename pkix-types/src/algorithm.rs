//! AlgorithmIdentifier type
//!
//! Defined in RFC 5280 Section 4.1.1.2

use asn1::{Element, ObjectIdentifier};
use certmatch::decoder::{DecodableFrom, Decoder};
use certmatch::encoder::{EncodableTo, Encoder};
use serde::{Serialize, ser::SerializeStruct};

use crate::OidName;
use crate::error::{Error, Result};

/// Parameters field in AlgorithmIdentifier
///
/// Wrapped in Option:
/// - None: Field not present (OPTIONAL field omitted, 0 bytes)
/// - Some(AlgorithmParameters::Null): Explicit NULL value (common for RSA)
/// - Some(AlgorithmParameters::Elm(Element)): Any other ASN.1 element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmParameters {
    /// Explicit NULL (05 00)
    Null,
    /// Any other ASN.1 element, e.g. the PBES2 parameter SEQUENCE or a CBC IV
    Elm(Element),
}

/// Algorithm Identifier
///
/// RFC 5280 Section 4.1.1.2:
/// ```asn1
/// AlgorithmIdentifier ::= SEQUENCE {
///     algorithm   OBJECT IDENTIFIER,
///     parameters  ANY DEFINED BY algorithm OPTIONAL
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<AlgorithmParameters>,
}

impl AlgorithmIdentifier {
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";
    pub const OID_MD5_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.4";
    pub const OID_SHA1_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.5";
    pub const OID_RSASSA_PSS: &'static str = "1.2.840.113549.1.1.10";
    pub const OID_SHA256_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.11";
    pub const OID_SHA384_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.12";
    pub const OID_SHA512_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.13";
    pub const OID_SHA224_WITH_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.14";
    pub const OID_EC_PUBLIC_KEY: &'static str = "1.2.840.10045.2.1";
    pub const OID_ECDSA_WITH_SHA256: &'static str = "1.2.840.10045.4.3.2";
    pub const OID_ECDSA_WITH_SHA384: &'static str = "1.2.840.10045.4.3.3";
    pub const OID_ECDSA_WITH_SHA512: &'static str = "1.2.840.10045.4.3.4";
    pub const OID_ED25519: &'static str = "1.3.101.112";

    /// Create a new AlgorithmIdentifier with algorithm OID only
    pub fn new(algorithm: ObjectIdentifier) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    pub fn new_with_params(algorithm: ObjectIdentifier, parameters: AlgorithmParameters) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }

    pub fn algorithm(&self) -> &ObjectIdentifier {
        &self.algorithm
    }

    pub fn parameters(&self) -> Option<&AlgorithmParameters> {
        self.parameters.as_ref()
    }

    /// Conventional name of the algorithm, or its dotted OID when unknown.
    pub fn name(&self) -> String {
        self.oid_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.algorithm.to_string())
    }

    /// True for rsaEncryption and RSASSA-PSS keys.
    pub fn is_rsa(&self) -> bool {
        self.algorithm == Self::OID_RSA_ENCRYPTION || self.algorithm == Self::OID_RSASSA_PSS
    }
}

impl OidName for AlgorithmIdentifier {
    fn oid_name(&self) -> Option<&'static str> {
        match self.algorithm.to_string().as_str() {
            Self::OID_RSA_ENCRYPTION => Some("rsaEncryption"),
            Self::OID_MD5_WITH_RSA_ENCRYPTION => Some("md5WithRSAEncryption"),
            Self::OID_SHA1_WITH_RSA_ENCRYPTION => Some("sha1WithRSAEncryption"),
            Self::OID_RSASSA_PSS => Some("rsassaPss"),
            Self::OID_SHA256_WITH_RSA_ENCRYPTION => Some("sha256WithRSAEncryption"),
            Self::OID_SHA384_WITH_RSA_ENCRYPTION => Some("sha384WithRSAEncryption"),
            Self::OID_SHA512_WITH_RSA_ENCRYPTION => Some("sha512WithRSAEncryption"),
            Self::OID_SHA224_WITH_RSA_ENCRYPTION => Some("sha224WithRSAEncryption"),
            Self::OID_EC_PUBLIC_KEY => Some("id-ecPublicKey"),
            Self::OID_ECDSA_WITH_SHA256 => Some("ecdsa-with-SHA256"),
            Self::OID_ECDSA_WITH_SHA384 => Some("ecdsa-with-SHA384"),
            Self::OID_ECDSA_WITH_SHA512 => Some("ecdsa-with-SHA512"),
            Self::OID_ED25519 => Some("ED25519"),
            _ => None,
        }
    }
}

impl Serialize for AlgorithmIdentifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AlgorithmIdentifier", 2)?;
        state.serialize_field("algorithm", &self.algorithm)?;
        state.serialize_field("name", &self.name())?;
        state.end()
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let Element::Sequence(elements) = self else {
            return Err(Error::AlgorithmIdentifierExpectedSequence);
        };

        match elements.as_slice() {
            [Element::ObjectIdentifier(oid)] => Ok(AlgorithmIdentifier::new(oid.clone())),
            [Element::ObjectIdentifier(oid), params] => {
                let parameters = match params {
                    Element::Null => AlgorithmParameters::Null,
                    other => AlgorithmParameters::Elm(other.clone()),
                };
                Ok(AlgorithmIdentifier::new_with_params(oid.clone(), parameters))
            }
            [_] | [_, _] => Err(Error::AlgorithmIdentifierExpectedOid),
            _ => Err(Error::AlgorithmIdentifierInvalidElementCount(elements.len())),
        }
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![Element::ObjectIdentifier(self.algorithm.clone())];
        if let Some(params) = &self.parameters {
            elements.push(match params {
                AlgorithmParameters::Null => Element::Null,
                AlgorithmParameters::Elm(elm) => elm.clone(),
            });
        }

        Ok(Element::Sequence(elements))
    }
}
