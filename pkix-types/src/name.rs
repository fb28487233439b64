//! Name and related types
//!
//! Defined in RFC 5280 Section 4.1.2.4
//!
//! ```asn1
//! Name ::= CHOICE { -- only one possibility for now --
//!     rdnSequence  RDNSequence
//! }
//!
//! RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
//!
//! RelativeDistinguishedName ::= SET OF AttributeTypeAndValue
//!
//! AttributeTypeAndValue ::= SEQUENCE {
//!     type     AttributeType,
//!     value    AttributeValue
//! }
//!
//! AttributeType ::= OBJECT IDENTIFIER
//! AttributeValue ::= ANY -- DEFINED BY AttributeType
//! ```

use std::fmt;

use asn1::{Element, ObjectIdentifier};
use certmatch::decoder::{DecodableFrom, Decoder};
use serde::{Serialize, ser::SerializeStruct};

use crate::OidName;
use crate::directory_string::DirectoryString;
use crate::error::{Error, Result};

/// X.509 Distinguished Name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Name {
    pub rdn_sequence: Vec<RelativeDistinguishedName>,
}

impl Name {
    pub fn new(rdn_sequence: Vec<RelativeDistinguishedName>) -> Self {
        Self { rdn_sequence }
    }

    pub fn rdn_sequence(&self) -> &[RelativeDistinguishedName] {
        &self.rdn_sequence
    }

    /// Every attribute in encoded order, flattening multi-valued RDNs.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeTypeAndValue> {
        self.rdn_sequence.iter().flat_map(|rdn| rdn.attributes.iter())
    }

    /// Value of the first attribute with the given short name or dotted OID.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes()
            .find(|attr| attr.short_name() == key)
            .map(|attr| attr.value_str())
    }
}

/// Renders `"CN: value"` pairs joined by `", "` in encoded order.
/// Attributes with an empty value are left out.
impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .attributes()
            .filter(|attr| !attr.value_str().is_empty())
            .map(|attr| format!("{}: {}", attr.short_name(), attr.attribute_value))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{formatted}")
    }
}

impl DecodableFrom<Element> for Name {}

impl Decoder<Element, Name> for Element {
    type Error = Error;

    fn decode(&self) -> Result<Name> {
        let Element::Sequence(rdns) = self else {
            return Err(Error::NameExpectedSequence);
        };
        let mut rdn_sequence = Vec::with_capacity(rdns.len());
        for element in rdns {
            let rdn: RelativeDistinguishedName = element.decode()?;
            rdn_sequence.push(rdn);
        }
        Ok(Name::new(rdn_sequence))
    }
}

/// Relative Distinguished Name (RDN)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeDistinguishedName {
    pub attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new(attributes: Vec<AttributeTypeAndValue>) -> Self {
        Self { attributes }
    }
}

impl DecodableFrom<Element> for RelativeDistinguishedName {}

impl Decoder<Element, RelativeDistinguishedName> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RelativeDistinguishedName> {
        let Element::Set(members) = self else {
            return Err(Error::RdnExpectedSet);
        };
        let attributes = members
            .iter()
            .map(Decoder::<Element, AttributeTypeAndValue>::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(RelativeDistinguishedName::new(attributes))
    }
}

/// Short names used when rendering a Name, keyed by dotted OID.
/// X.520 attribute types plus emailAddress, userId and domainComponent.
const ATTRIBUTE_SHORT_NAMES: &[(&str, &str)] = &[
    ("2.5.4.3", "CN"),
    ("2.5.4.4", "SN"),
    ("2.5.4.5", "serialNumber"),
    ("2.5.4.6", "C"),
    ("2.5.4.7", "L"),
    ("2.5.4.8", "ST"),
    ("2.5.4.9", "street"),
    ("2.5.4.10", "O"),
    ("2.5.4.11", "OU"),
    ("2.5.4.12", "title"),
    ("2.5.4.17", "postalCode"),
    ("2.5.4.42", "GN"),
    ("2.5.4.46", "dnQualifier"),
    ("0.9.2342.19200300.100.1.1", "UID"),
    ("0.9.2342.19200300.100.1.25", "DC"),
    ("1.2.840.113549.1.9.1", "E"),
];

/// Attribute Type and Value pair, such as CN=example.com
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    pub attribute_type: ObjectIdentifier,
    pub attribute_value: DirectoryString,
}

impl AttributeTypeAndValue {
    pub fn new(attribute_type: ObjectIdentifier, attribute_value: DirectoryString) -> Self {
        Self {
            attribute_type,
            attribute_value,
        }
    }

    pub fn value_str(&self) -> &str {
        self.attribute_value.as_str()
    }

    /// Conventional short name, or the dotted OID for unknown types.
    pub fn short_name(&self) -> String {
        self.oid_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.attribute_type.to_string())
    }
}

impl OidName for AttributeTypeAndValue {
    fn oid_name(&self) -> Option<&'static str> {
        let oid = self.attribute_type.to_string();
        ATTRIBUTE_SHORT_NAMES
            .iter()
            .find(|(dotted, _)| *dotted == oid)
            .map(|(_, short)| *short)
    }
}

impl Serialize for AttributeTypeAndValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AttributeTypeAndValue", 2)?;
        state.serialize_field("attribute_type", &self.short_name())?;
        state.serialize_field("attribute_value", self.attribute_value.as_str())?;
        state.end()
    }
}

impl DecodableFrom<Element> for AttributeTypeAndValue {}

impl Decoder<Element, AttributeTypeAndValue> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AttributeTypeAndValue> {
        let Element::Sequence(seq) = self else {
            return Err(Error::AttributeTypeAndValueExpectedSequence);
        };

        match seq.as_slice() {
            [Element::ObjectIdentifier(oid), value] => {
                Ok(AttributeTypeAndValue::new(oid.clone(), value.decode()?))
            }
            [_, _] => Err(Error::AttributeTypeAndValueExpectedOid),
            _ => Err(Error::AttributeTypeAndValueInvalidElementCount),
        }
    }
}
