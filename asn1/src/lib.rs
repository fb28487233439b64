use std::{fmt::Display, str::FromStr};

use certmatch::decoder::{DecodableFrom, Decoder};
use certmatch::encoder::{EncodableTo, Encoder};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use der::{Der, PrimitiveTag, Tag, Tlv};
use error::{Error, Result};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, Zeroizing};

pub mod error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }
}

impl Zeroize for ASN1Object {
    fn zeroize(&mut self) {
        self.elements.zeroize();
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;

    fn decode(&self) -> Result<ASN1Object> {
        let elements = decode_elements(self.elements())?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der> {
        let tlvs = self
            .elements
            .iter()
            .map(Tlv::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Der::new(tlvs))
    }
}

/// A decoded ASN.1 value.
///
/// Times are normalized to UTC. Every character string type decodes to a
/// Rust `String`; the variant records which universal type carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Boolean(bool),
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    UTF8String(String),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    PrintableString(String),
    TeletexString(String),
    IA5String(String),
    UTCTime(DateTime<Utc>),
    GeneralizedTime(DateTime<Utc>),
    UniversalString(String),
    BMPString(String),
    /// A context-specific tag.
    ///
    /// Constructed tags hold their single inner element (EXPLICIT tagging).
    /// Primitive tags hold their raw contents as an OctetString (IMPLICIT
    /// tagging), leaving interpretation to the caller.
    ContextSpecific {
        slot: u32,
        constructed: bool,
        element: Box<Element>,
    },
    /// Anything without a typed representation, kept as the raw TLV.
    Unimplemented(Tlv),
}

impl Zeroize for Element {
    fn zeroize(&mut self) {
        match self {
            Element::Integer(integer) => integer.zeroize(),
            Element::BitString(bit_string) => bit_string.zeroize(),
            Element::OctetString(octet_string) => octet_string.zeroize(),
            Element::UTF8String(s)
            | Element::PrintableString(s)
            | Element::TeletexString(s)
            | Element::IA5String(s)
            | Element::UniversalString(s)
            | Element::BMPString(s) => s.zeroize(),
            Element::Sequence(elements) | Element::Set(elements) => elements.zeroize(),
            Element::ContextSpecific { element, .. } => element.as_mut().zeroize(),
            Element::Unimplemented(tlv) => tlv.zeroize(),
            Element::Boolean(_)
            | Element::Null
            | Element::ObjectIdentifier(_)
            | Element::UTCTime(_)
            | Element::GeneralizedTime(_) => {}
        }
    }
}

fn decode_elements(tlvs: &[Tlv]) -> Result<Vec<Element>> {
    // elements decoded before a failing sibling are wiped on the error path
    let mut elements = Zeroizing::new(Vec::with_capacity(tlvs.len()));
    for tlv in tlvs {
        elements.push(Element::try_from(tlv)?);
    }
    Ok(std::mem::take(&mut *elements))
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self> {
        match tlv.tag() {
            Tag::Primitive(primitive_tag, _) => match (primitive_tag, tlv.tlvs()) {
                (PrimitiveTag::Sequence, Some(tlvs)) => Ok(Element::Sequence(decode_elements(tlvs)?)),
                (PrimitiveTag::Set, Some(tlvs)) => Ok(Element::Set(decode_elements(tlvs)?)),
                (_, Some(_)) => Ok(Element::Unimplemented(tlv.clone())),
                (primitive_tag, None) => {
                    decode_primitive(primitive_tag, tlv.data().unwrap_or_default(), tlv)
                }
            },
            Tag::ContextSpecific { slot, constructed } => match tlv.value() {
                der::Value::Tlv(tlvs) => match tlvs.as_slice() {
                    [inner] => Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: *constructed,
                        element: Box::new(Element::try_from(inner)?),
                    }),
                    // IMPLICIT SET OF and friends have no single inner element
                    _ => Ok(Element::Unimplemented(tlv.clone())),
                },
                der::Value::Data(data) => Ok(Element::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                    element: Box::new(Element::OctetString(OctetString::from(data.as_slice()))),
                }),
            },
            Tag::Application { .. } | Tag::Private { .. } => Ok(Element::Unimplemented(tlv.clone())),
        }
    }
}

fn decode_primitive(tag: &PrimitiveTag, data: &[u8], tlv: &Tlv) -> Result<Element> {
    match tag {
        PrimitiveTag::Boolean => match data {
            [0x00] => Ok(Element::Boolean(false)),
            [0xff] => Ok(Element::Boolean(true)),
            _ => Err(Error::InvalidBoolean),
        },
        PrimitiveTag::Integer => {
            if data.is_empty() {
                return Err(Error::IntegerNoData);
            }
            Ok(Element::Integer(Integer::from(data)))
        }
        PrimitiveTag::BitString => Ok(Element::BitString(BitString::try_from(data)?)),
        PrimitiveTag::OctetString => Ok(Element::OctetString(OctetString::from(data))),
        PrimitiveTag::Null => Ok(Element::Null),
        PrimitiveTag::ObjectIdentifier => {
            Ok(Element::ObjectIdentifier(ObjectIdentifier::try_from(data)?))
        }
        PrimitiveTag::UTF8String => std::str::from_utf8(data)
            .map(|s| Element::UTF8String(s.to_string()))
            .map_err(|_| Error::Utf8StringInvalidUtf8),
        PrimitiveTag::PrintableString => Ok(Element::PrintableString(decode_ascii(data))),
        PrimitiveTag::IA5String => Ok(Element::IA5String(decode_ascii(data))),
        PrimitiveTag::TeletexString => Ok(Element::TeletexString(decode_latin1(data))),
        PrimitiveTag::BMPString => Ok(Element::BMPString(decode_bmp_string(data)?)),
        PrimitiveTag::UniversalString => {
            Ok(Element::UniversalString(decode_universal_string(data)?))
        }
        PrimitiveTag::UTCTime => Ok(Element::UTCTime(parse_utc_time(data)?)),
        PrimitiveTag::GeneralizedTime => {
            Ok(Element::GeneralizedTime(parse_generalized_time(data)?))
        }
        // a primitive encoding of SEQUENCE or SET is not valid DER
        PrimitiveTag::Sequence | PrimitiveTag::Set | PrimitiveTag::Unimplemented(_) => {
            Ok(Element::Unimplemented(tlv.clone()))
        }
    }
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        let primitive = |tag: PrimitiveTag, data: Vec<u8>| -> Result<Tlv> {
            Ok(Tlv::new_primitive(Tag::universal(tag), data))
        };
        match element {
            Element::Boolean(b) => primitive(PrimitiveTag::Boolean, vec![if *b { 0xff } else { 0x00 }]),
            Element::Integer(integer) => primitive(PrimitiveTag::Integer, integer.as_bytes().to_vec()),
            Element::BitString(bit_string) => {
                let mut data = Vec::with_capacity(bit_string.as_bytes().len() + 1);
                data.push(bit_string.unused_bits());
                data.extend_from_slice(bit_string.as_bytes());
                primitive(PrimitiveTag::BitString, data)
            }
            Element::OctetString(octet_string) => {
                primitive(PrimitiveTag::OctetString, octet_string.as_bytes().to_vec())
            }
            Element::Null => primitive(PrimitiveTag::Null, vec![]),
            Element::ObjectIdentifier(oid) => {
                primitive(PrimitiveTag::ObjectIdentifier, Vec::try_from(oid)?)
            }
            Element::UTF8String(s) => primitive(PrimitiveTag::UTF8String, s.as_bytes().to_vec()),
            Element::PrintableString(s) => {
                primitive(PrimitiveTag::PrintableString, s.as_bytes().to_vec())
            }
            Element::IA5String(s) => primitive(PrimitiveTag::IA5String, s.as_bytes().to_vec()),
            Element::TeletexString(s) => primitive(PrimitiveTag::TeletexString, encode_latin1(s)?),
            Element::BMPString(s) => primitive(
                PrimitiveTag::BMPString,
                s.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            ),
            Element::UniversalString(s) => primitive(
                PrimitiveTag::UniversalString,
                s.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
            ),
            Element::UTCTime(dt) => primitive(PrimitiveTag::UTCTime, format_utc_time(dt)?),
            Element::GeneralizedTime(dt) => {
                primitive(PrimitiveTag::GeneralizedTime, format_generalized_time(dt))
            }
            Element::Sequence(elements) | Element::Set(elements) => {
                let tag = match element {
                    Element::Set(_) => PrimitiveTag::Set,
                    _ => PrimitiveTag::Sequence,
                };
                let tlvs = elements
                    .iter()
                    .map(Tlv::try_from)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Tlv::new_constructed(Tag::universal(tag), tlvs))
            }
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                };
                if *constructed {
                    return Ok(Tlv::new_constructed(tag, vec![Tlv::try_from(element.as_ref())?]));
                }
                match element.as_ref() {
                    Element::OctetString(octet_string) => {
                        Ok(Tlv::new_primitive(tag, octet_string.as_bytes().to_vec()))
                    }
                    other => {
                        let inner = Tlv::try_from(other)?;
                        let data = inner.data().ok_or(Error::ElementCannotEncode(
                            "implicit tag around a constructed element",
                        ))?;
                        Ok(Tlv::new_primitive(tag, data.to_vec()))
                    }
                }
            }
            Element::Unimplemented(tlv) => Ok(tlv.clone()),
        }
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        Tlv::try_from(self)
    }
}

/// An ASN.1 INTEGER of arbitrary size.
///
/// Held as minimal big-endian two's complement bytes so that private key
/// components can be zeroized in place. Equality is value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Zeroize)]
pub struct Integer {
    bytes: Vec<u8>,
}

impl Integer {
    pub fn from_signed_bytes_be(bytes: &[u8]) -> Self {
        Integer {
            bytes: normalize_signed(bytes.to_vec()),
        }
    }

    /// Treats `bytes` as an unsigned magnitude.
    pub fn from_unsigned_bytes_be(bytes: &[u8]) -> Self {
        let mut buf = Vec::with_capacity(bytes.len() + 1);
        buf.push(0x00);
        buf.extend_from_slice(bytes);
        Integer {
            bytes: normalize_signed(buf),
        }
    }

    /// Minimal two's complement encoding, as written in DER.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_negative(&self) -> bool {
        self.bytes.first().is_some_and(|b| b & 0x80 != 0)
    }

    /// Big-endian magnitude without the sign octet, `None` for negative values.
    pub fn magnitude_bytes(&self) -> Option<&[u8]> {
        if self.is_negative() {
            return None;
        }
        match self.bytes.as_slice() {
            [0x00, rest @ ..] if !rest.is_empty() => Some(rest),
            bytes => Some(bytes),
        }
    }

    pub fn to_bigint(&self) -> BigInt {
        BigInt::from_signed_bytes_be(&self.bytes)
    }

    pub fn to_biguint(&self) -> Option<BigUint> {
        self.magnitude_bytes().map(BigUint::from_bytes_be)
    }

    /// Number of significant bits in the magnitude.
    pub fn bits(&self) -> u64 {
        self.to_bigint().bits()
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.to_bigint().to_u32()
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.to_bigint().to_u64()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_bigint().to_i64()
    }

    /// Uppercase hex of the magnitude. Negative values render their two's
    /// complement octets.
    pub fn to_hex(&self) -> String {
        self.magnitude_bytes()
            .unwrap_or(&self.bytes)
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect()
    }
}

fn normalize_signed(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.is_empty() {
        bytes.push(0x00);
        return bytes;
    }
    let redundant = bytes
        .windows(2)
        .take_while(|w| (w[0] == 0x00 && w[1] & 0x80 == 0) || (w[0] == 0xff && w[1] & 0x80 != 0))
        .count();
    if redundant > 0 {
        bytes.copy_within(redundant.., 0);
        let len = bytes.len() - redundant;
        bytes[len..].zeroize();
        bytes.truncate(len);
    }
    bytes
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_bigint().to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer::from(&value))
    }
}

impl From<&[u8]> for Integer {
    fn from(value: &[u8]) -> Self {
        Integer::from_signed_bytes_be(value)
    }
}

impl From<Vec<u8>> for Integer {
    fn from(value: Vec<u8>) -> Self {
        Integer {
            bytes: normalize_signed(value),
        }
    }
}

impl From<&BigInt> for Integer {
    fn from(value: &BigInt) -> Self {
        Integer {
            bytes: normalize_signed(value.to_signed_bytes_be()),
        }
    }
}

impl From<&BigUint> for Integer {
    fn from(value: &BigUint) -> Self {
        Integer::from(&BigInt::from_biguint(Sign::Plus, value.clone()))
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer::from(&BigInt::from(value))
    }
}

impl TryFrom<&Integer> for u64 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value.to_u64().ok_or(Error::IntegerOutOfRange("u64"))
    }
}

impl TryFrom<&Integer> for u32 {
    type Error = Error;

    fn try_from(value: &Integer) -> Result<Self> {
        value.to_u32().ok_or(Error::IntegerOutOfRange("u32"))
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_bigint())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn new(components: Vec<u64>) -> Result<Self> {
        validate_arcs(&components)?;
        Ok(ObjectIdentifier { inner: components })
    }

    pub fn components(&self) -> &[u64] {
        &self.inner
    }
}

fn validate_arcs(components: &[u64]) -> Result<()> {
    match components {
        [first, second, ..] if (*first < 2 && *second < 40) || *first == 2 => Ok(()),
        [first, second, ..] => Err(Error::ObjectIdentifierInvalidArcs(*first, *second)),
        _ => Err(Error::ObjectIdentifierTooFewComponents),
    }
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectIdentifier {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectIdentifier::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut subidentifiers = Vec::new();
        let mut current = 0u64;
        let mut pending = false;
        for &b in value {
            if current > (u64::MAX >> 7) {
                return Err(Error::ObjectIdentifierOverflow);
            }
            current = (current << 7) | u64::from(b & 0x7f);
            pending = b & 0x80 != 0;
            if !pending {
                subidentifiers.push(current);
                current = 0;
            }
        }
        if pending {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // the first subidentifier packs the two leading arcs
        let (first, rest) = subidentifiers
            .split_first()
            .ok_or(Error::ObjectIdentifierIncompleteEncoding)?;
        let (arc0, arc1) = match *first {
            0..=39 => (0, *first),
            40..=79 => (1, first - 40),
            _ => (2, first - 80),
        };
        let mut inner = Vec::with_capacity(subidentifiers.len() + 1);
        inner.push(arc0);
        inner.push(arc1);
        inner.extend_from_slice(rest);
        Ok(ObjectIdentifier { inner })
    }
}

impl TryFrom<&ObjectIdentifier> for Vec<u8> {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self> {
        validate_arcs(&oid.inner)?;
        let first = oid.inner[0]
            .checked_mul(40)
            .and_then(|v| v.checked_add(oid.inner[1]))
            .ok_or(Error::ObjectIdentifierOverflow)?;

        let mut result = Vec::with_capacity(oid.inner.len() * 2);
        write_base128(first, &mut result);
        for v in &oid.inner[2..] {
            write_base128(*v, &mut result);
        }
        Ok(result)
    }
}

fn write_base128(mut value: u64, out: &mut Vec<u8>) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7f) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        out.push(if i == 0 { groups[i] } else { groups[i] | 0x80 });
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{s}")
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let components = s
            .split('.')
            .map(|s| s.parse::<u64>().map_err(Error::ParseInt))
            .collect::<Result<Vec<u64>>>()?;
        ObjectIdentifier::new(components)
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        other == self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Result<Self> {
        if unused > 7 || (data.is_empty() && unused != 0) {
            return Err(Error::BitStringUnusedBitsOutOfRange(unused));
        }
        Ok(BitString { unused, data })
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the total number of bits (excluding unused bits)
    pub fn bit_len(&self) -> usize {
        (self.data.len() * 8).saturating_sub(usize::from(self.unused))
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        match value.split_first() {
            Some((unused, data)) => BitString::new(*unused, data.to_vec()),
            None => Err(Error::BitStringNoData),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Zeroize)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }
}

impl TryFrom<&OctetString> for ASN1Object {
    type Error = Error;

    fn try_from(value: &OctetString) -> Result<Self> {
        let mut der: Der = value.as_bytes().decode().map_err(Error::FailedToDecodeDer)?;
        let object = der.decode();
        der.zeroize();
        object
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

// PrintableString and IA5String are ASCII subsets. Producers that put
// 8-bit text in them almost always meant Latin-1.
fn decode_ascii(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => decode_latin1(data),
    }
}

fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

fn encode_latin1(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(c).map_err(|_| Error::ElementCannotEncode("non Latin-1 TeletexString")))
        .collect()
}

fn decode_bmp_string(data: &[u8]) -> Result<String> {
    if data.len() % 2 != 0 {
        return Err(Error::BmpStringOddLength(data.len()));
    }
    let units = data.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]]));
    char::decode_utf16(units)
        .enumerate()
        .map(|(position, r)| {
            r.map_err(|e| Error::BmpStringInvalidCodePoint {
                position,
                code_point: e.unpaired_surrogate(),
            })
        })
        .collect()
}

fn decode_universal_string(data: &[u8]) -> Result<String> {
    if data.len() % 4 != 0 {
        return Err(Error::UniversalStringInvalidLength(data.len()));
    }
    data.chunks_exact(4)
        .enumerate()
        .map(|(position, c)| {
            let code_point = u32::from_be_bytes([c[0], c[1], c[2], c[3]]);
            char::from_u32(code_point).ok_or(Error::UniversalStringInvalidCodePoint {
                position,
                code_point,
            })
        })
        .collect()
}

fn parse_digits(data: &[u8], start: usize, len: usize) -> Option<u32> {
    let field = data.get(start..start + len)?;
    field.iter().try_fold(0u32, |acc, b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

/*
RFC 5280 4.1.2.5.1
   Where YY is greater than or equal to 50, the year SHALL be
   interpreted as 19YY; and

   Where YY is less than 50, the year SHALL be interpreted as 20YY.
*/
fn parse_utc_time(data: &[u8]) -> Result<DateTime<Utc>> {
    let invalid = || Error::UtcTimeInvalidFormat;
    let yy = parse_digits(data, 0, 2).ok_or_else(invalid)?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    let month = parse_digits(data, 2, 2).ok_or_else(invalid)?;
    let day = parse_digits(data, 4, 2).ok_or_else(invalid)?;
    let hour = parse_digits(data, 6, 2).ok_or_else(invalid)?;
    let minute = parse_digits(data, 8, 2).ok_or_else(invalid)?;
    // seconds are optional in BER UTCTime
    let (second, zone) = match parse_digits(data, 10, 2) {
        Some(second) => (second, 12),
        None => (0, 10),
    };

    let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)?;
    data.get(zone..)
        .and_then(|zone| apply_zone(naive, zone))
        .ok_or_else(invalid)
}

fn parse_generalized_time(data: &[u8]) -> Result<DateTime<Utc>> {
    let invalid = || Error::GeneralizedTimeInvalidFormat;
    let year = parse_digits(data, 0, 4).ok_or_else(invalid)?;
    let month = parse_digits(data, 4, 2).ok_or_else(invalid)?;
    let day = parse_digits(data, 6, 2).ok_or_else(invalid)?;
    let hour = parse_digits(data, 8, 2).ok_or_else(invalid)?;
    let minute = parse_digits(data, 10, 2).ok_or_else(invalid)?;
    let second = parse_digits(data, 12, 2).ok_or_else(invalid)?;

    let mut pos = 14;
    let mut nanos = 0u32;
    if matches!(data.get(pos), Some(b'.') | Some(b',')) {
        let digits = data[pos + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            return Err(invalid());
        }
        // precision beyond nanoseconds is truncated
        let kept = digits.min(9);
        let fraction = parse_digits(data, pos + 1, kept).ok_or_else(invalid)?;
        nanos = fraction * 10u32.pow((9 - kept) as u32);
        pos += 1 + digits;
    }

    let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|d| d.and_hms_nano_opt(hour, minute, second, nanos))
        .ok_or_else(invalid)?;
    data.get(pos..)
        .and_then(|zone| apply_zone(naive, zone))
        .ok_or_else(invalid)
}

fn apply_zone(naive: NaiveDateTime, zone: &[u8]) -> Option<DateTime<Utc>> {
    match zone {
        b"Z" => Some(Utc.from_utc_datetime(&naive)),
        [sign @ (b'+' | b'-'), _, _, _, _] => {
            let hours = parse_digits(zone, 1, 2)?;
            let minutes = parse_digits(zone, 3, 2)?;
            let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
            let offset = if *sign == b'+' {
                FixedOffset::east_opt(seconds)?
            } else {
                FixedOffset::west_opt(seconds)?
            };
            offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn format_utc_time(dt: &DateTime<Utc>) -> Result<Vec<u8>> {
    if !(1950..=2049).contains(&dt.year()) {
        return Err(Error::ElementCannotEncode("UTCTime outside 1950-2049"));
    }
    Ok(dt.format("%y%m%d%H%M%SZ").to_string().into_bytes())
}

fn format_generalized_time(dt: &DateTime<Utc>) -> Vec<u8> {
    let mut s = dt.format("%Y%m%d%H%M%S").to_string();
    let nanos = dt.nanosecond();
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        s.push('.');
        s.push_str(fraction.trim_end_matches('0'));
    }
    s.push('Z');
    s.into_bytes()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use certmatch::decoder::Decoder;
    use certmatch::encoder::Encoder;
    use chrono::{DateTime, TimeZone, Utc};
    use der::{Der, PrimitiveTag, Tag, Tlv};
    use num_bigint::BigUint;
    use rstest::rstest;
    use zeroize::Zeroize;

    use crate::error::Error;
    use crate::{
        ASN1Object, BitString, Element, Integer, ObjectIdentifier, OctetString,
        parse_generalized_time, parse_utc_time,
    };

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[rstest(input, expected,
        case(vec![0x01], "1"),
        case(vec![0x00], "0"),
        case(vec![0x00, 0x80], "128"),
        case(vec![0xff], "-1"),
        case(vec![0xff, 0x7f], "-129"),
        case(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09], "333504890676592408951587385614406537514249")
    )]
    fn test_parse_element_integer(input: Vec<u8>, expected: &str) {
        let tlv = Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), input.clone());
        let element = Element::try_from(&tlv).unwrap();
        let Element::Integer(integer) = element else {
            panic!("expected Integer");
        };
        assert_eq!(expected, integer.to_string());
        assert_eq!(input, integer.as_bytes());
    }

    #[rstest(input, expected,
        case(vec![0x00, 0x00, 0x01], vec![0x01]),
        case(vec![0x00, 0x00, 0x80], vec![0x00, 0x80]),
        case(vec![0xff, 0xff, 0x80], vec![0x80]),
        case(vec![], vec![0x00])
    )]
    fn test_integer_normalize(input: Vec<u8>, expected: Vec<u8>) {
        assert_eq!(expected, Integer::from(input).as_bytes());
    }

    #[rstest(input, magnitude, hex,
        case(Integer::from(vec![0x00, 0x80]), Some(vec![0x80]), "80"),
        case(Integer::from(vec![0x1f, 0x2e]), Some(vec![0x1f, 0x2e]), "1F2E"),
        case(Integer::from(vec![0x00]), Some(vec![0x00]), "00"),
        case(Integer::from(-1), None, "FF")
    )]
    fn test_integer_magnitude(input: Integer, magnitude: Option<Vec<u8>>, hex: &str) {
        assert_eq!(magnitude.as_deref(), input.magnitude_bytes());
        assert_eq!(hex, input.to_hex());
    }

    #[test]
    fn test_integer_unsigned_and_bigint() {
        let integer = Integer::from_unsigned_bytes_be(&[0xc9, 0x49]);
        assert_eq!(vec![0x00, 0xc9, 0x49], integer.as_bytes());
        assert_eq!(Some(BigUint::from(0xc949u32)), integer.to_biguint());
        assert_eq!(16, integer.bits());
        assert_eq!(Some(65537), Integer::from(65537).to_u32());
        assert_eq!(None, Integer::from(-5).to_biguint());
        assert_eq!(Err(Error::IntegerOutOfRange("u32")), u32::try_from(&Integer::from(-5)));
        assert_eq!(Integer::from(&BigUint::from(0xc949u32)), integer);
    }

    #[rstest(
        input,
        expected_json,
        case(Integer::from(0), r#""0""#),
        case(Integer::from(255), r#""255""#),
        case(Integer::from(-1), r#""-1""#),
        case(Integer::from(vec![0x03, 0xd4, 0x15, 0x31, 0x8e, 0x2c, 0x57, 0x1d, 0x29, 0x05, 0xfc, 0x3e, 0x05, 0x27, 0x68, 0x9d, 0x0d, 0x09]), r#""333504890676592408951587385614406537514249""#)
    )]
    fn test_integer_serialize(input: Integer, expected_json: &str) {
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(expected_json, json);

        let deserialized: Integer = serde_json::from_str(&json).unwrap();
        assert_eq!(input, deserialized);
    }

    #[test]
    fn test_integer_zeroize() {
        let mut integer = Integer::from(vec![0x12, 0x34, 0x56]);
        integer.zeroize();
        assert!(integer.as_bytes().is_empty());
    }

    #[rstest(input, expected,
        case(vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01], "1.2.840.113549.1.1.1"),
        case(vec![0x55, 0x04, 0x03], "2.5.4.3"),
        case(vec![0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x01, 0x2a], "2.16.840.1.101.3.4.1.42"),
        case(vec![0x88, 0x37, 0x03], "2.999.3"),
        case(vec![0x2a, 0x00, 0x05], "1.2.0.5")
    )]
    fn test_object_identifier_bytes(input: Vec<u8>, expected: &str) {
        let oid = ObjectIdentifier::try_from(input.as_slice()).unwrap();
        assert_eq!(expected, oid.to_string());
        assert!(oid == expected);

        let encoded = Vec::try_from(&oid).unwrap();
        assert_eq!(input, encoded);

        let parsed = ObjectIdentifier::from_str(expected).unwrap();
        assert_eq!(oid, parsed);
    }

    #[rstest(input, expected,
        case(vec![], Error::ObjectIdentifierNoData),
        case(vec![0x2a, 0x86], Error::ObjectIdentifierIncompleteEncoding),
        case(vec![0x2a, 0x80], Error::ObjectIdentifierIncompleteEncoding),
        case(vec![0x2a, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f], Error::ObjectIdentifierOverflow)
    )]
    fn test_object_identifier_decode_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), ObjectIdentifier::try_from(input.as_slice()));
    }

    #[rstest(input, expected,
        case("1", Error::ObjectIdentifierTooFewComponents),
        case("3.1", Error::ObjectIdentifierInvalidArcs(3, 1)),
        case("1.40", Error::ObjectIdentifierInvalidArcs(1, 40))
    )]
    fn test_object_identifier_from_str_error(input: &str, expected: Error) {
        assert_eq!(Err(expected), ObjectIdentifier::from_str(input));
    }

    #[test]
    fn test_object_identifier_serde() {
        let oid = ObjectIdentifier::from_str("1.2.840.113549.1.1.11").unwrap();
        let json = serde_json::to_string(&oid).unwrap();
        assert_eq!(r#""1.2.840.113549.1.1.11""#, json);
        let back: ObjectIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(oid, back);
    }

    #[rstest(input, unused, bits,
        case(vec![0x00], 0, 0),
        case(vec![0x00, 0xff, 0x01], 0, 16),
        case(vec![0x07, 0x80], 7, 1)
    )]
    fn test_bitstring(input: Vec<u8>, unused: u8, bits: usize) {
        let bit_string = BitString::try_from(input.as_slice()).unwrap();
        assert_eq!(unused, bit_string.unused_bits());
        assert_eq!(bits, bit_string.bit_len());
    }

    #[rstest(input, expected,
        case(vec![], Error::BitStringNoData),
        case(vec![0x08, 0x00], Error::BitStringUnusedBitsOutOfRange(8)),
        case(vec![0x03], Error::BitStringUnusedBitsOutOfRange(3))
    )]
    fn test_bitstring_error(input: Vec<u8>, expected: Error) {
        assert_eq!(Err(expected), BitString::try_from(input.as_slice()));
    }

    #[rstest(input, expected,
        case("191216030210Z", utc(2019, 12, 16, 3, 2, 10)),
        case("491231235959Z", utc(2049, 12, 31, 23, 59, 59)),
        case("500101000000Z", utc(1950, 1, 1, 0, 0, 0)),
        case("991231235959Z", utc(1999, 12, 31, 23, 59, 59)),
        case("2401010000Z", utc(2024, 1, 1, 0, 0, 0)),
        case("240101093000+0930", utc(2024, 1, 1, 0, 0, 0)),
        case("231231190000-0500", utc(2024, 1, 1, 0, 0, 0))
    )]
    fn test_parse_utc_time(input: &str, expected: DateTime<Utc>) {
        assert_eq!(expected, parse_utc_time(input.as_bytes()).unwrap());
    }

    #[rstest(
        input,
        case(""),
        case("2401010000"),
        case("241301000000Z"),
        case("240101000000"),
        case("24010100000Z"),
        case("240101000000+01"),
        case("2401O1000000Z")
    )]
    fn test_parse_utc_time_error(input: &str) {
        assert_eq!(Err(Error::UtcTimeInvalidFormat), parse_utc_time(input.as_bytes()));
    }

    #[rstest(input, expected,
        case("20191216030210Z", utc(2019, 12, 16, 3, 2, 10)),
        case("20510630120000Z", utc(2051, 6, 30, 12, 0, 0)),
        case("19491231235959Z", utc(1949, 12, 31, 23, 59, 59)),
        case("20240101013000+0130", utc(2024, 1, 1, 0, 0, 0)),
        case("20240101000000.5Z", utc(2024, 1, 1, 0, 0, 0) + chrono::Duration::milliseconds(500)),
        case("20240101000000,25Z", utc(2024, 1, 1, 0, 0, 0) + chrono::Duration::milliseconds(250))
    )]
    fn test_parse_generalized_time(input: &str, expected: DateTime<Utc>) {
        assert_eq!(expected, parse_generalized_time(input.as_bytes()).unwrap());
    }

    #[rstest(input, case("2024010100Z"), case("20240101000000"), case("20240101000000.Z"), case("20240230000000Z"))]
    fn test_parse_generalized_time_error(input: &str) {
        assert_eq!(
            Err(Error::GeneralizedTimeInvalidFormat),
            parse_generalized_time(input.as_bytes())
        );
    }

    #[rstest(tag, data, expected,
        case(PrimitiveTag::UTF8String, "Compañía".as_bytes().to_vec(), Element::UTF8String("Compañía".to_string())),
        case(PrimitiveTag::PrintableString, b"MX".to_vec(), Element::PrintableString("MX".to_string())),
        case(PrimitiveTag::PrintableString, vec![0x4a, 0x6f, 0x73, 0xe9], Element::PrintableString("José".to_string())),
        case(PrimitiveTag::IA5String, b"jose@example.com".to_vec(), Element::IA5String("jose@example.com".to_string())),
        case(PrimitiveTag::TeletexString, vec![0x4d, 0xfc, 0x6c, 0x6c, 0x65, 0x72], Element::TeletexString("Müller".to_string())),
        case(PrimitiveTag::BMPString, vec![0x00, 0x4a, 0x00, 0xf6, 0x00, 0x72, 0x00, 0x67], Element::BMPString("Jörg".to_string())),
        case(PrimitiveTag::BMPString, vec![0xd8, 0x3d, 0xde, 0x0e], Element::BMPString("\u{1f60e}".to_string())),
        case(PrimitiveTag::UniversalString, vec![0x00, 0x00, 0x00, 0x41, 0x00, 0x01, 0xf6, 0x0e], Element::UniversalString("A\u{1f60e}".to_string()))
    )]
    fn test_decode_string(tag: PrimitiveTag, data: Vec<u8>, expected: Element) {
        let tlv = Tlv::new_primitive(Tag::universal(tag), data);
        assert_eq!(expected, Element::try_from(&tlv).unwrap());
    }

    #[rstest(tag, data, expected,
        case(PrimitiveTag::UTF8String, vec![0xc3, 0x28], Error::Utf8StringInvalidUtf8),
        case(PrimitiveTag::BMPString, vec![0x00, 0x41, 0x00], Error::BmpStringOddLength(3)),
        case(PrimitiveTag::BMPString, vec![0xdc, 0x00], Error::BmpStringInvalidCodePoint { position: 0, code_point: 0xdc00 }),
        case(PrimitiveTag::UniversalString, vec![0x00, 0x00, 0x41], Error::UniversalStringInvalidLength(3)),
        case(PrimitiveTag::UniversalString, vec![0x00, 0x11, 0x00, 0x00], Error::UniversalStringInvalidCodePoint { position: 0, code_point: 0x110000 }),
        case(PrimitiveTag::Boolean, vec![0x01], Error::InvalidBoolean),
        case(PrimitiveTag::Integer, vec![], Error::IntegerNoData)
    )]
    fn test_decode_primitive_error(tag: PrimitiveTag, data: Vec<u8>, expected: Error) {
        let tlv = Tlv::new_primitive(Tag::universal(tag), data);
        assert_eq!(Err(expected), Element::try_from(&tlv));
    }

    #[rstest(element, expected_tag, expected_data,
        case(Element::Boolean(true), 0x01, vec![0xff]),
        case(Element::Integer(Integer::from(128)), 0x02, vec![0x00, 0x80]),
        case(Element::Null, 0x05, vec![]),
        case(Element::TeletexString("Müller".to_string()), 0x14, vec![0x4d, 0xfc, 0x6c, 0x6c, 0x65, 0x72]),
        case(Element::BMPString("Jö".to_string()), 0x1e, vec![0x00, 0x4a, 0x00, 0xf6]),
        case(Element::UniversalString("A".to_string()), 0x1c, vec![0x00, 0x00, 0x00, 0x41]),
        case(Element::UTCTime(utc(2049, 12, 31, 23, 59, 59)), 0x17, b"491231235959Z".to_vec()),
        case(Element::GeneralizedTime(utc(2051, 6, 30, 12, 0, 0)), 0x18, b"20510630120000Z".to_vec()),
        case(Element::GeneralizedTime(utc(2024, 1, 1, 0, 0, 0) + chrono::Duration::milliseconds(250)), 0x18, b"20240101000000.25Z".to_vec())
    )]
    fn test_element_to_tlv_primitive(element: Element, expected_tag: u8, expected_data: Vec<u8>) {
        let tlv: Tlv = element.encode().unwrap();
        assert_eq!(&Tag::Primitive(PrimitiveTag::try_from(expected_tag).unwrap(), expected_tag), tlv.tag());
        assert_eq!(Some(expected_data.as_slice()), tlv.data());
    }

    #[rstest(element, expected,
        case(Element::UTCTime(utc(2050, 1, 1, 0, 0, 0)), Error::ElementCannotEncode("UTCTime outside 1950-2049")),
        case(Element::TeletexString("\u{1f60e}".to_string()), Error::ElementCannotEncode("non Latin-1 TeletexString"))
    )]
    fn test_element_to_tlv_error(element: Element, expected: Error) {
        assert_eq!(Err(expected), Tlv::try_from(&element));
    }

    #[test]
    fn test_context_specific() {
        // [0] EXPLICIT INTEGER 2, as in an X.509 version field
        let explicit: Der = vec![0xa0, 0x03, 0x02, 0x01, 0x02].decode().unwrap();
        let object: ASN1Object = explicit.decode().unwrap();
        assert_eq!(
            &Element::ContextSpecific {
                slot: 0,
                constructed: true,
                element: Box::new(Element::Integer(Integer::from(2))),
            },
            &object.elements()[0]
        );
        assert_eq!(explicit, object.encode().unwrap());

        // [1] IMPLICIT OCTET STRING
        let implicit: Der = vec![0x81, 0x02, 0xde, 0xad].decode().unwrap();
        let object: ASN1Object = implicit.decode().unwrap();
        assert_eq!(
            &Element::ContextSpecific {
                slot: 1,
                constructed: false,
                element: Box::new(Element::OctetString(OctetString::from(vec![0xde, 0xad]))),
            },
            &object.elements()[0]
        );
        assert_eq!(implicit, object.encode().unwrap());
    }

    #[rstest(
        input,
        // [0] IMPLICIT SET OF with two members
        case(vec![0xa0, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]),
        // APPLICATION 1
        case(vec![0x61, 0x03, 0x02, 0x01, 0x01]),
        // ENUMERATED
        case(vec![0x0a, 0x01, 0x01])
    )]
    fn test_unimplemented_round_trip(input: Vec<u8>) {
        let der: Der = input.decode().unwrap();
        let object: ASN1Object = der.decode().unwrap();
        assert!(matches!(object.elements()[0], Element::Unimplemented(_)));
        let encoded: Der = object.encode().unwrap();
        assert_eq!(der, encoded);
    }

    #[test]
    fn test_octet_string_to_object() {
        let octet_string = OctetString::from(vec![0x30, 0x03, 0x02, 0x01, 0x07]);
        assert_eq!("3003020107", octet_string.to_string());
        let object = ASN1Object::try_from(&octet_string).unwrap();
        assert_eq!(
            vec![Element::Sequence(vec![Element::Integer(Integer::from(7))])],
            object.elements()
        );

        let truncated = OctetString::from(vec![0x30, 0x05, 0x02]);
        assert!(matches!(
            ASN1Object::try_from(&truncated),
            Err(Error::FailedToDecodeDer(_))
        ));
    }

    #[test]
    fn test_object_zeroize() {
        let mut object = ASN1Object::new(vec![Element::Sequence(vec![
            Element::Integer(Integer::from(42)),
            Element::OctetString(OctetString::from(vec![1, 2, 3])),
        ])]);
        object.zeroize();
        assert!(object.elements().is_empty());
    }

    const CERT_A: &str = include_str!("../../testdata/cert_a.pem");
    const CERT_B: &str = include_str!("../../testdata/cert_b.pem");
    const CERT_A_GENERALIZED: &str = include_str!("../../testdata/cert_a_generalized.pem");
    const KEY_A: &str = include_str!("../../testdata/key_a_pkcs1.pem");

    #[rstest(input, case(CERT_A), case(CERT_B), case(CERT_A_GENERALIZED), case(KEY_A))]
    fn test_round_trip_pem(input: &str) {
        // PEM -> Der -> ASN1Object -> Der
        let pem: pem::Pem = input.parse().unwrap();
        let original: Der = pem.decode().unwrap();

        let object: ASN1Object = original.decode().unwrap();
        let encoded: Der = object.encode().unwrap();

        assert_eq!(original, encoded);
    }
}
