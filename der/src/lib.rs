use certmatch::decoder::{DecodableFrom, Decoder};
use certmatch::encoder::{EncodableTo, Encoder};
use nom::{IResult, Parser, number::complete::be_u8};
use pem::Pem;
use zeroize::{Zeroize, Zeroizing};

pub mod error;

use error::{Error, Result};

pub const TAG_CONSTRUCTED: u8 = 0x20;
pub const TAG_APPLICATION: u8 = 0x40;
pub const TAG_CONTEXT_SPECIFIC: u8 = 0x80;
pub const TAG_PRIVATE: u8 = 0xc0;
const TAG_CLASS_MASK: u8 = 0xc0;
const TAG_NUMBER_MASK: u8 = 0x1f;

/// Maximum nesting of constructed values accepted by the decoder.
pub const MAX_DEPTH: usize = 32;

/// Maximum number of long form length octets.
pub const MAX_LENGTH_OCTETS: usize = 4;

/// A sequence of top level TLVs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }
}

impl Zeroize for Der {
    fn zeroize(&mut self) {
        self.elements.zeroize();
    }
}

/// Universal class tag numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveTag {
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    UTF8String,
    Sequence,
    Set,
    PrintableString,
    TeletexString,
    IA5String,
    UTCTime,
    GeneralizedTime,
    UniversalString,
    BMPString,
    /// Assigned tags that are carried through undecoded: ENUMERATED and the
    /// legacy string types.
    Unimplemented(u8),
}

/// ENUMERATED, NumericString, VideotexString, GraphicString, VisibleString
/// and GeneralString.
const PASS_THROUGH_TAGS: [u8; 6] = [0x0a, 0x12, 0x15, 0x19, 0x1a, 0x1b];

impl TryFrom<u8> for PrimitiveTag {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        let tag = match number {
            0x01 => Self::Boolean,
            0x02 => Self::Integer,
            0x03 => Self::BitString,
            0x04 => Self::OctetString,
            0x05 => Self::Null,
            0x06 => Self::ObjectIdentifier,
            0x0c => Self::UTF8String,
            0x10 => Self::Sequence,
            0x11 => Self::Set,
            0x13 => Self::PrintableString,
            0x14 => Self::TeletexString,
            0x16 => Self::IA5String,
            0x17 => Self::UTCTime,
            0x18 => Self::GeneralizedTime,
            0x1c => Self::UniversalString,
            0x1e => Self::BMPString,
            n if PASS_THROUGH_TAGS.contains(&n) => Self::Unimplemented(n),
            n => return Err(Error::UnsupportedUniversalTag(u32::from(n))),
        };
        Ok(tag)
    }
}

impl From<&PrimitiveTag> for u8 {
    fn from(tag: &PrimitiveTag) -> Self {
        match tag {
            PrimitiveTag::Boolean => 0x01,
            PrimitiveTag::Integer => 0x02,
            PrimitiveTag::BitString => 0x03,
            PrimitiveTag::OctetString => 0x04,
            PrimitiveTag::Null => 0x05,
            PrimitiveTag::ObjectIdentifier => 0x06,
            PrimitiveTag::UTF8String => 0x0c,
            PrimitiveTag::Sequence => 0x10,
            PrimitiveTag::Set => 0x11,
            PrimitiveTag::PrintableString => 0x13,
            PrimitiveTag::TeletexString => 0x14,
            PrimitiveTag::IA5String => 0x16,
            PrimitiveTag::UTCTime => 0x17,
            PrimitiveTag::GeneralizedTime => 0x18,
            PrimitiveTag::UniversalString => 0x1c,
            PrimitiveTag::BMPString => 0x1e,
            PrimitiveTag::Unimplemented(n) => *n,
        }
    }
}

/// Identifier octets of a TLV.
///
/// Universal tags keep the raw identifier octet next to the decoded tag
/// number so that the constructed bit survives re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Primitive(PrimitiveTag, u8),
    ContextSpecific { slot: u32, constructed: bool },
    Application { number: u32, constructed: bool },
    Private { number: u32, constructed: bool },
}

impl Tag {
    /// Universal tag with the DER constructed bit set for SEQUENCE and SET.
    pub fn universal(tag: PrimitiveTag) -> Self {
        let number = u8::from(&tag);
        let raw = match tag {
            PrimitiveTag::Sequence | PrimitiveTag::Set => number | TAG_CONSTRUCTED,
            _ => number,
        };
        Tag::Primitive(tag, raw)
    }

    pub fn is_constructed(&self) -> bool {
        match self {
            Tag::Primitive(_, raw) => raw & TAG_CONSTRUCTED != 0,
            Tag::ContextSpecific { constructed, .. }
            | Tag::Application { constructed, .. }
            | Tag::Private { constructed, .. } => *constructed,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Tag::Primitive(_, raw) => out.push(*raw),
            Tag::ContextSpecific { slot, constructed } => {
                write_identifier(TAG_CONTEXT_SPECIFIC, *constructed, *slot, out)
            }
            Tag::Application {
                number,
                constructed,
            } => write_identifier(TAG_APPLICATION, *constructed, *number, out),
            Tag::Private {
                number,
                constructed,
            } => write_identifier(TAG_PRIVATE, *constructed, *number, out),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut buf = Vec::with_capacity(6);
        self.write_to(&mut buf);
        buf.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Payload of a primitive TLV.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(data) => Some(data),
            Value::Tlv(_) => None,
        }
    }

    /// Children of a constructed TLV.
    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(tlvs) => Some(tlvs),
            Value::Data(_) => None,
        }
    }

    fn parse(input: &[u8], depth: usize) -> IResult<&[u8], Tlv, Error> {
        if depth > MAX_DEPTH {
            return Err(nom::Err::Failure(Error::DepthExceeded(MAX_DEPTH)));
        }
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, data) = take_exact(input, length)?;

        if tag.is_constructed() {
            // parse TLV recursively.
            let (_, tlvs) = parse_all(data, depth + 1)?;
            return Ok((input, Tlv::new_constructed(tag, tlvs)));
        }

        Ok((input, Tlv::new_primitive(tag, data.to_vec())))
    }

    fn content_len(&self) -> usize {
        match &self.value {
            Value::Data(data) => data.len(),
            Value::Tlv(tlvs) => tlvs.iter().map(Tlv::encoded_len).sum(),
        }
    }

    fn encoded_len(&self) -> usize {
        let content = self.content_len();
        self.tag.encoded_len() + length_octets(content) + content
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        self.tag.write_to(out);
        write_length(self.content_len(), out);
        match &self.value {
            Value::Data(data) => out.extend_from_slice(data),
            Value::Tlv(tlvs) => tlvs.iter().for_each(|tlv| tlv.write_to(out)),
        }
    }
}

impl Zeroize for Tlv {
    fn zeroize(&mut self) {
        match &mut self.value {
            Value::Data(data) => data.zeroize(),
            Value::Tlv(tlvs) => tlvs.zeroize(),
        }
    }
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        match parse_all(self, 0) {
            Ok((_, elements)) => Ok(Der { elements }),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
            Err(nom::Err::Incomplete(needed)) => Err(Error::ParserIncomplete(needed)),
        }
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        self.as_slice().decode()
    }
}

impl DecodableFrom<Pem> for Der {}

impl Decoder<Pem, Der> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        self.data().decode()
    }
}

impl EncodableTo<Tlv> for Vec<u8> {}

impl Encoder<Tlv, Vec<u8>> for Tlv {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        // sized up front so secret payloads are never left behind by a reallocation
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        Ok(out)
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.elements.iter().map(Tlv::encoded_len).sum());
        self.elements.iter().for_each(|tlv| tlv.write_to(&mut out));
        Ok(out)
    }
}

fn parse_all(mut input: &[u8], depth: usize) -> IResult<&[u8], Vec<Tlv>, Error> {
    // siblings parsed before a failure are wiped on the error path
    let mut tlvs = Zeroizing::new(Vec::new());
    while !input.is_empty() {
        let (rest, tlv) = Tlv::parse(input, depth)?;
        input = rest;
        tlvs.push(tlv);
    }
    Ok((input, std::mem::take(&mut *tlvs)))
}

fn take_exact(input: &[u8], length: usize) -> IResult<&[u8], &[u8], Error> {
    if input.len() < length {
        return Err(nom::Err::Failure(Error::TruncatedInput {
            needed: length,
            remaining: input.len(),
        }));
    }
    nom::bytes::complete::take(length).parse(input)
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], Tag, Error> {
    let (input, identifier) = be_u8(input)?;
    let constructed = identifier & TAG_CONSTRUCTED != 0;
    let (input, number) = if identifier & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        parse_high_tag_number(input)?
    } else {
        (input, u32::from(identifier & TAG_NUMBER_MASK))
    };

    let tag = match identifier & TAG_CLASS_MASK {
        TAG_APPLICATION => Tag::Application {
            number,
            constructed,
        },
        TAG_CONTEXT_SPECIFIC => Tag::ContextSpecific {
            slot: number,
            constructed,
        },
        TAG_PRIVATE => Tag::Private {
            number,
            constructed,
        },
        _ => {
            let tag = u8::try_from(number)
                .map_err(|_| Error::UnsupportedUniversalTag(number))
                .and_then(PrimitiveTag::try_from)
                .map_err(nom::Err::Failure)?;
            Tag::Primitive(tag, identifier)
        }
    };
    Ok((input, tag))
}

fn parse_high_tag_number(mut input: &[u8]) -> IResult<&[u8], u32, Error> {
    let mut number: u32 = 0;
    loop {
        let (rest, b) = be_u8(input)?;
        input = rest;
        if number > (u32::MAX >> 7) {
            return Err(nom::Err::Failure(Error::TagNumberOverflow));
        }
        number = (number << 7) | u32::from(b & 0x7f);
        if b & 0x80 == 0 {
            return Ok((input, number));
        }
    }
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize, Error> {
    let (input, n) = be_u8(input)?;
    if n == 0x80 {
        return Err(nom::Err::Failure(Error::IndefiniteLength));
    }
    if n & 0x80 == 0x80 {
        // long form
        // First 1 bit is a marker for long form.
        // Other bits represent bytes length of the length field.
        let count = usize::from(n & 0x7f);
        if count > MAX_LENGTH_OCTETS {
            return Err(nom::Err::Failure(Error::LengthTooLong(count)));
        }
        let (input, bs) = take_exact(input, count)?;
        let length = bs
            .iter()
            .fold(0usize, |length, &b| (length << 8) | usize::from(b));
        return Ok((input, length));
    }
    // short form: 0-127
    Ok((input, usize::from(n)))
}

fn length_octets(length: usize) -> usize {
    if length < 0x80 {
        1
    } else {
        1 + (usize::BITS - length.leading_zeros()).div_ceil(8) as usize
    }
}

fn write_length(length: usize, out: &mut Vec<u8>) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }
    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

fn write_identifier(class: u8, constructed: bool, number: u32, out: &mut Vec<u8>) {
    let flags = class | if constructed { TAG_CONSTRUCTED } else { 0 };
    if number < u32::from(TAG_NUMBER_MASK) {
        out.push(flags | number as u8);
        return;
    }
    out.push(flags | TAG_NUMBER_MASK);
    let mut groups = Vec::new();
    let mut n = number;
    loop {
        groups.push((n & 0x7f) as u8);
        n >>= 7;
        if n == 0 {
            break;
        }
    }
    while let Some(g) = groups.pop() {
        out.push(if groups.is_empty() { g } else { g | 0x80 });
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use certmatch::decoder::Decoder;
    use certmatch::encoder::Encoder;
    use pem::Pem;
    use rstest::rstest;

    use crate::error::Error;
    use crate::{Der, MAX_DEPTH, PrimitiveTag, Tag, Tlv, Value, parse_length, parse_tag};

    #[rstest(input, expected,
        case(vec![0x02], Tag::Primitive(PrimitiveTag::Integer, 0x02)),
        case(vec![0x30, 0x01], Tag::Primitive(PrimitiveTag::Sequence, 0x30)),
        case(vec![0x1e], Tag::Primitive(PrimitiveTag::BMPString, 0x1e)),
        case(vec![0x0a], Tag::Primitive(PrimitiveTag::Unimplemented(0x0a), 0x0a)),
        case(vec![0x1a], Tag::Primitive(PrimitiveTag::Unimplemented(0x1a), 0x1a)),
        case(vec![0xa0], Tag::ContextSpecific { slot: 0, constructed: true }),
        case(vec![0x83], Tag::ContextSpecific { slot: 3, constructed: false }),
        case(vec![0x9f, 0x1f], Tag::ContextSpecific { slot: 31, constructed: false }),
        case(vec![0xbf, 0x81, 0x00], Tag::ContextSpecific { slot: 128, constructed: true }),
        case(vec![0x61], Tag::Application { number: 1, constructed: true }),
        case(vec![0xc2], Tag::Private { number: 2, constructed: false })
    )]
    fn test_parse_tag(input: Vec<u8>, expected: Tag) {
        let (_, actual) = parse_tag(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected,
        case(vec![0x02], 0x02),
        case(vec![0x7f], 0x7f),
        case(vec![0x81, 0x80], 0x80),
        case(vec![0x82, 0x02, 0x10], 256 * 0x02 + 0x10),
        case(vec![0x83, 0x01, 0x00, 0x00], 256 * 256),
        case(vec![0x84, 0x01, 0x00, 0x00, 0x00], 256 * 256 * 256),
        case(vec![0x82, 0xff, 0xff], 256 * 0xff + 0xff),
    )]
    fn test_parse_length(input: Vec<u8>, expected: usize) {
        let (_, actual) = parse_length(&input).unwrap();
        assert_eq!(expected, actual);
    }

    #[rstest(input, expected,
        case(vec![0x02, 0x01, 0x01], Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), vec![0x01])),
        case(vec![0x13, 0x02, 0x68, 0x69], Tlv::new_primitive(Tag::universal(PrimitiveTag::PrintableString), vec![0x68, 0x69])),
        case(vec![0x0c, 0x04, 0xf0, 0x9f, 0x98, 0x8e], Tlv::new_primitive(Tag::universal(PrimitiveTag::UTF8String), vec![0xf0, 0x9f, 0x98, 0x8e])),
        case(vec![0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b], Tlv::new_primitive(Tag::universal(PrimitiveTag::ObjectIdentifier), vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0b])),
        case(vec![0x05, 0x00], Tlv::new_primitive(Tag::universal(PrimitiveTag::Null), vec![])),
        case(vec![0x80, 0x02, 0xde, 0xad], Tlv::new_primitive(Tag::ContextSpecific { slot: 0, constructed: false }, vec![0xde, 0xad])),
        case(vec![0x30, 0x06, 0x02, 0x01, 0x07, 0x02, 0x01, 0x08], Tlv::new_constructed(Tag::universal(PrimitiveTag::Sequence), vec![
            Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), vec![0x07]),
            Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), vec![0x08]),
        ])),
        case(vec![0xa0, 0x03, 0x02, 0x01, 0x02], Tlv::new_constructed(Tag::ContextSpecific { slot: 0, constructed: true }, vec![
            Tlv::new_primitive(Tag::universal(PrimitiveTag::Integer), vec![0x02]),
        ]))
    )]
    fn test_decode_tlv(input: Vec<u8>, expected: Tlv) {
        let der: Der = input.decode().unwrap();
        assert_eq!(1, der.elements().len());
        assert_eq!(expected, der.elements()[0]);

        let encoded: Vec<u8> = expected.encode().unwrap();
        assert_eq!(input, encoded);
    }

    #[rstest(input, expected,
        case(vec![0x30], Error::TruncatedInput { needed: 1, remaining: 0 }),
        case(vec![0x02, 0x03, 0x01], Error::TruncatedInput { needed: 3, remaining: 1 }),
        case(vec![0x30, 0x82, 0x01], Error::TruncatedInput { needed: 2, remaining: 1 }),
        case(vec![0x30, 0x04, 0x02, 0x05, 0x00, 0x00], Error::TruncatedInput { needed: 5, remaining: 2 }),
        case(vec![0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00], Error::IndefiniteLength),
        case(vec![0x04, 0x89, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01], Error::LengthTooLong(9)),
        case(vec![0x04, 0x85, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00], Error::LengthTooLong(5)),
        case(vec![0x1f, 0x24, 0x00], Error::UnsupportedUniversalTag(0x24)),
        case(vec![0x00, 0x00], Error::UnsupportedUniversalTag(0x00)),
        case(vec![0x0e, 0x00], Error::UnsupportedUniversalTag(0x0e)),
        case(vec![0x0f, 0x00], Error::UnsupportedUniversalTag(0x0f)),
        case(vec![0x1d, 0x00], Error::UnsupportedUniversalTag(0x1d)),
        case(vec![0x30, 0x02, 0x0f, 0x00], Error::UnsupportedUniversalTag(0x0f))
    )]
    fn test_decode_error(input: Vec<u8>, expected: Error) {
        let result: Result<Der, Error> = input.decode();
        assert_eq!(Err(expected), result);
    }

    #[rstest]
    #[case(vec![0x30], true, false)]
    #[case(vec![0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00], false, true)]
    #[case(vec![0x1f, 0x24, 0x00], false, true)]
    #[case(vec![0x0f, 0x00], false, true)]
    #[case(vec![0x04, 0x85, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00], false, true)]
    fn test_decode_error_class(
        #[case] input: Vec<u8>,
        #[case] truncation: bool,
        #[case] unsupported: bool,
    ) {
        let result: Result<Der, Error> = input.decode();
        let err = result.unwrap_err();
        assert_eq!(truncation, err.is_truncation());
        assert_eq!(unsupported, err.is_unsupported_encoding());
    }

    #[test]
    fn test_decode_empty() {
        let result: Result<Der, Error> = Vec::<u8>::new().decode();
        assert_eq!(Ok(Der::new(vec![])), result);
    }

    #[test]
    fn test_decode_depth_limit() {
        fn nested(levels: usize) -> Vec<u8> {
            let mut bytes = vec![0x05, 0x00];
            for _ in 0..levels {
                let mut wrapped = vec![0x30, bytes.len() as u8];
                wrapped.extend(bytes);
                bytes = wrapped;
            }
            bytes
        }

        let ok: Result<Der, Error> = nested(MAX_DEPTH).decode();
        assert!(ok.is_ok());

        let too_deep: Result<Der, Error> = nested(MAX_DEPTH + 1).decode();
        assert_eq!(Err(Error::DepthExceeded(MAX_DEPTH)), too_deep);
    }

    #[test]
    fn test_high_tag_number_encode() {
        let tlv = Tlv::new_primitive(
            Tag::ContextSpecific {
                slot: 200,
                constructed: false,
            },
            vec![0x01],
        );
        let encoded: Vec<u8> = tlv.encode().unwrap();
        assert_eq!(vec![0x9f, 0x81, 0x48, 0x01, 0x01], encoded);
        let der: Der = encoded.decode().unwrap();
        assert_eq!(tlv, der.elements()[0]);
    }

    const CERT_A: &str = include_str!("../../testdata/cert_a.pem");
    const KEY_A: &str = include_str!("../../testdata/key_a_pkcs1.pem");

    #[rstest(input, case(CERT_A), case(KEY_A))]
    fn test_decode_encode_pem(input: &str) {
        let pem = Pem::from_str(input).unwrap();
        let der: Der = pem.decode().unwrap();
        assert_eq!(1, der.elements().len());
        assert!(matches!(der.elements()[0].value(), Value::Tlv(_)));

        let encoded: Vec<u8> = der.encode().unwrap();
        assert_eq!(pem.data(), encoded.as_slice());
    }
}
