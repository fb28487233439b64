//! DirectoryString type as defined in RFC 5280 Section 4.1.2.4
//!
//! DirectoryString is used in X.509 Distinguished Names to carry text in
//! one of several character encodings.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use asn1::Element;
use certmatch::decoder::{DecodableFrom, Decoder};
use serde::Serialize;

use crate::error::{Error, Result};

/// DirectoryString as defined in RFC 5280 Section 4.1.2.4
///
/// ```asn1
/// DirectoryString ::= CHOICE {
///   teletexString     TeletexString (SIZE (1..MAX)),
///   printableString   PrintableString (SIZE (1..MAX)),
///   universalString   UniversalString (SIZE (1..MAX)),
///   utf8String        UTF8String (SIZE (1..MAX)),
///   bmpString         BMPString (SIZE (1..MAX))
/// }
/// ```
///
/// Decoding also accepts IA5String (emailAddress, domainComponent) and an
/// OctetString holding UTF-8, and runs [`repair_utf8_mojibake`] on the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectoryString {
    inner: String,
}

impl DirectoryString {
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for DirectoryString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Deref for DirectoryString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<&str> for DirectoryString {
    fn from(value: &str) -> Self {
        Self {
            inner: value.to_string(),
        }
    }
}

impl TryFrom<&Element> for DirectoryString {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        let value = match element {
            Element::PrintableString(s)
            | Element::UTF8String(s)
            | Element::TeletexString(s)
            | Element::UniversalString(s)
            | Element::BMPString(s)
            | Element::IA5String(s) => s.as_str(),
            Element::OctetString(os) => std::str::from_utf8(os.as_bytes())
                .map_err(|_| Error::DirectoryStringInvalidUtf8)?,
            _ => return Err(Error::DirectoryStringExpectedStringType),
        };
        Ok(Self {
            inner: repair_utf8_mojibake(value).into_owned(),
        })
    }
}

impl fmt::Display for DirectoryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl DecodableFrom<Element> for DirectoryString {}

impl Decoder<Element, DirectoryString> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DirectoryString> {
        DirectoryString::try_from(self)
    }
}

/// Undo UTF-8 text that was mis-decoded as Latin-1 somewhere upstream.
///
/// A value like `"JosÃ©"` is the UTF-8 encoding of `"José"` read one byte per
/// character. When the value contains `Ã` and every character fits in a
/// byte, the characters are reinterpreted as UTF-8. Anything that does not
/// decode cleanly is returned unchanged.
pub fn repair_utf8_mojibake(value: &str) -> Cow<'_, str> {
    if !value.contains('\u{00c3}') {
        return Cow::Borrowed(value);
    }
    let bytes = value
        .chars()
        .map(u8::try_from)
        .collect::<std::result::Result<Vec<u8>, _>>();
    match bytes.map(String::from_utf8) {
        Ok(Ok(repaired)) => Cow::Owned(repaired),
        _ => Cow::Borrowed(value),
    }
}
