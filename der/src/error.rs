use nom::error::{ErrorKind, ParseError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("truncated input: {needed} bytes declared, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },
    #[error("indefinite length is not allowed in DER")]
    IndefiniteLength,
    #[error("length field of {0} octets is not supported")]
    LengthTooLong(usize),
    #[error("nesting exceeds {0} levels")]
    DepthExceeded(usize),
    #[error("tag number overflows 32 bits")]
    TagNumberOverflow,
    #[error("universal tag number {0} is not supported")]
    UnsupportedUniversalTag(u32),
    #[error("parser error {0:?}")]
    Parser(ErrorKind),
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),
}

impl Error {
    /// True when the input ended before a declared length was satisfied.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Error::TruncatedInput { .. } | Error::ParserIncomplete(_)
        )
    }

    /// True for well formed BER that this decoder refuses: indefinite
    /// lengths, oversized length or tag fields, excessive nesting and
    /// unknown universal tags.
    pub fn is_unsupported_encoding(&self) -> bool {
        matches!(
            self,
            Error::IndefiniteLength
                | Error::LengthTooLong(_)
                | Error::DepthExceeded(_)
                | Error::TagNumberOverflow
                | Error::UnsupportedUniversalTag(_)
        )
    }
}

impl ParseError<&[u8]> for Error {
    fn from_error_kind(input: &[u8], kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Eof => Error::TruncatedInput {
                needed: 1,
                remaining: input.len(),
            },
            _ => Error::Parser(kind),
        }
    }

    fn append(_: &[u8], _: ErrorKind, other: Self) -> Self {
        other
    }
}

pub type Result<T> = std::result::Result<T, Error>;
