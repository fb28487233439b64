//! # certmatch
//!
//! Conversion traits shared by every layer of the certificate/key pairing
//! toolkit.
//!
//! ## Overview
//!
//! Certificates and keys are decoded one representation at a time:
//! ```text
//! PEM → DER → ASN1Object → Certificate / RSAPrivateKey
//! ```
//!
//! Each step is a `Decoder` implementation, and each step back towards PEM is
//! an `Encoder` implementation. The marker traits `DecodableFrom` and
//! `EncodableTo` restrict which pairs of types may be converted.
//!
//! ## Example
//!
//! ```ignore
//! use certmatch::decoder::Decoder;
//! use der::Der;
//! use asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x00];
//! let der: Der = bytes.decode().unwrap();
//! let obj: ASN1Object = der.decode().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
