//! Password based key derivation.
//!
//! - PBKDF2 ([RFC 8018](https://datatracker.ietf.org/doc/html/rfc8018) Section 5.2)
//! - the PKCS#12 KDF ([RFC 7292](https://datatracker.ietf.org/doc/html/rfc7292) Appendix B.2)
//! - OpenSSL `EVP_BytesToKey` with MD5 and a single iteration, as used by
//!   legacy `Proc-Type: 4,ENCRYPTED` PEM

use asn1::ObjectIdentifier;
use hmac::Hmac;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};

/// Iteration counts above this are refused rather than run.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// PBKDF2 pseudo random function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prf {
    /// The RFC 8018 default when `prf` is omitted.
    #[default]
    HmacWithSha1,
    HmacWithSha224,
    HmacWithSha256,
    HmacWithSha384,
    HmacWithSha512,
}

impl Prf {
    pub const OID_HMAC_WITH_SHA1: &'static str = "1.2.840.113549.2.7";
    pub const OID_HMAC_WITH_SHA224: &'static str = "1.2.840.113549.2.8";
    pub const OID_HMAC_WITH_SHA256: &'static str = "1.2.840.113549.2.9";
    pub const OID_HMAC_WITH_SHA384: &'static str = "1.2.840.113549.2.10";
    pub const OID_HMAC_WITH_SHA512: &'static str = "1.2.840.113549.2.11";

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        match oid.to_string().as_str() {
            Self::OID_HMAC_WITH_SHA1 => Some(Prf::HmacWithSha1),
            Self::OID_HMAC_WITH_SHA224 => Some(Prf::HmacWithSha224),
            Self::OID_HMAC_WITH_SHA256 => Some(Prf::HmacWithSha256),
            Self::OID_HMAC_WITH_SHA384 => Some(Prf::HmacWithSha384),
            Self::OID_HMAC_WITH_SHA512 => Some(Prf::HmacWithSha512),
            _ => None,
        }
    }
}

fn check_iterations(iterations: u32) -> Result<()> {
    if iterations == 0 || iterations > MAX_ITERATIONS {
        return Err(Error::InvalidIterationCount(iterations));
    }
    Ok(())
}

/// PBKDF2 producing `key_len` bytes.
pub fn pbkdf2(
    prf: Prf,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    check_iterations(iterations)?;
    let mut key = Zeroizing::new(vec![0u8; key_len]);
    let derived = match prf {
        Prf::HmacWithSha1 => pbkdf2::pbkdf2::<Hmac<Sha1>>(password, salt, iterations, &mut key),
        Prf::HmacWithSha224 => {
            pbkdf2::pbkdf2::<Hmac<Sha224>>(password, salt, iterations, &mut key)
        }
        Prf::HmacWithSha256 => {
            pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, &mut key)
        }
        Prf::HmacWithSha384 => {
            pbkdf2::pbkdf2::<Hmac<Sha384>>(password, salt, iterations, &mut key)
        }
        Prf::HmacWithSha512 => {
            pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, iterations, &mut key)
        }
    };
    derived.map_err(|_| Error::KeyDerivation)?;
    Ok(key)
}

/// Purpose byte of the PKCS#12 KDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pkcs12KeyId {
    Key = 1,
    Iv = 2,
}

const PKCS12_U: usize = 20;
const PKCS12_V: usize = 64;

/// Encodes a password as a NUL terminated big-endian BMPString, the form the
/// PKCS#12 KDF hashes.
pub fn bmp_password(password: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let text = std::str::from_utf8(password).map_err(|_| Error::PasswordNotUtf8)?;
    let mut out = Zeroizing::new(Vec::with_capacity(2 * (text.len() + 1)));
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    Ok(out)
}

/// PKCS#12 KDF over SHA-1. `password` is already BMP encoded.
pub fn pkcs12_kdf(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    id: Pkcs12KeyId,
    len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    check_iterations(iterations)?;

    let s_len = PKCS12_V * salt.len().div_ceil(PKCS12_V);
    let p_len = PKCS12_V * password.len().div_ceil(PKCS12_V);
    // I = S || P, each input repeated to a multiple of v bytes
    let mut i_buf = Zeroizing::new(Vec::with_capacity(s_len + p_len));
    i_buf.extend(salt.iter().cycle().take(s_len));
    i_buf.extend(password.iter().cycle().take(p_len));

    let d = [id as u8; PKCS12_V];
    let mut out = Zeroizing::new(Vec::with_capacity(len + PKCS12_U));
    while out.len() < len {
        let mut a = Sha1::new().chain_update(d).chain_update(&*i_buf).finalize();
        for _ in 1..iterations {
            a = Sha1::digest(a);
        }

        let b: Zeroizing<Vec<u8>> = Zeroizing::new(a.iter().cycle().take(PKCS12_V).copied().collect());
        for block in i_buf.chunks_mut(PKCS12_V) {
            // I_j = (I_j + B + 1) mod 2^(8v)
            let mut carry = 1u16;
            for (x, y) in block.iter_mut().rev().zip(b.iter().rev()) {
                let sum = *x as u16 + *y as u16 + carry;
                *x = sum as u8;
                carry = sum >> 8;
            }
        }

        let take = (len - out.len()).min(PKCS12_U);
        out.extend_from_slice(&a[..take]);
        a.as_mut_slice().zeroize();
    }
    Ok(out)
}

/// OpenSSL `EVP_BytesToKey(cipher, EVP_md5(), salt, password, 1)`.
///
/// `D_i = MD5(D_{i-1} || password || salt)`, concatenated until `key_len`
/// bytes are available.
pub fn evp_bytes_to_key(password: &[u8], salt: &[u8], key_len: usize) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(Vec::with_capacity(key_len + 16));
    let mut prev: Option<md5::digest::Output<Md5>> = None;
    while key.len() < key_len {
        let mut hasher = Md5::new();
        if let Some(prev) = prev.as_ref() {
            hasher.update(prev);
        }
        hasher.update(password);
        hasher.update(salt);
        let digest = hasher.finalize();
        let take = (key_len - key.len()).min(digest.len());
        key.extend_from_slice(&digest[..take]);
        if let Some(prev) = prev.as_mut() {
            prev.as_mut_slice().zeroize();
        }
        prev = Some(digest);
    }
    if let Some(prev) = prev.as_mut() {
        prev.as_mut_slice().zeroize();
    }
    key
}
