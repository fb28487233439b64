//! Block ciphers used by password protected keys, all in CBC mode with
//! PKCS#7 padding.

use std::fmt;
use std::str::FromStr;

use aes::{Aes128, Aes192, Aes256};
use asn1::ObjectIdentifier;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockCipher, BlockDecryptMut, KeyInit, KeyIvInit};
use des::{Des, TdesEde3};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    DesEde3Cbc,
    DesCbc,
}

impl Cipher {
    pub const OID_AES128_CBC: &'static str = "2.16.840.1.101.3.4.1.2";
    pub const OID_AES192_CBC: &'static str = "2.16.840.1.101.3.4.1.22";
    pub const OID_AES256_CBC: &'static str = "2.16.840.1.101.3.4.1.42";
    pub const OID_DES_EDE3_CBC: &'static str = "1.2.840.113549.3.7";
    pub const OID_DES_CBC: &'static str = "1.3.14.3.2.7";

    /// The PBES2 encryption scheme for `oid`, if supported.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        match oid.to_string().as_str() {
            Self::OID_AES128_CBC => Some(Cipher::Aes128Cbc),
            Self::OID_AES192_CBC => Some(Cipher::Aes192Cbc),
            Self::OID_AES256_CBC => Some(Cipher::Aes256Cbc),
            Self::OID_DES_EDE3_CBC => Some(Cipher::DesEde3Cbc),
            Self::OID_DES_CBC => Some(Cipher::DesCbc),
            _ => None,
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            Cipher::Aes128Cbc => 16,
            Cipher::Aes192Cbc => 24,
            Cipher::Aes256Cbc => 32,
            Cipher::DesEde3Cbc => 24,
            Cipher::DesCbc => 8,
        }
    }

    /// Block size, which is also the IV length.
    pub fn iv_len(&self) -> usize {
        match self {
            Cipher::Aes128Cbc | Cipher::Aes192Cbc | Cipher::Aes256Cbc => 16,
            Cipher::DesEde3Cbc | Cipher::DesCbc => 8,
        }
    }

    /// Decrypts `ciphertext` and strips the padding.
    pub fn decrypt(&self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if key.len() != self.key_len() || iv.len() != self.iv_len() {
            return Err(Error::InvalidKeyOrIvLength);
        }
        match self {
            Cipher::Aes128Cbc => cbc_decrypt::<Aes128>(key, iv, ciphertext),
            Cipher::Aes192Cbc => cbc_decrypt::<Aes192>(key, iv, ciphertext),
            Cipher::Aes256Cbc => cbc_decrypt::<Aes256>(key, iv, ciphertext),
            Cipher::DesEde3Cbc => cbc_decrypt::<TdesEde3>(key, iv, ciphertext),
            Cipher::DesCbc => cbc_decrypt::<Des>(key, iv, ciphertext),
        }
    }
}

/// Names used in the `DEK-Info` header of legacy encrypted PEM.
impl FromStr for Cipher {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AES-128-CBC" => Ok(Cipher::Aes128Cbc),
            "AES-192-CBC" => Ok(Cipher::Aes192Cbc),
            "AES-256-CBC" => Ok(Cipher::Aes256Cbc),
            "DES-EDE3-CBC" => Ok(Cipher::DesEde3Cbc),
            "DES-CBC" => Ok(Cipher::DesCbc),
            other => Err(Error::UnsupportedCipher(other.to_string())),
        }
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cipher::Aes128Cbc => "AES-128-CBC",
            Cipher::Aes192Cbc => "AES-192-CBC",
            Cipher::Aes256Cbc => "AES-256-CBC",
            Cipher::DesEde3Cbc => "DES-EDE3-CBC",
            Cipher::DesCbc => "DES-CBC",
        };
        write!(f, "{name}")
    }
}

fn cbc_decrypt<C>(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>
where
    C: BlockDecryptMut + BlockCipher + KeyInit,
{
    if ciphertext.is_empty() || ciphertext.len() % C::block_size() != 0 {
        return Err(Error::InvalidCiphertextLength(ciphertext.len()));
    }
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidKeyOrIvLength)?;

    let mut buf = Zeroizing::new(ciphertext.to_vec());
    let len = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| Error::BadPadding)?
        .len();
    buf.truncate(len);
    Ok(buf)
}
