//! Password based encryption schemes for EncryptedPrivateKeyInfo.

use asn1::{Element, Integer};
use certmatch::decoder::{DecodableFrom, Decoder};
use pkix_types::{AlgorithmIdentifier, AlgorithmParameters};
use zeroize::Zeroizing;

use super::Result;
use super::error::Error;
use crate::cipher::Cipher;
use crate::kdf::{self, Pkcs12KeyId, Prf};

/*
RFC 8018 Appendix A.2 and A.4

PBKDF2-params ::= SEQUENCE {
    salt CHOICE {
        specified OCTET STRING,
        otherSource AlgorithmIdentifier {{PBKDF2-SaltSources}}
    },
    iterationCount INTEGER (1..MAX),
    keyLength INTEGER (1..MAX) OPTIONAL,
    prf AlgorithmIdentifier {{PBKDF2-PRFs}} DEFAULT algid-hmacWithSHA1
}

PBES2-params ::= SEQUENCE {
    keyDerivationFunc AlgorithmIdentifier {{PBES2-KDFs}},
    encryptionScheme AlgorithmIdentifier {{PBES2-Encs}}
}

RFC 7292 Appendix C

pkcs-12PbeParams ::= SEQUENCE {
    salt        OCTET STRING,
    iterations  INTEGER
}
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Params {
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub key_length: Option<usize>,
    pub prf: Prf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionScheme {
    /// PBES2 with PBKDF2 and a CBC block cipher.
    Pbes2 {
        kdf: Pbkdf2Params,
        cipher: Cipher,
        iv: Vec<u8>,
    },
    /// pbeWithSHAAnd3-KeyTripleDES-CBC
    Pkcs12Sha1TripleDes { salt: Vec<u8>, iterations: u32 },
}

impl EncryptionScheme {
    pub const OID_PBES2: &'static str = "1.2.840.113549.1.5.13";
    pub const OID_PBKDF2: &'static str = "1.2.840.113549.1.5.12";
    pub const OID_PBE_SHA1_3DES: &'static str = "1.2.840.113549.1.12.1.3";

    pub fn cipher(&self) -> Cipher {
        match self {
            EncryptionScheme::Pbes2 { cipher, .. } => *cipher,
            EncryptionScheme::Pkcs12Sha1TripleDes { .. } => Cipher::DesEde3Cbc,
        }
    }

    /// Derives the key from `passphrase` and decrypts `ciphertext`.
    pub fn decrypt(
        &self,
        passphrase: &[u8],
        ciphertext: &[u8],
    ) -> crate::Result<Zeroizing<Vec<u8>>> {
        match self {
            EncryptionScheme::Pbes2 {
                kdf: params,
                cipher,
                iv,
            } => {
                let key_len = params.key_length.unwrap_or(cipher.key_len());
                let key = kdf::pbkdf2(
                    params.prf,
                    passphrase,
                    &params.salt,
                    params.iterations,
                    key_len,
                )?;
                cipher.decrypt(&key, iv, ciphertext)
            }
            EncryptionScheme::Pkcs12Sha1TripleDes { salt, iterations } => {
                let cipher = Cipher::DesEde3Cbc;
                let password = kdf::bmp_password(passphrase)?;
                let key = kdf::pkcs12_kdf(
                    &password,
                    salt,
                    *iterations,
                    Pkcs12KeyId::Key,
                    cipher.key_len(),
                )?;
                let iv = kdf::pkcs12_kdf(
                    &password,
                    salt,
                    *iterations,
                    Pkcs12KeyId::Iv,
                    cipher.iv_len(),
                )?;
                cipher.decrypt(&key, &iv, ciphertext)
            }
        }
    }
}

fn parameters<'a>(algorithm: &'a AlgorithmIdentifier, name: &'static str) -> Result<&'a Element> {
    match algorithm.parameters() {
        Some(AlgorithmParameters::Elm(element)) => Ok(element),
        _ => Err(Error::MissingParameters(name)),
    }
}

fn to_u32(int: &Integer, field: &'static str) -> Result<u32> {
    int.to_u32().ok_or(Error::OutOfRange(field))
}

impl DecodableFrom<AlgorithmIdentifier> for EncryptionScheme {}

impl Decoder<AlgorithmIdentifier, EncryptionScheme> for AlgorithmIdentifier {
    type Error = Error;

    fn decode(&self) -> Result<EncryptionScheme> {
        match self.algorithm().to_string().as_str() {
            EncryptionScheme::OID_PBES2 => decode_pbes2(parameters(self, "PBES2")?),
            EncryptionScheme::OID_PBE_SHA1_3DES => {
                decode_pkcs12_pbe(parameters(self, "pbeWithSHAAnd3-KeyTripleDES-CBC")?)
            }
            _ => Err(Error::UnsupportedEncryptionAlgorithm(self.name())),
        }
    }
}

fn decode_pbes2(params: &Element) -> Result<EncryptionScheme> {
    let Element::Sequence(elements) = params else {
        return Err(Error::ExpectedSequence);
    };
    let [kdf, scheme] = elements.as_slice() else {
        return Err(Error::InvalidElementCount {
            expected: "2",
            actual: elements.len(),
        });
    };

    let kdf: AlgorithmIdentifier = kdf.decode()?;
    if *kdf.algorithm() != EncryptionScheme::OID_PBKDF2 {
        return Err(Error::UnsupportedKdf(kdf.name()));
    }
    let kdf = decode_pbkdf2_params(parameters(&kdf, "PBKDF2")?)?;

    let scheme: AlgorithmIdentifier = scheme.decode()?;
    let cipher = Cipher::from_oid(scheme.algorithm())
        .ok_or_else(|| Error::UnsupportedEncryptionAlgorithm(scheme.name()))?;
    let Element::OctetString(iv) = parameters(&scheme, "encryptionScheme")? else {
        return Err(Error::ExpectedOctetString { field: "iv" });
    };
    if iv.as_bytes().len() != cipher.iv_len() {
        return Err(Error::OutOfRange("iv length"));
    }
    if kdf.key_length.is_some_and(|len| len != cipher.key_len()) {
        return Err(Error::OutOfRange("keyLength"));
    }

    Ok(EncryptionScheme::Pbes2 {
        kdf,
        cipher,
        iv: iv.as_bytes().to_vec(),
    })
}

fn decode_pbkdf2_params(params: &Element) -> Result<Pbkdf2Params> {
    let Element::Sequence(elements) = params else {
        return Err(Error::ExpectedSequence);
    };
    let [salt, iterations, optional @ ..] = elements.as_slice() else {
        return Err(Error::InvalidElementCount {
            expected: "2 to 4",
            actual: elements.len(),
        });
    };
    // otherSource salts are reserved by RFC 8018 and never produced
    let Element::OctetString(salt) = salt else {
        return Err(Error::ExpectedOctetString { field: "salt" });
    };
    let Element::Integer(iterations) = iterations else {
        return Err(Error::ExpectedInteger {
            field: "iterationCount",
        });
    };

    let (key_length, prf) = match optional {
        [] => (None, None),
        [Element::Integer(len)] => (Some(len), None),
        [prf @ Element::Sequence(_)] => (None, Some(prf)),
        [Element::Integer(len), prf @ Element::Sequence(_)] => (Some(len), Some(prf)),
        _ => {
            return Err(Error::InvalidElementCount {
                expected: "2 to 4",
                actual: elements.len(),
            });
        }
    };

    let key_length = key_length
        .map(|len| to_u32(len, "keyLength").map(|len| len as usize))
        .transpose()?;
    let prf = match prf {
        None => Prf::default(),
        Some(prf) => {
            let prf: AlgorithmIdentifier = prf.decode()?;
            Prf::from_oid(prf.algorithm()).ok_or_else(|| Error::UnsupportedPrf(prf.name()))?
        }
    };

    Ok(Pbkdf2Params {
        salt: salt.as_bytes().to_vec(),
        iterations: to_u32(iterations, "iterationCount")?,
        key_length,
        prf,
    })
}

fn decode_pkcs12_pbe(params: &Element) -> Result<EncryptionScheme> {
    let Element::Sequence(elements) = params else {
        return Err(Error::ExpectedSequence);
    };
    match elements.as_slice() {
        [Element::OctetString(salt), Element::Integer(iterations)] => {
            Ok(EncryptionScheme::Pkcs12Sha1TripleDes {
                salt: salt.as_bytes().to_vec(),
                iterations: to_u32(iterations, "iterations")?,
            })
        }
        [_, _] => Err(Error::ExpectedOctetString { field: "salt" }),
        _ => Err(Error::InvalidElementCount {
            expected: "2",
            actual: elements.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asn1::{ObjectIdentifier, OctetString};
    use rstest::rstest;
    use std::str::FromStr;

    fn oid(s: &str) -> Element {
        Element::ObjectIdentifier(ObjectIdentifier::from_str(s).unwrap())
    }

    fn pbes2(kdf_params: Vec<Element>, cipher_oid: &str, iv_len: usize) -> AlgorithmIdentifier {
        AlgorithmIdentifier::new_with_params(
            ObjectIdentifier::from_str(EncryptionScheme::OID_PBES2).unwrap(),
            AlgorithmParameters::Elm(Element::Sequence(vec![
                Element::Sequence(vec![
                    oid(EncryptionScheme::OID_PBKDF2),
                    Element::Sequence(kdf_params),
                ]),
                Element::Sequence(vec![
                    oid(cipher_oid),
                    Element::OctetString(OctetString::from(vec![0x11; iv_len])),
                ]),
            ])),
        )
    }

    fn salt_and_count() -> Vec<Element> {
        vec![
            Element::OctetString(OctetString::from(vec![0xaa; 8])),
            Element::Integer(Integer::from(2048)),
        ]
    }

    #[test]
    fn test_decode_pbes2_default_prf() {
        let algorithm = pbes2(salt_and_count(), Cipher::OID_AES128_CBC, 16);
        let scheme: EncryptionScheme = algorithm.decode().unwrap();

        assert_eq!(
            EncryptionScheme::Pbes2 {
                kdf: Pbkdf2Params {
                    salt: vec![0xaa; 8],
                    iterations: 2048,
                    key_length: None,
                    prf: Prf::HmacWithSha1,
                },
                cipher: Cipher::Aes128Cbc,
                iv: vec![0x11; 16],
            },
            scheme
        );
    }

    #[test]
    fn test_decode_pbes2_key_length_and_prf() {
        let mut params = salt_and_count();
        params.push(Element::Integer(Integer::from(32)));
        params.push(Element::Sequence(vec![oid(Prf::OID_HMAC_WITH_SHA256), Element::Null]));
        let algorithm = pbes2(params, Cipher::OID_AES256_CBC, 16);

        let scheme: EncryptionScheme = algorithm.decode().unwrap();
        let EncryptionScheme::Pbes2 { kdf, cipher, .. } = scheme else {
            panic!("expected PBES2");
        };
        assert_eq!(Some(32), kdf.key_length);
        assert_eq!(Prf::HmacWithSha256, kdf.prf);
        assert_eq!(Cipher::Aes256Cbc, cipher);
    }

    #[rstest]
    // iv does not match the block size
    #[case(pbes2(salt_and_count(), Cipher::OID_AES128_CBC, 8))]
    // rc2-cbc
    #[case(pbes2(salt_and_count(), "1.2.840.113549.3.2", 8))]
    // keyLength disagrees with the cipher
    #[case(pbes2(
        vec![
            Element::OctetString(OctetString::from(vec![0xaa; 8])),
            Element::Integer(Integer::from(2048)),
            Element::Integer(Integer::from(16)),
        ],
        Cipher::OID_AES256_CBC,
        16,
    ))]
    // hmacWithMD5 is not a supported PRF
    #[case(pbes2(
        vec![
            Element::OctetString(OctetString::from(vec![0xaa; 8])),
            Element::Integer(Integer::from(2048)),
            Element::Sequence(vec![oid("1.2.840.113549.2.6")]),
        ],
        Cipher::OID_AES256_CBC,
        16,
    ))]
    // negative iteration count
    #[case(pbes2(
        vec![
            Element::OctetString(OctetString::from(vec![0xaa; 8])),
            Element::Integer(Integer::from(-1)),
        ],
        Cipher::OID_AES256_CBC,
        16,
    ))]
    // PBES1 pbeWithMD5AndDES-CBC
    #[case(AlgorithmIdentifier::new(ObjectIdentifier::from_str("1.2.840.113549.1.5.3").unwrap()))]
    // PBES2 without parameters
    #[case(AlgorithmIdentifier::new(ObjectIdentifier::from_str(EncryptionScheme::OID_PBES2).unwrap()))]
    fn test_decode_scheme_error(#[case] algorithm: AlgorithmIdentifier) {
        let result: Result<EncryptionScheme> = algorithm.decode();
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_pkcs12_pbe() {
        let algorithm = AlgorithmIdentifier::new_with_params(
            ObjectIdentifier::from_str(EncryptionScheme::OID_PBE_SHA1_3DES).unwrap(),
            AlgorithmParameters::Elm(Element::Sequence(salt_and_count())),
        );
        let scheme: EncryptionScheme = algorithm.decode().unwrap();

        assert_eq!(
            EncryptionScheme::Pkcs12Sha1TripleDes {
                salt: vec![0xaa; 8],
                iterations: 2048,
            },
            scheme
        );
        assert_eq!(Cipher::DesEde3Cbc, scheme.cipher());
    }
}
