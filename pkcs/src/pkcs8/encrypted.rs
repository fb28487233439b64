//! RFC 5958 EncryptedPrivateKeyInfo
//!
//! Encrypted private key container. Decryption supports the schemes in
//! [`EncryptionScheme`].

use asn1::{ASN1Object, Element, OctetString};
use certmatch::decoder::{DecodableFrom, Decoder};
use certmatch::encoder::{EncodableTo, Encoder};
use der::Der;
use pem::{Label, Pem};
use pkix_types::AlgorithmIdentifier;

use super::Result;
use super::error::Error;
use super::scheme::EncryptionScheme;
use super::types::PrivateKeyInfo;
use crate::passphrase::Passphrase;

/// EncryptedPrivateKeyInfo
///
/// ```asn1
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///     encryptionAlgorithm  EncryptionAlgorithmIdentifier,
///     encryptedData        EncryptedData
/// }
///
/// EncryptedData ::= OCTET STRING
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPrivateKeyInfo {
    /// Encryption algorithm identifier
    pub encryption_algorithm: AlgorithmIdentifier,
    /// Encrypted private key data
    pub encrypted_data: OctetString,
}

impl EncryptedPrivateKeyInfo {
    pub fn scheme(&self) -> Result<EncryptionScheme> {
        self.encryption_algorithm.decode()
    }

    /// Decrypts the contained PrivateKeyInfo.
    pub fn decrypt(&self, passphrase: &Passphrase) -> crate::Result<PrivateKeyInfo> {
        let scheme = self.scheme()?;
        let plaintext = scheme.decrypt(passphrase.as_bytes(), self.encrypted_data.as_bytes())?;
        let info: PrivateKeyInfo = plaintext.as_slice().decode()?;
        Ok(info)
    }
}

impl DecodableFrom<Element> for EncryptedPrivateKeyInfo {}

impl Decoder<Element, EncryptedPrivateKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        let Element::Sequence(elements) = self else {
            return Err(Error::ExpectedSequence);
        };

        match elements.as_slice() {
            [algorithm, Element::OctetString(encrypted_data)] => Ok(EncryptedPrivateKeyInfo {
                encryption_algorithm: algorithm.decode()?,
                encrypted_data: encrypted_data.clone(),
            }),
            [_, _] => Err(Error::ExpectedOctetString {
                field: "encryptedData",
            }),
            _ => Err(Error::InvalidElementCount {
                expected: "2",
                actual: elements.len(),
            }),
        }
    }
}

impl DecodableFrom<ASN1Object> for EncryptedPrivateKeyInfo {}

impl Decoder<ASN1Object, EncryptedPrivateKeyInfo> for ASN1Object {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        match self.elements() {
            [element, ..] => element.decode(),
            [] => Err(Error::EmptyAsn1Object),
        }
    }
}

impl EncodableTo<EncryptedPrivateKeyInfo> for Element {}

impl Encoder<EncryptedPrivateKeyInfo, Element> for EncryptedPrivateKeyInfo {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            self.encryption_algorithm.encode()?,
            Element::OctetString(self.encrypted_data.clone()),
        ]))
    }
}

impl DecodableFrom<Pem> for EncryptedPrivateKeyInfo {}

impl Decoder<Pem, EncryptedPrivateKeyInfo> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<EncryptedPrivateKeyInfo> {
        if *self.label() != Label::EncryptedPrivateKey {
            return Err(Error::UnexpectedKeyFormat {
                expected: "ENCRYPTED PRIVATE KEY",
            });
        }
        let der: Der = Decoder::<Pem, Der>::decode(self)?;
        let asn1_obj: ASN1Object = der.decode()?;
        Decoder::<ASN1Object, EncryptedPrivateKeyInfo>::decode(&asn1_obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::Cipher;
    use crate::kdf::Prf;
    use crate::pkcs1::RSAPrivateKey;
    use rstest::rstest;
    use std::str::FromStr;

    const KEY_A_PKCS1: &str = include_str!("../../../testdata/key_a_pkcs1.pem");
    const KEY_A_AES256: &str = include_str!("../../../testdata/key_a_pkcs8_aes256.pem");
    const KEY_A_AES128_SHA1: &str = include_str!("../../../testdata/key_a_pkcs8_aes128_sha1.pem");
    const KEY_A_DES3: &str = include_str!("../../../testdata/key_a_pkcs8_des3.pem");
    const KEY_A_PBE_SHA1_3DES: &str =
        include_str!("../../../testdata/key_a_pkcs8_pbe_sha1_3des.pem");

    fn decode(input: &str) -> EncryptedPrivateKeyInfo {
        Pem::from_str(input).unwrap().decode().unwrap()
    }

    #[rstest]
    #[case(KEY_A_AES256, Cipher::Aes256Cbc, Some(Prf::HmacWithSha256))]
    #[case(KEY_A_AES128_SHA1, Cipher::Aes128Cbc, Some(Prf::HmacWithSha1))]
    #[case(KEY_A_DES3, Cipher::DesEde3Cbc, Some(Prf::HmacWithSha512))]
    #[case(KEY_A_PBE_SHA1_3DES, Cipher::DesEde3Cbc, None)]
    fn test_encrypted_private_key_info_scheme(
        #[case] input: &str,
        #[case] cipher: Cipher,
        #[case] prf: Option<Prf>,
    ) {
        let info = decode(input);
        let scheme = info.scheme().unwrap();

        assert_eq!(cipher, scheme.cipher());
        match scheme {
            EncryptionScheme::Pbes2 { kdf, .. } => {
                assert_eq!(prf, Some(kdf.prf));
                assert_eq!(2048, kdf.iterations);
                assert_eq!(16, kdf.salt.len());
            }
            EncryptionScheme::Pkcs12Sha1TripleDes { salt, iterations } => {
                assert_eq!(None, prf);
                assert_eq!(2048, iterations);
                assert_eq!(vec![0xcd, 0x14, 0xcd, 0xf7, 0x34, 0xd2, 0x28, 0x5c], salt);
            }
        }
    }

    #[rstest]
    #[case(KEY_A_AES256)]
    #[case(KEY_A_AES128_SHA1)]
    #[case(KEY_A_DES3)]
    #[case(KEY_A_PBE_SHA1_3DES)]
    fn test_encrypted_private_key_info_decrypt(#[case] input: &str) {
        let expected: RSAPrivateKey = Pem::from_str(KEY_A_PKCS1).unwrap().decode().unwrap();

        let info = decode(input);
        let decrypted = info.decrypt(&Passphrase::from("correct-horse")).unwrap();
        let key = decrypted.rsa_private_key().unwrap();

        assert_eq!(expected.modulus, key.modulus);
        assert_eq!(expected.public_exponent, key.public_exponent);
        assert_eq!(expected.private_exponent, key.private_exponent);
        assert_eq!(expected.prime1, key.prime1);
        assert_eq!(expected.prime2, key.prime2);
    }

    #[rstest]
    #[case(KEY_A_AES256, "wrong")]
    #[case(KEY_A_DES3, "correct-horsf")]
    #[case(KEY_A_PBE_SHA1_3DES, "")]
    fn test_encrypted_private_key_info_decrypt_wrong_passphrase(
        #[case] input: &str,
        #[case] passphrase: &str,
    ) {
        let info = decode(input);
        assert!(info.decrypt(&Passphrase::from(passphrase)).is_err());
    }

    #[test]
    fn test_encrypted_private_key_info_encode_decode() {
        let info = decode(KEY_A_AES256);
        let element: Element = info.encode().unwrap();
        let decoded: EncryptedPrivateKeyInfo = element.decode().unwrap();
        assert_eq!(info, decoded);
    }

    #[rstest]
    #[case(Element::Null)]
    #[case(Element::Sequence(vec![Element::Null]))]
    #[case(Element::Sequence(vec![
        Element::Sequence(vec![Element::ObjectIdentifier(asn1::ObjectIdentifier::from_str(EncryptionScheme::OID_PBES2).unwrap())]),
        Element::Null,
    ]))]
    fn test_encrypted_private_key_info_decode_error(#[case] element: Element) {
        let result: Result<EncryptedPrivateKeyInfo> = element.decode();
        assert!(result.is_err());
    }

    #[test]
    fn test_encrypted_private_key_info_wrong_label() {
        let pem = Pem::from_str(KEY_A_PKCS1).unwrap();
        let result: Result<EncryptedPrivateKeyInfo> = pem.decode();
        assert!(matches!(result, Err(Error::UnexpectedKeyFormat { .. })));
    }
}
