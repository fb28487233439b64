use num_bigint::BigUint;
use pkcs::pkcs1::{RSAPrivateKey, RSAPublicKey};
use x509::CertificateInfo;

/// True when `key` is the private half of the certificate's public key.
///
/// (n, e) are compared as unsigned big integers, so leading zero octets
/// in either encoding do not matter.
pub fn verify_pair(certificate: &CertificateInfo, key: &RSAPrivateKey) -> bool {
    let derived = key.public_key();
    match (
        components(&certificate.public_key),
        components(&derived),
    ) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

fn components(key: &RSAPublicKey) -> Option<(BigUint, BigUint)> {
    key.to_biguints()
}
