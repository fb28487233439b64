use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret used to decrypt a private key.
///
/// The bytes are overwritten when the value is dropped. The type is neither
/// `Clone` nor printable, so each decryption consumes or borrows the one copy.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(Vec<u8>);

impl Passphrase {
    pub fn new(bytes: Vec<u8>) -> Self {
        Passphrase(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Passphrase(value.into_bytes())
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Passphrase(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(value: Vec<u8>) -> Self {
        Passphrase(value)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}
