use serde::Serialize;

/// Encoding of the unencrypted key written into a bundle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFormat {
    /// PKCS#1, `RSA PRIVATE KEY`
    #[default]
    RsaPrivateKey,
    /// PKCS#8, `PRIVATE KEY`
    PrivateKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bundle_key_format: KeyFormat,
    /// Accept `RSA PRIVATE KEY` / `PRIVATE KEY` blocks that are not encrypted.
    pub allow_unencrypted_keys: bool,
    /// Refuse to run when the passphrase is empty.
    pub require_passphrase: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bundle_key_format: KeyFormat::default(),
            allow_unencrypted_keys: true,
            require_passphrase: true,
        }
    }
}
