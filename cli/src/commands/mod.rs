pub(crate) mod convert;
pub(crate) mod inspect;
pub(crate) mod validate;

use std::path::PathBuf;

use clap::{Args, Subcommand};
use engine::Config;
use pkcs::Passphrase;

use crate::error::Result;
use crate::utils::read_secret;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show certificate details and whether it is currently valid
    Inspect {
        #[command(flatten)]
        config: inspect::Config,
    },
    /// Check that a private key belongs to a certificate
    Validate {
        #[command(flatten)]
        config: validate::Config,
    },
    /// Write a certificate and its decrypted private key as one PEM file
    Convert {
        #[command(flatten)]
        config: convert::Config,
    },
}

/// Where the private key passphrase comes from, and which key forms are
/// accepted.
#[derive(Args)]
pub(crate) struct KeyArgs {
    /// Private key passphrase
    #[arg(long, env = "CERTMATCH_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Read the passphrase from a file (trailing newline is ignored)
    #[arg(long, value_name = "FILE")]
    passphrase_file: Option<PathBuf>,

    /// Allow an empty passphrase, for unencrypted keys
    #[arg(long)]
    no_passphrase: bool,

    /// Reject private keys that are not encrypted
    #[arg(long, conflicts_with = "no_passphrase")]
    encrypted_only: bool,
}

impl KeyArgs {
    /// `--passphrase-file` wins over `--passphrase` and the environment.
    pub(crate) fn passphrase(&mut self) -> Result<Passphrase> {
        if let Some(path) = &self.passphrase_file {
            let mut contents = read_secret(path)?;
            while matches!(contents.last(), Some(b'\n' | b'\r')) {
                contents.pop();
            }
            return Ok(Passphrase::new(std::mem::take(&mut *contents)));
        }
        Ok(self.passphrase.take().map(Passphrase::from).unwrap_or_default())
    }

    pub(crate) fn engine_config(&self) -> Config {
        Config {
            allow_unencrypted_keys: !self.encrypted_only,
            require_passphrase: !self.no_passphrase,
            ..Config::default()
        }
    }
}
