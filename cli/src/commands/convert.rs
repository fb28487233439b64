use std::io::Write;
use std::process::ExitCode;

use clap::Args;
use engine::{Engine, KeyFormat};

use super::KeyArgs;
use crate::error::Result;
use crate::utils::{read_input, read_secret, write_private};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the PEM certificate file
    certificate: String,

    /// Path to the PEM private key file
    key: String,

    #[command(flatten)]
    key_args: KeyArgs,

    /// Write the bundle here, for example certificate.pem. Defaults to stdout
    #[arg(long, value_name = "PATH")]
    out: Option<String>,

    /// Write the key as PKCS#8 `PRIVATE KEY` instead of `RSA PRIVATE KEY`
    #[arg(long)]
    pkcs8: bool,
}

pub(crate) fn execute(mut config: Config) -> Result<ExitCode> {
    let certificate = read_input(Some(config.certificate.as_str()))?;
    let key = read_secret(&config.key)?;
    let passphrase = config.key_args.passphrase()?;

    let mut engine_config = config.key_args.engine_config();
    if config.pkcs8 {
        engine_config.bundle_key_format = KeyFormat::PrivateKey;
    }
    let engine = Engine::new(engine_config);

    let bundle = match engine.convert(&certificate, &key, passphrase) {
        Ok(bundle) => bundle,
        Err(err) => {
            eprintln!("Conversion failed: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    match &config.out {
        Some(path) => {
            write_private(path, bundle.as_bytes())?;
            tracing::info!(path = %path, "bundle written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bundle.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
