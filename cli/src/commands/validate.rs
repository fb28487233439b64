use std::fmt::Write;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Args;
use engine::Engine;

use super::KeyArgs;
use crate::error::Result;
use crate::output::{OutputFormat, render_structured, write_certificate};
use crate::utils::{read_input, read_secret};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the PEM certificate file
    certificate: String,

    /// Path to the PEM private key file
    key: String,

    #[command(flatten)]
    key_args: KeyArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Evaluate validity at this RFC 3339 instant instead of now
    #[arg(long, value_name = "TIME")]
    at: Option<DateTime<Utc>>,
}

/// Exits with 0 when the key pairs with the certificate and 1 otherwise.
pub(crate) fn execute(mut config: Config) -> Result<ExitCode> {
    let certificate = read_input(Some(config.certificate.as_str()))?;
    let key = read_secret(&config.key)?;
    let passphrase = config.key_args.passphrase()?;

    let engine = Engine::new(config.key_args.engine_config());
    let at = config.at.unwrap_or_else(Utc::now);
    let outcome = engine.validate_at(&certificate, &key, passphrase, at);

    let rendered = match config.output {
        OutputFormat::Text => {
            let mut out = String::new();
            if let (Some(info), Some(valid)) = (&outcome.certificate, outcome.currently_valid) {
                write_certificate(&mut out, info, valid)?;
            }
            match &outcome.failure {
                None => writeln!(out, "Certificate and private key are a valid pair")?,
                Some(err) => writeln!(out, "Validation failed: {}", err)?,
            }
            out
        }
        format => render_structured(&outcome, format)?,
    };
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }

    Ok(if outcome.paired {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
