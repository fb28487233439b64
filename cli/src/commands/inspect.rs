use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use x509::CertificateInfo;

use crate::error::Result;
use crate::output::{OutputFormat, render_structured, write_certificate};
use crate::utils::read_input;

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the PEM certificate file. If not specified, reads from stdin
    file: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Evaluate validity at this RFC 3339 instant instead of now
    #[arg(long, value_name = "TIME")]
    at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    certificate: &'a CertificateInfo,
    evaluated_at: DateTime<Utc>,
    currently_valid: bool,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let input = read_input(config.file.as_deref())?;
    let info = engine::parse_certificate_info(&input)?;
    let evaluated_at = config.at.unwrap_or_else(Utc::now);
    let currently_valid = info.is_valid_at(evaluated_at);

    let rendered = match config.output {
        OutputFormat::Text => {
            let mut out = String::new();
            write_certificate(&mut out, &info, currently_valid)?;
            out
        }
        format => render_structured(
            &Report {
                certificate: &info,
                evaluated_at,
                currently_valid,
            },
            format,
        )?,
    };
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
