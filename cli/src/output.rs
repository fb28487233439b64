use std::fmt::Write;

use serde::Serialize;
use x509::CertificateInfo;

use crate::error::Result;

#[derive(Clone, Copy, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

const DATE_FORMAT: &str = "%b %d %H:%M:%S %Y GMT";

/// Renders `value` as JSON or YAML. YAML goes through a JSON value so both
/// formats share the same field layout.
pub(crate) fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Text => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => {
            let json = serde_json::to_value(value)?;
            Ok(serde_yml::to_string(&json)?)
        }
    }
}

/// The certificate summary shared by `inspect` and `validate`.
pub(crate) fn write_certificate(
    out: &mut String,
    info: &CertificateInfo,
    currently_valid: bool,
) -> Result<()> {
    writeln!(out, "Certificate:")?;
    writeln!(out, "    Version: {}", info.version)?;
    writeln!(out, "    Serial Number: {}", info.serial_number.format_hex())?;
    writeln!(out, "    Signature Algorithm: {}", info.signature_algorithm.name())?;
    writeln!(out, "    Issuer: {}", info.issuer_display)?;
    writeln!(out, "    Validity:")?;
    writeln!(out, "        Not Before: {}", info.not_before.format(DATE_FORMAT))?;
    writeln!(out, "        Not After:  {}", info.not_after.format(DATE_FORMAT))?;
    writeln!(out, "    Subject: {}", info.subject_display)?;
    writeln!(out, "    Public Key: RSA ({} bit)", info.key_size)?;
    let status = if currently_valid {
        "Currently valid"
    } else {
        "Expired or not yet valid"
    };
    writeln!(out, "    Status: {}", status)?;
    Ok(())
}
