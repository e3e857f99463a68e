//! Subcommand implementations
//!
//! Each command writes its result to the given writer so tests can capture it,
//! and returns whether the process should exit successfully.

use anyhow::{bail, Context};
use serde::Serialize;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use vault_codec::{FormatKind, Migration, OutcomeStatus, SecretCodec, WireFormat};

/// Use the argument as-is, or read one line from stdin when it is `-`
pub fn read_arg(arg: String) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg);
    }
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(strip_newline(line))
}

fn strip_newline(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

pub fn encode(codec: &SecretCodec, plaintext: &str, out: &mut impl Write) -> anyhow::Result<bool> {
    let encoded = codec.encode_detailed(plaintext)?;
    if encoded.is_degraded() {
        warn!("Secret was stored as unencrypted base64");
    }
    writeln!(out, "{}", encoded.value)?;
    Ok(true)
}

pub fn decode(
    codec: &SecretCodec,
    encoded: &str,
    strict: bool,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let plaintext = if strict {
        codec.decode_detailed(encoded).into_result()?
    } else {
        codec.decode(encoded)
    };
    writeln!(out, "{}", plaintext)?;
    Ok(true)
}

/// Inspection result; never includes the plaintext
#[derive(Debug, Serialize)]
struct InspectReport {
    format: FormatKind,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

pub fn inspect(codec: &SecretCodec, encoded: &str, out: &mut impl Write) -> anyhow::Result<bool> {
    let outcome = codec.decode_detailed(encoded);
    let report = InspectReport {
        format: WireFormat::parse(encoded).kind(),
        status: outcome.status(),
        reason: outcome.failure().map(|r| r.to_string()),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(true)
}

pub fn hash(codec: &SecretCodec, credential: &str, out: &mut impl Write) -> anyhow::Result<bool> {
    writeln!(out, "{}", codec.hash_credential(credential)?)?;
    Ok(true)
}

pub fn verify(
    codec: &SecretCodec,
    candidate: &str,
    hashed: &str,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    if codec.verify_credential(candidate, hashed) {
        writeln!(out, "match")?;
        Ok(true)
    } else {
        writeln!(out, "no match")?;
        Ok(false)
    }
}

/// Rewrite one stored value per line.
///
/// Output lines align with input lines: upgraded values are replaced, current
/// and failed values are echoed unchanged.
pub fn migrate(
    codec: &SecretCodec,
    input: impl BufRead,
    out: &mut impl Write,
    summary: &mut impl Write,
) -> anyhow::Result<bool> {
    let lines = input
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .context("Failed to read stored values")?;
    if lines.is_empty() {
        bail!("No stored values on stdin");
    }

    let report = codec.migrate_all(&lines);
    for (line, result) in lines.iter().zip(&report.results) {
        match result {
            Ok(Migration::Upgraded { value, .. }) => writeln!(out, "{}", value)?,
            Ok(Migration::Current) | Err(_) => writeln!(out, "{}", line)?,
        }
    }

    writeln!(
        summary,
        "current: {}, upgraded: {}, failed: {}",
        report.current(),
        report.upgraded(),
        report.failed()
    )?;
    info!(total = lines.len(), "Migration output written");

    Ok(report.failed() == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_codec::CodecSettings;

    const KEY: &str = "0123456789abcdef0123456789abcdef";
    const V1_VALUE: &str = "00112233445566778899aabbccddeeff:06b792642ccfc795a9ac0ab0f6ac3a717e0ed03f77119df73a40ba9237e2a92c";

    fn codec() -> SecretCodec {
        SecretCodec::new(&CodecSettings {
            hash_iterations: 1_000,
            ..CodecSettings::with_key(KEY)
        })
        .unwrap()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline("abc\r\n".to_string()), "abc");
        assert_eq!(strip_newline("abc\n".to_string()), "abc");
        assert_eq!(strip_newline(" abc ".to_string()), " abc ");
    }

    #[test]
    fn test_encode_then_decode() {
        let codec = codec();
        let mut buf = Vec::new();
        encode(&codec, "Tr0ub4dor&3", &mut buf).unwrap();
        let encoded = output(buf);

        let mut buf = Vec::new();
        decode(&codec, encoded.trim_end(), true, &mut buf).unwrap();
        assert_eq!(output(buf), "Tr0ub4dor&3\n");
    }

    #[test]
    fn test_strict_decode_rejects_garbage() {
        let mut buf = Vec::new();
        assert!(decode(&codec(), "not-a-valid-format", true, &mut buf).is_err());

        let mut buf = Vec::new();
        decode(&codec(), "not-a-valid-format", false, &mut buf).unwrap();
        assert_eq!(output(buf), "not-a-valid-format\n");
    }

    #[test]
    fn test_inspect_omits_plaintext() {
        let mut buf = Vec::new();
        inspect(&codec(), V1_VALUE, &mut buf).unwrap();
        let text = output(buf);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["format"], "v1");
        assert_eq!(json["status"], "degraded");
        assert!(json.get("reason").is_none());
        assert!(!text.contains("legacy-password-42"));
    }

    #[test]
    fn test_inspect_reports_tamper() {
        let codec = codec();
        let tampered = format!("{}00", codec.encode("secret").unwrap());

        let mut buf = Vec::new();
        inspect(&codec, &tampered, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["format"], "v2");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "authentication tag did not verify");
    }

    #[test]
    fn test_hash_and_verify() {
        let codec = codec();
        let mut buf = Vec::new();
        hash(&codec, "hunter2", &mut buf).unwrap();
        let hashed = output(buf);

        let mut buf = Vec::new();
        assert!(verify(&codec, "hunter2", hashed.trim_end(), &mut buf).unwrap());
        let mut buf = Vec::new();
        assert!(!verify(&codec, "hunter3", hashed.trim_end(), &mut buf).unwrap());
        assert_eq!(output(buf), "no match\n");
    }

    #[test]
    fn test_migrate_keeps_line_alignment() {
        let codec = codec();
        let current = codec.encode("fresh").unwrap();
        let input = format!("{}\n{}\nnot-a-valid-format\n", current, V1_VALUE);

        let mut out = Vec::new();
        let mut summary = Vec::new();
        let success = migrate(&codec, input.as_bytes(), &mut out, &mut summary).unwrap();
        assert!(!success);

        let out = output(out);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], current);
        assert_eq!(codec.decode(lines[1]), "legacy-password-42");
        assert!(codec.decode_detailed(lines[1]).is_verified());
        assert_eq!(lines[2], "not-a-valid-format");
        assert_eq!(output(summary), "current: 1, upgraded: 1, failed: 1\n");
    }

    #[test]
    fn test_migrate_requires_input() {
        let mut out = Vec::new();
        let mut summary = Vec::new();
        assert!(migrate(&codec(), &b""[..], &mut out, &mut summary).is_err());
    }
}
