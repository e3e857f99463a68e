//! Re-encoding stored values into the current format
//!
//! V1 and base64 values stay readable forever unless they are swept. A sweep
//! decodes each value and re-encodes it as V2; values that only "decode"
//! through a failed primary path are reported instead of rewritten.

use tracing::{info, warn};

use crate::codec::SecretCodec;
use crate::error::{CodecError, Result};
use crate::outcome::{DecodeOutcome, DegradeReason};
use crate::wire::FormatKind;

/// What a sweep did with one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Migration {
    /// Already a verified V2 value; keep as-is
    Current,
    /// Rewritten as V2
    Upgraded { value: String, from: FormatKind },
}

/// Per-value results of a sweep, in input order
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub results: Vec<Result<Migration>>,
}

impl MigrationReport {
    pub fn current(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(Migration::Current)))
            .count()
    }

    pub fn upgraded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, Ok(Migration::Upgraded { .. })))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }
}

impl SecretCodec {
    /// Re-encode one stored value as V2 if it is in an older format
    pub fn reencode(&self, encoded: &str) -> Result<Migration> {
        let (plaintext, from) = match self.decode_detailed(encoded) {
            DecodeOutcome::Verified { .. } => return Ok(Migration::Current),
            DecodeOutcome::Degraded {
                plaintext,
                format,
                reason: DegradeReason::Legacy | DegradeReason::Unencrypted,
            } => (plaintext, format),
            DecodeOutcome::Degraded {
                reason: DegradeReason::Recovered(reason),
                ..
            }
            | DecodeOutcome::Failed { reason, .. } => return Err(reason.into()),
        };

        let encoded = self.encode_detailed(&plaintext)?;
        if encoded.is_degraded() {
            return Err(CodecError::EncodingFailed(
                "refusing to migrate into an unencrypted format".to_string(),
            ));
        }

        Ok(Migration::Upgraded {
            value: encoded.value,
            from,
        })
    }

    /// Re-encode a batch of stored values
    pub fn migrate_all<I, S>(&self, values: I) -> MigrationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let results: Vec<_> = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let result = self.reencode(value.as_ref());
                if let Err(e) = &result {
                    warn!(index, error = %e, "Stored secret could not be migrated");
                }
                result
            })
            .collect();

        let report = MigrationReport { results };
        info!(
            current = report.current(),
            upgraded = report.upgraded(),
            failed = report.failed(),
            "Migration sweep finished"
        );
        report
    }
}
