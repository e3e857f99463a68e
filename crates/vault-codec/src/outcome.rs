//! Decode outcomes
//!
//! `decode` never fails, but callers that care need to tell a verified
//! decryption apart from a best-effort guess. [`DecodeOutcome`] carries that
//! distinction; [`DecodeOutcome::into_plaintext`] collapses it back into the
//! total behavior.

use serde::Serialize;
use thiserror::Error;

use crate::error::Result;
use crate::wire::FormatKind;

/// Why a decode stage did not produce plaintext
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    #[error("input is empty or exceeds the size limit")]
    EmptyOrOversized,

    #[error("field `{0}` is not valid hex")]
    MalformedHex(&'static str),

    #[error("field `{field}` has wrong length: expected {expected} bytes, got {got}")]
    BadLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("no usable cipher key is configured")]
    NoCipherKey,

    #[error("authentication tag did not verify")]
    IntegrityCheckFailed,

    #[error("legacy CBC decryption failed")]
    LegacyDecryptFailed,

    #[error("decrypted bytes are not valid UTF-8")]
    InvalidUtf8,

    #[error("input is not valid base64")]
    NotBase64,
}

/// Why a decode succeeded without authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// V1 ciphertext: decrypted, but CBC carries no integrity check
    Legacy,
    /// Fallback-shaped input: it was never encrypted
    Unencrypted,
    /// The dispatched path failed and the base64 fallback happened to decode
    Recovered(FailureReason),
}

/// Result of the three-stage decode pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// V2 ciphertext whose tag verified
    Verified { plaintext: String },
    /// Plaintext recovered without an integrity guarantee
    Degraded {
        plaintext: String,
        format: FormatKind,
        reason: DegradeReason,
    },
    /// Nothing recovered; `passthrough` is the input unchanged
    Failed {
        passthrough: String,
        reason: FailureReason,
    },
}

/// Coarse status, used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Verified,
    Degraded,
    Failed,
}

impl DecodeOutcome {
    /// The string `decode` returns for this outcome
    pub fn into_plaintext(self) -> String {
        match self {
            Self::Verified { plaintext } | Self::Degraded { plaintext, .. } => plaintext,
            Self::Failed { passthrough, .. } => passthrough,
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Verified { .. } => OutcomeStatus::Verified,
            Self::Degraded { .. } => OutcomeStatus::Degraded,
            Self::Failed { .. } => OutcomeStatus::Failed,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// The failure behind a non-verified outcome, if any
    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Self::Degraded {
                reason: DegradeReason::Recovered(reason),
                ..
            }
            | Self::Failed { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Strict view of the outcome.
    ///
    /// Verified values and values in a recognized legacy format (V1 or
    /// unencrypted base64) are accepted. A dispatched path that failed is an
    /// error even when the base64 fallback produced something, since that
    /// output is a coincidence rather than the stored secret.
    pub fn into_result(self) -> Result<String> {
        match self {
            Self::Verified { plaintext }
            | Self::Degraded {
                plaintext,
                reason: DegradeReason::Legacy | DegradeReason::Unencrypted,
                ..
            } => Ok(plaintext),
            Self::Degraded {
                reason: DegradeReason::Recovered(reason),
                ..
            }
            | Self::Failed { reason, .. } => Err(reason.into()),
        }
    }
}
