//! The secret codec
//!
//! `encode` writes the V2 format and degrades to base64 only when the
//! authenticated path cannot run. `decode` reads all three wire formats and
//! never fails; `decode_detailed` reports how the plaintext was obtained.

use tracing::{debug, warn};

use crate::crypto::{self, fallback, CredentialHasher, EncryptedData, MasterKey};
use crate::error::{CodecError, Result};
use crate::outcome::{DecodeOutcome, DegradeReason, FailureReason};
use crate::settings::CodecSettings;
use crate::wire::{FormatKind, WireFormat};

/// Maximum accepted input length, in characters
pub const MAX_INPUT_CHARS: usize = 100_000;

/// Longest V2 value a valid secret can produce: hex of 100,000 four-byte
/// characters plus the IV, the tag and two separators
pub const MAX_ENCODED_CHARS: usize =
    2 * crypto::IV_LEN + 2 * crypto::TAG_LEN + 2 + 2 * 4 * MAX_INPUT_CHARS;

/// An encoded secret together with the format that was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub value: String,
    pub format: FormatKind,
}

impl Encoded {
    /// Whether the value was stored without encryption
    pub fn is_degraded(&self) -> bool {
        self.format != FormatKind::V2
    }
}

/// Encrypts, decrypts and hashes vault secrets with one configured key
#[derive(Debug, Clone)]
pub struct SecretCodec {
    /// `None` when the configured key is shorter than 32 bytes
    key: Option<MasterKey>,
    allow_plaintext_fallback: bool,
    hasher: CredentialHasher,
}

impl SecretCodec {
    /// Create a codec from resolved settings
    pub fn new(settings: &CodecSettings) -> Result<Self> {
        settings.validate()?;
        let secret = settings.resolve_key()?;
        let key = MasterKey::from_secret_key(&secret);
        if key.is_none() {
            warn!(
                key_len = secret.len(),
                "Encryption key is shorter than 32 bytes; secrets cannot be encrypted with it"
            );
        }

        Ok(Self {
            key,
            allow_plaintext_fallback: settings.allow_plaintext_fallback,
            hasher: CredentialHasher::new(settings.hash_iterations),
        })
    }

    /// Create a codec from a key string with default settings
    pub fn with_key(key: &str) -> Result<Self> {
        Self::new(&CodecSettings::with_key(key))
    }

    /// Encode a secret into the V2 wire format
    pub fn encode(&self, plaintext: &str) -> Result<String> {
        self.encode_detailed(plaintext).map(|encoded| encoded.value)
    }

    /// Encode a secret, reporting which format was produced.
    ///
    /// The trimmed plaintext is encrypted. If encryption fails and the
    /// fallback is allowed, the untrimmed plaintext is returned as base64.
    pub fn encode_detailed(&self, plaintext: &str) -> Result<Encoded> {
        check_input(plaintext)?;
        if plaintext.trim().is_empty() {
            return Err(CodecError::InvalidInput(
                "secret must not be blank".to_string(),
            ));
        }

        match self.encrypt_v2(plaintext.trim()) {
            Ok(value) => Ok(Encoded {
                value,
                format: FormatKind::V2,
            }),
            Err(e) if self.allow_plaintext_fallback => {
                warn!(error = %e, "Authenticated encryption failed; storing secret as unencrypted base64");
                Ok(Encoded {
                    value: fallback::encode(plaintext),
                    format: FormatKind::Fallback,
                })
            }
            Err(CodecError::EncodingFailed(reason)) => Err(CodecError::EncodingFailed(format!(
                "{} (plaintext fallback disabled)",
                reason
            ))),
            Err(e) => Err(e),
        }
    }

    fn encrypt_v2(&self, plaintext: &str) -> Result<String> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| CodecError::EncodingFailed(FailureReason::NoCipherKey.to_string()))?;
        Ok(crypto::encrypt(plaintext.as_bytes(), key)?.to_string())
    }

    /// Decode a stored value. Never fails.
    ///
    /// When nothing can be recovered the input is returned unchanged, so the
    /// result is not guaranteed to be the original secret. Use
    /// [`Self::decode_detailed`] to tell the cases apart.
    pub fn decode(&self, encoded: &str) -> String {
        self.decode_detailed(encoded).into_plaintext()
    }

    /// Decode a stored value through the dispatched path, then the base64
    /// fallback, then passthrough.
    pub fn decode_detailed(&self, encoded: &str) -> DecodeOutcome {
        if check_bounds(encoded, MAX_ENCODED_CHARS).is_err() {
            return DecodeOutcome::Failed {
                passthrough: encoded.to_string(),
                reason: FailureReason::EmptyOrOversized,
            };
        }

        let wire = WireFormat::parse(encoded);
        let format = wire.kind();
        debug!(%format, "Decoding stored secret");

        let primary = match wire {
            WireFormat::V2 {
                iv,
                auth_tag,
                ciphertext,
            } => self.decrypt_v2(iv, auth_tag, ciphertext),
            WireFormat::V1 { iv, ciphertext } => self.decrypt_v1(iv, ciphertext),
            WireFormat::Fallback(value) => {
                return match fallback::decode(value) {
                    Ok(plaintext) => {
                        warn!(%format, "Stored secret is unencrypted base64");
                        DecodeOutcome::Degraded {
                            plaintext,
                            format,
                            reason: DegradeReason::Unencrypted,
                        }
                    }
                    Err(reason) => DecodeOutcome::Failed {
                        passthrough: encoded.to_string(),
                        reason,
                    },
                };
            }
        };

        match primary {
            Ok(plaintext) if format == FormatKind::V2 => DecodeOutcome::Verified { plaintext },
            Ok(plaintext) => {
                warn!(%format, "Stored secret uses unauthenticated legacy encryption");
                DecodeOutcome::Degraded {
                    plaintext,
                    format,
                    reason: DegradeReason::Legacy,
                }
            }
            Err(reason) => {
                warn!(%format, %reason, "Stored secret did not decrypt; trying base64 fallback");
                match fallback::decode(encoded) {
                    Ok(plaintext) => DecodeOutcome::Degraded {
                        plaintext,
                        format,
                        reason: DegradeReason::Recovered(reason),
                    },
                    Err(_) => DecodeOutcome::Failed {
                        passthrough: encoded.to_string(),
                        reason,
                    },
                }
            }
        }
    }

    fn decrypt_v2(
        &self,
        iv: &str,
        auth_tag: &str,
        ciphertext: &str,
    ) -> std::result::Result<String, FailureReason> {
        let key = self.key.as_ref().ok_or(FailureReason::NoCipherKey)?;
        let encrypted = EncryptedData::from_parts(iv, auth_tag, ciphertext)?;
        let plaintext = crypto::decrypt(&encrypted, key)?;
        String::from_utf8(plaintext).map_err(|_| FailureReason::InvalidUtf8)
    }

    fn decrypt_v1(&self, iv: &str, ciphertext: &str) -> std::result::Result<String, FailureReason> {
        let key = self.key.as_ref().ok_or(FailureReason::NoCipherKey)?;
        let plaintext = crypto::decrypt_legacy(iv, ciphertext, key)?;
        String::from_utf8(plaintext).map_err(|_| FailureReason::InvalidUtf8)
    }

    /// Hash a credential for one-way storage as `salt_hex:hash_hex`
    pub fn hash_credential(&self, credential: &str) -> Result<String> {
        check_input(credential)?;
        self.hasher.hash(credential)
    }

    /// Check a candidate against a stored hash. Malformed input is `false`.
    pub fn verify_credential(&self, candidate: &str, hashed: &str) -> bool {
        if check_input(candidate).is_err() || check_input(hashed).is_err() {
            return false;
        }
        self.hasher.verify(candidate, hashed)
    }
}

fn check_input(value: &str) -> Result<()> {
    check_bounds(value, MAX_INPUT_CHARS)
}

fn check_bounds(value: &str, max_chars: usize) -> Result<()> {
    if value.is_empty() {
        return Err(CodecError::InvalidInput("input must not be empty".to_string()));
    }
    // Byte length bounds the char count from above, so most inputs skip the count
    if value.len() > max_chars && value.chars().count() > max_chars {
        return Err(CodecError::InvalidInput(format!(
            "input exceeds {} characters",
            max_chars
        )));
    }
    Ok(())
}
