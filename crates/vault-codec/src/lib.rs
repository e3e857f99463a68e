//! # vault-codec
//!
//! Protects vault secrets at rest:
//! - AES-256-GCM encryption in a versioned `iv:tag:ciphertext` hex format
//! - Transparent reads of legacy AES-256-CBC and unencrypted base64 values
//! - Decode outcomes that separate verified plaintext from best-effort guesses
//! - PBKDF2-HMAC-SHA512 credential hashing with constant-time verification
//! - Migration sweeps that rewrite legacy values in the current format

pub mod crypto;
pub mod error;
pub mod outcome;
pub mod settings;
pub mod wire;
mod codec;
mod migration;

pub use codec::{Encoded, SecretCodec, MAX_ENCODED_CHARS, MAX_INPUT_CHARS};
pub use crypto::{CredentialHasher, MasterKey, SecretKey};
pub use error::{CodecError, ConfigError, Result};
pub use migration::{Migration, MigrationReport};
pub use outcome::{DecodeOutcome, DegradeReason, FailureReason, OutcomeStatus};
pub use settings::{CodecSettings, Environment};
pub use wire::{FormatKind, WireFormat};
