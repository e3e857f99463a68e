//! Codec configuration
//!
//! Settings come from an optional JSON file, overridden by environment
//! variables. They are resolved once and handed to [`crate::SecretCodec::new`];
//! the codec never reads the environment itself.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::crypto::{SecretKey, DEFAULT_ITERATIONS, KEY_LEN};
use crate::error::ConfigError;

/// Environment variable holding the secret key
pub const ENV_ENCRYPTION_KEY: &str = "VAULT_ENCRYPTION_KEY";
/// Environment variable selecting `development` or `production`
pub const ENV_ENVIRONMENT: &str = "VAULT_ENV";
/// Environment variable toggling the unencrypted fallback tier
pub const ENV_ALLOW_FALLBACK: &str = "VAULT_ALLOW_PLAINTEXT_FALLBACK";
/// Environment variable overriding the PBKDF2 iteration count
pub const ENV_HASH_ITERATIONS: &str = "VAULT_HASH_ITERATIONS";

/// Built-in key substituted when none is configured outside production.
///
/// DEVELOPMENT ONLY. Anything encrypted with it is effectively public.
pub const DEVELOPMENT_ONLY_KEY: &str = "dev-only-insecure-vault-key-0000";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::Invalid {
                field: ENV_ENVIRONMENT,
                message: format!("unknown environment '{}'", other),
            }),
        }
    }
}

/// Codec settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodecSettings {
    /// Secret key string; only its first 32 bytes are used
    pub secret_key: Option<SecretKey>,
    pub environment: Environment,
    /// Whether `encode` may degrade to unencrypted base64
    pub allow_plaintext_fallback: bool,
    /// PBKDF2 iterations for credential hashing
    pub hash_iterations: u32,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            secret_key: None,
            environment: Environment::Development,
            allow_plaintext_fallback: true,
            hash_iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl CodecSettings {
    /// Settings with an explicit key and defaults for everything else
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            secret_key: Some(SecretKey::new(key)),
            ..Self::default()
        }
    }

    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Load settings from a JSON file
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&contents)?;
        debug!("Loaded codec settings from {:?}", path);
        Ok(settings)
    }

    /// Apply variables from `lookup` on top of these settings.
    ///
    /// Empty values are treated as unset.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_ENCRYPTION_KEY) {
            self.secret_key = Some(SecretKey::new(key));
        }
        if let Some(env) = get(ENV_ENVIRONMENT) {
            self.environment = env.parse()?;
        }
        if let Some(flag) = get(ENV_ALLOW_FALLBACK) {
            self.allow_plaintext_fallback = parse_bool(ENV_ALLOW_FALLBACK, &flag)?;
        }
        if let Some(iterations) = get(ENV_HASH_ITERATIONS) {
            self.hash_iterations =
                iterations
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                        field: ENV_HASH_ITERATIONS,
                        message: e.to_string(),
                    })?;
        }

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hash_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "hashIterations",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the key to use.
    ///
    /// Production fails fast on a missing or short key. Elsewhere a missing
    /// key is replaced by [`DEVELOPMENT_ONLY_KEY`] and a short key is passed
    /// through, which leaves the codec without a usable cipher key.
    pub fn resolve_key(&self) -> Result<SecretKey, ConfigError> {
        match (&self.secret_key, self.environment) {
            (Some(key), Environment::Production) if key.len() < KEY_LEN => {
                Err(ConfigError::WeakKey {
                    expected: KEY_LEN,
                    got: key.len(),
                })
            }
            (Some(key), _) => Ok(key.clone()),
            (None, Environment::Production) => Err(ConfigError::MissingKey),
            (None, Environment::Development) => {
                warn!(
                    "{} is not set; using the built-in development key. Do not store real secrets with it",
                    ENV_ENCRYPTION_KEY
                );
                Ok(SecretKey::new(DEVELOPMENT_ONLY_KEY))
            }
        }
    }
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            field,
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = CodecSettings::from_lookup(lookup(&[])).unwrap();
        assert!(settings.secret_key.is_none());
        assert_eq!(settings.environment, Environment::Development);
        assert!(settings.allow_plaintext_fallback);
        assert_eq!(settings.hash_iterations, 100_000);
    }

    #[test]
    fn test_missing_key_in_development_uses_marked_default() {
        let settings = CodecSettings::default();
        let key = settings.resolve_key().unwrap();
        assert_eq!(key.expose(), DEVELOPMENT_ONLY_KEY);
        assert_eq!(DEVELOPMENT_ONLY_KEY.len(), KEY_LEN);
    }

    #[test]
    fn test_missing_key_in_production_fails_fast() {
        let settings = CodecSettings::from_lookup(lookup(&[(ENV_ENVIRONMENT, "production")])).unwrap();
        assert!(matches!(settings.resolve_key(), Err(ConfigError::MissingKey)));
    }

    #[test]
    fn test_short_key_in_production_is_rejected() {
        let settings = CodecSettings::from_lookup(lookup(&[
            (ENV_ENVIRONMENT, "prod"),
            (ENV_ENCRYPTION_KEY, "short"),
        ]))
        .unwrap();
        assert!(matches!(
            settings.resolve_key(),
            Err(ConfigError::WeakKey { expected: 32, got: 5 })
        ));
    }

    #[test]
    fn test_short_key_in_development_passes_through() {
        let settings = CodecSettings::with_key("short");
        assert_eq!(settings.resolve_key().unwrap().expose(), "short");
    }

    #[test]
    fn test_env_overrides() {
        let settings = CodecSettings::from_lookup(lookup(&[
            (ENV_ENCRYPTION_KEY, "0123456789abcdef0123456789abcdef"),
            (ENV_ALLOW_FALLBACK, "off"),
            (ENV_HASH_ITERATIONS, "2000"),
        ]))
        .unwrap();

        assert_eq!(
            settings.resolve_key().unwrap().expose(),
            "0123456789abcdef0123456789abcdef"
        );
        assert!(!settings.allow_plaintext_fallback);
        assert_eq!(settings.hash_iterations, 2000);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let settings = CodecSettings::from_lookup(lookup(&[(ENV_ENCRYPTION_KEY, "  ")])).unwrap();
        assert!(settings.secret_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(CodecSettings::from_lookup(lookup(&[(ENV_ENVIRONMENT, "staging")])).is_err());
        assert!(CodecSettings::from_lookup(lookup(&[(ENV_ALLOW_FALLBACK, "maybe")])).is_err());
        assert!(CodecSettings::from_lookup(lookup(&[(ENV_HASH_ITERATIONS, "-1")])).is_err());

        let zero = CodecSettings::from_lookup(lookup(&[(ENV_HASH_ITERATIONS, "0")])).unwrap();
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_load_file_with_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("codec.json");
        std::fs::write(
            &path,
            r#"{
                "secretKey": "file-key-file-key-file-key-file-key",
                "environment": "production",
                "hashIterations": 5000
            }"#,
        )
        .unwrap();

        let settings = CodecSettings::load_file(&path)
            .unwrap()
            .with_overrides(lookup(&[(ENV_HASH_ITERATIONS, "7000")]))
            .unwrap();

        assert_eq!(settings.environment, Environment::Production);
        assert!(settings.allow_plaintext_fallback);
        assert_eq!(settings.hash_iterations, 7000);
        assert_eq!(
            settings.resolve_key().unwrap().expose(),
            "file-key-file-key-file-key-file-key"
        );
    }

    #[test]
    fn test_load_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = CodecSettings::load_file(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
