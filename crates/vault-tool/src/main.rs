//! vault-tool - operate on stored vault secrets from the command line
//!
//! Reads the same configuration as the services that embed vault-codec
//! (`VAULT_ENCRYPTION_KEY`, `VAULT_ENV`, ...), optionally layered over a JSON
//! settings file. Secrets may be passed as `-` to read them from stdin, which
//! keeps them out of shell history.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use vault_codec::{CodecSettings, SecretCodec};

mod commands;

/// Vault secret codec tool
#[derive(Parser, Debug)]
#[command(name = "vault-tool")]
#[command(version)]
#[command(about = "Encode, inspect, hash and migrate stored vault secrets")]
struct Args {
    /// JSON settings file; environment variables override its values
    #[arg(long, global = true, env = "VAULT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encrypt a secret into the current wire format
    Encode {
        /// Plaintext, or `-` for stdin
        plaintext: String,
    },
    /// Decrypt a stored value
    Decode {
        /// Stored value, or `-` for stdin
        encoded: String,
        /// Fail instead of passing through values that did not verify
        #[arg(long)]
        strict: bool,
    },
    /// Report the format and decode status of a stored value as JSON
    Inspect {
        /// Stored value, or `-` for stdin
        encoded: String,
    },
    /// Hash a credential for one-way storage
    Hash {
        /// Credential, or `-` for stdin
        credential: String,
    },
    /// Check a credential against a stored hash (exit code 1 on mismatch)
    Verify {
        /// Candidate credential, or `-` for stdin
        candidate: String,
        /// Stored `salt:hash` value
        hashed: String,
    },
    /// Re-encode stored values read line by line from stdin
    Migrate,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for piping
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let settings = load_settings(args.config.as_deref())?;
    let codec = SecretCodec::new(&settings)?;

    let mut stdout = std::io::stdout().lock();
    match args.command {
        Command::Encode { plaintext } => {
            commands::encode(&codec, &commands::read_arg(plaintext)?, &mut stdout)
        }
        Command::Decode { encoded, strict } => {
            commands::decode(&codec, &commands::read_arg(encoded)?, strict, &mut stdout)
        }
        Command::Inspect { encoded } => {
            commands::inspect(&codec, &commands::read_arg(encoded)?, &mut stdout)
        }
        Command::Hash { credential } => {
            commands::hash(&codec, &commands::read_arg(credential)?, &mut stdout)
        }
        Command::Verify { candidate, hashed } => {
            commands::verify(&codec, &commands::read_arg(candidate)?, &hashed, &mut stdout)
        }
        Command::Migrate => commands::migrate(
            &codec,
            std::io::stdin().lock(),
            &mut stdout,
            &mut std::io::stderr(),
        ),
    }
}

fn load_settings(config: Option<&std::path::Path>) -> anyhow::Result<CodecSettings> {
    let settings = match config {
        Some(path) => CodecSettings::load_file(path)?.with_overrides(|name| std::env::var(name).ok())?,
        None => CodecSettings::from_env()?,
    };
    Ok(settings)
}
