//! Bank token CLI.
//!
//! This tool provides commands for:
//! - Issuing bearer tokens with the configured bank key
//! - Verifying tokens against a public key, a JWKS document or the configured key
//! - Normalizing private key PEM to PKCS#8 and publishing the public JWKS
//! - Validating configuration files

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod error;
mod key;
mod logging;
mod token;

use error::CliError;
use token::{KeySelection, VerifyOptions};

#[derive(Parser)]
#[command(name = "btoken")]
#[command(about = "Bank service-to-service bearer token tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a token and print the token response JSON
    Issue {
        /// Path to the TOML configuration file
        #[arg(long, short, env = "BANK_TOKEN_CONFIG")]
        config: PathBuf,
    },

    /// Verify a token and print the verification JSON
    Verify(VerifyArgs),

    /// Key utilities
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct VerifyArgs {
    /// Path to the TOML configuration file
    #[arg(long, short, env = "BANK_TOKEN_CONFIG")]
    config: PathBuf,

    /// Verify with this public key PEM instead of the configured key
    #[arg(long, conflicts_with = "jwks")]
    public_key: Option<PathBuf>,

    /// Verify with the key from this JWKS document matching the token's kid
    #[arg(long)]
    jwks: Option<PathBuf>,

    /// Expected issuer id (defaults to the configured issuer)
    #[arg(long)]
    issuer: Option<String>,

    /// Expected audience (defaults to the configured audience)
    #[arg(long)]
    audience: Option<String>,

    /// The token, optionally prefixed with `Bearer `
    token: String,
}

#[derive(Subcommand)]
enum KeyAction {
    /// Print a private key PEM as canonical PKCS#8 `PRIVATE KEY` PEM
    Normalize {
        /// Path to the private key PEM
        file: PathBuf,
    },

    /// Print the JWKS document for the configured key
    Jwks {
        /// Path to the TOML configuration file
        #[arg(long, short, env = "BANK_TOKEN_CONFIG")]
        config: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate config against settings validation
    Validate {
        /// Path to the TOML configuration file
        #[arg(long, short, env = "BANK_TOKEN_CONFIG")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logger(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Issue { config } => {
            let response = token::issue(&config)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Verify(args) => {
            let key = match (args.public_key, args.jwks) {
                (Some(path), _) => KeySelection::PublicKeyFile(path),
                (None, Some(path)) => KeySelection::Jwks(path),
                (None, None) => KeySelection::Configured,
            };
            let response = token::verify(&VerifyOptions {
                config: args.config,
                key,
                issuer: args.issuer,
                audience: args.audience,
                token: args.token,
            })?;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if !response.valid {
                return Err(CliError::Rejected(
                    response.reason.unwrap_or_else(|| "invalid".to_string()),
                ));
            }
        }
        Commands::Key { action } => match action {
            KeyAction::Normalize { file } => print!("{}", key::normalize(&file)?),
            KeyAction::Jwks { config } => println!("{}", key::jwks(&config)?),
        },
        Commands::Config { action } => match action {
            ConfigAction::Validate { config } => print!("{}", config::validate(&config)?),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verify_args_parse() {
        let cli = Cli::try_parse_from([
            "btoken",
            "verify",
            "-c",
            "bank-token.toml",
            "--jwks",
            "jwks.json",
            "--audience",
            "https://api.example/",
            "abc.def.ghi",
        ])
        .unwrap();

        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.jwks, Some(PathBuf::from("jwks.json")));
                assert_eq!(args.audience.as_deref(), Some("https://api.example/"));
                assert_eq!(args.token, "abc.def.ghi");
            }
            _ => panic!("Expected verify command"),
        }
    }

    #[test]
    fn test_public_key_conflicts_with_jwks() {
        let result = Cli::try_parse_from([
            "btoken",
            "verify",
            "-c",
            "x.toml",
            "--public-key",
            "k.pem",
            "--jwks",
            "j.json",
            "t",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_verbose_flag() {
        let cli = Cli::try_parse_from(["btoken", "key", "normalize", "key.pem", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
