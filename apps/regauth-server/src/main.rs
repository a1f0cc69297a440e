//! # regauth-server
//!
//! Docker Registry v2 token server.
//!
//! ## Commands
//!
//! - `regauth-server [serve]` - run the HTTP token endpoint (default)
//! - `regauth-server check` - validate configuration and signing key
//! - `regauth-server hash-password` - print an Argon2 PHC hash of a password read from stdin
//!
//! Configuration is read from `--config` (YAML) and `REGAUTH__*` environment
//! variables, e.g. `REGAUTH__DOCKER_AUTH__ISSUER`.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

mod config;
mod server;

use config::{AppConfig, LogFormat, LoggingConfig};

/// Docker registry token server
#[derive(Parser)]
#[command(name = "regauth-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective configuration (secrets redacted) and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the token server
    Serve,
    /// Validate the configuration, signing key and plugins, then exit
    Check,
    /// Read a password from stdin and print its Argon2 PHC hash
    HashPassword,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.command == Some(Commands::HashPassword) {
        return hash_password();
    }

    let cfg = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }

    init_logging(&cfg.logging)?;

    match cli.command {
        Some(Commands::Check) => {
            server::Runtime::build(&cfg)?;
            info!("Configuration is valid");
            println!("configuration OK");
            Ok(())
        }
        Some(Commands::Serve) | None => server::serve(cfg, cli.config).await,
        Some(Commands::HashPassword) => hash_password(),
    }
}

fn hash_password() -> Result<()> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    anyhow::ensure!(!password.is_empty(), "password must not be empty");

    let hash = static_identity_plugin::hash_password(password)
        .context("Failed to hash password")?;
    println!("{hash}");
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(cfg: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&cfg.level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false);

    match cfg.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["regauth-server", "--config", "regauth.yaml"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, Some(PathBuf::from("regauth.yaml")));
    }

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["regauth-server", "hash-password"]).unwrap();
        assert_eq!(cli.command, Some(Commands::HashPassword));

        let cli = Cli::try_parse_from(["regauth-server", "check", "-c", "x.yaml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Check));
        assert!(!cli.print_config);
    }
}
