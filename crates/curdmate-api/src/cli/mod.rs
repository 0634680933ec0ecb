//! CLI command definitions for the `curdmate` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Manage your contacts by chatting with them.
#[derive(Parser)]
#[command(name = "curdmate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Record API base URL, overriding `[record_api] base_url`.
    #[arg(long, global = true, env = "CURDMATE_API_URL")]
    pub api_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat {
        /// Read the bearer token from this environment variable instead of
        /// `[record_api] token_env`.
        #[arg(long)]
        token_env: Option<String>,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the effective configuration.
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["curdmate", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(8080));
                assert!(host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["curdmate", "-vv", "chat"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Chat { token_env: None }));
    }
}
