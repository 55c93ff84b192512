//! CLI module for patlaw
//!
//! Command-line parsing for the patlaw-server binary. Uses clap for argument
//! parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// patlaw - agent registry and European patent law research tools
#[derive(Parser, Debug)]
#[command(
    name = "patlaw-server",
    version,
    about = "Agent registry and European patent law research tools over HTTP",
    long_about = "Stores chat-agent configurations and serves two retrieval tools:\n\
                  eplaw (EPO legal corpus search) and patent_claims (EPO OPS claims lookup).\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config.",
    after_help = "EXAMPLES:\n    \
                  patlaw-server init                                  # Write a starter patlaw.toml\n    \
                  patlaw-server                                       # Start the server\n    \
                  patlaw-server config --validate                     # Check config and secrets\n    \
                  patlaw-server tool eplaw '{\"query\": \"Art. 54\"}'   # Run a tool once"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "patlaw.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (the default)
    Serve,

    /// Write a starter patlaw.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "8000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Also check that every referenced environment variable is set
        #[arg(long)]
        validate: bool,
    },

    /// Run a tool once and print its documents as JSON
    Tool {
        /// Tool name, e.g. eplaw or patent_claims
        name: String,

        /// Tool parameters as a JSON object
        #[arg(default_value = "{}")]
        params: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["patlaw-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("patlaw.toml"));
    }

    #[test]
    fn test_tool_subcommand() {
        let cli = Cli::try_parse_from([
            "patlaw-server",
            "--config",
            "other.toml",
            "tool",
            "patent_claims",
            r#"{"patent_number": "EP1000000"}"#,
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        match cli.command {
            Some(Commands::Tool { name, params }) => {
                assert_eq!(name, "patent_claims");
                assert!(params.contains("EP1000000"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_validate_flag() {
        let cli = Cli::try_parse_from(["patlaw-server", "config", "--validate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { validate: true })));
    }
}
