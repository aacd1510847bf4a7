//! CLI definitions for agentpage.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// agentpage CLI.
#[derive(Parser)]
#[command(name = "agentpage")]
#[command(about = "Settlement-aware semantic page mapping for browser-driving agents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults to config/default.toml when present)
    #[arg(short, long, global = true, env = "AGENTPAGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Read tool calls as JSON lines on stdin, answer on stdout (default)
    Serve,

    /// Open a page and print its manifest
    Map {
        /// URL to open
        url: String,
    },

    /// List the registered tools as JSON
    Tools,

    /// Validate the configuration and exit
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["agentpage"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_map_with_global_config() {
        let cli = Cli::try_parse_from(["agentpage", "map", "https://example.com", "--config", "a.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Map {
                url: "https://example.com".to_string()
            })
        );
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
    }

    #[test]
    fn test_check_config_subcommand() {
        let cli = Cli::try_parse_from(["agentpage", "check-config"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));
    }

    #[test]
    fn test_map_requires_url() {
        assert!(Cli::try_parse_from(["agentpage", "map"]).is_err());
    }
}
