//! CLI argument parsing and command definitions.
//!
//! Global flags select the config file and verbosity; subcommands fetch a
//! page, show the resolved endpoints, run a live preview session, or manage
//! the config file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "stackpage", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "STACKPAGE_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a page and print it as JSON (`null` when nothing matches).
    Fetch {
        /// Page URL path.
        #[arg(default_value = "/")]
        url: String,

        /// Live preview hash of an editing session.
        #[arg(long)]
        hash: Option<String>,

        /// Answer from a GraphQL response file instead of the network.
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the resolved endpoints.
    Endpoints,

    /// Run a live preview session driven by stdin.
    ///
    /// Every input line is an entry-change notification; a non-empty line
    /// also becomes the session hash.
    Preview {
        /// Page URL path.
        #[arg(default_value = "/")]
        url: String,

        /// Answer from a GraphQL response file instead of the network.
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by key.
    Get {
        /// Key (e.g., "region").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print configuration as `CONTENTSTACK_*` environment assignments.
    Export,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["stackpage"]);
        assert!(args.config.is_none());
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_verbose_and_quiet() {
        let args = CliArgs::parse_from(["stackpage", "--verbose"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["stackpage", "-q"]);
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_args_config() {
        let args = CliArgs::parse_from(["stackpage", "--config", "/path/to/config.toml"]);
        assert_eq!(args.config, Some("/path/to/config.toml".to_string()));
    }

    #[test]
    fn test_fetch_command_defaults() {
        let args = CliArgs::parse_from(["stackpage", "fetch"]);
        assert!(matches!(
            args.command,
            Some(Command::Fetch { ref url, hash: None, fixture: None, pretty: false }) if url == "/"
        ));
    }

    #[test]
    fn test_fetch_command_options() {
        let args = CliArgs::parse_from([
            "stackpage",
            "fetch",
            "/about",
            "--hash",
            "abc",
            "--fixture",
            "page.json",
            "--pretty",
        ]);
        match args.command {
            Some(Command::Fetch {
                url,
                hash,
                fixture,
                pretty,
            }) => {
                assert_eq!(url, "/about");
                assert_eq!(hash.as_deref(), Some("abc"));
                assert_eq!(fixture, Some(PathBuf::from("page.json")));
                assert!(pretty);
            }
            other => unreachable!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn test_endpoints_command() {
        let args = CliArgs::parse_from(["stackpage", "endpoints"]);
        assert!(matches!(args.command, Some(Command::Endpoints)));
    }

    #[test]
    fn test_preview_command() {
        let args = CliArgs::parse_from(["stackpage", "preview", "/blog", "--fixture", "f.json"]);
        assert!(matches!(
            args.command,
            Some(Command::Preview { ref url, fixture: Some(_) }) if url == "/blog"
        ));
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["stackpage", "version"]);
        assert!(matches!(args.command, Some(Command::Version)));
    }

    // ------------------------------------------------------------------------
    // Config command tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_path_command() {
        let args = CliArgs::parse_from(["stackpage", "config", "path"]);
        assert!(matches!(
            args.command,
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Path
            }))
        ));
    }

    #[test]
    fn test_config_get_command() {
        let args = CliArgs::parse_from(["stackpage", "config", "get", "region"]);
        assert!(matches!(
            args.command,
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Get { ref key }
            })) if key == "region"
        ));
    }

    #[test]
    fn test_config_init_command() {
        let args = CliArgs::parse_from(["stackpage", "config", "init", "--file", "/tmp/c.toml", "--force"]);
        assert!(matches!(
            args.command,
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Init { file: Some(_), force: true }
            }))
        ));
    }

    #[test]
    fn test_config_export_command() {
        let args = CliArgs::parse_from(["stackpage", "config", "export"]);
        assert!(matches!(
            args.command,
            Some(Command::Config(ConfigCommand {
                command: ConfigAction::Export
            }))
        ));
    }
}
