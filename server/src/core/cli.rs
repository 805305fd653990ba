use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CACHE_MAX_ENTRIES, ENV_CONFIG, ENV_CORS_ORIGINS, ENV_HOST, ENV_JWT_SECRET, ENV_PORT,
    ENV_RATE_LIMIT_BYPASS_HEADER, ENV_RATE_LIMIT_ENABLED, ENV_RATE_LIMIT_MAX,
    ENV_RATE_LIMIT_WINDOW_SECS, ENV_SECURE_COOKIES,
};

#[derive(Parser)]
#[command(name = "leadbook")]
#[command(version, about = "Lead management API server", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Secret used to sign session tokens (at least 32 bytes)
    #[arg(long, global = true, env = ENV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Mark session cookies as Secure (requires HTTPS)
    #[arg(long, global = true, env = ENV_SECURE_COOKIES)]
    pub secure_cookies: Option<bool>,

    /// Additional allowed CORS origins (comma separated)
    #[arg(long, global = true, env = ENV_CORS_ORIGINS, value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Maximum number of cache entries
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<u64>,

    // Rate limit options
    /// Enable or disable rate limiting
    #[arg(long, global = true, env = ENV_RATE_LIMIT_ENABLED)]
    pub rate_limit_enabled: Option<bool>,

    /// Requests allowed per window per client IP
    #[arg(long, global = true, env = ENV_RATE_LIMIT_MAX)]
    pub rate_limit_max: Option<u32>,

    /// Rate limit window length in seconds
    #[arg(long, global = true, env = ENV_RATE_LIMIT_WINDOW_SECS)]
    pub rate_limit_window_secs: Option<u64>,

    /// Rate limit bypass header secret
    #[arg(long, global = true, env = ENV_RATE_LIMIT_BYPASS_HEADER)]
    pub rate_limit_bypass_header: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database and migrations). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub secure_cookies: Option<bool>,
    pub cors_origins: Option<Vec<String>>,
    pub cache_max_entries: Option<u64>,
    pub rate_limit_enabled: Option<bool>,
    pub rate_limit_max: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
    pub rate_limit_bypass_header: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        jwt_secret: cli.jwt_secret,
        secure_cookies: cli.secure_cookies,
        cors_origins: cli.cors_origins,
        cache_max_entries: cli.cache_max_entries,
        rate_limit_enabled: cli.rate_limit_enabled,
        rate_limit_max: cli.rate_limit_max,
        rate_limit_window_secs: cli.rate_limit_window_secs,
        rate_limit_bypass_header: cli.rate_limit_bypass_header,
    };
    (config, cli.command)
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
    fn test_cli_parses_overrides() {
        let cli = Cli::try_parse_from([
            "leadbook",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "--cors-origins",
            "https://a.example,https://b.example",
            "--rate-limit-max",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(
            cli.cors_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert_eq!(cli.rate_limit_max, Some(10));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_prune_subcommand() {
        let cli = Cli::try_parse_from(["leadbook", "system", "prune", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::System {
                command: SystemCommands::Prune { yes: true }
            })
        ));
    }
}
