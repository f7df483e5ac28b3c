use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Common CLI arguments shared across otelbridge binaries
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Common subcommands available for all binaries
#[derive(Subcommand, Debug, Clone, Default)]
pub enum CommonCommands {
    /// Start the service (default behavior)
    #[default]
    Start,
    /// Show current configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate configuration and exit
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use anyhow::{Context, Result};

    /// Initialize logging based on CLI arguments
    pub fn init_logging(args: &CommonArgs) {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", level);
        }
        tracing_subscriber::fmt::init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("otelbridge Configuration:");
            println!("=========================");
            println!("Upstream URL: {}", config.upstream.url);
            println!("Upstream timeout: {:?}", config.upstream.timeout);
            println!("Upstream TLS verification: {}", config.upstream.verify_tls);
            println!("HTTP bind: {}:{}", config.http.bind, config.http.port);
            println!("Resource service.name: {}", config.resource.service_name);
            println!(
                "Resource service.instance.id: {}",
                config.resource.service_instance_id
            );
        }
        Ok(())
    }

    /// Validate configuration and report any issues
    pub fn validate_config(config: &Configuration) -> Result<()> {
        log::info!("Validating configuration...");

        if config.upstream.url.is_empty() {
            anyhow::bail!("Upstream URL cannot be empty");
        }

        if config.upstream.timeout.is_zero() {
            anyhow::bail!("Upstream timeout must be greater than zero");
        }

        if config.http.bind.parse::<std::net::IpAddr>().is_err() {
            anyhow::bail!("HTTP bind address is not a valid IP address");
        }

        log::info!("Configuration validation passed");
        Ok(())
    }

    /// Handle common CLI commands that don't require starting services.
    /// Returns true when the command was fully handled and the binary should exit.
    pub fn handle_common_command(command: &CommonCommands, config: &Configuration) -> Result<bool> {
        match command {
            CommonCommands::Config { json } => {
                display_config(config, *json)?;
                Ok(true)
            }
            CommonCommands::Validate => {
                validate_config(config)?;
                Ok(true)
            }
            CommonCommands::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(true)
            }
            CommonCommands::Start => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    #[test]
    fn test_validate_default_config() {
        let config = Configuration::default();
        assert!(utils::validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = Configuration::default();
        config.upstream.url = String::new();
        assert!(utils::validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Configuration::default();
        config.upstream.timeout = std::time::Duration::ZERO;
        assert!(utils::validate_config(&config).is_err());
    }

    #[test]
    fn test_config_command_is_terminal() {
        let config = Configuration::default();
        let handled =
            utils::handle_common_command(&CommonCommands::Config { json: true }, &config).unwrap();
        assert!(handled);

        let handled = utils::handle_common_command(&CommonCommands::Start, &config).unwrap();
        assert!(!handled);
    }
}
