//! Server configuration
//!
//! Sources, later ones winning: built-in defaults, an optional config file,
//! `SOCIAL_*` environment variables, then command-line flags.

use clap::Parser;
use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "SOCIAL";

#[derive(Debug, Clone, Parser)]
#[command(name = "social-server")]
#[command(author, version, about = "Social Network API server", long_about = None)]
pub struct Cli {
    /// Config file (toml, yaml or json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8001
    #[arg(short, long)]
    pub bind: Option<String>,

    /// SQLite database file
    #[arg(short, long)]
    pub database: Option<String>,

    /// Do not insert the demo users and posts into an empty database
    #[arg(long)]
    pub no_seed: bool,

    /// Serve the frontend from this directory
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub database_path: String,
    pub seed_sample_data: bool,
    pub static_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl ServerConfig {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        Self::load_with_env(cli, None)
    }

    /// `env` replaces the process environment when given.
    fn load_with_env(cli: &Cli, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bind_address", "127.0.0.1:8001")?
            .set_default("database_path", "social_network.db")?
            .set_default("seed_sample_data", true)?
            .set_default("log_filter", "info")?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("bind_address", cli.bind.clone())?
            .set_override_option("database_path", cli.database.clone())?
            .set_override_option("seed_sample_data", cli.no_seed.then_some(false))?
            .set_override_option(
                "static_dir",
                cli.static_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            )?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["social-server"]);
        let config = ServerConfig::load_with_env(&cli, env(&[])).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8001");
        assert_eq!(config.database_path, "social_network.db");
        assert!(config.seed_sample_data);
        assert!(config.static_dir.is_none());
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_env_overrides_defaults() {
        let cli = Cli::parse_from(["social-server"]);
        let config = ServerConfig::load_with_env(
            &cli,
            env(&[
                ("SOCIAL_BIND_ADDRESS", "0.0.0.0:9000"),
                ("SOCIAL_SEED_SAMPLE_DATA", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert!(!config.seed_sample_data);
    }

    #[test]
    fn test_flags_override_env_and_file() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("social.toml");
        std::fs::write(
            &config_path,
            "database_path = \"from-file.db\"\nlog_filter = \"debug\"\n",
        )?;

        let cli = Cli::parse_from([
            "social-server",
            "--config",
            config_path.to_str().unwrap(),
            "--bind",
            "127.0.0.1:7000",
            "--no-seed",
            "--static-dir",
            "frontend",
        ]);
        let config = ServerConfig::load_with_env(
            &cli,
            env(&[("SOCIAL_BIND_ADDRESS", "0.0.0.0:9000")]),
        )?;

        assert_eq!(config.bind_address, "127.0.0.1:7000");
        assert_eq!(config.database_path, "from-file.db");
        assert_eq!(config.log_filter, "debug");
        assert!(!config.seed_sample_data);
        assert_eq!(config.static_dir, Some(PathBuf::from("frontend")));

        Ok(())
    }
}
