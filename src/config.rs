use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Lessons, exams, flashcards and schedules API")]
pub struct Args {
    /// Host to bind to (overrides EDU_PLATFORM_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides EDU_PLATFORM_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides EDU_PLATFORM_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// SQLite pool size (overrides EDU_PLATFORM_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |name| env::var(name))?;
        Ok((cfg, migrate))
    }

    /// Merge CLI arguments over values read through `lookup`, then defaults.
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let env_host = lookup("EDU_PLATFORM_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_var(&lookup, "EDU_PLATFORM_PORT", 3000u16)?;
        let env_db = lookup("EDU_PLATFORM_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/edu_platform.db".into());
        let env_max_connections = parse_var(&lookup, "EDU_PLATFORM_MAX_CONNECTIONS", 5u32)?;

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_connections),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Result<String, env::VarError> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned().ok_or(env::VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_without_env_or_args() {
        let cfg = AppConfig::resolve(Args::default(), lookup_in(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.database_url, "sqlite://./data/edu_platform.db");
        assert_eq!(cfg.max_connections, 5);
    }

    #[test]
    fn args_override_env() {
        let env = lookup_in(&[
            ("EDU_PLATFORM_HOST", "10.0.0.1"),
            ("EDU_PLATFORM_PORT", "8080"),
            ("EDU_PLATFORM_MAX_CONNECTIONS", "9"),
        ]);
        let args = Args {
            port: Some(9000),
            ..Args::default()
        };
        let cfg = AppConfig::resolve(args, env).unwrap();
        assert_eq!(cfg.host, "10.0.0.1");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_connections, 9);
    }

    #[test]
    fn malformed_port_is_an_error() {
        let err = AppConfig::resolve(
            Args::default(),
            lookup_in(&[("EDU_PLATFORM_PORT", "eighty")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("EDU_PLATFORM_PORT"));
    }
}
