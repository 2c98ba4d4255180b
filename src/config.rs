use std::env;
use std::path::PathBuf;

/// Environment variable naming the dataset shown when nothing was uploaded.
pub const DEFAULT_SOURCE_VAR: &str = "SALES_LENS_DEFAULT_SOURCE";

/// Configuration loaded from the environment (and an optional `.env` file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Fallback dataset path. The first CLI argument overrides the env var.
    pub default_source: Option<PathBuf>,
    /// `env_logger` filter string.
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                eprintln!("Ignoring unreadable .env file: {e}");
            }
        }
        Self::from_parts(
            env::args().nth(1),
            env::var(DEFAULT_SOURCE_VAR).ok(),
            env::var("RUST_LOG").ok(),
        )
    }

    fn from_parts(arg: Option<String>, var: Option<String>, rust_log: Option<String>) -> Self {
        let default_source = arg
            .or(var)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        AppConfig {
            default_source,
            log_filter: rust_log.unwrap_or_else(|| "info".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins_over_env() {
        let cfg = AppConfig::from_parts(
            Some("cli.csv".into()),
            Some("env.csv".into()),
            None,
        );
        assert_eq!(cfg.default_source, Some(PathBuf::from("cli.csv")));
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn blank_values_mean_no_default() {
        let cfg = AppConfig::from_parts(None, Some("  ".into()), Some("debug".into()));
        assert!(cfg.default_source.is_none());
        assert_eq!(cfg.log_filter, "debug");
    }
}
