//! Server configuration

use std::time::Duration;

const DEFAULT_ORACLE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_ORACLE_MODEL: &str = "deepseek-r1-distill-llama-70b";
const DEFAULT_CORS_ORIGINS: &str = "https://dev.druglabels.in,http://localhost:3000";

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Query log database; logging is trace-only when unset
    pub database_url: Option<String>,
    /// Oracle API key; `/generate-parm` answers 503 when unset
    pub oracle_api_key: Option<String>,
    pub oracle_api_url: String,
    pub oracle_model: String,
    pub oracle_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            database_url: non_empty_var("DATABASE_URL"),
            oracle_api_key: non_empty_var("GROQ_API_KEY"),
            oracle_api_url: non_empty_var("ORACLE_API_URL")
                .unwrap_or_else(|| DEFAULT_ORACLE_URL.into()),
            oracle_model: non_empty_var("ORACLE_MODEL")
                .unwrap_or_else(|| DEFAULT_ORACLE_MODEL.into()),
            oracle_timeout: Duration::from_secs(
                parsed_var("ORACLE_TIMEOUT_SECS").unwrap_or(30),
            ),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
            ),
            rate_limit_rps: parsed_var("RATE_LIMIT_RPS").unwrap_or(20),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".into(),
            database_url: None,
            oracle_api_key: None,
            oracle_api_url: DEFAULT_ORACLE_URL.into(),
            oracle_model: DEFAULT_ORACLE_MODEL.into(),
            oracle_timeout: Duration::from_secs(30),
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            rate_limit_rps: 20,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Split a comma-separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://a.example , ,http://localhost:3000"),
            vec!["https://a.example", "http://localhost:3000"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.oracle_model, "deepseek-r1-distill-llama-70b");
        assert_eq!(config.oracle_timeout, Duration::from_secs(30));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.oracle_api_key.is_none());
    }
}
