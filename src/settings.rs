//! Environment-driven configuration.
//!
//! Values come from the process environment (after `dotenvy` has loaded any
//! `.env` file); CLI flags override them where both exist.

use anyhow::{Result, anyhow};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CANVAS_BASE_URL: &str = "https://canvas.instructure.com/api/v1";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/canvas_grades.log";

#[derive(Debug, Clone)]
pub struct Settings {
    pub canvas_base_url: String,
    pub canvas_user_id: String,
    /// Token used by the CLI when `--token` is not given.
    pub canvas_api_token: Option<String>,
    pub http_timeout: Duration,
    pub http_connect_timeout: Duration,
    pub http_max_retries: u32,
    pub http_retry_base_delay: Duration,
    pub fetch_concurrency: usize,
    pub server_host: String,
    pub server_port: u16,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
    pub log_file_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_base_url: DEFAULT_CANVAS_BASE_URL.to_string(),
            canvas_user_id: "self".to_string(),
            canvas_api_token: None,
            http_timeout: Duration::from_secs(30),
            http_connect_timeout: Duration::from_secs(10),
            http_max_retries: 3,
            http_retry_base_delay: Duration::from_millis(500),
            fetch_concurrency: 5,
            server_host: "0.0.0.0".to_string(),
            server_port: 5001,
            cors_origins: Vec::new(),
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let fetch_concurrency = parse_or(&get, "FETCH_CONCURRENCY", defaults.fetch_concurrency)?;
        if fetch_concurrency == 0 {
            return Err(anyhow!("FETCH_CONCURRENCY must be at least 1"));
        }

        Ok(Self {
            canvas_base_url: get("CANVAS_BASE_URL").unwrap_or(defaults.canvas_base_url),
            canvas_user_id: get("CANVAS_USER_ID").unwrap_or(defaults.canvas_user_id),
            canvas_api_token: get("CANVAS_API_TOKEN"),
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 30)?),
            http_connect_timeout: Duration::from_secs(parse_or(
                &get,
                "HTTP_CONNECT_TIMEOUT_SECS",
                10,
            )?),
            http_max_retries: parse_or(&get, "HTTP_MAX_RETRIES", defaults.http_max_retries)?,
            http_retry_base_delay: Duration::from_millis(parse_or(
                &get,
                "HTTP_RETRY_BASE_MS",
                500,
            )?),
            fetch_concurrency,
            server_host: get("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_or(&get, "PORT", defaults.server_port)?,
            cors_origins: get("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|item| item.trim().to_string())
                        .filter(|item| !item.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_file_path: get("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow!("Invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.canvas_base_url, DEFAULT_CANVAS_BASE_URL);
        assert_eq!(settings.canvas_user_id, "self");
        assert_eq!(settings.canvas_api_token, None);
        assert_eq!(settings.fetch_concurrency, 5);
        assert_eq!(settings.server_port, 5001);
        assert_eq!(settings.http_max_retries, 3);
        assert!(settings.cors_origins.is_empty());
    }

    #[test]
    fn test_overrides_are_applied() {
        let settings = Settings::from_lookup(lookup(&[
            ("CANVAS_BASE_URL", "https://school.instructure.com/api/v1"),
            ("CANVAS_API_TOKEN", " abc "),
            ("PORT", "8080"),
            ("HTTP_RETRY_BASE_MS", "50"),
            ("CORS_ORIGINS", "http://localhost:5173, https://grades.example"),
            ("SERVER_HOST", "   "),
        ]))
        .unwrap();

        assert_eq!(settings.canvas_base_url, "https://school.instructure.com/api/v1");
        assert_eq!(settings.canvas_api_token.as_deref(), Some("abc"));
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
        assert_eq!(settings.http_retry_base_delay, Duration::from_millis(50));
        assert_eq!(settings.cors_origins, vec!["http://localhost:5173", "https://grades.example"]);
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = Settings::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        assert!(Settings::from_lookup(lookup(&[("FETCH_CONCURRENCY", "0")])).is_err());
    }
}
