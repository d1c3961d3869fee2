use anyhow::{Context, Result};

const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = concat!("haulplan/", env!("CARGO_PKG_VERSION"));

/// Server configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub nominatim_url: String,
    /// Unset means legs are estimated as straight lines.
    pub osrm_url: Option<String>,
    pub user_agent: String,
    pub provider_timeout: std::time::Duration,
    pub retry_backoff: std::time::Duration,
    pub reverse_geocode: bool,
    pub reverse_geocode_concurrency: usize,
    /// Unset allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            osrm_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            provider_timeout: std::time::Duration::from_secs(10),
            retry_backoff: std::time::Duration::from_millis(250),
            reverse_geocode: true,
            reverse_geocode_concurrency: 4,
            cors_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, defaults filling the gaps.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(port) => port.parse().with_context(|| format!("PORT must be a port number, got {port}"))?,
            None => defaults.port,
        };
        let provider_timeout = match get("PROVIDER_TIMEOUT_SECS") {
            Some(secs) => std::time::Duration::from_secs(
                secs.parse()
                    .with_context(|| format!("PROVIDER_TIMEOUT_SECS must be whole seconds, got {secs}"))?,
            ),
            None => defaults.provider_timeout,
        };
        let retry_backoff = match get("PROVIDER_RETRY_BACKOFF_MS") {
            Some(ms) => std::time::Duration::from_millis(
                ms.parse()
                    .with_context(|| format!("PROVIDER_RETRY_BACKOFF_MS must be milliseconds, got {ms}"))?,
            ),
            None => defaults.retry_backoff,
        };
        let reverse_geocode = match get("REVERSE_GEOCODE") {
            Some(flag) => parse_flag(&flag).with_context(|| format!("REVERSE_GEOCODE must be true or false, got {flag}"))?,
            None => defaults.reverse_geocode,
        };
        let reverse_geocode_concurrency = match get("REVERSE_GEOCODE_CONCURRENCY") {
            Some(n) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .with_context(|| format!("REVERSE_GEOCODE_CONCURRENCY must be a positive number, got {n}"))?,
            None => defaults.reverse_geocode_concurrency,
        };
        if provider_timeout.is_zero() {
            anyhow::bail!("PROVIDER_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            port,
            nominatim_url: get("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            osrm_url: get("OSRM_URL"),
            user_agent: get("USER_AGENT").unwrap_or(defaults.user_agent),
            provider_timeout,
            retry_backoff,
            reverse_geocode,
            reverse_geocode_concurrency,
            cors_origin: get("CORS_ORIGIN").filter(|origin| origin != "*"),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        Config::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config(&[]).unwrap(), Config::default());
    }

    #[test]
    fn values_are_read() {
        let config = config(&[
            ("PORT", "8080"),
            ("OSRM_URL", "http://osrm:5000"),
            ("PROVIDER_TIMEOUT_SECS", "3"),
            ("REVERSE_GEOCODE", "off"),
            ("REVERSE_GEOCODE_CONCURRENCY", "2"),
            ("CORS_ORIGIN", "https://dashboard.example"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.osrm_url.as_deref(), Some("http://osrm:5000"));
        assert_eq!(config.provider_timeout, std::time::Duration::from_secs(3));
        assert!(!config.reverse_geocode);
        assert_eq!(config.reverse_geocode_concurrency, 2);
        assert_eq!(config.cors_origin.as_deref(), Some("https://dashboard.example"));
    }

    #[test]
    fn blank_values_fall_back() {
        let config = config(&[("OSRM_URL", "  "), ("CORS_ORIGIN", "*")]).unwrap();
        assert!(config.osrm_url.is_none());
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("REVERSE_GEOCODE", "maybe")]).is_err());
        assert!(config(&[("REVERSE_GEOCODE_CONCURRENCY", "0")]).is_err());
        assert!(config(&[("PROVIDER_TIMEOUT_SECS", "0")]).is_err());
    }
}
