use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_PATH: &str = "car_data.db";
pub const DEFAULT_PRICES_URL: &str =
    "https://www.belneftekhim.by/company/press-center/petroleum-products-price/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CURRENCY: &str = "BYN";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub prices: PriceSourceConfig,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSourceConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICES_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            prices: PriceSourceConfig::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Config {
    /// Reads the environment. Call `dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = lookup("VEHICLE_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("FUEL_PRICES_URL") {
            config.prices.url = url;
        }
        if let Some(user_agent) = lookup("FUEL_PRICES_USER_AGENT") {
            config.prices.user_agent = user_agent;
        }
        if let Some(value) = lookup("FUEL_PRICES_TIMEOUT_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidNumber {
                    name: "FUEL_PRICES_TIMEOUT_SECS",
                    value: value.clone(),
                })?;
            config.prices.timeout = Duration::from_secs(secs);
        }
        if let Some(currency) = lookup("CURRENCY") {
            config.currency = currency;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database_path, PathBuf::from("car_data.db"));
        assert_eq!(config.prices.timeout, Duration::from_secs(10));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("VEHICLE_DB_PATH", "/tmp/garage.db"),
            ("FUEL_PRICES_URL", "http://localhost:9000/prices"),
            ("FUEL_PRICES_TIMEOUT_SECS", "3"),
            ("CURRENCY", "EUR"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/garage.db"));
        assert_eq!(config.prices.url, "http://localhost:9000/prices");
        assert_eq!(config.prices.timeout, Duration::from_secs(3));
        assert_eq!(config.prices.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.currency, "EUR");
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("FUEL_PRICES_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("FUEL_PRICES_TIMEOUT_SECS"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("FUEL_PRICES_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { name: "FUEL_PRICES_TIMEOUT_SECS", ref value } if value == "0"
        ));
    }
}
