use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::external::COINGECKO_API_BASE;

pub const BIND_ADDR_VAR: &str = "DASHBOARD_BIND_ADDR";
pub const BASE_URL_VAR: &str = "COINGECKO_BASE_URL";
pub const REFRESH_SECS_VAR: &str = "DASHBOARD_REFRESH_SECS";
pub const ASSETS_VAR: &str = "DASHBOARD_ASSETS";
pub const DEFAULT_ASSET_VAR: &str = "DASHBOARD_DEFAULT_ASSET";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REFRESH_SECS: u64 = 60;
const DEFAULT_ASSETS: &[&str] = &["bitcoin", "ethereum", "solana", "cardano", "dogecoin"];
const DEFAULT_ASSET: &str = "bitcoin";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub api_base_url: String,
    pub refresh_interval: Duration,
    pub assets: Vec<String>,
    pub default_asset: String,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_value = var(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::BindAddr {
                name: BIND_ADDR_VAR,
                value: bind_value.clone(),
            })?;

        let refresh_interval = match var(REFRESH_SECS_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Interval {
                        name: REFRESH_SECS_VAR,
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_REFRESH_SECS),
        };

        let assets: Vec<String> = match var(ASSETS_VAR) {
            Some(list) => list
                .split(',')
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
            None => DEFAULT_ASSETS.iter().map(|a| a.to_string()).collect(),
        };
        if assets.is_empty() {
            return Err(ConfigError::NoAssets { name: ASSETS_VAR });
        }

        let default_asset = match var(DEFAULT_ASSET_VAR) {
            Some(asset) => asset.trim().to_lowercase(),
            None if assets.iter().any(|a| a == DEFAULT_ASSET) => DEFAULT_ASSET.to_string(),
            None => assets[0].clone(),
        };
        if !assets.contains(&default_asset) {
            return Err(ConfigError::UnknownDefaultAsset {
                asset: default_asset,
            });
        }

        Ok(Self {
            bind_addr,
            api_base_url: var(BASE_URL_VAR).unwrap_or_else(|| COINGECKO_API_BASE.to_string()),
            refresh_interval,
            assets,
            default_asset,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.api_base_url, COINGECKO_API_BASE);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.default_asset, "bitcoin");
        assert_eq!(config.assets.len(), 5);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:8080"),
            (BASE_URL_VAR, "http://localhost:9000/api/v3"),
            (REFRESH_SECS_VAR, "15"),
            (ASSETS_VAR, " Ethereum, litecoin ,,"),
            (DEFAULT_ASSET_VAR, "litecoin"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.api_base_url, "http://localhost:9000/api/v3");
        assert_eq!(config.refresh_interval, Duration::from_secs(15));
        assert_eq!(config.assets, vec!["ethereum", "litecoin"]);
        assert_eq!(config.default_asset, "litecoin");
    }

    #[test]
    fn test_default_asset_falls_back_to_first_listed() {
        let config = Config::from_lookup(lookup(&[(ASSETS_VAR, "solana,cardano")])).unwrap();
        assert_eq!(config.default_asset, "solana");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[(BIND_ADDR_VAR, "nowhere")])),
            Err(ConfigError::BindAddr { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(REFRESH_SECS_VAR, "0")])),
            Err(ConfigError::Interval { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(REFRESH_SECS_VAR, "soon")])),
            Err(ConfigError::Interval { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[(ASSETS_VAR, " , ")])),
            Err(ConfigError::NoAssets { .. })
        ));
        assert_eq!(
            Config::from_lookup(lookup(&[(DEFAULT_ASSET_VAR, "monero")])),
            Err(ConfigError::UnknownDefaultAsset {
                asset: "monero".to_string()
            })
        );
    }
}
