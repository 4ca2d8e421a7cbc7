use std::collections::HashMap;

use crypto_dashboard::structs::{Sample, Series};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::error::FetchError;

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Days of history requested for the chart.
pub const HISTORY_DAYS: u32 = 365;

/*
GET /simple/price?ids=bitcoin&vs_currencies=usd
{
  "bitcoin": { "usd": 67012.12 }
}
*/
pub type SimplePriceResponse = HashMap<String, SimplePrice>;

#[derive(Deserialize, Debug)]
pub struct SimplePrice {
    pub usd: Option<f64>,
}

/*
GET /coins/bitcoin/market_chart?vs_currency=usd&days=365
{
  "prices": [[1711843200000, 69702.3087473573], ...],
  "market_caps": [...],
  "total_volumes": [...]
}
*/
#[derive(Deserialize, Debug)]
pub struct MarketChartResponse {
    pub prices: Vec<Sample>,
}

/*
GET /coins/bitcoin
{
  "id": "bitcoin",
  "image": {
    "thumb": "https://.../thumb/bitcoin.png",
    "small": "https://.../small/bitcoin.png",
    "large": "https://.../large/bitcoin.png"
  },
  ...
}
*/
#[derive(Deserialize, Debug)]
pub struct CoinResponse {
    #[serde(default)]
    pub image: Option<CoinImage>,
}

#[derive(Deserialize, Debug)]
pub struct CoinImage {
    #[serde(default)]
    pub small: Option<String>,
}

/// The joined result of the three requests of one refresh cycle.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub price_usd: f64,
    pub history: Series,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_API_BASE)
    }

    /// Client against another deployment of the API (a proxy, or a local test server).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn simple_price_path(asset: &str) -> String {
        format!("/simple/price?ids={}&vs_currencies=usd", asset)
    }

    pub fn market_chart_path(asset: &str) -> String {
        format!(
            "/coins/{}/market_chart?vs_currency=usd&days={}",
            asset, HISTORY_DAYS
        )
    }

    pub fn coin_path(asset: &str) -> String {
        format!("/coins/{}", asset)
    }

    pub async fn simple_price(&self, asset: &str) -> Result<SimplePriceResponse, FetchError> {
        self.get_json(&Self::simple_price_path(asset)).await
    }

    pub async fn market_chart(&self, asset: &str) -> Result<MarketChartResponse, FetchError> {
        self.get_json(&Self::market_chart_path(asset)).await
    }

    pub async fn coin(&self, asset: &str) -> Result<CoinResponse, FetchError> {
        self.get_json(&Self::coin_path(asset)).await
    }

    /// Issues the price, history and metadata requests concurrently and
    /// fails as soon as any of them fails.
    pub async fn snapshot(&self, asset: &str) -> Result<MarketSnapshot, FetchError> {
        let (prices, chart, coin) = tokio::try_join!(
            self.simple_price(asset),
            self.market_chart(asset),
            self.coin(asset),
        )?;

        // A zero price is treated as missing, like an absent field
        let price_usd = prices
            .get(asset)
            .and_then(|p| p.usd)
            .filter(|usd| *usd != 0.0)
            .ok_or_else(|| FetchError::PriceUnavailable(asset.to_string()))?;

        Ok(MarketSnapshot {
            price_usd,
            history: Series::new(asset.to_string(), chart.prices),
            image_url: coin.image.and_then(|image| image.small),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Request {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
pub fn test_endpoint_paths() {
    assert_eq!(
        CoinGeckoClient::simple_price_path("ethereum"),
        "/simple/price?ids=ethereum&vs_currencies=usd"
    );
    assert_eq!(
        CoinGeckoClient::market_chart_path("ethereum"),
        "/coins/ethereum/market_chart?vs_currency=usd&days=365"
    );
    assert_eq!(CoinGeckoClient::coin_path("ethereum"), "/coins/ethereum");
}

#[test]
pub fn test_base_url_trailing_slash_is_dropped() {
    let client = CoinGeckoClient::with_base_url("http://127.0.0.1:9000/api/v3/");
    assert_eq!(client.base_url(), "http://127.0.0.1:9000/api/v3");
    assert_eq!(CoinGeckoClient::new().base_url(), COINGECKO_API_BASE);
}

#[test]
pub fn test_responses_deserialize() {
    let prices: SimplePriceResponse =
        serde_json::from_str(r#"{ "bitcoin": { "usd": 67012.12 }, "ethereum": {} }"#).unwrap();
    assert_eq!(prices.get("bitcoin").unwrap().usd, Some(67012.12));
    assert_eq!(prices.get("ethereum").unwrap().usd, None);

    let chart: MarketChartResponse = serde_json::from_str(
        r#"{
            "prices": [[1711843200000, 69702.3087473573], [1711929600000, 71246.9514406015]],
            "market_caps": [[1711843200000, 1.0]],
            "total_volumes": [[1711843200000, 2.0]]
        }"#,
    )
    .unwrap();
    assert_eq!(chart.prices.len(), 2);
    assert_eq!(chart.prices[0].timestamp_ms, 1_711_843_200_000);

    let coin: CoinResponse = serde_json::from_str(
        r#"{ "id": "bitcoin", "image": { "thumb": "t.png", "small": "s.png", "large": "l.png" } }"#,
    )
    .unwrap();
    assert_eq!(coin.image.unwrap().small.as_deref(), Some("s.png"));

    let bare: CoinResponse = serde_json::from_str(r#"{ "id": "bitcoin" }"#).unwrap();
    assert!(bare.image.is_none());
}
