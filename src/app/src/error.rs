use thiserror::Error;

/// Why a refresh cycle could not produce data.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("price data unavailable for {0}")]
    PriceUnavailable(String),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: {value}")]
    BindAddr { name: &'static str, value: String },

    #[error("{name} must be a positive number of seconds, got {value}")]
    Interval { name: &'static str, value: String },

    #[error("{name} lists no assets")]
    NoAssets { name: &'static str },

    #[error("default asset {asset} is not one of the configured assets")]
    UnknownDefaultAsset { asset: String },
}

#[derive(Error, Debug)]
#[error("unknown asset: {0}")]
pub struct UnknownAsset(pub String);

/// Startup and shutdown failures of the service.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
