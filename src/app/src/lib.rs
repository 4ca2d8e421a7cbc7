pub mod config;
pub mod dashboard;
pub mod error;
pub mod external;
pub mod refresh;
pub mod routes;

pub use config::Config;
pub use dashboard::{CycleOutcome, CycleState, Dashboard, DashboardView};
pub use error::{AppError, ConfigError, FetchError};
pub use external::{CoinGeckoClient, MarketSnapshot};
pub use refresh::RefreshTimer;
