use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use crypto_dashboard::{chart, format, predictor, ChartError, Series};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::error::UnknownAsset;
use crate::external::{CoinGeckoClient, MarketSnapshot};

pub const LOADING_PRICE: &str = "Loading...";
pub const LOADING_PREDICTION: &str = "Loading prediction...";
pub const ERROR_PRICE: &str = "Error loading data";
pub const ERROR_PREDICTION: &str = "Error loading prediction";
pub const IMAGE_UNAVAILABLE: &str = "Image not available";

const CHART_WIDTH: u32 = 960;
const CHART_HEIGHT: u32 = 480;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    Loading,
    Displayed,
    Failed,
}

/// How a single refresh cycle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    Displayed,
    Failed,
    /// A newer cycle started before this one settled; its result was dropped.
    Stale,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ImageView {
    pub src: String,
    pub alt: String,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ChartPoint {
    pub x: i64,
    pub y: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChartView {
    pub label: &'static str,
    pub points: Vec<ChartPoint>,
}

/// Everything the page shows, as last written by a refresh cycle.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub asset: String,
    pub status: CycleState,
    pub price_text: String,
    pub prediction_text: String,
    pub image: ImageView,
    pub chart: ChartView,
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardView {
    fn new(asset: String) -> Self {
        Self {
            asset,
            status: CycleState::Idle,
            price_text: String::new(),
            prediction_text: String::new(),
            image: ImageView {
                src: String::new(),
                alt: String::new(),
            },
            chart: ChartView {
                label: chart::DATASET_LABEL,
                points: vec![],
            },
            generation: 0,
            updated_at: None,
        }
    }
}

struct DashboardState {
    view: DashboardView,
    series: Option<Series>,
}

/// The single dashboard session: current selection, display fields and the
/// history behind the chart.
pub struct Dashboard {
    client: CoinGeckoClient,
    assets: Vec<String>,
    selected: RwLock<String>,
    generation: AtomicU64,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new(client: CoinGeckoClient, assets: Vec<String>, default_asset: String) -> Self {
        Self {
            client,
            assets,
            selected: RwLock::new(default_asset.clone()),
            generation: AtomicU64::new(0),
            state: RwLock::new(DashboardState {
                view: DashboardView::new(default_asset),
                series: None,
            }),
        }
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub async fn selected_asset(&self) -> String {
        self.selected.read().await.clone()
    }

    /// Changes the selection. The caller decides when to refresh.
    pub async fn select(&self, asset: &str) -> Result<(), UnknownAsset> {
        let asset = asset.trim().to_lowercase();
        if !self.assets.contains(&asset) {
            return Err(UnknownAsset(asset));
        }
        info!("selected asset {}", asset);
        *self.selected.write().await = asset;
        Ok(())
    }

    pub async fn view(&self) -> DashboardView {
        self.state.read().await.view.clone()
    }

    /// SVG of the last displayed history, `None` when there is none to draw.
    pub async fn chart_svg(&self) -> Result<Option<String>, ChartError> {
        let state = self.state.read().await;
        match &state.series {
            Some(series) if series.len() >= 2 => {
                chart::render_svg(series, CHART_WIDTH, CHART_HEIGHT).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// One fetch, join and render pass for the current selection.
    pub async fn refresh(&self) -> CycleOutcome {
        // The generation is taken under the selection guard, so a cycle that
        // read an older selection always has a lower generation than any
        // cycle started after the selection changed.
        let (asset, generation) = {
            let selected = self.selected.read().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (selected.clone(), generation)
        };
        debug!("refresh #{} for {} started", generation, asset);

        {
            let mut state = self.state.write().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("refresh #{} for {} superseded before loading", generation, asset);
                return CycleOutcome::Stale;
            }
            state.view.status = CycleState::Loading;
            state.view.price_text = LOADING_PRICE.to_string();
            state.view.prediction_text = LOADING_PREDICTION.to_string();
        }

        let result = self.client.snapshot(&asset).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("refresh #{} for {} superseded, result dropped", generation, asset);
            return CycleOutcome::Stale;
        }

        let view = &mut state.view;
        view.asset = asset.clone();
        view.generation = generation;
        view.updated_at = Some(Utc::now());

        match result {
            Ok(snapshot) => {
                let prediction = predictor::predict(snapshot.history.data());
                info!(
                    "{} price ${} with {} history points, prediction {}",
                    asset,
                    snapshot.price_usd,
                    snapshot.history.len(),
                    prediction
                );
                Self::display(view, &asset, &snapshot, prediction);
                state.series = Some(snapshot.history);
                CycleOutcome::Displayed
            }
            Err(e) => {
                error!("Error updating data for {}: {}", asset, e);
                view.status = CycleState::Failed;
                view.price_text = ERROR_PRICE.to_string();
                view.prediction_text = ERROR_PREDICTION.to_string();
                CycleOutcome::Failed
            }
        }
    }

    fn display(view: &mut DashboardView, asset: &str, snapshot: &MarketSnapshot, prediction: f64) {
        view.status = CycleState::Displayed;
        view.price_text = format::usd(snapshot.price_usd);
        view.chart.points = snapshot
            .history
            .data()
            .iter()
            .map(|s| ChartPoint {
                x: s.timestamp_ms,
                y: s.price,
            })
            .collect();
        view.image = match &snapshot.image_url {
            Some(url) if !url.is_empty() => ImageView {
                src: url.clone(),
                alt: format!("{} logo", asset),
            },
            _ => ImageView {
                src: String::new(),
                alt: IMAGE_UNAVAILABLE.to_string(),
            },
        };
        view.prediction_text = format::prediction_text(prediction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> Dashboard {
        Dashboard::new(
            CoinGeckoClient::with_base_url("http://127.0.0.1:9"),
            vec!["bitcoin".to_string(), "ethereum".to_string()],
            "bitcoin".to_string(),
        )
    }

    #[tokio::test]
    async fn test_initial_view_is_idle() {
        let dashboard = dashboard();
        let view = dashboard.view().await;
        assert_eq!(view.status, CycleState::Idle);
        assert_eq!(view.asset, "bitcoin");
        assert_eq!(view.chart.label, "Price (USD)");
        assert!(view.chart.points.is_empty());
        assert!(dashboard.chart_svg().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_select_rejects_unknown_asset() {
        let dashboard = dashboard();
        assert!(dashboard.select("monero").await.is_err());
        assert_eq!(dashboard.selected_asset().await, "bitcoin");
        dashboard.select(" Ethereum ").await.unwrap();
        assert_eq!(dashboard.selected_asset().await, "ethereum");
    }

    #[tokio::test]
    async fn test_unreachable_api_fails_cycle() {
        let dashboard = dashboard();
        assert_eq!(dashboard.refresh().await, CycleOutcome::Failed);
        let view = dashboard.view().await;
        assert_eq!(view.status, CycleState::Failed);
        assert_eq!(view.price_text, ERROR_PRICE);
        assert_eq!(view.prediction_text, ERROR_PREDICTION);
        assert_eq!(view.generation, 1);
    }

    #[test]
    fn test_display_without_image() {
        let mut view = DashboardView::new("bitcoin".to_string());
        let snapshot = MarketSnapshot {
            price_usd: 67012.5,
            history: Series::new("bitcoin".to_string(), vec![]),
            image_url: None,
        };
        Dashboard::display(&mut view, "bitcoin", &snapshot, f64::NAN);
        assert_eq!(view.status, CycleState::Displayed);
        assert_eq!(view.price_text, "$67,012.5");
        assert_eq!(view.image.src, "");
        assert_eq!(view.image.alt, IMAGE_UNAVAILABLE);
        assert_eq!(
            view.prediction_text,
            "Price Prediction for next 24hrs: $NaN (based on Linear Regression)"
        );
    }
}
