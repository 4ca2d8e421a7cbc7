use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use crate::dashboard::{Dashboard, DashboardView};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Deserialize, Debug)]
pub struct Selection {
    pub asset: String,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AssetList {
    pub assets: Vec<String>,
    pub selected: String,
}

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/assets", get(get_assets))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/selection", post(select_asset))
        .route("/chart.svg", get(get_chart))
        .layer(CorsLayer::permissive())
        .with_state(dashboard)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_assets(State(dashboard): State<Arc<Dashboard>>) -> Json<AssetList> {
    Json(AssetList {
        assets: dashboard.assets().to_vec(),
        selected: dashboard.selected_asset().await,
    })
}

async fn get_dashboard(State(dashboard): State<Arc<Dashboard>>) -> Json<DashboardView> {
    Json(dashboard.view().await)
}

/// Switches the asset and starts a refresh without waiting for the timer.
async fn select_asset(
    State(dashboard): State<Arc<Dashboard>>,
    Json(selection): Json<Selection>,
) -> (StatusCode, String) {
    if let Err(e) = dashboard.select(&selection.asset).await {
        warn!("rejected selection: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string());
    }
    let refreshing = dashboard.clone();
    tokio::spawn(async move {
        refreshing.refresh().await;
    });
    (StatusCode::ACCEPTED, dashboard.selected_asset().await)
}

async fn get_chart(State(dashboard): State<Arc<Dashboard>>) -> Response {
    match dashboard.chart_svg().await {
        Ok(Some(svg)) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("chart rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::CoinGeckoClient;

    fn dashboard() -> Arc<Dashboard> {
        Arc::new(Dashboard::new(
            CoinGeckoClient::with_base_url("http://127.0.0.1:9"),
            vec!["bitcoin".to_string(), "ethereum".to_string()],
            "bitcoin".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_assets_lists_configuration() {
        let Json(list) = get_assets(State(dashboard())).await;
        assert_eq!(
            list,
            AssetList {
                assets: vec!["bitcoin".to_string(), "ethereum".to_string()],
                selected: "bitcoin".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_selection_of_unknown_asset_is_bad_request() {
        let dashboard = dashboard();
        let (status, _) = select_asset(
            State(dashboard.clone()),
            Json(Selection {
                asset: "monero".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(dashboard.selected_asset().await, "bitcoin");
    }

    #[tokio::test]
    async fn test_selection_is_accepted() {
        let dashboard = dashboard();
        let (status, body) = select_asset(
            State(dashboard.clone()),
            Json(Selection {
                asset: "ethereum".to_string(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, "ethereum");
    }

    #[tokio::test]
    async fn test_chart_without_history_has_no_content() {
        let response = get_chart(State(dashboard())).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
