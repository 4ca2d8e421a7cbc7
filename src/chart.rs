use chrono::{DateTime, Utc};
use plotters::prelude::*;

use crate::error::ChartError;
use crate::format;
use crate::structs::{Sample, Series};

pub const DATASET_LABEL: &str = "Price (USD)";

/// Renders the series as a filled line chart and returns the SVG document.
pub fn render_svg(series: &Series, width: u32, height: u32) -> Result<String, ChartError> {
    let points: Vec<(DateTime<Utc>, f64)> = series
        .data()
        .iter()
        .filter_map(|s: &Sample| s.time().map(|t| (t, s.price)))
        .collect();

    if points.len() < 2 {
        return Err(ChartError::NotEnoughData(points.len()));
    }

    let (min_price, max_price) = series
        .price_range()
        .ok_or(ChartError::NotEnoughData(0))?;
    // Avoid a zero-height range on flat series
    let price_range = (max_price - min_price).max(1e-8);
    let padding = price_range * 0.1;
    let y_min = (min_price - padding).max(0.0);
    let y_max = max_price + padding;

    let x_min = points[0].0;
    let x_max = points[points.len() - 1].0;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error("fill canvas"))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                caption(series),
                ("sans-serif", 24.0).into_font(),
            )
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_error("build chart"))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(DATASET_LABEL)
            .x_label_formatter(&|t: &DateTime<Utc>| t.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|v: &f64| format::usd(*v))
            .draw()
            .map_err(draw_error("draw mesh"))?;

        chart
            .draw_series(
                AreaSeries::new(points.iter().copied(), y_min, BLACK.mix(0.2))
                    .border_style(&BLACK),
            )
            .map_err(draw_error("draw series"))?
            .label(DATASET_LABEL)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_error("draw legend"))?;

        root.present().map_err(draw_error("render chart"))?;
    }

    Ok(svg)
}

/// `bitcoin price, 2024-04-05 to 2025-04-05`
fn caption(series: &Series) -> String {
    match (series.start(), series.end()) {
        (Some(start), Some(end)) => format!(
            "{} price, {} to {}",
            series.asset(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        _ => format!("{} price", series.asset()),
    }
}

fn draw_error<E: std::fmt::Display>(stage: &'static str) -> impl Fn(E) -> ChartError {
    move |e| ChartError::Drawing(format!("Failed to {}: {}", stage, e))
}
