//! Next-day price extrapolation by ordinary least squares.
//!
//! The regression runs on raw epoch-millisecond timestamps. With x values
//! around 1.7e12 the sums reach 1e24 and beyond, so the closed form loses
//! precision when the window is short or tightly clustered. That behaviour
//! is kept in [`predict`]; [`predict_centered_at`] is the stabilised form.

use chrono::{DateTime, TimeDelta, Utc};

use crate::structs::Sample;

/// Number of trailing samples fed into the regression.
pub const REGRESSION_WINDOW: usize = 30;

/// How far past "now" the prediction targets.
pub const PREDICTION_HORIZON_MS: i64 = 24 * 60 * 60 * 1000;

/// Fitted line `price = slope * timestamp_ms + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Closed-form least squares over every sample given.
    ///
    /// Nothing is guarded: an empty or single-sample input, or identical
    /// timestamps, produce NaN or infinite coefficients.
    pub fn fit(samples: &[Sample]) -> Self {
        let n = samples.len() as f64;
        let (sum_x, sum_y, sum_xy, sum_x2) =
            samples
                .iter()
                .fold((0.0, 0.0, 0.0, 0.0), |(sx, sy, sxy, sx2), s| {
                    let x = s.timestamp_ms as f64;
                    let y = s.price;
                    (sx + x, sy + y, sxy + x * y, sx2 + x * x)
                });

        let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
        let intercept = (sum_y - slope * sum_x) / n;
        Self { slope, intercept }
    }

    pub fn at(&self, timestamp_ms: i64) -> f64 {
        self.slope * timestamp_ms as f64 + self.intercept
    }
}

/// The trailing samples the regression consumes.
pub fn regression_window(series: &[Sample]) -> &[Sample] {
    &series[series.len().saturating_sub(REGRESSION_WINDOW)..]
}

/// Price expected 24 hours from the current wall-clock time.
pub fn predict(series: &[Sample]) -> f64 {
    predict_at(series, Utc::now())
}

/// Price expected 24 hours after `now`.
pub fn predict_at(series: &[Sample], now: DateTime<Utc>) -> f64 {
    LinearTrend::fit(regression_window(series)).at(target_timestamp(now))
}

/// Same extrapolation with timestamps centred on their mean before fitting.
///
/// Agrees with [`predict_at`] on well-conditioned input but keeps its
/// precision on short, tightly clustered windows. The dashboard does not use it.
pub fn predict_centered_at(series: &[Sample], now: DateTime<Utc>) -> f64 {
    let window = regression_window(series);
    let n = window.len() as f64;
    let mean_x = window.iter().map(|s| s.timestamp_ms as f64).sum::<f64>() / n;
    let mean_y = window.iter().map(|s| s.price).sum::<f64>() / n;

    let (sxy, sxx) = window.iter().fold((0.0, 0.0), |(sxy, sxx), s| {
        let dx = s.timestamp_ms as f64 - mean_x;
        (sxy + dx * (s.price - mean_y), sxx + dx * dx)
    });

    let slope = sxy / sxx;
    mean_y + slope * (target_timestamp(now) as f64 - mean_x)
}

fn target_timestamp(now: DateTime<Utc>) -> i64 {
    (now + TimeDelta::milliseconds(PREDICTION_HORIZON_MS)).timestamp_millis()
}
