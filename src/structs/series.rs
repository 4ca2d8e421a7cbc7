use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::structs::Sample;

/// Price history of one asset, ascending by timestamp as delivered upstream.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
pub struct Series {
    asset: String,
    data: Vec<Sample>,
}

impl Series {
    pub fn new(asset: String, data: Vec<Sample>) -> Self {
        Self { asset, data }
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn data(&self) -> &[Sample] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.data.first().and_then(Sample::time)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.data.last().and_then(Sample::time)
    }

    /// The trailing `size` samples, or all of them when the series is shorter.
    pub fn tail(&self, size: usize) -> &[Sample] {
        let skip = self.data.len().saturating_sub(size);
        &self.data[skip..]
    }

    /// Lowest and highest price, `None` for an empty series.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let low = self.data.iter().map(|s| s.price).fold(f64::INFINITY, f64::min);
        let high = self
            .data
            .iter()
            .map(|s| s.price)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((low, high))
    }
}

#[test]
pub fn test_tail_truncates_to_trailing_samples() {
    let data = (0..40).map(|i| Sample::new(i, i as f64)).collect();
    let series = Series::new("bitcoin".to_string(), data);
    let tail = series.tail(30);
    assert_eq!(tail.len(), 30);
    assert_eq!(tail[0].timestamp_ms, 10);
    assert_eq!(tail[29].timestamp_ms, 39);
}

#[test]
pub fn test_tail_of_short_series_is_everything() {
    let series = Series::new(
        "bitcoin".to_string(),
        vec![Sample::new(1, 1.0), Sample::new(2, 2.0)],
    );
    assert_eq!(series.tail(30).len(), 2);
    assert!(Series::default().tail(30).is_empty());
}

#[test]
pub fn test_price_range() {
    let series = Series::new(
        "ethereum".to_string(),
        vec![Sample::new(1, 3.0), Sample::new(2, 1.5), Sample::new(3, 7.25)],
    );
    assert_eq!(series.price_range(), Some((1.5, 7.25)));
    assert_eq!(Series::default().price_range(), None);
}

#[test]
pub fn test_start_and_end_follow_first_and_last_sample() {
    let series = Series::new(
        "bitcoin".to_string(),
        vec![
            Sample::new(1_711_843_200_000, 1.0),
            Sample::new(1_711_929_600_000, 2.0),
        ],
    );
    assert!(!series.is_empty());
    assert_eq!(series.start().unwrap().timestamp_millis(), 1_711_843_200_000);
    assert_eq!(series.end().unwrap().timestamp_millis(), 1_711_929_600_000);

    let empty = Series::default();
    assert!(empty.is_empty());
    assert!(empty.start().is_none());
    assert!(empty.end().is_none());
}
