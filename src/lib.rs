//! Price history types, the next-day regression predictor, and the display
//! helpers shared by the dashboard service.

pub mod chart;
pub mod error;
pub mod format;
pub mod predictor;
pub mod structs;

pub use error::ChartError;
pub use predictor::{predict, predict_at, LinearTrend};
pub use structs::{Sample, Series};
