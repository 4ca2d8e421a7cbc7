use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("not enough price data to draw a chart ({0} points, need at least 2)")]
    NotEnoughData(usize),

    #[error("{0}")]
    Drawing(String),
}
