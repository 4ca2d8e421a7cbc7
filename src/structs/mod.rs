mod sample;
mod series;

pub use sample::Sample;
pub use series::Series;
