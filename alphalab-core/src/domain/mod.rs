//! Domain types — bars, series, position series.

pub mod bar;
pub mod position;
pub mod series;

pub use bar::{Bar, NEUTRAL_INDEX_TREND, NEUTRAL_VOLATILITY};
pub use position::{PositionError, PositionSeries};
pub use series::{AdjustMode, Frequency, Series, SeriesError};
