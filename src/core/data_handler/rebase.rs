use serde::{Deserialize, Serialize};

use crate::core::types::{RawRow, Sample, SeriesPoint};

use super::default::trailing_average;
use super::{DataHandler, numeric_cell, plain_band, windowed_extremes};

/// What the first visible sample of a rebased series is shown as.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebaseBase {
    /// Scale so the first sample equals this value.
    Value(f64),
    /// Percent change relative to the first sample.
    Percent,
}

impl Default for RebaseBase {
    fn default() -> Self {
        Self::Value(100.0)
    }
}

impl RebaseBase {
    #[must_use]
    pub fn rebase(self, value: f64, initial: f64) -> f64 {
        match self {
            Self::Value(base) => value * base / initial,
            Self::Percent => (value / initial - 1.0) * 100.0,
        }
    }

    /// Value of the reference sample itself.
    #[must_use]
    pub fn origin(self) -> f64 {
        match self {
            Self::Value(base) => base,
            Self::Percent => 0.0,
        }
    }
}

/// Plain series shown relative to their first visible sample.
///
/// Extraction and smoothing match [`super::DefaultHandler`]; rebasing
/// happens on the series handed to `extreme_y_values` and
/// `series_to_points`, which is the window-trimmed one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebaseHandler {
    base: RebaseBase,
}

impl RebaseHandler {
    #[must_use]
    pub fn new(base: RebaseBase) -> Self {
        Self { base }
    }

    #[must_use]
    pub fn base(&self) -> RebaseBase {
        self.base
    }

    fn rebased(&self, series: &[Sample]) -> Vec<Sample> {
        let Some((reference, initial)) = series
            .iter()
            .enumerate()
            .find_map(|(i, sample)| sample.valid_y().map(|y| (i, y)))
        else {
            return series.to_vec();
        };

        series
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let y = if i == reference {
                    Some(self.base.origin())
                } else {
                    sample.y.map(|y| self.base.rebase(y, initial))
                };
                Sample::with_extras(sample.x, y, sample.extras)
            })
            .collect()
    }
}

impl DataHandler for RebaseHandler {
    fn name(&self) -> &'static str {
        "rebase"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| Sample::new(row.x, numeric_cell(row, column, log_scale)))
            .collect()
    }

    fn rolling_average(&self, series: &[Sample], period: usize) -> Vec<Sample> {
        let period = period.min(series.len());
        if period <= 1 {
            return series.to_vec();
        }
        trailing_average(series, period)
    }

    fn extreme_y_values(
        &self,
        series: &[Sample],
        window: Option<(f64, f64)>,
        step_plot: bool,
    ) -> Option<(f64, f64)> {
        windowed_extremes(&self.rebased(series), window, step_plot, plain_band)
    }

    fn series_to_points(
        &self,
        series: &[Sample],
        name: &str,
        boundary_id_start: usize,
    ) -> Vec<SeriesPoint> {
        self.format_series(&self.rebased(series))
            .iter()
            .enumerate()
            .map(|(i, sample)| SeriesPoint::unplaced(name, i + boundary_id_start, sample))
            .collect()
    }
}
