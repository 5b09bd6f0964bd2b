use crate::core::types::{RawRow, Sample};

use super::{DataHandler, numeric_cell, plain_band, windowed_extremes};

/// Plain numeric series.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHandler;

impl DataHandler for DefaultHandler {
    fn name(&self) -> &'static str {
        "default"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| Sample::new(row.x, numeric_cell(row, column, log_scale)))
            .collect()
    }

    /// A period of one returns the input unchanged, NaNs included, so
    /// independent series keep their gaps.
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
        windowed_extremes(series, window, step_plot, plain_band)
    }
}

/// Average of the valid y values among the last `period` samples.
pub(super) fn trailing_average(series: &[Sample], period: usize) -> Vec<Sample> {
    series
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let start = (i + 1).saturating_sub(period);
            let (sum, count) = series[start..=i]
                .iter()
                .filter_map(Sample::valid_y)
                .fold((0.0, 0usize), |(sum, count), y| (sum + y, count + 1));
            let y = (count > 0).then(|| sum / count as f64);
            Sample::new(sample.x, y)
        })
        .collect()
}
