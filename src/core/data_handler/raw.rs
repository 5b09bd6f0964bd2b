use crate::core::scale::AxisMapping;
use crate::core::types::{RawRow, Sample, SampleExtras, SeriesPoint};

use super::{DataHandler, bar_band, numeric_cell, place_band, plain_band, windowed_extremes};

/// Plain series that are never smoothed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawHandler;

impl DataHandler for RawHandler {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| Sample::new(row.x, numeric_cell(row, column, log_scale)))
            .collect()
    }

    fn rolling_average(&self, series: &[Sample], _period: usize) -> Vec<Sample> {
        series.to_vec()
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

/// Pre-aggregated `[avg, min, max]` samples, e.g. from a downsampling
/// backend. The min/max envelope is drawn as a band and never smoothed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressedHandler;

impl DataHandler for CompressedHandler {
    fn name(&self) -> &'static str {
        "compressed"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| {
                let cell = row
                    .value(column)
                    .as_triple()
                    .filter(|cell| !log_scale || cell.iter().all(|value| *value > 0.0));
                match cell {
                    Some([avg, min, max]) => Sample::with_extras(
                        row.x,
                        Some(avg),
                        SampleExtras::Band {
                            low: Some(min),
                            high: Some(max),
                        },
                    ),
                    None => Sample::with_extras(
                        row.x,
                        None,
                        SampleExtras::Band {
                            low: None,
                            high: None,
                        },
                    ),
                }
            })
            .collect()
    }

    fn rolling_average(&self, series: &[Sample], _period: usize) -> Vec<Sample> {
        series.to_vec()
    }

    fn extreme_y_values(
        &self,
        series: &[Sample],
        window: Option<(f64, f64)>,
        step_plot: bool,
    ) -> Option<(f64, f64)> {
        windowed_extremes(series, window, step_plot, bar_band)
    }

    fn on_point_created(&self, point: &mut SeriesPoint, axis: &AxisMapping) {
        place_band(point, axis);
    }
}
