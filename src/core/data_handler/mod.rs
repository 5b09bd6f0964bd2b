//! Series-shape handlers.
//!
//! Each handler turns raw rows into a uniform [`Sample`] series, smooths it,
//! bounds it and builds [`SeriesPoint`]s from it. One handler is picked per
//! chart and shared by all of its series.

mod bars;
mod default;
mod fractions;
mod raw;
mod rebase;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::scale::AxisMapping;
use crate::core::types::{FormattedSample, RawRow, Sample, SeriesPoint};

pub use bars::{CustomBarsHandler, ErrorBarsHandler};
pub use default::DefaultHandler;
pub use fractions::{DefaultFractionsHandler, FractionBarsHandler};
pub use raw::{CompressedHandler, RawHandler};
pub use rebase::{RebaseBase, RebaseHandler};

/// Chart-level settings handed to handler factories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// Width of error bands, in standard deviations.
    pub sigma: f64,
    /// Use the Wilson score interval for fraction bands.
    pub wilson_interval: bool,
    pub rebase: RebaseBase,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            wilson_interval: true,
            rebase: RebaseBase::default(),
        }
    }
}

/// Per-shape series reduction.
///
/// `column` indexes [`RawRow::values`], so `0` is the first series.
pub trait DataHandler: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Pulls one column out of `rows`. On a log axis, non-positive samples
    /// become gaps.
    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample>;

    /// Trailing moving average over the last `period` samples.
    fn rolling_average(&self, series: &[Sample], period: usize) -> Vec<Sample>;

    /// `(min, max)` of the visible part of `series`, including band edges.
    /// `None` when no sample in the window is valid.
    fn extreme_y_values(
        &self,
        series: &[Sample],
        window: Option<(f64, f64)>,
        step_plot: bool,
    ) -> Option<(f64, f64)>;

    /// Reshapes samples into `[x, y, low, high]`.
    fn format_series(&self, series: &[Sample]) -> Vec<FormattedSample> {
        series
            .iter()
            .map(|sample| {
                let (low, high) = sample.extras.band();
                FormattedSample {
                    x: sample.x,
                    y: sample.y,
                    low,
                    high,
                }
            })
            .collect()
    }

    /// Builds unplaced points; `idx` counts from `boundary_id_start`.
    fn series_to_points(
        &self,
        series: &[Sample],
        name: &str,
        boundary_id_start: usize,
    ) -> Vec<SeriesPoint> {
        self.format_series(series)
            .iter()
            .enumerate()
            .map(|(i, sample)| SeriesPoint::unplaced(name, i + boundary_id_start, sample))
            .collect()
    }

    /// Fills shape-specific fields once the point has been placed on `axis`.
    fn on_point_created(&self, _point: &mut SeriesPoint, _axis: &AxisMapping) {}
}

/// First and last index of `series` inside `low..=high`.
///
/// Falls back to the full series when the window selects nothing.
#[must_use]
pub fn indexes_in_window(series: &[Sample], low: f64, high: f64) -> (usize, usize) {
    if series.is_empty() {
        return (0, 0);
    }
    let last_index = series.len() - 1;
    let mut first = 0;
    while first < last_index && series[first].x < low {
        first += 1;
    }
    let mut last = last_index;
    while last > 0 && series[last].x > high {
        last -= 1;
    }
    if first <= last {
        (first, last)
    } else {
        (0, last_index)
    }
}

/// y on the segment `(x1, y1)-(x2, y2)` at `x`.
#[must_use]
pub fn intersect_y(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    let gradient = (y2 - y1) / (x2 - x1);
    y1 + (x - x1) * gradient
}

/// `(y, low, high)` of a valid sample.
pub(crate) type BandOf = fn(&Sample) -> Option<(f64, f64, f64)>;

pub(crate) fn plain_band(sample: &Sample) -> Option<(f64, f64, f64)> {
    sample.valid_y().map(|y| (y, y, y))
}

/// Band of a bar sample, widened so it always contains `y`.
pub(crate) fn bar_band(sample: &Sample) -> Option<(f64, f64, f64)> {
    let y = sample.valid_y()?;
    let (low, high) = sample.extras.band();
    Some((y, low.unwrap_or(y).min(y), high.unwrap_or(y).max(y)))
}

#[derive(Debug, Default)]
struct Extent {
    min: Option<f64>,
    max: Option<f64>,
}

impl Extent {
    fn include(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    fn include_band(&mut self, (y, low, high): (f64, f64, f64)) {
        self.include(y);
        self.include(low);
        self.include(high);
    }

    fn finish(self) -> Option<(f64, f64)> {
        self.min.zip(self.max)
    }
}

fn interpolate_band(
    left: (f64, (f64, f64, f64)),
    right: (f64, (f64, f64, f64)),
    x: f64,
) -> (f64, f64, f64) {
    let (x1, (y1, low1, high1)) = left;
    let (x2, (y2, low2, high2)) = right;
    (
        intersect_y(x1, y1, x2, y2, x),
        intersect_y(x1, low1, x2, low2, x),
        intersect_y(x1, high1, x2, high2, x),
    )
}

/// Extremes of `series` restricted to `window`, shared by every handler.
///
/// For line plots a window edge that falls between two valid samples adds
/// the interpolated value (and band) at the edge. Step plots instead extend
/// the left edge by one sample and skip the right-edge interpolation.
pub(crate) fn windowed_extremes(
    series: &[Sample],
    window: Option<(f64, f64)>,
    step_plot: bool,
    band_of: BandOf,
) -> Option<(f64, f64)> {
    if series.is_empty() {
        return None;
    }

    let mut extent = Extent::default();
    let last_index = series.len() - 1;
    let (mut first, mut last) = (0, last_index);

    if let Some((low, high)) = window {
        (first, last) = indexes_in_window(series, low, high);

        if first != 0 {
            if step_plot {
                first -= 1;
            } else {
                let prior = &series[first - 1];
                let next = &series[first];
                if let (Some(a), Some(b)) = (band_of(prior), band_of(next)) {
                    extent.include_band(interpolate_band((prior.x, a), (next.x, b), low));
                }
            }
        }

        if last != last_index && !step_plot {
            let prior = &series[last];
            let next = &series[last + 1];
            if let (Some(a), Some(b)) = (band_of(prior), band_of(next)) {
                extent.include_band(interpolate_band((prior.x, a), (next.x, b), high));
            }
        }
    }

    for sample in &series[first..=last] {
        if let Some(band) = band_of(sample) {
            extent.include_band(band);
        }
    }
    extent.finish()
}

/// Plain numeric cell with log-scale gaps applied.
pub(crate) fn numeric_cell(row: &RawRow, column: usize, log_scale: bool) -> Option<f64> {
    let value = row.value(column).as_number()?;
    if log_scale && value <= 0.0 {
        return None;
    }
    Some(value)
}

/// Sum term for running sums: gaps count as zero.
pub(crate) fn sum_term(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Sets `y_top`/`y_bottom` from the point's band on `axis`.
pub(crate) fn place_band(point: &mut SeriesPoint, axis: &AxisMapping) {
    point.y_top = point.yval_minus.map(|value| axis.normalize(value));
    point.y_bottom = point.yval_plus.map(|value| axis.normalize(value));
}
