use indexmap::IndexMap;

use crate::core::options::AxisOptions;
use crate::core::scale::AxisRange;
use crate::core::types::Tick;
use crate::telemetry::{Diagnostic, Diagnostics};

use super::chart_options::{AxisRef, ChartOptions};

const DEFAULT_Y_PAD_RATIO: f64 = 0.1;

/// Y axes of a chart and the axis each series is drawn against.
///
/// Axis 0 is the primary axis; every series declaring its own axis adds
/// one more, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisAssignment {
    axes: Vec<AxisOptions>,
    series_axis: IndexMap<String, usize>,
}

impl AxisAssignment {
    /// Resolves per-series axis options.
    ///
    /// A series sharing the axis of a series that does not define one is
    /// reported and placed on axis 0.
    pub fn resolve(options: &ChartOptions, diagnostics: &mut Diagnostics) -> Self {
        let mut axes = vec![options.y_axis.clone()];
        let mut series_axis = IndexMap::with_capacity(options.series_names().len());

        for name in options.series_names() {
            let axis = match options.series.get(name).and_then(|series| series.axis.as_ref()) {
                Some(AxisRef::Own(axis)) => {
                    axes.push(axis.as_ref().clone());
                    axes.len() - 1
                }
                _ => 0,
            };
            series_axis.insert(name.clone(), axis);
        }

        for name in options.series_names() {
            let Some(AxisRef::SameAs(target)) =
                options.series.get(name).and_then(|series| series.axis.as_ref())
            else {
                continue;
            };
            let defines_axis = matches!(
                options.series.get(target).and_then(|series| series.axis.as_ref()),
                Some(AxisRef::Own(_))
            );
            let resolved = series_axis.get(target).copied().filter(|_| defines_axis);
            match resolved {
                Some(axis) => {
                    series_axis.insert(name.clone(), axis);
                }
                None => diagnostics.report(Diagnostic::UnresolvedAxisLink {
                    series: name.clone(),
                    target: target.clone(),
                }),
            }
        }

        Self { axes, series_axis }
    }

    #[must_use]
    pub fn axes(&self) -> &[AxisOptions] {
        &self.axes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Axis index of `series`; unknown series use axis 0.
    #[must_use]
    pub fn axis_of(&self, series: &str) -> usize {
        self.series_axis.get(series).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn options_for_series(&self, series: &str) -> &AxisOptions {
        &self.axes[self.axis_of(series)]
    }

    /// Series drawn against `axis`, in declaration order.
    pub fn series_for_axis(&self, axis: usize) -> impl Iterator<Item = &str> {
        self.series_axis
            .iter()
            .filter(move |(_, index)| **index == axis)
            .map(|(name, _)| name.as_str())
    }
}

/// Padding applied around automatic y ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePadding {
    /// Explicit padding in pixels. `None` selects 10% padding with
    /// snapping to zero.
    pub pad_pixels: Option<f64>,
    pub plot_height: f64,
    pub avoid_min_zero: bool,
}

impl RangePadding {
    fn ratio(self) -> f64 {
        match self.pad_pixels {
            Some(pad) if self.plot_height > 0.0 => pad / self.plot_height,
            Some(_) => 0.0,
            None => DEFAULT_Y_PAD_RATIO,
        }
    }
}

/// Value range of one y axis from the extremes of its series.
///
/// `extremes` has one entry per series on the axis; `None` entries (series
/// without valid samples) are skipped. A user `value_range` bound replaces
/// the computed one; with `pad_pixels` set it is padded on linear axes only.
#[must_use]
pub fn compute_value_range(
    extremes: &[Option<(f64, f64)>],
    axis: &AxisOptions,
    padding: RangePadding,
) -> AxisRange {
    let compat = padding.pad_pixels.is_none();
    let ypad = padding.ratio();

    let extreme = if extremes.is_empty() {
        AxisRange::new(0.0, 1.0)
    } else {
        padded_extremes(extremes, axis, padding, ypad)
    };

    let Some([user_low, user_high]) = axis.value_range else {
        return extreme;
    };
    let mut low = user_low.filter(|value| !value.is_nan()).unwrap_or(extreme.low);
    let mut high = user_high.filter(|value| !value.is_nan()).unwrap_or(extreme.high);
    // Log axes keep the user's bounds exactly.
    if !compat && !axis.logscale {
        let span = high - low;
        low -= span * ypad;
        high += span * ypad;
    }
    AxisRange::new(low, high)
}

fn padded_extremes(
    extremes: &[Option<(f64, f64)>],
    axis: &AxisOptions,
    padding: RangePadding,
    ypad: f64,
) -> AxisRange {
    let compat = padding.pad_pixels.is_none();
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for (low, high) in extremes.iter().flatten() {
        min_y = min_y.min(*low);
        max_y = max_y.max(*high);
    }

    if axis.include_zero && !axis.logscale {
        min_y = min_y.min(0.0);
        max_y = max_y.max(0.0);
    }

    if min_y == f64::INFINITY {
        min_y = 0.0;
    }
    if max_y == f64::NEG_INFINITY {
        max_y = 1.0;
    }

    let mut span = max_y - min_y;
    if span == 0.0 {
        if max_y != 0.0 {
            span = max_y.abs();
        } else {
            max_y = 1.0;
            span = 1.0;
        }
    }

    if axis.logscale {
        if compat {
            return AxisRange::new(min_y, max_y + ypad * span);
        }
        let logpad = (span.ln() * ypad).exp();
        return AxisRange::new(min_y / logpad, max_y * logpad);
    }

    let mut low = min_y - ypad * span;
    let mut high = max_y + ypad * span;
    if compat && !padding.avoid_min_zero {
        if low < 0.0 && min_y >= 0.0 {
            low = 0.0;
        }
        if high > 0.0 && max_y <= 0.0 {
            high = 0.0;
        }
    }
    AxisRange::new(low, high)
}

/// Tick values for a secondary axis that mirror the primary axis ticks at
/// the same relative heights.
#[must_use]
pub fn forced_tick_values(primary_ticks: &[Tick], primary: AxisRange, secondary: AxisRange) -> Vec<f64> {
    let primary_span = primary.span();
    let secondary_span = secondary.span();
    primary_ticks
        .iter()
        .map(|tick| {
            let fraction = (tick.value - primary.low) / primary_span;
            secondary.low + fraction * secondary_span
        })
        .collect()
}
