use std::collections::HashMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::core::data_handler::DataHandler;
use crate::core::date_ticker::{date_ticks, pick_granularity};
use crate::core::layout::{ChartLayout, LayoutOutput, YAxisLayout};
use crate::core::numeric_ticker::numeric_ticks;
use crate::core::scale::AxisRange;
use crate::core::types::{RawRow, Sample, SeriesPoint, Tick};
use crate::error::{ChartError, ChartResult};
use crate::telemetry::{Diagnostic, Diagnostics};

use super::axes::{AxisAssignment, RangePadding, compute_value_range, forced_tick_values};
use super::chart_options::{ChartOptions, StackedNanFill, XAxisKind};
use super::handler_registry::HandlerRegistry;

/// Result of one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub layout: LayoutOutput,
    pub x_range: AxisRange,
    /// Computed value range per y axis, primary first.
    pub y_ranges: Vec<AxisRange>,
    pub diagnostics: Diagnostics,
}

/// One series after extraction, smoothing and window trimming.
#[derive(Debug)]
struct GatheredSeries {
    points: Vec<SeriesPoint>,
    extremes: Option<(f64, f64)>,
}

/// Chart facade: owns options, raw rows and the layout, and rebuilds every
/// tick and point on [`ChartEngine::recompute`].
#[derive(Debug)]
pub struct ChartEngine {
    options: ChartOptions,
    rows: Vec<RawRow>,
    handler: Arc<dyn DataHandler>,
    axes: AxisAssignment,
    axis_diagnostics: Diagnostics,
    layout: ChartLayout,
}

impl ChartEngine {
    /// Builds an engine, instantiating the handler the options select.
    ///
    /// Fails with [`ChartError::UnknownHandler`] when `registry` has no
    /// handler under that name, and with [`ChartError::InvalidData`] for
    /// rows that do not match `options.labels`.
    pub fn new(
        options: ChartOptions,
        rows: Vec<RawRow>,
        registry: &HandlerRegistry,
    ) -> ChartResult<Self> {
        let rows = validate_rows(&options, rows)?;
        let handler = registry.get(options.handler_name(), &options.handler_config())?;
        let mut axis_diagnostics = Diagnostics::default();
        let axes = AxisAssignment::resolve(&options, &mut axis_diagnostics);

        debug!(
            handler = handler.name(),
            series = options.series_names().len(),
            rows = rows.len(),
            axes = axes.len(),
            "chart engine created"
        );

        Ok(Self {
            options,
            rows,
            handler,
            axes,
            axis_diagnostics,
            layout: ChartLayout::new(),
        })
    }

    #[must_use]
    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    #[must_use]
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    #[must_use]
    pub fn handler(&self) -> &dyn DataHandler {
        self.handler.as_ref()
    }

    #[must_use]
    pub fn axes(&self) -> &AxisAssignment {
        &self.axes
    }

    #[must_use]
    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// Replaces the options, re-resolving axes and the handler.
    pub fn set_options(&mut self, options: ChartOptions, registry: &HandlerRegistry) -> ChartResult<()> {
        *self = Self::new(options, self.rows.clone(), registry)?;
        Ok(())
    }

    /// Replaces the raw rows.
    pub fn set_rows(&mut self, rows: Vec<RawRow>) -> ChartResult<()> {
        self.rows = validate_rows(&self.options, rows)?;
        Ok(())
    }

    /// Sets the visible x window; `None` shows all data.
    pub fn set_date_window(&mut self, window: Option<[f64; 2]>) {
        self.options.date_window = window;
    }

    /// Recomputes ticks and points for a plot area of the given size.
    pub fn recompute(&mut self, x_pixels: f64, y_pixels: f64) -> ChartResult<ChartFrame> {
        let mut diagnostics = self.axis_diagnostics.clone();
        let window = self.options.date_window.map(|[low, high]| (low, high));

        let rolled = self.rolled_series();
        let gathered = self.gather_series(&rolled, window);

        let y_ranges = self.y_ranges(&gathered, y_pixels);
        let y_axes = self.y_axis_layouts(&y_ranges, y_pixels);

        let (x_low, x_high) = window.unwrap_or_else(|| self.data_x_range());
        let x_ticks = self.x_ticks(x_low, x_high, x_pixels, &mut diagnostics);

        self.layout.remove_all_datasets();
        for (name, series) in self.options.series_names().iter().zip(gathered) {
            self.layout
                .add_dataset(name.as_str(), series.points, self.axes.axis_of(name));
        }
        self.layout.set_x_ticks(x_ticks);
        self.layout.set_y_axes(y_axes);
        self.layout.set_date_window(window);
        self.layout.set_annotations(self.options.annotations.clone());
        self.layout.set_stacked(self.options.stacked_graph);
        self.layout.evaluate(self.handler.as_ref())?;
        diagnostics.extend(self.layout.diagnostics().clone());

        let output = self.layout.output();
        debug!(
            series = output.points.len(),
            xticks = output.xticks.len(),
            yticks = output.yticks.len(),
            annotated = output.annotated_points.len(),
            diagnostics = diagnostics.len(),
            "chart recomputed"
        );

        Ok(ChartFrame {
            layout: output.clone(),
            x_range: self.layout.x_range(),
            y_ranges,
            diagnostics,
        })
    }

    /// See [`ChartLayout::unstack_point`]. Reads the last recompute.
    #[must_use]
    pub fn unstack_point(&self, index: usize) -> Option<SeriesPoint> {
        self.layout.unstack_point(index)
    }

    fn data_x_range(&self) -> (f64, f64) {
        match (self.rows.first(), self.rows.last()) {
            (Some(first), Some(last)) => (first.x, last.x),
            _ => (0.0, 0.0),
        }
    }

    /// Extracted and smoothed series, one per labeled column.
    fn rolled_series(&self) -> Vec<Vec<Sample>> {
        let period = self.options.roll_period.max(1);
        let roll = |column: usize| {
            let name = &self.options.series_names()[column];
            let log_scale = self.axes.options_for_series(name).logscale;
            let series = self.handler.extract_series(&self.rows, column, log_scale);
            self.handler.rolling_average(&series, period)
        };
        let columns = 0..self.options.series_names().len();

        #[cfg(feature = "parallel-extraction")]
        {
            use rayon::prelude::*;
            return columns.into_par_iter().map(roll).collect();
        }

        #[cfg(not(feature = "parallel-extraction"))]
        {
            columns.map(roll).collect()
        }
    }

    /// Trims each series to the window, builds its points and extremes and
    /// stacks them when enabled. Series are stacked last to first.
    fn gather_series(
        &self,
        rolled: &[Vec<Sample>],
        window: Option<(f64, f64)>,
    ) -> Vec<GatheredSeries> {
        let names = self.options.series_names();
        let mut cumulative = HashMap::new();
        let mut gathered = Vec::with_capacity(rolled.len());

        for (column, series) in rolled.iter().enumerate().rev() {
            let (visible, start) = match window {
                Some((low, high)) => trim_to_window(series, low, high),
                None => (series.as_slice(), 0),
            };
            let mut extremes =
                self.handler
                    .extreme_y_values(visible, window, self.options.step_plot);
            let mut points = self.handler.series_to_points(visible, &names[column], start);

            if self.options.stacked_graph {
                stack_points(
                    &mut points,
                    &mut cumulative,
                    &mut extremes,
                    self.options.stacked_graph_nan_fill,
                );
            }
            gathered.push(GatheredSeries { points, extremes });
        }

        gathered.reverse();
        gathered
    }

    fn y_ranges(&self, gathered: &[GatheredSeries], y_pixels: f64) -> Vec<AxisRange> {
        let padding = RangePadding {
            pad_pixels: self.options.y_range_pad,
            plot_height: y_pixels,
            avoid_min_zero: self.options.avoid_min_zero,
        };
        let names = self.options.series_names();

        self.axes
            .axes()
            .iter()
            .enumerate()
            .map(|(axis, options)| {
                let extremes: Vec<Option<(f64, f64)>> = names
                    .iter()
                    .zip(gathered)
                    .filter(|(name, _)| self.axes.axis_of(name) == axis)
                    .map(|(_, series)| series.extremes)
                    .collect();
                compute_value_range(&extremes, options, padding)
            })
            .collect()
    }

    /// Ticks per y axis. The primary axis ticks on its own; secondary axes
    /// mirror it unless they set `independent_ticks`.
    fn y_axis_layouts(&self, ranges: &[AxisRange], y_pixels: f64) -> Vec<YAxisLayout> {
        let axes = self.axes.axes();
        let mut layouts: Vec<YAxisLayout> = Vec::with_capacity(axes.len());

        for (index, (options, range)) in axes.iter().zip(ranges).enumerate() {
            let ticks = match layouts.first() {
                Some(primary) if !options.independent_ticks => {
                    let forced = forced_tick_values(&primary.ticks, primary.value_range, *range);
                    numeric_ticks(range.low, range.high, y_pixels, options, Some(&forced))
                }
                _ => numeric_ticks(range.low, range.high, y_pixels, options, None),
            };
            debug!(axis = index, low = range.low, high = range.high, ticks = ticks.len(), "y axis ticks");
            layouts.push(YAxisLayout {
                value_range: *range,
                logscale: options.logscale,
                ticks,
            });
        }
        layouts
    }

    fn x_ticks(&self, low: f64, high: f64, pixels: f64, diagnostics: &mut Diagnostics) -> Vec<Tick> {
        let options = &self.options.x_axis;
        match self.options.x_axis_kind {
            XAxisKind::Numeric => numeric_ticks(low, high, pixels, options, None),
            XAxisKind::Date => {
                if pick_granularity(low, high, pixels, options.pixels_per_label).is_none() {
                    diagnostics.report(Diagnostic::EmptyDateAxis { low, high, pixels });
                    return Vec::new();
                }
                date_ticks(low, high, pixels, options)
            }
        }
    }
}

/// Sorts rows by x and checks that every row fits the labeled columns.
fn validate_rows(options: &ChartOptions, mut rows: Vec<RawRow>) -> ChartResult<Vec<RawRow>> {
    if options.labels.is_empty() {
        return Err(ChartError::InvalidData(
            "labels must name at least the x column".to_owned(),
        ));
    }
    let series = options.series_names().len();
    for (index, row) in rows.iter().enumerate() {
        if !row.x.is_finite() {
            return Err(ChartError::InvalidData(format!(
                "row {index} has a non-finite x value"
            )));
        }
        if row.values.len() > series {
            return Err(ChartError::InvalidData(format!(
                "row {index} has {} values but only {series} series are labeled",
                row.values.len()
            )));
        }
    }
    if !rows.is_sorted_by(|a, b| a.x <= b.x) {
        warn!(rows = rows.len(), "data rows are not sorted by x; sorting");
        rows.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    Ok(rows)
}

/// Slice of `series` inside `low..=high` plus the nearest non-gap sample on
/// each side, and the index the slice starts at.
fn trim_to_window(series: &[Sample], low: f64, high: f64) -> (&[Sample], usize) {
    if series.is_empty() {
        return (series, 0);
    }
    let last_index = series.len() - 1;
    let first = series.iter().position(|sample| sample.x >= low).unwrap_or(0);
    let last = series
        .iter()
        .rposition(|sample| sample.x <= high)
        .unwrap_or(last_index);

    let mut start = first;
    while start > 0 {
        start -= 1;
        if series[start].y.is_some() {
            break;
        }
    }
    let mut end = last;
    while end < last_index {
        end += 1;
        if series[end].y.is_some() {
            break;
        }
    }
    let end = end.max(start);
    (&series[start..=end], start)
}

fn stackable(point: &SeriesPoint) -> Option<f64> {
    point.yval.filter(|y| !y.is_nan())
}

/// Adds `points` on top of `cumulative`, replacing valid y values with the
/// stacked total. Gaps stay gaps but contribute a filled value.
fn stack_points(
    points: &mut [SeriesPoint],
    cumulative: &mut HashMap<OrderedFloat<f64>, f64>,
    extremes: &mut Option<(f64, f64)>,
    fill: StackedNanFill,
) {
    let mut prev: Option<(f64, f64)> = None;
    let mut last_xval: Option<f64> = None;

    for i in 0..points.len() {
        let xval = points[i].xval;
        let own = stackable(&points[i]);
        let actual = match own {
            Some(y) => {
                prev = Some((xval, y));
                y
            }
            None => {
                let next = points[i + 1..]
                    .iter()
                    .find_map(|point| stackable(point).map(|y| (point.xval, y)));
                match (prev, next, fill) {
                    (Some((px, py)), Some((nx, ny)), StackedNanFill::All | StackedNanFill::Inside) => {
                        py + (ny - py) * ((xval - px) / (nx - px))
                    }
                    (Some((_, py)), _, StackedNanFill::All) => py,
                    (_, Some((_, ny)), StackedNanFill::All) => ny,
                    _ => 0.0,
                }
            }
        };

        let total = cumulative.entry(OrderedFloat(xval)).or_insert(0.0);
        // Repeated x values are stacked once.
        if last_xval != Some(xval) {
            *total += actual;
        }
        let stacked = *total;
        last_xval = Some(xval);

        if own.is_some() {
            points[i].yval = Some(stacked);
        }
        *extremes = Some(match *extremes {
            Some((min, max)) => (min.min(stacked), max.max(stacked)),
            None => (stacked, stacked),
        });
    }
}
