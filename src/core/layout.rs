use std::collections::HashMap;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::core::data_handler::DataHandler;
use crate::core::scale::{AxisMapping, AxisRange};
use crate::core::types::{Annotation, SeriesPoint, Tick};
use crate::error::{ChartError, ChartResult};
use crate::telemetry::{Diagnostic, Diagnostics};

/// Progress of one layout pass. Every pass starts again from `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayoutStage {
    Empty,
    LimitsEvaluated,
    PointsEvaluated,
    TicksMapped,
    AnnotationsMapped,
}

/// Input description of one y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct YAxisLayout {
    /// Computed value range, `[min, max]`.
    pub value_range: AxisRange,
    pub logscale: bool,
    pub ticks: Vec<Tick>,
}

/// Tick placed on the x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTick {
    pub position: f64,
    pub label: String,
}

/// Tick placed on one of the y axes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedYTick {
    pub axis: usize,
    pub position: f64,
    pub label: String,
}

/// Normalized output of a layout pass, ready for a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOutput {
    pub points: IndexMap<String, Vec<SeriesPoint>>,
    pub xticks: Vec<PlacedTick>,
    pub yticks: Vec<PlacedYTick>,
    pub annotated_points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone)]
struct Dataset {
    axis: usize,
    points: Vec<SeriesPoint>,
}

/// Maps series points and ticks into the unit square.
///
/// Inputs are set first, then the stages run in order, either one at a
/// time or through [`ChartLayout::evaluate`].
#[derive(Debug, Clone)]
pub struct ChartLayout {
    stage: LayoutStage,
    datasets: IndexMap<String, Dataset>,
    x_ticks: Vec<Tick>,
    y_axes: Vec<YAxisLayout>,
    date_window: Option<(f64, f64)>,
    annotations: Vec<Annotation>,
    stacked: bool,
    x_range: AxisRange,
    mappings: Vec<AxisMapping>,
    output: LayoutOutput,
    diagnostics: Diagnostics,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartLayout {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: LayoutStage::Empty,
            datasets: IndexMap::new(),
            x_ticks: Vec::new(),
            y_axes: Vec::new(),
            date_window: None,
            annotations: Vec::new(),
            stacked: false,
            x_range: AxisRange::new(0.0, 0.0),
            mappings: Vec::new(),
            output: LayoutOutput::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    #[must_use]
    pub fn stage(&self) -> LayoutStage {
        self.stage
    }

    /// Adds a series of unplaced points drawn against y axis `axis`.
    /// Insertion order is kept in the output.
    pub fn add_dataset(&mut self, name: impl Into<String>, points: Vec<SeriesPoint>, axis: usize) {
        self.datasets.insert(name.into(), Dataset { axis, points });
    }

    pub fn remove_all_datasets(&mut self) {
        self.datasets.clear();
    }

    pub fn set_x_ticks(&mut self, ticks: Vec<Tick>) {
        self.x_ticks = ticks;
    }

    pub fn set_y_axes(&mut self, axes: Vec<YAxisLayout>) {
        self.y_axes = axes;
    }

    pub fn set_date_window(&mut self, window: Option<(f64, f64)>) {
        self.date_window = window;
    }

    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    pub fn set_stacked(&mut self, stacked: bool) {
        self.stacked = stacked;
    }

    /// Discards all computed output and returns to [`LayoutStage::Empty`].
    pub fn reset(&mut self) {
        self.stage = LayoutStage::Empty;
        self.x_range = AxisRange::new(0.0, 0.0);
        self.mappings.clear();
        self.output = LayoutOutput::default();
        self.diagnostics = Diagnostics::default();
    }

    /// Runs every stage from scratch.
    pub fn evaluate(&mut self, handler: &dyn DataHandler) -> ChartResult<()> {
        self.reset();
        self.evaluate_limits()?;
        self.evaluate_series(handler)?;
        self.evaluate_ticks()?;
        self.evaluate_annotations()
    }

    fn require(&self, expected: LayoutStage) -> ChartResult<()> {
        if self.stage != expected {
            return Err(ChartError::InvalidLayoutStage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    /// Resolves the x range and the per-axis y mappings.
    ///
    /// A log axis whose range has a non-positive bound is reported as a
    /// diagnostic and laid out anyway.
    pub fn evaluate_limits(&mut self) -> ChartResult<()> {
        self.require(LayoutStage::Empty)?;

        self.x_range = match self.date_window {
            Some((low, high)) => AxisRange::new(low, high),
            None => self.data_x_range(),
        };

        self.mappings = self
            .y_axes
            .iter()
            .map(|axis| AxisMapping::new(axis.value_range, axis.logscale))
            .collect();

        for (index, mapping) in self.mappings.iter().enumerate() {
            if mapping.is_logscale() && !mapping.has_valid_log_range() {
                let range = mapping.range();
                self.diagnostics.report(Diagnostic::InvalidLogRange {
                    axis: index,
                    min: range.low,
                    max: range.high,
                });
            }
        }

        debug!(
            minx = self.x_range.low,
            maxx = self.x_range.high,
            axes = self.mappings.len(),
            "evaluated layout limits"
        );
        self.stage = LayoutStage::LimitsEvaluated;
        Ok(())
    }

    fn data_x_range(&self) -> AxisRange {
        let mut bounds: Option<(f64, f64)> = None;
        for dataset in self.datasets.values() {
            let points = &dataset.points;
            if points.len() <= 1 {
                continue;
            }
            let first = points[0].xval;
            let last = points[points.len() - 1].xval;
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(first), max.max(last)),
                None => (first, last),
            });
        }
        let (min, max) = bounds.unwrap_or((0.0, 0.0));
        AxisRange::new(min, max)
    }

    fn mapping_for(&self, axis: usize) -> AxisMapping {
        self.mappings
            .get(axis)
            .or_else(|| self.mappings.first())
            .copied()
            .unwrap_or_else(|| AxisMapping::new(AxisRange::new(0.0, 1.0), false))
    }

    /// Places every point in normalized coordinates. Values outside the
    /// ranges are not clamped.
    pub fn evaluate_series(&mut self, handler: &dyn DataHandler) -> ChartResult<()> {
        self.require(LayoutStage::LimitsEvaluated)?;

        let mut points = IndexMap::with_capacity(self.datasets.len());
        for (name, dataset) in &self.datasets {
            let mapping = self.mapping_for(dataset.axis);
            let placed: Vec<SeriesPoint> = dataset
                .points
                .iter()
                .map(|point| {
                    let mut point = point.clone();
                    point.x = self.x_range.normalize(point.xval);
                    point.y = mapping.normalize_opt(point.yval);
                    handler.on_point_created(&mut point, &mapping);
                    point
                })
                .collect();
            points.insert(name.clone(), placed);
        }
        self.output.points = points;

        self.stage = LayoutStage::PointsEvaluated;
        Ok(())
    }

    /// Maps tick values into `[0, 1]`; ticks landing outside are dropped.
    pub fn evaluate_ticks(&mut self) -> ChartResult<()> {
        self.require(LayoutStage::PointsEvaluated)?;

        self.output.xticks = self
            .x_ticks
            .iter()
            .filter_map(|tick| {
                let position = self.x_range.normalize(tick.value);
                in_unit_range(position).then(|| PlacedTick {
                    position,
                    label: tick.label.clone().unwrap_or_default(),
                })
            })
            .collect();

        let mut yticks = Vec::new();
        for (axis, layout) in self.y_axes.iter().enumerate() {
            let mapping = self.mapping_for(axis);
            for tick in &layout.ticks {
                let position = mapping.normalize(tick.value);
                if in_unit_range(position) {
                    yticks.push(PlacedYTick {
                        axis,
                        position,
                        label: tick.label.clone().unwrap_or_default(),
                    });
                }
            }
        }
        self.output.yticks = yticks;

        self.stage = LayoutStage::TicksMapped;
        Ok(())
    }

    /// Attaches annotations to the points they name. Annotations without a
    /// matching point are ignored.
    pub fn evaluate_annotations(&mut self) -> ChartResult<()> {
        self.require(LayoutStage::TicksMapped)?;

        self.output.annotated_points.clear();
        if !self.annotations.is_empty() {
            let lookup: HashMap<(OrderedFloat<f64>, &str), &Annotation> = self
                .annotations
                .iter()
                .map(|annotation| {
                    (
                        (OrderedFloat(annotation.xval), annotation.series.as_str()),
                        annotation,
                    )
                })
                .collect();

            let mut annotated = Vec::new();
            for points in self.output.points.values_mut() {
                for point in points.iter_mut() {
                    let key = (OrderedFloat(point.xval), point.name.as_str());
                    if let Some(annotation) = lookup.get(&key) {
                        point.annotation = Some((*annotation).clone());
                        annotated.push(point.clone());
                    }
                }
            }
            self.output.annotated_points = annotated;
        }

        self.stage = LayoutStage::AnnotationsMapped;
        Ok(())
    }

    #[must_use]
    pub fn output(&self) -> &LayoutOutput {
        &self.output
    }

    #[must_use]
    pub fn into_output(self) -> LayoutOutput {
        self.output
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    /// Point `index` of the flattened point list with the stacked
    /// contribution of the layers below removed.
    ///
    /// Returns an owned copy; the laid-out points are not modified.
    #[must_use]
    pub fn unstack_point(&self, index: usize) -> Option<SeriesPoint> {
        unstack_point(&self.output.points, index, self.stacked)
    }
}

/// See [`ChartLayout::unstack_point`].
#[must_use]
pub fn unstack_point(
    points: &IndexMap<String, Vec<SeriesPoint>>,
    index: usize,
    stacked: bool,
) -> Option<SeriesPoint> {
    let mut flattened = points.values().flatten();
    let mut unstacked = flattened.nth(index)?.clone();
    if !stacked {
        return Some(unstacked);
    }
    if let Some(below) = flattened.find(|point| point.xval == unstacked.xval) {
        unstacked.yval = unstacked
            .yval
            .map(|yval| yval - below.yval.unwrap_or(0.0));
    }
    Some(unstacked)
}

fn in_unit_range(position: f64) -> bool {
    (0.0..=1.0).contains(&position)
}

#[cfg(test)]
mod tests {
    use super::{ChartLayout, LayoutStage, YAxisLayout};
    use crate::core::data_handler::DefaultHandler;
    use crate::core::scale::AxisRange;
    use crate::core::types::{FormattedSample, SeriesPoint};
    use crate::error::ChartError;

    fn point(name: &str, idx: usize, x: f64, y: f64) -> SeriesPoint {
        SeriesPoint::unplaced(
            name,
            idx,
            &FormattedSample {
                x,
                y: Some(y),
                low: None,
                high: None,
            },
        )
    }

    #[test]
    fn stages_must_run_in_order() {
        let mut layout = ChartLayout::new();
        let err = layout
            .evaluate_ticks()
            .expect_err("ticks before limits must fail");
        assert!(matches!(
            err,
            ChartError::InvalidLayoutStage {
                expected: LayoutStage::PointsEvaluated,
                actual: LayoutStage::Empty
            }
        ));

        layout.set_y_axes(vec![YAxisLayout {
            value_range: AxisRange::new(0.0, 1.0),
            logscale: false,
            ticks: Vec::new(),
        }]);
        layout.evaluate(&DefaultHandler).expect("full pass");
        assert_eq!(layout.stage(), LayoutStage::AnnotationsMapped);
        layout.evaluate(&DefaultHandler).expect("passes can be repeated");
    }

    #[test]
    fn single_point_datasets_do_not_drive_x_range() {
        let mut layout = ChartLayout::new();
        layout.add_dataset("a", vec![point("a", 0, 5.0, 1.0), point("a", 1, 15.0, 1.0)], 0);
        layout.add_dataset("b", vec![point("b", 0, 100.0, 1.0)], 0);
        layout.evaluate(&DefaultHandler).expect("layout");
        assert_eq!(layout.x_range(), AxisRange::new(5.0, 15.0));
    }
}
