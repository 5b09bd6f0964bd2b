use approx::assert_relative_eq;
use chart_core::ChartError;
use chart_core::core::data_handler::{CustomBarsHandler, DefaultHandler};
use chart_core::core::types::FormattedSample;
use chart_core::core::{Annotation, AxisRange, ChartLayout, LayoutStage, SeriesPoint, Tick, YAxisLayout};
use chart_core::telemetry::Diagnostic;

fn series(name: &str, values: &[(f64, f64)]) -> Vec<SeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(idx, (x, y))| {
            SeriesPoint::unplaced(
                name,
                idx,
                &FormattedSample {
                    x: *x,
                    y: Some(*y),
                    low: None,
                    high: None,
                },
            )
        })
        .collect()
}

fn linear_axis(low: f64, high: f64, ticks: &[f64]) -> YAxisLayout {
    YAxisLayout {
        value_range: AxisRange::new(low, high),
        logscale: false,
        ticks: ticks.iter().map(|value| Tick::labeled(*value, value.to_string())).collect(),
    }
}

#[test]
fn points_are_normalized_with_inverted_y() {
    let mut layout = ChartLayout::new();
    layout.add_dataset("a", series("a", &[(10.0, 0.0), (20.0, 5.0), (30.0, 10.0)]), 0);
    layout.set_y_axes(vec![linear_axis(0.0, 10.0, &[])]);
    layout.evaluate(&DefaultHandler).expect("layout");

    let points = &layout.output().points["a"];
    let xs: Vec<f64> = points.iter().map(|point| point.x).collect();
    let ys: Vec<f64> = points.iter().map(|point| point.y).collect();
    assert_eq!(xs, vec![0.0, 0.5, 1.0]);
    assert_eq!(ys, vec![1.0, 0.5, 0.0]);
}

#[test]
fn explicit_window_overrides_data_range_without_clamping() {
    let mut layout = ChartLayout::new();
    layout.add_dataset("a", series("a", &[(0.0, 20.0), (10.0, -10.0)]), 0);
    layout.set_y_axes(vec![linear_axis(0.0, 10.0, &[])]);
    layout.set_date_window(Some((5.0, 10.0)));
    layout.evaluate(&DefaultHandler).expect("layout");

    let points = &layout.output().points["a"];
    assert_relative_eq!(points[0].x, -1.0);
    assert_relative_eq!(points[0].y, -1.0);
    assert_relative_eq!(points[1].y, 2.0);
}

#[test]
fn ticks_outside_the_unit_range_are_dropped() {
    let mut layout = ChartLayout::new();
    layout.add_dataset("a", series("a", &[(0.0, 0.0), (100.0, 1.0)]), 0);
    layout.set_x_ticks(vec![
        Tick::labeled(-10.0, "-10"),
        Tick::labeled(0.0, "0"),
        Tick::labeled(50.0, "50"),
        Tick::labeled(120.0, "120"),
    ]);
    layout.set_y_axes(vec![linear_axis(0.0, 4.0, &[-1.0, 0.0, 1.0, 5.0])]);
    layout.evaluate(&DefaultHandler).expect("layout");

    let output = layout.output();
    let xticks: Vec<(f64, &str)> = output
        .xticks
        .iter()
        .map(|tick| (tick.position, tick.label.as_str()))
        .collect();
    assert_eq!(xticks, vec![(0.0, "0"), (0.5, "50")]);

    let yticks: Vec<(usize, f64)> = output
        .yticks
        .iter()
        .map(|tick| (tick.axis, tick.position))
        .collect();
    assert_eq!(yticks, vec![(0, 1.0), (0, 0.75)]);
}

#[test]
fn secondary_axis_points_use_their_own_mapping() {
    let mut layout = ChartLayout::new();
    layout.add_dataset("a", series("a", &[(0.0, 5.0), (1.0, 5.0)]), 0);
    layout.add_dataset("b", series("b", &[(0.0, 500.0), (1.0, 500.0)]), 1);
    layout.set_y_axes(vec![
        linear_axis(0.0, 10.0, &[]),
        linear_axis(0.0, 1000.0, &[250.0]),
    ]);
    layout.evaluate(&DefaultHandler).expect("layout");

    let output = layout.output();
    assert_relative_eq!(output.points["a"][0].y, 0.5);
    assert_relative_eq!(output.points["b"][0].y, 0.5);
    assert_eq!(output.yticks.len(), 1);
    assert_eq!(output.yticks[0].axis, 1);
    assert_relative_eq!(output.yticks[0].position, 0.75);
}

#[test]
fn invalid_log_range_is_reported_and_layout_continues() {
    let mut layout = ChartLayout::new();
    layout.add_dataset("a", series("a", &[(0.0, 1.0), (1.0, 10.0)]), 0);
    layout.set_y_axes(vec![YAxisLayout {
        value_range: AxisRange::new(0.0, 10.0),
        logscale: true,
        ticks: Vec::new(),
    }]);
    layout.evaluate(&DefaultHandler).expect("layout still runs");

    assert_eq!(layout.stage(), LayoutStage::AnnotationsMapped);
    assert_eq!(
        layout.diagnostics().entries(),
        [Diagnostic::InvalidLogRange {
            axis: 0,
            min: 0.0,
            max: 10.0
        }]
    );
    assert_eq!(layout.output().points["a"].len(), 2);
}

#[test]
fn annotations_attach_by_x_and_series() {
    let mut layout = ChartLayout::new();
    layout.add_dataset("a", series("a", &[(0.0, 1.0), (1.0, 2.0)]), 0);
    layout.add_dataset("b", series("b", &[(0.0, 3.0), (1.0, 4.0)]), 0);
    layout.set_y_axes(vec![linear_axis(0.0, 5.0, &[])]);
    layout.set_annotations(vec![
        Annotation {
            series: "b".to_owned(),
            xval: 1.0,
            short_text: "B".to_owned(),
            text: "peak".to_owned(),
        },
        Annotation {
            series: "a".to_owned(),
            xval: 7.0,
            short_text: "X".to_owned(),
            text: "outside the data".to_owned(),
        },
    ]);
    layout.evaluate(&DefaultHandler).expect("layout");

    let output = layout.output();
    assert_eq!(output.annotated_points.len(), 1);
    let annotated = &output.annotated_points[0];
    assert_eq!(annotated.name, "b");
    assert_eq!(annotated.xval, 1.0);
    assert_eq!(annotated.annotation.as_ref().map(|a| a.text.as_str()), Some("peak"));
    assert!(output.points["b"][1].annotation.is_some());
    assert!(output.points["a"].iter().all(|point| point.annotation.is_none()));
}

#[test]
fn unstack_subtracts_the_layer_below_without_mutating() {
    let mut layout = ChartLayout::new();
    // Already stacked: "top" holds top + bottom.
    layout.add_dataset("top", series("top", &[(0.0, 5.0), (1.0, 7.0)]), 0);
    layout.add_dataset("bottom", series("bottom", &[(0.0, 2.0), (1.0, 3.0)]), 0);
    layout.set_y_axes(vec![linear_axis(0.0, 10.0, &[])]);
    layout.set_stacked(true);
    layout.evaluate(&DefaultHandler).expect("layout");

    let unstacked = layout.unstack_point(1).expect("point");
    assert_eq!(unstacked.yval, Some(4.0));
    assert_eq!(layout.output().points["top"][1].yval, Some(7.0));
    // The bottom layer has nothing below it.
    assert_eq!(layout.unstack_point(2).and_then(|point| point.yval), Some(2.0));
    assert!(layout.unstack_point(4).is_none());

    layout.set_stacked(false);
    assert_eq!(layout.unstack_point(1).and_then(|point| point.yval), Some(7.0));
}

#[test]
fn band_edges_are_placed_by_the_handler() {
    let mut layout = ChartLayout::new();
    let points = vec![SeriesPoint::unplaced(
        "bars",
        0,
        &FormattedSample {
            x: 0.0,
            y: Some(5.0),
            low: Some(2.0),
            high: Some(8.0),
        },
    )];
    layout.add_dataset("bars", points, 0);
    layout.set_y_axes(vec![linear_axis(0.0, 10.0, &[])]);
    layout.evaluate(&CustomBarsHandler).expect("layout");

    let point = &layout.output().points["bars"][0];
    assert_relative_eq!(point.y_top.expect("top"), 0.8);
    assert_relative_eq!(point.y_bottom.expect("bottom"), 0.2);
}

#[test]
fn stages_cannot_be_skipped() {
    let mut layout = ChartLayout::new();
    let err = layout
        .evaluate_series(&DefaultHandler)
        .expect_err("series before limits");
    assert!(matches!(
        err,
        ChartError::InvalidLayoutStage {
            expected: LayoutStage::LimitsEvaluated,
            actual: LayoutStage::Empty
        }
    ));

    layout.evaluate_limits().expect("limits");
    assert!(layout.evaluate_limits().is_err());
    layout.evaluate_series(&DefaultHandler).expect("series");
    layout.evaluate_ticks().expect("ticks");
    layout.evaluate_annotations().expect("annotations");
    assert_eq!(layout.stage(), LayoutStage::AnnotationsMapped);

    layout.reset();
    assert_eq!(layout.stage(), LayoutStage::Empty);
    assert!(layout.output().points.is_empty());
}
