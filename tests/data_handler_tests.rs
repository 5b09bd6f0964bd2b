use approx::assert_relative_eq;
use chart_core::core::data_handler::{
    CompressedHandler, CustomBarsHandler, DefaultFractionsHandler, DefaultHandler,
    ErrorBarsHandler, FractionBarsHandler, RawHandler, RebaseHandler, indexes_in_window,
};
use chart_core::core::{
    AxisMapping, AxisRange, DataHandler, HandlerConfig, RawRow, RawValue, RebaseBase, Sample,
};

fn plain_rows(values: &[Option<f64>]) -> Vec<RawRow> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| RawRow::new(i as f64, vec![RawValue::from(*value)]))
        .collect()
}

#[test]
fn handlers_report_their_registry_names() {
    let config = HandlerConfig::default();
    let handlers: Vec<Box<dyn DataHandler>> = vec![
        Box::new(DefaultHandler),
        Box::new(DefaultFractionsHandler),
        Box::new(FractionBarsHandler::new(&config)),
        Box::new(ErrorBarsHandler::new(&config)),
        Box::new(CustomBarsHandler),
        Box::new(RawHandler),
        Box::new(CompressedHandler),
        Box::new(RebaseHandler::new(config.rebase)),
    ];
    let names: Vec<&str> = handlers.iter().map(|handler| handler.name()).collect();
    assert_eq!(
        names,
        vec![
            "default",
            "default-fractions",
            "bars-fractions",
            "bars-error",
            "bars-custom",
            "raw",
            "compressed",
            "rebase",
        ]
    );
}

#[test]
fn default_rolling_average_is_trailing() {
    let rows = plain_rows(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    let series = DefaultHandler.extract_series(&rows, 0, false);
    let rolled = DefaultHandler.rolling_average(&series, 3);
    let ys: Vec<Option<f64>> = rolled.iter().map(|sample| sample.y).collect();
    assert_eq!(ys, vec![Some(1.0), Some(1.5), Some(2.0), Some(3.0)]);
}

#[test]
fn period_one_preserves_nan_samples() {
    let rows = plain_rows(&[Some(1.0), Some(f64::NAN), None]);
    let series = DefaultHandler.extract_series(&rows, 0, false);
    let rolled = DefaultHandler.rolling_average(&series, 1);
    assert!(rolled[1].y.is_some_and(f64::is_nan));
    assert_eq!(rolled[2].y, None);
}

#[test]
fn short_fraction_series_share_their_first_row() {
    let handler = FractionBarsHandler::default();
    let short = vec![RawRow::new(1.0, vec![RawValue::Pair([1.0, 10.0])])];
    let long = vec![
        RawRow::new(1.0, vec![RawValue::Pair([1.0, 10.0])]),
        RawRow::new(2.0, vec![RawValue::Pair([5.0, 10.0])]),
    ];

    let short = handler.rolling_average(&handler.extract_series(&short, 0, false), 1);
    let long = handler.rolling_average(&handler.extract_series(&long, 0, false), 1);
    assert_eq!(short[0], long[0]);
    assert_relative_eq!(long[1].y.expect("y"), 50.0);
}

#[test]
fn default_fractions_have_no_band() {
    let rows = vec![RawRow::new(0.0, vec![RawValue::Pair([1.0, 4.0])])];
    let handler = DefaultFractionsHandler;
    let formatted = handler.format_series(&handler.rolling_average(&handler.extract_series(&rows, 0, false), 1));
    assert_relative_eq!(formatted[0].y.expect("y"), 25.0);
    assert_eq!((formatted[0].low, formatted[0].high), (None, None));
}

#[test]
fn custom_bars_format_as_quadruples() {
    let rows = vec![RawRow::new(0.0, vec![RawValue::Triple([1.0, 2.0, 4.0])])];
    let handler = CustomBarsHandler;
    let formatted = handler.format_series(&handler.extract_series(&rows, 0, false));
    assert_eq!(formatted[0].x, 0.0);
    assert_eq!(formatted[0].y, Some(2.0));
    assert_eq!(formatted[0].low, Some(1.0));
    assert_eq!(formatted[0].high, Some(4.0));
}

#[test]
fn bar_shapes_gap_on_log_scale() {
    let rows = vec![
        RawRow::new(0.0, vec![RawValue::Triple([-1.0, 2.0, 4.0])]),
        RawRow::new(1.0, vec![RawValue::Triple([1.0, 2.0, 4.0])]),
    ];
    let series = CustomBarsHandler.extract_series(&rows, 0, true);
    assert_eq!(series[0].y, None);
    assert_eq!(series[1].y, Some(2.0));
}

#[test]
fn extremes_include_interpolated_window_edges() {
    let rows = plain_rows(&[Some(0.0), Some(10.0), Some(20.0), Some(0.0)]);
    let series = DefaultHandler.extract_series(&rows, 0, false);

    assert_eq!(DefaultHandler.extreme_y_values(&series, None, false), Some((0.0, 20.0)));
    assert_eq!(
        DefaultHandler.extreme_y_values(&series, Some((0.5, 1.5)), false),
        Some((5.0, 15.0))
    );
    // Step plots hold the previous value across the left edge.
    assert_eq!(
        DefaultHandler.extreme_y_values(&series, Some((0.5, 1.5)), true),
        Some((0.0, 10.0))
    );
    assert_eq!(indexes_in_window(&series, 0.5, 1.5), (1, 1));
}

#[test]
fn extremes_of_all_gap_series_are_none() {
    let series = vec![Sample::new(0.0, None), Sample::new(1.0, None)];
    assert_eq!(DefaultHandler.extreme_y_values(&series, None, false), None);
}

#[test]
fn points_carry_window_offset_and_band_edges() {
    let rows = vec![
        RawRow::new(0.0, vec![RawValue::Pair([10.0, 1.0])]),
        RawRow::new(1.0, vec![RawValue::Pair([12.0, 2.0])]),
    ];
    let handler = ErrorBarsHandler::default();
    let series = handler.extract_series(&rows, 0, false);
    let mut points = handler.series_to_points(&series, "err", 4);

    assert_eq!(points[0].idx, 4);
    assert_eq!(points[1].idx, 5);
    assert_eq!(points[0].name, "err");
    assert_eq!(points[0].yval_minus, Some(8.0));
    assert_eq!(points[0].yval_plus, Some(12.0));

    let axis = AxisMapping::new(AxisRange::new(0.0, 20.0), false);
    handler.on_point_created(&mut points[0], &axis);
    assert_relative_eq!(points[0].y_top.expect("top"), 0.6);
    assert_relative_eq!(points[0].y_bottom.expect("bottom"), 0.4);

    // Plain handlers leave the band fields unset.
    let mut plain = DefaultHandler.series_to_points(&series, "plain", 0);
    DefaultHandler.on_point_created(&mut plain[0], &axis);
    assert_eq!(plain[0].y_top, None);
}

#[test]
fn log_axis_band_edges_use_log_mapping() {
    let rows = vec![RawRow::new(0.0, vec![RawValue::Triple([10.0, 20.0, 100.0])])];
    let handler = CustomBarsHandler;
    let series = handler.extract_series(&rows, 0, true);
    let mut points = handler.series_to_points(&series, "bars", 0);

    let axis = AxisMapping::new(AxisRange::new(1.0, 100.0), true);
    handler.on_point_created(&mut points[0], &axis);
    assert_relative_eq!(points[0].y_top.expect("top"), 0.5);
    assert_relative_eq!(points[0].y_bottom.expect("bottom"), 0.0);
}

#[test]
fn rebase_percent_starts_at_zero() {
    let rows = plain_rows(&[None, Some(200.0), Some(300.0)]);
    let handler = RebaseHandler::new(RebaseBase::Percent);
    let series = handler.extract_series(&rows, 0, false);
    let points = handler.series_to_points(&series, "r", 0);
    assert_eq!(points[1].yval, Some(0.0));
    assert_relative_eq!(points[2].yval.expect("yval"), 50.0);
}
