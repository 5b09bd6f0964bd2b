use crate::core::scale::AxisMapping;
use crate::core::types::{RawRow, Sample, SampleExtras, SeriesPoint};

use super::{DataHandler, HandlerConfig, bar_band, place_band, sum_term, windowed_extremes};

/// `[value, deviation]` series drawn with a `±sigma * deviation` band.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBarsHandler {
    sigma: f64,
}

impl ErrorBarsHandler {
    #[must_use]
    pub fn new(config: &HandlerConfig) -> Self {
        Self {
            sigma: config.sigma,
        }
    }

    fn cell(&self, row: &RawRow, column: usize, log_scale: bool) -> Option<[f64; 2]> {
        let [y, dev] = row.value(column).as_pair()?;
        if log_scale && (y <= 0.0 || y - self.sigma * dev <= 0.0) {
            return None;
        }
        Some([y, dev])
    }
}

impl Default for ErrorBarsHandler {
    fn default() -> Self {
        Self::new(&HandlerConfig::default())
    }
}

impl DataHandler for ErrorBarsHandler {
    fn name(&self) -> &'static str {
        "bars-error"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| match self.cell(row, column, log_scale) {
                Some([y, dev]) if !y.is_nan() => {
                    let variance = self.sigma * dev;
                    Sample::with_extras(
                        row.x,
                        Some(y),
                        SampleExtras::Deviation {
                            low: Some(y - variance),
                            high: Some(y + variance),
                            dev: Some(dev),
                        },
                    )
                }
                Some([y, _]) => Sample::with_extras(
                    row.x,
                    Some(y),
                    SampleExtras::Deviation {
                        low: Some(y),
                        high: Some(y),
                        dev: Some(y),
                    },
                ),
                None => Sample::with_extras(
                    row.x,
                    None,
                    SampleExtras::Deviation {
                        low: None,
                        high: None,
                        dev: None,
                    },
                ),
            })
            .collect()
    }

    /// Averages values and combines deviations as `sqrt(sum dev^2) / n`.
    fn rolling_average(&self, series: &[Sample], period: usize) -> Vec<Sample> {
        let period = period.min(series.len()).max(1);
        series
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let start = (i + 1).saturating_sub(period);
                let mut sum = 0.0;
                let mut variance = 0.0;
                let mut count = 0usize;
                for windowed in &series[start..=i] {
                    let Some(y) = windowed.valid_y() else {
                        continue;
                    };
                    let dev = match windowed.extras {
                        SampleExtras::Deviation { dev, .. } => sum_term(dev),
                        _ => 0.0,
                    };
                    count += 1;
                    sum += y;
                    variance += dev * dev;
                }

                if count > 0 {
                    let stddev = variance.sqrt() / count as f64;
                    let value = sum / count as f64;
                    Sample::with_extras(
                        sample.x,
                        Some(value),
                        SampleExtras::Band {
                            low: Some(value - self.sigma * stddev),
                            high: Some(value + self.sigma * stddev),
                        },
                    )
                } else {
                    // Unsmoothed series keep their NaNs.
                    let y = if period == 1 { sample.y } else { None };
                    Sample::with_extras(sample.x, y, SampleExtras::Band { low: y, high: y })
                }
            })
            .collect()
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

/// `[low, mid, high]` series drawn as a line with an explicit band.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomBarsHandler;

impl DataHandler for CustomBarsHandler {
    fn name(&self) -> &'static str {
        "bars-custom"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| {
                let cell = row
                    .value(column)
                    .as_triple()
                    .filter(|cell| !log_scale || cell.iter().all(|value| *value > 0.0));
                match cell {
                    Some([low, mid, high]) if !mid.is_nan() => Sample::with_extras(
                        row.x,
                        Some(mid),
                        SampleExtras::Band {
                            low: Some(low),
                            high: Some(high),
                        },
                    ),
                    Some([_, mid, _]) => Sample::with_extras(
                        row.x,
                        Some(mid),
                        SampleExtras::Band {
                            low: Some(mid),
                            high: Some(mid),
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

    /// Running sums of low, mid and high over the valid samples in the window.
    fn rolling_average(&self, series: &[Sample], period: usize) -> Vec<Sample> {
        let period = period.min(series.len()).max(1);
        let mut low = 0.0;
        let mut mid = 0.0;
        let mut high = 0.0;
        let mut count = 0usize;

        series
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                if let Some(y) = sample.valid_y() {
                    let (band_low, band_high) = sample.extras.band();
                    low += sum_term(band_low);
                    mid += y;
                    high += sum_term(band_high);
                    count += 1;
                }
                if i >= period {
                    let prev = &series[i - period];
                    if let Some(y) = prev.valid_y() {
                        let (band_low, band_high) = prev.extras.band();
                        low -= sum_term(band_low);
                        mid -= y;
                        high -= sum_term(band_high);
                        count -= 1;
                    }
                }

                if count > 0 {
                    let n = count as f64;
                    Sample::with_extras(
                        sample.x,
                        Some(mid / n),
                        SampleExtras::Band {
                            low: Some(low / n),
                            high: Some(high / n),
                        },
                    )
                } else {
                    Sample::with_extras(
                        sample.x,
                        None,
                        SampleExtras::Band {
                            low: None,
                            high: None,
                        },
                    )
                }
            })
            .collect()
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

#[cfg(test)]
mod tests {
    use super::{CustomBarsHandler, ErrorBarsHandler};
    use crate::core::data_handler::DataHandler;
    use crate::core::types::{RawRow, RawValue, SampleExtras};
    use approx::assert_relative_eq;

    #[test]
    fn error_bars_band_uses_sigma() {
        let rows = vec![RawRow::new(0.0, vec![RawValue::Pair([10.0, 1.0])])];
        let series = ErrorBarsHandler::default().extract_series(&rows, 0, false);
        assert_eq!(
            series[0].extras,
            SampleExtras::Deviation {
                low: Some(8.0),
                high: Some(12.0),
                dev: Some(1.0)
            }
        );
    }

    #[test]
    fn error_bars_log_scale_drops_band_below_zero() {
        let rows = vec![
            RawRow::new(0.0, vec![RawValue::Pair([1.0, 1.0])]),
            RawRow::new(1.0, vec![RawValue::Pair([10.0, 1.0])]),
        ];
        let series = ErrorBarsHandler::default().extract_series(&rows, 0, true);
        assert_eq!(series[0].y, None);
        assert_eq!(series[1].y, Some(10.0));
    }

    #[test]
    fn error_bars_rolling_combines_deviations() {
        let rows = vec![
            RawRow::new(0.0, vec![RawValue::Pair([10.0, 3.0])]),
            RawRow::new(1.0, vec![RawValue::Pair([20.0, 4.0])]),
        ];
        let handler = ErrorBarsHandler::default();
        let rolled = handler.rolling_average(&handler.extract_series(&rows, 0, false), 2);
        assert_relative_eq!(rolled[1].y.expect("y"), 15.0);
        let SampleExtras::Band { low, high } = rolled[1].extras else {
            panic!("expected band");
        };
        // sqrt(9 + 16) / 2 = 2.5, times sigma 2.
        assert_relative_eq!(low.expect("low"), 10.0);
        assert_relative_eq!(high.expect("high"), 20.0);
    }

    #[test]
    fn custom_bars_running_sums() {
        let rows = vec![
            RawRow::new(0.0, vec![RawValue::Triple([1.0, 2.0, 3.0])]),
            RawRow::new(1.0, vec![RawValue::Missing]),
            RawRow::new(2.0, vec![RawValue::Triple([3.0, 4.0, 5.0])]),
            RawRow::new(3.0, vec![RawValue::Triple([5.0, 6.0, 9.0])]),
        ];
        let handler = CustomBarsHandler;
        let rolled = handler.rolling_average(&handler.extract_series(&rows, 0, false), 2);
        assert_eq!(rolled[1].y, Some(2.0));
        assert_eq!(rolled[2].y, Some(4.0));
        assert_eq!(rolled[3].y, Some(5.0));
        assert_eq!(
            rolled[3].extras,
            SampleExtras::Band {
                low: Some(4.0),
                high: Some(7.0)
            }
        );
    }
}
