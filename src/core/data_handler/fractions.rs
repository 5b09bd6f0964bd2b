use crate::core::scale::AxisMapping;
use crate::core::types::{RawRow, Sample, SampleExtras, SeriesPoint};

use super::{
    DataHandler, HandlerConfig, bar_band, place_band, plain_band, sum_term, windowed_extremes,
};

const PERCENT: f64 = 100.0;

/// `[numerator, denominator]` cell with log-scale gaps applied.
fn fraction_cell(row: &RawRow, column: usize, log_scale: bool) -> Option<[f64; 2]> {
    let [num, den] = row.value(column).as_pair()?;
    if log_scale && (num <= 0.0 || den <= 0.0) {
        return None;
    }
    Some([num, den])
}

fn ratio(num: f64, den: f64) -> f64 {
    if den != 0.0 && !den.is_nan() { num / den } else { 0.0 }
}

fn fraction_counts(sample: &Sample) -> (Option<f64>, Option<f64>) {
    match sample.extras {
        SampleExtras::Fraction { num, den, .. } => (num, den),
        _ => (None, None),
    }
}

/// Running numerator and denominator sums over a trailing window.
fn running_fractions(series: &[Sample], period: usize) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
    let period = period.min(series.len()).max(1);
    let mut num = 0.0;
    let mut den = 0.0;
    series.iter().enumerate().map(move |(i, sample)| {
        let (n, d) = fraction_counts(sample);
        num += sum_term(n);
        den += sum_term(d);
        if i >= period {
            let (n, d) = fraction_counts(&series[i - period]);
            num -= sum_term(n);
            den -= sum_term(d);
        }
        (sample.x, num, den)
    })
}

/// Fractions drawn as a percentage line without bands.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFractionsHandler;

impl DataHandler for DefaultFractionsHandler {
    fn name(&self) -> &'static str {
        "default-fractions"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| match fraction_cell(row, column, log_scale) {
                Some([num, den]) => {
                    let y = if num.is_nan() {
                        num
                    } else {
                        PERCENT * ratio(num, den)
                    };
                    Sample::with_extras(
                        row.x,
                        Some(y),
                        SampleExtras::Fraction {
                            low: None,
                            high: None,
                            num: Some(num),
                            den: Some(den),
                        },
                    )
                }
                None => Sample::with_extras(
                    row.x,
                    None,
                    SampleExtras::Fraction {
                        low: None,
                        high: None,
                        num: None,
                        den: None,
                    },
                ),
            })
            .collect()
    }

    fn rolling_average(&self, series: &[Sample], period: usize) -> Vec<Sample> {
        running_fractions(series, period)
            .map(|(x, num, den)| Sample::new(x, Some(PERCENT * ratio(num, den))))
            .collect()
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

/// Fractions drawn as a percentage with a confidence band.
#[derive(Debug, Clone, Copy)]
pub struct FractionBarsHandler {
    sigma: f64,
    wilson_interval: bool,
}

impl FractionBarsHandler {
    #[must_use]
    pub fn new(config: &HandlerConfig) -> Self {
        Self {
            sigma: config.sigma,
            wilson_interval: config.wilson_interval,
        }
    }

    fn wilson_band(&self, x: f64, num: f64, den: f64) -> Sample {
        if den == 0.0 || den.is_nan() {
            return Sample::with_extras(
                x,
                Some(0.0),
                SampleExtras::Band {
                    low: Some(0.0),
                    high: Some(0.0),
                },
            );
        }
        let sigma = self.sigma;
        let p = ratio(num, den).max(0.0);
        let n = den;
        let pm = sigma * (p * (1.0 - p) / n + sigma * sigma / (4.0 * n * n)).sqrt();
        let denom = 1.0 + sigma * sigma / den;
        let center = p + sigma * sigma / (2.0 * den);
        Sample::with_extras(
            x,
            Some(p * PERCENT),
            SampleExtras::Band {
                low: Some((center - pm) / denom * PERCENT),
                high: Some((center + pm) / denom * PERCENT),
            },
        )
    }

    fn normal_band(&self, x: f64, num: f64, den: f64) -> Sample {
        let value = ratio(num, den);
        let stddev = self.stddev(value, den);
        Sample::with_extras(
            x,
            Some(PERCENT * value),
            SampleExtras::Band {
                low: Some(PERCENT * (value - stddev)),
                high: Some(PERCENT * (value + stddev)),
            },
        )
    }

    fn stddev(&self, value: f64, den: f64) -> f64 {
        if den != 0.0 && !den.is_nan() {
            self.sigma * (value * (1.0 - value) / den).sqrt()
        } else {
            1.0
        }
    }
}

impl Default for FractionBarsHandler {
    fn default() -> Self {
        Self::new(&HandlerConfig::default())
    }
}

impl DataHandler for FractionBarsHandler {
    fn name(&self) -> &'static str {
        "bars-fractions"
    }

    fn extract_series(&self, rows: &[RawRow], column: usize, log_scale: bool) -> Vec<Sample> {
        rows.iter()
            .map(|row| match fraction_cell(row, column, log_scale) {
                Some([num, den]) if !num.is_nan() => {
                    let value = ratio(num, den);
                    let variance = PERCENT * self.stddev(value, den);
                    let y = PERCENT * value;
                    Sample::with_extras(
                        row.x,
                        Some(y),
                        SampleExtras::Fraction {
                            low: Some(y - variance),
                            high: Some(y + variance),
                            num: Some(num),
                            den: Some(den),
                        },
                    )
                }
                Some([num, den]) => Sample::with_extras(
                    row.x,
                    Some(num),
                    SampleExtras::Fraction {
                        low: Some(num),
                        high: Some(num),
                        num: Some(num),
                        den: Some(den),
                    },
                ),
                None => Sample::with_extras(
                    row.x,
                    None,
                    SampleExtras::Fraction {
                        low: None,
                        high: None,
                        num: None,
                        den: None,
                    },
                ),
            })
            .collect()
    }

    fn rolling_average(&self, series: &[Sample], period: usize) -> Vec<Sample> {
        running_fractions(series, period)
            .map(|(x, num, den)| {
                if self.wilson_interval {
                    self.wilson_band(x, num, den)
                } else {
                    self.normal_band(x, num, den)
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
