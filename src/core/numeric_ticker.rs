use std::sync::LazyLock;

use tracing::trace;

use crate::core::label_format::format_tick_label;
use crate::core::options::AxisOptions;
use crate::core::types::Tick;

/// "Nice" log-scale tick candidates: `m * 10^n` for `m` in `1..=9`,
/// `n` in `-39..=39`, ascending.
pub static PREFERRED_LOG_TICK_VALUES: LazyLock<Vec<f64>> = LazyLock::new(|| {
    (-39..=39)
        .flat_map(|power| {
            let range = 10f64.powi(power);
            (1..=9).map(move |mult| range * f64::from(mult))
        })
        .collect()
});

const DECIMAL_MULTS: [f64; 7] = [1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0];
const BINARY_MULTS: [f64; 9] = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0, 256.0];

/// Ticks for a numeric axis spanning `low..=high` over `pixels`.
///
/// With `forced_values` the tick positions are taken verbatim and only
/// labeled. Otherwise log axes try the preferred log values first and fall
/// back to linear placement when too few of them are in range.
#[must_use]
pub fn numeric_ticks(
    low: f64,
    high: f64,
    pixels: f64,
    options: &AxisOptions,
    forced_values: Option<&[f64]>,
) -> Vec<Tick> {
    ticks_with_scale(low, high, pixels, options, forced_values, options.logscale)
}

/// Same as [`numeric_ticks`] but never uses log placement.
#[must_use]
pub fn numeric_linear_ticks(
    low: f64,
    high: f64,
    pixels: f64,
    options: &AxisOptions,
    forced_values: Option<&[f64]>,
) -> Vec<Tick> {
    ticks_with_scale(low, high, pixels, options, forced_values, false)
}

fn ticks_with_scale(
    low: f64,
    high: f64,
    pixels: f64,
    options: &AxisOptions,
    forced_values: Option<&[f64]>,
    logscale: bool,
) -> Vec<Tick> {
    let pixels_per_tick = options.pixels_per_label;
    let mut ticks = match forced_values {
        Some(values) => values.iter().copied().map(Tick::new).collect(),
        None => {
            let mut ticks = if logscale {
                log_ticks(low, high, pixels, pixels_per_tick)
            } else {
                Vec::new()
            };
            if ticks.is_empty() {
                ticks = linear_ticks(low, high, pixels, pixels_per_tick, options.labels_kmg2);
            }
            ticks
        }
    };

    for tick in &mut ticks {
        if tick.label.is_none() {
            tick.label = Some(format_tick_label(tick.value, None, options));
        }
    }

    trace!(low, high, pixels, logscale, count = ticks.len(), "numeric ticks");
    ticks
}

fn log_ticks(low: f64, high: f64, pixels: f64, pixels_per_tick: f64) -> Vec<Tick> {
    let values = PREFERRED_LOG_TICK_VALUES.as_slice();
    let target = (pixels / pixels_per_tick).floor();

    let first_at_least = values.partition_point(|value| *value < low);
    let min_idx = if first_at_least < values.len() {
        first_at_least
    } else {
        0
    };
    let min_idx = min_idx as i64;
    let max_idx = match values.partition_point(|value| *value <= high) {
        0 => values.len() as i64 - 1,
        past_last => past_last as i64 - 1,
    };

    if ((max_idx - min_idx) as f64) < target / 4.0 {
        return Vec::new();
    }

    let mut ticks = Vec::new();
    let mut last_displayed: Option<f64> = None;
    for idx in (min_idx..=max_idx).rev() {
        let value = values[idx as usize];
        let pixel = (value / low).ln() / (high / low).ln() * pixels;
        let mut tick = Tick::new(value);
        match last_displayed {
            Some(last) if (pixel - last).abs() < pixels_per_tick => {
                tick.label = Some(String::new());
            }
            _ => last_displayed = Some(pixel),
        }
        ticks.push(tick);
    }
    ticks.reverse();
    ticks
}

fn linear_ticks(low: f64, high: f64, pixels: f64, pixels_per_tick: f64, kmg2: bool) -> Vec<Tick> {
    let (mults, base): (&[f64], f64) = if kmg2 {
        (&BINARY_MULTS, 16.0)
    } else {
        (&DECIMAL_MULTS, 10.0)
    };

    let max_ticks = (pixels / pixels_per_tick).ceil();
    let units_per_tick = (high - low).abs() / max_ticks;
    if !units_per_tick.is_finite() || units_per_tick <= 0.0 {
        // Zero-width range or no pixels: nothing to subdivide.
        return if low.is_finite() {
            vec![Tick::new(low)]
        } else {
            Vec::new()
        };
    }

    let base_power = (units_per_tick.ln() / base.ln()).floor();
    let base_scale = base.powf(base_power);

    let mut scale = base_scale;
    let mut low_val = low;
    let mut high_val = high;
    let mut n_ticks = 0.0;
    for mult in mults {
        scale = base_scale * mult;
        low_val = (low / scale).floor() * scale;
        high_val = (high / scale).ceil() * scale;
        n_ticks = (high_val - low_val).abs() / scale;
        if pixels / n_ticks > pixels_per_tick {
            break;
        }
    }

    if low_val > high_val {
        scale = -scale;
    }
    let count = n_ticks.round() as usize;
    (0..=count)
        .map(|i| Tick::new(low_val + i as f64 * scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{PREFERRED_LOG_TICK_VALUES, numeric_linear_ticks, numeric_ticks};
    use crate::core::options::AxisOptions;

    #[test]
    fn preferred_values_cover_the_exponent_range() {
        assert_eq!(PREFERRED_LOG_TICK_VALUES.len(), 79 * 9);
        assert!(PREFERRED_LOG_TICK_VALUES.windows(2).all(|w| w[0] < w[1]));
        assert!(PREFERRED_LOG_TICK_VALUES.contains(&1.0));
        assert!(PREFERRED_LOG_TICK_VALUES.contains(&20.0));
    }

    #[test]
    fn linear_ignores_logscale_option() {
        let options = AxisOptions::default()
            .with_logscale(true)
            .with_pixels_per_label(40.0);
        let values: Vec<f64> = numeric_linear_ticks(0.0, 100.0, 400.0, &options, None)
            .iter()
            .map(|tick| tick.value)
            .collect();
        assert_eq!(values, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn reversed_axis_walks_from_low_to_high() {
        let options = AxisOptions::default().with_pixels_per_label(40.0);
        let values: Vec<f64> = numeric_ticks(100.0, 0.0, 400.0, &options, None)
            .iter()
            .map(|tick| tick.value)
            .collect();
        assert_eq!(values, vec![100.0, 80.0, 60.0, 40.0, 20.0, 0.0]);
    }

    #[test]
    fn degenerate_range_yields_single_tick() {
        let options = AxisOptions::default();
        let ticks = numeric_ticks(5.0, 5.0, 300.0, &options, None);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].label.as_deref(), Some("5"));
        assert_eq!(numeric_ticks(0.0, 1.0, 0.0, &options, None).len(), 1);
    }
}
