use chrono::{Datelike, Local, Timelike, Utc};

use crate::core::granularity::Granularity;
use crate::core::options::AxisOptions;
use crate::core::timezone::{UtcOffsetSource, to_local};

const KMB_LABELS: [&str; 5] = ["K", "M", "B", "T", "Q"];
const KMG2_BIG_LABELS: [&str; 8] = ["k", "M", "G", "T", "P", "E", "Z", "Y"];
const KMG2_SMALL_LABELS: [&str; 8] = ["m", "u", "n", "p", "f", "a", "z", "y"];

const SHORT_MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Separator between the parts of a date label; keeps them on one line.
const NBSP: char = '\u{a0}';

/// Label for a tick value, honoring a configured custom formatter.
///
/// Numeric ticks pass `granularity = None`. Date ticks are labeled in UTC or
/// the host's local zone depending on `labels_utc`.
#[must_use]
pub fn format_tick_label(value: f64, granularity: Option<Granularity>, options: &AxisOptions) -> String {
    if let Some(formatter) = &options.axis_label_formatter {
        let label = formatter.format(value, granularity, options);
        return match granularity {
            None => unit_suffix_label(value, options).unwrap_or(label),
            Some(_) => label,
        };
    }
    match granularity {
        None => format_number(value, options),
        Some(granularity) if options.labels_utc => format_date_label(value, granularity, &Utc),
        Some(granularity) => format_date_label(value, granularity, &Local),
    }
}

/// Formats a number for an axis label.
///
/// Switches to exponential notation when the value overflows
/// `max_number_width` digits or underflows `digits_after_decimal`. With
/// `labels_kmb`/`labels_kmg2` large (and, for KMG2, small) magnitudes get a
/// unit suffix instead.
#[must_use]
pub fn format_number(x: f64, options: &AxisOptions) -> String {
    if let Some(sig_figs) = options.sig_figs {
        return float_format(x, sig_figs);
    }

    let digits = options.digits_after_decimal;
    let abs_x = x.abs();
    let label = if x != 0.0
        && (abs_x >= 10f64.powi(options.max_number_width) || abs_x < 10f64.powi(-(digits as i32)))
    {
        to_exponential(x, digits)
    } else {
        js_number(round_to(x, digits))
    };

    unit_suffix_label(x, options).unwrap_or(label)
}

/// `x` scaled by the largest unit it reaches, with that unit's suffix.
///
/// `None` when neither `labels_kmb` nor `labels_kmg2` is set, or when `x` is
/// below every unit. Numeric tick labels use this in place of whatever the
/// formatter produced.
#[must_use]
pub fn unit_suffix_label(x: f64, options: &AxisOptions) -> Option<String> {
    if !(options.labels_kmb || options.labels_kmg2) {
        return None;
    }

    let digits = options.digits_after_decimal;
    let abs_x = x.abs();
    let (k, big_labels): (f64, &[&str]) = if options.labels_kmg2 {
        (1024.0, &KMG2_BIG_LABELS)
    } else {
        (1000.0, &KMB_LABELS)
    };

    let mut label = None;
    let mut n = k.powi(big_labels.len() as i32);
    for suffix in big_labels.iter().rev() {
        if abs_x >= n {
            label = Some(format!("{}{suffix}", js_number(round_to(x / n, digits))));
            break;
        }
        n /= k;
    }

    if options.labels_kmg2 {
        if let Some((mantissa, exponent)) = negative_exponent_parts(x) {
            if (3..=24).contains(&exponent) {
                let mut small = if exponent % 3 > 0 {
                    js_number(round_to(mantissa / 10f64.powi(exponent % 3), digits))
                } else {
                    format!("{mantissa:.2}")
                };
                small.push_str(KMG2_SMALL_LABELS[(exponent / 3 - 1) as usize]);
                label = Some(small);
            }
        }
    }

    label
}

/// Formats `x` with `precision` significant figures, `%g` style.
///
/// Precision is clamped to `1..=21`. Magnitudes below `1e-3` always use
/// exponential notation.
#[must_use]
pub fn float_format(x: f64, precision: u32) -> String {
    let precision = precision.clamp(1, 21);
    if x != 0.0 && x.abs() < 1.0e-3 {
        to_exponential(x, precision - 1)
    } else {
        to_precision(x, precision)
    }
}

/// Rounds half up to `places` decimal places.
#[must_use]
pub fn round_to(num: f64, places: u32) -> f64 {
    let shift = 10f64.powi(places as i32);
    (num * shift + 0.5).floor() / shift
}

/// Label for a date tick at `granularity`, in the wall-clock time of `zone`.
#[must_use]
pub fn format_date_label<Z: UtcOffsetSource + ?Sized>(
    millis: f64,
    granularity: Granularity,
    zone: &Z,
) -> String {
    let Some(local) = to_local(zone, millis.round() as i64) else {
        return String::new();
    };

    let year = local.year();
    let month = SHORT_MONTH_NAMES[local.month0() as usize];
    if granularity >= Granularity::Decadal {
        return year.to_string();
    }
    if granularity >= Granularity::Monthly {
        return format!("{month}{NBSP}{year}");
    }

    let (hours, minutes, seconds) = (local.hour(), local.minute(), local.second());
    let millis_part = local.nanosecond() / 1_000_000;
    let midnight = hours == 0 && minutes == 0 && seconds == 0 && millis_part == 0;
    if midnight || granularity >= Granularity::Daily {
        format!("{:02}{NBSP}{month}", local.day())
    } else if granularity < Granularity::Secondly {
        format!("{seconds:02}.{millis_part:03}")
    } else if granularity > Granularity::Minutely {
        hms_string(hours, minutes, seconds, 0)
    } else {
        hms_string(hours, minutes, seconds, millis_part)
    }
}

fn hms_string(hours: u32, minutes: u32, seconds: u32, millis: u32) -> String {
    let mut out = format!("{hours:02}:{minutes:02}");
    if seconds != 0 {
        out.push_str(&format!(":{seconds:02}"));
        if millis != 0 {
            out.push_str(&format!(".{millis:03}"));
        }
    }
    out
}

/// Shortest decimal rendering, with negative zero shown as `0`.
fn js_number(x: f64) -> String {
    if x == 0.0 {
        return "0".to_owned();
    }
    if x.is_nan() {
        return "NaN".to_owned();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    format!("{x}")
}

/// Exponential notation with an explicitly signed exponent, e.g. `1.50e+7`.
fn to_exponential(x: f64, digits: u32) -> String {
    if !x.is_finite() {
        return js_number(x);
    }
    let raw = format!("{:.*e}", digits as usize, x);
    sign_exponent(&raw)
}

fn sign_exponent(raw: &str) -> String {
    match raw.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => format!("{mantissa}e{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}e+{exponent}"),
        None => raw.to_owned(),
    }
}

fn to_precision(x: f64, precision: u32) -> String {
    if !x.is_finite() {
        return js_number(x);
    }
    if x == 0.0 {
        return format!("{:.*}", precision as usize - 1, 0.0);
    }
    let rounded = format!("{:.*e}", precision as usize - 1, x);
    let exponent: i32 = rounded
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);
    if exponent < -6 || exponent >= precision as i32 {
        sign_exponent(&rounded)
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        format!("{x:.decimals$}")
    }
}

/// Mantissa and exponent of `x` when its shortest exponential form has a
/// negative exponent.
fn negative_exponent_parts(x: f64) -> Option<(f64, i32)> {
    if !x.is_finite() || x == 0.0 {
        return None;
    }
    let raw = format!("{x:e}");
    let (mantissa, exponent) = raw.split_once("e-")?;
    Some((mantissa.parse().ok()?, exponent.parse().ok()?))
}
