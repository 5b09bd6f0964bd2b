use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike, Utc};
use tracing::{debug, trace};

use crate::core::granularity::{
    DST_CORRECTION_MIN_SPACING_MS, DateField, FixedSpacing, Granularity, MILLIS_PER_YEAR,
};
use crate::core::label_format::format_date_label;
use crate::core::options::AxisOptions;
use crate::core::timezone::{MILLIS_PER_MINUTE, UtcOffsetSource, from_local, to_local};
use crate::core::types::Tick;

/// Finest granularity whose estimated tick count leaves at least
/// `pixels_per_label` pixels per tick, or `None` when none fits.
#[must_use]
pub fn pick_granularity(low: f64, high: f64, pixels: f64, pixels_per_label: f64) -> Option<Granularity> {
    Granularity::ALL
        .into_iter()
        .find(|granularity| pixels / estimated_tick_count(low, high, *granularity) >= pixels_per_label)
}

/// Approximate number of ticks `granularity` places between `low` and `high`.
#[must_use]
pub fn estimated_tick_count(low: f64, high: f64, granularity: Granularity) -> f64 {
    let span = high - low;
    if let Some(spacing) = granularity.fixed_spacing() {
        return (0.5 + span / spacing.millis as f64).floor();
    }
    match granularity.calendar_placement() {
        Some(placement) => {
            let years = span / MILLIS_PER_YEAR;
            (0.5 + years * placement.months.len() as f64 / f64::from(placement.year_mod)).floor()
        }
        None => 0.0,
    }
}

/// Date ticks for `low..=high` epoch milliseconds, placed and labeled in UTC
/// or the host's local zone depending on `labels_utc`.
#[must_use]
pub fn date_ticks(low: f64, high: f64, pixels: f64, options: &AxisOptions) -> Vec<Tick> {
    if options.labels_utc {
        date_ticks_in_zone(low, high, pixels, options, &Utc)
    } else {
        date_ticks_in_zone(low, high, pixels, options, &Local)
    }
}

/// Date ticks placed on wall-clock boundaries of `zone`.
///
/// Returns an empty list when no granularity fits the pixel budget.
#[must_use]
pub fn date_ticks_in_zone<Z: UtcOffsetSource + ?Sized>(
    low: f64,
    high: f64,
    pixels: f64,
    options: &AxisOptions,
    zone: &Z,
) -> Vec<Tick> {
    match pick_granularity(low, high, pixels, options.pixels_per_label) {
        Some(granularity) => date_axis_ticks(low, high, granularity, options, zone),
        None => {
            debug!(low, high, pixels, "no date granularity fits");
            Vec::new()
        }
    }
}

/// Ticks at `granularity` between `low` and `high`, ascending.
#[must_use]
pub fn date_axis_ticks<Z: UtcOffsetSource + ?Sized>(
    low: f64,
    high: f64,
    granularity: Granularity,
    options: &AxisOptions,
    zone: &Z,
) -> Vec<Tick> {
    if !low.is_finite() || !high.is_finite() || low > high {
        return Vec::new();
    }

    let times = match granularity.fixed_spacing() {
        Some(spacing) => fixed_tick_times(low, high, spacing, options.week_start, zone),
        None => calendar_tick_times(low, high, granularity, zone),
    };

    let ticks: Vec<Tick> = times
        .into_iter()
        .map(|millis| {
            let value = millis as f64;
            let label = match &options.axis_label_formatter {
                Some(formatter) => formatter.format(value, Some(granularity), options),
                None => format_date_label(value, granularity, zone),
            };
            Tick::labeled(value, label)
        })
        .collect();

    trace!(low, high, ?granularity, count = ticks.len(), "date ticks");
    ticks
}

fn fixed_tick_times<Z: UtcOffsetSource + ?Sized>(
    low: f64,
    high: f64,
    spacing: FixedSpacing,
    week_start: u32,
    zone: &Z,
) -> Vec<i64> {
    let low_ms = low.ceil() as i64;
    let high_ms = high.floor() as i64;
    let Some(local_start) = to_local(zone, low.floor() as i64) else {
        return Vec::new();
    };
    let snapped = snap_down(local_start, spacing, week_start);
    let start = from_local(zone, snapped);

    let step = spacing.millis;
    let check_dst = step >= DST_CORRECTION_MIN_SPACING_MS;
    let offset_at = |t: i64| i64::from(zone.utc_offset_minutes(t));

    let mut times = Vec::new();
    let mut start_offset = offset_at(start);
    let mut last: Option<i64> = None;
    let mut t = start;
    while t <= high_ms {
        if check_dst && offset_at(t) != start_offset {
            // Keep the wall-clock rhythm: shift by the offset change.
            t += (start_offset - offset_at(t)) * MILLIS_PER_MINUTE;
            start_offset = offset_at(t);

            // Shifted back into the old offset: the target wall-clock time
            // does not exist, move on to the next slot.
            if offset_at(t + step) != start_offset {
                t += step;
                start_offset = offset_at(t);
            }
        }
        if let Some(previous) = last {
            if t <= previous {
                t = previous + step;
            }
        }
        if t > high_ms {
            break;
        }
        if t >= low_ms {
            times.push(t);
        }
        last = Some(t);
        t += step;
    }
    times
}

/// Truncates `local` down to the boundary of `spacing`'s unit and step.
fn snap_down(local: NaiveDateTime, spacing: FixedSpacing, week_start: u32) -> NaiveDateTime {
    let date = local.date();
    let millis = local.nanosecond() / 1_000_000;
    let (hour, minute, second) = (local.hour(), local.minute(), local.second());
    let step = spacing.step;

    let (date, hour, minute, second, millis) = match spacing.field {
        DateField::Millisecond => (date, hour, minute, second, millis - millis % step),
        DateField::Second => (date, hour, minute, second - second % step, 0),
        DateField::Minute => (date, hour, minute - minute % step, 0, 0),
        DateField::Hour => (date, hour - hour % step, 0, 0, 0),
        DateField::Day => {
            let back = if step == 7 {
                let weekday = date.weekday().num_days_from_sunday();
                (weekday + 7 - week_start % 7) % 7
            } else {
                // Multi-day steps land on days 1, 1 + step, ... of the month.
                (date.day() - 1) % step
            };
            let date = date - Duration::days(i64::from(back));
            (date, 0, 0, 0, 0)
        }
    };

    date.and_hms_milli_opt(hour, minute, second, millis)
        .unwrap_or(local)
}

fn calendar_tick_times<Z: UtcOffsetSource + ?Sized>(
    low: f64,
    high: f64,
    granularity: Granularity,
    zone: &Z,
) -> Vec<i64> {
    let Some(placement) = granularity.calendar_placement() else {
        return Vec::new();
    };
    let (Some(start), Some(end)) = (
        to_local(zone, low.floor() as i64),
        to_local(zone, high.ceil() as i64),
    ) else {
        return Vec::new();
    };

    let mut times = Vec::new();
    for year in start.year()..=end.year() {
        if year.rem_euclid(placement.year_mod) != 0 {
            continue;
        }
        for month in placement.months {
            let Some(first_of_month) = NaiveDate::from_ymd_opt(year, month + 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
            else {
                continue;
            };
            let millis = from_local(zone, first_of_month);
            let value = millis as f64;
            if value < low || value > high {
                continue;
            }
            times.push(millis);
        }
    }
    times
}

#[cfg(test)]
mod tests {
    use super::{estimated_tick_count, pick_granularity, snap_down};
    use crate::core::granularity::Granularity;
    use chrono::NaiveDate;

    const DAY: f64 = 86_400_000.0;

    #[test]
    fn estimated_counts() {
        assert_eq!(estimated_tick_count(0.0, 10.0 * DAY, Granularity::Daily), 10.0);
        assert_eq!(
            estimated_tick_count(0.0, 365.2524 * DAY, Granularity::Quarterly),
            4.0
        );
        assert_eq!(
            estimated_tick_count(0.0, 365.2524 * DAY * 100.0, Granularity::Decadal),
            10.0
        );
    }

    #[test]
    fn picks_first_granularity_that_fits() {
        // Ten days over 700px at 70px per label: one tick per day.
        assert_eq!(
            pick_granularity(0.0, 10.0 * DAY, 700.0, 70.0),
            Some(Granularity::Daily)
        );
        assert_eq!(pick_granularity(0.0, 10.0 * DAY, 0.0, 70.0), None);
    }

    #[test]
    fn weekly_snap_honors_week_start() {
        // 2024-05-15 is a Wednesday.
        let local = NaiveDate::from_ymd_opt(2024, 5, 15)
            .and_then(|d| d.and_hms_opt(13, 20, 0))
            .expect("valid date");
        let weekly = Granularity::Weekly.fixed_spacing().expect("fixed");
        let sunday = snap_down(local, weekly, 0);
        let monday = snap_down(local, weekly, 1);
        assert_eq!(sunday.date(), NaiveDate::from_ymd_opt(2024, 5, 12).expect("date"));
        assert_eq!(monday.date(), NaiveDate::from_ymd_opt(2024, 5, 13).expect("date"));

        let six_hourly = Granularity::SixHourly.fixed_spacing().expect("fixed");
        assert_eq!(
            snap_down(local, six_hourly, 0),
            NaiveDate::from_ymd_opt(2024, 5, 15)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .expect("valid date")
        );
    }
}
