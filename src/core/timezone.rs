use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

/// Source of the local UTC offset used to place and label date ticks.
///
/// Offsets are `local - utc` in minutes, so zones east of Greenwich are
/// positive.
pub trait UtcOffsetSource {
    fn utc_offset_minutes(&self, utc_millis: i64) -> i32;
}

impl UtcOffsetSource for Utc {
    fn utc_offset_minutes(&self, _utc_millis: i64) -> i32 {
        0
    }
}

impl UtcOffsetSource for FixedOffset {
    fn utc_offset_minutes(&self, _utc_millis: i64) -> i32 {
        self.local_minus_utc() / 60
    }
}

impl UtcOffsetSource for Local {
    fn utc_offset_minutes(&self, utc_millis: i64) -> i32 {
        DateTime::from_timestamp_millis(utc_millis).map_or(0, |utc| {
            self.offset_from_utc_datetime(&utc.naive_utc())
                .fix()
                .local_minus_utc()
                / 60
        })
    }
}

/// Adapts a plain function into an offset source, for zones described by
/// rules rather than a tz database.
#[derive(Debug, Clone, Copy)]
pub struct OffsetFn<F>(pub F);

impl<F> UtcOffsetSource for OffsetFn<F>
where
    F: Fn(i64) -> i32,
{
    fn utc_offset_minutes(&self, utc_millis: i64) -> i32 {
        (self.0)(utc_millis)
    }
}

impl<Z: UtcOffsetSource + ?Sized> UtcOffsetSource for &Z {
    fn utc_offset_minutes(&self, utc_millis: i64) -> i32 {
        (**self).utc_offset_minutes(utc_millis)
    }
}

pub(crate) const MILLIS_PER_MINUTE: i64 = 60_000;

/// Wall-clock time in `zone` at `utc_millis`.
pub(crate) fn to_local<Z: UtcOffsetSource + ?Sized>(
    zone: &Z,
    utc_millis: i64,
) -> Option<NaiveDateTime> {
    let offset = i64::from(zone.utc_offset_minutes(utc_millis));
    let local_millis = utc_millis.checked_add(offset * MILLIS_PER_MINUTE)?;
    DateTime::from_timestamp_millis(local_millis).map(|dt| dt.naive_utc())
}

/// Instant at which `zone` shows the wall-clock time `local`.
///
/// The offset is resolved in two passes so the result uses the offset in
/// effect at the returned instant. Wall-clock times skipped by a
/// transition resolve to a nearby instant.
pub(crate) fn from_local<Z: UtcOffsetSource + ?Sized>(zone: &Z, local: NaiveDateTime) -> i64 {
    let local_millis = local.and_utc().timestamp_millis();
    let guess = local_millis - i64::from(zone.utc_offset_minutes(local_millis)) * MILLIS_PER_MINUTE;
    local_millis - i64::from(zone.utc_offset_minutes(guess)) * MILLIS_PER_MINUTE
}
