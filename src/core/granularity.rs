use serde::{Deserialize, Serialize};

/// Calendar or clock unit a fixed-interval granularity snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
}

/// Spacing of a granularity finer than [`Granularity::Monthly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSpacing {
    pub millis: i64,
    pub field: DateField,
    pub step: u32,
}

/// Month layout of a granularity at or above [`Granularity::Monthly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarPlacement {
    /// Zero-based months of a year that receive a tick.
    pub months: &'static [u32],
    /// Only years divisible by this receive ticks.
    pub year_mod: i32,
}

/// Tick spacing for date axes, ordered from finest to coarsest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Millisecondly,
    TwoMillisecondly,
    FiveMillisecondly,
    TenMillisecondly,
    FiftyMillisecondly,
    HundredMillisecondly,
    FiveHundredMillisecondly,
    Secondly,
    TwoSecondly,
    FiveSecondly,
    TenSecondly,
    ThirtySecondly,
    Minutely,
    TwoMinutely,
    FiveMinutely,
    TenMinutely,
    ThirtyMinutely,
    Hourly,
    TwoHourly,
    SixHourly,
    Daily,
    TwoDaily,
    Weekly,
    Monthly,
    Quarterly,
    Biannual,
    Annual,
    Decadal,
    Centennial,
}

const MS_SECOND: i64 = 1_000;
const MS_MINUTE: i64 = 60 * MS_SECOND;
const MS_HOUR: i64 = 60 * MS_MINUTE;
const MS_DAY: i64 = 24 * MS_HOUR;

/// Average Gregorian year used to estimate calendar tick counts.
pub const MILLIS_PER_YEAR: f64 = 365.2524 * 24.0 * 3600.0 * 1000.0;

const ALL_MONTHS: [u32; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

impl Granularity {
    pub const ALL: [Granularity; 29] = [
        Self::Millisecondly,
        Self::TwoMillisecondly,
        Self::FiveMillisecondly,
        Self::TenMillisecondly,
        Self::FiftyMillisecondly,
        Self::HundredMillisecondly,
        Self::FiveHundredMillisecondly,
        Self::Secondly,
        Self::TwoSecondly,
        Self::FiveSecondly,
        Self::TenSecondly,
        Self::ThirtySecondly,
        Self::Minutely,
        Self::TwoMinutely,
        Self::FiveMinutely,
        Self::TenMinutely,
        Self::ThirtyMinutely,
        Self::Hourly,
        Self::TwoHourly,
        Self::SixHourly,
        Self::Daily,
        Self::TwoDaily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Biannual,
        Self::Annual,
        Self::Decadal,
        Self::Centennial,
    ];

    /// Fixed spacing, or `None` for calendar granularities.
    #[must_use]
    pub fn fixed_spacing(self) -> Option<FixedSpacing> {
        let (millis, field, step) = match self {
            Self::Millisecondly => (1, DateField::Millisecond, 1),
            Self::TwoMillisecondly => (2, DateField::Millisecond, 2),
            Self::FiveMillisecondly => (5, DateField::Millisecond, 5),
            Self::TenMillisecondly => (10, DateField::Millisecond, 10),
            Self::FiftyMillisecondly => (50, DateField::Millisecond, 50),
            Self::HundredMillisecondly => (100, DateField::Millisecond, 100),
            Self::FiveHundredMillisecondly => (500, DateField::Millisecond, 500),
            Self::Secondly => (MS_SECOND, DateField::Second, 1),
            Self::TwoSecondly => (2 * MS_SECOND, DateField::Second, 2),
            Self::FiveSecondly => (5 * MS_SECOND, DateField::Second, 5),
            Self::TenSecondly => (10 * MS_SECOND, DateField::Second, 10),
            Self::ThirtySecondly => (30 * MS_SECOND, DateField::Second, 30),
            Self::Minutely => (MS_MINUTE, DateField::Minute, 1),
            Self::TwoMinutely => (2 * MS_MINUTE, DateField::Minute, 2),
            Self::FiveMinutely => (5 * MS_MINUTE, DateField::Minute, 5),
            Self::TenMinutely => (10 * MS_MINUTE, DateField::Minute, 10),
            Self::ThirtyMinutely => (30 * MS_MINUTE, DateField::Minute, 30),
            Self::Hourly => (MS_HOUR, DateField::Hour, 1),
            Self::TwoHourly => (2 * MS_HOUR, DateField::Hour, 2),
            Self::SixHourly => (6 * MS_HOUR, DateField::Hour, 6),
            Self::Daily => (MS_DAY, DateField::Day, 1),
            Self::TwoDaily => (2 * MS_DAY, DateField::Day, 2),
            Self::Weekly => (7 * MS_DAY, DateField::Day, 7),
            _ => return None,
        };
        Some(FixedSpacing {
            millis,
            field,
            step,
        })
    }

    /// Calendar placement, or `None` for fixed-interval granularities.
    #[must_use]
    pub fn calendar_placement(self) -> Option<CalendarPlacement> {
        let (months, year_mod): (&'static [u32], i32) = match self {
            Self::Monthly => (&ALL_MONTHS, 1),
            Self::Quarterly => (&[0, 3, 6, 9], 1),
            Self::Biannual => (&[0, 6], 1),
            Self::Annual => (&[0], 1),
            Self::Decadal => (&[0], 10),
            Self::Centennial => (&[0], 100),
            _ => return None,
        };
        Some(CalendarPlacement { months, year_mod })
    }

    #[must_use]
    pub fn is_calendar(self) -> bool {
        self >= Self::Monthly
    }

    /// Position in the finest-to-coarsest ordering.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Spacing at and above which date ticks keep their wall-clock rhythm
/// across daylight-saving transitions.
pub const DST_CORRECTION_MIN_SPACING_MS: i64 = 2 * MS_HOUR;
