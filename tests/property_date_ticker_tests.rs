use chart_core::core::date_ticker::date_axis_ticks;
use chart_core::core::{AxisOptions, Granularity, OffsetFn};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;

const HOUR_MS: f64 = 3_600_000.0;

fn utc_millis(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid utc time")
        .timestamp_millis()
}

/// US Eastern time for 2024.
fn eastern_2024(utc: i64) -> i32 {
    let spring = utc_millis(2024, 3, 10, 7);
    let fall = utc_millis(2024, 11, 3, 6);
    if (spring..fall).contains(&utc) { -240 } else { -300 }
}

fn wall_clock(utc: f64) -> NaiveDateTime {
    let utc = utc as i64;
    let local = utc + i64::from(eastern_2024(utc)) * 60_000;
    DateTime::from_timestamp_millis(local)
        .expect("in range")
        .naive_utc()
}

fn granularity_strategy() -> impl Strategy<Value = Granularity> {
    prop_oneof![
        Just(Granularity::TwoHourly),
        Just(Granularity::SixHourly),
        Just(Granularity::Daily),
        Just(Granularity::TwoDaily),
        Just(Granularity::Weekly),
    ]
}

proptest! {
    #[test]
    fn ticks_across_dst_are_ordered_and_distinct(
        granularity in granularity_strategy(),
        // Start anywhere within a week of either 2024 transition.
        near_fall in any::<bool>(),
        start_offset_hours in -84.0f64..84.0,
        span_hours in 1.0f64..240.0
    ) {
        let transition = if near_fall {
            utc_millis(2024, 11, 3, 6)
        } else {
            utc_millis(2024, 3, 10, 7)
        } as f64;
        let low = transition + start_offset_hours * HOUR_MS;
        let high = low + span_hours * HOUR_MS;

        let zone = OffsetFn(eastern_2024);
        let ticks = date_axis_ticks(low, high, granularity, &AxisOptions::x_axis(), &zone);

        prop_assert!(ticks.windows(2).all(|pair| pair[0].value < pair[1].value));
        prop_assert!(ticks.iter().all(|tick| tick.value >= low.ceil() && tick.value <= high.floor()));

        let walls: HashSet<NaiveDateTime> = ticks.iter().map(|tick| wall_clock(tick.value)).collect();
        prop_assert_eq!(walls.len(), ticks.len());
        prop_assert!(ticks.iter().all(|tick| tick.label.is_some()));
    }
}
