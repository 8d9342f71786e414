use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};

/// Weekday as the internal integer index: 0 = Monday .. 6 = Sunday.
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

pub fn minutes_from_midnight(time: NaiveTime) -> i64 {
    (time.hour() as i64) * 60 + (time.minute() as i64)
}

/// Parse a local "HH:MM" wall-clock time into minutes since midnight.
pub fn parse_hhmm(value: &str) -> Option<i64> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()?;
    Some(minutes_from_midnight(time))
}

pub fn local_datetime_of_ms(timestamp_ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(timestamp_ms).single()
}

/// Local calendar date carrying the given epoch-millisecond instant.
pub fn local_date_of_ms(timestamp_ms: i64) -> Option<NaiveDate> {
    local_datetime_of_ms(timestamp_ms).map(|dt| dt.date_naive())
}

pub fn local_minutes_of_ms(timestamp_ms: i64) -> Option<i64> {
    local_datetime_of_ms(timestamp_ms).map(|dt| minutes_from_midnight(dt.time()))
}

/// Epoch milliseconds of local midnight starting the given date. On a DST
/// gap the earlier mapping is used.
pub fn local_day_start_ms(date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Some(dt.timestamp_millis()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp_millis()),
        LocalResult::None => None,
    }
}

/// Half-open millisecond bounds [start of `start`, start of the day after
/// `end`) covering the inclusive local date range.
pub fn local_day_bounds_ms(start: NaiveDate, end: NaiveDate) -> Option<(i64, i64)> {
    let lower = local_day_start_ms(start)?;
    let upper = local_day_start_ms(end.succ_opt()?)?;
    Some((lower, upper))
}
