use crate::model::{parse_timestamp, RelativeAge};
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use std::fmt;

const MINUTES_PER_DAY: i64 = 1440;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Glanceable "how long ago" label for a backend age snapshot.
///
/// The age encodes the event's day-of-month, hour and minute, so elapsed
/// time is `now`'s day-of-month clock minus that encoding. An age whose day
/// is later than today's belongs to the previous calendar month. Returns an
/// empty string when no age is available or its encoding overflows.
pub fn relative_age<Tz: TimeZone>(age: Option<&RelativeAge>, now: &DateTime<Tz>) -> String {
    let Some(age) = age else {
        return String::new();
    };

    let mut now_minutes = i64::from(now.day()) * MINUTES_PER_DAY
        + i64::from(now.hour()) * 60
        + i64::from(now.minute());
    if age.days.unwrap_or(0) > i64::from(now.day()) {
        now_minutes += i64::from(previous_month_len(now)) * MINUTES_PER_DAY;
    }

    let Some(elapsed) = age
        .encoded_minutes()
        .and_then(|encoded| now_minutes.checked_sub(encoded))
    else {
        return String::new();
    };
    if elapsed <= 0 {
        return "just now".to_string();
    }

    let days = elapsed / MINUTES_PER_DAY;
    let hours = (elapsed % MINUTES_PER_DAY) / 60;
    let minutes = elapsed % 60;
    if days > 0 {
        format!("{days}d {hours}h ago")
    } else if hours > 0 {
        format!("{hours}h {minutes}m ago")
    } else {
        format!("{minutes}m ago")
    }
}

/// Exact timestamp suffix in the observer's local time zone, e.g.
/// `" on 5 Mar 2024 - 2:30:00 PM"`.
pub fn absolute_time(timestamp: &str) -> String {
    absolute_time_in(timestamp, &Local)
}

/// Same as [`absolute_time`] with an explicit time zone. Unparseable
/// timestamps render as an empty string.
pub fn absolute_time_in<Tz>(timestamp: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let Some(instant) = parse_timestamp(timestamp) else {
        return String::new();
    };
    let local = instant.with_timezone(tz);
    format!(
        " on {} {} {:04} - {}",
        local.day(),
        MONTHS[local.month0() as usize],
        local.year(),
        local.format("%-I:%M:%S %p")
    )
}

fn previous_month_len<Tz: TimeZone>(now: &DateTime<Tz>) -> u32 {
    now.date_naive()
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}
