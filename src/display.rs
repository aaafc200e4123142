//! Human-readable rendering of record timestamps.

use std::fmt;

use time::{Month, OffsetDateTime, UtcOffset, Weekday};

/// Civil time rendered in the classic 24-character form
/// `Www Mmm DD HH:MM:SS YYYY`, e.g. `Thu Aug  7 14:03:05 2026`.
pub struct Asctime {
    pub inner: OffsetDateTime,
}

impl Asctime {
    /// Current wall-clock time, shifted to the offset the logger resolved at
    /// initialization.
    pub fn now(offset: UtcOffset) -> Asctime {
        Asctime {
            inner: OffsetDateTime::now_utc().to_offset(offset),
        }
    }
}

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

const fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

impl fmt::Display for Asctime {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let t = self.inner;
        write!(
            f,
            "{} {} {:>2} {:02}:{:02}:{:02} {}",
            weekday_name(t.weekday()),
            month_name(t.month()),
            t.day(),
            t.hour(),
            t.minute(),
            t.second(),
            t.year()
        )
    }
}
