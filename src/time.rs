use crate::error::PollError;
use chrono::{DateTime, Datelike, Duration, Month, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use log::{debug, warn};

/// Hour of day (local to the poll's zone) every date option is offered at
pub const CANDIDATE_HOUR: u32 = 20;

/// Hour of day (local to the poll's zone) the poll stops accepting votes
pub const EXPIRY_HOUR: u32 = 12;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Resolves an IANA zone name such as `Europe/Berlin`
///
/// # Examples
/// ```
/// use date_decider_libs::{error::PollError, time::resolve_zone};
///
/// assert_eq!(resolve_zone("Europe/Berlin"), Ok(chrono_tz::Europe::Berlin));
/// assert_eq!(
///     resolve_zone("Mars/Olympus_Mons"),
///     Err(PollError::InvalidZone { zone: "Mars/Olympus_Mons".to_string() })
/// );
/// ```
pub fn resolve_zone(name: &str) -> Result<Tz, PollError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| PollError::InvalidZone {
            zone: name.to_string(),
        })
}

/// The calendar month `date` falls into
pub fn month_of(date: NaiveDate) -> Month {
    MONTHS[date.month0() as usize]
}

/// The month after `month`, rolling December over into the next year
pub fn following_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::December => (year.saturating_add(1), Month::January),
        _ => (year, month.succ()),
    }
}

/// The month a poll opened on `today` asks about
///
/// # Examples
/// ```
/// use chrono::{Month, NaiveDate};
/// use date_decider_libs::time::target_month;
///
/// let today = NaiveDate::from_ymd_opt(2025, 12, 14).unwrap();
/// assert_eq!(target_month(today), (2026, Month::January));
/// ```
pub fn target_month(today: NaiveDate) -> (i32, Month) {
    following_month(today.year(), month_of(today))
}

pub fn first_of_month(year: i32, month: Month) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
}

/// "Day 0" of a month, which is the last day of the month before it
pub fn day_zero(year: i32, month: Month) -> Option<NaiveDate> {
    first_of_month(year, month)?.pred_opt()
}

/// Last day of `month`, found as day 0 of the following month
///
/// # Examples
/// ```
/// use chrono::{Month, NaiveDate};
/// use date_decider_libs::time::last_day_of_month;
///
/// assert_eq!(
///     last_day_of_month(2028, Month::February),
///     NaiveDate::from_ymd_opt(2028, 2, 29)
/// );
/// assert_eq!(
///     last_day_of_month(2025, Month::December),
///     NaiveDate::from_ymd_opt(2025, 12, 31)
/// );
/// ```
pub fn last_day_of_month(year: i32, month: Month) -> Option<NaiveDate> {
    let (next_year, next_month) = following_month(year, month);
    day_zero(next_year, next_month)
}

/// Places `date` at a whole `hour` of local time in `zone`.
///
/// An ambiguous local time resolves to the earlier instant. A local time
/// skipped by a transition keeps the offset in effect before the transition,
/// which moves it forward by the length of the gap. If a whole day is
/// skipped the result falls on a later local date.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, TimeZone};
/// use date_decider_libs::time::at_local_hour;
///
/// let berlin = chrono_tz::Europe::Berlin;
/// let date = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
///
/// // 02:00 does not exist on the morning clocks go forward
/// assert_eq!(
///     at_local_hour(date, 2, &berlin),
///     berlin.with_ymd_and_hms(2025, 3, 30, 3, 0, 0).unwrap()
/// );
/// ```
pub fn at_local_hour<Z: TimeZone>(date: NaiveDate, hour: u32, zone: &Z) -> DateTime<Z> {
    let local = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default());

    if let Some(resolved) = zone.from_local_datetime(&local).earliest() {
        return resolved;
    }

    let day = Duration::days(1);
    local
        .checked_sub_signed(day)
        .and_then(|before| zone.from_local_datetime(&before).earliest())
        .and_then(|before| before.checked_add_signed(day))
        .map(|shifted| {
            debug!(
                "{} does not exist in the poll's time zone, using {:?}",
                local, shifted
            );
            shifted
        })
        .unwrap_or_else(|| {
            warn!(
                "{} does not exist in the poll's time zone, reading it as UTC",
                local
            );
            zone.from_utc_datetime(&local)
        })
}

/// When a poll for `month` stops accepting votes: noon on day 0 of `month`.
///
/// Polls are posted one month ahead, so this lands on the last day of the
/// month the poll is posted in, right before the month being voted on begins.
/// Returns `None` if the year cannot be represented.
///
/// # Examples
/// ```
/// use chrono::{Month, TimeZone, Utc};
/// use date_decider_libs::time::compute_expiry;
///
/// assert_eq!(
///     compute_expiry(2025, Month::May, &Utc),
///     Some(Utc.with_ymd_and_hms(2025, 4, 30, 12, 0, 0).unwrap())
/// );
/// assert_eq!(
///     compute_expiry(2026, Month::January, &Utc),
///     Some(Utc.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap())
/// );
/// ```
pub fn compute_expiry<Z: TimeZone>(year: i32, month: Month, zone: &Z) -> Option<DateTime<Z>> {
    day_zero(year, month)
        .map(|date| at_local_hour(date, EXPIRY_HOUR, zone))
}
