//! The date label shown to voters, and the only place that reads it back.
//!
//! Poll options on the messaging side are plain text, so a candidate date
//! travels as `"<Weekday>, <DD>.<MM>.<YYYY>"`, e.g. `"Friday, 05.12.2025"`.
//! [`encode`] and [`decode`] must change together; bump [`LABEL_VERSION`]
//! whenever they do.

use crate::error::LabelError;
use chrono::{Datelike, NaiveDate, Weekday};

/// Version of the label grammar produced by [`encode`] and read by [`decode`]
pub const LABEL_VERSION: u32 = 1;

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("Monday", Weekday::Mon),
    ("Tuesday", Weekday::Tue),
    ("Wednesday", Weekday::Wed),
    ("Thursday", Weekday::Thu),
    ("Friday", Weekday::Fri),
    ("Saturday", Weekday::Sat),
    ("Sunday", Weekday::Sun),
];

/// English weekday name as it appears in a label
pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize].0
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, weekday)| weekday)
}

/// Renders a date as a label
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use date_decider_libs::label::encode;
///
/// let date = NaiveDate::from_ymd_opt(2025, 12, 5).unwrap();
/// assert_eq!(encode(&date), "Friday, 05.12.2025");
/// ```
pub fn encode<D: Datelike>(date: &D) -> String {
    format!(
        "{}, {:02}.{:02}.{:04}",
        weekday_name(date.weekday()),
        date.day(),
        date.month(),
        date.year()
    )
}

/// Reads a label back into a date.
///
/// The weekday has to be one of the seven English names, but it is not
/// checked against the date; only the numeric fields decide the result.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use date_decider_libs::{error::LabelError, label::decode};
///
/// let date = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
/// assert_eq!(decode("Friday, 15.08.2025"), Ok(date));
///
/// // The 15th is a Friday, but the label is accepted regardless
/// assert_eq!(decode("Monday, 15.08.2025"), Ok(date));
///
/// assert_eq!(
///     decode("Friday, 15.8.2025"),
///     Err(LabelError::Grammar { text: "Friday, 15.8.2025".to_string() })
/// );
/// assert_eq!(
///     decode("Friday, 31.02.2025"),
///     Err(LabelError::InvalidDate { year: 2025, month: 2, day: 31 })
/// );
/// ```
pub fn decode(text: &str) -> Result<NaiveDate, LabelError> {
    let grammar = || LabelError::Grammar {
        text: text.to_string(),
    };

    let (name, numeric) = text.split_once(", ").ok_or_else(grammar)?;
    weekday_from_name(name).ok_or_else(|| LabelError::UnknownWeekday {
        name: name.to_string(),
    })?;

    let mut fields = numeric.split('.');
    let (day, month, year) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(day), Some(month), Some(year), None) => (
            fixed_width(day, 2).ok_or_else(grammar)?,
            fixed_width(month, 2).ok_or_else(grammar)?,
            fixed_width(year, 4).ok_or_else(grammar)?,
        ),
        _ => return Err(grammar()),
    };

    // four ascii digits always fit
    let year = year as i32;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(LabelError::InvalidDate { year, month, day })
}

fn fixed_width(field: &str, width: usize) -> Option<u32> {
    if field.len() == width && field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().ok()
    } else {
        None
    }
}
