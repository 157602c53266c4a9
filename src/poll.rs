use crate::error::PollError;
use crate::time::{at_local_hour, compute_expiry, first_of_month, CANDIDATE_HOUR};
use chrono::{DateTime, Datelike, Month, NaiveDate, TimeZone, Weekday};
use log::{debug, trace, warn};
use std::collections::{BTreeSet, HashSet};

/// A poll never offers more than this many dates
pub const MAX_CANDIDATES: usize = 10;

/// Which days of a month are offered as poll options
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CandidateSpec {
    pub year: i32,
    pub month: Month,
    pub weekdays: HashSet<Weekday>,
    /// Days of the month offered regardless of their weekday
    pub include_days: BTreeSet<u32>,
    /// Days of the month never offered. Wins over `weekdays` and `include_days`.
    pub exclude_days: BTreeSet<u32>,
}

impl CandidateSpec {
    /// A spec for `month` that selects nothing yet
    pub fn new(year: i32, month: Month) -> CandidateSpec {
        CandidateSpec {
            year,
            month,
            weekdays: HashSet::new(),
            include_days: BTreeSet::new(),
            exclude_days: BTreeSet::new(),
        }
    }

    pub fn with_weekdays<I: IntoIterator<Item = Weekday>>(mut self, weekdays: I) -> Self {
        self.weekdays.extend(weekdays);
        self
    }

    pub fn with_include_days<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.include_days.extend(days);
        self
    }

    pub fn with_exclude_days<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.exclude_days.extend(days);
        self
    }

    fn accepts(&self, date: NaiveDate) -> bool {
        let day = date.day();

        if self.exclude_days.contains(&day) {
            trace!("{} is excluded", date);
            false
        } else {
            self.weekdays.contains(&date.weekday()) || self.include_days.contains(&day)
        }
    }

    /// The first [`MAX_CANDIDATES`] days of the month this spec accepts, in
    /// calendar order. Day numbers that do not exist in the month have no
    /// effect, and a year outside the calendar's range yields no days.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Month, NaiveDate, Weekday};
    /// use date_decider_libs::poll::CandidateSpec;
    ///
    /// let days = CandidateSpec::new(2026, Month::January)
    ///     .with_weekdays([Weekday::Sat])
    ///     .with_include_days([2, 40])
    ///     .with_exclude_days([17])
    ///     .candidate_days();
    ///
    /// let expected: Vec<NaiveDate> = [2, 3, 10, 24, 31]
    ///     .iter()
    ///     .map(|&d| NaiveDate::from_ymd_opt(2026, 1, d).unwrap())
    ///     .collect();
    ///
    /// assert_eq!(days, expected);
    /// ```
    pub fn candidate_days(&self) -> Vec<NaiveDate> {
        let first = match first_of_month(self.year, self.month) {
            Some(first) => first,
            None => return vec![],
        };

        let mut days = Vec::with_capacity(MAX_CANDIDATES);
        for date in first
            .iter_days()
            .take_while(|date| date.month() == first.month())
        {
            if !self.accepts(date) {
                continue;
            }

            if days.len() == MAX_CANDIDATES {
                debug!(
                    "Already have {} candidates, dropping {} and later",
                    MAX_CANDIDATES, date
                );
                break;
            }

            days.push(date);
        }

        days
    }
}

/// Candidate dates of `spec`, each at [`CANDIDATE_HOUR`] local time in `zone`.
///
/// A day that does not exist in `zone`, because a transition skips all of
/// it, is left out.
///
/// # Examples
/// ```
/// use chrono::{Month, TimeZone, Weekday};
/// use date_decider_libs::poll::{generate_candidates, CandidateSpec};
///
/// let spec = CandidateSpec::new(2025, Month::December)
///     .with_weekdays([Weekday::Fri, Weekday::Sat])
///     .with_include_days(26..=30)
///     .with_exclude_days([23, 24, 25, 31]);
///
/// let berlin = chrono_tz::Europe::Berlin;
/// let candidates = generate_candidates(&spec, &berlin);
///
/// assert_eq!(candidates.len(), 10);
/// assert_eq!(candidates[0], berlin.with_ymd_and_hms(2025, 12, 5, 20, 0, 0).unwrap());
/// assert_eq!(candidates[9], berlin.with_ymd_and_hms(2025, 12, 29, 20, 0, 0).unwrap());
/// ```
pub fn generate_candidates<Z: TimeZone>(spec: &CandidateSpec, zone: &Z) -> Vec<DateTime<Z>> {
    spec.candidate_days()
        .into_iter()
        .filter_map(|date| {
            let candidate = at_local_hour(date, CANDIDATE_HOUR, zone);
            if candidate.date_naive() == date {
                Some(candidate)
            } else {
                warn!(
                    "{} is skipped in the poll's time zone, leaving it out",
                    date
                );
                None
            }
        })
        .collect()
}

/// A date poll ready to be posted
#[derive(Clone, Debug)]
pub struct DatePoll<Z: TimeZone> {
    pub question: String,
    pub answers: Vec<DateTime<Z>>,
    pub expiry: DateTime<Z>,
}

impl<Z: TimeZone> DatePoll<Z> {
    /// Builds the poll for the month described by `spec`.
    ///
    /// # Errors
    /// `PollError::OutOfRange` if the month before `spec`'s month cannot be
    /// represented, since the expiry falls into it.
    pub fn new(question: &str, spec: &CandidateSpec, zone: &Z) -> Result<DatePoll<Z>, PollError> {
        let expiry = compute_expiry(spec.year, spec.month, zone).ok_or(PollError::OutOfRange {
            year: spec.year,
            month: spec.month.number_from_month(),
        })?;
        let answers = generate_candidates(spec, zone);

        debug!(
            "Built poll {:?} with {} answers for {}-{:02}",
            question,
            answers.len(),
            spec.year,
            spec.month.number_from_month()
        );

        Ok(DatePoll {
            question: question.to_string(),
            answers,
            expiry,
        })
    }
}
