use crate::error::{LabelError, PollError};
use crate::label;
use crate::time::{at_local_hour, CANDIDATE_HOUR};
use chrono::{DateTime, TimeZone};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

/// Identifies an option within a single poll
pub type OptionId = u32;

/// Label text of each option, keyed by option id
pub type OptionText = HashMap<OptionId, String>;

/// Vote count per option, kept in the order the poll lists its options.
/// Recording an option twice replaces its count.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VoteTally {
    counts: Vec<(OptionId, u32)>,
}

impl VoteTally {
    pub fn new() -> VoteTally {
        VoteTally { counts: vec![] }
    }

    pub fn record(&mut self, option: OptionId, votes: u32) {
        match self.counts.iter_mut().find(|(id, _)| *id == option) {
            Some(entry) => entry.1 = votes,
            None => self.counts.push((option, votes)),
        }
    }

    pub fn votes(&self, option: OptionId) -> Option<u32> {
        self.counts
            .iter()
            .find(|(id, _)| *id == option)
            .map(|&(_, votes)| votes)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionId, u32)> + '_ {
        self.counts.iter().copied()
    }

    /// Options sharing the highest count, in tally order.
    /// Empty when nobody voted at all.
    pub fn leaders(&self) -> Vec<OptionId> {
        match self.iter().map(|(_, votes)| votes).max() {
            Some(most) if most > 0 => self
                .iter()
                .filter(|&(_, votes)| votes == most)
                .map(|(id, _)| id)
                .collect_vec(),
            _ => vec![],
        }
    }
}

impl FromIterator<(OptionId, u32)> for VoteTally {
    fn from_iter<I: IntoIterator<Item = (OptionId, u32)>>(iter: I) -> Self {
        let mut tally = VoteTally::new();
        for (option, votes) in iter {
            tally.record(option, votes);
        }
        tally
    }
}

/// The decided dates of a poll
#[derive(Clone, Debug)]
pub struct PollOutcome<Z: TimeZone> {
    pub poll_id: String,
    /// Every date tied for the most votes, in the order the poll lists them
    pub winning_dates: Vec<DateTime<Z>>,
    /// Relayed from the messaging side, never computed here
    pub finalized: bool,
}

/// Reduces a poll's tally to its winning dates.
///
/// Every option tied for the highest count wins. Winning dates keep the order
/// of the tally and are placed at [`CANDIDATE_HOUR`] local time in `zone`.
///
/// # Errors
/// * `PollError::NoWinner` if the tally is empty or no option got a vote.
/// * `PollError::MalformedOption` if a winning option has no text or its text
///   is not a date label. Losing options are never parsed.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use date_decider_libs::result::{aggregate_result, OptionText, VoteTally};
///
/// let tally: VoteTally = vec![(0, 5), (1, 3)].into_iter().collect();
/// let options: OptionText = vec![
///     (0, "Friday, 15.08.2025".to_string()),
///     (1, "Saturday, 16.08.2025".to_string()),
/// ]
/// .into_iter()
/// .collect();
///
/// let outcome = aggregate_result("poll", &tally, &options, true, &Utc).unwrap();
///
/// assert_eq!(
///     outcome.winning_dates,
///     vec![Utc.with_ymd_and_hms(2025, 8, 15, 20, 0, 0).unwrap()]
/// );
/// assert!(outcome.finalized);
/// ```
pub fn aggregate_result<Z: TimeZone>(
    poll_id: &str,
    tally: &VoteTally,
    option_text: &OptionText,
    finalized: bool,
    zone: &Z,
) -> Result<PollOutcome<Z>, PollError> {
    let leaders = tally.leaders();
    if leaders.is_empty() {
        return Err(PollError::NoWinner {
            poll_id: poll_id.to_string(),
        });
    }

    debug!(
        "Poll {} has {} leading option(s) out of {}",
        poll_id,
        leaders.len(),
        tally.len()
    );

    let winning_dates = leaders
        .into_iter()
        .map(|option| {
            option_text
                .get(&option)
                .ok_or(LabelError::Missing)
                .and_then(|text| label::decode(text))
                .map(|date| at_local_hour(date, CANDIDATE_HOUR, zone))
                .map_err(|source| PollError::MalformedOption {
                    poll_id: poll_id.to_string(),
                    option,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PollOutcome {
        poll_id: poll_id.to_string(),
        winning_dates,
        finalized,
    })
}
