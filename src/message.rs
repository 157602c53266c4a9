use crate::label;
use crate::result::PollOutcome;
use crate::time::CANDIDATE_HOUR;
use chrono::{Month, TimeZone};
use itertools::Itertools;
use std::str::FromStr;
use thiserror::Error;

/// Language of question and announcement texts.
/// Date labels on poll options are always English.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Locale {
    #[default]
    English,
    German,
}

#[derive(Error, Debug, Eq, PartialEq)]
#[error("Unsupported locale {0:?}, expected \"en\" or \"de\"")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "de" | "german" | "deutsch" => Ok(Locale::German),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

impl Locale {
    pub fn month_name(self, month: Month) -> &'static str {
        match self {
            Locale::English => month.name(),
            Locale::German => GERMAN_MONTHS[month.number_from_month() as usize - 1],
        }
    }

    /// Question of the poll for `month`
    ///
    /// # Examples
    /// ```
    /// use chrono::Month;
    /// use date_decider_libs::message::Locale;
    ///
    /// assert_eq!(Locale::English.poll_question(2026, Month::March), "Poll for March 2026");
    /// assert_eq!(Locale::German.poll_question(2026, Month::March), "Umfrage für März 2026");
    /// ```
    pub fn poll_question(self, year: i32, month: Month) -> String {
        match self {
            Locale::English => format!("Poll for {} {}", self.month_name(month), year),
            Locale::German => format!("Umfrage für {} {}", self.month_name(month), year),
        }
    }
}

/// A plain text message
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub content: String,
    pub mentions_everyone: bool,
}

impl Message {
    pub fn new(content: &str, mentions_everyone: bool) -> Message {
        Message {
            content: content.to_string(),
            mentions_everyone,
        }
    }

    /// Tells everyone a poll for `month` is up
    pub fn poll_announcement(month: Month, locale: Locale) -> Message {
        let content = match locale {
            Locale::English => format!(
                "@here :wave: Hey! I just posted a new poll for {} :calendar:. Check it out! :eyes:\n\
                 -# Beep boop. I'm a bot. :robot:",
                locale.month_name(month)
            ),
            Locale::German => format!(
                "@here :wave: Hey! Ich habe gerade eine neue Umfrage für {} gepostet :calendar:. Schaut mal rein! :eyes:\n\
                 -# Beep boop. Ich bin ein Bot. :robot:",
                locale.month_name(month)
            ),
        };

        Message::new(&content, true)
    }

    /// Announces the winning dates of a poll. An outcome that is not final
    /// yet is worded as the current standing and mentions nobody.
    pub fn result_announcement<Z: TimeZone>(outcome: &PollOutcome<Z>, locale: Locale) -> Message {
        let dates = outcome
            .winning_dates
            .iter()
            .map(|date| format!("**{}**", label::encode(date)))
            .join(" / ");

        let content = match (locale, outcome.finalized) {
            (Locale::English, true) => format!(
                "@here :tada: The votes are in! We meet on {} at {}:00. :calendar:\n\
                 -# Beep boop. I'm a bot. :robot:",
                dates, CANDIDATE_HOUR
            ),
            (Locale::English, false) => format!(
                ":hourglass: The poll is still open. Currently leading: {} at {}:00.",
                dates, CANDIDATE_HOUR
            ),
            (Locale::German, true) => format!(
                "@here :tada: Die Abstimmung ist vorbei! Wir treffen uns am {} um {}:00 Uhr. :calendar:\n\
                 -# Beep boop. Ich bin ein Bot. :robot:",
                dates, CANDIDATE_HOUR
            ),
            (Locale::German, false) => format!(
                ":hourglass: Die Umfrage läuft noch. Aktuell vorne: {} um {}:00 Uhr.",
                dates, CANDIDATE_HOUR
            ),
        };

        Message::new(&content, outcome.finalized)
    }
}
