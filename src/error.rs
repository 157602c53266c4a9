use crate::result::OptionId;
use thiserror::Error;

/// Why an option text could not be read back as a date label.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum LabelError {
    #[error("No label text for this option")]
    Missing,
    #[error("Expected \"<Weekday>, <DD>.<MM>.<YYYY>\", got {text:?}")]
    Grammar { text: String },
    #[error("Unknown weekday name {name:?}")]
    UnknownWeekday { name: String },
    #[error("{day:02}.{month:02}.{year:04} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum PollError {
    #[error("Poll {poll_id} has no option with votes")]
    NoWinner { poll_id: String },
    #[error("Option {option} of poll {poll_id} is not a date label")]
    MalformedOption {
        poll_id: String,
        option: OptionId,
        #[source]
        source: LabelError,
    },
    #[error("Unknown time zone {zone:?}")]
    InvalidZone { zone: String },
    #[error("{year}-{month:02} cannot be represented as a calendar month")]
    OutOfRange { year: i32, month: u32 },
}
