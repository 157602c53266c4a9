use super::model::{
    AllowedMentionType, AllowedMentions, Message as DiscordMessage, MessageSend, PollAnswer,
    PollCreate, PollMedia,
};
use chrono::{DateTime, TimeZone, Utc};
use date_decider_libs::{
    label,
    message::Message,
    poll::DatePoll,
    result::{OptionId, OptionText, VoteTally},
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Longest poll Discord accepts, in hours
pub const MAX_POLL_HOURS: i64 = 768;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum MapError {
    #[error("poll is already expired (expiry {expiry}, less than an hour from {now})")]
    Expired {
        expiry: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

/// What a fetched poll message says about the votes so far
#[derive(Debug, Clone, PartialEq)]
pub struct PollState {
    pub tally: VoteTally,
    pub options: OptionText,
    pub finalized: bool,
}

pub fn to_message_send(message: &Message) -> MessageSend {
    MessageSend {
        content: Some(message.content.clone()),
        allowed_mentions: message.mentions_everyone.then(|| AllowedMentions {
            parse: vec![AllowedMentionType::Everyone],
        }),
        poll: None,
    }
}

/// Converts a date poll into a Discord poll running until the poll's expiry.
/// The duration is rounded down to whole hours.
pub fn to_poll_message<Z: TimeZone>(
    poll: &DatePoll<Z>,
    now: DateTime<Utc>,
) -> Result<MessageSend, MapError> {
    let expiry = poll.expiry.with_timezone(&Utc);
    let hours = (expiry - now).num_hours();
    if hours < 1 {
        return Err(MapError::Expired { expiry, now });
    }
    if hours > MAX_POLL_HOURS {
        warn!(hours, "poll runs longer than Discord allows, shortening it");
    }

    Ok(MessageSend {
        content: None,
        allowed_mentions: None,
        poll: Some(PollCreate {
            question: PollMedia::text(&poll.question),
            answers: poll
                .answers
                .iter()
                .map(|answer| PollAnswer {
                    answer_id: None,
                    poll_media: PollMedia::text(&label::encode(answer)),
                })
                .collect(),
            duration: hours.min(MAX_POLL_HOURS) as u32,
            allow_multiselect: true,
        }),
    })
}

/// Reads the votes of a poll message, `None` if the message has no poll.
///
/// Every answer shows up in the tally in the poll's answer order; answers
/// without any vote count 0.
pub fn to_poll_state(message: &DiscordMessage) -> Option<PollState> {
    let poll = message.poll.as_ref()?;

    let counts: HashMap<OptionId, u32> = poll
        .results
        .iter()
        .flat_map(|results| results.answer_counts.iter())
        .map(|count| (count.id, count.count))
        .collect();

    let mut tally = VoteTally::new();
    let mut options = OptionText::new();
    for (index, answer) in poll.answers.iter().enumerate() {
        // Discord numbers answers from 1
        let id = answer.answer_id.unwrap_or(index as OptionId + 1);
        tally.record(id, counts.get(&id).copied().unwrap_or(0));
        if let Some(text) = &answer.poll_media.text {
            options.insert(id, text.clone());
        }
    }

    Some(PollState {
        tally,
        options,
        finalized: poll
            .results
            .as_ref()
            .map(|results| results.is_finalized)
            .unwrap_or(false),
    })
}
