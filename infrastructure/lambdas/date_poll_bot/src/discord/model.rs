//! The slice of Discord's message and poll objects this bot reads and writes.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MessageSend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollCreate>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AllowedMentions {
    pub parse: Vec<AllowedMentionType>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AllowedMentionType {
    Everyone,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PollMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PollMedia {
    pub fn text(text: &str) -> PollMedia {
        PollMedia {
            text: Some(text.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PollAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_id: Option<u32>,
    pub poll_media: PollMedia,
}

/// Poll as sent when creating it. `duration` is in hours.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PollCreate {
    pub question: PollMedia,
    pub answers: Vec<PollAnswer>,
    pub duration: u32,
    pub allow_multiselect: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub poll: Option<Poll>,
}

/// Poll as attached to a message fetched from Discord
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Poll {
    pub question: PollMedia,
    pub answers: Vec<PollAnswer>,
    #[serde(default)]
    pub results: Option<PollResults>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PollResults {
    pub is_finalized: bool,
    /// Answers nobody voted for may be missing
    #[serde(default)]
    pub answer_counts: Vec<AnswerCount>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AnswerCount {
    pub id: u32,
    pub count: u32,
}

/// One page of a channel's pins, most recently pinned first
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PinnedMessages {
    pub items: Vec<MessagePin>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessagePin {
    pub pinned_at: String,
    pub message: Message,
}

impl PinnedMessages {
    pub fn into_messages(self) -> Vec<Message> {
        self.items.into_iter().map(|pin| pin.message).collect()
    }
}
